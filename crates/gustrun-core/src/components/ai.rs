use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::entity::{Component, ComponentContext, EntityId};

use super::{MovementComponent, PhysicsComponent, Transform};

/// Mixes an entity id into a seed so enemies sharing a config seed still
/// roll independent hops.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Patrol behavior: walk between two x bounds, occasionally hop.
///
/// Hops are rolled from a ChaCha8 stream seeded by the configured seed and
/// the owning entity's id, so a run is reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct AiComponent {
    /// Left patrol bound (pixels).
    pub left: f32,
    /// Right patrol bound (pixels).
    pub right: f32,
    /// Chance per second of hopping while grounded.
    pub hop_chance: f32,
    /// Upward speed of a hop in m/s.
    pub hop_speed: f32,
    direction: f32,
    seed: u64,
    rng: ChaCha8Rng,
}

impl AiComponent {
    /// Patrols between `left` and `right`, starting to the right.
    #[must_use]
    pub fn new(left: f32, right: f32, seed: u64) -> Self {
        Self {
            left: left.min(right),
            right: left.max(right),
            hop_chance: 0.0,
            hop_speed: 0.0,
            direction: 1.0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Enables random hops.
    #[must_use]
    pub fn with_hops(mut self, chance: f32, speed: f32) -> Self {
        self.hop_chance = chance;
        self.hop_speed = speed;
        self
    }

    /// Current walking direction (`1.0` right, `-1.0` left).
    #[must_use]
    pub const fn direction(&self) -> f32 {
        self.direction
    }
}

impl Component for AiComponent {
    fn on_attach(&mut self, owner: EntityId) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed ^ owner.as_u64().wrapping_mul(SEED_MIX));
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) {
        let Some(x) = ctx.sibling::<Transform>().map(|t| t.position.x) else {
            return;
        };
        if x <= self.left {
            self.direction = 1.0;
        } else if x >= self.right {
            self.direction = -1.0;
        }

        let speed = ctx
            .sibling::<MovementComponent>()
            .map_or(ctx.config.enemy.patrol_speed, |m| m.base_speed);
        if let Some(movement) = ctx.sibling_mut::<MovementComponent>() {
            movement.face(self.direction);
        }

        let Some(handle) = ctx.sibling::<PhysicsComponent>().map(PhysicsComponent::handle) else {
            return;
        };
        let Some(body) = ctx.physics.body_mut(handle) else {
            return;
        };
        body.velocity.x = self.direction * speed;
        if body.grounded && self.hop_chance > 0.0 {
            let chance = f64::from((self.hop_chance * dt).clamp(0.0, 1.0));
            if self.rng.gen_bool(chance) {
                body.velocity.y = -self.hop_speed;
            }
        }
    }
}
