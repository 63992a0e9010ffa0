//! Per-state behavior objects.
//!
//! Each state is a unit struct with no fields. The one instance of each lives
//! in a `static` and is found through [`behavior`]. Everything a behavior
//! needs to remember between `enter` and `exit` is stored on the player's
//! [`PlayerStateComponent`].

use glam::Vec2;

use crate::command::SpawnRequest;
use crate::components::{
    CollectibleComponent, Color, HealthComponent, MovementComponent, PhysicsComponent,
    RenderComponent, Transform,
};
use crate::config::EffectsConfig;
use crate::input::InputState;
use crate::physics::BodyHandle;

use super::{EffectTimer, PlayerStateComponent, PlayerStateKind, StateContext};

/// Gap in pixels between the player's edge and a freshly fired projectile.
const MUZZLE_GAP: f32 = 6.0;

/// Behavior of one player state.
///
/// Every hook has a default. Effect states usually only override
/// [`PlayerState::tint`] plus the hook that makes them special.
pub trait PlayerState: Send + Sync {
    /// The state this behavior implements.
    fn kind(&self) -> PlayerStateKind;

    /// Sprite tint while the state is active; `None` keeps the current tint.
    fn tint(&self) -> Option<Color> {
        None
    }

    /// Multiplier on the player's base run speed.
    fn speed_multiplier(&self, _effects: &EffectsConfig) -> f32 {
        1.0
    }

    /// One-time setup when the state becomes active.
    fn enter(&self, ctx: &mut StateContext<'_>) {
        apply_tint(ctx, self.tint());
    }

    /// One-time teardown when the state is left.
    fn exit(&self, ctx: &mut StateContext<'_>) {
        restore_tint(ctx);
    }

    /// Per-frame work: count the timer down and flicker near expiry.
    fn update(&self, ctx: &mut StateContext<'_>, dt: f32) {
        if let Some(timer) = ctx.component_mut::<EffectTimer>() {
            timer.tick(dt);
        }
        flicker(ctx, self.tint());
    }

    /// Maps input to player movement.
    fn handle_input(&self, ctx: &mut StateContext<'_>, input: InputState) {
        let multiplier = self.speed_multiplier(&ctx.config.effects);
        apply_movement(ctx, input, multiplier);
    }
}

// =============================================================================
// States
// =============================================================================

/// Default state: no timer, no tint, default movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalState;

impl PlayerState for NormalState {
    fn kind(&self) -> PlayerStateKind {
        PlayerStateKind::Normal
    }

    fn enter(&self, _ctx: &mut StateContext<'_>) {}

    fn exit(&self, _ctx: &mut StateContext<'_>) {}

    fn update(&self, _ctx: &mut StateContext<'_>, _dt: f32) {}
}

/// Faster movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoostedState;

impl PlayerState for BoostedState {
    fn kind(&self) -> PlayerStateKind {
        PlayerStateKind::Boosted
    }

    fn tint(&self) -> Option<Color> {
        Some(Color::GOLD)
    }

    fn speed_multiplier(&self, effects: &EffectsConfig) -> f32 {
        effects.boost_multiplier
    }
}

/// Invulnerable to damage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShieldedState;

impl PlayerState for ShieldedState {
    fn kind(&self) -> PlayerStateKind {
        PlayerStateKind::Shielded
    }

    fn tint(&self) -> Option<Color> {
        Some(Color::CYAN)
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        apply_tint(ctx, self.tint());
        if let Some(health) = ctx.component_mut::<HealthComponent>() {
            health.set_invulnerable(true);
        }
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        restore_tint(ctx);
        if let Some(health) = ctx.component_mut::<HealthComponent>() {
            health.set_invulnerable(false);
        }
    }
}

/// Pulls coins within the magnet radius toward the player.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagneticState;

impl PlayerState for MagneticState {
    fn kind(&self) -> PlayerStateKind {
        PlayerStateKind::Magnetic
    }

    fn tint(&self) -> Option<Color> {
        Some(Color::MAGENTA)
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        restore_tint(ctx);
        for (handle, _) in collectibles_in_radius(ctx) {
            ctx.physics.set_velocity(handle, Vec2::ZERO);
        }
    }

    fn update(&self, ctx: &mut StateContext<'_>, dt: f32) {
        if let Some(timer) = ctx.component_mut::<EffectTimer>() {
            timer.tick(dt);
        }
        flicker(ctx, self.tint());
        pull_collectibles(ctx);
    }
}

/// Left and right are swapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversedState;

impl PlayerState for ReversedState {
    fn kind(&self) -> PlayerStateKind {
        PlayerStateKind::Reversed
    }

    fn tint(&self) -> Option<Color> {
        Some(Color::LIME)
    }

    fn handle_input(&self, ctx: &mut StateContext<'_>, input: InputState) {
        apply_movement(ctx, input.mirrored(), 1.0);
    }
}

/// Slower movement and extra body damping.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadwindState;

impl PlayerState for HeadwindState {
    fn kind(&self) -> PlayerStateKind {
        PlayerStateKind::Headwind
    }

    fn tint(&self) -> Option<Color> {
        Some(Color::SLATE)
    }

    fn speed_multiplier(&self, effects: &EffectsConfig) -> f32 {
        effects.headwind_multiplier
    }

    fn enter(&self, ctx: &mut StateContext<'_>) {
        apply_tint(ctx, self.tint());
        let damping = ctx.config.effects.headwind_damping;
        let Some(handle) = ctx.body_handle() else {
            return;
        };
        let Some(body) = ctx.physics.body_mut(handle) else {
            return;
        };
        let previous = body.linear_damping;
        body.linear_damping = damping;
        if let Some(state) = ctx.component_mut::<PlayerStateComponent>() {
            state.saved_damping = Some(previous);
        }
    }

    fn exit(&self, ctx: &mut StateContext<'_>) {
        restore_tint(ctx);
        let saved = ctx
            .component_mut::<PlayerStateComponent>()
            .and_then(|state| state.saved_damping.take());
        if let (Some(previous), Some(handle)) = (saved, ctx.body_handle()) {
            if let Some(body) = ctx.physics.body_mut(handle) {
                body.linear_damping = previous;
            }
        }
    }
}

static NORMAL: NormalState = NormalState;
static BOOSTED: BoostedState = BoostedState;
static SHIELDED: ShieldedState = ShieldedState;
static MAGNETIC: MagneticState = MagneticState;
static REVERSED: ReversedState = ReversedState;
static HEADWIND: HeadwindState = HeadwindState;

/// Returns the shared behavior object for `kind`.
#[must_use]
pub fn behavior(kind: PlayerStateKind) -> &'static dyn PlayerState {
    match kind {
        PlayerStateKind::Normal => &NORMAL,
        PlayerStateKind::Boosted => &BOOSTED,
        PlayerStateKind::Shielded => &SHIELDED,
        PlayerStateKind::Magnetic => &MAGNETIC,
        PlayerStateKind::Reversed => &REVERSED,
        PlayerStateKind::Headwind => &HEADWIND,
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Saves the current tint (once) and recolors the sprite.
fn apply_tint(ctx: &mut StateContext<'_>, tint: Option<Color>) {
    let Some(tint) = tint else {
        return;
    };
    let Some(player) = ctx.player_mut() else {
        return;
    };
    let Some(current) = player.get_component::<RenderComponent>().map(|r| r.tint) else {
        return;
    };
    if let Some(state) = player.get_component_mut::<PlayerStateComponent>() {
        state.saved_tint.get_or_insert(current);
    }
    if let Some(render) = player.get_component_mut::<RenderComponent>() {
        render.tint = tint;
    }
}

/// Puts back the tint saved by [`apply_tint`].
fn restore_tint(ctx: &mut StateContext<'_>) {
    let Some(player) = ctx.player_mut() else {
        return;
    };
    let Some(saved) = player
        .get_component_mut::<PlayerStateComponent>()
        .and_then(|state| state.saved_tint.take())
    else {
        return;
    };
    if let Some(render) = player.get_component_mut::<RenderComponent>() {
        render.tint = saved;
    }
}

/// Alternates between the effect tint and the saved tint once the timer
/// drops below the flicker threshold.
fn flicker(ctx: &mut StateContext<'_>, tint: Option<Color>) {
    let Some(tint) = tint else {
        return;
    };
    let threshold = ctx.config.effects.flicker_threshold;
    let period = ctx.config.effects.flicker_period;
    let Some(player) = ctx.player_mut() else {
        return;
    };
    let Some(remaining) = player.get_component::<EffectTimer>().map(|t| t.remaining) else {
        return;
    };
    let saved = player
        .get_component::<PlayerStateComponent>()
        .and_then(|state| state.saved_tint);
    let Some(render) = player.get_component_mut::<RenderComponent>() else {
        return;
    };
    if remaining > threshold || remaining <= 0.0 {
        render.tint = tint;
        return;
    }
    #[allow(clippy::cast_possible_truncation)]
    let phase = (remaining / period).floor() as i64;
    render.tint = if phase % 2 == 0 {
        tint
    } else {
        saved.unwrap_or(Color::WHITE)
    };
}

/// Default input mapping: run, jump while grounded, fire when the cooldown
/// allows. `speed_scale` multiplies the base run speed.
fn apply_movement(ctx: &mut StateContext<'_>, input: InputState, speed_scale: f32) {
    let Some(handle) = ctx.body_handle() else {
        return;
    };
    let fire_cooldown = ctx.config.player.fire_cooldown;
    let axis = input.horizontal();
    let Some(movement) = ctx.component_mut::<MovementComponent>() else {
        return;
    };
    movement.face(axis);
    let (base_speed, jump_speed, facing) =
        (movement.base_speed, movement.jump_speed, movement.facing);
    let fire = input.contains(InputState::FIRE) && movement.fire_cooldown <= 0.0;
    if fire {
        movement.fire_cooldown = fire_cooldown;
    }

    if let Some(body) = ctx.physics.body_mut(handle) {
        body.velocity.x = axis * base_speed * speed_scale;
        if input.contains(InputState::JUMP) && body.grounded {
            body.velocity.y = -jump_speed;
            body.grounded = false;
        }
    }

    if fire {
        if let Some(transform) = ctx.component::<Transform>().copied() {
            let offset = transform.size.x * 0.5 + MUZZLE_GAP;
            ctx.commands.spawn(SpawnRequest::Projectile {
                position: transform.position + Vec2::new(facing * offset, 0.0),
                velocity: Vec2::new(facing * ctx.config.player.projectile_speed, 0.0),
            });
        }
    }
}

/// Active collectibles within the magnet radius of the player, each with its
/// offset toward the player.
fn collectibles_in_radius(ctx: &StateContext<'_>) -> Vec<(BodyHandle, Vec2)> {
    let Some(center) = ctx.component::<Transform>().map(|t| t.position) else {
        return Vec::new();
    };
    let radius = ctx.config.effects.magnet_radius;
    ctx.entities
        .entities()
        .filter(|e| e.is_active() && e.id() != ctx.player)
        .filter(|e| e.has_component::<CollectibleComponent>())
        .filter_map(|e| {
            let position = e.get_component::<Transform>()?.position;
            let handle = e.get_component::<PhysicsComponent>()?.handle();
            let offset = center - position;
            (offset.length() <= radius).then_some((handle, offset))
        })
        .collect()
}

/// Points every collectible within the magnet radius at the player.
fn pull_collectibles(ctx: &mut StateContext<'_>) {
    let pull_speed = ctx.config.effects.magnet_pull_speed;
    for (handle, offset) in collectibles_in_radius(ctx) {
        let distance = offset.length();
        if distance > f32::EPSILON {
            ctx.physics.set_velocity(handle, offset / distance * pull_speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_lookup_matches_kind() {
        for kind in PlayerStateKind::ALL {
            assert_eq!(behavior(kind).kind(), kind);
        }
    }

    #[test]
    fn only_effect_states_tint() {
        assert!(behavior(PlayerStateKind::Normal).tint().is_none());
        for kind in PlayerStateKind::EFFECTS {
            assert!(behavior(kind).tint().is_some(), "{kind} has no tint");
        }
    }

    #[test]
    fn speed_multipliers_follow_config() {
        let effects = EffectsConfig::default();
        let multiplier = |kind| behavior(kind).speed_multiplier(&effects);
        assert!((multiplier(PlayerStateKind::Boosted) - 1.5).abs() < f32::EPSILON);
        assert!((multiplier(PlayerStateKind::Headwind) - 0.3).abs() < f32::EPSILON);
        assert!((multiplier(PlayerStateKind::Shielded) - 1.0).abs() < f32::EPSILON);
        assert!((multiplier(PlayerStateKind::Magnetic) - 1.0).abs() < f32::EPSILON);
        assert!((multiplier(PlayerStateKind::Normal) - 1.0).abs() < f32::EPSILON);
    }
}
