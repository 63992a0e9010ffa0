use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::{Component, ComponentContext};

/// A projectile's remaining lifetime and damage.
///
/// When the lifetime runs out the projectile queues its own despawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponent {
    /// Seconds left before despawn.
    pub lifetime: f32,
    /// Damage dealt on hit.
    pub damage: u32,
    expired: bool,
}

impl ProjectileComponent {
    /// A projectile that lives for `lifetime` seconds.
    #[must_use]
    pub const fn new(lifetime: f32, damage: u32) -> Self {
        Self {
            lifetime,
            damage,
            expired: false,
        }
    }

    /// `true` once the despawn has been queued.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.expired
    }
}

impl Component for ProjectileComponent {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) {
        if self.expired {
            return;
        }
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.expired = true;
            trace!(id = %ctx.owner(), "projectile expired");
            ctx.commands.despawn(ctx.owner());
        }
    }
}
