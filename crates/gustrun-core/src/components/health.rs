use serde::{Deserialize, Serialize};

use crate::entity::{Component, ComponentContext};

/// Hit points with two kinds of protection: an explicit invulnerable flag
/// (set while Shielded) and a short grace period after each hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthComponent {
    current: u32,
    max: u32,
    invulnerable: bool,
    grace: f32,
}

impl HealthComponent {
    /// Full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            invulnerable: false,
            grace: 0.0,
        }
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// `true` once hit points reach zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Explicit invulnerability (independent of the grace period).
    #[must_use]
    pub const fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// Sets explicit invulnerability.
    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    /// Seconds of post-hit grace left.
    #[must_use]
    pub const fn grace_remaining(&self) -> f32 {
        self.grace
    }

    /// `true` if a hit would land right now.
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        !self.invulnerable && self.grace <= 0.0
    }

    /// Applies a hit of `amount` unless protected, then starts a grace period
    /// of `grace` seconds. Returns `true` if the hit landed.
    pub fn take_hit(&mut self, amount: u32, grace: f32) -> bool {
        if !self.is_vulnerable() {
            return false;
        }
        self.current = self.current.saturating_sub(amount);
        self.grace = grace;
        true
    }

    /// Unconditional damage, ignoring every protection. Returns the hit
    /// points left.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Restores up to `amount` hit points, capped at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

impl Component for HealthComponent {
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, dt: f32) {
        if self.grace > 0.0 {
            self.grace = (self.grace - dt).max(0.0);
        }
    }
}

/// Points and coins collected by a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    /// Total points.
    pub points: u32,
    /// Coins picked up.
    pub coins: u32,
}

impl ScoreComponent {
    /// Adds `points`.
    pub fn add_points(&mut self, points: u32) {
        self.points = self.points.saturating_add(points);
    }

    /// Records a collected coin worth `value` points.
    pub fn add_coin(&mut self, value: u32) {
        self.coins += 1;
        self.add_points(value);
    }
}

impl Component for ScoreComponent {}
