//! Player status-effect state machine.
//!
//! A player is always in exactly one [`PlayerStateKind`]. `Normal` has no
//! timer. The five effect states count down and fall back to `Normal` when
//! their timer runs out.
//!
//! # Architecture
//!
//! - **Per-entity data** lives in components: [`PlayerStateComponent`] holds
//!   the current kind plus whatever the active state saved on `enter`
//!   (tint, damping), and [`EffectTimer`] holds the countdown.
//! - **Behavior** lives in immutable, stateless objects implementing
//!   [`PlayerState`], one per kind, looked up with [`behavior`]. They carry
//!   no per-player data, so any number of players can share them.
//! - [`PlayerStateManager`] drives transitions with plain "latest request
//!   wins" semantics. [`ValidatedStateManager`] adds a [`TransitionTable`]
//!   that rejects disallowed edges with a
//!   [`TransitionError`](crate::error::TransitionError).
//!
//! # Example
//!
//! ```
//! use gustrun_core::player::PlayerStateKind;
//!
//! assert!(PlayerStateKind::Headwind.is_effect());
//! assert!(!PlayerStateKind::Normal.is_effect());
//! assert_eq!(PlayerStateKind::Boosted.to_string(), "Boosted");
//! ```

mod manager;
mod states;
mod validated;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::Color;
use crate::entity::Component;

pub use manager::{PlayerStateManager, StateContext};
pub use states::{
    behavior, BoostedState, HeadwindState, MagneticState, NormalState, PlayerState,
    ReversedState, ShieldedState,
};
pub use validated::{TransitionAction, TransitionGuard, TransitionTable, ValidatedStateManager};

/// Named player states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStateKind {
    /// Default state with no timer.
    #[default]
    Normal,
    /// Faster movement.
    Boosted,
    /// Invulnerable; enemies touched are defeated.
    Shielded,
    /// Pulls nearby coins.
    Magnetic,
    /// Left and right are swapped.
    Reversed,
    /// Slower movement and extra damping.
    Headwind,
}

impl PlayerStateKind {
    /// Every state, `Normal` first.
    pub const ALL: [Self; 6] = [
        Self::Normal,
        Self::Boosted,
        Self::Shielded,
        Self::Magnetic,
        Self::Reversed,
        Self::Headwind,
    ];

    /// The five timed effect states.
    pub const EFFECTS: [Self; 5] = [
        Self::Boosted,
        Self::Shielded,
        Self::Magnetic,
        Self::Reversed,
        Self::Headwind,
    ];

    /// `true` for every state except `Normal`.
    #[must_use]
    pub const fn is_effect(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Boosted => "Boosted",
            Self::Shielded => "Shielded",
            Self::Magnetic => "Magnetic",
            Self::Reversed => "Reversed",
            Self::Headwind => "Headwind",
        }
    }
}

impl fmt::Display for PlayerStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current state of one player plus the values its `enter` saved for `exit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStateComponent {
    /// Active state.
    pub kind: PlayerStateKind,
    /// Render tint before the active state recolored the sprite.
    pub saved_tint: Option<Color>,
    /// Body damping before the active state changed it.
    pub saved_damping: Option<f32>,
}

impl Component for PlayerStateComponent {}

/// Countdown for the active effect state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTimer {
    /// Seconds left. Zero or below means expired.
    pub remaining: f32,
    /// Seconds the effect was started with.
    pub duration: f32,
}

impl EffectTimer {
    /// Restarts the countdown at `duration` seconds.
    pub fn reset(&mut self, duration: f32) {
        self.remaining = duration;
        self.duration = duration;
    }

    /// Counts down by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.remaining -= dt;
    }

    /// `true` once the countdown reached zero.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

impl Component for EffectTimer {}
