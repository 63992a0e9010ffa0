//! Error types for the few fallible operations in the core.
//!
//! Most simulation operations treat "nothing to do" as ordinary control flow
//! and return `Option`, `bool` or an outcome enum. Only configuration loading
//! and the validated player-state manager report errors.

use thiserror::Error;

use crate::entity::EntityId;
use crate::player::PlayerStateKind;

/// Errors raised while loading or validating a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text is not valid JSON for [`GameConfig`](crate::config::GameConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field (e.g. `physics.fixed_dt`).
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by [`ValidatedStateManager`](crate::player::ValidatedStateManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The transition table forbids moving from `from` to `to`.
    #[error("invalid player state transition {from} -> {to}")]
    InvalidTransition {
        /// State the player was in.
        from: PlayerStateKind,
        /// State that was requested.
        to: PlayerStateKind,
    },

    /// The edge is allowed but its guard predicate returned `false`.
    #[error("guard rejected player state transition {from} -> {to}")]
    GuardRejected {
        /// State the player was in.
        from: PlayerStateKind,
        /// State that was requested.
        to: PlayerStateKind,
    },

    /// The target entity does not exist or carries no player state.
    #[error("entity {0} is not a player")]
    NotAPlayer(EntityId),
}
