//! Player state transitions checked against an explicit table.
//!
//! The table maps `(current, requested)` to allowed or denied. An allowed
//! edge may carry a guard predicate, and the table may carry actions that run
//! after every successful transition. Pairs the table does not mention are
//! denied.
//!
//! The default table forces effect states to pass through `Normal`:
//!
//! | from \ to | Normal | effect |
//! |-----------|--------|--------|
//! | Normal    | no-op  | allowed |
//! | effect    | allowed | denied (same effect: no-op) |

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::TransitionError;
use crate::input::InputState;

use super::{PlayerStateKind, PlayerStateManager, StateContext};

/// Predicate deciding whether an allowed edge may be taken right now.
pub type TransitionGuard = Box<dyn Fn(&StateContext<'_>) -> bool>;

/// Callback run after a successful transition with `(from, to)`.
pub type TransitionAction = Box<dyn Fn(PlayerStateKind, PlayerStateKind, &mut StateContext<'_>)>;

struct Rule {
    allowed: bool,
    guard: Option<TransitionGuard>,
}

/// `(current, requested) → rule` lookup plus post-transition actions.
pub struct TransitionTable {
    rules: HashMap<(PlayerStateKind, PlayerStateKind), Rule>,
    actions: Vec<TransitionAction>,
}

impl TransitionTable {
    /// A table that denies every transition.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            actions: Vec::new(),
        }
    }

    /// `Normal → effect` and `effect → Normal` allowed, `effect → other
    /// effect` denied.
    #[must_use]
    pub fn through_normal() -> Self {
        let mut table = Self::empty();
        for effect in PlayerStateKind::EFFECTS {
            table = table
                .allow(PlayerStateKind::Normal, effect)
                .allow(effect, PlayerStateKind::Normal);
        }
        table
    }

    /// Allows `from → to` with no guard.
    #[must_use]
    pub fn allow(mut self, from: PlayerStateKind, to: PlayerStateKind) -> Self {
        self.rules.insert(
            (from, to),
            Rule {
                allowed: true,
                guard: None,
            },
        );
        self
    }

    /// Denies `from → to`.
    #[must_use]
    pub fn deny(mut self, from: PlayerStateKind, to: PlayerStateKind) -> Self {
        self.rules.insert(
            (from, to),
            Rule {
                allowed: false,
                guard: None,
            },
        );
        self
    }

    /// Allows `from → to` only while `guard` returns `true`.
    #[must_use]
    pub fn guarded(
        mut self,
        from: PlayerStateKind,
        to: PlayerStateKind,
        guard: impl Fn(&StateContext<'_>) -> bool + 'static,
    ) -> Self {
        self.rules.insert(
            (from, to),
            Rule {
                allowed: true,
                guard: Some(Box::new(guard)),
            },
        );
        self
    }

    /// Adds an action run after every successful transition.
    #[must_use]
    pub fn on_transition(
        mut self,
        action: impl Fn(PlayerStateKind, PlayerStateKind, &mut StateContext<'_>) + 'static,
    ) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Returns `true` if the table allows `from → to`, ignoring guards.
    #[must_use]
    pub fn is_allowed(&self, from: PlayerStateKind, to: PlayerStateKind) -> bool {
        self.rules.get(&(from, to)).is_some_and(|rule| rule.allowed)
    }

    fn check(
        &self,
        from: PlayerStateKind,
        to: PlayerStateKind,
        ctx: &StateContext<'_>,
    ) -> Result<(), TransitionError> {
        match self.rules.get(&(from, to)) {
            Some(rule) if rule.allowed => match &rule.guard {
                Some(guard) if !guard(ctx) => Err(TransitionError::GuardRejected { from, to }),
                _ => Ok(()),
            },
            _ => Err(TransitionError::InvalidTransition { from, to }),
        }
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::through_normal()
    }
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut allowed: Vec<_> = self
            .rules
            .iter()
            .filter(|(_, rule)| rule.allowed)
            .map(|(edge, _)| *edge)
            .collect();
        allowed.sort();
        f.debug_struct("TransitionTable")
            .field("allowed", &allowed)
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// [`PlayerStateManager`] that refuses transitions its table does not allow.
///
/// Timer expiry inside [`ValidatedStateManager::update`] always returns to
/// `Normal`, whatever the table says.
#[derive(Debug, Default)]
pub struct ValidatedStateManager {
    inner: PlayerStateManager,
    table: TransitionTable,
}

impl ValidatedStateManager {
    /// Wraps a default manager with `table`.
    #[must_use]
    pub fn new(table: TransitionTable) -> Self {
        Self {
            inner: PlayerStateManager::new(),
            table,
        }
    }

    /// The transition table.
    #[must_use]
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Moves the player to `new` if the table allows it.
    ///
    /// Requesting the current state is an `Ok(false)` no-op.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::NotAPlayer`] if the context's player has no state.
    /// - [`TransitionError::InvalidTransition`] if the edge is not allowed.
    /// - [`TransitionError::GuardRejected`] if the edge's guard says no.
    pub fn change_state(
        &self,
        ctx: &mut StateContext<'_>,
        new: PlayerStateKind,
    ) -> Result<bool, TransitionError> {
        let from = ctx
            .current_state()
            .ok_or(TransitionError::NotAPlayer(ctx.player))?;
        if from == new {
            return Ok(false);
        }
        if let Err(err) = self.table.check(from, new, ctx) {
            debug!(player = %ctx.player, %err, "player state transition rejected");
            return Err(err);
        }

        let changed = self.inner.change_state(ctx, new);
        if changed {
            for action in &self.table.actions {
                action(from, new, ctx);
            }
        }
        Ok(changed)
    }

    /// Advances the active state; see [`PlayerStateManager::update`].
    pub fn update(&self, ctx: &mut StateContext<'_>, dt: f32) -> bool {
        self.inner.update(ctx, dt)
    }

    /// Maps input through the active state.
    pub fn handle_input(&self, ctx: &mut StateContext<'_>, input: InputState) {
        self.inner.handle_input(ctx, input);
    }
}
