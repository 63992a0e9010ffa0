use tracing::debug;

use crate::command::CommandQueue;
use crate::components::PhysicsComponent;
use crate::config::GameConfig;
use crate::entity::{Component, Entity, EntityId, EntityManager};
use crate::events::{EventBus, StateChanged};
use crate::input::InputState;
use crate::physics::{BodyHandle, PhysicsWorld};

use super::{behavior, EffectTimer, PlayerStateComponent, PlayerStateKind};

/// Everything a state behavior may touch for one player.
///
/// Built by the simulation outside the physics step, so behaviors may adjust
/// bodies directly.
pub struct StateContext<'a> {
    /// The player being driven.
    pub player: EntityId,
    /// All entities (the player included).
    pub entities: &'a mut EntityManager,
    /// Physics world.
    pub physics: &'a mut PhysicsWorld,
    /// Deferred structural changes.
    pub commands: &'a mut CommandQueue,
    /// Notification bus.
    pub events: &'a mut EventBus,
    /// Active configuration.
    pub config: &'a GameConfig,
}

impl StateContext<'_> {
    /// Borrows the player entity.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(self.player)
    }

    /// Mutably borrows the player entity.
    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.get_mut(self.player)
    }

    /// Borrows a component on the player.
    #[must_use]
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.player()?.get_component::<T>()
    }

    /// Mutably borrows a component on the player.
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.player_mut()?.get_component_mut::<T>()
    }

    /// The player's current state, or `None` if the entity is missing or
    /// carries no [`PlayerStateComponent`].
    #[must_use]
    pub fn current_state(&self) -> Option<PlayerStateKind> {
        self.component::<PlayerStateComponent>().map(|state| state.kind)
    }

    /// Handle of the player's body.
    #[must_use]
    pub fn body_handle(&self) -> Option<BodyHandle> {
        self.component::<PhysicsComponent>().map(PhysicsComponent::handle)
    }
}

/// Drives player state transitions with "latest request wins" semantics.
///
/// The manager is stateless; every per-player value lives on the player's
/// components, so one manager serves any number of players.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerStateManager;

impl PlayerStateManager {
    /// Creates a manager.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Current state of `entity`, if it is a player.
    #[must_use]
    pub fn current_state(&self, entity: &Entity) -> Option<PlayerStateKind> {
        entity
            .get_component::<PlayerStateComponent>()
            .map(|state| state.kind)
    }

    /// Moves the player to `new`.
    ///
    /// Runs the old state's `exit`, restarts the timer with the configured
    /// duration, runs the new state's `enter` and publishes [`StateChanged`].
    /// Requesting the current state does nothing. Returns `true` if a
    /// transition happened.
    pub fn change_state(&self, ctx: &mut StateContext<'_>, new: PlayerStateKind) -> bool {
        let Some(old) = ctx.current_state() else {
            return false;
        };
        if old == new {
            return false;
        }

        behavior(old).exit(ctx);

        let duration = ctx.config.effects.duration_of(new);
        if let Some(state) = ctx.component_mut::<PlayerStateComponent>() {
            state.kind = new;
        }
        if let Some(timer) = ctx.component_mut::<EffectTimer>() {
            timer.reset(duration);
        }

        behavior(new).enter(ctx);

        debug!(player = %ctx.player, %old, %new, duration, "player state changed");
        ctx.events.publish(StateChanged {
            entity: ctx.player,
            old,
            new,
        });
        true
    }

    /// Advances the active state by `dt`.
    ///
    /// An effect whose timer is already at or below zero reverts to `Normal`
    /// before doing anything else. Otherwise the state updates, and an effect
    /// whose timer this update ran out reverts right after. Returns `true` if
    /// either revert happened.
    pub fn update(&self, ctx: &mut StateContext<'_>, dt: f32) -> bool {
        let Some(kind) = ctx.current_state() else {
            return false;
        };
        if kind.is_effect() {
            let expired = ctx
                .component::<EffectTimer>()
                .map_or(true, EffectTimer::is_expired);
            if expired {
                return self.change_state(ctx, PlayerStateKind::Normal);
            }
        }
        behavior(kind).update(ctx, dt);
        if kind.is_effect()
            && ctx
                .component::<EffectTimer>()
                .is_some_and(EffectTimer::is_expired)
        {
            return self.change_state(ctx, PlayerStateKind::Normal);
        }
        false
    }

    /// Maps `input` to movement through the active state.
    pub fn handle_input(&self, ctx: &mut StateContext<'_>, input: InputState) {
        if let Some(kind) = ctx.current_state() {
            behavior(kind).handle_input(ctx, input);
        }
    }
}
