//! Deferred commands raised during a pass and applied between phases.
//!
//! Collision handlers run inside the physics step and component updates run
//! while the entity list is being iterated. Neither may create or destroy
//! entities or bodies directly, so they describe the change as a [`Command`]
//! and the simulation applies the queue after the step.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use gustrun_core::command::{Command, CommandQueue, SpawnRequest};
//! use gustrun_core::entity::EntityId;
//!
//! let mut queue = CommandQueue::new();
//! queue.spawn(SpawnRequest::Coin { position: Vec2::new(64.0, 32.0), value: 25 });
//! queue.despawn(EntityId::new(3));
//!
//! assert_eq!(queue.len(), 2);
//! let applied: Vec<Command> = queue.drain().collect();
//! assert!(matches!(applied[1], Command::Despawn(id) if id == EntityId::new(3)));
//! assert!(queue.is_empty());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind};
use crate::player::PlayerStateKind;

/// Blueprint for an entity the [`EntityFactory`](crate::factory::EntityFactory) can build.
///
/// Positions and sizes are in pixels; velocities in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnRequest {
    /// The player.
    Player {
        /// Center.
        position: Vec2,
    },
    /// A coin worth `value` points.
    Coin {
        /// Center.
        position: Vec2,
        /// Points awarded.
        value: u32,
    },
    /// A gift box granting `effect`.
    Gift {
        /// Center.
        position: Vec2,
        /// Granted state.
        effect: PlayerStateKind,
    },
    /// A patrolling enemy.
    Enemy {
        /// Center.
        position: Vec2,
        /// Left patrol bound (x, pixels).
        patrol_left: f32,
        /// Right patrol bound (x, pixels).
        patrol_right: f32,
    },
    /// A static spike strip.
    Spike {
        /// Center.
        position: Vec2,
        /// Full size.
        size: Vec2,
    },
    /// A projectile.
    Projectile {
        /// Center.
        position: Vec2,
        /// Launch velocity.
        velocity: Vec2,
    },
    /// Walkable floor.
    Ground {
        /// Center.
        position: Vec2,
        /// Full size.
        size: Vec2,
    },
    /// Solid block.
    Obstacle {
        /// Center.
        position: Vec2,
        /// Full size.
        size: Vec2,
    },
    /// Level exit.
    Goal {
        /// Center.
        position: Vec2,
    },
}

impl SpawnRequest {
    /// Kind of the entity this request builds.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Player { .. } => EntityKind::Player,
            Self::Coin { .. } => EntityKind::Coin,
            Self::Gift { .. } => EntityKind::Gift,
            Self::Enemy { .. } => EntityKind::Enemy,
            Self::Spike { .. } => EntityKind::Spike,
            Self::Projectile { .. } => EntityKind::Projectile,
            Self::Ground { .. } => EntityKind::Ground,
            Self::Obstacle { .. } => EntityKind::Obstacle,
            Self::Goal { .. } => EntityKind::Goal,
        }
    }
}

/// A deferred change to the world.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Build an entity and admit it at the end of the frame.
    Spawn(SpawnRequest),
    /// Deactivate an entity (removed at the end of the frame).
    Despawn(EntityId),
    /// Overwrite an entity's body velocity (m/s).
    SetVelocity {
        /// Target entity.
        target: EntityId,
        /// New velocity.
        velocity: Vec2,
    },
    /// Add to an entity's body velocity (m/s, unit mass).
    ApplyImpulse {
        /// Target entity.
        target: EntityId,
        /// Velocity change.
        impulse: Vec2,
    },
    /// Request a player state transition through the state manager.
    ChangePlayerState {
        /// Player entity.
        target: EntityId,
        /// Requested state.
        state: PlayerStateKind,
    },
}

/// FIFO queue of [`Command`]s.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Queues a spawn.
    pub fn spawn(&mut self, request: SpawnRequest) {
        self.push(Command::Spawn(request));
    }

    /// Queues a despawn.
    pub fn despawn(&mut self, target: EntityId) {
        self.push(Command::Despawn(target));
    }

    /// Queues a velocity change.
    pub fn set_velocity(&mut self, target: EntityId, velocity: Vec2) {
        self.push(Command::SetVelocity { target, velocity });
    }

    /// Queues an impulse.
    pub fn apply_impulse(&mut self, target: EntityId, impulse: Vec2) {
        self.push(Command::ApplyImpulse { target, impulse });
    }

    /// Queues a player state change.
    pub fn change_player_state(&mut self, target: EntityId, state: PlayerStateKind) {
        self.push(Command::ChangePlayerState { target, state });
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands in push order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Removes and yields every queued command in push order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.commands.drain(..)
    }

    /// Moves every queued command out, leaving the queue empty.
    #[must_use]
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
