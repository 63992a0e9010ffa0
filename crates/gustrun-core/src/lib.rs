//! # Gustrun Core
//!
//! Fixed-step simulation core for the Gustrun 2D platformer.
//!
//! ## Architecture
//!
//! - **Entities**: an id, a kind, an active flag and a typed
//!   [`ComponentStore`](entity::ComponentStore)
//! - **Physics**: an AABB world of bodies in meters, reporting contact
//!   begin/end events
//! - **Collision dispatch**: exact kind pairs mapped to gameplay reactions,
//!   fed by physics contacts or an all-pairs overlap test
//! - **Player states**: one active status effect per player, timed revert to
//!   `Normal`
//!
//! Everything that changes the world's structure during a frame goes through
//! the [`CommandQueue`](command::CommandQueue) and is applied after the
//! physics step. Spawns become visible at the end of the frame.
//!
//! ## Usage
//!
//! ```
//! use glam::Vec2;
//! use gustrun_core::command::SpawnRequest;
//! use gustrun_core::events::CoinCollected;
//! use gustrun_core::input::InputState;
//! use gustrun_core::{GameConfig, Simulation};
//!
//! let mut sim = Simulation::new(GameConfig::default());
//! sim.events_mut().subscribe(|e: &CoinCollected| println!("+{}", e.value));
//! sim.spawn(SpawnRequest::Player { position: Vec2::new(64.0, 64.0) });
//! sim.spawn(SpawnRequest::Coin { position: Vec2::new(64.0, 64.0), value: 10 });
//! sim.step(InputState::empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collision;
pub mod command;
pub mod components;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod factory;
pub mod input;
pub mod physics;
pub mod player;
pub mod simulation;

#[cfg(test)]
mod tests;

pub use collision::CollisionRegistry;
pub use config::GameConfig;
pub use entity::{Entity, EntityId, EntityKind, EntityManager};
pub use error::{ConfigError, TransitionError};
pub use simulation::Simulation;
