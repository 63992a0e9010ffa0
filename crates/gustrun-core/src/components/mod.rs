//! Concrete component types.
//!
//! | Component | Data | Per-frame behavior |
//! |-----------|------|--------------------|
//! | [`Transform`] | pixel center and size | none |
//! | [`PhysicsComponent`] | body handle | copies body position into `Transform` |
//! | [`RenderComponent`] | texture, tint, visibility | none |
//! | [`HealthComponent`] | hit points, protection | counts down hit grace |
//! | [`ScoreComponent`] | points, coins | none |
//! | [`CollisionComponent`] | category and mask | none |
//! | [`MovementComponent`] | speeds, facing | cooldown, sprite flip |
//! | [`AiComponent`] | patrol bounds | patrols and hops |
//! | [`ProjectileComponent`] | lifetime, damage | despawns on expiry |
//!
//! Pickups ([`CollectibleComponent`], [`GiftComponent`], [`GoalComponent`])
//! are plain data read by collision handlers. The player's state and effect
//! timer live in [`crate::player`].

mod ai;
mod body;
mod collision;
mod health;
mod movement;
mod pickup;
mod projectile;
mod render;
mod transform;

pub use ai::AiComponent;
pub use body::{sync_transform, PhysicsComponent};
pub use collision::CollisionComponent;
pub use health::{HealthComponent, ScoreComponent};
pub use movement::MovementComponent;
pub use pickup::{CollectibleComponent, GiftComponent, GoalComponent};
pub use projectile::ProjectileComponent;
pub use render::{Color, RenderComponent};
pub use transform::Transform;
