//! Entities, their identifiers and kinds, and per-entity component storage.
//!
//! This module provides:
//! - [`EntityId`]: process-unique identifier
//! - [`EntityKind`]: leaf gameplay type used for collision dispatch
//! - [`EntityType`]: compile-time marker for a kind (see [`kinds`])
//! - [`Entity`]: id + kind + active flag + [`ComponentStore`]
//! - [`EntityManager`]: owner of every live entity
//!
//! # Architecture
//!
//! An entity is a thin container. Behavior lives in components, which are
//! updated in insertion order once per frame. Deactivating an entity hides it
//! from updates and collision dispatch immediately, but its storage is only
//! reclaimed at the next [`EntityManager::compact`].
//!
//! # Example
//!
//! ```
//! use gustrun_core::components::Transform;
//! use gustrun_core::entity::{Entity, EntityKind, EntityManager};
//! use glam::Vec2;
//!
//! let mut coin = Entity::new(EntityManager::generate_id(), EntityKind::Coin);
//! coin.add_component(Transform::new(Vec2::new(100.0, 50.0), Vec2::splat(16.0)));
//!
//! assert!(coin.is_active());
//! assert!(coin.has_component::<Transform>());
//! assert_eq!(coin.component_owner::<Transform>(), Some(coin.id()));
//! ```

pub mod component;
pub mod manager;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::Transform;
use crate::physics::Aabb;

pub use component::{AsAny, Component, ComponentContext, FrameContext};
pub use manager::EntityManager;
pub use store::ComponentStore;

// =============================================================================
// EntityId
// =============================================================================

/// Unique identifier for an entity.
///
/// Ids handed out by [`EntityManager::generate_id`] are unique for the whole
/// process and strictly increasing, so ordering by id is ordering by creation.
///
/// # Example
///
/// ```
/// use gustrun_core::entity::EntityId;
///
/// let id = EntityId::new(7);
/// assert_eq!(id.as_u64(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

// =============================================================================
// EntityKind
// =============================================================================

/// Leaf gameplay type of an entity.
///
/// Collision handlers are keyed on exact kinds: a handler for
/// `(Player, Enemy)` never fires for any other pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The controllable character.
    Player,
    /// Collectible that adds score.
    Coin,
    /// Collectible that grants a timed effect.
    Gift,
    /// Patrolling enemy.
    Enemy,
    /// Static hazard.
    Spike,
    /// Player-fired projectile.
    Projectile,
    /// Walkable floor.
    Ground,
    /// Solid block.
    Obstacle,
    /// Level exit.
    Goal,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Player,
        Self::Coin,
        Self::Gift,
        Self::Enemy,
        Self::Spike,
        Self::Projectile,
        Self::Ground,
        Self::Obstacle,
        Self::Goal,
    ];

    /// Display name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Coin => "Coin",
            Self::Gift => "Gift",
            Self::Enemy => "Enemy",
            Self::Spike => "Spike",
            Self::Projectile => "Projectile",
            Self::Ground => "Ground",
            Self::Obstacle => "Obstacle",
            Self::Goal => "Goal",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compile-time marker naming one [`EntityKind`].
///
/// Lets handlers be registered with type parameters, e.g.
/// `registry.register::<Player, Coin>(..)`.
pub trait EntityType {
    /// The kind this marker stands for.
    const KIND: EntityKind;
}

/// Marker types for every [`EntityKind`].
pub mod kinds {
    use super::{EntityKind, EntityType};

    macro_rules! entity_markers {
        ($($name:ident),* $(,)?) => {
            $(
                #[doc = concat!("Marker for [`EntityKind::", stringify!($name), "`].")]
                #[derive(Debug, Clone, Copy)]
                pub struct $name;

                impl EntityType for $name {
                    const KIND: EntityKind = EntityKind::$name;
                }
            )*
        };
    }

    entity_markers!(Player, Coin, Gift, Enemy, Spike, Projectile, Ground, Obstacle, Goal);
}

// =============================================================================
// Entity
// =============================================================================

/// An entity: identity, kind, active flag and components.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    active: bool,
    components: ComponentStore,
}

impl Entity {
    /// Creates an active entity with no components.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            active: true,
            components: ComponentStore::new(id),
        }
    }

    /// Returns the entity's id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns `false` once the entity has been marked for removal.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Sets the active flag. Inactive entities are skipped by updates and
    /// collision dispatch and removed at the next compaction.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Attaches `component`, replacing any existing one of the same type.
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        self.components.insert(component)
    }

    /// Borrows the component of type `T`.
    #[must_use]
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.get::<T>()
    }

    /// Mutably borrows the component of type `T`.
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.get_mut::<T>()
    }

    /// Returns `true` if a component of type `T` is attached.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.components.contains::<T>()
    }

    /// Detaches the component of type `T`.
    pub fn remove_component<T: Component>(&mut self) -> Option<T> {
        self.components.remove::<T>()
    }

    /// Returns this entity's id if it carries a `T`.
    #[must_use]
    pub fn component_owner<T: Component>(&self) -> Option<EntityId> {
        self.components.owner_of::<T>()
    }

    /// Read access to the component store.
    #[must_use]
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    /// Pixel-space bounds from the [`Transform`], if any.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.get_component::<Transform>().map(Transform::bounds)
    }

    /// Updates every component once, in insertion order.
    ///
    /// Does nothing for inactive entities.
    pub fn update(&mut self, dt: f32, frame: &mut FrameContext<'_>) {
        if self.active {
            self.components.update_all(dt, frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_raw_value() {
            assert!(EntityId::new(1) < EntityId::new(2));
        }

        #[test]
        fn u64_conversions_round_trip() {
            let id: EntityId = 42_u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 42);
        }

        #[test]
        fn debug_and_display() {
            let id = EntityId::new(5);
            assert_eq!(format!("{id:?}"), "EntityId(5)");
            assert_eq!(format!("{id}"), "5");
        }
    }

    mod entity_kind_tests {
        use super::*;
        use crate::entity::kinds;

        #[test]
        fn markers_name_their_kind() {
            assert_eq!(<kinds::Player as EntityType>::KIND, EntityKind::Player);
            assert_eq!(<kinds::Goal as EntityType>::KIND, EntityKind::Goal);
        }

        #[test]
        fn display_matches_name() {
            for kind in EntityKind::ALL {
                assert_eq!(kind.to_string(), kind.name());
            }
        }
    }

    mod entity_tests {
        use super::*;
        use glam::Vec2;

        #[test]
        fn new_entity_is_active_and_empty() {
            let entity = Entity::new(EntityId::new(1), EntityKind::Spike);
            assert!(entity.is_active());
            assert!(entity.components().is_empty());
            assert!(entity.bounds().is_none());
        }

        #[test]
        fn set_active_toggles() {
            let mut entity = Entity::new(EntityId::new(1), EntityKind::Coin);
            entity.set_active(false);
            assert!(!entity.is_active());
            entity.set_active(true);
            assert!(entity.is_active());
        }

        #[test]
        fn bounds_follow_transform() {
            let mut entity = Entity::new(EntityId::new(1), EntityKind::Coin);
            entity.add_component(Transform::new(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0)));
            let bounds = entity.bounds().unwrap();
            assert_eq!(bounds.min, Vec2::new(8.0, 17.0));
            assert_eq!(bounds.max, Vec2::new(12.0, 23.0));
        }

        #[test]
        fn component_owner_is_entity_id() {
            let mut entity = Entity::new(EntityId::new(77), EntityKind::Goal);
            assert!(entity.component_owner::<Transform>().is_none());
            entity.add_component(Transform::new(Vec2::ZERO, Vec2::ONE));
            assert_eq!(entity.component_owner::<Transform>(), Some(EntityId::new(77)));
        }
    }
}
