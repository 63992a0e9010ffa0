//! Ownership and lifecycle of every entity in the simulation.
//!
//! # Lifecycle
//!
//! 1. Ids come from [`EntityManager::generate_id`], a process-wide counter.
//! 2. Entities created outside a pass are added with
//!    [`EntityManager::add_entity`] and are visible immediately.
//! 3. Entities created during a pass are queued with
//!    [`EntityManager::queue_spawn`] and only become visible after
//!    [`EntityManager::compact`].
//! 4. Entities marked inactive stay in storage until the next compaction,
//!    which also destroys their physics bodies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::components::PhysicsComponent;
use crate::physics::PhysicsWorld;

use super::component::FrameContext;
use super::{Entity, EntityId};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of one [`EntityManager::compact`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactStats {
    /// Inactive entities released.
    pub removed: usize,
    /// Pending entities admitted.
    pub admitted: usize,
}

/// Owns every entity, keeps them in creation order and handles deferred
/// spawning and removal.
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
    pending: Vec<Entity>,
}

impl EntityManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id, unique and strictly increasing across the process.
    ///
    /// Safe to call from any thread.
    pub fn generate_id() -> EntityId {
        EntityId::new(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Adds `entity` immediately and returns its id.
    ///
    /// Intended for level setup. Entities created while a pass is iterating
    /// must go through [`EntityManager::queue_spawn`] instead.
    ///
    /// An entity whose id is already stored or queued is dropped; the id is
    /// still returned and keeps naming the entity that claimed it first.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        if self.is_claimed(id) {
            warn!(%id, kind = %entity.kind(), "duplicate entity id, entity dropped");
            return id;
        }
        trace!(%id, kind = %entity.kind(), "entity added");
        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Queues `entity` to be admitted at the next compaction.
    ///
    /// Duplicate ids are dropped the same way [`EntityManager::add_entity`]
    /// drops them.
    pub fn queue_spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        if self.is_claimed(id) {
            warn!(%id, kind = %entity.kind(), "duplicate entity id, spawn dropped");
            return id;
        }
        trace!(%id, kind = %entity.kind(), "entity queued");
        self.pending.push(entity);
        id
    }

    fn is_claimed(&self, id: EntityId) -> bool {
        self.index.contains_key(&id) || self.pending.iter().any(|e| e.id() == id)
    }

    /// Borrows the entity with `id`, active or not.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    /// Mutably borrows the entity with `id`, active or not.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let index = *self.index.get(&id)?;
        self.entities.get_mut(index)
    }

    /// Borrows two distinct entities mutably at once.
    ///
    /// Returns `None` if either id is unknown or both ids are the same.
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        let ia = *self.index.get(&a)?;
        let ib = *self.index.get(&b)?;
        self.pair_at_mut(ia, ib)
    }

    /// Borrows the entities at storage positions `i` and `j` mutably.
    ///
    /// Returns `None` if the positions are equal or out of range.
    pub fn pair_at_mut(&mut self, i: usize, j: usize) -> Option<(&mut Entity, &mut Entity)> {
        if i == j || i >= self.entities.len() || j >= self.entities.len() {
            return None;
        }
        if i < j {
            let (left, right) = self.entities.split_at_mut(j);
            Some((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.entities.split_at_mut(i);
            Some((&mut right[0], &mut left[j]))
        }
    }

    /// Every stored entity in creation order, including inactive ones that
    /// have not been compacted yet. Pending entities are not included.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Mutable iteration over stored entities in creation order.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Ids of active entities in creation order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.is_active())
            .map(Entity::id)
            .collect()
    }

    /// Number of stored entities (active or not, excluding pending).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities waiting for the next compaction.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs [`EntityManager::update_components`] then [`EntityManager::compact`].
    pub fn update(&mut self, dt: f32, frame: &mut FrameContext<'_>) -> CompactStats {
        self.update_components(dt, frame);
        self.compact(frame.physics)
    }

    /// Updates every active entity's components once, in creation order.
    pub fn update_components(&mut self, dt: f32, frame: &mut FrameContext<'_>) {
        for entity in &mut self.entities {
            entity.update(dt, frame);
        }
    }

    /// Removes inactive entities (destroying their physics bodies), then
    /// admits pending entities in the order they were queued.
    pub fn compact(&mut self, physics: &mut PhysicsWorld) -> CompactStats {
        let before = self.entities.len();
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(before + self.pending.len());
        for entity in self.entities.drain(..) {
            if entity.is_active() {
                kept.push(entity);
            } else {
                removed.push(entity);
            }
        }
        for entity in &removed {
            if let Some(body) = entity.get_component::<PhysicsComponent>() {
                physics.destroy_body(body.handle());
            }
            trace!(id = %entity.id(), kind = %entity.kind(), "entity removed");
        }

        let admitted = self.pending.len();
        kept.append(&mut self.pending);
        self.entities = kept;
        self.reindex();

        let stats = CompactStats {
            removed: removed.len(),
            admitted,
        };
        if stats != CompactStats::default() {
            debug!(
                removed = stats.removed,
                admitted = stats.admitted,
                live = self.entities.len(),
                "entities compacted"
            );
        }
        stats
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, entity) in self.entities.iter().enumerate() {
            self.index.insert(entity.id(), i);
        }
    }
}
