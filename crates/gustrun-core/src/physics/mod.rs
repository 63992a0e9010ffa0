//! A small deterministic 2D physics world of axis-aligned boxes.
//!
//! # Architecture
//!
//! Bodies live in a generational arena ([`slotmap`]) and are addressed by
//! [`BodyHandle`]. Each body may carry a back-reference to the entity that
//! owns it. [`PhysicsWorld::step`] runs three phases:
//!
//! 1. **Integrate**: gravity, damping and `position += velocity * dt`.
//! 2. **Detect**: every overlapping, filter-compatible pair involving at
//!    least one dynamic body is collected in arena order. The set is diffed
//!    against the previous step, and new pairs are reported as
//!    [`ContactPhase::Begin`] and vanished pairs as [`ContactPhase::End`].
//! 3. **Resolve**: dynamic solid bodies are pushed out of static and
//!    kinematic solids along the axis of least overlap. A body pushed
//!    upwards is marked grounded.
//!
//! Detection runs before resolution, so a body resting on the floor keeps
//! a shallow overlap every step and its contact stays open.
//!
//! Coordinates are meters with y pointing down.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use gustrun_core::physics::{BodyDef, ContactRecorder, PhysicsWorld};
//!
//! let mut world = PhysicsWorld::new(Vec2::new(0.0, 20.0));
//! let floor = world.create_body(BodyDef::fixed(Vec2::new(0.0, 2.0), Vec2::new(10.0, 0.5)));
//! let crate_body = world.create_body(BodyDef::dynamic(Vec2::new(0.0, 1.0), Vec2::splat(0.5)));
//!
//! let mut recorder = ContactRecorder::new();
//! for _ in 0..30 {
//!     world.step(1.0 / 60.0, &mut recorder);
//! }
//!
//! assert!(world.body(crate_body).unwrap().grounded);
//! assert!(world.is_touching(floor, crate_body));
//! ```

pub mod aabb;
pub mod contact;

use std::collections::HashSet;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::entity::EntityId;

pub use aabb::Aabb;
pub use contact::{Contact, ContactListener, ContactPhase, ContactRecorder};

new_key_type! {
    /// Handle to a body in a [`PhysicsWorld`]. Stale handles resolve to `None`.
    pub struct BodyHandle;
}

bitflags! {
    /// Collision categories used to filter which bodies interact.
    ///
    /// Two bodies interact when each one's category is in the other's mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionCategory: u16 {
        /// The player character.
        const PLAYER = 1 << 0;
        /// Enemies.
        const ENEMY = 1 << 1;
        /// Static hazards.
        const HAZARD = 1 << 2;
        /// Coins, gifts and the goal.
        const COLLECTIBLE = 1 << 3;
        /// Projectiles.
        const PROJECTILE = 1 << 4;
        /// Floors.
        const GROUND = 1 << 5;
        /// Solid blocks.
        const OBSTACLE = 1 << 6;
    }
}

impl Default for CollisionCategory {
    fn default() -> Self {
        Self::all()
    }
}

// =============================================================================
// Bodies
// =============================================================================

/// How a body moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves.
    Static,
    /// Moves only by its velocity; ignores gravity and is never pushed.
    Kinematic,
    /// Fully simulated: gravity, damping and push-out from solids.
    Dynamic,
}

/// Parameters for [`PhysicsWorld::create_body`].
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDef {
    /// Motion type.
    pub kind: BodyKind,
    /// Center in meters.
    pub position: Vec2,
    /// Half width and half height in meters.
    pub half_extents: Vec2,
    /// Initial velocity in m/s.
    pub velocity: Vec2,
    /// Multiplier on world gravity.
    pub gravity_scale: f32,
    /// Linear damping coefficient (1/s).
    pub linear_damping: f32,
    /// Sensors report contacts but never push or get pushed.
    pub sensor: bool,
    /// Category bits.
    pub category: CollisionCategory,
    /// Categories this body interacts with.
    pub mask: CollisionCategory,
    /// Owning entity.
    pub owner: Option<EntityId>,
}

impl BodyDef {
    /// A body of `kind` at `position` with the given half extents.
    #[must_use]
    pub fn new(kind: BodyKind, position: Vec2, half_extents: Vec2) -> Self {
        Self {
            kind,
            position,
            half_extents,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            sensor: false,
            category: CollisionCategory::all(),
            mask: CollisionCategory::all(),
            owner: None,
        }
    }

    /// A dynamic body.
    #[must_use]
    pub fn dynamic(position: Vec2, half_extents: Vec2) -> Self {
        Self::new(BodyKind::Dynamic, position, half_extents)
    }

    /// A static body.
    #[must_use]
    pub fn fixed(position: Vec2, half_extents: Vec2) -> Self {
        Self::new(BodyKind::Static, position, half_extents)
    }

    /// A kinematic body.
    #[must_use]
    pub fn kinematic(position: Vec2, half_extents: Vec2) -> Self {
        Self::new(BodyKind::Kinematic, position, half_extents)
    }

    /// Marks the body as a sensor.
    #[must_use]
    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    /// Sets the owning entity.
    #[must_use]
    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the category and mask bits.
    #[must_use]
    pub fn with_filter(mut self, category: CollisionCategory, mask: CollisionCategory) -> Self {
        self.category = category;
        self.mask = mask;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the gravity multiplier.
    #[must_use]
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }
}

/// A simulated box.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Motion type.
    pub kind: BodyKind,
    /// Center in meters.
    pub position: Vec2,
    /// Half width and half height in meters.
    pub half_extents: Vec2,
    /// Velocity in m/s.
    pub velocity: Vec2,
    /// Multiplier on world gravity.
    pub gravity_scale: f32,
    /// Linear damping coefficient (1/s).
    pub linear_damping: f32,
    /// Sensors report contacts but never push or get pushed.
    pub sensor: bool,
    /// Category bits.
    pub category: CollisionCategory,
    /// Categories this body interacts with.
    pub mask: CollisionCategory,
    /// Owning entity.
    pub owner: Option<EntityId>,
    /// Set when the last step pushed this body up out of a solid.
    pub grounded: bool,
}

impl Body {
    fn from_def(def: BodyDef) -> Self {
        Self {
            kind: def.kind,
            position: def.position,
            half_extents: def.half_extents,
            velocity: def.velocity,
            gravity_scale: def.gravity_scale,
            linear_damping: def.linear_damping,
            sensor: def.sensor,
            category: def.category,
            mask: def.mask,
            owner: def.owner,
            grounded: false,
        }
    }

    /// Bounds in meters.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.position - self.half_extents,
            self.position + self.half_extents,
        )
    }

    /// Returns `true` if the two bodies' filters accept each other.
    #[must_use]
    pub fn accepts(&self, other: &Self) -> bool {
        self.category.intersects(other.mask) && other.category.intersects(self.mask)
    }
}

// =============================================================================
// World
// =============================================================================

/// Contact counts from one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Begin events reported.
    pub begins: usize,
    /// End events reported.
    pub ends: usize,
}

type Pair = (BodyHandle, BodyHandle);

/// Owner of every body, and the stepping logic.
#[derive(Debug)]
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, Body>,
    gravity: Vec2,
    /// Pairs overlapping at the end of the last step, in report order.
    touching: Vec<Pair>,
    touching_set: HashSet<Pair>,
}

impl PhysicsWorld {
    /// Creates an empty world with the given gravity (m/s², y-down).
    #[must_use]
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            gravity,
            touching: Vec::new(),
            touching_set: HashSet::new(),
        }
    }

    /// World gravity.
    #[must_use]
    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Replaces world gravity.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Adds a body and returns its handle.
    pub fn create_body(&mut self, def: BodyDef) -> BodyHandle {
        let handle = self.bodies.insert(Body::from_def(def));
        trace!(?handle, "body created");
        handle
    }

    /// Removes a body. Its open contacts are dropped without an End event.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(handle)?;
        self.touching.retain(|&(a, b)| a != handle && b != handle);
        self.touching_set.retain(|&(a, b)| a != handle && b != handle);
        trace!(?handle, "body destroyed");
        Some(body)
    }

    /// Borrows a body.
    #[must_use]
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutably borrows a body.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Sets a body's velocity. Returns `false` for stale handles.
    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        self.bodies
            .get_mut(handle)
            .map(|body| body.velocity = velocity)
            .is_some()
    }

    /// Adds `impulse` to a dynamic body's velocity (bodies have unit mass).
    ///
    /// Returns `false` for stale handles and non-dynamic bodies.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) if body.kind == BodyKind::Dynamic => {
                body.velocity += impulse;
                true
            }
            _ => false,
        }
    }

    /// Iterates over every body in arena order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter()
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the world has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Returns `true` if `a` and `b` overlapped at the last step.
    #[must_use]
    pub fn is_touching(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.touching_set.contains(&(a, b)) || self.touching_set.contains(&(b, a))
    }

    /// Pairs overlapping at the last step, in report order.
    #[must_use]
    pub fn touching_pairs(&self) -> &[(BodyHandle, BodyHandle)] {
        &self.touching
    }

    /// Advances the world by `dt` seconds, reporting contact begin/end
    /// events to `listener` while the step runs.
    pub fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) -> StepStats {
        self.integrate(dt);
        let current = self.detect();
        let stats = self.report(current, listener);
        self.resolve();
        stats
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            match body.kind {
                BodyKind::Static => {}
                BodyKind::Kinematic => body.position += body.velocity * dt,
                BodyKind::Dynamic => {
                    body.velocity += gravity * body.gravity_scale * dt;
                    if body.linear_damping > 0.0 {
                        body.velocity *= 1.0 / (1.0 + dt * body.linear_damping);
                    }
                    body.position += body.velocity * dt;
                    body.grounded = false;
                }
            }
        }
    }

    fn detect(&self) -> Vec<(Pair, Vec2)> {
        let bodies: Vec<(BodyHandle, &Body, Aabb)> = self
            .bodies
            .iter()
            .map(|(handle, body)| (handle, body, body.aabb()))
            .collect();

        let mut pairs = Vec::new();
        for (i, (ha, a, box_a)) in bodies.iter().enumerate() {
            for (hb, b, box_b) in &bodies[i + 1..] {
                if a.kind != BodyKind::Dynamic && b.kind != BodyKind::Dynamic {
                    continue;
                }
                if !a.accepts(b) || !box_a.intersects(box_b) {
                    continue;
                }
                pairs.push(((*ha, *hb), box_a.contact_normal(box_b)));
            }
        }
        pairs
    }

    fn report(&mut self, current: Vec<(Pair, Vec2)>, listener: &mut dyn ContactListener) -> StepStats {
        let mut stats = StepStats::default();
        let current_set: HashSet<Pair> = current.iter().map(|(pair, _)| *pair).collect();

        for &((a, b), normal) in &current {
            if self.touching_set.contains(&(a, b)) {
                continue;
            }
            stats.begins += 1;
            listener.on_contact(&self.contact(ContactPhase::Begin, a, b, normal));
        }

        for &(a, b) in &self.touching {
            if current_set.contains(&(a, b)) {
                continue;
            }
            let (Some(body_a), Some(body_b)) = (self.bodies.get(a), self.bodies.get(b)) else {
                continue;
            };
            let normal = body_a.aabb().contact_normal(&body_b.aabb());
            stats.ends += 1;
            listener.on_contact(&self.contact(ContactPhase::End, a, b, normal));
        }

        self.touching = current.into_iter().map(|(pair, _)| pair).collect();
        self.touching_set = current_set;
        stats
    }

    fn contact(&self, phase: ContactPhase, a: BodyHandle, b: BodyHandle, normal: Vec2) -> Contact {
        Contact {
            phase,
            body_a: a,
            body_b: b,
            owner_a: self.bodies.get(a).and_then(|body| body.owner),
            owner_b: self.bodies.get(b).and_then(|body| body.owner),
            normal,
        }
    }

    fn resolve(&mut self) {
        let solids: Vec<(Aabb, CollisionCategory, CollisionCategory)> = self
            .bodies
            .values()
            .filter(|body| body.kind != BodyKind::Dynamic && !body.sensor)
            .map(|body| (body.aabb(), body.category, body.mask))
            .collect();

        for body in self.bodies.values_mut() {
            if body.kind != BodyKind::Dynamic || body.sensor {
                continue;
            }
            for (solid, category, mask) in &solids {
                if !(body.category.intersects(*mask) && category.intersects(body.mask)) {
                    continue;
                }
                let bounds = body.aabb();
                if !bounds.intersects(solid) {
                    continue;
                }
                let overlap = bounds.overlap(solid);
                if overlap.x < overlap.y {
                    let sign = if body.position.x < solid.center().x { -1.0 } else { 1.0 };
                    body.position.x += sign * overlap.x;
                    if body.velocity.x * sign < 0.0 {
                        body.velocity.x = 0.0;
                    }
                } else {
                    let sign = if body.position.y < solid.center().y { -1.0 } else { 1.0 };
                    body.position.y += sign * overlap.y;
                    if body.velocity.y * sign < 0.0 {
                        body.velocity.y = 0.0;
                    }
                    if sign < 0.0 {
                        body.grounded = true;
                    }
                }
            }
        }
    }
}
