//! Collision dispatch: exact kind pairs mapped to gameplay reactions.
//!
//! # Architecture
//!
//! A [`CollisionRegistry`] maps a [`HandlerKey`] `(major, minor)` to a
//! closure taking the two entities in that order. For a candidate pair
//! `(a, b)` dispatch tries `(kind(a), kind(b))` first, then
//! `(kind(b), kind(a))` with the arguments swapped, and otherwise does
//! nothing. A miss is expected control flow. It is neither logged nor an
//! error, and [`CollisionRegistry::unhandled_pairs`] audits coverage instead.
//!
//! Candidate pairs come from one of two sources:
//! - [`ContactBridge`]: begin/end contacts reported by the physics step
//! - [`CollisionRegistry::check_all_collisions`]: an all-pairs overlap test
//!   over entity transforms
//!
//! Handlers receive a [`CollisionContext`]. Anything structural (spawning,
//! moving bodies, changing player state) goes through its command queue.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use gustrun_core::collision::{CollisionContext, CollisionRegistry, DispatchOutcome};
//! use gustrun_core::command::CommandQueue;
//! use gustrun_core::config::GameConfig;
//! use gustrun_core::entity::kinds::{Coin, Player};
//! use gustrun_core::entity::{Entity, EntityKind, EntityManager};
//! use gustrun_core::events::EventBus;
//!
//! let mut registry = CollisionRegistry::new();
//! registry.register::<Player, Coin>(|_player, coin, _ctx| coin.set_active(false));
//!
//! let mut player = Entity::new(EntityManager::generate_id(), EntityKind::Player);
//! let mut coin = Entity::new(EntityManager::generate_id(), EntityKind::Coin);
//! let (mut commands, mut events, config) = (CommandQueue::new(), EventBus::new(), GameConfig::default());
//! let mut ctx = CollisionContext::new(&mut commands, &mut events, &config);
//!
//! // Reported in the "wrong" order: the handler still runs, with arguments swapped.
//! assert_eq!(registry.dispatch(&mut coin, &mut player, &mut ctx), DispatchOutcome::Swapped);
//! assert!(!coin.is_active());
//! ```

mod bridge;
mod handlers;

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use tracing::trace;

use crate::command::CommandQueue;
use crate::config::GameConfig;
use crate::entity::{Entity, EntityKind, EntityManager, EntityType};
use crate::events::EventBus;

pub use bridge::{BridgeStats, ContactBridge};
pub use handlers::install_default_handlers;

/// Services available to collision handlers.
pub struct CollisionContext<'a> {
    /// Deferred structural changes.
    pub commands: &'a mut CommandQueue,
    /// Notification bus.
    pub events: &'a mut EventBus,
    /// Active configuration.
    pub config: &'a GameConfig,
    /// Unit normal pointing from the handler's first entity toward its
    /// second. With y pointing down, `normal.y > 0` means the first entity
    /// is above the second.
    pub normal: Vec2,
}

impl<'a> CollisionContext<'a> {
    /// Creates a context with a zero normal.
    pub fn new(
        commands: &'a mut CommandQueue,
        events: &'a mut EventBus,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            commands,
            events,
            config,
            normal: Vec2::ZERO,
        }
    }
}

/// Ordered pair of entity kinds a handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerKey {
    /// Kind of the handler's first argument.
    pub major: EntityKind,
    /// Kind of the handler's second argument.
    pub minor: EntityKind,
}

impl HandlerKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(major: EntityKind, minor: EntityKind) -> Self {
        Self { major, minor }
    }

    /// Key for the marker types `A` and `B`.
    #[must_use]
    pub const fn of<A: EntityType, B: EntityType>() -> Self {
        Self::new(A::KIND, B::KIND)
    }

    /// The same pair in the other order.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self::new(self.minor, self.major)
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.major, self.minor)
    }
}

/// Type-erased collision reaction.
pub type CollisionHandler = Box<dyn Fn(&mut Entity, &mut Entity, &mut CollisionContext<'_>)>;

/// How a candidate pair was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Found under `(kind(a), kind(b))`.
    Direct,
    /// Found under `(kind(b), kind(a))`; the handler got `(b, a)`.
    Swapped,
    /// No handler for either order.
    Unhandled,
}

impl DispatchOutcome {
    /// `true` if a handler ran.
    #[must_use]
    pub const fn is_handled(self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

/// Counters from one [`CollisionRegistry::check_all_collisions`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadPhaseStats {
    /// Active pairs with bounds that were tested.
    pub tested: usize,
    /// Pairs whose bounds overlapped.
    pub overlapping: usize,
    /// Overlapping pairs a handler ran for.
    pub handled: usize,
}

/// `(major, minor)` → handler tables for contact begin and contact end.
#[derive(Default)]
pub struct CollisionRegistry {
    begin: HashMap<HandlerKey, CollisionHandler>,
    end: HashMap<HandlerKey, CollisionHandler>,
}

impl CollisionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the standard gameplay reactions installed.
    #[must_use]
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        install_default_handlers(&mut registry);
        registry
    }

    /// Registers a begin-contact handler for `(A, B)`.
    ///
    /// The handler always receives an `A` first and a `B` second. Returns
    /// `true` if it replaced an earlier handler for the same ordered pair.
    pub fn register<A: EntityType, B: EntityType>(
        &mut self,
        handler: impl Fn(&mut Entity, &mut Entity, &mut CollisionContext<'_>) + 'static,
    ) -> bool {
        self.register_kinds(A::KIND, B::KIND, handler)
    }

    /// Registers a begin-contact handler for `(major, minor)`.
    pub fn register_kinds(
        &mut self,
        major: EntityKind,
        minor: EntityKind,
        handler: impl Fn(&mut Entity, &mut Entity, &mut CollisionContext<'_>) + 'static,
    ) -> bool {
        self.begin
            .insert(HandlerKey::new(major, minor), Box::new(handler))
            .is_some()
    }

    /// Registers an end-contact handler for `(A, B)`.
    pub fn register_end<A: EntityType, B: EntityType>(
        &mut self,
        handler: impl Fn(&mut Entity, &mut Entity, &mut CollisionContext<'_>) + 'static,
    ) -> bool {
        self.end
            .insert(HandlerKey::of::<A, B>(), Box::new(handler))
            .is_some()
    }

    /// Removes the begin-contact handler for exactly `(major, minor)`.
    pub fn unregister(&mut self, major: EntityKind, minor: EntityKind) -> bool {
        self.begin.remove(&HandlerKey::new(major, minor)).is_some()
    }

    /// `true` if a begin-contact handler exists for the pair in either order.
    #[must_use]
    pub fn handles(&self, a: EntityKind, b: EntityKind) -> bool {
        let key = HandlerKey::new(a, b);
        self.begin.contains_key(&key) || self.begin.contains_key(&key.swapped())
    }

    /// Number of begin-contact handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.begin.len()
    }

    /// `true` if no begin-contact handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin.is_empty()
    }

    /// Every unordered kind pair with no begin-contact handler in either
    /// order, sorted.
    #[must_use]
    pub fn unhandled_pairs(&self) -> Vec<HandlerKey> {
        let mut missing = Vec::new();
        for (i, &a) in EntityKind::ALL.iter().enumerate() {
            for &b in &EntityKind::ALL[i..] {
                if !self.handles(a, b) {
                    missing.push(HandlerKey::new(a, b));
                }
            }
        }
        missing
    }

    /// Runs the begin-contact handler for `(a, b)`, if any.
    pub fn dispatch(
        &self,
        a: &mut Entity,
        b: &mut Entity,
        ctx: &mut CollisionContext<'_>,
    ) -> DispatchOutcome {
        Self::dispatch_in(&self.begin, a, b, ctx)
    }

    /// Runs the end-contact handler for `(a, b)`, if any.
    pub fn dispatch_end(
        &self,
        a: &mut Entity,
        b: &mut Entity,
        ctx: &mut CollisionContext<'_>,
    ) -> DispatchOutcome {
        Self::dispatch_in(&self.end, a, b, ctx)
    }

    fn dispatch_in(
        table: &HashMap<HandlerKey, CollisionHandler>,
        a: &mut Entity,
        b: &mut Entity,
        ctx: &mut CollisionContext<'_>,
    ) -> DispatchOutcome {
        let key = HandlerKey::new(a.kind(), b.kind());
        if let Some(handler) = table.get(&key) {
            trace!(%key, a = %a.id(), b = %b.id(), "collision dispatched");
            handler(a, b, ctx);
            return DispatchOutcome::Direct;
        }
        if let Some(handler) = table.get(&key.swapped()) {
            trace!(key = %key.swapped(), a = %b.id(), b = %a.id(), "collision dispatched");
            ctx.normal = -ctx.normal;
            handler(b, a, ctx);
            ctx.normal = -ctx.normal;
            return DispatchOutcome::Swapped;
        }
        DispatchOutcome::Unhandled
    }

    /// Tests every pair of active entities with a [`Transform`](crate::components::Transform)
    /// for overlap, in storage order, and dispatches the overlapping ones.
    ///
    /// An entity deactivated by an earlier handler in the same pass is
    /// skipped for the rest of the pass. Entities spawned by handlers are
    /// queued, so the set of pairs is fixed when the pass starts.
    pub fn check_all_collisions(
        &self,
        entities: &mut EntityManager,
        ctx: &mut CollisionContext<'_>,
    ) -> BroadPhaseStats {
        let mut stats = BroadPhaseStats::default();
        let count = entities.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let Some((a, b)) = entities.pair_at_mut(i, j) else {
                    continue;
                };
                if !a.is_active() || !b.is_active() {
                    continue;
                }
                let (Some(box_a), Some(box_b)) = (a.bounds(), b.bounds()) else {
                    continue;
                };
                stats.tested += 1;
                if !box_a.intersects(&box_b) {
                    continue;
                }
                stats.overlapping += 1;
                ctx.normal = box_a.contact_normal(&box_b);
                if self.dispatch(a, b, ctx).is_handled() {
                    stats.handled += 1;
                }
            }
        }
        stats
    }
}

impl fmt::Debug for CollisionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut begin: Vec<_> = self.begin.keys().copied().collect();
        begin.sort();
        let mut end: Vec<_> = self.end.keys().copied().collect();
        end.sort();
        f.debug_struct("CollisionRegistry")
            .field("begin", &begin)
            .field("end", &end)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Transform;
    use crate::entity::kinds::{Coin, Enemy, Player, Spike};
    use crate::entity::EntityId;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(EntityId, EntityId)>>>;

    fn recording(log: &Log) -> impl Fn(&mut Entity, &mut Entity, &mut CollisionContext<'_>) {
        let log = Rc::clone(log);
        move |a, b, _ctx| log.borrow_mut().push((a.id(), b.id()))
    }

    fn entity(id: u64, kind: EntityKind) -> Entity {
        Entity::new(EntityId::new(id), kind)
    }

    struct Services {
        commands: CommandQueue,
        events: EventBus,
        config: GameConfig,
    }

    impl Services {
        fn new() -> Self {
            Self {
                commands: CommandQueue::new(),
                events: EventBus::new(),
                config: GameConfig::default(),
            }
        }

        fn ctx(&mut self) -> CollisionContext<'_> {
            CollisionContext::new(&mut self.commands, &mut self.events, &self.config)
        }
    }

    mod dispatch_tests {
        use super::*;

        #[test]
        fn direct_order_calls_handler_with_given_order() {
            let log: Log = Rc::default();
            let mut registry = CollisionRegistry::new();
            registry.register::<Player, Coin>(recording(&log));

            let (mut p, mut c) = (entity(1, EntityKind::Player), entity(2, EntityKind::Coin));
            let mut services = Services::new();
            let outcome = registry.dispatch(&mut p, &mut c, &mut services.ctx());

            assert_eq!(outcome, DispatchOutcome::Direct);
            assert_eq!(*log.borrow(), vec![(EntityId::new(1), EntityId::new(2))]);
        }

        #[test]
        fn reversed_order_swaps_arguments() {
            let log: Log = Rc::default();
            let mut registry = CollisionRegistry::new();
            registry.register::<Player, Coin>(recording(&log));

            let (mut p, mut c) = (entity(1, EntityKind::Player), entity(2, EntityKind::Coin));
            let mut services = Services::new();
            let outcome = registry.dispatch(&mut c, &mut p, &mut services.ctx());

            assert_eq!(outcome, DispatchOutcome::Swapped);
            assert_eq!(*log.borrow(), vec![(EntityId::new(1), EntityId::new(2))]);
        }

        #[test]
        fn swapped_dispatch_flips_normal_for_handler() {
            let seen = Rc::new(RefCell::new(Vec2::ZERO));
            let mut registry = CollisionRegistry::new();
            let sink = Rc::clone(&seen);
            registry.register::<Player, Enemy>(move |_, _, ctx| *sink.borrow_mut() = ctx.normal);

            let (mut p, mut e) = (entity(1, EntityKind::Player), entity(2, EntityKind::Enemy));
            let mut services = Services::new();
            let mut ctx = services.ctx();
            // Enemy is reported first and sits below the player.
            ctx.normal = Vec2::new(0.0, -1.0);
            registry.dispatch(&mut e, &mut p, &mut ctx);

            assert_eq!(*seen.borrow(), Vec2::new(0.0, 1.0));
            assert_eq!(ctx.normal, Vec2::new(0.0, -1.0));
        }

        #[test]
        fn unregistered_pair_is_silent_no_op() {
            let registry = CollisionRegistry::new();
            let (mut a, mut b) = (entity(1, EntityKind::Coin), entity(2, EntityKind::Gift));
            let mut services = Services::new();
            let outcome = registry.dispatch(&mut a, &mut b, &mut services.ctx());

            assert_eq!(outcome, DispatchOutcome::Unhandled);
            assert!(a.is_active() && b.is_active());
            assert!(services.commands.is_empty());
        }

        #[test]
        fn exact_kind_only() {
            let log: Log = Rc::default();
            let mut registry = CollisionRegistry::new();
            registry.register::<Player, Coin>(recording(&log));

            let (mut p, mut s) = (entity(1, EntityKind::Player), entity(2, EntityKind::Spike));
            let mut services = Services::new();
            registry.dispatch(&mut p, &mut s, &mut services.ctx());
            assert!(log.borrow().is_empty());
        }

        #[test]
        fn end_table_is_separate() {
            let log: Log = Rc::default();
            let mut registry = CollisionRegistry::new();
            registry.register_end::<Player, Spike>(recording(&log));

            let (mut p, mut s) = (entity(1, EntityKind::Player), entity(2, EntityKind::Spike));
            let mut services = Services::new();
            assert_eq!(
                registry.dispatch(&mut p, &mut s, &mut services.ctx()),
                DispatchOutcome::Unhandled
            );
            assert_eq!(
                registry.dispatch_end(&mut s, &mut p, &mut services.ctx()),
                DispatchOutcome::Swapped
            );
            assert_eq!(log.borrow().len(), 1);
        }
    }

    mod registration_tests {
        use super::*;

        #[test]
        fn reregistering_replaces() {
            let mut registry = CollisionRegistry::new();
            assert!(!registry.register::<Player, Coin>(|_, _, _| {}));
            assert!(registry.register::<Player, Coin>(|_, _, _| {}));
            assert_eq!(registry.len(), 1);
        }

        #[test]
        fn handles_checks_both_orders() {
            let mut registry = CollisionRegistry::new();
            registry.register::<Player, Coin>(|_, _, _| {});
            assert!(registry.handles(EntityKind::Coin, EntityKind::Player));
            assert!(!registry.handles(EntityKind::Coin, EntityKind::Gift));
            assert!(registry.unregister(EntityKind::Player, EntityKind::Coin));
            assert!(registry.is_empty());
        }

        #[test]
        fn unhandled_pairs_covers_full_matrix() {
            let registry = CollisionRegistry::new();
            // 9 kinds → 9 * 10 / 2 unordered pairs including self-pairs.
            assert_eq!(registry.unhandled_pairs().len(), 45);

            let defaults = CollisionRegistry::with_default_handlers();
            let missing = defaults.unhandled_pairs();
            assert_eq!(missing.len(), 45 - defaults.len());
            assert!(!missing.contains(&HandlerKey::new(EntityKind::Player, EntityKind::Coin)));
            assert!(missing.contains(&HandlerKey::new(EntityKind::Coin, EntityKind::Gift)));
        }
    }

    mod broad_phase_tests {
        use super::*;

        fn placed(kind: EntityKind, x: f32) -> Entity {
            let mut e = Entity::new(EntityManager::generate_id(), kind);
            e.add_component(Transform::new(Vec2::new(x, 0.0), Vec2::splat(10.0)));
            e
        }

        #[test]
        fn only_overlapping_registered_pairs_fire() {
            let log: Log = Rc::default();
            let mut registry = CollisionRegistry::new();
            registry.register::<Player, Coin>(recording(&log));

            let mut entities = EntityManager::new();
            let player = entities.add_entity(placed(EntityKind::Player, 0.0));
            let near = entities.add_entity(placed(EntityKind::Coin, 5.0));
            entities.add_entity(placed(EntityKind::Coin, 50.0));
            entities.add_entity(placed(EntityKind::Spike, 3.0));

            let mut services = Services::new();
            let stats = registry.check_all_collisions(&mut entities, &mut services.ctx());

            assert_eq!(*log.borrow(), vec![(player, near)]);
            assert_eq!(stats.handled, 1);
            // player/near, player/spike, near/spike overlap.
            assert_eq!(stats.overlapping, 3);
            assert_eq!(stats.tested, 6);
        }

        #[test]
        fn entities_without_transform_are_ignored() {
            let mut registry = CollisionRegistry::new();
            registry.register::<Player, Coin>(|_, _, _| panic!("must not fire"));

            let mut entities = EntityManager::new();
            entities.add_entity(placed(EntityKind::Player, 0.0));
            entities.add_entity(Entity::new(EntityManager::generate_id(), EntityKind::Coin));

            let mut services = Services::new();
            let stats = registry.check_all_collisions(&mut entities, &mut services.ctx());
            assert_eq!(stats, BroadPhaseStats::default());
        }

        #[test]
        fn deactivated_entity_skipped_for_rest_of_pass() {
            let log: Log = Rc::default();
            let mut registry = CollisionRegistry::new();
            let sink = Rc::clone(&log);
            registry.register::<Player, Coin>(move |p, c, _| {
                sink.borrow_mut().push((p.id(), c.id()));
                c.set_active(false);
            });

            let mut entities = EntityManager::new();
            let coin = entities.add_entity(placed(EntityKind::Coin, 0.0));
            let first = entities.add_entity(placed(EntityKind::Player, 1.0));
            entities.add_entity(placed(EntityKind::Player, 2.0));

            let mut services = Services::new();
            registry.check_all_collisions(&mut entities, &mut services.ctx());
            assert_eq!(*log.borrow(), vec![(first, coin)]);
        }
    }
}
