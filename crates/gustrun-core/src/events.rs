//! Typed publish/subscribe bus for gameplay notifications.
//!
//! Gameplay code reports what happened (a coin was collected, the player
//! changed state) by publishing a plain event struct. Subscribers register a
//! closure per event type and are invoked immediately, in registration order,
//! on the thread that publishes.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use gustrun_core::events::{EventBus, GoalReached};
//! use gustrun_core::entity::EntityId;
//!
//! let mut bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! bus.subscribe(move |_: &GoalReached| counter.set(counter.get() + 1));
//!
//! bus.publish(GoalReached { player: EntityId::new(1) });
//! assert_eq!(seen.get(), 1);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::EntityId;
use crate::player::PlayerStateKind;

// =============================================================================
// Events
// =============================================================================

/// A player moved between two distinct states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChanged {
    /// Player entity.
    pub entity: EntityId,
    /// State left.
    pub old: PlayerStateKind,
    /// State entered.
    pub new: PlayerStateKind,
}

/// A player picked up a coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinCollected {
    /// Collecting player.
    pub player: EntityId,
    /// Coin entity (now inactive).
    pub coin: EntityId,
    /// Points added to the player's score.
    pub value: u32,
}

/// A player picked up a gift box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCollected {
    /// Collecting player.
    pub player: EntityId,
    /// Effect the gift grants.
    pub effect: PlayerStateKind,
}

/// A player lost health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDamaged {
    /// Player entity.
    pub player: EntityId,
    /// Health left after the hit.
    pub remaining: u32,
}

/// An enemy was defeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDefeated {
    /// Enemy entity (now inactive).
    pub enemy: EntityId,
    /// Entity that delivered the final blow (player or projectile).
    pub by: EntityId,
}

/// A player touched the level goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalReached {
    /// Player entity.
    pub player: EntityId,
}

// =============================================================================
// EventBus
// =============================================================================

type Subscriber<E> = Box<dyn FnMut(&E)>;

/// Type-indexed event bus with immediate delivery.
#[derive(Default)]
pub struct EventBus {
    /// `TypeId::of::<E>()` → `Vec<Subscriber<E>>`
    subscribers: HashMap<TypeId, Box<dyn Any>>,
    published: u64,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every future event of type `E`.
    pub fn subscribe<E: 'static>(&mut self, handler: impl FnMut(&E) + 'static) {
        let list = self
            .subscribers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Subscriber<E>>::new()));
        if let Some(list) = list.downcast_mut::<Vec<Subscriber<E>>>() {
            list.push(Box::new(handler));
        }
    }

    /// Delivers `event` to every subscriber of `E` and returns how many
    /// received it. Publishing with no subscribers is not an error.
    pub fn publish<E: 'static + fmt::Debug>(&mut self, event: E) -> usize {
        self.published += 1;
        let Some(list) = self
            .subscribers
            .get_mut(&TypeId::of::<E>())
            .and_then(|list| list.downcast_mut::<Vec<Subscriber<E>>>())
        else {
            trace!(?event, "event published with no subscribers");
            return 0;
        };
        for subscriber in list.iter_mut() {
            subscriber(&event);
        }
        trace!(?event, delivered = list.len(), "event published");
        list.len()
    }

    /// Number of subscribers registered for `E`.
    #[must_use]
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.subscribers
            .get(&TypeId::of::<E>())
            .and_then(|list| list.downcast_ref::<Vec<Subscriber<E>>>())
            .map_or(0, Vec::len)
    }

    /// Total events published since creation, delivered or not.
    #[must_use]
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_receive_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        bus.subscribe(move |e: &CoinCollected| first.borrow_mut().push(("first", e.value)));
        let second = Rc::clone(&log);
        bus.subscribe(move |e: &CoinCollected| second.borrow_mut().push(("second", e.value)));

        let delivered = bus.publish(CoinCollected {
            player: EntityId::new(1),
            coin: EntityId::new(2),
            value: 10,
        });

        assert_eq!(delivered, 2);
        assert_eq!(*log.borrow(), vec![("first", 10), ("second", 10)]);
    }

    #[test]
    fn events_are_routed_by_type() {
        let mut bus = EventBus::new();
        let goals = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&goals);
        bus.subscribe(move |_: &GoalReached| *counter.borrow_mut() += 1);

        let delivered = bus.publish(PlayerDamaged {
            player: EntityId::new(1),
            remaining: 2,
        });

        assert_eq!(delivered, 0);
        assert_eq!(*goals.borrow(), 0);
        assert_eq!(bus.subscriber_count::<GoalReached>(), 1);
        assert_eq!(bus.subscriber_count::<PlayerDamaged>(), 0);
    }

    #[test]
    fn published_count_includes_undelivered() {
        let mut bus = EventBus::new();
        bus.publish(GoalReached {
            player: EntityId::new(3),
        });
        assert_eq!(bus.published_count(), 1);
    }
}
