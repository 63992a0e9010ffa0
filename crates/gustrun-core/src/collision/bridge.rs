//! Forwards physics contacts to the collision registry.

use tracing::trace;

use crate::entity::EntityManager;
use crate::physics::{Contact, ContactListener, ContactPhase};

use super::{CollisionContext, CollisionRegistry};

/// Counters for the contacts one bridge has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Contacts dispatched to the registry.
    pub forwarded: usize,
    /// Forwarded contacts a handler ran for.
    pub handled: usize,
    /// Contacts with an unowned body or an owner no longer in the manager.
    pub unresolved: usize,
    /// Contacts involving an entity already marked inactive.
    pub inactive: usize,
}

/// [`ContactListener`] that resolves body owners to entities and dispatches
/// the pair: `Begin` through the begin table, `End` through the end table.
///
/// Contacts whose owners cannot be resolved are dropped.
pub struct ContactBridge<'a> {
    entities: &'a mut EntityManager,
    registry: &'a CollisionRegistry,
    ctx: CollisionContext<'a>,
    stats: BridgeStats,
}

impl<'a> ContactBridge<'a> {
    /// Creates a bridge for one physics step.
    pub fn new(
        entities: &'a mut EntityManager,
        registry: &'a CollisionRegistry,
        ctx: CollisionContext<'a>,
    ) -> Self {
        Self {
            entities,
            registry,
            ctx,
            stats: BridgeStats::default(),
        }
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }
}

impl ContactListener for ContactBridge<'_> {
    fn on_contact(&mut self, contact: &Contact) {
        let (Some(a), Some(b)) = (contact.owner_a, contact.owner_b) else {
            self.stats.unresolved += 1;
            return;
        };
        let Some((entity_a, entity_b)) = self.entities.pair_mut(a, b) else {
            trace!(%a, %b, "contact owner not found");
            self.stats.unresolved += 1;
            return;
        };
        if !entity_a.is_active() || !entity_b.is_active() {
            self.stats.inactive += 1;
            return;
        }

        self.stats.forwarded += 1;
        self.ctx.normal = contact.normal;
        let outcome = match contact.phase {
            ContactPhase::Begin => self.registry.dispatch(entity_a, entity_b, &mut self.ctx),
            ContactPhase::End => self.registry.dispatch_end(entity_a, entity_b, &mut self.ctx),
        };
        if outcome.is_handled() {
            self.stats.handled += 1;
        }
    }
}
