//! Contact events reported by [`PhysicsWorld::step`](super::PhysicsWorld::step).

use glam::Vec2;

use crate::entity::EntityId;

use super::BodyHandle;

/// Whether a contact started or ended this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// The two bodies started overlapping.
    Begin,
    /// The two bodies stopped overlapping.
    End,
}

/// One contact event between two bodies.
///
/// Owners are copied from the bodies at report time. A body created without
/// an owner reports `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Begin or end.
    pub phase: ContactPhase,
    /// First body (created earlier).
    pub body_a: BodyHandle,
    /// Second body.
    pub body_b: BodyHandle,
    /// Entity owning `body_a`.
    pub owner_a: Option<EntityId>,
    /// Entity owning `body_b`.
    pub owner_b: Option<EntityId>,
    /// Unit normal pointing from `body_a` toward `body_b`.
    pub normal: Vec2,
}

/// Receives contact events while the world steps.
///
/// Implementations must not touch the physics world; the step is still in
/// progress when they are called.
pub trait ContactListener {
    /// Called once per contact event, in report order.
    fn on_contact(&mut self, contact: &Contact);
}

/// Ignores every contact.
impl ContactListener for () {
    fn on_contact(&mut self, _contact: &Contact) {}
}

/// Records every contact for later inspection.
#[derive(Debug, Default)]
pub struct ContactRecorder {
    /// Contacts in report order.
    pub contacts: Vec<Contact>,
}

impl ContactRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contacts of the given phase, in report order.
    pub fn with_phase(&self, phase: ContactPhase) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(move |c| c.phase == phase)
    }
}

impl ContactListener for ContactRecorder {
    fn on_contact(&mut self, contact: &Contact) {
        self.contacts.push(*contact);
    }
}
