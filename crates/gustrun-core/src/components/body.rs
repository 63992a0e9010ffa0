use crate::entity::{Component, ComponentContext, Entity};
use crate::physics::{BodyHandle, PhysicsWorld};

use super::Transform;

/// Links an entity to its body in the [`PhysicsWorld`].
///
/// The body is the authority on motion. Each update copies the body's
/// position (meters) into the sibling [`Transform`] (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsComponent {
    handle: BodyHandle,
}

impl PhysicsComponent {
    /// Wraps an existing body handle.
    #[must_use]
    pub const fn new(handle: BodyHandle) -> Self {
        Self { handle }
    }

    /// Handle of the linked body.
    #[must_use]
    pub const fn handle(&self) -> BodyHandle {
        self.handle
    }
}

impl Component for PhysicsComponent {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, _dt: f32) {
        let ppm = ctx.config.physics.pixels_per_meter;
        let Some(position) = ctx.physics.body(self.handle).map(|body| body.position) else {
            return;
        };
        if let Some(transform) = ctx.sibling_mut::<Transform>() {
            transform.position = position * ppm;
        }
    }
}

/// Copies `entity`'s body position into its [`Transform`].
///
/// Used after the physics step so overlap tests and renderers see
/// post-step positions without waiting for the next component update.
pub fn sync_transform(entity: &mut Entity, physics: &PhysicsWorld, pixels_per_meter: f32) {
    let Some(handle) = entity.get_component::<PhysicsComponent>().map(PhysicsComponent::handle)
    else {
        return;
    };
    let Some(body) = physics.body(handle) else {
        return;
    };
    if let Some(transform) = entity.get_component_mut::<Transform>() {
        transform.position = body.position * pixels_per_meter;
    }
}
