//! The [`Component`] trait and the context components see while updating.

use std::any::Any;
use std::fmt;

use crate::command::CommandQueue;
use crate::config::GameConfig;
use crate::physics::PhysicsWorld;

use super::store::ComponentStore;
use super::EntityId;

/// Upcasting helpers implemented for every `'static` type.
///
/// Lets the store recover a concrete component from a `dyn Component`.
pub trait AsAny: Any {
    /// Borrows `self` as `dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrows `self` as `dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Converts a boxed `self` into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A unit of per-entity data with optional per-frame behavior.
///
/// At most one component of each concrete type lives on an entity. Both
/// hooks default to doing nothing, so pure data components only need
/// `impl Component for Foo {}`.
pub trait Component: AsAny + fmt::Debug {
    /// Called once when the component is attached to `owner`.
    fn on_attach(&mut self, _owner: EntityId) {}

    /// Advances the component by `dt` seconds.
    ///
    /// The component itself is detached from the store for the duration of
    /// the call, so [`ComponentContext::sibling`] never returns it.
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {}
}

/// World services shared by every component update in a frame.
pub struct FrameContext<'a> {
    /// Physics world (safe to mutate: no step is running).
    pub physics: &'a mut PhysicsWorld,
    /// Deferred structural changes.
    pub commands: &'a mut CommandQueue,
    /// Active configuration.
    pub config: &'a GameConfig,
}

/// What a component can reach while it updates: its owner, its siblings on
/// the same entity, and the frame services.
pub struct ComponentContext<'a> {
    owner: EntityId,
    siblings: &'a mut ComponentStore,
    /// Physics world.
    pub physics: &'a mut PhysicsWorld,
    /// Deferred structural changes.
    pub commands: &'a mut CommandQueue,
    /// Active configuration.
    pub config: &'a GameConfig,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        owner: EntityId,
        siblings: &'a mut ComponentStore,
        frame: &'a mut FrameContext<'_>,
    ) -> Self {
        Self {
            owner,
            siblings,
            physics: &mut *frame.physics,
            commands: &mut *frame.commands,
            config: frame.config,
        }
    }

    /// Entity that owns the updating component.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Borrows a sibling component of type `T`, if present.
    #[must_use]
    pub fn sibling<T: Component>(&self) -> Option<&T> {
        self.siblings.get::<T>()
    }

    /// Mutably borrows a sibling component of type `T`, if present.
    pub fn sibling_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.siblings.get_mut::<T>()
    }
}
