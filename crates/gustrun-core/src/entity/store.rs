//! Per-entity heterogeneous component storage keyed by concrete type.
//!
//! # Architecture
//!
//! Components live in an insertion-ordered `Vec` of slots, with a
//! `TypeId → slot index` map for lookup. Insertion order is the update order.
//! Replacing a component reuses its slot, so a replaced component keeps its
//! original position in the update order.
//!
//! While a component updates it is moved out of its slot. Siblings can be
//! borrowed through the [`ComponentContext`] meanwhile, and the updating
//! component is simply absent from that view.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use super::component::{Component, ComponentContext, FrameContext};
use super::EntityId;

struct Slot {
    type_name: &'static str,
    /// `None` only while the component is updating.
    component: Option<Box<dyn Component>>,
}

/// Type-keyed map from component type to the single instance of that type.
pub struct ComponentStore {
    owner: EntityId,
    slots: Vec<Slot>,
    index: HashMap<TypeId, usize>,
}

impl ComponentStore {
    /// Creates an empty store owned by `owner`.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Entity that owns every component in this store.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Attaches `component`, replacing any existing component of type `T`,
    /// and returns a borrow of the stored instance.
    ///
    /// The previous instance, if any, is dropped. Its slot (and therefore its
    /// place in the update order) is reused.
    pub fn insert<T: Component>(&mut self, mut component: T) -> &mut T {
        component.on_attach(self.owner);
        let type_id = TypeId::of::<T>();
        let boxed: Box<dyn Component> = Box::new(component);

        let index = if let Some(&index) = self.index.get(&type_id) {
            trace!(owner = %self.owner, component = type_name::<T>(), "replacing component");
            self.slots[index].component = Some(boxed);
            index
        } else {
            self.slots.push(Slot {
                type_name: type_name::<T>(),
                component: Some(boxed),
            });
            let index = self.slots.len() - 1;
            self.index.insert(type_id, index);
            index
        };

        match self.slots[index]
            .component
            .as_deref_mut()
            .and_then(|stored| stored.as_any_mut().downcast_mut::<T>())
        {
            Some(stored) => stored,
            None => unreachable!("slot for {} holds another type", type_name::<T>()),
        }
    }

    /// Borrows the component of type `T`, if present.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        let index = *self.index.get(&TypeId::of::<T>())?;
        self.slots[index]
            .component
            .as_deref()
            .and_then(|component| component.as_any().downcast_ref::<T>())
    }

    /// Mutably borrows the component of type `T`, if present.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let index = *self.index.get(&TypeId::of::<T>())?;
        self.slots[index]
            .component
            .as_deref_mut()
            .and_then(|component| component.as_any_mut().downcast_mut::<T>())
    }

    /// Returns `true` if a component of type `T` is attached.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Returns the owner of the attached `T`, or `None` if there is none.
    #[must_use]
    pub fn owner_of<T: Component>(&self) -> Option<EntityId> {
        self.contains::<T>().then_some(self.owner)
    }

    /// Detaches and returns the component of type `T`.
    ///
    /// Remaining components keep their relative update order.
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        let index = self.index.remove(&TypeId::of::<T>())?;
        let slot = self.slots.remove(index);
        for later in self.index.values_mut() {
            if *later > index {
                *later -= 1;
            }
        }
        slot.component
            .and_then(|component| component.into_any().downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no components are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Type names of the attached components in update order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.type_name)
    }

    /// Updates every component once, in insertion order.
    pub(crate) fn update_all(&mut self, dt: f32, frame: &mut FrameContext<'_>) {
        let owner = self.owner;
        for index in 0..self.slots.len() {
            let Some(mut component) = self.slots[index].component.take() else {
                continue;
            };
            {
                let mut ctx = ComponentContext::new(owner, self, frame);
                component.update(&mut ctx, dt);
            }
            // Components cannot be inserted or removed through the context,
            // so the slot at `index` still belongs to the same type.
            let slot = &mut self.slots[index];
            if slot.component.is_none() {
                slot.component = Some(component);
            }
        }
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("owner", &self.owner)
            .field("components", &self.type_names().collect::<Vec<_>>())
            .finish()
    }
}
