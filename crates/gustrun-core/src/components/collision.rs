use serde::{Deserialize, Serialize};

use crate::entity::Component;
use crate::physics::CollisionCategory;

/// Coarse collision category and mask of an entity.
///
/// Feeds the physics layer filter only. Gameplay reactions are chosen by
/// exact [`EntityKind`](crate::entity::EntityKind) pairs in the
/// [`CollisionRegistry`](crate::collision::CollisionRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionComponent {
    /// What this entity is.
    pub category: CollisionCategory,
    /// What this entity interacts with.
    pub mask: CollisionCategory,
}

impl CollisionComponent {
    /// Creates a component with an explicit mask.
    #[must_use]
    pub const fn new(category: CollisionCategory, mask: CollisionCategory) -> Self {
        Self { category, mask }
    }

    /// Returns `true` if both filters accept each other.
    #[must_use]
    pub fn accepts(&self, other: &Self) -> bool {
        self.category.intersects(other.mask) && other.category.intersects(self.mask)
    }
}

impl Component for CollisionComponent {}
