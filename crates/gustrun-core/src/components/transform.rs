use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::Component;
use crate::physics::Aabb;

/// Position and size of an entity in pixels.
///
/// This is the single source of truth for where an entity is. Other
/// components read it instead of keeping their own copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Center in pixels (y-down).
    pub position: Vec2,
    /// Full width and height in pixels.
    pub size: Vec2,
}

impl Transform {
    /// Creates a transform centered at `position`.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Pixel-space bounding box.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y * 0.5
    }
}

impl Component for Transform {}
