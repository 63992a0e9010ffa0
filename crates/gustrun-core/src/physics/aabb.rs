//! Axis-aligned bounding boxes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by its minimum and maximum corners.
///
/// Works in any unit; the physics world uses meters, entity transforms use
/// pixels. With y pointing down, `min.y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl Aabb {
    /// Creates a box from its corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a box from its center and full size.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Full size.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Returns `true` if the interiors overlap. Boxes that only share an
    /// edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Overlap depth along each axis (positive when intersecting).
    #[must_use]
    pub fn overlap(&self, other: &Self) -> Vec2 {
        Vec2::new(
            self.max.x.min(other.max.x) - self.min.x.max(other.min.x),
            self.max.y.min(other.max.y) - self.min.y.max(other.min.y),
        )
    }

    /// Unit axis normal pointing from `self` toward `other`, chosen along the
    /// axis of least overlap. Ties resolve to the vertical axis.
    #[must_use]
    pub fn contact_normal(&self, other: &Self) -> Vec2 {
        let overlap = self.overlap(other);
        let delta = other.center() - self.center();
        if overlap.x < overlap.y {
            Vec2::new(if delta.x < 0.0 { -1.0 } else { 1.0 }, 0.0)
        } else {
            Vec2::new(0.0, if delta.y < 0.0 { -1.0 } else { 1.0 })
        }
    }

    /// Returns the box moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn nested_boxes_intersect() {
        let outer = Aabb::from_center_size(Vec2::ZERO, Vec2::splat(10.0));
        let inner = Aabb::from_center_size(Vec2::ZERO, Vec2::splat(2.0));
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn normal_points_down_onto_box_below() {
        // y-down: `below` sits under `above` with a shallow vertical overlap.
        let above = Aabb::from_center_size(Vec2::new(0.0, 0.0), Vec2::splat(2.0));
        let below = Aabb::from_center_size(Vec2::new(0.2, 1.9), Vec2::splat(2.0));
        assert_eq!(above.contact_normal(&below), Vec2::new(0.0, 1.0));
        assert_eq!(below.contact_normal(&above), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn normal_is_horizontal_for_side_contact() {
        let left = Aabb::from_center_size(Vec2::ZERO, Vec2::splat(2.0));
        let right = Aabb::from_center_size(Vec2::new(1.8, 0.1), Vec2::splat(2.0));
        assert_eq!(left.contact_normal(&right), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn from_center_size_round_trips() {
        let b = Aabb::from_center_size(Vec2::new(3.0, 4.0), Vec2::new(2.0, 6.0));
        assert_eq!(b.center(), Vec2::new(3.0, 4.0));
        assert_eq!(b.size(), Vec2::new(2.0, 6.0));
        assert_eq!(b.translated(Vec2::X).center(), Vec2::new(4.0, 4.0));
    }
}
