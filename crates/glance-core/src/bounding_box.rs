//! Axis-aligned bounding boxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in world coordinates.
///
/// A box whose `min` exceeds its `max` on any axis is empty; [`Self::empty`]
/// produces the canonical empty box that absorbs nothing when merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisAlignedBoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for AxisAlignedBoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl AxisAlignedBoundingBox {
    /// Creates a box from two corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Returns the empty box.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Computes the tight box around a set of points.
    ///
    /// Returns `None` when `points` is empty.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut bbox = Self::empty();
        for p in points {
            bbox.min = bbox.min.min(*p);
            bbox.max = bbox.max.max(*p);
        }
        Some(bbox)
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows this box to also enclose `other`.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Returns the center of the box, or the origin if empty.
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Returns the edge lengths of the box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Returns the longest edge length.
    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    /// Returns where `value` sits along `axis` as a fraction of the box.
    ///
    /// Degenerate axes map to `0.5`.
    pub fn percentage(&self, value: f32, axis: usize) -> f32 {
        let lo = self.min[axis];
        let hi = self.max[axis];
        if self.is_empty() || hi - lo <= f32::EPSILON {
            return 0.5;
        }
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_box() {
        let bbox = AxisAlignedBoundingBox::empty();
        assert!(bbox.is_empty());
        assert_eq!(bbox.center(), Vec3::ZERO);
        assert_eq!(bbox.max_extent(), 0.0);
    }

    #[test]
    fn test_from_points() {
        let bbox = AxisAlignedBoundingBox::from_points(&[
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, 1.0, -2.0),
        ])
        .unwrap();
        assert_eq!(bbox.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(bbox.max, Vec3::new(3.0, 1.0, 2.0));
        assert_eq!(bbox.max_extent(), 4.0);
        assert!(AxisAlignedBoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_merge_ignores_empty() {
        let mut bbox = AxisAlignedBoundingBox::new(Vec3::ZERO, Vec3::ONE);
        bbox.merge(&AxisAlignedBoundingBox::empty());
        assert_eq!(bbox, AxisAlignedBoundingBox::new(Vec3::ZERO, Vec3::ONE));

        let mut acc = AxisAlignedBoundingBox::empty();
        acc.merge(&bbox);
        assert_eq!(acc, bbox);
    }

    #[test]
    fn test_percentage() {
        let bbox = AxisAlignedBoundingBox::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 4.0));
        assert!((bbox.percentage(1.0, 0) - 0.5).abs() < 1e-6);
        assert!((bbox.percentage(4.0, 2) - 1.0).abs() < 1e-6);
        // Flat axis
        assert!((bbox.percentage(0.0, 1) - 0.5).abs() < 1e-6);
    }

    fn point() -> impl Strategy<Value = Vec3> {
        (-1.0e3f32..1.0e3, -1.0e3f32..1.0e3, -1.0e3f32..1.0e3)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn contains(bbox: &AxisAlignedBoundingBox, p: Vec3) -> bool {
        p.cmpge(bbox.min).all() && p.cmple(bbox.max).all()
    }

    proptest! {
        #[test]
        fn merge_encloses_both(
            a in prop::collection::vec(point(), 1..16),
            b in prop::collection::vec(point(), 1..16),
        ) {
            let mut merged = AxisAlignedBoundingBox::from_points(&a).unwrap();
            merged.merge(&AxisAlignedBoundingBox::from_points(&b).unwrap());
            for p in a.iter().chain(&b) {
                prop_assert!(contains(&merged, *p));
            }

            let mut all = a.clone();
            all.extend(&b);
            prop_assert_eq!(merged, AxisAlignedBoundingBox::from_points(&all).unwrap());
        }

        #[test]
        fn percentage_is_unit_interval(
            points in prop::collection::vec(point(), 1..8),
            value in -2.0e3f32..2.0e3,
            axis in 0..3usize,
        ) {
            let bbox = AxisAlignedBoundingBox::from_points(&points).unwrap();
            let t = bbox.percentage(value, axis);
            prop_assert!((0.0..=1.0).contains(&t));
        }
    }
}
