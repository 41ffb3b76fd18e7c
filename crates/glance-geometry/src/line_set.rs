//! Line set geometry.

use std::any::Any;

use glam::Vec3;
use glance_core::{AxisAlignedBoundingBox, Geometry, GeometryKind};

/// A set of line segments between indexed points.
#[derive(Debug, Clone, Default)]
pub struct LineSet {
    /// Endpoint positions.
    pub points: Vec<Vec3>,
    /// Segments as pairs of indices into `points`.
    pub lines: Vec<[u32; 2]>,
    /// Per-segment RGB colors. Either empty or one per line.
    pub colors: Vec<Vec3>,
}

impl LineSet {
    /// Creates a line set from points and index pairs.
    pub fn new(points: Vec<Vec3>, lines: Vec<[u32; 2]>) -> Self {
        Self {
            points,
            lines,
            colors: Vec::new(),
        }
    }

    /// Attaches per-segment colors.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Vec3>) -> Self {
        self.colors = colors;
        self
    }

    /// Builds the twelve edges of a bounding box.
    pub fn from_bounding_box(bbox: &AxisAlignedBoundingBox) -> Self {
        let (lo, hi) = (bbox.min, bbox.max);
        let points = vec![
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ];
        let lines = vec![
            [0, 1],
            [1, 2],
            [2, 3],
            [3, 0],
            [4, 5],
            [5, 6],
            [6, 7],
            [7, 4],
            [0, 4],
            [1, 5],
            [2, 6],
            [3, 7],
        ];
        Self::new(points, lines)
    }

    /// Returns true if colors are present for every segment.
    pub fn has_colors(&self) -> bool {
        !self.lines.is_empty() && self.colors.len() == self.lines.len()
    }

    /// Sets every segment to the same color.
    pub fn paint_uniform_color(&mut self, color: Vec3) {
        self.colors = vec![color; self.lines.len()];
    }

    /// Returns the endpoints of segment `i`, or `None` if an index is out of range.
    pub fn segment(&self, i: usize) -> Option<(Vec3, Vec3)> {
        let [a, b] = *self.lines.get(i)?;
        Some((
            *self.points.get(a as usize)?,
            *self.points.get(b as usize)?,
        ))
    }
}

impl Geometry for LineSet {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::LineSet
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty() || self.lines.is_empty()
    }

    fn bounding_box(&self) -> Option<AxisAlignedBoundingBox> {
        AxisAlignedBoundingBox::from_points(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_outline() {
        let bbox = AxisAlignedBoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let ls = LineSet::from_bounding_box(&bbox);
        assert_eq!(ls.points.len(), 8);
        assert_eq!(ls.lines.len(), 12);
        assert_eq!(ls.bounding_box(), Some(bbox));
    }

    #[test]
    fn test_segment_out_of_range() {
        let ls = LineSet::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1], [1, 5]]);
        assert_eq!(ls.segment(0), Some((Vec3::ZERO, Vec3::X)));
        assert!(ls.segment(1).is_none());
        assert!(ls.segment(2).is_none());
    }

    #[test]
    fn test_points_without_lines_are_empty() {
        let ls = LineSet::new(vec![Vec3::ZERO], Vec::new());
        assert!(Geometry::is_empty(&ls));
    }
}
