//! Point cloud geometry.

use std::any::Any;

use glam::Vec3;
use glance_core::{AxisAlignedBoundingBox, Geometry, GeometryKind};

/// A set of points with optional per-point normals and colors.
///
/// `normals` and `colors` are either empty or exactly as long as `points`.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<Vec3>,
    /// Per-point normals.
    pub normals: Vec<Vec3>,
    /// Per-point RGB colors in `[0, 1]`.
    pub colors: Vec<Vec3>,
}

impl PointCloud {
    /// Creates a point cloud from positions.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self {
            points,
            normals: Vec::new(),
            colors: Vec::new(),
        }
    }

    /// Attaches per-point normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    /// Attaches per-point colors.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Vec3>) -> Self {
        self.colors = colors;
        self
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if normals are present for every point.
    pub fn has_normals(&self) -> bool {
        !self.points.is_empty() && self.normals.len() == self.points.len()
    }

    /// Returns true if colors are present for every point.
    pub fn has_colors(&self) -> bool {
        !self.points.is_empty() && self.colors.len() == self.points.len()
    }

    /// Sets every point to the same color.
    pub fn paint_uniform_color(&mut self, color: Vec3) {
        self.colors = vec![color; self.points.len()];
    }

    /// Moves every point by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.points {
            *p += offset;
        }
    }

    /// Scales every point about `center`.
    pub fn scale(&mut self, factor: f32, center: Vec3) {
        for p in &mut self.points {
            *p = center + (*p - center) * factor;
        }
    }
}

impl Geometry for PointCloud {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::PointCloud
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn bounding_box(&self) -> Option<AxisAlignedBoundingBox> {
        AxisAlignedBoundingBox::from_points(&self.points)
    }
}
