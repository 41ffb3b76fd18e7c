//! Geometry trait and identity handles.
//!
//! A [`Geometry`] is owned by the host application. The viewer holds a
//! [`SharedGeometry`] clone alongside the host for as long as the geometry is
//! registered, and tells registrations apart by allocation address
//! ([`GeometryId`]) rather than by value.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::bounding_box::AxisAlignedBoundingBox;

/// The kind of a geometry, used to select a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// A set of points with optional normals and colors.
    PointCloud,
    /// A triangle mesh.
    TriangleMesh,
    /// A set of line segments.
    LineSet,
    /// A 2D raster image.
    Image,
    /// A host-defined geometry type. No renderer exists for these.
    Other(&'static str),
}

impl GeometryKind {
    /// Returns the display name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::PointCloud => "PointCloud",
            GeometryKind::TriangleMesh => "TriangleMesh",
            GeometryKind::LineSet => "LineSet",
            GeometryKind::Image => "Image",
            GeometryKind::Other(name) => name,
        }
    }

    /// Returns true for geometry that lives in screen space rather than the 3D scene.
    pub fn is_2d(self) -> bool {
        matches!(self, GeometryKind::Image)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A displayable data object.
///
/// Implementors are plain data containers; renderers read them through
/// [`Geometry::as_any`] downcasts.
pub trait Geometry: Any + Send + Sync {
    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the kind of this geometry.
    fn kind(&self) -> GeometryKind;

    /// Returns true if there is nothing to draw.
    fn is_empty(&self) -> bool;

    /// Returns the axis-aligned bounding box in world coordinates.
    ///
    /// Returns `None` for empty geometry and for 2D geometry.
    fn bounding_box(&self) -> Option<AxisAlignedBoundingBox>;
}

/// A geometry shared between the host application and the viewer.
pub type SharedGeometry = Arc<RwLock<dyn Geometry>>;

/// Wraps a geometry for registration with the viewer.
///
/// The returned handle keeps its concrete type so the host can keep mutating
/// it; it coerces to [`SharedGeometry`] at call sites.
pub fn share<G: Geometry>(geometry: G) -> Arc<RwLock<G>> {
    Arc::new(RwLock::new(geometry))
}

/// Identity token of a shared geometry allocation.
///
/// Two handles compare equal only if they point at the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(usize);

impl GeometryId {
    /// Returns the identity of `geometry`.
    pub fn of(geometry: &SharedGeometry) -> Self {
        Self(Arc::as_ptr(geometry).cast::<()>() as usize)
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
