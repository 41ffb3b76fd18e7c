//! Triangle mesh geometry.

mod primitives;

use std::any::Any;

use glam::{Quat, UVec3, Vec3};
use glance_core::{AxisAlignedBoundingBox, Geometry, GeometryKind};

/// An indexed triangle mesh with optional per-vertex normals and colors.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangles as triples of vertex indices, counter-clockwise when viewed from outside.
    pub triangles: Vec<UVec3>,
    /// Per-vertex normals. Either empty or one per vertex.
    pub vertex_normals: Vec<Vec3>,
    /// Per-vertex RGB colors. Either empty or one per vertex.
    pub vertex_colors: Vec<Vec3>,
    /// Per-triangle normals. Either empty or one per triangle.
    pub triangle_normals: Vec<Vec3>,
}

impl TriangleMesh {
    /// Creates a mesh from vertices and triangles.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<UVec3>) -> Self {
        Self {
            vertices,
            triangles,
            ..Self::default()
        }
    }

    /// Returns true if normals are present for every vertex.
    pub fn has_vertex_normals(&self) -> bool {
        !self.vertices.is_empty() && self.vertex_normals.len() == self.vertices.len()
    }

    /// Returns true if colors are present for every vertex.
    pub fn has_vertex_colors(&self) -> bool {
        !self.vertices.is_empty() && self.vertex_colors.len() == self.vertices.len()
    }

    /// Returns true if normals are present for every triangle.
    pub fn has_triangle_normals(&self) -> bool {
        !self.triangles.is_empty() && self.triangle_normals.len() == self.triangles.len()
    }

    /// Returns true if every triangle index refers to an existing vertex.
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.triangles
            .iter()
            .all(|t| t.x < n && t.y < n && t.z < n)
    }

    /// Returns the corner positions of triangle `i`.
    pub fn triangle_corners(&self, i: usize) -> Option<[Vec3; 3]> {
        let t = self.triangles.get(i)?;
        Some([
            *self.vertices.get(t.x as usize)?,
            *self.vertices.get(t.y as usize)?,
            *self.vertices.get(t.z as usize)?,
        ])
    }

    /// Computes unit triangle normals from the winding order.
    pub fn compute_triangle_normals(&mut self) {
        self.triangle_normals = (0..self.triangles.len())
            .map(|i| match self.triangle_corners(i) {
                Some([a, b, c]) => (b - a).cross(c - a).normalize_or_zero(),
                None => Vec3::ZERO,
            })
            .collect();
    }

    /// Computes vertex normals as the area-weighted average of incident triangle normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for t in &self.triangles {
            let (ia, ib, ic) = (t.x as usize, t.y as usize, t.z as usize);
            let (Some(&a), Some(&b), Some(&c)) = (
                self.vertices.get(ia),
                self.vertices.get(ib),
                self.vertices.get(ic),
            ) else {
                continue;
            };
            // Unnormalized cross product carries twice the area
            let weighted = (b - a).cross(c - a);
            normals[ia] += weighted;
            normals[ib] += weighted;
            normals[ic] += weighted;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.vertex_normals = normals;
    }

    /// Sets every vertex to the same color.
    pub fn paint_uniform_color(&mut self, color: Vec3) {
        self.vertex_colors = vec![color; self.vertices.len()];
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Rotates the mesh about `center`, carrying normals along.
    pub fn rotate(&mut self, rotation: Quat, center: Vec3) {
        for v in &mut self.vertices {
            *v = center + rotation * (*v - center);
        }
        for n in self
            .vertex_normals
            .iter_mut()
            .chain(self.triangle_normals.iter_mut())
        {
            *n = rotation * *n;
        }
    }

    /// Appends another mesh, re-indexing its triangles.
    ///
    /// Attributes survive only when both meshes carry them.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let keep_normals = (self.vertices.is_empty() || self.has_vertex_normals())
            && other.has_vertex_normals();
        let keep_colors =
            (self.vertices.is_empty() || self.has_vertex_colors()) && other.has_vertex_colors();
        let keep_tri_normals = (self.triangles.is_empty() || self.has_triangle_normals())
            && other.has_triangle_normals();

        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|t| *t + UVec3::splat(offset)));

        if keep_normals {
            self.vertex_normals.extend_from_slice(&other.vertex_normals);
        } else {
            self.vertex_normals.clear();
        }
        if keep_colors {
            self.vertex_colors.extend_from_slice(&other.vertex_colors);
        } else {
            self.vertex_colors.clear();
        }
        if keep_tri_normals {
            self.triangle_normals
                .extend_from_slice(&other.triangle_normals);
        } else {
            self.triangle_normals.clear();
        }
    }
}

impl Geometry for TriangleMesh {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::TriangleMesh
    }

    fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn bounding_box(&self) -> Option<AxisAlignedBoundingBox> {
        AxisAlignedBoundingBox::from_points(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![UVec3::new(0, 1, 2), UVec3::new(0, 2, 3)],
        )
    }

    #[test]
    fn test_normals_of_flat_quad() {
        let mut mesh = quad();
        mesh.compute_triangle_normals();
        mesh.compute_vertex_normals();
        assert!(mesh.has_triangle_normals());
        assert!(mesh.has_vertex_normals());
        for n in mesh.triangle_normals.iter().chain(&mesh.vertex_normals) {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_triangle_gets_zero_normal() {
        let mut mesh = TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            vec![UVec3::new(0, 1, 2)],
        );
        mesh.compute_triangle_normals();
        assert_eq!(mesh.triangle_normals[0], Vec3::ZERO);
    }

    #[test]
    fn test_invalid_indices_are_skipped() {
        let mut mesh = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X], vec![UVec3::new(0, 1, 7)]);
        assert!(!mesh.has_valid_indices());
        mesh.compute_vertex_normals();
        assert_eq!(mesh.vertex_normals, vec![Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_merge_reindexes() {
        let mut a = quad();
        let b = quad();
        a.merge(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(a.triangles.len(), 4);
        assert_eq!(a.triangles[2], UVec3::new(4, 5, 6));
        assert!(a.has_valid_indices());
    }

    #[test]
    fn test_merge_drops_partial_attributes() {
        let mut a = quad();
        a.paint_uniform_color(Vec3::ONE);
        let b = quad();
        a.merge(&b);
        assert!(!a.has_vertex_colors());
    }

    #[test]
    fn test_rotate_about_center() {
        let mut mesh = quad();
        mesh.rotate(
            Quat::from_rotation_z(std::f32::consts::PI),
            Vec3::new(0.5, 0.5, 0.0),
        );
        let bbox = mesh.bounding_box().unwrap();
        assert!((bbox.min - Vec3::ZERO).length() < 1e-5);
        assert!((bbox.max - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }
}
