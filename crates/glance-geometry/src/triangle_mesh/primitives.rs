//! Procedural mesh builders.

use std::f32::consts::{PI, TAU};

use glam::{Quat, UVec3, Vec3};

use super::TriangleMesh;

impl TriangleMesh {
    /// Creates a UV sphere centered at the origin.
    ///
    /// `resolution` is the number of latitude bands; longitude uses twice as many.
    pub fn create_sphere(radius: f32, resolution: u32) -> Self {
        let rings = resolution.max(2);
        let segments = rings * 2;

        let mut mesh = TriangleMesh::default();
        mesh.vertices.push(Vec3::new(0.0, 0.0, radius));
        mesh.vertices.push(Vec3::new(0.0, 0.0, -radius));
        for i in 1..rings {
            let theta = PI * i as f32 / rings as f32;
            for j in 0..segments {
                let phi = TAU * j as f32 / segments as f32;
                mesh.vertices.push(Vec3::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.sin() * phi.sin(),
                    radius * theta.cos(),
                ));
            }
        }

        let ring_start = |i: u32| 2 + (i - 1) * segments;
        for j in 0..segments {
            let j1 = (j + 1) % segments;
            // Caps
            mesh.triangles
                .push(UVec3::new(0, ring_start(1) + j, ring_start(1) + j1));
            let last = ring_start(rings - 1);
            mesh.triangles.push(UVec3::new(1, last + j1, last + j));
        }
        for i in 1..rings - 1 {
            let (a, b) = (ring_start(i), ring_start(i + 1));
            for j in 0..segments {
                let j1 = (j + 1) % segments;
                mesh.triangles.push(UVec3::new(a + j, b + j, b + j1));
                mesh.triangles.push(UVec3::new(a + j, b + j1, a + j1));
            }
        }
        mesh
    }

    /// Creates a closed cylinder along +Z, centered at the origin.
    pub fn create_cylinder(radius: f32, height: f32, resolution: u32) -> Self {
        let segments = resolution.max(3);
        let half = height * 0.5;

        let mut mesh = TriangleMesh::default();
        mesh.vertices.push(Vec3::new(0.0, 0.0, half));
        mesh.vertices.push(Vec3::new(0.0, 0.0, -half));
        for z in [half, -half] {
            for j in 0..segments {
                let phi = TAU * j as f32 / segments as f32;
                mesh.vertices
                    .push(Vec3::new(radius * phi.cos(), radius * phi.sin(), z));
            }
        }

        let (top, bottom) = (2, 2 + segments);
        for j in 0..segments {
            let j1 = (j + 1) % segments;
            mesh.triangles.push(UVec3::new(0, top + j, top + j1));
            mesh.triangles.push(UVec3::new(1, bottom + j1, bottom + j));
            mesh.triangles
                .push(UVec3::new(top + j, bottom + j, bottom + j1));
            mesh.triangles
                .push(UVec3::new(top + j, bottom + j1, top + j1));
        }
        mesh
    }

    /// Creates a cone with its base on the XY plane and its tip at `+height` on Z.
    pub fn create_cone(radius: f32, height: f32, resolution: u32) -> Self {
        let segments = resolution.max(3);

        let mut mesh = TriangleMesh::default();
        mesh.vertices.push(Vec3::ZERO);
        mesh.vertices.push(Vec3::new(0.0, 0.0, height));
        for j in 0..segments {
            let phi = TAU * j as f32 / segments as f32;
            mesh.vertices
                .push(Vec3::new(radius * phi.cos(), radius * phi.sin(), 0.0));
        }

        for j in 0..segments {
            let (a, b) = (2 + j, 2 + (j + 1) % segments);
            mesh.triangles.push(UVec3::new(0, b, a));
            mesh.triangles.push(UVec3::new(1, a, b));
        }
        mesh
    }

    /// Creates an arrow along +Z starting at the origin.
    pub fn create_arrow(
        cylinder_radius: f32,
        cone_radius: f32,
        cylinder_height: f32,
        cone_height: f32,
        resolution: u32,
    ) -> Self {
        let mut mesh = Self::create_cylinder(cylinder_radius, cylinder_height, resolution);
        mesh.translate(Vec3::new(0.0, 0.0, cylinder_height * 0.5));

        let mut cone = Self::create_cone(cone_radius, cone_height, resolution);
        cone.translate(Vec3::new(0.0, 0.0, cylinder_height));
        mesh.merge(&cone);
        mesh
    }

    /// Creates a coordinate-axes glyph: a small sphere at `origin` with red,
    /// green and blue arrows along X, Y and Z.
    pub fn create_coordinate_frame(size: f32, origin: Vec3) -> Self {
        let resolution = 20;

        let mut frame = Self::create_sphere(0.08 * size, resolution);
        frame.paint_uniform_color(Vec3::splat(0.5));

        let axes = [
            (Quat::from_rotation_y(PI * 0.5), Vec3::new(1.0, 0.0, 0.0)),
            (Quat::from_rotation_x(-PI * 0.5), Vec3::new(0.0, 1.0, 0.0)),
            (Quat::IDENTITY, Vec3::new(0.0, 0.0, 1.0)),
        ];
        for (rotation, color) in axes {
            let mut arrow =
                Self::create_arrow(0.035 * size, 0.06 * size, 0.8 * size, 0.2 * size, resolution);
            arrow.rotate(rotation, Vec3::ZERO);
            arrow.paint_uniform_color(color);
            frame.merge(&arrow);
        }

        frame.translate(origin);
        frame.compute_vertex_normals();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::Geometry;

    #[test]
    fn test_sphere_is_closed_and_round() {
        let sphere = TriangleMesh::create_sphere(2.0, 8);
        assert!(sphere.has_valid_indices());
        for v in &sphere.vertices {
            assert!((v.length() - 2.0).abs() < 1e-4);
        }
        // V - E + F = 2 for a closed genus-0 surface, with E = 3F/2
        let v = sphere.vertices.len() as i64;
        let f = sphere.triangles.len() as i64;
        assert_eq!(v - 3 * f / 2 + f, 2);
    }

    #[test]
    fn test_sphere_normals_point_outward() {
        let mut sphere = TriangleMesh::create_sphere(1.0, 6);
        sphere.compute_triangle_normals();
        for i in 0..sphere.triangles.len() {
            let [a, b, c] = sphere.triangle_corners(i).unwrap();
            let centroid = (a + b + c) / 3.0;
            assert!(sphere.triangle_normals[i].dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_cylinder_extent() {
        let cyl = TriangleMesh::create_cylinder(0.5, 3.0, 12);
        let bbox = cyl.bounding_box().unwrap();
        assert!((bbox.min.z + 1.5).abs() < 1e-6);
        assert!((bbox.max.z - 1.5).abs() < 1e-6);
        assert!(cyl.has_valid_indices());
    }

    #[test]
    fn test_arrow_spans_full_length() {
        let arrow = TriangleMesh::create_arrow(0.1, 0.2, 0.8, 0.2, 10);
        let bbox = arrow.bounding_box().unwrap();
        assert!(bbox.min.z.abs() < 1e-6);
        assert!((bbox.max.z - 1.0).abs() < 1e-6);
        assert!(arrow.has_valid_indices());
    }

    #[test]
    fn test_coordinate_frame_axes() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let frame = TriangleMesh::create_coordinate_frame(2.0, origin);
        assert!(frame.has_vertex_colors());
        assert!(frame.has_vertex_normals());
        assert!(frame.has_valid_indices());

        let bbox = frame.bounding_box().unwrap();
        assert!((bbox.max - (origin + Vec3::splat(2.0))).length() < 1e-4);

        let tip_x = frame
            .vertices
            .iter()
            .zip(&frame.vertex_colors)
            .max_by(|a, b| a.0.x.total_cmp(&b.0.x))
            .unwrap();
        assert_eq!(*tip_x.1, Vec3::new(1.0, 0.0, 0.0));
    }
}
