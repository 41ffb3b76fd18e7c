#![allow(clippy::cast_precision_loss)]
//! Shows a point cloud, a sphere mesh and a bounding-box line set.
//!
//! Press H in the window for the key bindings.
//!
//! Run with: cargo run --example `draw_geometries`

use std::f32::consts::PI;

use glance::{
    draw_geometries, share, AxisAlignedBoundingBox, LineSet, PointCloud, Result, SharedGeometry,
    TriangleMesh, Vec3,
};

/// Samples a helix with colors running from blue to red along its length.
fn helix(turns: f32, samples: usize) -> PointCloud {
    let mut points = Vec::with_capacity(samples);
    let mut colors = Vec::with_capacity(samples);
    for i in 0..samples {
        let t = i as f32 / samples as f32;
        let angle = 2.0 * PI * turns * t;
        points.push(Vec3::new(angle.cos(), angle.sin(), 2.0 * t - 1.0));
        colors.push(Vec3::new(t, 0.2, 1.0 - t));
    }
    PointCloud::new(points).with_colors(colors)
}

fn main() -> Result<()> {
    env_logger::init();

    let cloud = helix(4.0, 2000);
    let bbox = AxisAlignedBoundingBox::from_points(&cloud.points)
        .unwrap_or_else(AxisAlignedBoundingBox::empty);
    let mut outline = LineSet::from_bounding_box(&bbox);
    outline.paint_uniform_color(Vec3::new(0.9, 0.6, 0.1));

    let mut sphere = TriangleMesh::create_sphere(0.4, 24);
    sphere.compute_vertex_normals();
    sphere.paint_uniform_color(Vec3::new(0.7, 0.7, 0.75));

    let geometries: Vec<SharedGeometry> = vec![share(cloud), share(sphere), share(outline)];
    draw_geometries(&geometries, "glance", 1280, 720)
}
