//! Spins a mesh with an animation callback.
//!
//! The callback rotates the mesh a little each iteration, tells the viewer
//! the geometry changed, and asks for a redraw.
//!
//! Run with: cargo run --example animation

use glam::Quat;
use glance::{
    draw_geometries_with_animation_callback, share, Result, SharedGeometry, TriangleMesh, Vec3,
};

fn main() -> Result<()> {
    env_logger::init();

    let mut mesh = TriangleMesh::create_cylinder(0.3, 1.5, 32);
    mesh.compute_vertex_normals();
    mesh.paint_uniform_color(Vec3::new(0.2, 0.6, 0.9));
    let mesh = share(mesh);
    let shared: SharedGeometry = mesh.clone();

    let step = Quat::from_rotation_x(0.02);
    let callback = move |vis: &mut glance::Visualizer| {
        let Ok(mut guard) = mesh.write() else {
            return false;
        };
        guard.rotate(step, Vec3::ZERO);
        guard.compute_vertex_normals();
        drop(guard);

        let shared: SharedGeometry = mesh.clone();
        if let Err(err) = vis.update_geometry(Some(&shared)) {
            log::warn!("update failed: {err}");
            vis.close();
        }
        true
    };

    draw_geometries_with_animation_callback(&[shared], callback, "glance animation", 1024, 768)
}
