//! glance: a lightweight interactive viewer for 3D geometry.
//!
//! Register point clouds, triangle meshes, line sets or images with a
//! [`Visualizer`] and it draws them in a window with an orbiting camera,
//! keyboard toggles for the render options, and screen capture.
//!
//! # Quick Start
//!
//! ```no_run
//! use glance::*;
//!
//! fn main() -> Result<()> {
//!     let cloud: SharedGeometry = share(PointCloud::new(vec![
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         Vec3::new(0.0, 1.0, 0.0),
//!     ]));
//!     draw_geometries(&[cloud], "glance", 1024, 768)
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Visualizer`] owns the registry of geometries, the overlay utilities
//!   (the coordinate frame), the camera and the frame loop.
//! - A [`WindowBackend`] supplies the window, the events and a [`Canvas`].
//!   [`WinitBackend`] draws with wgpu; [`HeadlessBackend`] replays scripted
//!   events into a recording canvas for tests.
//! - Each registered geometry gets one [`GeometryRenderer`], chosen by kind.

// Graphics code intentionally uses casts for pixel and cursor coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]

pub mod backend;
pub mod visualizer;

pub use backend::{
    Action, HeadlessBackend, Key, Modifiers, MouseButton, WindowBackend, WindowEvent,
    WinitBackend,
};
pub use visualizer::{AnimationCallback, LoopState, MouseControl, RenderOptionsMap, Visualizer};

// Re-export core types
pub use glance_core::{
    share, AxisAlignedBoundingBox, ColorMapOption, Geometry, GeometryId, GeometryKind,
    GlanceError, ImageInterpolationOption, ImageStretchOption, Mat4, MeshColorOption,
    MeshShadeOption, PointColorOption, RenderOption, Result, SharedGeometry, UVec3, Vec2, Vec3,
    Vec4, WindowConfig,
};

// Re-export geometry types
pub use glance_geometry::{Image, LineSet, PointCloud, TriangleMesh};

// Re-export render types
pub use glance_render::{
    Canvas, CanvasJournal, CapturedImage, ColorMap, DrawRecord, GeometryRenderer,
    Primitive, ProjectionMode, RecordingCanvas, RenderEngine, RendererId, ViewControl,
    ViewParameters,
};

/// Opens a window showing `geometries` and blocks until it is closed.
///
/// Fails if the window cannot be created or a geometry cannot be added.
pub fn draw_geometries(
    geometries: &[SharedGeometry],
    window_name: &str,
    width: u32,
    height: u32,
) -> Result<()> {
    let _ = env_logger::try_init();
    let mut visualizer = Visualizer::new(WinitBackend::new());
    show_geometries(
        &mut visualizer,
        geometries,
        WindowConfig::new(window_name, width, height),
    )
}

/// Like [`draw_geometries`], calling `callback` once per loop iteration.
///
/// The loop polls instead of sleeping while the callback is registered. A
/// callback returning true requests a redraw.
pub fn draw_geometries_with_animation_callback(
    geometries: &[SharedGeometry],
    callback: impl FnMut(&mut Visualizer) -> bool + 'static,
    window_name: &str,
    width: u32,
    height: u32,
) -> Result<()> {
    let _ = env_logger::try_init();
    let mut visualizer = Visualizer::new(WinitBackend::new());
    visualizer.register_animation_callback(callback);
    show_geometries(
        &mut visualizer,
        geometries,
        WindowConfig::new(window_name, width, height),
    )
}

/// Opens a window on `visualizer`, adds `geometries` and runs until closed.
///
/// The window is destroyed on return, whether or not an error occurred.
pub fn show_geometries<B: WindowBackend>(
    visualizer: &mut Visualizer<B>,
    geometries: &[SharedGeometry],
    config: WindowConfig,
) -> Result<()> {
    visualizer.create_visualizer_window(config)?;
    for geometry in geometries {
        if let Err(err) = visualizer.add_geometry(geometry.clone(), true) {
            log::warn!("failed adding geometry: {err}");
            visualizer.destroy_visualizer_window();
            return Err(err);
        }
    }
    visualizer.run()
}
