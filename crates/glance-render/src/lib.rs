//! Rendering collaborators for glance.
//!
//! This crate provides:
//! - The [`Canvas`] draw target, with a wgpu [`RenderEngine`] and a
//!   [`RecordingCanvas`] for headless use
//! - Per-kind geometry renderers behind [`GeometryRenderer`]
//! - The [`ViewControl`] camera model
//! - Color maps and screen capture encoding

// Graphics code intentionally uses casts for indices, colors, and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

mod buffer;
pub mod canvas;
pub mod color_maps;
pub mod coordinate_frame_render;
pub mod draw;
pub mod engine;
pub mod error;
pub mod image_render;
pub mod line_set_render;
pub mod point_cloud_render;
pub mod renderer;
pub mod screenshot;
pub mod triangle_mesh_render;
pub mod view_control;

pub use canvas::{Canvas, CanvasJournal, DrawRecord, RecordingCanvas};
pub use color_maps::ColorMap;
pub use coordinate_frame_render::CoordinateFrameRenderer;
pub use draw::{CapturedImage, DrawBatch, DrawKey, DrawUniforms, Primitive, RendererId, Vertex};
pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use image_render::ImageRenderer;
pub use line_set_render::LineSetRenderer;
pub use point_cloud_render::PointCloudRenderer;
pub use renderer::{create_renderer, GeometryRenderer};
pub use screenshot::save_image;
pub use triangle_mesh_render::TriangleMeshRenderer;
pub use view_control::{ProjectionMode, ViewControl, ViewParameters};
