//! Geometry implementations for glance.
//!
//! This crate provides the concrete data objects a viewer can display:
//! - Point clouds
//! - Triangle meshes, including primitive builders and the coordinate frame
//! - Line sets
//! - Images

// Graphics code intentionally uses casts for indices, colors, and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod image;
pub mod line_set;
pub mod point_cloud;
pub mod triangle_mesh;

pub use crate::image::Image;
pub use line_set::LineSet;
pub use point_cloud::PointCloud;
pub use triangle_mesh::TriangleMesh;
