//! Core abstractions for glance.
//!
//! This crate provides the leaf types shared by every other glance crate:
//! - [`Geometry`] trait and the [`SharedGeometry`] / [`GeometryId`] identity pair
//! - [`AxisAlignedBoundingBox`] for scene extents
//! - [`RenderOption`] and [`WindowConfig`] configuration values
//! - The [`GlanceError`] error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod bounding_box;
pub mod error;
pub mod geometry;
pub mod options;

pub use bounding_box::AxisAlignedBoundingBox;
pub use error::{GlanceError, Result};
pub use geometry::{share, Geometry, GeometryId, GeometryKind, SharedGeometry};
pub use options::{
    ColorMapOption, ImageInterpolationOption, ImageStretchOption, MeshColorOption,
    MeshShadeOption, PointColorOption, RenderOption, WindowConfig,
};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec2, UVec3, Vec2, Vec3, Vec4};
