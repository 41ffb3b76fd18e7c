//! Error types for glance.

use thiserror::Error;

use crate::geometry::GeometryKind;

/// The main error type for glance operations.
///
/// Every variant is local and recoverable: a failed call leaves the viewer
/// exactly as it was before the call.
#[derive(Error, Debug)]
pub enum GlanceError {
    /// The operation needs a window, but none has been created.
    #[error("no visualizer window - call create_visualizer_window() first")]
    WindowNotCreated,

    /// Window or GPU context creation failed.
    #[error("failed to create visualizer window: {0}")]
    WindowCreation(String),

    /// No renderer exists for this kind of geometry.
    #[error("unsupported geometry kind: {0}")]
    UnsupportedGeometry(GeometryKind),

    /// The geometry is already registered with the viewer.
    #[error("geometry is already registered")]
    DuplicateGeometry,

    /// The geometry is not registered with the viewer.
    #[error("geometry is not registered")]
    GeometryNotRegistered,

    /// No utility renderer with the given id is live.
    #[error("utility renderer {0} not found")]
    UtilityNotFound(u64),

    /// The utility is owned by the viewer and cannot be removed.
    #[error("utility renderer {0} is permanent")]
    PermanentUtility(u64),

    /// A geometry lock was poisoned by a panicking writer.
    #[error("geometry lock poisoned")]
    GeometryLockPoisoned,

    /// Rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Image decoding or encoding error.
    #[error("image error: {0}")]
    Image(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for glance operations.
pub type Result<T> = std::result::Result<T, GlanceError>;
