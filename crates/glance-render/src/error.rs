//! Rendering error types.

use glance_core::GlanceError;
use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Surface lost.
    #[error("surface lost")]
    SurfaceLost,

    /// Surface outdated.
    #[error("surface outdated")]
    SurfaceOutdated,

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// Timeout waiting for GPU.
    #[error("timeout waiting for GPU")]
    Timeout,

    /// Reading back a GPU buffer failed.
    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    /// A capture was requested before any frame was presented.
    #[error("no frame has been presented yet")]
    NoFrame,

    /// Pixel data does not match the stated dimensions.
    #[error("invalid image data")]
    InvalidImageData,

    /// The screenshot file extension is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image encoding failed.
    #[error("image encoding error: {0}")]
    ImageEncoding(#[from] image::ImageError),

    /// I/O error while writing a capture.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for GlanceError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(io) => GlanceError::Io(io),
            RenderError::ImageEncoding(e) => GlanceError::Image(e.to_string()),
            other => GlanceError::Render(other.to_string()),
        }
    }
}
