//! CPU-side draw data handed from renderers to a [`Canvas`](crate::Canvas).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;
use glance_core::RenderOption;

use crate::view_control::ViewControl;

static NEXT_RENDERER_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Identity of a renderer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(u64);

impl RendererId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        Self(NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Returns a generation number never handed out before.
pub fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Addresses one batch of one renderer.
///
/// A renderer may own several batches (e.g. a mesh and its wireframe),
/// told apart by `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawKey {
    /// Owning renderer.
    pub renderer: RendererId,
    /// Batch index within the renderer.
    pub slot: u32,
}

impl DrawKey {
    /// Creates a key.
    pub fn new(renderer: RendererId, slot: u32) -> Self {
        Self { renderer, slot }
    }
}

/// How the vertices of a batch are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// One screen-aligned sprite per vertex.
    Points,
    /// Indexed line list.
    Lines,
    /// Indexed triangle list.
    Triangles,
    /// Indexed triangles in normalized device coordinates, textured.
    Image,
}

/// Interleaved vertex layout shared by all pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space, or NDC for images.
    pub position: [f32; 3],
    /// Shading normal.
    pub normal: [f32; 3],
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Creates an untextured vertex.
    pub fn new(position: Vec3, normal: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
            uv: [0.0, 0.0],
        }
    }
}

/// RGBA8 pixels attached to an image batch.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels.
    pub rgba: Arc<Vec<u8>>,
    /// Changes whenever the pixels change.
    pub revision: u64,
}

/// A batch of geometry ready for upload.
#[derive(Debug, Clone)]
pub struct DrawBatch {
    /// Assembly mode.
    pub primitive: Primitive,
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Index data. Unused for points.
    pub indices: Vec<u32>,
    /// Pixels for image batches.
    pub texture: Option<ImageTexture>,
    /// Changes whenever vertex or index data changes.
    pub generation: u64,
}

impl DrawBatch {
    /// Creates an empty batch with a fresh generation.
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            vertices: Vec::new(),
            indices: Vec::new(),
            texture: None,
            generation: next_generation(),
        }
    }

    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self.primitive {
            Primitive::Points => self.vertices.is_empty(),
            _ => self.vertices.is_empty() || self.indices.is_empty(),
        }
    }
}

/// Bits of [`DrawUniforms::flags`].
pub mod flags {
    /// Apply headlight shading.
    pub const LIGHTING: u32 = 1;
    /// Draw back-facing triangles.
    pub const BACK_FACE: u32 = 1 << 1;
    /// Sample images with bilinear filtering.
    pub const LINEAR_FILTER: u32 = 1 << 2;
}

/// Per-draw uniform block, laid out for WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    /// Projection times view.
    pub view_proj: [[f32; 4]; 4],
    /// View matrix.
    pub view: [[f32; 4]; 4],
    /// Eye position, w unused.
    pub camera_pos: [f32; 4],
    /// Viewport size in pixels.
    pub viewport: [f32; 2],
    /// Point sprite size in pixels.
    pub point_size: f32,
    /// See [`flags`].
    pub flags: u32,
}

impl DrawUniforms {
    /// Builds uniforms from the camera and a render option.
    pub fn new(view: &ViewControl, option: &RenderOption) -> Self {
        let (width, height) = view.window_size();
        let mut bits = 0;
        if option.light_on {
            bits |= flags::LIGHTING;
        }
        if option.mesh_show_back_face {
            bits |= flags::BACK_FACE;
        }
        if option.image_interpolation_option == glance_core::ImageInterpolationOption::Linear {
            bits |= flags::LINEAR_FILTER;
        }
        Self {
            view_proj: view.view_projection_matrix().to_cols_array_2d(),
            view: view.view_matrix().to_cols_array_2d(),
            camera_pos: view.eye().extend(1.0).to_array(),
            viewport: [width as f32, height as f32],
            point_size: option.point_size,
            flags: bits,
        }
    }

    /// Returns a copy with lighting forced off.
    #[must_use]
    pub fn unlit(mut self) -> Self {
        self.flags &= !flags::LIGHTING;
        self
    }

    /// Returns true if the given flag bit is set.
    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Pixels read back from a canvas.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels, top row first.
    pub rgba: Vec<u8>,
}
