//! The per-geometry renderer capability and its factory.

use std::sync::Arc;

use glance_core::{GeometryKind, RenderOption, SharedGeometry};

use crate::canvas::Canvas;
use crate::draw::{DrawBatch, RendererId};
use crate::image_render::ImageRenderer;
use crate::line_set_render::LineSetRenderer;
use crate::point_cloud_render::PointCloudRenderer;
use crate::triangle_mesh_render::TriangleMeshRenderer;
use crate::view_control::ViewControl;

/// Draws one geometry.
///
/// A renderer reads its geometry only in [`initialize`](Self::initialize) and
/// [`resync`](Self::resync). Mutating the geometry without a following resync
/// leaves the renderer drawing stale contents.
pub trait GeometryRenderer {
    /// Returns the identity used for canvas resources.
    fn id(&self) -> RendererId;

    /// Returns the kind of geometry this renderer draws.
    fn kind(&self) -> GeometryKind;

    /// Binds the renderer to `geometry` and reads its contents.
    ///
    /// Returns false if the geometry is not of the expected type or cannot be read.
    fn initialize(&mut self, geometry: &SharedGeometry) -> bool;

    /// Re-reads the bound geometry.
    fn resync(&mut self) -> bool;

    /// Submits this renderer's batches to the canvas.
    ///
    /// Returns false if the renderer has no geometry bound.
    fn render(&mut self, option: &RenderOption, view: &ViewControl, canvas: &mut dyn Canvas)
        -> bool;

    /// Returns the bound geometry.
    fn geometry(&self) -> Option<&SharedGeometry>;

    /// Returns whether the renderer draws at all.
    fn is_visible(&self) -> bool;

    /// Shows or hides the renderer.
    fn set_visible(&mut self, visible: bool);
}

/// Creates an unbound renderer for the kind of `geometry`.
///
/// Returns `None` for kinds no renderer exists for.
pub fn create_renderer(geometry: &SharedGeometry) -> Option<Box<dyn GeometryRenderer>> {
    let kind = geometry.read().ok()?.kind();
    let renderer: Box<dyn GeometryRenderer> = match kind {
        GeometryKind::PointCloud => Box::new(PointCloudRenderer::new()),
        GeometryKind::TriangleMesh => Box::new(TriangleMeshRenderer::new()),
        GeometryKind::LineSet => Box::new(LineSetRenderer::new()),
        GeometryKind::Image => Box::new(ImageRenderer::new()),
        GeometryKind::Other(_) => return None,
    };
    Some(renderer)
}

/// State every renderer carries.
#[derive(Clone)]
pub(crate) struct RendererBase {
    pub id: RendererId,
    pub geometry: Option<SharedGeometry>,
    pub visible: bool,
}

impl RendererBase {
    pub fn new() -> Self {
        Self {
            id: RendererId::next(),
            geometry: None,
            visible: true,
        }
    }

    pub fn bind(&mut self, geometry: &SharedGeometry) {
        self.geometry = Some(Arc::clone(geometry));
    }
}

/// A batch rebuilt only when the inputs it was derived from change.
pub(crate) struct CachedBatch<K> {
    key: Option<K>,
    batch: Option<DrawBatch>,
}

impl<K: PartialEq> CachedBatch<K> {
    pub fn new() -> Self {
        Self {
            key: None,
            batch: None,
        }
    }

    /// Drops the cached batch so the next `get_or_build` rebuilds it.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.batch = None;
    }

    pub fn get_or_build(&mut self, key: K, build: impl FnOnce() -> DrawBatch) -> &DrawBatch {
        if self.key.as_ref() != Some(&key) {
            self.batch = None;
        }
        let batch = self.batch.get_or_insert_with(build);
        self.key = Some(key);
        batch
    }
}
