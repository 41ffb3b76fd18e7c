//! Renderer for the world-axes overlay.

use glance_core::{GeometryKind, MeshColorOption, RenderOption, SharedGeometry};

use crate::canvas::Canvas;
use crate::draw::RendererId;
use crate::renderer::GeometryRenderer;
use crate::triangle_mesh_render::TriangleMeshRenderer;
use crate::view_control::ViewControl;

/// Draws the coordinate-frame mesh while `show_coordinate_frame` is set.
///
/// The axes always use their own vertex colors, whatever mesh color option
/// is active.
pub struct CoordinateFrameRenderer {
    inner: TriangleMeshRenderer,
}

impl CoordinateFrameRenderer {
    /// Creates an unbound renderer.
    pub fn new() -> Self {
        Self {
            inner: TriangleMeshRenderer::new(),
        }
    }
}

impl Default for CoordinateFrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryRenderer for CoordinateFrameRenderer {
    fn id(&self) -> RendererId {
        self.inner.id()
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::TriangleMesh
    }

    fn initialize(&mut self, geometry: &SharedGeometry) -> bool {
        self.inner.initialize(geometry)
    }

    fn resync(&mut self) -> bool {
        self.inner.resync()
    }

    fn render(
        &mut self,
        option: &RenderOption,
        view: &ViewControl,
        canvas: &mut dyn Canvas,
    ) -> bool {
        if self.inner.geometry().is_none() {
            return false;
        }
        if !option.show_coordinate_frame {
            return true;
        }
        let mut frame_option = option.clone();
        frame_option.mesh_color_option = MeshColorOption::Color;
        frame_option.mesh_show_wireframe = false;
        self.inner.render(&frame_option, view, canvas)
    }

    fn geometry(&self) -> Option<&SharedGeometry> {
        self.inner.geometry()
    }

    fn is_visible(&self) -> bool {
        self.inner.is_visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.inner.set_visible(visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use glam::Vec3;
    use glance_core::share;
    use glance_geometry::TriangleMesh;

    #[test]
    fn test_hidden_by_option() {
        let frame: SharedGeometry = share(TriangleMesh::create_coordinate_frame(1.0, Vec3::ZERO));
        let mut renderer = CoordinateFrameRenderer::new();
        assert!(renderer.initialize(&frame));

        let mut canvas = RecordingCanvas::new(16, 16);
        let journal = canvas.journal();
        let view = ViewControl::default();
        let mut option = RenderOption::default();

        canvas.begin_frame(Vec3::ONE);
        assert!(renderer.render(&option, &view, &mut canvas));
        assert_eq!(journal.borrow().frame_draws.len(), 1);

        option.toggle_show_coordinate_frame();
        canvas.begin_frame(Vec3::ONE);
        assert!(renderer.render(&option, &view, &mut canvas));
        assert!(journal.borrow().frame_draws.is_empty());
    }

    #[test]
    fn test_unbound_render_fails() {
        let mut renderer = CoordinateFrameRenderer::new();
        let mut canvas = RecordingCanvas::new(16, 16);
        assert!(!renderer.render(
            &RenderOption::default(),
            &ViewControl::default(),
            &mut canvas
        ));
    }
}
