//! Line set renderer.

use glam::Vec3;
use glance_core::{GeometryKind, RenderOption, SharedGeometry};
use glance_geometry::LineSet;

use crate::canvas::Canvas;
use crate::draw::{DrawBatch, DrawKey, DrawUniforms, Primitive, RendererId, Vertex};
use crate::renderer::{GeometryRenderer, RendererBase};
use crate::view_control::ViewControl;

fn lines_batch(lines: &LineSet) -> DrawBatch {
    let mut batch = DrawBatch::new(Primitive::Lines);
    let colored = lines.has_colors();
    for i in 0..lines.lines.len() {
        let Some((a, b)) = lines.segment(i) else {
            continue;
        };
        let color = if colored { lines.colors[i] } else { Vec3::ZERO };
        let base = batch.vertices.len() as u32;
        batch.vertices.push(Vertex::new(a, Vec3::ZERO, color));
        batch.vertices.push(Vertex::new(b, Vec3::ZERO, color));
        batch.indices.extend([base, base + 1]);
    }
    batch
}

/// Draws a [`LineSet`] as unlit colored segments.
pub struct LineSetRenderer {
    base: RendererBase,
    batch: Option<DrawBatch>,
}

impl LineSetRenderer {
    /// Creates an unbound renderer.
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            batch: None,
        }
    }
}

impl Default for LineSetRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryRenderer for LineSetRenderer {
    fn id(&self) -> RendererId {
        self.base.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::LineSet
    }

    fn initialize(&mut self, geometry: &SharedGeometry) -> bool {
        self.base.bind(geometry);
        if self.resync() {
            true
        } else {
            self.base.geometry = None;
            false
        }
    }

    fn resync(&mut self) -> bool {
        let Some(geometry) = &self.base.geometry else {
            return false;
        };
        let Ok(guard) = geometry.read() else {
            log::debug!("line set renderer {}: geometry lock poisoned", self.base.id);
            return false;
        };
        let Some(lines) = guard.as_any().downcast_ref::<LineSet>() else {
            return false;
        };
        self.batch = Some(lines_batch(lines));
        true
    }

    fn render(
        &mut self,
        option: &RenderOption,
        view: &ViewControl,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let Some(batch) = &self.batch else {
            return false;
        };
        if !self.base.visible || batch.is_empty() {
            return true;
        }
        let uniforms = DrawUniforms::new(view, option).unlit();
        canvas.draw(DrawKey::new(self.base.id, 0), batch, &uniforms);
        true
    }

    fn geometry(&self) -> Option<&SharedGeometry> {
        self.base.geometry.as_ref()
    }

    fn is_visible(&self) -> bool {
        self.base.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.base.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use glance_core::share;

    #[test]
    fn test_invalid_segments_are_dropped() {
        let lines = LineSet::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1], [1, 2], [2, 9]],
        );
        let batch = lines_batch(&lines);
        assert_eq!(batch.vertices.len(), 4);
        assert_eq!(batch.indices, vec![0, 1, 2, 3]);
        assert_eq!(batch.vertices[0].color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_per_line_colors() {
        let lines = LineSet::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1]])
            .with_colors(vec![Vec3::new(0.0, 1.0, 0.0)]);
        let batch = lines_batch(&lines);
        assert_eq!(batch.vertices[1].color, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_render_is_unlit() {
        let geometry: SharedGeometry =
            share(LineSet::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1]]));
        let mut renderer = LineSetRenderer::new();
        assert!(renderer.initialize(&geometry));

        let mut canvas = RecordingCanvas::new(16, 16);
        let journal = canvas.journal();
        canvas.begin_frame(Vec3::ONE);
        assert!(renderer.render(&RenderOption::default(), &ViewControl::default(), &mut canvas));
        let draws = journal.borrow().frame_draws.clone();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].flags & crate::draw::flags::LIGHTING, 0);
    }
}
