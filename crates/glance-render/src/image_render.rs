//! Screen-space image renderer.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use glance_core::{GeometryKind, ImageStretchOption, RenderOption, SharedGeometry};
use glance_geometry::Image;

use crate::canvas::Canvas;
use crate::draw::{
    next_generation, DrawBatch, DrawKey, DrawUniforms, ImageTexture, Primitive, RendererId,
    Vertex,
};
use crate::renderer::{CachedBatch, GeometryRenderer, RendererBase};
use crate::view_control::ViewControl;

/// Half extents of the image quad in normalized device coordinates.
pub fn quad_half_extents(
    stretch: ImageStretchOption,
    image: (u32, u32),
    window: (u32, u32),
) -> Vec2 {
    let (iw, ih) = (image.0.max(1) as f32, image.1.max(1) as f32);
    let (ww, wh) = (window.0.max(1) as f32, window.1.max(1) as f32);
    match stretch {
        ImageStretchOption::OriginalSize => Vec2::new(iw / ww, ih / wh),
        ImageStretchOption::StretchKeepRatio => {
            let scale = (ww / iw).min(wh / ih);
            Vec2::new(iw * scale / ww, ih * scale / wh)
        }
        ImageStretchOption::StretchWithWindow => Vec2::ONE,
    }
}

fn quad_batch(texture: &ImageTexture, half: Vec2) -> DrawBatch {
    let mut batch = DrawBatch::new(Primitive::Image);
    // Top-left first, counter-clockwise; uv origin is the top-left pixel
    let corners = [
        (Vec2::new(-half.x, half.y), [0.0, 0.0]),
        (Vec2::new(-half.x, -half.y), [0.0, 1.0]),
        (Vec2::new(half.x, -half.y), [1.0, 1.0]),
        (Vec2::new(half.x, half.y), [1.0, 0.0]),
    ];
    batch.vertices = corners
        .iter()
        .map(|(p, uv)| Vertex {
            uv: *uv,
            ..Vertex::new(p.extend(0.0), Vec3::Z, Vec3::ONE)
        })
        .collect();
    batch.indices = vec![0, 1, 2, 0, 2, 3];
    batch.texture = Some(texture.clone());
    batch
}

/// Draws an [`Image`] as a textured quad fitted to the window.
pub struct ImageRenderer {
    base: RendererBase,
    texture: Option<ImageTexture>,
    quad: CachedBatch<(ImageStretchOption, u32, u32)>,
}

impl ImageRenderer {
    /// Creates an unbound renderer.
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            texture: None,
            quad: CachedBatch::new(),
        }
    }
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryRenderer for ImageRenderer {
    fn id(&self) -> RendererId {
        self.base.id
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Image
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
            log::debug!("image renderer {}: geometry lock poisoned", self.base.id);
            return false;
        };
        let Some(image) = guard.as_any().downcast_ref::<Image>() else {
            return false;
        };
        self.texture = Some(ImageTexture {
            width: image.width,
            height: image.height,
            rgba: Arc::new(image.to_rgba8()),
            revision: next_generation(),
        });
        self.quad.invalidate();
        true
    }

    fn render(
        &mut self,
        option: &RenderOption,
        view: &ViewControl,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let Some(texture) = &self.texture else {
            return false;
        };
        if !self.base.visible || texture.width == 0 || texture.height == 0 {
            return true;
        }
        let window = canvas.size();
        let stretch = option.image_stretch_option;
        let quad = self.quad.get_or_build((stretch, window.0, window.1), || {
            let half = quad_half_extents(stretch, (texture.width, texture.height), window);
            quad_batch(texture, half)
        });
        let uniforms = DrawUniforms::new(view, option).unlit();
        canvas.draw(DrawKey::new(self.base.id, 0), quad, &uniforms);
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
    fn test_quad_extents() {
        let half = quad_half_extents(ImageStretchOption::OriginalSize, (100, 50), (200, 200));
        assert_eq!(half, Vec2::new(0.5, 0.25));

        let half = quad_half_extents(ImageStretchOption::StretchKeepRatio, (100, 50), (200, 200));
        assert_eq!(half, Vec2::new(1.0, 0.5));

        let half = quad_half_extents(ImageStretchOption::StretchWithWindow, (100, 50), (200, 200));
        assert_eq!(half, Vec2::ONE);
    }

    #[test]
    fn test_resize_rebuilds_quad_but_keeps_texture() {
        let geometry: SharedGeometry = share(Image::new(2, 2, 3, vec![0; 12]).unwrap());
        let mut renderer = ImageRenderer::new();
        assert!(renderer.initialize(&geometry));

        let mut canvas = RecordingCanvas::new(64, 32);
        let journal = canvas.journal();
        let option = RenderOption::default();
        let view = ViewControl::default();

        canvas.begin_frame(Vec3::ONE);
        renderer.render(&option, &view, &mut canvas);
        let first = journal.borrow().frame_draws[0].generation;
        let revision = renderer.texture.as_ref().unwrap().revision;

        canvas.resize(32, 32);
        canvas.begin_frame(Vec3::ONE);
        renderer.render(&option, &view, &mut canvas);
        let second = journal.borrow().frame_draws[0].generation;
        assert_ne!(first, second);
        assert_eq!(renderer.texture.as_ref().unwrap().revision, revision);
        assert_eq!(journal.borrow().frame_draws[0].primitive, Primitive::Image);
    }
}
