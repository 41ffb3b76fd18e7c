//! The draw surface renderers submit batches to.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;

use crate::draw::{CapturedImage, DrawBatch, DrawKey, DrawUniforms, Primitive, RendererId};
use crate::error::{RenderError, RenderResult};

/// A frame target that accepts draw batches.
///
/// A frame is `begin_frame`, any number of `draw` calls, then `present`.
/// Implementations cache GPU resources per [`DrawKey`] and re-upload only when
/// a batch's generation changes.
pub trait Canvas {
    /// Starts a frame cleared to `background`.
    fn begin_frame(&mut self, background: Vec3);

    /// Queues a batch for the current frame.
    fn draw(&mut self, key: DrawKey, batch: &DrawBatch, uniforms: &DrawUniforms);

    /// Resizes the target.
    fn resize(&mut self, width: u32, height: u32);

    /// Returns the target size in pixels.
    fn size(&self) -> (u32, u32);

    /// Frees every resource cached for `renderer`.
    fn release(&mut self, renderer: RendererId);

    /// Finishes the frame and shows it.
    fn present(&mut self) -> RenderResult<()>;

    /// Reads back the last presented frame.
    fn capture(&mut self) -> RenderResult<CapturedImage>;
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Batch address.
    pub key: DrawKey,
    /// Assembly mode.
    pub primitive: Primitive,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of indices.
    pub index_count: usize,
    /// Batch generation at draw time.
    pub generation: u64,
    /// Uniform flags at draw time.
    pub flags: u32,
    /// Point size at draw time.
    pub point_size: f32,
}

/// Everything a [`RecordingCanvas`] has seen.
#[derive(Debug, Clone, Default)]
pub struct CanvasJournal {
    /// Number of `begin_frame` calls.
    pub frames_begun: usize,
    /// Number of successful presents.
    pub presents: usize,
    /// Draws of the frame in progress or last presented.
    pub frame_draws: Vec<DrawRecord>,
    /// Total number of draw calls.
    pub total_draws: usize,
    /// Number of batch uploads (first sight of a key or a new generation).
    pub uploads: usize,
    /// Released renderers, in release order.
    pub releases: Vec<RendererId>,
    /// Background of the last frame.
    pub background: Option<Vec3>,
    /// Every resize request.
    pub resizes: Vec<(u32, u32)>,
}

impl CanvasJournal {
    /// Returns how many times `renderer` was released.
    pub fn release_count(&self, renderer: RendererId) -> usize {
        self.releases.iter().filter(|r| **r == renderer).count()
    }

    /// Returns the draws of the current frame belonging to `renderer`.
    pub fn draws_of(&self, renderer: RendererId) -> impl Iterator<Item = &DrawRecord> {
        self.frame_draws
            .iter()
            .filter(move |d| d.key.renderer == renderer)
    }
}

/// A canvas that records calls instead of drawing.
///
/// The journal is shared so tests can inspect it while the canvas is owned
/// elsewhere.
#[derive(Debug)]
pub struct RecordingCanvas {
    journal: Rc<RefCell<CanvasJournal>>,
    uploaded: HashMap<DrawKey, u64>,
    width: u32,
    height: u32,
    in_frame: bool,
}

impl RecordingCanvas {
    /// Creates a canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            journal: Rc::new(RefCell::new(CanvasJournal::default())),
            uploaded: HashMap::new(),
            width: width.max(1),
            height: height.max(1),
            in_frame: false,
        }
    }

    /// Returns a handle to the shared journal.
    pub fn journal(&self) -> Rc<RefCell<CanvasJournal>> {
        Rc::clone(&self.journal)
    }

    /// Returns the number of batches currently cached.
    pub fn cached_batches(&self) -> usize {
        self.uploaded.len()
    }
}

impl Canvas for RecordingCanvas {
    fn begin_frame(&mut self, background: Vec3) {
        let mut journal = self.journal.borrow_mut();
        journal.frames_begun += 1;
        journal.frame_draws.clear();
        journal.background = Some(background);
        self.in_frame = true;
    }

    fn draw(&mut self, key: DrawKey, batch: &DrawBatch, uniforms: &DrawUniforms) {
        if batch.is_empty() {
            return;
        }
        let mut journal = self.journal.borrow_mut();
        if self.uploaded.insert(key, batch.generation) != Some(batch.generation) {
            journal.uploads += 1;
        }
        journal.total_draws += 1;
        journal.frame_draws.push(DrawRecord {
            key,
            primitive: batch.primitive,
            vertex_count: batch.vertices.len(),
            index_count: batch.indices.len(),
            generation: batch.generation,
            flags: uniforms.flags,
            point_size: uniforms.point_size,
        });
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.journal.borrow_mut().resizes.push((width, height));
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self, renderer: RendererId) {
        self.uploaded.retain(|key, _| key.renderer != renderer);
        self.journal.borrow_mut().releases.push(renderer);
    }

    fn present(&mut self) -> RenderResult<()> {
        if !self.in_frame {
            return Err(RenderError::NoFrame);
        }
        self.in_frame = false;
        self.journal.borrow_mut().presents += 1;
        Ok(())
    }

    fn capture(&mut self) -> RenderResult<CapturedImage> {
        let journal = self.journal.borrow();
        if journal.presents == 0 {
            return Err(RenderError::NoFrame);
        }
        let background = journal.background.unwrap_or(Vec3::ONE);
        let pixel = [
            (background.x.clamp(0.0, 1.0) * 255.0).round() as u8,
            (background.y.clamp(0.0, 1.0) * 255.0).round() as u8,
            (background.z.clamp(0.0, 1.0) * 255.0).round() as u8,
            255,
        ];
        let count = self.width as usize * self.height as usize;
        Ok(CapturedImage {
            width: self.width,
            height: self.height,
            rgba: pixel.repeat(count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Vertex;
    use crate::view_control::ViewControl;
    use glance_core::RenderOption;

    fn point_batch() -> DrawBatch {
        let mut batch = DrawBatch::new(Primitive::Points);
        batch
            .vertices
            .push(Vertex::new(Vec3::ZERO, Vec3::Z, Vec3::ONE));
        batch
    }

    #[test]
    fn test_uploads_only_on_new_generation() {
        let mut canvas = RecordingCanvas::new(4, 4);
        let journal = canvas.journal();
        let uniforms = DrawUniforms::new(&ViewControl::default(), &RenderOption::default());
        let key = DrawKey::new(RendererId::next(), 0);
        let mut batch = point_batch();

        for _ in 0..3 {
            canvas.begin_frame(Vec3::ONE);
            canvas.draw(key, &batch, &uniforms);
            canvas.present().unwrap();
        }
        assert_eq!(journal.borrow().uploads, 1);
        assert_eq!(journal.borrow().total_draws, 3);

        batch.generation = crate::draw::next_generation();
        canvas.begin_frame(Vec3::ONE);
        canvas.draw(key, &batch, &uniforms);
        canvas.present().unwrap();
        assert_eq!(journal.borrow().uploads, 2);
    }

    #[test]
    fn test_release_drops_cache() {
        let mut canvas = RecordingCanvas::new(4, 4);
        let uniforms = DrawUniforms::new(&ViewControl::default(), &RenderOption::default());
        let id = RendererId::next();
        canvas.begin_frame(Vec3::ZERO);
        canvas.draw(DrawKey::new(id, 0), &point_batch(), &uniforms);
        canvas.draw(DrawKey::new(id, 1), &point_batch(), &uniforms);
        assert_eq!(canvas.cached_batches(), 2);

        canvas.release(id);
        assert_eq!(canvas.cached_batches(), 0);
        assert_eq!(canvas.journal().borrow().release_count(id), 1);
    }

    #[test]
    fn test_capture_requires_presented_frame() {
        let mut canvas = RecordingCanvas::new(2, 3);
        assert!(matches!(canvas.capture(), Err(RenderError::NoFrame)));
        assert!(matches!(canvas.present(), Err(RenderError::NoFrame)));

        canvas.begin_frame(Vec3::new(1.0, 0.0, 0.0));
        canvas.present().unwrap();
        let image = canvas.capture().unwrap();
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.rgba.len(), 2 * 3 * 4);
        assert_eq!(&image.rgba[..4], &[255, 0, 0, 255]);
    }
}
