//! A scripted backend that needs no display or GPU.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glance_core::{GlanceError, Result, WindowConfig};
use glance_render::{Canvas, CanvasJournal, RecordingCanvas};

use super::{WindowBackend, WindowEvent};

/// Delivers pre-scripted event batches and draws into a [`RecordingCanvas`].
///
/// Each `poll_events`/`wait_events` call consumes one batch. Once the script
/// is exhausted, polling yields nothing and waiting yields
/// [`WindowEvent::CloseRequested`], since nothing could ever arrive.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    script: VecDeque<Vec<WindowEvent>>,
    canvas: Option<RecordingCanvas>,
    journal: Option<Rc<RefCell<CanvasJournal>>>,
    fail_window_creation: bool,
    title: String,
    windows_created: usize,
    windows_destroyed: usize,
}

impl HeadlessBackend {
    /// Creates a backend with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `create_window` call fail, as on a machine without a driver.
    #[must_use]
    pub fn with_window_creation_failure(mut self) -> Self {
        self.fail_window_creation = true;
        self
    }

    /// Appends one batch of events to the script.
    pub fn push_events(&mut self, events: impl IntoIterator<Item = WindowEvent>) {
        self.script.push_back(events.into_iter().collect());
    }

    /// Appends one batch holding a single event.
    pub fn push_event(&mut self, event: WindowEvent) {
        self.script.push_back(vec![event]);
    }

    /// Returns the number of scripted batches not yet delivered.
    pub fn pending_batches(&self) -> usize {
        self.script.len()
    }

    /// Returns the journal of the most recently created canvas.
    ///
    /// The journal outlives the window, so it can be inspected after teardown.
    pub fn journal(&self) -> Option<Rc<RefCell<CanvasJournal>>> {
        self.journal.clone()
    }

    /// Returns the current window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns how many windows were opened and closed.
    pub fn window_counts(&self) -> (usize, usize) {
        (self.windows_created, self.windows_destroyed)
    }
}

impl WindowBackend for HeadlessBackend {
    type Canvas = RecordingCanvas;

    fn create_window(&mut self, config: &WindowConfig) -> Result<()> {
        if self.fail_window_creation {
            return Err(GlanceError::WindowCreation(
                "headless backend configured to fail".into(),
            ));
        }
        let canvas = RecordingCanvas::new(config.width, config.height);
        self.journal = Some(canvas.journal());
        self.canvas = Some(canvas);
        self.title.clone_from(&config.title);
        self.windows_created += 1;
        Ok(())
    }

    fn destroy_window(&mut self) {
        if self.canvas.take().is_some() {
            self.windows_destroyed += 1;
        }
    }

    fn is_window_created(&self) -> bool {
        self.canvas.is_some()
    }

    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        if let Some(batch) = self.script.pop_front() {
            events.extend(batch);
        }
    }

    fn wait_events(&mut self, events: &mut Vec<WindowEvent>) {
        match self.script.pop_front() {
            Some(batch) if !batch.is_empty() => events.extend(batch),
            Some(_) => self.wait_events(events),
            None => events.push(WindowEvent::CloseRequested),
        }
    }

    fn canvas(&mut self) -> Option<&mut RecordingCanvas> {
        self.canvas.as_mut()
    }

    fn framebuffer_size(&self) -> Option<(u32, u32)> {
        self.canvas.as_ref().map(Canvas::size)
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_on_exhausted_script_closes() {
        let mut backend = HeadlessBackend::new();
        backend.create_window(&WindowConfig::default()).unwrap();
        let mut events = Vec::new();
        backend.wait_events(&mut events);
        assert_eq!(events, vec![WindowEvent::CloseRequested]);
    }

    #[test]
    fn test_wait_skips_empty_batches() {
        let mut backend = HeadlessBackend::new();
        backend.push_events(Vec::new());
        backend.push_event(WindowEvent::Refresh);
        let mut events = Vec::new();
        backend.wait_events(&mut events);
        assert_eq!(events, vec![WindowEvent::Refresh]);
        assert_eq!(backend.pending_batches(), 0);
    }

    #[test]
    fn test_poll_consumes_one_batch() {
        let mut backend = HeadlessBackend::new();
        backend.push_events([WindowEvent::Refresh, WindowEvent::CloseRequested]);
        backend.push_event(WindowEvent::Refresh);

        let mut events = Vec::new();
        backend.poll_events(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(backend.pending_batches(), 1);

        events.clear();
        backend.poll_events(&mut events);
        backend.poll_events(&mut events);
        assert_eq!(events, vec![WindowEvent::Refresh]);
    }

    #[test]
    fn test_creation_failure() {
        let mut backend = HeadlessBackend::new().with_window_creation_failure();
        assert!(backend.create_window(&WindowConfig::default()).is_err());
        assert!(!backend.is_window_created());
        assert!(backend.canvas().is_none());
    }

    #[test]
    fn test_journal_survives_destroy() {
        let mut backend = HeadlessBackend::new();
        backend
            .create_window(&WindowConfig::new("t", 320, 200))
            .unwrap();
        assert_eq!(backend.framebuffer_size(), Some((320, 200)));
        assert_eq!(backend.title(), "t");
        backend.destroy_window();
        backend.destroy_window();
        assert!(backend.journal().is_some());
        assert_eq!(backend.window_counts(), (1, 1));
    }
}
