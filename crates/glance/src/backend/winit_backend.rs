//! The desktop backend: a winit window with a wgpu [`RenderEngine`].

use std::sync::Arc;
use std::time::Duration;

use glance_core::{GlanceError, Result, WindowConfig};
use glance_render::RenderEngine;
use pollster::FutureExt;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{ElementState, MouseScrollDelta};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use super::{Action, Key, Modifiers, MouseButton, WindowBackend, WindowEvent};

/// Pixels per scroll line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f64 = 20.0;

/// Upper bound on event-loop pumps while waiting for a window to open.
const MAX_CREATION_PUMPS: usize = 64;

/// A winit window driven by pumping the event loop from the caller's thread.
///
/// The event loop is created with the first window and reused for later
/// ones; winit allows one event loop per process, so only one `WinitBackend`
/// can ever open a window. Must be used from the main thread on platforms
/// that require it.
#[derive(Default)]
pub struct WinitBackend {
    event_loop: Option<EventLoop<()>>,
    app: WinitApp,
}

#[derive(Default)]
struct WinitApp {
    pending: Option<WindowConfig>,
    creation_error: Option<String>,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    events: Vec<WindowEvent>,
    modifiers: Modifiers,
}

impl WinitBackend {
    /// Creates a backend. No window or event loop exists until
    /// [`create_window`](WindowBackend::create_window).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the winit window, if one is open.
    pub fn window(&self) -> Option<&Arc<Window>> {
        self.app.window.as_ref()
    }

    fn pump(&mut self, timeout: Option<Duration>) -> PumpStatus {
        match &mut self.event_loop {
            Some(event_loop) => event_loop.pump_app_events(timeout, &mut self.app),
            None => PumpStatus::Exit(0),
        }
    }
}

impl WinitApp {
    fn open_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.pending.take() else {
            return;
        };

        let attributes = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_position(LogicalPosition::new(config.left, config.top))
            .with_visible(config.visible);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.creation_error = Some(err.to_string());
                return;
            }
        };

        match RenderEngine::new_windowed(window.clone()).block_on() {
            Ok(engine) => {
                self.engine = Some(engine);
                self.window = Some(window);
            }
            Err(err) => self.creation_error = Some(err.to_string()),
        }
    }

    fn translate(&mut self, event: winit::event::WindowEvent) -> Option<WindowEvent> {
        use winit::event::WindowEvent as W;

        let translated = match event {
            W::CloseRequested => WindowEvent::CloseRequested,
            W::Resized(size) => WindowEvent::Resized {
                width: size.width,
                height: size.height,
            },
            W::RedrawRequested => WindowEvent::Refresh,
            W::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = Modifiers {
                    control: state.control_key(),
                    shift: state.shift_key(),
                    alt: state.alt_key(),
                    super_key: state.super_key(),
                };
                return None;
            }
            W::KeyboardInput { event, .. } => WindowEvent::Key {
                key: translate_key(event.physical_key),
                action: match (event.state, event.repeat) {
                    (ElementState::Pressed, true) => Action::Repeat,
                    (ElementState::Pressed, false) => Action::Press,
                    (ElementState::Released, _) => Action::Release,
                },
                modifiers: self.modifiers,
            },
            W::MouseInput { state, button, .. } => WindowEvent::MouseButton {
                button: match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => MouseButton::Other,
                },
                action: match state {
                    ElementState::Pressed => Action::Press,
                    ElementState::Released => Action::Release,
                },
                modifiers: self.modifiers,
            },
            W::CursorMoved { position, .. } => WindowEvent::CursorMoved {
                x: position.x,
                y: position.y,
            },
            W::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(dx, dy) => WindowEvent::Scroll {
                    dx: f64::from(dx),
                    dy: f64::from(dy),
                },
                MouseScrollDelta::PixelDelta(pos) => WindowEvent::Scroll {
                    dx: pos.x / PIXELS_PER_LINE,
                    dy: pos.y / PIXELS_PER_LINE,
                },
            },
            W::DroppedFile(path) => WindowEvent::Dropped(vec![path]),
            _ => return None,
        };
        Some(translated)
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.open_pending(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: winit::event::WindowEvent,
    ) {
        if let Some(event) = self.translate(event) {
            self.events.push(event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // `resumed` only fires once per process; later windows open here
        self.open_pending(event_loop);
    }
}

impl WindowBackend for WinitBackend {
    type Canvas = RenderEngine;

    fn create_window(&mut self, config: &WindowConfig) -> Result<()> {
        if self.app.window.is_some() {
            return Ok(());
        }
        let _ = env_logger::try_init();

        if self.event_loop.is_none() {
            let event_loop =
                EventLoop::new().map_err(|e| GlanceError::WindowCreation(e.to_string()))?;
            self.event_loop = Some(event_loop);
        }

        self.app.pending = Some(config.clone());
        self.app.creation_error = None;
        for _ in 0..MAX_CREATION_PUMPS {
            if let PumpStatus::Exit(code) = self.pump(Some(Duration::ZERO)) {
                self.app.pending = None;
                return Err(GlanceError::WindowCreation(format!(
                    "event loop exited with code {code}"
                )));
            }
            if let Some(reason) = self.app.creation_error.take() {
                log::error!("window creation failed: {reason}");
                return Err(GlanceError::WindowCreation(reason));
            }
            if self.app.window.is_some() {
                log::info!(
                    "created window \"{}\" ({}x{})",
                    config.title,
                    config.width,
                    config.height
                );
                return Ok(());
            }
        }

        self.app.pending = None;
        Err(GlanceError::WindowCreation(
            "event loop never became ready".into(),
        ))
    }

    fn destroy_window(&mut self) {
        // The surface borrows the window, so the engine goes first
        self.app.engine = None;
        if self.app.window.take().is_some() {
            self.app.events.clear();
            let _ = self.pump(Some(Duration::ZERO));
            log::info!("destroyed window");
        }
    }

    fn is_window_created(&self) -> bool {
        self.app.window.is_some()
    }

    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        if let PumpStatus::Exit(_) = self.pump(Some(Duration::ZERO)) {
            self.app.events.push(WindowEvent::CloseRequested);
        }
        events.append(&mut self.app.events);
    }

    fn wait_events(&mut self, events: &mut Vec<WindowEvent>) {
        while self.app.events.is_empty() {
            if let PumpStatus::Exit(_) = self.pump(None) {
                self.app.events.push(WindowEvent::CloseRequested);
            }
        }
        events.append(&mut self.app.events);
    }

    fn canvas(&mut self) -> Option<&mut RenderEngine> {
        self.app.engine.as_mut()
    }

    fn framebuffer_size(&self) -> Option<(u32, u32)> {
        self.app.window.as_ref().map(|window| {
            let size = window.inner_size();
            (size.width.max(1), size.height.max(1))
        })
    }

    fn set_title(&mut self, title: &str) {
        if let Some(window) = &self.app.window {
            window.set_title(title);
        }
    }
}

/// Maps a physical key to the viewer's key set.
fn translate_key(key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = key else {
        return Key::Other;
    };
    let c = match code {
        KeyCode::Escape => return Key::Escape,
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        KeyCode::Digit0 | KeyCode::Numpad0 => '0',
        KeyCode::Digit1 | KeyCode::Numpad1 => '1',
        KeyCode::Digit2 | KeyCode::Numpad2 => '2',
        KeyCode::Digit3 | KeyCode::Numpad3 => '3',
        KeyCode::Digit4 | KeyCode::Numpad4 => '4',
        KeyCode::Digit5 | KeyCode::Numpad5 => '5',
        KeyCode::Digit6 | KeyCode::Numpad6 => '6',
        KeyCode::Digit7 | KeyCode::Numpad7 => '7',
        KeyCode::Digit8 | KeyCode::Numpad8 => '8',
        KeyCode::Digit9 | KeyCode::Numpad9 => '9',
        KeyCode::Minus | KeyCode::NumpadSubtract => '-',
        KeyCode::Equal | KeyCode::NumpadAdd => '=',
        KeyCode::BracketLeft => '[',
        KeyCode::BracketRight => ']',
        _ => return Key::Other,
    };
    Key::Char(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_translation() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Char('q'));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Numpad3)), Key::Char('3'));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::F1)), Key::Other);
    }

    #[test]
    fn test_backend_starts_closed() {
        let mut backend = WinitBackend::new();
        assert!(!backend.is_window_created());
        assert!(backend.canvas().is_none());
        assert!(backend.framebuffer_size().is_none());
    }
}
