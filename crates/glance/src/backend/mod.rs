//! Window and event backends.
//!
//! A backend owns the window, translates platform events into
//! [`WindowEvent`]s, and hands out the [`Canvas`] the viewer draws into.

mod headless;
mod winit_backend;

use std::path::PathBuf;

use glance_core::{Result, WindowConfig};
use glance_render::Canvas;

pub use headless::HeadlessBackend;
pub use winit_backend::WinitBackend;

/// A keyboard key, reduced to what the viewer binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// The escape key.
    Escape,
    /// A printable key, lowercase (`'a'`, `'1'`, `'-'`, `'['`, ...).
    Char(char),
    /// Any other key.
    Other,
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

/// Whether a key or button went down, came up, or auto-repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        control: false,
        shift: false,
        alt: false,
        super_key: false,
    };

    /// Only control held.
    pub const CONTROL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
}

/// A platform event, already translated for the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The window contents must be redrawn.
    Refresh,
    /// The framebuffer changed size.
    Resized { width: u32, height: u32 },
    /// A key changed state.
    Key {
        key: Key,
        action: Action,
        modifiers: Modifiers,
    },
    /// A mouse button changed state.
    MouseButton {
        button: MouseButton,
        action: Action,
        modifiers: Modifiers,
    },
    /// The cursor moved, in window pixels.
    CursorMoved { x: f64, y: f64 },
    /// The wheel or touchpad scrolled, in lines.
    Scroll { dx: f64, dy: f64 },
    /// Files were dropped on the window.
    Dropped(Vec<PathBuf>),
    /// The user asked to close the window.
    CloseRequested,
}

/// A windowing system the viewer can run on.
///
/// All methods are called from the thread that created the window.
pub trait WindowBackend {
    /// The draw target this backend provides.
    type Canvas: Canvas;

    /// Opens the window and its GPU context.
    fn create_window(&mut self, config: &WindowConfig) -> Result<()>;

    /// Closes the window and drops its GPU context. Does nothing without a window.
    fn destroy_window(&mut self);

    /// Returns true while a window is open.
    fn is_window_created(&self) -> bool;

    /// Appends pending events without blocking.
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>);

    /// Blocks until at least one event is available, then appends them.
    fn wait_events(&mut self, events: &mut Vec<WindowEvent>);

    /// Returns the canvas of the open window.
    fn canvas(&mut self) -> Option<&mut Self::Canvas>;

    /// Returns the framebuffer size of the open window.
    fn framebuffer_size(&self) -> Option<(u32, u32)>;

    /// Changes the window title.
    fn set_title(&mut self, title: &str);
}
