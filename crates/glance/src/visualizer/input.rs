//! Translating window events into camera moves and option toggles.

use std::path::{Path, PathBuf};

use glance_core::{share, MeshColorOption, PointColorOption, SharedGeometry};
use glance_geometry::Image;
use glance_render::Canvas;

use super::Visualizer;
use crate::backend::{Action, Key, Modifiers, MouseButton, WindowBackend, WindowEvent};

/// Image extensions accepted by drag and drop.
const DROPPABLE_IMAGES: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Button, modifier and cursor state between input events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseControl {
    pub left_button_down: bool,
    pub middle_button_down: bool,
    pub control_key_down: bool,
    pub shift_key_down: bool,
    pub alt_key_down: bool,
    pub super_key_down: bool,
    /// Last cursor position in window pixels.
    pub mouse_position: (f64, f64),
}

impl MouseControl {
    fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.control_key_down = modifiers.control;
        self.shift_key_down = modifiers.shift;
        self.alt_key_down = modifiers.alt;
        self.super_key_down = modifiers.super_key;
    }
}

impl<B: WindowBackend> Visualizer<B> {
    pub(super) fn handle_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Refresh => self.update_render(),
            WindowEvent::Resized { width, height } => self.on_resize(width, height),
            WindowEvent::Key {
                key,
                action,
                modifiers,
            } => {
                self.mouse_control.set_modifiers(modifiers);
                // Releases are ignored
                if action != Action::Release {
                    self.on_key(key, modifiers);
                }
            }
            WindowEvent::MouseButton {
                button,
                action,
                modifiers,
            } => {
                self.mouse_control.set_modifiers(modifiers);
                let down = action != Action::Release;
                match button {
                    MouseButton::Left => self.mouse_control.left_button_down = down,
                    MouseButton::Middle => self.mouse_control.middle_button_down = down,
                    MouseButton::Right | MouseButton::Other => {}
                }
            }
            WindowEvent::CursorMoved { x, y } => self.on_cursor_moved(x, y),
            WindowEvent::Scroll { dy, .. } => self.on_scroll(dy),
            WindowEvent::Dropped(paths) => self.on_drop(&paths),
            WindowEvent::CloseRequested => self.close(),
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(canvas) = self.backend.canvas() {
            canvas.resize(width, height);
        }
        self.view_control.resize(width, height);
        self.update_render();
    }

    fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let (last_x, last_y) = self.mouse_control.mouse_position;
        self.mouse_control.mouse_position = (x, y);
        let (dx, dy) = ((x - last_x) as f32, (y - last_y) as f32);

        let mouse = &self.mouse_control;
        let panning = mouse.middle_button_down || (mouse.left_button_down && mouse.control_key_down);
        if panning {
            self.view_control.translate(dx, dy);
        } else if mouse.left_button_down {
            self.view_control.rotate(dx, dy);
        } else {
            return;
        }
        self.update_render();
    }

    fn on_scroll(&mut self, dy: f64) {
        if self.mouse_control.shift_key_down {
            self.view_control.change_field_of_view(dy as f32);
        } else {
            // Scrolling up moves closer
            self.view_control.scale(-dy as f32);
        }
        self.update_render();
    }

    fn on_key(&mut self, key: Key, modifiers: Modifiers) {
        let option = &mut self.render_option;
        let c = match key {
            Key::Escape => {
                self.close();
                return;
            }
            Key::Char(c) => c,
            Key::Other => return,
        };

        match c {
            'q' => {
                self.close();
                return;
            }
            'h' => {
                self.print_visualizer_help();
                return;
            }
            'r' => {
                self.reset_view_point(false);
                return;
            }
            'p' => {
                if let Err(err) = self.capture_screen_image(None) {
                    log::error!("screen capture failed: {err}");
                }
                return;
            }
            'c' if modifiers.control => {
                self.saved_view = Some(self.view_control.view_parameters());
                log::info!("view parameters copied");
                return;
            }
            'v' if modifiers.control => {
                match &self.saved_view {
                    Some(params) => self.view_control.set_view_parameters(params),
                    None => {
                        log::warn!("no view parameters copied yet");
                        return;
                    }
                }
            }
            'b' if modifiers.control => option.toggle_mesh_show_back_face(),
            '-' => option.change_point_size(-1.0),
            '=' => option.change_point_size(1.0),
            '[' => self.view_control.change_field_of_view(-1.0),
            ']' => self.view_control.change_field_of_view(1.0),
            'b' => option.toggle_background(),
            'l' => option.toggle_light_on(),
            's' => option.toggle_shading_option(),
            'w' => option.toggle_mesh_show_wireframe(),
            'n' => option.toggle_point_show_normal(),
            'f' => option.toggle_show_coordinate_frame(),
            'i' => option.toggle_interpolation_option(),
            't' => option.cycle_image_stretch_option(),
            '0'..='5' if modifiers.control => {
                option.mesh_color_option = mesh_color_for_digit(c);
            }
            '0'..='5' => option.point_color_option = point_color_for_digit(c),
            _ => return,
        }
        self.update_render();
    }

    fn on_drop(&mut self, paths: &[PathBuf]) {
        for path in paths {
            if !is_droppable_image(path) {
                log::info!("ignoring dropped file {}", path.display());
                continue;
            }
            let image = match Image::load(path) {
                Ok(image) => image,
                Err(err) => {
                    log::warn!("failed to load dropped image {}: {err}", path.display());
                    continue;
                }
            };
            let geometry: SharedGeometry = share(image);
            if let Err(err) = self.add_geometry(geometry, false) {
                log::warn!("failed to add dropped image {}: {err}", path.display());
            }
        }
    }
}

fn is_droppable_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DROPPABLE_IMAGES.contains(&e.to_lowercase().as_str()))
}

fn point_color_for_digit(c: char) -> PointColorOption {
    match c {
        '1' => PointColorOption::Color,
        '2' => PointColorOption::XCoordinate,
        '3' => PointColorOption::YCoordinate,
        '4' => PointColorOption::ZCoordinate,
        '5' => PointColorOption::Normal,
        _ => PointColorOption::Default,
    }
}

fn mesh_color_for_digit(c: char) -> MeshColorOption {
    match c {
        '1' => MeshColorOption::Color,
        '2' => MeshColorOption::XCoordinate,
        '3' => MeshColorOption::YCoordinate,
        '4' => MeshColorOption::ZCoordinate,
        '5' => MeshColorOption::Normal,
        _ => MeshColorOption::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_droppable_extensions() {
        assert!(is_droppable_image(Path::new("a/b/photo.PNG")));
        assert!(is_droppable_image(Path::new("x.jpeg")));
        assert!(!is_droppable_image(Path::new("mesh.ply")));
        assert!(!is_droppable_image(Path::new("noext")));
    }

    #[test]
    fn test_digit_mapping() {
        assert_eq!(point_color_for_digit('4'), PointColorOption::ZCoordinate);
        assert_eq!(point_color_for_digit('0'), PointColorOption::Default);
        assert_eq!(mesh_color_for_digit('5'), MeshColorOption::Normal);
    }
}
