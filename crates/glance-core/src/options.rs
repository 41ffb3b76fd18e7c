//! Configuration options for glance.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Smallest allowed point size in pixels.
pub const POINT_SIZE_MIN: f32 = 1.0;
/// Largest allowed point size in pixels.
pub const POINT_SIZE_MAX: f32 = 25.0;
/// Point size change per step.
pub const POINT_SIZE_STEP: f32 = 1.0;

/// Parameters for creating the visualizer window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Client area width in logical pixels.
    pub width: u32,
    /// Client area height in logical pixels.
    pub height: u32,
    /// Horizontal position of the window.
    pub left: i32,
    /// Vertical position of the window.
    pub top: i32,
    /// Whether the window is shown on creation.
    pub visible: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "glance".to_string(),
            width: 640,
            height: 480,
            left: 50,
            top: 50,
            visible: true,
        }
    }
}

impl WindowConfig {
    /// Creates a config with the given title and size, other fields default.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Sets the window position.
    #[must_use]
    pub fn with_position(mut self, left: i32, top: i32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Sets the initial visibility.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// How point colors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PointColorOption {
    /// Stored colors if present, otherwise the color map over Z.
    #[default]
    Default,
    /// Stored colors if present, otherwise the color map over Z.
    Color,
    /// Color map over the X coordinate.
    XCoordinate,
    /// Color map over the Y coordinate.
    YCoordinate,
    /// Color map over the Z coordinate.
    ZCoordinate,
    /// Normals mapped to RGB.
    Normal,
}

/// How mesh colors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeshColorOption {
    /// Vertex colors if present, otherwise the default mesh color.
    #[default]
    Default,
    /// Vertex colors if present, otherwise the default mesh color.
    Color,
    /// Color map over the X coordinate.
    XCoordinate,
    /// Color map over the Y coordinate.
    YCoordinate,
    /// Color map over the Z coordinate.
    ZCoordinate,
    /// Normals mapped to RGB.
    Normal,
}

/// Mesh shading mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeshShadeOption {
    /// One normal per triangle.
    #[default]
    FlatShade,
    /// Interpolated vertex normals.
    SmoothShade,
}

/// Texture filtering for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageInterpolationOption {
    /// Nearest-neighbour sampling.
    #[default]
    Nearest,
    /// Bilinear sampling.
    Linear,
}

/// How images are fitted into the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageStretchOption {
    /// One image pixel per window pixel.
    OriginalSize,
    /// Fill as much of the window as possible without distortion.
    #[default]
    StretchKeepRatio,
    /// Fill the whole window.
    StretchWithWindow,
}

/// Color map used by coordinate-based color options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorMapOption {
    /// Black to white.
    Gray,
    /// Blue through cyan, yellow to red.
    #[default]
    Jet,
    /// Green to yellow.
    Summer,
    /// Blue to green.
    Winter,
    /// Black through red, yellow to white.
    Hot,
}

/// Appearance settings applied to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOption {
    /// Background color.
    pub background_color: Vec3,

    /// Point sprite size in pixels.
    pub point_size: f32,

    /// Line width in pixels. Backends that cannot draw wide lines ignore it.
    pub line_width: f32,

    /// Whether point normals are drawn as short segments.
    pub point_show_normal: bool,

    /// How point colors are chosen.
    pub point_color_option: PointColorOption,

    /// Whether back faces of meshes are drawn.
    pub mesh_show_back_face: bool,

    /// Whether mesh edges are drawn on top of the faces.
    pub mesh_show_wireframe: bool,

    /// Mesh shading mode.
    pub mesh_shade_option: MeshShadeOption,

    /// How mesh colors are chosen.
    pub mesh_color_option: MeshColorOption,

    /// Color used for meshes without vertex colors.
    pub default_mesh_color: Vec3,

    /// Whether the headlight is on.
    pub light_on: bool,

    /// Whether the coordinate-frame overlay is drawn.
    pub show_coordinate_frame: bool,

    /// Texture filtering for images.
    pub image_interpolation_option: ImageInterpolationOption,

    /// How images are fitted into the window.
    pub image_stretch_option: ImageStretchOption,

    /// Color map for coordinate-based color options.
    pub color_map: ColorMapOption,
}

impl Default for RenderOption {
    fn default() -> Self {
        Self {
            background_color: Vec3::ONE,
            point_size: 5.0,
            line_width: 1.0,
            point_show_normal: false,
            point_color_option: PointColorOption::Default,
            mesh_show_back_face: false,
            mesh_show_wireframe: false,
            mesh_shade_option: MeshShadeOption::FlatShade,
            mesh_color_option: MeshColorOption::Default,
            default_mesh_color: Vec3::splat(0.7),
            light_on: true,
            show_coordinate_frame: true,
            image_interpolation_option: ImageInterpolationOption::Nearest,
            image_stretch_option: ImageStretchOption::StretchKeepRatio,
            color_map: ColorMapOption::Jet,
        }
    }
}

impl RenderOption {
    /// Changes the point size by `steps` increments, clamped to the valid range.
    pub fn change_point_size(&mut self, steps: f32) {
        self.point_size =
            (self.point_size + steps * POINT_SIZE_STEP).clamp(POINT_SIZE_MIN, POINT_SIZE_MAX);
    }

    /// Toggles the headlight.
    pub fn toggle_light_on(&mut self) {
        self.light_on = !self.light_on;
    }

    /// Toggles back-face drawing.
    pub fn toggle_mesh_show_back_face(&mut self) {
        self.mesh_show_back_face = !self.mesh_show_back_face;
    }

    /// Toggles the wireframe overlay.
    pub fn toggle_mesh_show_wireframe(&mut self) {
        self.mesh_show_wireframe = !self.mesh_show_wireframe;
    }

    /// Switches between flat and smooth shading.
    pub fn toggle_shading_option(&mut self) {
        self.mesh_shade_option = match self.mesh_shade_option {
            MeshShadeOption::FlatShade => MeshShadeOption::SmoothShade,
            MeshShadeOption::SmoothShade => MeshShadeOption::FlatShade,
        };
    }

    /// Toggles point normal segments.
    pub fn toggle_point_show_normal(&mut self) {
        self.point_show_normal = !self.point_show_normal;
    }

    /// Switches between nearest and linear image filtering.
    pub fn toggle_interpolation_option(&mut self) {
        self.image_interpolation_option = match self.image_interpolation_option {
            ImageInterpolationOption::Nearest => ImageInterpolationOption::Linear,
            ImageInterpolationOption::Linear => ImageInterpolationOption::Nearest,
        };
    }

    /// Toggles the coordinate-frame overlay.
    pub fn toggle_show_coordinate_frame(&mut self) {
        self.show_coordinate_frame = !self.show_coordinate_frame;
    }

    /// Advances to the next image stretch mode.
    pub fn cycle_image_stretch_option(&mut self) {
        self.image_stretch_option = match self.image_stretch_option {
            ImageStretchOption::OriginalSize => ImageStretchOption::StretchKeepRatio,
            ImageStretchOption::StretchKeepRatio => ImageStretchOption::StretchWithWindow,
            ImageStretchOption::StretchWithWindow => ImageStretchOption::OriginalSize,
        };
    }

    /// Swaps between a black and a white background.
    pub fn toggle_background(&mut self) {
        self.background_color = if self.background_color.length_squared() > 1.5 {
            Vec3::ZERO
        } else {
            Vec3::ONE
        };
    }

    /// Loads options from a JSON file. Missing fields keep their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let option = serde_json::from_str(&text)?;
        log::debug!("loaded render option from {}", path.as_ref().display());
        Ok(option)
    }

    /// Writes options to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_size_clamping() {
        let mut option = RenderOption::default();
        option.change_point_size(100.0);
        assert_eq!(option.point_size, POINT_SIZE_MAX);
        option.change_point_size(-100.0);
        assert_eq!(option.point_size, POINT_SIZE_MIN);
        option.change_point_size(2.0);
        assert_eq!(option.point_size, 3.0);
    }

    #[test]
    fn test_toggles() {
        let mut option = RenderOption::default();
        option.toggle_shading_option();
        assert_eq!(option.mesh_shade_option, MeshShadeOption::SmoothShade);
        option.toggle_shading_option();
        assert_eq!(option.mesh_shade_option, MeshShadeOption::FlatShade);

        assert!(option.show_coordinate_frame);
        option.toggle_show_coordinate_frame();
        assert!(!option.show_coordinate_frame);

        option.toggle_background();
        assert_eq!(option.background_color, Vec3::ZERO);
        option.toggle_background();
        assert_eq!(option.background_color, Vec3::ONE);
    }

    #[test]
    fn test_stretch_cycle_returns_to_start() {
        let mut option = RenderOption::default();
        let start = option.image_stretch_option;
        for _ in 0..3 {
            option.cycle_image_stretch_option();
        }
        assert_eq!(option.image_stretch_option, start);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let option: RenderOption =
            serde_json::from_str(r#"{ "point_size": 9.0, "light_on": false }"#).unwrap();
        assert_eq!(option.point_size, 9.0);
        assert!(!option.light_on);
        assert_eq!(option.mesh_shade_option, MeshShadeOption::FlatShade);
    }

    #[test]
    fn test_window_config_builder() {
        let config = WindowConfig::new("scene", 800, 600)
            .with_position(10, 20)
            .with_visible(false);
        assert_eq!(config.title, "scene");
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!((config.left, config.top), (10, 20));
        assert!(!config.visible);
    }
}
