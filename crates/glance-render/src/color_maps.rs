//! Color maps for coordinate-based coloring.

use glam::Vec3;
use glance_core::ColorMapOption;

/// A color map for mapping scalar values to colors.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Color map name.
    pub name: &'static str,
    /// Color samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new color map.
    pub fn new(name: &'static str, colors: Vec<Vec3>) -> Self {
        Self { name, colors }
    }

    /// Returns the color map selected by a render option.
    pub fn from_option(option: ColorMapOption) -> Self {
        match option {
            ColorMapOption::Gray => Self::new("gray", vec![Vec3::ZERO, Vec3::ONE]),
            ColorMapOption::Jet => Self::new(
                "jet",
                vec![
                    Vec3::new(0.0, 0.0, 0.5),
                    Vec3::new(0.0, 0.0, 1.0),
                    Vec3::new(0.0, 0.5, 1.0),
                    Vec3::new(0.0, 1.0, 1.0),
                    Vec3::new(0.5, 1.0, 0.5),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::new(1.0, 0.5, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(0.5, 0.0, 0.0),
                ],
            ),
            ColorMapOption::Summer => Self::new(
                "summer",
                vec![Vec3::new(0.0, 0.5, 0.4), Vec3::new(1.0, 1.0, 0.4)],
            ),
            ColorMapOption::Winter => Self::new(
                "winter",
                vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 0.5)],
            ),
            ColorMapOption::Hot => Self::new(
                "hot",
                vec![
                    Vec3::ZERO,
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::ONE,
                ],
            ),
        }
    }

    /// Samples the color map at a given value (0 to 1).
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        match self.colors.len() {
            0 => return Vec3::ZERO,
            1 => return self.colors[0],
            _ => {}
        }

        let n = self.colors.len() - 1;
        let idx = ((t * n as f32).floor() as usize).min(n - 1);
        let frac = t * n as f32 - idx as f32;

        self.colors[idx].lerp(self.colors[idx + 1], frac)
    }
}

/// Maps a unit normal to an RGB color.
pub fn normal_to_color(normal: Vec3) -> Vec3 {
    normal * 0.5 + Vec3::splat(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let gray = ColorMap::from_option(ColorMapOption::Gray);
        assert_eq!(gray.sample(0.0), Vec3::ZERO);
        assert_eq!(gray.sample(1.0), Vec3::ONE);
        assert!((gray.sample(0.25) - Vec3::splat(0.25)).length() < 1e-6);

        let jet = ColorMap::from_option(ColorMapOption::Jet);
        assert_eq!(jet.sample(0.0), Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(jet.sample(1.0), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_out_of_range_clamps() {
        let hot = ColorMap::from_option(ColorMapOption::Hot);
        assert_eq!(hot.sample(-3.0), hot.sample(0.0));
        assert_eq!(hot.sample(7.0), hot.sample(1.0));
    }

    #[test]
    fn test_normal_to_color() {
        assert_eq!(normal_to_color(Vec3::Z), Vec3::new(0.5, 0.5, 1.0));
        assert_eq!(normal_to_color(Vec3::NEG_X), Vec3::new(0.0, 0.5, 0.5));
    }
}
