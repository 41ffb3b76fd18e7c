//! 2D raster image geometry.

use std::any::Any;
use std::path::Path;

use glance_core::{AxisAlignedBoundingBox, Geometry, GeometryKind, GlanceError, Result};
use image::DynamicImage;

/// An 8-bit raster image with 1, 3 or 4 channels, stored row-major.
#[derive(Debug, Clone, Default)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channels per pixel.
    pub channels: u32,
    /// Pixel bytes, `width * height * channels` long.
    pub data: Vec<u8>,
}

impl Image {
    /// Creates an image from raw pixel bytes.
    pub fn new(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(GlanceError::Image(format!(
                "unsupported channel count {channels}"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(GlanceError::Image(format!(
                "expected {expected} bytes for {width}x{height}x{channels}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Loads an image file, converting to gray, RGB or RGBA as appropriate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|e| GlanceError::Image(format!("{}: {e}", path.display())))?;
        log::debug!(
            "loaded image {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(Self::from(decoded))
    }

    /// Returns the pixel at `(x, y)` expanded to RGBA.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels as usize;
        let i = (y as usize * self.width as usize + x as usize) * c;
        let px = self.data.get(i..i + c)?;
        Some(match c {
            1 => [px[0], px[0], px[0], 255],
            3 => [px[0], px[1], px[2], 255],
            _ => [px[0], px[1], px[2], px[3]],
        })
    }

    /// Returns the pixel data expanded to tightly packed RGBA.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.channels {
            4 => self.data.clone(),
            3 => self
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            _ => self.data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        }
    }
}

impl From<DynamicImage> for Image {
    fn from(decoded: DynamicImage) -> Self {
        let (width, height) = (decoded.width(), decoded.height());
        let (channels, data) = match decoded {
            DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
            other if other.color().has_alpha() => (4, other.into_rgba8().into_raw()),
            other if other.color().channel_count() <= 2 => (1, other.into_luma8().into_raw()),
            other => (3, other.into_rgb8().into_raw()),
        };
        Self {
            width,
            height,
            channels,
            data,
        }
    }
}

impl Geometry for Image {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> GeometryKind {
        GeometryKind::Image
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    fn bounding_box(&self) -> Option<AxisAlignedBoundingBox> {
        None
    }
}
