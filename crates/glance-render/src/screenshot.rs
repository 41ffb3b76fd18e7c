//! Encoding captured frames to image files.

use std::path::Path;

use image::{ImageBuffer, Rgba};

use crate::draw::CapturedImage;
use crate::error::{RenderError, RenderResult};

/// Saves a captured frame. The format follows the file extension
/// (`png`, `jpg`, `jpeg` or `bmp`).
pub fn save_image(path: &Path, capture: &CapturedImage) -> RenderResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(capture.width, capture.height, capture.rgba.clone())
            .ok_or(RenderError::InvalidImageData)?;

    match extension.as_str() {
        "png" => img.save_with_format(path, image::ImageFormat::Png)?,
        "bmp" => img.save_with_format(path, image::ImageFormat::Bmp)?,
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => return Err(RenderError::UnsupportedFormat(extension)),
    }

    log::info!("saved screen capture to {}", path.display());
    Ok(())
}

/// Swaps the red and blue channels in place, converting BGRA to RGBA.
pub fn bgra_to_rgba(data: &mut [u8]) {
    for chunk in data.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> CapturedImage {
        CapturedImage {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
        }
    }

    #[test]
    fn test_bgra_swap() {
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        bgra_to_rgba(&mut data);
        assert_eq!(data, vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn test_png_written() {
        let path = std::env::temp_dir().join(format!("glance_capture_{}.png", std::process::id()));
        save_image(&path, &tiny()).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (2, 1));
        assert_eq!(loaded.get_pixel(1, 0).0, [0, 0, 255, 255]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("glance_capture.tga");
        assert!(matches!(
            save_image(&path, &tiny()),
            Err(RenderError::UnsupportedFormat(ext)) if ext == "tga"
        ));
    }

    #[test]
    fn test_rejects_short_data() {
        let mut capture = tiny();
        capture.rgba.pop();
        let path = std::env::temp_dir().join("glance_capture_short.png");
        assert!(matches!(
            save_image(&path, &capture),
            Err(RenderError::InvalidImageData)
        ));
    }
}
