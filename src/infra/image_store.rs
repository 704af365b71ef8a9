// ============================================================
// Layer 6 - Image Writer
// ============================================================
// Saves an ImageArray as a fixed-size picture for visual
// inspection of generated samples.
//
//   1. wrap the HWC buffer as Luma8 / Rgb8 / Rgba8
//   2. resize to exactly 128 x 128 with bicubic (Catmull-Rom)
//   3. save, format chosen from the file extension

use image::{imageops::FilterType, DynamicImage, GrayImage, RgbImage, RgbaImage};
use std::path::Path;

use crate::domain::image::ImageArray;
use crate::error::{Result, UtilError};

/// Output side length in pixels.
pub const SAMPLE_SIZE: u32 = 128;

pub fn save_image(array: &ImageArray, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let image = to_dynamic(array)?;
    let resized = image.resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::CatmullRom);
    resized.save(path)?;
    tracing::debug!("Saved {}x{} sample to '{}'", SAMPLE_SIZE, SAMPLE_SIZE, path.display());
    Ok(())
}

fn to_dynamic(array: &ImageArray) -> Result<DynamicImage> {
    let (w, h) = (array.width as u32, array.height as u32);
    let pixels = array.pixels.clone();
    let bad_buffer = || {
        UtilError::shape(format!(
            "pixel buffer of {} bytes does not match {:?}",
            array.pixels.len(),
            array.shape()
        ))
    };

    match array.channels {
        1 => GrayImage::from_raw(w, h, pixels)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(bad_buffer),
        3 => RgbImage::from_raw(w, h, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(bad_buffer),
        4 => RgbaImage::from_raw(w, h, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(bad_buffer),
        c => Err(UtilError::shape(format!(
            "cannot save an image with {c} channels (expected 1, 3 or 4)"
        ))),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resizes_to_sample_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        let array = ImageArray::new(4, 6, 3, vec![200; 4 * 6 * 3]);

        save_image(&array, &path).unwrap();
        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (128, 128));
        // a flat image stays flat after bicubic resampling
        assert_eq!(saved.to_rgb8().get_pixel(64, 64).0, [200, 200, 200]);
    }

    #[test]
    fn test_format_follows_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bmp");
        save_image(&ImageArray::new(2, 2, 1, vec![0, 64, 128, 255]), &path).unwrap();
        assert_eq!(image::ImageFormat::from_path(&path).unwrap(), image::ImageFormat::Bmp);
        assert!(image::open(&path).is_ok());
    }

    #[test]
    fn test_rejects_bad_buffers() {
        let dir = tempfile::tempdir().unwrap();
        let short = ImageArray::new(2, 2, 3, vec![0; 5]);
        assert!(matches!(save_image(&short, dir.path().join("a.png")), Err(UtilError::Shape(_))));
        let two = ImageArray::new(1, 1, 2, vec![0; 2]);
        assert!(matches!(save_image(&two, dir.path().join("b.png")), Err(UtilError::Shape(_))));
    }
}
