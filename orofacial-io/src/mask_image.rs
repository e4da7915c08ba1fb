//! Binary masks from and to image files.

use crate::Result;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use orofacial_core::{Mask, Point};
use std::path::Path;

/// Luminance weights applied to the R, G and B channels.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Radius in pixels of the tip marker drawn by [`tip_overlay`].
pub const TIP_MARKER_RADIUS: i64 = 2;

const TIP_MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Luminance above which a pixel is foreground (channels scaled to `[0, 1]`).
pub const FOREGROUND_THRESHOLD: f64 = 0.5;

/// Thresholds a decoded image into a mask.
///
/// Channels are scaled to `[0, 1]` regardless of bit depth; alpha is
/// ignored.
#[must_use]
pub fn mask_from_image(image: &DynamicImage) -> Mask {
    let rgb = image.to_rgb32f();
    Mask::from_fn(rgb.width(), rgb.height(), |x, y| {
        let pixel = rgb.get_pixel(x, y);
        let luma: f64 = pixel
            .0
            .iter()
            .zip(LUMA_WEIGHTS)
            .map(|(&channel, weight)| f64::from(channel) * weight)
            .sum();
        luma > FOREGROUND_THRESHOLD
    })
}

/// Loads an image file and thresholds it into a mask.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
pub fn load_mask_image<P: AsRef<Path>>(path: P) -> Result<Mask> {
    let path = path.as_ref();
    let image = image::open(path)?;
    let mask = mask_from_image(&image);
    log::debug!(
        "loaded {}x{} mask from {} ({} foreground pixels)",
        mask.width(),
        mask.height(),
        path.display(),
        mask.foreground_count()
    );
    Ok(mask)
}

/// Renders a mask as an 8-bit grayscale image (foreground = 255).
#[must_use]
pub fn mask_to_image(mask: &Mask) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.is_foreground(x, y) { 255 } else { 0 }])
    })
}

/// Writes a mask as a grayscale image; the format follows the extension.
///
/// # Errors
/// Returns an error if the image cannot be encoded or written.
pub fn save_mask_image<P: AsRef<Path>>(mask: &Mask, path: P) -> Result<()> {
    mask_to_image(mask).save(path)?;
    Ok(())
}

/// Renders the mask in grayscale with a red disk marking `tip`.
///
/// Marker pixels outside the image are clipped; a non-finite tip leaves
/// the mask unmarked.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn tip_overlay(mask: &Mask, tip: Point) -> RgbImage {
    let mut image = RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let level = if mask.is_foreground(x, y) { 255 } else { 0 };
        Rgb([level, level, level])
    });
    if !(tip.x.is_finite() && tip.y.is_finite()) {
        return image;
    }

    let (cx, cy) = (tip.x.round() as i64, tip.y.round() as i64);
    let radius = TIP_MARKER_RADIUS;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (Ok(x), Ok(y)) = (u32::try_from(cx + dx), u32::try_from(cy + dy)) else {
                continue;
            };
            if x < image.width() && y < image.height() {
                image.put_pixel(x, y, TIP_MARKER_COLOR);
            }
        }
    }
    image
}

/// Writes [`tip_overlay`] to an image file; the format follows the
/// extension.
///
/// # Errors
/// Returns an error if the image cannot be encoded or written.
pub fn save_tip_overlay<P: AsRef<Path>>(mask: &Mask, tip: Point, path: P) -> Result<()> {
    tip_overlay(mask, tip).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use tempfile::TempDir;

    #[test]
    fn test_threshold_rgb() {
        let mut img = RgbImage::new(4, 1);
        img.put_pixel(0, 0, Rgb([255, 255, 255]));
        img.put_pixel(1, 0, Rgb([0, 0, 0]));
        // Pure green: 0.587 luminance.
        img.put_pixel(2, 0, Rgb([0, 255, 0]));
        // Pure red: 0.2989 luminance.
        img.put_pixel(3, 0, Rgb([255, 0, 0]));

        let mask = mask_from_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(mask.as_slice(), &[true, false, true, false]);
    }

    #[test]
    fn test_alpha_ignored() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 255, 255, 0]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 0, 255]));
        let mask = mask_from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(mask.as_slice(), &[true, false]);
    }

    #[test]
    fn test_png_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mask.png");
        let mask = Mask::from_fn(9, 5, |x, y| (x + y) % 3 == 0);

        save_mask_image(&mask, &path).unwrap();
        let loaded = load_mask_image(&path).unwrap();
        assert_eq!(loaded, mask);
    }

    #[test]
    fn test_tip_overlay_marks_tip() {
        let mask = Mask::from_fn(12, 8, |x, _| x < 6);
        let overlay = tip_overlay(&mask, Point::new(5.4, 3.6));

        assert_eq!(overlay.dimensions(), (12, 8));
        // Marker centre rounds to (5, 4).
        assert_eq!(*overlay.get_pixel(5, 4), TIP_MARKER_COLOR);
        assert_eq!(*overlay.get_pixel(7, 4), TIP_MARKER_COLOR);
        assert_eq!(*overlay.get_pixel(5, 2), TIP_MARKER_COLOR);
        // Corner of the marker square lies outside the disk.
        assert_eq!(*overlay.get_pixel(7, 6), Rgb([0, 0, 0]));
        assert_eq!(*overlay.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*overlay.get_pixel(11, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_tip_overlay_clips_at_border() {
        let mask = Mask::from_fn(4, 4, |_, _| true);
        let overlay = tip_overlay(&mask, Point::new(0.0, 0.0));
        assert_eq!(*overlay.get_pixel(0, 0), TIP_MARKER_COLOR);
        assert_eq!(*overlay.get_pixel(2, 0), TIP_MARKER_COLOR);
        assert_eq!(*overlay.get_pixel(3, 3), Rgb([255, 255, 255]));

        let unmarked = tip_overlay(&mask, Point::new(f64::NAN, 1.0));
        assert!(unmarked.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_save_tip_overlay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("overlay.png");
        let mask = Mask::from_fn(6, 6, |x, y| x == y);
        save_tip_overlay(&mask, Point::new(3.0, 3.0), &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(*loaded.get_pixel(3, 3), TIP_MARKER_COLOR);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(load_mask_image(dir.path().join("absent.png")).is_err());
    }
}
