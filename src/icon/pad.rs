// src/icon/pad.rs
// =============================================================================
// This module shrinks an icon and centers it on a transparent canvas of the
// original size. Launchers that crop icons into circles (Android adaptive
// icons, for example) then don't cut off the artwork.
//
//   +----------+        +----------+
//   |##########|        |          |
//   |##########|  --->  |  ######  |
//   |##########|        |  ######  |
//   +----------+        +----------+
//
// We use the `image` crate which:
// - Opens PNG/JPEG/... files and converts them to RGBA
// - Resizes with a Lanczos3 filter (sharp, high quality)
// - Saves in the format given by the output file extension
// =============================================================================

use crate::error::IconError;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_SCALE: f64 = 0.65;

// Where the shrunken image ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

// Computes the scaled size and the centering offset
//
// Both use integer truncation: 100x100 at 0.65 gives a 65x65 image at (17, 17).
pub fn placement(width: u32, height: u32, scale: f64) -> Result<Placement, IconError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(IconError::InvalidScale(scale));
    }

    let new_width = (width as f64 * scale) as u32;
    let new_height = (height as f64 * scale) as u32;
    if new_width == 0 || new_height == 0 {
        return Err(IconError::EmptyResult {
            width,
            height,
            scale,
        });
    }

    // May be negative for scale > 1; the paste is clipped then
    Ok(Placement {
        width: new_width,
        height: new_height,
        x: (width as i64 - new_width as i64).div_euclid(2),
        y: (height as i64 - new_height as i64).div_euclid(2),
    })
}

// Pads an in-memory image, returning the new image and where the icon sits
pub fn pad_image(source: &RgbaImage, scale: f64) -> Result<(RgbaImage, Placement), IconError> {
    let (width, height) = source.dimensions();
    let placement = placement(width, height, scale)?;

    let resized = imageops::resize(source, placement.width, placement.height, FilterType::Lanczos3);

    // Fully transparent canvas at the original size
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    // replace (not overlay): copy pixels as they are, alpha included
    imageops::replace(&mut canvas, &resized, placement.x, placement.y);

    Ok((canvas, placement))
}

// Loads `input`, pads it and saves the result to `output`
pub fn add_padding(input: &Path, output: &Path, scale: f64) -> Result<Placement, IconError> {
    let source = image::open(input)?.to_rgba8();
    debug!(
        input = %input.display(),
        width = source.width(),
        height = source.height(),
        "loaded icon"
    );

    let (padded, placement) = pad_image(&source, scale)?;
    padded.save(output)?;

    println!("Saved padded icon to {}", output.display());
    Ok(placement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
    }

    #[test]
    fn test_default_scale_on_100px() {
        let p = placement(100, 100, DEFAULT_SCALE).unwrap();
        assert_eq!(
            p,
            Placement {
                width: 65,
                height: 65,
                x: 17,
                y: 17
            }
        );
    }

    #[test]
    fn test_non_square_truncates() {
        let p = placement(31, 10, 0.5).unwrap();
        assert_eq!((p.width, p.height), (15, 5));
        // (31 - 15) / 2 = 8, (10 - 5) / 2 = 2
        assert_eq!((p.x, p.y), (8, 2));
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(placement(10, 10, 0.0), Err(IconError::InvalidScale(_))));
        assert!(matches!(placement(10, 10, -1.0), Err(IconError::InvalidScale(_))));
        assert!(matches!(placement(10, 10, f64::NAN), Err(IconError::InvalidScale(_))));
        assert!(matches!(placement(1, 1, 0.5), Err(IconError::EmptyResult { .. })));
    }

    #[test]
    fn test_pad_image_centers_icon_on_transparent_canvas() {
        let (padded, p) = pad_image(&solid(100, 100), DEFAULT_SCALE).unwrap();

        assert_eq!(padded.dimensions(), (100, 100));

        // Corners and the strip left of the icon are transparent
        assert_eq!(padded.get_pixel(0, 0)[3], 0);
        assert_eq!(padded.get_pixel(99, 99)[3], 0);
        assert_eq!(padded.get_pixel(16, 50)[3], 0);
        assert_eq!(padded.get_pixel(82, 50)[3], 0);

        // The icon covers [17, 82) on both axes
        assert_eq!((p.x, p.y), (17, 17));
        assert_eq!(padded.get_pixel(17, 17)[3], 255);
        assert_eq!(padded.get_pixel(81, 81)[3], 255);
        assert_eq!(padded.get_pixel(50, 50), &Rgba([200, 30, 30, 255]));
    }

    #[test]
    fn test_scale_above_one_is_clipped() {
        let (padded, p) = pad_image(&solid(10, 10), 1.5).unwrap();
        assert_eq!(padded.dimensions(), (10, 10));
        assert_eq!((p.width, p.x), (15, -3));
        // Fully covered
        assert_eq!(padded.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_add_padding_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("icon.png");
        let output = dir.path().join("icon_foreground.png");
        solid(100, 100).save(&input).unwrap();

        let p = add_padding(&input, &output, DEFAULT_SCALE).unwrap();
        assert_eq!((p.width, p.height), (65, 65));

        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (100, 100));
        assert_eq!(written.get_pixel(0, 0)[3], 0);
        assert_eq!(written.get_pixel(50, 50)[3], 255);
    }

    #[test]
    fn test_add_padding_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = add_padding(
            &dir.path().join("nope.png"),
            &dir.path().join("out.png"),
            DEFAULT_SCALE,
        );
        assert!(matches!(result, Err(IconError::Image(_))));
    }
}
