//! Image editing tools that work on layer data: crop and color-key removal.
//!
//! Both produce a [`LayerPatch`] that the caller merges with
//! [`SceneStore::apply_and_commit`](crate::scene::SceneStore::apply_and_commit).

use std::ops::Range;
use std::sync::Arc;

use egui::{Pos2, Vec2};
use tiny_skia::PremultipliedColorU8;

use crate::color::Color;
use crate::error::ImageError;
use crate::image_source::PixelSource;
use crate::layer::{Crop, LayerPatch, MIN_CROP_SIZE};

/// Initial tolerance of the background-removal tool, in percent
pub const DEFAULT_TOLERANCE: f32 = 40.0;

/// Diameters offered for the removal brush, in image pixels
pub const BRUSH_SIZES: std::ops::RangeInclusive<f32> = 5.0..=100.0;
pub const DEFAULT_BRUSH_SIZE: f32 = 30.0;

pub fn normalize_crop(crop: Crop) -> Crop {
    crop.normalized()
}

/// Corner of the crop rectangle being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropCorner {
    TopLeft,
    BottomRight,
}

/// Move one corner of `crop` to `pointer`, given in normalized image
/// coordinates. The opposite corner stays put.
pub fn drag_crop_corner(crop: Crop, corner: CropCorner, pointer: Pos2) -> Crop {
    let px = pointer.x.clamp(0.0, 1.0);
    let py = pointer.y.clamp(0.0, 1.0);
    let moved = match corner {
        CropCorner::BottomRight => Crop {
            w: (px - crop.x).max(MIN_CROP_SIZE),
            h: (py - crop.y).max(MIN_CROP_SIZE),
            ..crop
        },
        CropCorner::TopLeft => {
            let x = px.min(crop.x + crop.w - MIN_CROP_SIZE);
            let y = py.min(crop.y + crop.h - MIN_CROP_SIZE);
            Crop {
                x,
                y,
                w: crop.w + (crop.x - x),
                h: crop.h + (crop.y - y),
            }
        }
    };
    moved.normalized()
}

/// Shift the whole crop window by `delta` (normalized), keeping its size.
pub fn move_crop(crop: Crop, delta: Vec2) -> Crop {
    Crop {
        x: crop.x + delta.x,
        y: crop.y + delta.y,
        ..crop
    }
    .normalized()
}

/// Patch setting (or with `None`, clearing) an image layer's crop
pub fn crop_patch(crop: Option<Crop>) -> LayerPatch {
    LayerPatch {
        crop: Some(crop.map(normalize_crop)),
        ..Default::default()
    }
}

/// Make every pixel within `tolerance` percent of `target` transparent.
///
/// Distance is Euclidean in RGB; 100 % equals 255.
pub fn remove_color(source: &PixelSource, target: Color, tolerance: f32) -> PixelSource {
    let limit = tolerance_limit(tolerance);
    let mut pixmap = source.pixmap().clone();
    for px in pixmap.pixels_mut() {
        if near_color(*px, target, limit) {
            *px = PremultipliedColorU8::TRANSPARENT;
        }
    }
    PixelSource::from_pixmap(pixmap)
}

fn tolerance_limit(tolerance: f32) -> f32 {
    tolerance.max(0.0) * 2.55
}

fn near_color(px: PremultipliedColorU8, target: Color, limit: f32) -> bool {
    let c = px.demultiply();
    let dr = c.red() as f32 - target.r as f32;
    let dg = c.green() as f32 - target.g as f32;
    let db = c.blue() as f32 - target.b as f32;
    (dr * dr + dg * dg + db * db).sqrt() <= limit
}

/// Pixel index ranges covered by the square of half-side `radius` around `center`
fn brush_bounds(width: u32, height: u32, center: Pos2, radius: f32) -> (Range<usize>, Range<usize>) {
    let r = radius.max(0.0);
    let span = |c: f32, len: u32| {
        let lo = (c - r).floor().max(0.0) as usize;
        let hi = ((c + r).ceil().max(0.0) as usize).min(len as usize);
        lo..hi.max(lo)
    };
    (span(center.x, width), span(center.y, height))
}

/// [`remove_color`] limited to the square of side `2 * radius` around
/// `center`, in image pixels.
pub fn brush_erase(
    working: &PixelSource,
    center: Pos2,
    radius: f32,
    target: Color,
    tolerance: f32,
) -> PixelSource {
    let limit = tolerance_limit(tolerance);
    let mut pixmap = working.pixmap().clone();
    let width = pixmap.width() as usize;
    let (xs, ys) = brush_bounds(pixmap.width(), pixmap.height(), center, radius);
    let pixels = pixmap.pixels_mut();
    for y in ys {
        for x in xs.clone() {
            let px = &mut pixels[y * width + x];
            if near_color(*px, target, limit) {
                *px = PremultipliedColorU8::TRANSPARENT;
            }
        }
    }
    PixelSource::from_pixmap(pixmap)
}

/// Copy pixels within `radius` of `center` back from `original`.
///
/// Sources of different sizes leave `working` unchanged.
pub fn brush_restore(
    working: &PixelSource,
    original: &PixelSource,
    center: Pos2,
    radius: f32,
) -> PixelSource {
    let mut pixmap = working.pixmap().clone();
    if (original.width(), original.height()) != (pixmap.width(), pixmap.height()) {
        log::warn!("Restore brush ignored: pristine copy has a different size");
        return PixelSource::from_pixmap(pixmap);
    }
    let width = pixmap.width() as usize;
    let (xs, ys) = brush_bounds(pixmap.width(), pixmap.height(), center, radius);
    let source = original.pixmap().pixels();
    let pixels = pixmap.pixels_mut();
    for y in ys {
        for x in xs.clone() {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius * radius {
                pixels[y * width + x] = source[y * width + x];
            }
        }
    }
    PixelSource::from_pixmap(pixmap)
}

/// Run [`remove_color`] and package the result as a new image source.
pub fn background_removal_patch(
    source: &PixelSource,
    target: Color,
    tolerance: f32,
) -> Result<LayerPatch, ImageError> {
    replace_source_patch(remove_color(source, target, tolerance))
}

/// Patch swapping an image layer's pixels for `pixels`, re-encoded as PNG.
pub fn replace_source_patch(pixels: PixelSource) -> Result<LayerPatch, ImageError> {
    let src = pixels.to_png_data_url()?;
    Ok(LayerPatch {
        src: Some(src),
        pixels: Some(Arc::new(pixels)),
        ..Default::default()
    })
}

/// Unpremultiplied color at integer pixel coordinates
pub fn sample_color(source: &PixelSource, x: u32, y: u32) -> Option<Color> {
    let c = source.pixmap().pixel(x, y)?.demultiply();
    Some(Color::rgba(c.red(), c.green(), c.blue(), c.alpha()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn two_tone() -> PixelSource {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([250, 250, 250, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 200, 255]));
        PixelSource::from_rgba_image(&img).unwrap()
    }

    #[test]
    fn test_remove_color_within_tolerance() {
        let out = remove_color(&two_tone(), Color::WHITE, 10.0);
        assert_eq!(sample_color(&out, 0, 0).unwrap().a, 0);
        assert_eq!(sample_color(&out, 1, 0).unwrap(), Color::rgb(0, 0, 200));
    }

    #[test]
    fn test_zero_tolerance_keeps_near_matches() {
        let out = remove_color(&two_tone(), Color::WHITE, 0.0);
        assert_eq!(sample_color(&out, 0, 0).unwrap().a, 255);
    }

    #[test]
    fn test_removal_patch_carries_src_and_pixels() {
        let patch = background_removal_patch(&two_tone(), Color::WHITE, 10.0).unwrap();
        assert!(patch.src.unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(patch.pixels.unwrap().width(), 2);
    }

    #[test]
    fn test_crop_corners_keep_minimum_size() {
        let crop = Crop { x: 0.2, y: 0.2, w: 0.5, h: 0.5 };
        let br = drag_crop_corner(crop, CropCorner::BottomRight, pos2(0.1, 2.0));
        assert_eq!((br.x, br.w), (0.2, MIN_CROP_SIZE));
        assert!((br.h - 0.8).abs() < 1e-6);

        let tl = drag_crop_corner(crop, CropCorner::TopLeft, pos2(0.9, 0.0));
        assert!((tl.x - (0.7 - MIN_CROP_SIZE)).abs() < 1e-6);
        assert!((tl.x + tl.w - 0.7).abs() < 1e-6);
        assert_eq!(tl.y, 0.0);
    }

    #[test]
    fn test_move_crop_stops_at_edges() {
        let crop = Crop { x: 0.2, y: 0.2, w: 0.5, h: 0.5 };
        let moved = move_crop(crop, egui::vec2(1.0, -0.1));
        assert!((moved.x - 0.5).abs() < 1e-6);
        assert!((moved.y - 0.1).abs() < 1e-6);
        assert_eq!((moved.w, moved.h), (0.5, 0.5));
    }

    #[test]
    fn test_crop_patch_normalizes() {
        let patch = crop_patch(Some(Crop { x: -1.0, y: 0.0, w: 0.0, h: 1.0 }));
        let crop = patch.crop.unwrap().unwrap();
        assert_eq!((crop.x, crop.w), (0.0, MIN_CROP_SIZE));
        assert!(crop_patch(None).crop.unwrap().is_none());
    }

    /// 8×8 white square with one blue pixel in the middle
    fn white_with_blue_dot() -> PixelSource {
        let mut img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        img.put_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
        PixelSource::from_rgba_image(&img).unwrap()
    }

    #[test]
    fn test_brush_erase_stays_inside_square() {
        let src = white_with_blue_dot();
        let out = brush_erase(&src, pos2(4.0, 4.0), 2.0, Color::WHITE, 10.0);
        // inside the 4×4 square: white cleared, blue kept
        assert_eq!(sample_color(&out, 2, 2).unwrap().a, 0);
        assert_eq!(sample_color(&out, 5, 5).unwrap().a, 0);
        assert_eq!(sample_color(&out, 4, 4).unwrap(), Color::rgb(0, 0, 255));
        // outside untouched
        assert_eq!(sample_color(&out, 6, 6).unwrap(), Color::WHITE);
        assert_eq!(sample_color(&out, 0, 0).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_brush_off_image_is_harmless() {
        let src = white_with_blue_dot();
        let out = brush_erase(&src, pos2(-50.0, 100.0), 5.0, Color::WHITE, 100.0);
        assert_eq!(out.pixmap().data(), src.pixmap().data());
    }

    #[test]
    fn test_brush_restore_copies_circle_from_original() {
        let original = white_with_blue_dot();
        let cleared = remove_color(&original, Color::WHITE, 10.0);
        let out = brush_restore(&cleared, &original, pos2(1.0, 1.0), 1.5);
        assert_eq!(sample_color(&out, 0, 0).unwrap(), Color::WHITE);
        assert_eq!(sample_color(&out, 1, 1).unwrap(), Color::WHITE);
        // pixel center (2.5, 2.5) lies outside the circle
        assert_eq!(sample_color(&out, 2, 2).unwrap().a, 0);
        assert_eq!(sample_color(&out, 7, 7).unwrap().a, 0);
    }

    #[test]
    fn test_brush_restore_ignores_mismatched_original() {
        let cleared = remove_color(&white_with_blue_dot(), Color::WHITE, 10.0);
        let out = brush_restore(&cleared, &two_tone(), pos2(1.0, 1.0), 5.0);
        assert_eq!(sample_color(&out, 0, 0).unwrap().a, 0);
    }
}
