//! Path builders for the silhouette and shape primitives. Shapes are
//! built in the layer's local, unscaled frame, centered on the origin.

use std::f32::consts::{FRAC_PI_2, TAU};

use tiny_skia::{Path, PathBuilder, Rect};

use crate::layer::{ArrowShape, LineShape, StarShape};

/// Bezier handle length for a quarter circle
const KAPPA: f32 = 0.552_284_8;

pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(Rect::from_xywh(x, y, w, h)?));
    }
    let k = r * KAPPA;
    let (right, bottom) = (x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

pub fn polygon(points: &[(f32, f32)]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();
    pb.finish()
}

pub fn ellipse(w: f32, h: f32) -> Option<Path> {
    PathBuilder::from_oval(Rect::from_xywh(-w / 2.0, -h / 2.0, w, h)?)
}

pub fn triangle(w: f32, h: f32) -> Option<Path> {
    polygon(&[(0.0, -h / 2.0), (w / 2.0, h / 2.0), (-w / 2.0, h / 2.0)])
}

pub fn diamond(w: f32, h: f32) -> Option<Path> {
    polygon(&[(0.0, -h / 2.0), (w / 2.0, 0.0), (0.0, h / 2.0), (-w / 2.0, 0.0)])
}

/// Regular polygon inscribed in the content ellipse, first vertex at the top
pub fn regular_polygon(w: f32, h: f32, sides: u32) -> Option<Path> {
    let n = sides.max(3);
    let points: Vec<(f32, f32)> = (0..n)
        .map(|i| {
            let a = -FRAC_PI_2 + TAU * i as f32 / n as f32;
            (a.cos() * w / 2.0, a.sin() * h / 2.0)
        })
        .collect();
    polygon(&points)
}

pub fn star(w: f32, h: f32, shape: &StarShape) -> Option<Path> {
    let n = shape.points.max(3);
    let inner = shape.inner_ratio.clamp(0.0, 1.0);
    let points: Vec<(f32, f32)> = (0..n * 2)
        .map(|i| {
            let a = -FRAC_PI_2 + TAU * i as f32 / (n * 2) as f32;
            let f = if i % 2 == 0 { 1.0 } else { inner };
            (a.cos() * w / 2.0 * f, a.sin() * h / 2.0 * f)
        })
        .collect();
    polygon(&points)
}

/// Right-pointing arrow: a shaft plus a triangular head spanning the full height
pub fn arrow(w: f32, h: f32, shape: &ArrowShape) -> Option<Path> {
    let head = (w * shape.head_ratio.clamp(0.0, 1.0)).min(w);
    let shaft = h * shape.shaft_ratio.clamp(0.0, 1.0) / 2.0;
    let (l, r) = (-w / 2.0, w / 2.0);
    let neck = r - head;
    polygon(&[
        (l, -shaft),
        (neck, -shaft),
        (neck, -h / 2.0),
        (r, 0.0),
        (neck, h / 2.0),
        (neck, shaft),
        (l, shaft),
    ])
}

/// Centerline of a line layer; its thickness comes from the stroke width
pub fn line(w: f32, _shape: &LineShape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(-w / 2.0, 0.0);
    pb.line_to(w / 2.0, 0.0);
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_rect_bounds_match_rect() {
        let path = rounded_rect(0.0, 0.0, 212.0, 520.0, 106.0).unwrap();
        let b = path.bounds();
        assert!((b.width() - 212.0).abs() < 1e-3);
        assert!((b.height() - 520.0).abs() < 1e-3);
    }

    #[test]
    fn zero_radius_is_plain_rect() {
        assert!(rounded_rect(0.0, 0.0, 10.0, 10.0, 0.0).is_some());
        assert!(rounded_rect(0.0, 0.0, -5.0, 10.0, 0.0).is_none());
    }

    #[test]
    fn star_has_twice_the_points() {
        let path = star(100.0, 100.0, &StarShape::default()).unwrap();
        // move + 9 lines + close
        assert_eq!(path.points().len(), 10);
        assert!((path.bounds().top() + 50.0).abs() < 1e-3);
    }
}
