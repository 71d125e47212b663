//! Transform math shared by hit-testing, the interaction controller and the renderer.
//!
//! World space is the canvas coordinate system (y down). A layer's local space
//! has its origin at the layer center, is unrotated and unscaled.

use egui::{Pos2, Vec2, pos2, vec2};

use crate::layer::Layer;
use crate::template::{CornerSpec, DeviceTemplate};

/// Pointer distance (world units) within which a handle is grabbed
pub const HANDLE_HIT_RADIUS: f32 = 15.0;

/// Distance of the rotation handle above the top edge of the selection box
pub const ROTATION_HANDLE_OFFSET: f32 = 30.0;

/// Rotate `point` around `center` by `degrees`, clockwise on screen.
pub fn rotate(point: Pos2, center: Pos2, degrees: f32) -> Pos2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    pos2(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

pub fn unrotate(point: Pos2, center: Pos2, degrees: f32) -> Pos2 {
    rotate(point, center, -degrees)
}

fn nonzero(scale: f32) -> f32 {
    if scale == 0.0 || !scale.is_finite() { 1.0 } else { scale }
}

/// Convert a world point into the layer's local, unscaled frame.
pub fn point_to_local(layer: &Layer, world: Pos2) -> Pos2 {
    let center = pos2(layer.x, layer.y);
    let p = unrotate(world, center, layer.rotation) - center;
    pos2(p.x / nonzero(layer.scale_x), p.y / nonzero(layer.scale_y))
}

/// Intrinsic size of what is drawn: the crop window for cropped images.
pub fn content_size(layer: &Layer) -> Vec2 {
    let crop = layer.kind.image().and_then(|img| img.crop);
    match crop {
        Some(crop) => vec2(layer.width * crop.w, layer.height * crop.h),
        None => vec2(layer.width, layer.height),
    }
}

/// On-canvas size of the selection box, never below one pixel per side.
pub fn selection_size(layer: &Layer) -> Vec2 {
    let content = content_size(layer);
    vec2(
        (content.x * layer.scale_x).abs().max(1.0),
        (content.y * layer.scale_y).abs().max(1.0),
    )
}

/// The nine manipulation handles of a selection box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKey {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
}

impl HandleKey {
    pub const ALL: [HandleKey; 9] = [
        HandleKey::TopLeft,
        HandleKey::Top,
        HandleKey::TopRight,
        HandleKey::Right,
        HandleKey::BottomRight,
        HandleKey::Bottom,
        HandleKey::BottomLeft,
        HandleKey::Left,
        HandleKey::Rotate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HandleKey::TopLeft => "tl",
            HandleKey::Top => "t",
            HandleKey::TopRight => "tr",
            HandleKey::Right => "r",
            HandleKey::BottomRight => "br",
            HandleKey::Bottom => "b",
            HandleKey::BottomLeft => "bl",
            HandleKey::Left => "l",
            HandleKey::Rotate => "rot",
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(self, HandleKey::TopLeft | HandleKey::Left | HandleKey::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, HandleKey::TopRight | HandleKey::Right | HandleKey::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, HandleKey::TopLeft | HandleKey::Top | HandleKey::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, HandleKey::BottomLeft | HandleKey::Bottom | HandleKey::BottomRight)
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandleKey::TopLeft | HandleKey::TopRight | HandleKey::BottomRight | HandleKey::BottomLeft
        )
    }

    /// Position in the unrotated selection box, relative to its center
    fn box_offset(self, half: Vec2) -> Vec2 {
        match self {
            HandleKey::TopLeft => vec2(-half.x, -half.y),
            HandleKey::Top => vec2(0.0, -half.y),
            HandleKey::TopRight => vec2(half.x, -half.y),
            HandleKey::Right => vec2(half.x, 0.0),
            HandleKey::BottomRight => vec2(half.x, half.y),
            HandleKey::Bottom => vec2(0.0, half.y),
            HandleKey::BottomLeft => vec2(-half.x, half.y),
            HandleKey::Left => vec2(-half.x, 0.0),
            HandleKey::Rotate => vec2(0.0, -half.y - ROTATION_HANDLE_OFFSET),
        }
    }
}

/// World positions of all nine handles, in [`HandleKey::ALL`] order.
pub fn handle_coords(layer: &Layer) -> [(HandleKey, Pos2); 9] {
    let center = pos2(layer.x, layer.y);
    let half = selection_size(layer) / 2.0;
    HandleKey::ALL.map(|key| (key, rotate(center + key.box_offset(half), center, layer.rotation)))
}

/// The first handle within [`HANDLE_HIT_RADIUS`] of `world`.
pub fn hit_handle(layer: &Layer, world: Pos2) -> Option<HandleKey> {
    handle_coords(layer)
        .into_iter()
        .find(|(_, pos)| pos.distance(world) <= HANDLE_HIT_RADIUS)
        .map(|(key, _)| key)
}

/// Whether `world` falls inside the layer's (cropped) content box.
pub fn contains_local(layer: &Layer, world: Pos2) -> bool {
    let local = point_to_local(layer, world);
    let half = content_size(layer) / 2.0;
    local.x.abs() <= half.x && local.y.abs() <= half.y
}

pub fn corner_radius(template: &DeviceTemplate) -> f32 {
    let (w, h) = (template.width.max(0.0), template.height.max(0.0));
    match template.corner {
        CornerSpec::Pill => w.min(h) / 2.0,
        CornerSpec::Radius(r) => r.max(0.0).min(w / 2.0).min(h / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Crop, ImageContent, LayerKind, RectShape};
    use crate::template::default_template;

    fn rect_at(x: f32, y: f32, w: f32, h: f32) -> Layer {
        let mut layer = Layer::new(LayerKind::Rect(RectShape::default()));
        layer.x = x;
        layer.y = y;
        layer.width = w;
        layer.height = h;
        layer
    }

    fn approx(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn rotation_is_clockwise_in_screen_space() {
        let p = rotate(pos2(10.0, 0.0), Pos2::ZERO, 90.0);
        assert!(approx(p, pos2(0.0, 10.0)));
    }

    #[test]
    fn unrotate_inverts_rotate() {
        let c = pos2(12.0, -4.0);
        for angle in [-270.0, -33.0, 0.0, 17.5, 90.0, 359.0] {
            let p = pos2(3.5, 99.0);
            assert!(approx(unrotate(rotate(p, c, angle), c, angle), p));
        }
    }

    #[test]
    fn local_point_divides_by_scale_and_tolerates_zero() {
        let mut layer = rect_at(100.0, 100.0, 50.0, 50.0);
        layer.scale_x = 2.0;
        layer.scale_y = 0.0;
        let local = point_to_local(&layer, pos2(120.0, 110.0));
        assert!(approx(local, pos2(10.0, 10.0)));
    }

    #[test]
    fn cropped_image_content_size() {
        let mut layer = Layer::new(LayerKind::Image(ImageContent::new(String::new(), None)));
        layer.width = 200.0;
        layer.height = 100.0;
        if let Some(img) = layer.kind.image_mut() {
            img.crop = Some(Crop { x: 0.25, y: 0.0, w: 0.5, h: 0.5 });
        }
        assert_eq!(content_size(&layer), vec2(100.0, 50.0));
    }

    #[test]
    fn selection_size_floors_at_one() {
        let mut layer = rect_at(0.0, 0.0, 0.0, 10.0);
        layer.scale_y = 0.01;
        assert_eq!(selection_size(&layer), vec2(1.0, 1.0));
    }

    #[test]
    fn handles_follow_rotation() {
        let mut layer = rect_at(50.0, 50.0, 20.0, 10.0);
        layer.rotation = 90.0;
        let coords = handle_coords(&layer);
        let (key, rot) = coords[8];
        assert_eq!(key, HandleKey::Rotate);
        // 5 + 30 above center, turned to the right-hand side
        assert!(approx(rot, pos2(85.0, 50.0)));
        assert_eq!(hit_handle(&layer, pos2(84.0, 51.0)), Some(HandleKey::Rotate));
    }

    #[test]
    fn containment_respects_rotation() {
        let mut layer = rect_at(0.0, 0.0, 100.0, 10.0);
        assert!(contains_local(&layer, pos2(45.0, 0.0)));
        layer.rotation = 90.0;
        assert!(!contains_local(&layer, pos2(45.0, 0.0)));
        assert!(contains_local(&layer, pos2(0.0, 45.0)));
    }

    #[test]
    fn pill_radius_is_half_the_short_side() {
        assert_eq!(corner_radius(default_template()), 106.0);
        let mut t = *default_template();
        t.corner = CornerSpec::Radius(500.0);
        assert_eq!(corner_radius(&t), 106.0);
        t.corner = CornerSpec::Radius(12.0);
        assert_eq!(corner_radius(&t), 12.0);
    }
}
