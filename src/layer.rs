use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Color;
use crate::image_source::PixelSource;
use crate::text;

/// Smallest crop side, as a fraction of the intrinsic image size
pub const MIN_CROP_SIZE: f32 = 0.05;

pub const DEFAULT_FONT_SIZE: f32 = 48.0;
pub const DEFAULT_FONT_WEIGHT: u16 = 700;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// A unique identifier for a layer. Assigned once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized sub-rectangle of an image's intrinsic size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Crop {
    pub const FULL: Crop = Crop { x: 0.0, y: 0.0, w: 1.0, h: 1.0 };

    /// Clamp into the unit square, keeping each side at least [`MIN_CROP_SIZE`].
    pub fn normalized(self) -> Crop {
        let w = finite_or(self.w, 1.0).clamp(MIN_CROP_SIZE, 1.0);
        let h = finite_or(self.h, 1.0).clamp(MIN_CROP_SIZE, 1.0);
        let x = finite_or(self.x, 0.0).clamp(0.0, 1.0 - w);
        let y = finite_or(self.y, 0.0).clamp(0.0, 1.0 - h);
        Crop { x, y, w, h }
    }
}

impl Default for Crop {
    fn default() -> Self {
        Self::FULL
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub enabled: bool,
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            blur: 10.0,
            offset_x: 5.0,
            offset_y: 5.0,
        }
    }
}

/// Outline drawn around shapes and text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub enabled: bool,
    pub color: Color,
    pub width: f32,
}

impl Default for Outline {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            width: 2.0,
        }
    }
}

/// Arc-text settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextCurve {
    pub enabled: bool,
    pub radius: f32,
    pub spacing: f32,
}

impl Default for TextCurve {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 200.0,
            spacing: 0.0,
        }
    }
}

/// Color adjustment percentages. 100 is identity for the first three, 0 for grayscale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default = "hundred")]
    pub brightness: f32,
    #[serde(default = "hundred")]
    pub contrast: f32,
    #[serde(default = "hundred")]
    pub saturate: f32,
    #[serde(default)]
    pub grayscale: f32,
}

impl Filters {
    pub fn is_identity(&self) -> bool {
        self.brightness == 100.0
            && self.contrast == 100.0
            && self.saturate == 100.0
            && self.grayscale == 0.0
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
            grayscale: 0.0,
        }
    }
}

fn hundred() -> f32 {
    100.0
}

fn one() -> f32 {
    1.0
}

fn white() -> Color {
    Color::WHITE
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ImageContent {
    /// Data URL of the pixel source; the canonical, persisted reference.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    /// Decoded handle rebuilt from `src`; never serialized
    #[serde(skip)]
    pub pixels: Option<Arc<PixelSource>>,
}

impl ImageContent {
    pub fn new(src: String, pixels: Option<Arc<PixelSource>>) -> Self {
        Self { src, crop: None, pixels }
    }
}

impl PartialEq for ImageContent {
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src && self.crop == other.crop
    }
}

impl fmt::Debug for ImageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageContent")
            .field("src_len", &self.src.len())
            .field("crop", &self.crop)
            .field("decoded", &self.pixels.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "white")]
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<TextCurve>,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn measure(&self) -> text::TextBox {
        text::measure_text_box(&self.text, self.font_size, self.font_weight, &self.font_family)
    }
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            font_weight: DEFAULT_FONT_WEIGHT,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            color: Color::WHITE,
            curve: None,
        }
    }
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_font_weight() -> u16 {
    DEFAULT_FONT_WEIGHT
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_owned()
}

/// Shape with nothing but a fill (circle, triangle, diamond)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlainShape {
    #[serde(default = "white")]
    pub fill: Color,
}

impl Default for PlainShape {
    fn default() -> Self {
        Self { fill: Color::WHITE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectShape {
    #[serde(default = "white")]
    pub fill: Color,
    #[serde(default)]
    pub corner_radius: f32,
}

impl Default for RectShape {
    fn default() -> Self {
        Self { fill: Color::WHITE, corner_radius: 0.0 }
    }
}

/// A horizontal bar spanning the content width; the content height is its thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineShape {
    #[serde(default = "white")]
    pub fill: Color,
    #[serde(default)]
    pub rounded_caps: bool,
}

impl Default for LineShape {
    fn default() -> Self {
        Self { fill: Color::WHITE, rounded_caps: true }
    }
}

/// Right-pointing arrow. `head_ratio` is the head length over the width,
/// `shaft_ratio` the shaft thickness over the height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowShape {
    #[serde(default = "white")]
    pub fill: Color,
    #[serde(default = "default_head_ratio")]
    pub head_ratio: f32,
    #[serde(default = "default_shaft_ratio")]
    pub shaft_ratio: f32,
}

impl Default for ArrowShape {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            head_ratio: default_head_ratio(),
            shaft_ratio: default_shaft_ratio(),
        }
    }
}

fn default_head_ratio() -> f32 {
    0.4
}

fn default_shaft_ratio() -> f32 {
    0.35
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarShape {
    #[serde(default = "white")]
    pub fill: Color,
    #[serde(default = "default_star_points")]
    pub points: u32,
    #[serde(default = "default_inner_ratio")]
    pub inner_ratio: f32,
}

impl Default for StarShape {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            points: default_star_points(),
            inner_ratio: default_inner_ratio(),
        }
    }
}

fn default_star_points() -> u32 {
    5
}

fn default_inner_ratio() -> f32 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    #[serde(default = "white")]
    pub fill: Color,
    #[serde(default = "default_sides")]
    pub sides: u32,
}

impl Default for PolygonShape {
    fn default() -> Self {
        Self { fill: Color::WHITE, sides: default_sides() }
    }
}

fn default_sides() -> u32 {
    6
}

/// Variant-specific payload of a layer, tagged by `type` in documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    Image(ImageContent),
    Text(TextContent),
    Clock(TextContent),
    Rect(RectShape),
    Circle(PlainShape),
    Triangle(PlainShape),
    Line(LineShape),
    Arrow(ArrowShape),
    Star(StarShape),
    Diamond(PlainShape),
    Polygon(PolygonShape),
}

impl LayerKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            LayerKind::Image(_) => "image",
            LayerKind::Text(_) => "text",
            LayerKind::Clock(_) => "clock",
            LayerKind::Rect(_) => "rect",
            LayerKind::Circle(_) => "circle",
            LayerKind::Triangle(_) => "triangle",
            LayerKind::Line(_) => "line",
            LayerKind::Arrow(_) => "arrow",
            LayerKind::Star(_) => "star",
            LayerKind::Diamond(_) => "diamond",
            LayerKind::Polygon(_) => "polygon",
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match self {
            LayerKind::Text(t) | LayerKind::Clock(t) => Some(t),
            _ => None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut TextContent> {
        match self {
            LayerKind::Text(t) | LayerKind::Clock(t) => Some(t),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&ImageContent> {
        match self {
            LayerKind::Image(img) => Some(img),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut ImageContent> {
        match self {
            LayerKind::Image(img) => Some(img),
            _ => None,
        }
    }

    /// Fill color of shape variants
    pub fn fill(&self) -> Option<Color> {
        match self {
            LayerKind::Rect(s) => Some(s.fill),
            LayerKind::Circle(s) | LayerKind::Triangle(s) | LayerKind::Diamond(s) => Some(s.fill),
            LayerKind::Line(s) => Some(s.fill),
            LayerKind::Arrow(s) => Some(s.fill),
            LayerKind::Star(s) => Some(s.fill),
            LayerKind::Polygon(s) => Some(s.fill),
            LayerKind::Image(_) | LayerKind::Text(_) | LayerKind::Clock(_) => None,
        }
    }

    fn fill_mut(&mut self) -> Option<&mut Color> {
        match self {
            LayerKind::Rect(s) => Some(&mut s.fill),
            LayerKind::Circle(s) | LayerKind::Triangle(s) | LayerKind::Diamond(s) => {
                Some(&mut s.fill)
            }
            LayerKind::Line(s) => Some(&mut s.fill),
            LayerKind::Arrow(s) => Some(&mut s.fill),
            LayerKind::Star(s) => Some(&mut s.fill),
            LayerKind::Polygon(s) => Some(&mut s.fill),
            LayerKind::Image(_) | LayerKind::Text(_) | LayerKind::Clock(_) => None,
        }
    }

    pub fn is_shape(&self) -> bool {
        self.fill().is_some()
    }

    /// Whether the outline decoration applies to this variant
    pub fn supports_outline(&self) -> bool {
        !matches!(self, LayerKind::Image(_))
    }
}

/// One positioned, transformable element of the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default = "one")]
    pub scale_x: f32,
    #[serde(default = "one")]
    pub scale_y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(flatten)]
    pub filters: Filters,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Outline>,
    #[serde(flatten)]
    pub kind: LayerKind,
}

impl Layer {
    /// A fresh layer at the origin with identity transform and neutral filters
    pub fn new(kind: LayerKind) -> Self {
        Self {
            id: LayerId::new(),
            name: None,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            locked: false,
            hidden: false,
            filters: Filters::default(),
            width: 0.0,
            height: 0.0,
            shadow: None,
            stroke: None,
            kind,
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.name, self.kind.text()) {
            (Some(name), _) => name.clone(),
            (None, Some(t)) if !t.text.is_empty() => t.text.clone(),
            _ => self.kind.type_name().to_owned(),
        }
    }

    /// Recompute width/height of text and clock layers from their font metrics.
    pub fn refresh_text_metrics(&mut self) {
        if let Some(text) = self.kind.text() {
            let measured = text.measure();
            self.width = measured.width;
            self.height = measured.height;
        }
    }

    /// Shallow-merge `patch` into this layer.
    ///
    /// Fields that do not apply to the variant are ignored. Text metrics are
    /// refreshed when the patch touches them.
    pub fn apply(&mut self, patch: &LayerPatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = patch.$field.clone() { self.$field = v; })*
            };
        }
        merge!(x, y, scale_x, scale_y, rotation, locked, hidden, width, height);

        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(v) = patch.brightness {
            self.filters.brightness = v;
        }
        if let Some(v) = patch.contrast {
            self.filters.contrast = v;
        }
        if let Some(v) = patch.saturate {
            self.filters.saturate = v;
        }
        if let Some(v) = patch.grayscale {
            self.filters.grayscale = v;
        }
        if let Some(shadow) = patch.shadow {
            self.shadow = Some(shadow);
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = Some(stroke);
        }
        if let Some(fill) = patch.fill {
            if let Some(slot) = self.kind.fill_mut() {
                *slot = fill;
            }
        }

        match &mut self.kind {
            LayerKind::Rect(rect) => {
                if let Some(r) = patch.corner_radius {
                    rect.corner_radius = r.max(0.0);
                }
            }
            LayerKind::Line(line) => {
                if let Some(v) = patch.rounded_caps {
                    line.rounded_caps = v;
                }
            }
            LayerKind::Arrow(arrow) => {
                if let Some(v) = patch.head_ratio {
                    arrow.head_ratio = v.clamp(0.05, 1.0);
                }
                if let Some(v) = patch.shaft_ratio {
                    arrow.shaft_ratio = v.clamp(0.05, 1.0);
                }
            }
            LayerKind::Star(star) => {
                if let Some(v) = patch.points {
                    star.points = v.max(3);
                }
                if let Some(v) = patch.inner_ratio {
                    star.inner_ratio = v.clamp(0.05, 1.0);
                }
            }
            LayerKind::Polygon(poly) => {
                if let Some(v) = patch.sides {
                    poly.sides = v.max(3);
                }
            }
            LayerKind::Image(img) => {
                if let Some(crop) = patch.crop {
                    img.crop = crop.map(Crop::normalized);
                }
                if let Some(src) = &patch.src {
                    img.src = src.clone();
                    img.pixels = patch.pixels.clone();
                }
            }
            LayerKind::Circle(_)
            | LayerKind::Triangle(_)
            | LayerKind::Diamond(_)
            | LayerKind::Text(_)
            | LayerKind::Clock(_) => {}
        }

        let mut metrics_changed = false;
        if let Some(text) = self.kind.text_mut() {
            if let Some(v) = &patch.text {
                text.text = v.clone();
                metrics_changed = true;
            }
            if let Some(v) = patch.font_size {
                text.font_size = v.max(1.0);
                metrics_changed = true;
            }
            if let Some(v) = patch.font_weight {
                text.font_weight = v;
                metrics_changed = true;
            }
            if let Some(v) = &patch.font_family {
                text.font_family = v.clone();
                metrics_changed = true;
            }
            if let Some(v) = patch.color {
                text.color = v;
            }
            if let Some(v) = patch.curve {
                text.curve = Some(v);
            }
        }
        if metrics_changed {
            self.refresh_text_metrics();
        }
    }

    /// Copy of this layer under a new id
    pub fn duplicate(&self) -> Layer {
        Layer {
            id: LayerId::new(),
            ..self.clone()
        }
    }

    pub fn same_transform(&self, other: &Layer) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.scale_x == other.scale_x
            && self.scale_y == other.scale_y
            && self.rotation == other.rotation
    }
}

/// Partial attributes merged into a layer.
///
/// `None` leaves a field untouched. `crop: Some(None)` clears a crop.
#[derive(Debug, Clone, Default)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub rotation: Option<f32>,
    pub opacity: Option<f32>,
    pub locked: Option<bool>,
    pub hidden: Option<bool>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturate: Option<f32>,
    pub grayscale: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub shadow: Option<Shadow>,
    pub stroke: Option<Outline>,

    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    pub font_family: Option<String>,
    pub color: Option<Color>,
    pub curve: Option<TextCurve>,

    pub fill: Option<Color>,
    pub corner_radius: Option<f32>,
    pub rounded_caps: Option<bool>,
    pub head_ratio: Option<f32>,
    pub shaft_ratio: Option<f32>,
    pub points: Option<u32>,
    pub inner_ratio: Option<f32>,
    pub sides: Option<u32>,

    pub crop: Option<Option<Crop>>,
    /// New pixel source; `pixels` travels with it as the decoded handle.
    pub src: Option<String>,
    pub pixels: Option<Arc<PixelSource>>,
}

impl LayerPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    /// Position, scale and rotation copied from `layer`
    pub fn transform_of(layer: &Layer) -> Self {
        Self {
            x: Some(layer.x),
            y: Some(layer.y),
            scale_x: Some(layer.scale_x),
            scale_y: Some(layer.scale_y),
            rotation: Some(layer.rotation),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = Some(scale_x);
        self.scale_y = Some(scale_y);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn touches_text_metrics(&self) -> bool {
        self.text.is_some()
            || self.font_size.is_some()
            || self.font_weight.is_some()
            || self.font_family.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_layer() -> Layer {
        let mut layer = Layer::new(LayerKind::Rect(RectShape::default()));
        layer.width = 100.0;
        layer.height = 100.0;
        layer
    }

    #[test]
    fn test_crop_normalization_floors_size() {
        let crop = Crop { x: 0.99, y: -0.5, w: 0.0, h: 2.0 }.normalized();
        assert_eq!(crop.w, MIN_CROP_SIZE);
        assert_eq!(crop.h, 1.0);
        assert!((crop.x - (1.0 - MIN_CROP_SIZE)).abs() < 1e-6);
        assert_eq!(crop.y, 0.0);
    }

    #[test]
    fn test_patch_ignores_fields_of_other_variants() {
        let mut layer = rect_layer();
        let patch = LayerPatch {
            text: Some("hello".into()),
            fill: Some(Color::rgb(255, 0, 0)),
            ..Default::default()
        };
        layer.apply(&patch);
        assert_eq!(layer.kind.fill(), Some(Color::rgb(255, 0, 0)));
        assert_eq!(layer.width, 100.0);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut layer = rect_layer();
        layer.apply(&LayerPatch { opacity: Some(3.0), ..Default::default() });
        assert_eq!(layer.opacity, 1.0);
    }

    #[test]
    fn test_json_shape_uses_type_tag_and_camel_case() {
        let mut layer = rect_layer();
        layer.scale_x = 2.0;
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "rect");
        assert_eq!(json["scaleX"], 2.0);
        assert_eq!(json["fill"], "#ffffff");
        assert_eq!(json["brightness"], 100.0);

        let back: Layer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_image_pixels_are_not_serialized() {
        let layer = Layer::new(LayerKind::Image(ImageContent::new(
            "data:image/png;base64,AAAA".into(),
            None,
        )));
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "image");
        assert!(json.get("pixels").is_none());
        assert_eq!(json["src"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_duplicate_gets_fresh_id() {
        let layer = rect_layer();
        let copy = layer.duplicate();
        assert_ne!(copy.id, layer.id);
        assert_eq!(copy.width, layer.width);
    }
}
