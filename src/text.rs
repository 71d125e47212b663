//! Font resolution, text measurement and glyph outlines.
//!
//! System fonts are discovered with `fontdb` the first time any text is
//! measured. Parsed faces are cached per (family list, weight). When nothing
//! on the system matches, the face egui bundles is used instead, and if even
//! that fails to parse a fixed-ratio heuristic stands in for real metrics.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use parking_lot::Mutex;
use tiny_skia::{Path, PathBuilder, Transform};

/// Width per character of the heuristic, in em
const HEURISTIC_ADVANCE: f32 = 0.6;
/// Line height of the heuristic, in em
const HEURISTIC_HEIGHT: f32 = 1.05;

/// Integer pixel size of a text layer's content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub width: f32,
    pub height: f32,
}

/// A parsed font face. The raw bytes are kept and re-parsed on use.
pub struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .finish_non_exhaustive()
    }
}

impl FontFace {
    pub fn from_data(data: Vec<u8>, index: u32) -> Option<Self> {
        let (units_per_em, ascender, descender) = {
            let face = ttf_parser::Face::parse(&data, index).ok()?;
            (
                face.units_per_em() as f32,
                face.ascender() as f32,
                face.descender() as f32,
            )
        };
        if units_per_em <= 0.0 {
            return None;
        }
        Some(Self { data, index, units_per_em, ascender, descender })
    }

    fn parse(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }

    fn scale(&self, font_size: f32) -> f32 {
        font_size / self.units_per_em
    }

    /// Baseline offset that puts the em box's vertical middle at y = 0
    pub fn middle_baseline(&self, font_size: f32) -> f32 {
        (self.ascender + self.descender) / 2.0 * self.scale(font_size)
    }

    pub fn measure(&self, text: &str, font_size: f32) -> Option<TextBox> {
        let face = self.parse()?;
        let scale = self.scale(font_size);

        let mut advance = 0.0f32;
        let mut ink: Option<(f32, f32)> = None;
        for c in text.chars() {
            let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
            advance += face.glyph_hor_advance(glyph).unwrap_or(0) as f32;
            if let Some(bbox) = face.glyph_bounding_box(glyph) {
                let (top, bottom) = ink.unwrap_or((f32::MIN, f32::MAX));
                ink = Some((top.max(bbox.y_max as f32), bottom.min(bbox.y_min as f32)));
            }
        }

        let (ascent, descent) = match ink {
            Some((top, bottom)) => (top, -bottom),
            None => (self.ascender, -self.descender),
        };
        Some(TextBox {
            width: ceil_px(advance * scale),
            height: ceil_px((ascent + descent) * scale),
        })
    }

    /// Outline of a single line of text, horizontally centered on x = 0 with
    /// the em box middle on y = 0. `None` when the text has no ink.
    pub fn line_path(&self, text: &str, font_size: f32) -> Option<Path> {
        let face = self.parse()?;
        let scale = self.scale(font_size);

        let total: f32 = text
            .chars()
            .map(|c| {
                let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                face.glyph_hor_advance(glyph).unwrap_or(0) as f32
            })
            .sum();

        let mut builder = PathBuilder::new();
        let mut pen = GlyphPen {
            builder: &mut builder,
            scale,
            dx: -total * scale / 2.0,
            dy: self.middle_baseline(font_size),
        };
        for c in text.chars() {
            let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
            face.outline_glyph(glyph, &mut pen);
            pen.dx += face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale;
        }
        builder.finish()
    }

    /// One outline per character, each centered on the origin, for arc layout
    pub fn char_paths(&self, text: &str, font_size: f32) -> Vec<Option<Path>> {
        let mut buf = [0u8; 4];
        text.chars()
            .map(|c| self.line_path(c.encode_utf8(&mut buf), font_size))
            .collect()
    }
}

fn ceil_px(v: f32) -> f32 {
    if v.is_finite() { v.ceil().max(1.0) } else { 1.0 }
}

/// Adapts ttf-parser's outline callbacks to a tiny-skia path, flipping y.
struct GlyphPen<'a> {
    builder: &'a mut PathBuilder,
    scale: f32,
    dx: f32,
    dy: f32,
}

impl GlyphPen<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.dx + x * self.scale, self.dy - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Lazily built font database with a face cache
pub struct FontBook {
    db: Database,
    faces: Mutex<HashMap<(String, u16), Option<Arc<FontFace>>>>,
    bundled: Option<Arc<FontFace>>,
}

static FONT_BOOK: OnceLock<FontBook> = OnceLock::new();

pub fn font_book() -> &'static FontBook {
    FONT_BOOK.get_or_init(FontBook::load)
}

/// Names tried when a generic family has no configured system match
const SANS_FALLBACKS: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial", "Helvetica"];
const SERIF_FALLBACKS: &[&str] = &["DejaVu Serif", "Liberation Serif", "Noto Serif", "Times New Roman"];
const MONO_FALLBACKS: &[&str] = &["DejaVu Sans Mono", "Liberation Mono", "Noto Mono", "Courier New"];

impl FontBook {
    fn load() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("Font database loaded: {} faces", db.faces().count());

        let bundled = FontFace::from_data(epaint_default_fonts::UBUNTU_LIGHT.to_vec(), 0).map(Arc::new);
        if bundled.is_none() {
            log::warn!("Bundled UI font failed to parse; text will use heuristic metrics");
        }

        Self {
            db,
            faces: Mutex::new(HashMap::new()),
            bundled,
        }
    }

    /// Resolve a CSS family list and numeric weight to a face.
    pub fn resolve(&self, family_list: &str, weight: u16) -> Option<Arc<FontFace>> {
        let key = (family_list.to_owned(), weight);
        if let Some(cached) = self.faces.lock().get(&key) {
            return cached.clone();
        }

        let face = self
            .query(family_list, weight)
            .and_then(|id| {
                self.db
                    .with_face_data(id, |data, index| FontFace::from_data(data.to_vec(), index))
                    .flatten()
            })
            .map(Arc::new)
            .or_else(|| {
                log::debug!("No system face for '{}' at weight {}, using bundled font", family_list, weight);
                self.bundled.clone()
            });

        self.faces.lock().insert(key, face.clone());
        face
    }

    fn query(&self, family_list: &str, weight: u16) -> Option<fontdb::ID> {
        let names = parse_family_list(family_list);
        let mut families: Vec<Family<'_>> = names.iter().map(|n| css_family(n)).collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if let Some(id) = self.query_families(&families, weight) {
            return Some(id);
        }

        // Generic families often point at fonts that are not installed
        for family in &families {
            let fallbacks = match family {
                Family::SansSerif | Family::Cursive | Family::Fantasy => SANS_FALLBACKS,
                Family::Serif => SERIF_FALLBACKS,
                Family::Monospace => MONO_FALLBACKS,
                Family::Name(_) => continue,
            };
            for name in fallbacks {
                if let Some(id) = self.query_families(&[Family::Name(*name)], weight) {
                    return Some(id);
                }
            }
        }
        None
    }

    fn query_families(&self, families: &[Family<'_>], weight: u16) -> Option<fontdb::ID> {
        self.db.query(&Query {
            families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        })
    }
}

fn parse_family_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect()
}

fn css_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "sans-serif" | "system-ui" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

/// Content box of a text run.
///
/// Width is the advance width and height the ink ascent plus descent, both
/// rounded up and at least 1.
pub fn measure_text_box(text: &str, font_size: f32, font_weight: u16, font_family: &str) -> TextBox {
    font_book()
        .resolve(font_family, font_weight)
        .and_then(|face| face.measure(text, font_size))
        .unwrap_or_else(|| heuristic_box(text, font_size))
}

fn heuristic_box(text: &str, font_size: f32) -> TextBox {
    let chars = text.chars().count() as f32;
    TextBox {
        width: ceil_px(font_size * chars * HEURISTIC_ADVANCE),
        height: ceil_px(font_size * HEURISTIC_HEIGHT),
    }
}

/// Per-character transforms for arc text. The circle's center sits `radius`
/// below the origin so the middle of the run passes through (0, 0).
pub fn arc_transforms(count: usize, font_size: f32, radius: f32, spacing: f32) -> Vec<Transform> {
    let radius = if radius.abs() < 1.0 { 1.0 } else { radius };
    let step = font_size * (1.0 + spacing / 100.0) / radius;
    let start = -step * count.saturating_sub(1) as f32 / 2.0;
    (0..count)
        .map(|i| {
            let angle = (start + step * i as f32).to_degrees();
            Transform::from_translate(0.0, radius)
                .pre_concat(Transform::from_rotate(angle))
                .pre_translate(0.0, -radius)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_list_parsing_strips_quotes() {
        assert_eq!(
            parse_family_list("Inter, 'Helvetica Neue', sans-serif"),
            vec!["Inter", "Helvetica Neue", "sans-serif"]
        );
        assert!(matches!(css_family("SANS-SERIF"), Family::SansSerif));
        assert!(matches!(css_family("Inter"), Family::Name("Inter")));
    }

    #[test]
    fn heuristic_matches_fixed_ratio() {
        let b = heuristic_box("abcd", 10.0);
        assert_eq!(b.width, 24.0);
        assert_eq!(b.height, 11.0);
        assert_eq!(heuristic_box("", 10.0).width, 1.0);
    }

    #[test]
    fn measurement_is_at_least_one_pixel() {
        let b = measure_text_box("", 48.0, 700, "sans-serif");
        assert!(b.width >= 1.0 && b.height >= 1.0);
        assert_eq!(b.width.fract(), 0.0);
    }

    #[test]
    fn bundled_face_parses() {
        let face = FontFace::from_data(epaint_default_fonts::UBUNTU_LIGHT.to_vec(), 0);
        let face = face.expect("bundled font");
        assert!(face.line_path("Hi", 24.0).is_some());
        assert!(face.line_path(" ", 24.0).is_none());
    }

    #[test]
    fn arc_is_symmetric_about_origin() {
        let ts = arc_transforms(3, 20.0, 200.0, 0.0);
        assert_eq!(ts.len(), 3);
        // middle character is untransformed
        let mid = ts[1];
        assert!(mid.tx.abs() < 1e-4 && mid.ty.abs() < 1e-4);
        assert!((ts[0].tx + ts[2].tx).abs() < 1e-3);
    }
}
