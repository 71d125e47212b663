// src/renderer.rs
//! Deterministic CPU painter shared by the on-screen preview and export.
//!
//! The editor and the exporter call the same [`Renderer::render`]; they only
//! differ in [`RenderOptions`]. All drawing happens in world units under a
//! base transform of `scale` and `offset`, so a preview at zoom 2 and an
//! export at scale 2 produce the same pixels for the canvas area.

mod filter_cache;
mod paths;

pub use filter_cache::FilterCache;

use egui::Vec2;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pattern, Pixmap,
    PixmapPaint, PremultipliedColorU8, Rect, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::color::Color;
use crate::error::RenderError;
use crate::geometry::{self, HandleKey};
use crate::interaction::CANVAS_MARGIN;
use crate::layer::{Crop, ImageContent, Layer, LayerId, LayerKind, LineShape, Outline, Shadow, TextContent};
use crate::scene::SceneStore;
use crate::template::DeviceTemplate;
use crate::text;

/// Width of the device bezel drawn around the silhouette
pub const BEZEL_WIDTH: f32 = 16.0;

/// Radius of the selection handle circles
pub const HANDLE_RADIUS: f32 = 6.0;

const BEZEL_COLOR: Color = Color::rgb(0x11, 0x18, 0x27);
const SILHOUETTE_OUTLINE: Color = Color::rgba(255, 255, 255, 38);
const SELECTION_COLOR: Color = Color::rgb(0x8b, 0x5c, 0xf6);

/// Filtered image crops kept between frames
const FILTER_CACHE_SIZE: usize = 64;

/// What to draw besides the scene, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Pixels per world unit
    pub scale: f32,
    /// World-space offset of the canvas origin from the pixmap origin
    pub offset: Vec2,
    /// Bezel and silhouette outline
    pub chrome: bool,
    pub selection: Option<LayerId>,
    /// A crop or background-removal tool is open; hides the selection overlay
    pub modal_active: bool,
}

impl RenderOptions {
    /// Bare composition, pre-scaled, no chrome or selection
    pub fn export(scale: f32) -> Self {
        Self {
            scale,
            offset: Vec2::ZERO,
            chrome: false,
            selection: None,
            modal_active: false,
        }
    }

    /// Editor preview: canvas plus the off-canvas margin on every side
    pub fn editor(zoom: f32, selection: Option<LayerId>, modal_active: bool) -> Self {
        Self {
            scale: zoom,
            offset: Vec2::splat(CANVAS_MARGIN),
            chrome: true,
            selection,
            modal_active,
        }
    }

    fn base_transform(&self) -> Transform {
        Transform::from_scale(self.scale, self.scale).pre_translate(self.offset.x, self.offset.y)
    }
}

pub struct Renderer {
    filters: FilterCache,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            filters: FilterCache::new(FILTER_CACHE_SIZE),
        }
    }

    /// Paint `scene` into `pixmap`, replacing its contents.
    ///
    /// Args:
    ///     pixmap: Target surface, sized by the caller
    ///     scene: Layers and background to draw
    ///     template: Device whose silhouette clips every layer
    ///     options: Scale, offset and overlays
    pub fn render(
        &mut self,
        pixmap: &mut Pixmap,
        scene: &SceneStore,
        template: &DeviceTemplate,
        options: &RenderOptions,
    ) {
        self.filters.begin_frame();
        pixmap.fill(tiny_skia::Color::TRANSPARENT);

        let base = options.base_transform();
        let radius = geometry::corner_radius(template);
        let Some(silhouette) = paths::rounded_rect(0.0, 0.0, template.width, template.height, radius)
        else {
            log::warn!("Template '{}' has a degenerate silhouette", template.id);
            return;
        };
        let Some(mut clip) = Mask::new(pixmap.width(), pixmap.height()) else {
            return;
        };
        clip.fill_path(&silhouette, FillRule::Winding, true, base);

        pixmap.fill_path(&silhouette, &solid(scene.background()), FillRule::Winding, base, None);

        for layer in scene.layers().iter().filter(|l| !l.hidden) {
            if let Err(err) = self.paint_layer(pixmap, layer, base, options.scale, &clip) {
                log::warn!("Skipping {} layer {}: {}", layer.kind.type_name(), layer.id, err);
            }
        }

        if !options.chrome {
            return;
        }
        draw_bezel(pixmap, template, radius, &silhouette, base);

        if options.modal_active {
            return;
        }
        let selected = options.selection.and_then(|id| scene.layer(id)).filter(|l| !l.hidden);
        if let Some(layer) = selected {
            draw_selection(pixmap, layer, base);
        }
    }

    /// Allocate a `width` × `height` surface and render into it.
    pub fn render_to_pixmap(
        &mut self,
        scene: &SceneStore,
        template: &DeviceTemplate,
        options: &RenderOptions,
        width: u32,
        height: u32,
    ) -> Result<Pixmap, RenderError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        self.render(&mut pixmap, scene, template, options);
        Ok(pixmap)
    }

    fn paint_layer(
        &mut self,
        target: &mut Pixmap,
        layer: &Layer,
        base: Transform,
        scale: f32,
        clip: &Mask,
    ) -> Result<(), RenderError> {
        let ts = layer_transform(layer, base);
        let shadow = layer.shadow.filter(|s| s.enabled);
        let opacity = layer.opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return Ok(());
        }

        if shadow.is_none() && opacity >= 1.0 {
            return self.paint_content(target, layer, ts, Some(clip));
        }

        // Shadow and opacity apply to the layer as a whole
        let (width, height) = (target.width(), target.height());
        let mut isolated = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        self.paint_content(&mut isolated, layer, ts, None)?;

        let paint = PixmapPaint {
            opacity,
            ..PixmapPaint::default()
        };
        if let Some(shadow) = shadow {
            if let Some(cast) = cast_shadow(&isolated, &shadow, scale)? {
                let offset = Transform::from_translate(shadow.offset_x * scale, shadow.offset_y * scale);
                target.draw_pixmap(cast.x, cast.y, cast.pixmap.as_ref(), &paint, offset, Some(clip));
            }
        }
        target.draw_pixmap(0, 0, isolated.as_ref(), &paint, Transform::identity(), Some(clip));
        Ok(())
    }

    fn paint_content(
        &mut self,
        pixmap: &mut Pixmap,
        layer: &Layer,
        ts: Transform,
        mask: Option<&Mask>,
    ) -> Result<(), RenderError> {
        let outline = layer.stroke.filter(|o| o.enabled && o.width > 0.0);
        match &layer.kind {
            LayerKind::Image(img) => self.paint_image(pixmap, layer, img, ts, mask),
            LayerKind::Text(content) | LayerKind::Clock(content) => {
                paint_text(pixmap, content, outline, ts, mask)
            }
            LayerKind::Line(line) => {
                paint_line(pixmap, layer, line, outline, ts, mask);
                Ok(())
            }
            kind => {
                let Some(path) = shape_path(kind, layer.width, layer.height) else {
                    return Ok(());
                };
                let fill = kind.fill().unwrap_or(Color::WHITE);
                pixmap.fill_path(&path, &solid(fill), FillRule::Winding, ts, mask);
                if let Some(outline) = outline {
                    pixmap.stroke_path(&path, &solid(outline.color), &outline_stroke(&outline), ts, mask);
                }
                Ok(())
            }
        }
    }

    fn paint_image(
        &mut self,
        pixmap: &mut Pixmap,
        layer: &Layer,
        img: &ImageContent,
        ts: Transform,
        mask: Option<&Mask>,
    ) -> Result<(), RenderError> {
        let source = img.pixels.as_ref().ok_or(RenderError::MissingPixels)?;
        let crop = img.crop.unwrap_or(Crop::FULL);
        let filtered = self.filters.get_or_create(source, crop, &layer.filters)?;

        let content = geometry::content_size(layer);
        let (cw, ch) = (content.x, content.y);
        let Some(rect) = Rect::from_xywh(-cw / 2.0, -ch / 2.0, cw, ch) else {
            return Ok(());
        };
        let (pw, ph) = (filtered.width() as f32, filtered.height() as f32);
        let shader = Pattern::new(
            Pixmap::as_ref(&filtered),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            Transform::from_scale(cw / pw, ch / ph).post_translate(-cw / 2.0, -ch / 2.0),
        );
        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, ts, mask);
        Ok(())
    }
}

/// base · translate(x, y) · rotate · scale
fn layer_transform(layer: &Layer, base: Transform) -> Transform {
    base.pre_translate(layer.x, layer.y)
        .pre_concat(Transform::from_rotate(layer.rotation))
        .pre_scale(layer.scale_x, layer.scale_y)
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn outline_stroke(outline: &Outline) -> Stroke {
    Stroke {
        width: outline.width,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn shape_path(kind: &LayerKind, w: f32, h: f32) -> Option<Path> {
    match kind {
        LayerKind::Rect(rect) => paths::rounded_rect(-w / 2.0, -h / 2.0, w, h, rect.corner_radius),
        LayerKind::Circle(_) => paths::ellipse(w, h),
        LayerKind::Triangle(_) => paths::triangle(w, h),
        LayerKind::Diamond(_) => paths::diamond(w, h),
        LayerKind::Polygon(poly) => paths::regular_polygon(w, h, poly.sides),
        LayerKind::Star(star) => paths::star(w, h, star),
        LayerKind::Arrow(arrow) => paths::arrow(w, h, arrow),
        LayerKind::Line(_) | LayerKind::Image(_) | LayerKind::Text(_) | LayerKind::Clock(_) => None,
    }
}

fn paint_line(
    pixmap: &mut Pixmap,
    layer: &Layer,
    line: &LineShape,
    outline: Option<Outline>,
    ts: Transform,
    mask: Option<&Mask>,
) {
    if layer.width <= 0.0 || layer.height <= 0.0 {
        return;
    }
    let Some(path) = paths::line(layer.width, line) else {
        return;
    };
    let line_cap = if line.rounded_caps { LineCap::Round } else { LineCap::Butt };
    if let Some(outline) = outline {
        let stroke = Stroke {
            width: layer.height + outline.width * 2.0,
            line_cap,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(outline.color), &stroke, ts, mask);
    }
    let stroke = Stroke {
        width: layer.height,
        line_cap,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &solid(line.fill), &stroke, ts, mask);
}

fn paint_text(
    pixmap: &mut Pixmap,
    content: &TextContent,
    outline: Option<Outline>,
    ts: Transform,
    mask: Option<&Mask>,
) -> Result<(), RenderError> {
    if content.text.is_empty() {
        return Ok(());
    }
    let face = text::font_book()
        .resolve(&content.font_family, content.font_weight)
        .ok_or_else(|| RenderError::NoFont(content.font_family.clone()))?;

    let curve = content.curve.filter(|c| c.enabled && c.radius != 0.0);
    let glyphs: Vec<(Path, Transform)> = match curve {
        Some(curve) => {
            let paths = face.char_paths(&content.text, content.font_size);
            let arc = text::arc_transforms(paths.len(), content.font_size, curve.radius, curve.spacing);
            paths
                .into_iter()
                .zip(arc)
                .filter_map(|(path, t)| Some((path?, ts.pre_concat(t))))
                .collect()
        }
        None => face
            .line_path(&content.text, content.font_size)
            .map(|path| (path, ts))
            .into_iter()
            .collect(),
    };

    let fill = solid(content.color);
    for (path, t) in &glyphs {
        // stroke sits under the fill
        if let Some(outline) = outline {
            pixmap.stroke_path(path, &solid(outline.color), &outline_stroke(&outline), *t, mask);
        }
        pixmap.fill_path(path, &fill, FillRule::Winding, *t, mask);
    }
    Ok(())
}

/// A blurred shadow covering part of the surface, placed at `x`, `y`
struct CastShadow {
    pixmap: Pixmap,
    x: i32,
    y: i32,
}

/// Smallest box holding every non-transparent pixel, as `(x, y, width, height)`.
fn alpha_bounds(pixmap: &Pixmap) -> Option<(u32, u32, u32, u32)> {
    let width = pixmap.width();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in pixmap.pixels().iter().enumerate() {
        if px.alpha() == 0 {
            continue;
        }
        let (x, y) = (i as u32 % width, i as u32 / width);
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// The layer's alpha tinted with the shadow color and blurred.
///
/// Only the layer's bounding box plus the blur spread is processed. `None`
/// when the layer drew nothing.
fn cast_shadow(layer: &Pixmap, shadow: &Shadow, scale: f32) -> Result<Option<CastShadow>, RenderError> {
    let Some((x, y, w, h)) = alpha_bounds(layer) else {
        return Ok(None);
    };
    let sigma = shadow.blur.max(0.0) * scale / 2.0;
    let margin = (sigma * 3.0).ceil() as u32;
    let (width, height) = (w + margin * 2, h + margin * 2);
    let (left, top) = (x as i64 - margin as i64, y as i64 - margin as i64);

    let tint = shadow.color;
    let premul = |c: u8, a: u32| (c as u32 * a / 255) as u8;
    let mut tinted = image::RgbaImage::new(width, height);
    for (px, py, dst) in tinted.enumerate_pixels_mut() {
        let (sx, sy) = (left + px as i64, top + py as i64);
        if sx < 0 || sy < 0 {
            continue;
        }
        let Some(src) = layer.pixel(sx as u32, sy as u32) else {
            continue;
        };
        let a = src.alpha() as u32 * tint.a as u32 / 255;
        *dst = image::Rgba([premul(tint.r, a), premul(tint.g, a), premul(tint.b, a), a as u8]);
    }

    let blurred = if sigma > 0.0 {
        image::imageops::blur(&tinted, sigma)
    } else {
        tinted
    };

    let mut out = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
    for (dst, px) in out.pixels_mut().iter_mut().zip(blurred.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
    Ok(Some(CastShadow { pixmap: out, x: left as i32, y: top as i32 }))
}

/// Dark ring between the silhouette and a rounded rect outset by [`BEZEL_WIDTH`]
fn draw_bezel(
    pixmap: &mut Pixmap,
    template: &DeviceTemplate,
    radius: f32,
    silhouette: &Path,
    base: Transform,
) {
    let outer = paths::rounded_rect(
        -BEZEL_WIDTH,
        -BEZEL_WIDTH,
        template.width + BEZEL_WIDTH * 2.0,
        template.height + BEZEL_WIDTH * 2.0,
        radius + BEZEL_WIDTH,
    );
    if let Some(outer) = outer {
        let mut pb = PathBuilder::new();
        pb.push_path(&outer);
        pb.push_path(silhouette);
        if let Some(ring) = pb.finish() {
            pixmap.fill_path(&ring, &solid(BEZEL_COLOR), FillRule::EvenOdd, base, None);
        }
    }
    let stroke = Stroke {
        width: 2.0,
        ..Stroke::default()
    };
    pixmap.stroke_path(silhouette, &solid(SILHOUETTE_OUTLINE), &stroke, base, None);
}

fn draw_selection(pixmap: &mut Pixmap, layer: &Layer, base: Transform) {
    let size = geometry::selection_size(layer);
    let paint = solid(SELECTION_COLOR);
    let stroke = Stroke {
        width: 2.0,
        dash: StrokeDash::new(vec![4.0, 2.0], 0.0),
        ..Stroke::default()
    };

    let frame = base
        .pre_translate(layer.x, layer.y)
        .pre_concat(Transform::from_rotate(layer.rotation));
    if let Some(rect) = Rect::from_xywh(-size.x / 2.0, -size.y / 2.0, size.x, size.y) {
        pixmap.stroke_path(&PathBuilder::from_rect(rect), &paint, &stroke, frame, None);
    }

    let handles = geometry::handle_coords(layer);
    let find = |key: HandleKey| handles.iter().find(|(k, _)| *k == key).map(|(_, p)| *p);
    if let (Some(top), Some(rot)) = (find(HandleKey::Top), find(HandleKey::Rotate)) {
        let mut pb = PathBuilder::new();
        pb.move_to(top.x, top.y);
        pb.line_to(rot.x, rot.y);
        if let Some(guide) = pb.finish() {
            let thin = Stroke {
                width: 1.0,
                ..Stroke::default()
            };
            pixmap.stroke_path(&guide, &paint, &thin, base, None);
        }
    }

    let ring = Stroke {
        width: 2.0,
        ..Stroke::default()
    };
    let white = solid(Color::WHITE);
    for (_, pos) in handles {
        if let Some(circle) = PathBuilder::from_circle(pos.x, pos.y, HANDLE_RADIUS) {
            pixmap.fill_path(&circle, &white, FillRule::Winding, base, None);
            pixmap.stroke_path(&circle, &paint, &ring, base, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::image_source::PixelSource;
    use crate::layer::{LayerPatch, RectShape};
    use crate::template::default_template;

    const RED: Color = Color::rgb(255, 0, 0);

    fn scene() -> SceneStore {
        SceneStore::new(default_template())
    }

    fn red_rect(scene: &mut SceneStore, w: f32, h: f32) -> LayerId {
        let kind = LayerKind::Rect(RectShape { fill: RED, corner_radius: 0.0 });
        scene.add_layer(kind, LayerPatch::size(w, h))
    }

    fn export(scene: &SceneStore) -> Pixmap {
        Renderer::new()
            .render_to_pixmap(scene, default_template(), &RenderOptions::export(1.0), 212, 520)
            .unwrap()
    }

    fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_background_fills_silhouette_only() {
        let pixmap = export(&scene());
        assert_eq!(rgba(&pixmap, 106, 260), [0, 0, 0, 255]);
        assert_eq!(rgba(&pixmap, 0, 0)[3], 0);
        assert_eq!(rgba(&pixmap, 211, 519)[3], 0);
    }

    #[test]
    fn test_oversized_layer_is_clipped() {
        let mut scene = scene();
        red_rect(&mut scene, 2000.0, 2000.0);
        let pixmap = export(&scene);
        assert_eq!(rgba(&pixmap, 106, 260), [255, 0, 0, 255]);
        assert_eq!(rgba(&pixmap, 0, 0)[3], 0);
        assert_eq!(rgba(&pixmap, 211, 0)[3], 0);
    }

    #[test]
    fn test_hidden_layer_is_not_drawn() {
        let mut scene = scene();
        let id = red_rect(&mut scene, 50.0, 50.0);
        scene.apply_transient(id, &LayerPatch { hidden: Some(true), ..Default::default() });
        assert_eq!(rgba(&export(&scene), 106, 260), [0, 0, 0, 255]);
    }

    #[test]
    fn test_opacity_blends_over_background() {
        let mut scene = scene();
        let id = red_rect(&mut scene, 50.0, 50.0);
        scene.apply_transient(id, &LayerPatch { opacity: Some(0.5), ..Default::default() });
        let [r, g, _, a] = rgba(&export(&scene), 106, 260);
        assert!((120..=136).contains(&r), "red was {r}");
        assert_eq!(g, 0);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_shadow_is_offset() {
        let mut scene = scene();
        let id = red_rect(&mut scene, 20.0, 20.0);
        let shadow = Shadow {
            enabled: true,
            color: Color::rgb(0, 0, 255),
            blur: 0.0,
            offset_x: 5.0,
            offset_y: 5.0,
        };
        scene.apply_transient(id, &LayerPatch { shadow: Some(shadow), ..Default::default() });
        let pixmap = export(&scene);
        assert_eq!(rgba(&pixmap, 106, 260), [255, 0, 0, 255]);
        assert_eq!(rgba(&pixmap, 106 + 12, 260 + 12), [0, 0, 255, 255]);
    }

    #[test]
    fn test_blurred_shadow_stays_near_layer() {
        let mut scene = scene();
        let id = red_rect(&mut scene, 20.0, 20.0);
        let shadow = Shadow {
            enabled: true,
            color: Color::rgb(0, 0, 255),
            blur: 4.0,
            offset_x: 10.0,
            offset_y: 10.0,
        };
        scene.apply_transient(id, &LayerPatch { shadow: Some(shadow), ..Default::default() });
        let pixmap = export(&scene);
        assert_eq!(rgba(&pixmap, 106, 260), [255, 0, 0, 255]);
        let [r, _, b, _] = rgba(&pixmap, 121, 275);
        assert_eq!(r, 0);
        assert!(b > 100, "blue was {b}");
        assert_eq!(rgba(&pixmap, 106 + 60, 260), [0, 0, 0, 255]);
        assert_eq!(rgba(&pixmap, 106, 260 + 80), [0, 0, 0, 255]);
    }

    #[test]
    fn test_shadow_covers_layer_bounds_plus_blur() {
        let mut layer = Pixmap::new(200, 200).unwrap();
        layer.fill_rect(
            Rect::from_xywh(50.0, 60.0, 10.0, 10.0).unwrap(),
            &solid(RED),
            Transform::identity(),
            None,
        );
        assert_eq!(alpha_bounds(&layer), Some((50, 60, 10, 10)));

        let shadow = Shadow {
            enabled: true,
            color: Color::rgb(0, 0, 255),
            blur: 4.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        // sigma 2, spread 6 on each side
        let cast = cast_shadow(&layer, &shadow, 1.0).unwrap().unwrap();
        assert_eq!((cast.x, cast.y), (44, 54));
        assert_eq!((cast.pixmap.width(), cast.pixmap.height()), (22, 22));
        assert!(cast.pixmap.pixel(11, 11).unwrap().alpha() > 200);
        assert!(cast.pixmap.pixel(0, 0).unwrap().alpha() < 8);

        let empty = Pixmap::new(200, 200).unwrap();
        assert!(cast_shadow(&empty, &shadow, 1.0).unwrap().is_none());
    }

    #[test]
    fn test_image_layer_draws_its_pixels() {
        let mut img = image::RgbaImage::new(2, 2);
        for px in img.pixels_mut() {
            *px = image::Rgba([0, 255, 0, 255]);
        }
        let pixels = Arc::new(PixelSource::from_rgba_image(&img).unwrap());
        let src = pixels.to_png_data_url().unwrap();
        let mut scene = scene();
        scene.add_layer(
            LayerKind::Image(ImageContent::new(src, Some(pixels))),
            LayerPatch::default().with_scale(10.0, 10.0),
        );
        assert_eq!(rgba(&export(&scene), 106, 260), [0, 255, 0, 255]);
    }

    #[test]
    fn test_editor_chrome_draws_bezel() {
        let scene = scene();
        let options = RenderOptions::editor(1.0, None, false);
        let pixmap = Renderer::new()
            .render_to_pixmap(&scene, default_template(), &options, 612, 920)
            .unwrap();
        // 8 world units left of the canvas edge, vertically centered
        let m = CANVAS_MARGIN as u32;
        assert_eq!(rgba(&pixmap, m - 8, m + 260), [0x11, 0x18, 0x27, 255]);
        // far outside the bezel stays clear
        assert_eq!(rgba(&pixmap, 10, 10)[3], 0);
    }

    #[test]
    fn test_selection_overlay_hidden_while_modal() {
        let mut scene = scene();
        let id = red_rect(&mut scene, 100.0, 100.0);
        let m = CANVAS_MARGIN as u32;
        // top-left handle center sits at world (56, 210)
        let (x, y) = (m + 56, m + 210);

        let render = |modal: bool| {
            let options = RenderOptions::editor(1.0, Some(id), modal);
            Renderer::new()
                .render_to_pixmap(&scene, default_template(), &options, 612, 920)
                .unwrap()
        };
        assert_eq!(rgba(&render(false), x, y), [255, 255, 255, 255]);
        assert_eq!(rgba(&render(true), x, y), [255, 0, 0, 255]);
    }
}
