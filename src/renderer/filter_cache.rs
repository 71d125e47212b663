use std::collections::HashMap;
use std::sync::Arc;

use tiny_skia::{IntRect, Pixmap};

use crate::error::RenderError;
use crate::image_source::PixelSource;
use crate::layer::{Crop, Filters};

/// Identity of a filtered crop: the decoded source, the crop window and the filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    source: usize,
    crop: [u32; 4],
    filters: [u32; 4],
}

impl CacheKey {
    fn new(source: &Arc<PixelSource>, crop: Crop, filters: &Filters) -> Self {
        Self {
            source: Arc::as_ptr(source) as usize,
            crop: [crop.x, crop.y, crop.w, crop.h].map(f32::to_bits),
            filters: [filters.brightness, filters.contrast, filters.saturate, filters.grayscale]
                .map(f32::to_bits),
        }
    }
}

struct Entry {
    /// Held so the source address in the key stays unique while cached
    _source: Arc<PixelSource>,
    pixmap: Arc<Pixmap>,
    last_used: u64,
}

/// Caches cropped, color-filtered copies of image sources, evicting least
/// recently used entries beyond `max_entries`.
pub struct FilterCache {
    entries: HashMap<CacheKey, Entry>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    max_entries: usize,
}

impl FilterCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            current_frame: 0,
            max_entries: max_entries.max(1),
        }
    }

    /// Increments the frame counter, should be called once per render pass
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    pub fn get_or_create(
        &mut self,
        source: &Arc<PixelSource>,
        crop: Crop,
        filters: &Filters,
    ) -> Result<Arc<Pixmap>, RenderError> {
        let key = CacheKey::new(source, crop, filters);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = self.current_frame;
            return Ok(Arc::clone(&entry.pixmap));
        }

        let pixmap = Arc::new(filtered_crop(source, crop, filters)?);
        self.entries.insert(
            key,
            Entry {
                _source: Arc::clone(source),
                pixmap: Arc::clone(&pixmap),
                last_used: self.current_frame,
            },
        );
        self.prune_if_needed();
        Ok(pixmap)
    }

    /// Remove the oldest entries until we're back under the limit
    fn prune_if_needed(&mut self) {
        if self.entries.len() <= self.max_entries {
            return;
        }
        let mut by_age: Vec<(CacheKey, u64)> =
            self.entries.iter().map(|(k, e)| (*k, e.last_used)).collect();
        by_age.sort_by_key(|(_, frame)| *frame);

        let to_remove = self.entries.len() - self.max_entries;
        for (key, _) in by_age.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cut the crop window out of `source` and apply the CSS color filters.
fn filtered_crop(
    source: &PixelSource,
    crop: Crop,
    filters: &Filters,
) -> Result<Pixmap, RenderError> {
    let (sw, sh) = (source.width() as f32, source.height() as f32);
    let x = (crop.x * sw).round() as i32;
    let y = (crop.y * sh).round() as i32;
    let w = ((crop.w * sw).round() as u32).max(1);
    let h = ((crop.h * sh).round() as u32).max(1);

    let rect = IntRect::from_xywh(x, y, w, h).ok_or(RenderError::Geometry)?;
    let mut pixmap = source
        .pixmap()
        .clone_rect(rect)
        .ok_or(RenderError::Surface { width: w, height: h })?;

    if !filters.is_identity() {
        let matrix = ColorFilter::new(filters);
        for px in pixmap.pixels_mut() {
            let c = px.demultiply();
            let [r, g, b] = matrix.apply([c.red(), c.green(), c.blue()]);
            *px = tiny_skia::ColorU8::from_rgba(r, g, b, c.alpha()).premultiply();
        }
    }
    Ok(pixmap)
}

/// brightness → contrast → saturate → grayscale, as CSS applies them
struct ColorFilter {
    brightness: f32,
    contrast: f32,
    saturate: [[f32; 3]; 3],
    grayscale: [[f32; 3]; 3],
}

impl ColorFilter {
    fn new(filters: &Filters) -> Self {
        let s = (filters.saturate / 100.0).max(0.0);
        let a = 1.0 - (filters.grayscale / 100.0).clamp(0.0, 1.0);
        Self {
            brightness: (filters.brightness / 100.0).max(0.0),
            contrast: (filters.contrast / 100.0).max(0.0),
            saturate: [
                [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
            ],
            grayscale: [
                [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
                [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
                [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
            ],
        }
    }

    fn apply(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut c = rgb.map(|v| v as f32 / 255.0);
        c = c.map(|v| (v * self.brightness).clamp(0.0, 1.0));
        c = c.map(|v| ((v - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0));
        c = mul(&self.saturate, c);
        c = mul(&self.grayscale, c);
        c.map(|v| (v * 255.0).round() as u8)
    }
}

fn mul(m: &[[f32; 3]; 3], c: [f32; 3]) -> [f32; 3] {
    let row = |r: &[f32; 3]| (r[0] * c[0] + r[1] * c[1] + r[2] * c[2]).clamp(0.0, 1.0);
    [row(&m[0]), row(&m[1]), row(&m[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(w: u32, h: u32) -> Arc<PixelSource> {
        let mut img = image::RgbaImage::new(w, h);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = image::Rgba([if x < w / 2 { 200 } else { 10 }, 100, 50, 255]);
        }
        Arc::new(PixelSource::from_rgba_image(&img).unwrap())
    }

    #[test]
    fn test_cache_hit() {
        let src = source(4, 4);
        let mut cache = FilterCache::new(10);
        let a = cache.get_or_create(&src, Crop::FULL, &Filters::default()).unwrap();
        let b = cache.get_or_create(&src, Crop::FULL, &Filters::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let src = source(4, 4);
        let mut cache = FilterCache::new(2);
        let filters = |b: f32| Filters { brightness: b, ..Filters::default() };

        cache.get_or_create(&src, Crop::FULL, &filters(10.0)).unwrap();
        cache.begin_frame();
        cache.get_or_create(&src, Crop::FULL, &filters(20.0)).unwrap();
        cache.begin_frame();
        cache.get_or_create(&src, Crop::FULL, &filters(30.0)).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(!cache.entries.contains_key(&CacheKey::new(&src, Crop::FULL, &filters(10.0))));
    }

    #[test]
    fn test_crop_window_is_cut_out() {
        let src = source(4, 2);
        let mut cache = FilterCache::new(4);
        let right = Crop { x: 0.5, y: 0.0, w: 0.5, h: 1.0 };
        let pixmap = cache.get_or_create(&src, right, &Filters::default()).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (2, 2));
        assert_eq!(pixmap.pixel(0, 0).unwrap().red(), 10);
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let m = ColorFilter::new(&Filters { grayscale: 100.0, ..Filters::default() });
        let [r, g, b] = m.apply([200, 100, 50]);
        assert_eq!(r, g);
        assert_eq!(g, b);
        let id = ColorFilter::new(&Filters::default());
        assert_eq!(id.apply([200, 100, 50]), [200, 100, 50]);
    }
}
