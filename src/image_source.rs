//! Decoded pixel sources and how they get into the editor.
//!
//! A layer or asset keeps its image as a data URL (`src`); the decoded
//! [`PixelSource`] is a cache rebuilt from it on load, undo and redo.
//! Uploads and dropped files are decoded off the UI thread by
//! [`DecodeWorker`] and collected once per frame.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use tiny_skia::{ColorU8, Pixmap};

use crate::error::ImageError;

/// Premultiplied RGBA pixels of a decoded image
pub struct PixelSource {
    pixmap: Pixmap,
}

impl fmt::Debug for PixelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelSource({}x{})", self.width(), self.height())
    }
}

impl PixelSource {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Decode any format the `image` crate understands.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba_image(&rgba)
    }

    pub fn from_rgba_image(rgba: &image::RgbaImage) -> Result<Self, ImageError> {
        let (width, height) = rgba.dimensions();
        let mut pixmap =
            Pixmap::new(width, height).ok_or(ImageError::InvalidDimensions { width, height })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self { pixmap })
    }

    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let (_, bytes) = decode_data_url(url)?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy for per-pixel processing
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut out = image::RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    pub fn to_png_data_url(&self) -> Result<String, ImageError> {
        let png = self
            .pixmap
            .encode_png()
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(encode_data_url("image/png", &png))
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Split a `data:<mime>;base64,<payload>` URL into its mime type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), ImageError> {
    let rest = url.strip_prefix("data:").ok_or(ImageError::NotADataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ImageError::NotADataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ImageError::NotADataUrl)?;
    let bytes = BASE64.decode(payload.trim())?;
    Ok((mime.to_owned(), bytes))
}

fn guess_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Decoded sources keyed by their `src`, so undo/redo does not re-decode.
#[derive(Default)]
pub struct DecodeCache {
    entries: HashMap<u64, Arc<PixelSource>>,
}

impl DecodeCache {
    /// Entries kept once nothing else references them
    const MAX_UNUSED: usize = 32;

    pub fn new() -> Self {
        Self::default()
    }

    fn key(src: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        src.hash(&mut hasher);
        hasher.finish()
    }

    pub fn insert(&mut self, src: &str, pixels: Arc<PixelSource>) {
        self.entries.insert(Self::key(src), pixels);
    }

    pub fn get_or_decode(&mut self, src: &str) -> Result<Arc<PixelSource>, ImageError> {
        let key = Self::key(src);
        if let Some(pixels) = self.entries.get(&key) {
            return Ok(Arc::clone(pixels));
        }

        let pixels = Arc::new(PixelSource::from_data_url(src)?);
        self.prune();
        self.entries.insert(key, Arc::clone(&pixels));
        Ok(pixels)
    }

    /// Drop sources no layer or asset holds anymore when over the limit
    fn prune(&mut self) {
        let unused = self
            .entries
            .values()
            .filter(|p| Arc::strong_count(p) == 1)
            .count();
        if unused > Self::MAX_UNUSED {
            self.entries.retain(|_, p| Arc::strong_count(p) > 1);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A file decoded off the UI thread, ready to become an asset
#[derive(Debug)]
pub struct DecodedUpload {
    pub name: String,
    pub src: String,
    pub pixels: Arc<PixelSource>,
}

/// Decodes uploaded bytes on background threads
pub struct DecodeWorker {
    sender: UnboundedSender<(String, Result<DecodedUpload, ImageError>)>,
    receiver: UnboundedReceiver<(String, Result<DecodedUpload, ImageError>)>,
    pending: usize,
}

impl Default for DecodeWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeWorker {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver, pending: 0 }
    }

    pub fn submit(&mut self, name: String, bytes: Vec<u8>) {
        log::info!("Decoding upload: {} ({} bytes)", name, bytes.len());
        let sender = self.sender.clone();
        self.pending += 1;
        std::thread::spawn(move || {
            let result = PixelSource::decode(&bytes).map(|pixels| DecodedUpload {
                src: encode_data_url(guess_mime(&bytes), &bytes),
                name: name.clone(),
                pixels: Arc::new(pixels),
            });
            // The receiver only goes away with the app
            let _ = sender.unbounded_send((name, result));
        });
    }

    /// Completed decodes since the last call. Never blocks.
    pub fn poll(&mut self) -> Vec<Result<DecodedUpload, (String, ImageError)>> {
        let mut done = Vec::new();
        while let Ok((name, result)) = self.receiver.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            done.push(result.map_err(|e| (name, e)));
        }
        done
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }
}

/// Hand image files dropped onto the window this frame to the worker.
///
/// Returns the number of files queued for decoding.
pub fn queue_dropped_files(ctx: &egui::Context, worker: &mut DecodeWorker) -> usize {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    let mut queued = 0;

    for file in dropped {
        let file_name = if let Some(path) = &file.path {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        } else if !file.name.is_empty() {
            file.name.clone()
        } else {
            "unknown".to_owned()
        };

        if !is_image_file(&file) {
            log::warn!("Dropped file is not a supported type: {}", file_name);
            continue;
        }

        let bytes = if let Some(bytes) = &file.bytes {
            bytes.to_vec()
        } else if let Some(path) = &file.path {
            match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::error!("Failed to read image file: {}: {}", path.display(), err);
                    continue;
                }
            }
        } else {
            continue;
        };

        worker.submit(file_name, bytes);
        queued += 1;
    }
    queued
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(ext) = file.path.as_ref().and_then(|p| p.extension()) {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn data_url_round_trip_keeps_pixels() {
        let url = encode_data_url("image/png", &tiny_png());
        assert!(url.starts_with("data:image/png;base64,"));
        let source = PixelSource::from_data_url(&url).unwrap();
        assert_eq!((source.width(), source.height()), (2, 1));
        let rgba = source.to_rgba_image();
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0[3], 128);
    }

    #[test]
    fn rejects_non_data_urls() {
        assert!(matches!(
            PixelSource::from_data_url("https://example.com/a.png"),
            Err(ImageError::NotADataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(ImageError::Base64(_))
        ));
    }

    #[test]
    fn cache_reuses_decoded_source() {
        let url = encode_data_url("image/png", &tiny_png());
        let mut cache = DecodeCache::new();
        let a = cache.get_or_decode(&url).unwrap();
        let b = cache.get_or_decode(&url).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn worker_reports_decoded_upload() {
        let mut worker = DecodeWorker::new();
        worker.submit("dot.png".into(), tiny_png());
        let mut results = Vec::new();
        for _ in 0..200 {
            results.extend(worker.poll());
            if !results.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        let upload = results.pop().unwrap().unwrap();
        assert_eq!(upload.name, "dot.png");
        assert!(upload.src.starts_with("data:image/png;base64,"));
        assert!(!worker.is_busy());
    }
}
