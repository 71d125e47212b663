use thiserror::Error;

/// Errors from decoding or encoding image sources
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Not a base64 data URL")]
    NotADataUrl,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Errors that can occur while exporting the composition
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export scale must be positive, got {0}")]
    InvalidScale(f32),

    #[error("Failed to allocate a {width}x{height} render surface")]
    Surface { width: u32, height: u32 },

    #[error("Failed to encode {format}: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during state persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to (de)serialize state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access state file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single layer could not be painted
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("Image pixels are not decoded yet")]
    MissingPixels,

    #[error("No usable font for '{0}'")]
    NoFont(String),

    #[error("Degenerate geometry")]
    Geometry,
}
