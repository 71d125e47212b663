//! Offscreen export of the composition to PNG or JPEG.

use std::fmt;
use std::path::{Path, PathBuf};

use image::ImageEncoder;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::renderer::{RenderOptions, Renderer};
use crate::scene::SceneStore;
use crate::template::DeviceTemplate;

const JPEG_QUALITY: u8 = 90;

/// Scales offered by the export dialog
pub const EXPORT_SCALES: [f32; 3] = [1.0, 2.0, 3.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "PNG"),
            ExportFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Output size for a template at `scale`
pub fn export_dimensions(template: &DeviceTemplate, scale: f32) -> (u32, u32) {
    (
        (template.width * scale).round().max(1.0) as u32,
        (template.height * scale).round().max(1.0) as u32,
    )
}

/// Render the scene without chrome or selection and encode it.
///
/// JPEG has no alpha; pixels outside the silhouette come out black.
pub fn export_image(
    scene: &SceneStore,
    template: &DeviceTemplate,
    format: ExportFormat,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ExportError::InvalidScale(scale));
    }
    let (width, height) = export_dimensions(template, scale);
    let pixmap = Renderer::new()
        .render_to_pixmap(scene, template, &RenderOptions::export(scale), width, height)
        .map_err(|_| ExportError::Surface { width, height })?;

    let bytes = match format {
        ExportFormat::Png => pixmap.encode_png().map_err(|e| ExportError::Encode {
            format: "PNG",
            reason: e.to_string(),
        })?,
        ExportFormat::Jpeg => {
            // premultiplied color is already composited over black
            let rgb: Vec<u8> = pixmap
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let mut buf = std::io::Cursor::new(Vec::new());
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
                .write_image(&rgb, width, height, image::ColorType::Rgb8.into())
                .map_err(|e| ExportError::Encode {
                    format: "JPEG",
                    reason: e.to_string(),
                })?;
            buf.into_inner()
        }
    };
    log::info!("Exported {}x{} {} ({} bytes)", width, height, format, bytes.len());
    Ok(bytes)
}

pub fn export_file_name(format: ExportFormat) -> String {
    format!("watchface.{}", format.extension())
}

/// Save export bytes into `dir`, or the user's downloads directory, or the
/// working directory, and return the written path.
pub fn write_export(bytes: &[u8], format: ExportFormat, dir: Option<&Path>) -> Result<PathBuf, ExportError> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
    };
    let path = dir.join(export_file_name(format));
    std::fs::write(&path, bytes)?;
    log::info!("Wrote export to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{default_template, template_by_id};

    #[test]
    fn test_file_names() {
        assert_eq!(export_file_name(ExportFormat::Png), "watchface.png");
        assert_eq!(export_file_name(ExportFormat::Jpeg), "watchface.jpeg");
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        let scene = SceneStore::new(default_template());
        for scale in [0.0, -1.0, f32::NAN] {
            let result = export_image(&scene, default_template(), ExportFormat::Png, scale);
            assert!(matches!(result, Err(ExportError::InvalidScale(_))));
        }
    }

    #[test]
    fn test_jpeg_decodes_at_expected_size() {
        let template = template_by_id("band9");
        let scene = SceneStore::new(template);
        let bytes = export_image(&scene, template, ExportFormat::Jpeg, 1.5).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (288, 735));
    }

    #[test]
    fn test_write_export_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(b"png", ExportFormat::Png, Some(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("watchface.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"png");
    }
}
