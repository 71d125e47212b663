//! Saving and restoring the composition.
//!
//! The document is a JSON object `{backgroundColor, assets, layers}` kept
//! under [`STORAGE_KEY`] in eframe's storage. Loading is best effort: a
//! missing or malformed document yields an empty scene and a warning.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::PersistenceError;
use crate::layer::Layer;
use crate::scene::{Asset, SceneStore};
use crate::template::DeviceTemplate;

pub const STORAGE_KEY: &str = "watchface_editor_state";

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    #[serde(default = "black")]
    pub background_color: Color,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

fn black() -> Color {
    Color::BLACK
}

impl Default for PersistedDocument {
    fn default() -> Self {
        Self {
            background_color: Color::BLACK,
            assets: Vec::new(),
            layers: Vec::new(),
        }
    }
}

impl PersistedDocument {
    pub fn from_scene(scene: &SceneStore) -> Self {
        Self {
            background_color: scene.background(),
            assets: scene.assets().to_vec(),
            layers: scene.layers().to_vec(),
        }
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the document into `scene`, re-decoding images and restarting history.
    pub fn restore_into(self, scene: &mut SceneStore) {
        scene.replace_contents(self.background_color, self.assets, self.layers);
    }
}

/// Build a scene from an optional stored document.
pub fn load_best_effort(json: Option<&str>, template: &DeviceTemplate) -> SceneStore {
    let mut scene = SceneStore::new(template);
    restore_best_effort(json, &mut scene);
    scene
}

/// Replace `scene` with the stored document, leaving it untouched when the
/// document is missing or unreadable.
pub fn restore_best_effort(json: Option<&str>, scene: &mut SceneStore) {
    let Some(json) = json else {
        return;
    };
    match PersistedDocument::from_json(json) {
        Ok(doc) => {
            log::info!("Restored {} layers and {} assets", doc.layers.len(), doc.assets.len());
            doc.restore_into(scene);
        }
        Err(err) => log::warn!("Ignoring saved state: {}", err),
    }
}

pub fn restore_from_storage(storage: Option<&dyn eframe::Storage>, scene: &mut SceneStore) {
    let json = storage.and_then(|s| s.get_string(STORAGE_KEY));
    restore_best_effort(json.as_deref(), scene);
}

pub fn save_to_storage(storage: &mut dyn eframe::Storage, scene: &SceneStore) {
    match PersistedDocument::from_scene(scene).to_json() {
        Ok(json) => storage.set_string(STORAGE_KEY, json),
        Err(err) => log::error!("Failed to save editor state: {}", err),
    }
}

/// Write the document as a standalone project file.
pub fn save_to_path(scene: &SceneStore, path: &Path) -> PersistenceResult<()> {
    let json = serde_json::to_string_pretty(&PersistedDocument::from_scene(scene))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> PersistenceResult<PersistedDocument> {
    let json = fs::read_to_string(path)?;
    PersistedDocument::from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{LayerKind, LayerPatch, TextContent};
    use crate::template::default_template;

    #[test]
    fn test_malformed_json_loads_empty_scene() {
        for json in ["", "{", "[1,2,3]", r#"{"layers": 5}"#] {
            let scene = load_best_effort(Some(json), default_template());
            assert!(scene.layers().is_empty());
            assert_eq!(scene.background(), Color::BLACK);
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = PersistedDocument::from_json("{}").unwrap();
        assert_eq!(doc.background_color, Color::BLACK);
        assert!(doc.layers.is_empty());
    }

    #[test]
    fn test_document_survives_a_reload() {
        let mut scene = SceneStore::new(default_template());
        scene.set_background_and_commit(Color::rgb(10, 20, 30));
        scene.add_layer(LayerKind::Text(TextContent::new("09:41")), LayerPatch::default());

        let json = PersistedDocument::from_scene(&scene).to_json().unwrap();
        let restored = load_best_effort(Some(&json), default_template());
        assert_eq!(restored.background(), Color::rgb(10, 20, 30));
        assert_eq!(restored.layers(), scene.layers());
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_project_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("face.json");
        let mut scene = SceneStore::new(default_template());
        scene.set_background_and_commit(Color::WHITE);
        save_to_path(&scene, &path).unwrap();
        let doc = load_from_path(&path).unwrap();
        assert_eq!(doc.background_color, Color::WHITE);
        assert!(matches!(
            load_from_path(&dir.path().join("missing.json")),
            Err(PersistenceError::Io(_))
        ));
    }
}
