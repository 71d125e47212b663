use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::template::{DeviceTemplate, template_by_id};

/// Editor preferences, persisted with the app state on shutdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct EditorConfig {
    pub template_id: String,
    pub history_capacity: usize,
    pub export_format: ExportFormat,
    pub export_scale: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            template_id: "band10".to_owned(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            export_format: ExportFormat::Png,
            export_scale: 1.0,
        }
    }
}

impl EditorConfig {
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        storage
            .and_then(|s| eframe::get_value::<EditorConfig>(s, eframe::APP_KEY))
            .unwrap_or_default()
    }

    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    pub fn template(&self) -> &'static DeviceTemplate {
        template_by_id(&self.template_id)
    }
}
