/// How the device display rounds its corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerSpec {
    /// Fully rounded short side: radius = min(w, h) / 2
    Pill,
    Radius(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeInsets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// A target device: canvas size in pixels plus the display silhouette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub device: &'static str,
    pub width: f32,
    pub height: f32,
    pub corner: CornerSpec,
    pub safe_insets: SafeInsets,
    pub notes: &'static str,
}

impl DeviceTemplate {
    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.width, self.height)
    }
}

pub const TEMPLATES: &[DeviceTemplate] = &[
    DeviceTemplate {
        id: "band10",
        label: "Xiaomi Smart Band 10",
        device: "xiaomi_smart_band_10",
        width: 212.0,
        height: 520.0,
        corner: CornerSpec::Pill,
        safe_insets: SafeInsets { top: 28.0, right: 14.0, bottom: 28.0, left: 14.0 },
        notes: "Rounded corners; keep text/icons inside safe area.",
    },
    DeviceTemplate {
        id: "band9",
        label: "Xiaomi Smart Band 9",
        device: "xiaomi_smart_band_9",
        width: 192.0,
        height: 490.0,
        corner: CornerSpec::Pill,
        safe_insets: SafeInsets { top: 26.0, right: 12.0, bottom: 26.0, left: 12.0 },
        notes: "Rounded corners; keep text/icons inside safe area.",
    },
    DeviceTemplate {
        id: "band8",
        label: "Xiaomi Smart Band 8",
        device: "xiaomi_smart_band_8",
        width: 192.0,
        height: 490.0,
        corner: CornerSpec::Pill,
        safe_insets: SafeInsets { top: 26.0, right: 12.0, bottom: 26.0, left: 12.0 },
        notes: "Pill display; safe area recommended for text/icons.",
    },
];

pub fn default_template() -> &'static DeviceTemplate {
    &TEMPLATES[0]
}

/// Look up a template by id, falling back to the default one.
pub fn template_by_id(id: &str) -> &'static DeviceTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .unwrap_or_else(|| default_template())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_falls_back_to_band10() {
        assert_eq!(template_by_id("band9").width, 192.0);
        assert_eq!(template_by_id("nope").id, "band10");
    }
}
