use egui::color_picker::{Alpha, color_edit_button_srgba};

use crate::color::Color;

/// Labelled color button. Returns the new color when it changed.
pub fn color_row(ui: &mut egui::Ui, label: &str, color: Color) -> Option<Color> {
    let mut value = color.to_egui();
    let changed = ui
        .horizontal(|ui| {
            ui.label(label);
            color_edit_button_srgba(ui, &mut value, Alpha::OnlyBlend).changed()
        })
        .inner;
    changed.then(|| Color::from_egui(value))
}

/// Labelled slider over a copy of `value`. Returns the new value when it changed.
pub fn slider_row(
    ui: &mut egui::Ui,
    label: &str,
    value: f32,
    range: std::ops::RangeInclusive<f32>,
) -> Option<f32> {
    let mut v = value;
    ui.add(egui::Slider::new(&mut v, range).text(label))
        .changed()
        .then_some(v)
}

pub fn checkbox_row(ui: &mut egui::Ui, label: &str, value: bool) -> Option<bool> {
    let mut v = value;
    ui.checkbox(&mut v, label).changed().then_some(v)
}

/// Small filled swatch button
pub fn swatch(ui: &mut egui::Ui, color: Color, selected: bool) -> egui::Response {
    let size = egui::vec2(24.0, 24.0);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let painter = ui.painter_at(rect);
    painter.circle_filled(rect.center(), 11.0, color.to_egui());
    let stroke_color = if selected {
        egui::Color32::from_rgb(0x8b, 0x5c, 0xf6)
    } else {
        egui::Color32::from_gray(160)
    };
    painter.circle_stroke(rect.center(), 11.0, egui::Stroke::new(if selected { 2.0 } else { 1.0 }, stroke_color));
    response.on_hover_text(color.to_hex())
}
