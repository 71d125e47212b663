use crate::WatchFaceApp;
use crate::interaction::PASTE_OFFSET;
use crate::layer::{Layer, LayerId, LayerKind, LayerPatch, Outline, Shadow, TextCurve};
use crate::tools;

use super::widgets::{checkbox_row, color_row, slider_row};

const FONT_WEIGHTS: [u16; 9] = [100, 200, 300, 400, 500, 600, 700, 800, 900];

enum RowAction {
    Select(LayerId),
    Patch(LayerId, LayerPatch),
    Reorder { dragged: LayerId, target: LayerId },
}

enum EditAction {
    /// Merge without history; committed when the pointer is released
    Transient(LayerPatch),
    /// Keystroke in a text field; committed when the field loses focus
    Typing(LayerPatch),
    FinishTyping,
    Commit(LayerPatch),
    Duplicate,
    Delete,
    Crop,
    RemoveBackground,
}

pub fn layers_panel(app: &mut WatchFaceApp, ctx: &egui::Context) {
    egui::SidePanel::right("layers_panel")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Layers");
            let rows = layer_list(app, ui);
            for action in rows {
                match action {
                    RowAction::Select(id) => app.scene.select(Some(id)),
                    RowAction::Patch(id, patch) => app.scene.apply_and_commit(id, &patch),
                    RowAction::Reorder { dragged, target } => app.scene.reorder(dragged, target),
                }
            }

            ui.separator();
            let Some(layer) = app.scene.selected_layer().cloned() else {
                ui.weak("Select a layer to edit it");
                return;
            };
            let actions = egui::ScrollArea::vertical()
                .show(ui, |ui| layer_editor(ui, &layer))
                .inner;
            for action in actions {
                apply_edit(app, &layer, action);
            }
        });
}

/// Topmost layer first. Rows can be dragged onto each other to reorder.
fn layer_list(app: &WatchFaceApp, ui: &mut egui::Ui) -> Vec<RowAction> {
    let mut actions = Vec::new();
    let selected = app.scene.selected();

    egui::ScrollArea::vertical()
        .id_salt("layer_list")
        .max_height(220.0)
        .show(ui, |ui| {
            for layer in app.scene.layers().iter().rev() {
                let row_id = egui::Id::new(("layer_row", layer.id));
                let row = ui.horizontal(|ui| {
                    ui.dnd_drag_source(row_id, layer.id, |ui| {
                        ui.label("☰");
                    });
                    let mut visible = !layer.hidden;
                    if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
                        actions.push(RowAction::Patch(
                            layer.id,
                            LayerPatch { hidden: Some(!visible), ..Default::default() },
                        ));
                    }
                    let lock = if layer.locked { "🔒" } else { "🔓" };
                    if ui.small_button(lock).on_hover_text("Lock").clicked() {
                        actions.push(RowAction::Patch(
                            layer.id,
                            LayerPatch { locked: Some(!layer.locked), ..Default::default() },
                        ));
                    }
                    let label = format!("{} {}", kind_icon(&layer.kind), layer.display_name());
                    if ui.selectable_label(selected == Some(layer.id), label).clicked() {
                        actions.push(RowAction::Select(layer.id));
                    }
                });
                if let Some(dragged) = row.response.dnd_release_payload::<LayerId>() {
                    actions.push(RowAction::Reorder { dragged: *dragged, target: layer.id });
                }
            }
        });
    actions
}

fn kind_icon(kind: &LayerKind) -> &'static str {
    match kind {
        LayerKind::Image(_) => "🖼",
        LayerKind::Text(_) => "T",
        LayerKind::Clock(_) => "🕒",
        LayerKind::Rect(_) => "▭",
        LayerKind::Circle(_) => "○",
        LayerKind::Triangle(_) => "△",
        LayerKind::Line(_) => "─",
        LayerKind::Arrow(_) => "➡",
        LayerKind::Star(_) => "☆",
        LayerKind::Diamond(_) => "◇",
        LayerKind::Polygon(_) => "⬡",
    }
}

fn apply_edit(app: &mut WatchFaceApp, layer: &Layer, action: EditAction) {
    match action {
        EditAction::Transient(patch) => {
            app.scene.apply_transient(layer.id, &patch);
            app.pending_commit = true;
        }
        EditAction::Typing(patch) => app.scene.apply_transient(layer.id, &patch),
        EditAction::FinishTyping => app.scene.commit(),
        EditAction::Commit(patch) => app.scene.apply_and_commit(layer.id, &patch),
        EditAction::Duplicate => {
            app.scene.duplicate_layer(layer.id, PASTE_OFFSET);
        }
        EditAction::Delete => app.scene.delete_layer(layer.id),
        EditAction::Crop => app.open_crop(layer.id),
        EditAction::RemoveBackground => app.open_background_removal(layer.id),
    }
}

fn layer_editor(ui: &mut egui::Ui, layer: &Layer) -> Vec<EditAction> {
    let mut out = Vec::new();
    let mut transient = LayerPatch::default();

    ui.horizontal(|ui| {
        ui.label("Name");
        let mut name = layer.display_name();
        let response = ui.text_edit_singleline(&mut name);
        typing_actions(&response, LayerPatch::default().with_name(name), &mut out);
    });

    egui::CollapsingHeader::new("Transform").default_open(true).show(ui, |ui| {
        egui::Grid::new("transform_grid").num_columns(2).show(ui, |ui| {
            let drag = |ui: &mut egui::Ui, label: &str, value: f32, speed: f64| -> Option<f32> {
                ui.label(label);
                let mut v = value;
                let changed = ui.add(egui::DragValue::new(&mut v).speed(speed)).changed();
                ui.end_row();
                changed.then_some(v)
            };
            if let Some(v) = drag(ui, "X", layer.x, 1.0) {
                transient.x = Some(v);
            }
            if let Some(v) = drag(ui, "Y", layer.y, 1.0) {
                transient.y = Some(v);
            }
            if let Some(v) = drag(ui, "Scale X", layer.scale_x, 0.01) {
                transient.scale_x = Some(v.max(0.01));
            }
            if let Some(v) = drag(ui, "Scale Y", layer.scale_y, 0.01) {
                transient.scale_y = Some(v.max(0.01));
            }
            if let Some(v) = drag(ui, "Rotation", layer.rotation, 1.0) {
                transient.rotation = Some(v);
            }
        });
        if let Some(v) = slider_row(ui, "Opacity", layer.opacity, 0.0..=1.0) {
            transient.opacity = Some(v);
        }
    });

    match &layer.kind {
        LayerKind::Text(text) | LayerKind::Clock(text) => {
            egui::CollapsingHeader::new("Text").default_open(true).show(ui, |ui| {
                let mut value = text.text.clone();
                let response = ui.text_edit_multiline(&mut value);
                let patch = LayerPatch { text: Some(value), ..Default::default() };
                typing_actions(&response, patch, &mut out);
                if let Some(v) = slider_row(ui, "Size", text.font_size, 8.0..=200.0) {
                    transient.font_size = Some(v);
                }
                egui::ComboBox::from_label("Weight")
                    .selected_text(text.font_weight.to_string())
                    .show_ui(ui, |ui| {
                        for weight in FONT_WEIGHTS {
                            if ui.selectable_label(weight == text.font_weight, weight.to_string()).clicked() {
                                out.push(EditAction::Commit(LayerPatch {
                                    font_weight: Some(weight),
                                    ..Default::default()
                                }));
                            }
                        }
                    });
                ui.horizontal(|ui| {
                    ui.label("Font");
                    let mut family = text.font_family.clone();
                    let response = ui.text_edit_singleline(&mut family);
                    let patch = LayerPatch { font_family: Some(family), ..Default::default() };
                    typing_actions(&response, patch, &mut out);
                });
                if let Some(c) = color_row(ui, "Color", text.color) {
                    transient.color = Some(c);
                }

                let curve = text.curve.unwrap_or_default();
                if let Some(enabled) = checkbox_row(ui, "Curved", curve.enabled) {
                    transient.curve = Some(TextCurve { enabled, ..curve });
                }
                if curve.enabled {
                    if let Some(radius) = slider_row(ui, "Radius", curve.radius, -500.0..=500.0) {
                        transient.curve = Some(TextCurve { radius, ..curve });
                    }
                    if let Some(spacing) = slider_row(ui, "Spacing", curve.spacing, -50.0..=200.0) {
                        transient.curve = Some(TextCurve { spacing, ..curve });
                    }
                }
            });
        }
        LayerKind::Image(img) => {
            egui::CollapsingHeader::new("Image").default_open(true).show(ui, |ui| {
                let f = layer.filters;
                if let Some(v) = slider_row(ui, "Brightness", f.brightness, 0.0..=200.0) {
                    transient.brightness = Some(v);
                }
                if let Some(v) = slider_row(ui, "Contrast", f.contrast, 0.0..=200.0) {
                    transient.contrast = Some(v);
                }
                if let Some(v) = slider_row(ui, "Saturation", f.saturate, 0.0..=200.0) {
                    transient.saturate = Some(v);
                }
                if let Some(v) = slider_row(ui, "Grayscale", f.grayscale, 0.0..=100.0) {
                    transient.grayscale = Some(v);
                }
                ui.horizontal(|ui| {
                    if ui.button("Crop…").clicked() {
                        out.push(EditAction::Crop);
                    }
                    if ui.add_enabled(img.crop.is_some(), egui::Button::new("Reset crop")).clicked() {
                        out.push(EditAction::Commit(tools::crop_patch(None)));
                    }
                    let loaded = img.pixels.is_some();
                    if ui.add_enabled(loaded, egui::Button::new("Remove background…")).clicked() {
                        out.push(EditAction::RemoveBackground);
                    }
                });
            });
        }
        kind => {
            egui::CollapsingHeader::new("Shape").default_open(true).show(ui, |ui| {
                if let Some(c) = kind.fill().and_then(|fill| color_row(ui, "Fill", fill)) {
                    transient.fill = Some(c);
                }
                shape_parameters(ui, kind, &mut transient);
            });
        }
    }

    egui::CollapsingHeader::new("Effects").show(ui, |ui| {
        let shadow = layer.shadow.unwrap_or_default();
        if let Some(enabled) = checkbox_row(ui, "Shadow", shadow.enabled) {
            transient.shadow = Some(Shadow { enabled, ..shadow });
        }
        if shadow.enabled {
            if let Some(color) = color_row(ui, "Shadow color", shadow.color) {
                transient.shadow = Some(Shadow { color, ..shadow });
            }
            if let Some(blur) = slider_row(ui, "Blur", shadow.blur, 0.0..=50.0) {
                transient.shadow = Some(Shadow { blur, ..shadow });
            }
            if let Some(offset_x) = slider_row(ui, "Offset X", shadow.offset_x, -50.0..=50.0) {
                transient.shadow = Some(Shadow { offset_x, ..shadow });
            }
            if let Some(offset_y) = slider_row(ui, "Offset Y", shadow.offset_y, -50.0..=50.0) {
                transient.shadow = Some(Shadow { offset_y, ..shadow });
            }
        }

        if layer.kind.supports_outline() {
            ui.separator();
            let stroke = layer.stroke.unwrap_or_default();
            if let Some(enabled) = checkbox_row(ui, "Outline", stroke.enabled) {
                transient.stroke = Some(Outline { enabled, ..stroke });
            }
            if stroke.enabled {
                if let Some(color) = color_row(ui, "Outline color", stroke.color) {
                    transient.stroke = Some(Outline { color, ..stroke });
                }
                if let Some(width) = slider_row(ui, "Width", stroke.width, 0.5..=20.0) {
                    transient.stroke = Some(Outline { width, ..stroke });
                }
            }
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Duplicate").clicked() {
            out.push(EditAction::Duplicate);
        }
        if ui.button("Delete").clicked() {
            out.push(EditAction::Delete);
        }
    });

    if transient_is_set(&transient) {
        out.insert(0, EditAction::Transient(transient));
    }
    out
}

fn typing_actions(response: &egui::Response, patch: LayerPatch, out: &mut Vec<EditAction>) {
    if response.changed() {
        out.push(EditAction::Typing(patch));
    }
    if response.lost_focus() {
        out.push(EditAction::FinishTyping);
    }
}

fn shape_parameters(ui: &mut egui::Ui, kind: &LayerKind, patch: &mut LayerPatch) {
    match kind {
        LayerKind::Rect(rect) => {
            if let Some(v) = slider_row(ui, "Corner radius", rect.corner_radius, 0.0..=200.0) {
                patch.corner_radius = Some(v);
            }
        }
        LayerKind::Line(line) => {
            if let Some(v) = checkbox_row(ui, "Rounded caps", line.rounded_caps) {
                patch.rounded_caps = Some(v);
            }
        }
        LayerKind::Arrow(arrow) => {
            if let Some(v) = slider_row(ui, "Head", arrow.head_ratio, 0.05..=1.0) {
                patch.head_ratio = Some(v);
            }
            if let Some(v) = slider_row(ui, "Shaft", arrow.shaft_ratio, 0.05..=1.0) {
                patch.shaft_ratio = Some(v);
            }
        }
        LayerKind::Star(star) => {
            let mut points = star.points;
            if ui.add(egui::Slider::new(&mut points, 3..=12).text("Points")).changed() {
                patch.points = Some(points);
            }
            if let Some(v) = slider_row(ui, "Inner", star.inner_ratio, 0.05..=1.0) {
                patch.inner_ratio = Some(v);
            }
        }
        LayerKind::Polygon(poly) => {
            let mut sides = poly.sides;
            if ui.add(egui::Slider::new(&mut sides, 3..=12).text("Sides")).changed() {
                patch.sides = Some(sides);
            }
        }
        LayerKind::Circle(_)
        | LayerKind::Triangle(_)
        | LayerKind::Diamond(_)
        | LayerKind::Image(_)
        | LayerKind::Text(_)
        | LayerKind::Clock(_) => {}
    }
}

/// Whether any field of a panel-built patch is set
fn transient_is_set(p: &LayerPatch) -> bool {
    p.x.is_some()
        || p.y.is_some()
        || p.scale_x.is_some()
        || p.scale_y.is_some()
        || p.rotation.is_some()
        || p.opacity.is_some()
        || p.brightness.is_some()
        || p.contrast.is_some()
        || p.saturate.is_some()
        || p.grayscale.is_some()
        || p.shadow.is_some()
        || p.stroke.is_some()
        || p.fill.is_some()
        || p.corner_radius.is_some()
        || p.rounded_caps.is_some()
        || p.head_ratio.is_some()
        || p.shaft_ratio.is_some()
        || p.points.is_some()
        || p.inner_ratio.is_some()
        || p.sides.is_some()
        || p.curve.is_some()
        || p.color.is_some()
        || p.touches_text_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::layer::TextContent;
    use crate::scene::SceneStore;
    use crate::template::default_template;

    fn app_with_text() -> (WatchFaceApp, Layer) {
        let mut scene = SceneStore::new(default_template());
        let id = scene.add_layer(LayerKind::Text(TextContent::new("1")), LayerPatch::default());
        let layer = scene.layer(id).unwrap().clone();
        (WatchFaceApp::with_scene(EditorConfig::default(), scene), layer)
    }

    fn keystroke(text: &str) -> EditAction {
        EditAction::Typing(LayerPatch { text: Some(text.into()), ..Default::default() })
    }

    #[test]
    fn test_typing_commits_once_on_focus_loss() {
        let (mut app, layer) = app_with_text();
        let before = app.scene.history_len();

        for text in ["12", "12:", "12:3", "12:30"] {
            apply_edit(&mut app, &layer, keystroke(text));
        }
        assert_eq!(app.scene.history_len(), before);
        assert!(!app.pending_commit);
        assert_eq!(app.scene.layer(layer.id).unwrap().kind.text().unwrap().text, "12:30");

        apply_edit(&mut app, &layer, EditAction::FinishTyping);
        assert_eq!(app.scene.history_len(), before + 1);

        app.scene.undo();
        assert_eq!(app.scene.layer(layer.id).unwrap().kind.text().unwrap().text, "1");
    }

    #[test]
    fn test_focus_loss_without_edits_adds_no_history() {
        let (mut app, layer) = app_with_text();
        let before = app.scene.history_len();
        apply_edit(&mut app, &layer, EditAction::FinishTyping);
        assert_eq!(app.scene.history_len(), before);
    }
}
