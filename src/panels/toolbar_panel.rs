use crate::WatchFaceApp;
use crate::export;
use crate::interaction::{MAX_ZOOM, MIN_ZOOM};
use crate::persistence;
use crate::template::TEMPLATES;

const ZOOM_STEP: f32 = 1.25;
const PROJECT_FILE: &str = "watchface.json";

fn project_path() -> std::path::PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(PROJECT_FILE)
}

pub fn toolbar_panel(app: &mut WatchFaceApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("toolbar_panel").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let current = app.template();
            egui::ComboBox::from_id_salt("device_template")
                .selected_text(current.label)
                .show_ui(ui, |ui| {
                    for template in TEMPLATES {
                        if ui
                            .selectable_label(template.id == current.id, template.label)
                            .on_hover_text(template.notes)
                            .clicked()
                        {
                            app.set_template(template);
                        }
                    }
                });
            ui.label(format!("{}×{}", current.width, current.height))
                .on_hover_text(current.notes);
            ui.checkbox(&mut app.show_safe_area, "Safe area");

            ui.separator();

            // Undo/Redo section
            if ui.add_enabled(app.scene.can_undo(), egui::Button::new("Undo")).clicked() {
                app.scene.undo();
            }
            if ui.add_enabled(app.scene.can_redo(), egui::Button::new("Redo")).clicked() {
                app.scene.redo();
            }

            ui.separator();

            let zoom = app.controller.viewport.zoom();
            if ui.add_enabled(zoom > MIN_ZOOM, egui::Button::new("−")).clicked() {
                app.controller.viewport.set_zoom(zoom / ZOOM_STEP);
            }
            ui.label(format!("{:.0}%", zoom * 100.0));
            if ui.add_enabled(zoom < MAX_ZOOM, egui::Button::new("+")).clicked() {
                app.controller.viewport.set_zoom(zoom * ZOOM_STEP);
            }
            if ui.button("Fit").clicked() {
                app.needs_fit = true;
            }

            ui.separator();

            if ui.button("Export…").clicked() {
                app.show_export = true;
            }
            if ui.button("Save project").clicked() {
                let path = project_path();
                match persistence::save_to_path(&app.scene, &path) {
                    Ok(()) => app.set_status(format!("Saved {}", path.display())),
                    Err(err) => {
                        log::error!("Failed to save project: {}", err);
                        app.set_status(format!("Save failed: {}", err));
                    }
                }
            }
            if ui.button("Open project").clicked() {
                let path = project_path();
                match persistence::load_from_path(&path) {
                    Ok(doc) => {
                        app.modal = None;
                        doc.restore_into(&mut app.scene);
                        app.set_status(format!("Opened {}", path.display()));
                    }
                    Err(err) => {
                        log::warn!("Failed to open project: {}", err);
                        app.set_status(format!("Open failed: {}", err));
                    }
                }
            }
        });
    });
}

pub fn status_bar(app: &mut WatchFaceApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} layers · history {} · {}",
                app.scene.layers().len(),
                app.scene.history_len(),
                export::export_file_name(app.config.export_format),
            ));
            if app.decoder.is_busy() {
                ui.spinner();
            }
            if let Some(status) = &app.status {
                ui.separator();
                ui.label(status);
                if ui.small_button("✕").clicked() {
                    app.status = None;
                }
            }
        });
    });
}
