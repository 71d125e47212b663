use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2, pos2, vec2};

use crate::WatchFaceApp;
use crate::app::{BrushKind, CropDrag, CropSession, ModalTool, RemovalMode, RemovalSession};
use crate::export::{self, EXPORT_SCALES, ExportFormat};
use crate::image_source::PixelSource;
use crate::layer::{Crop, LayerId};
use crate::tools::{self, CropCorner};

use super::widgets::{color_row, slider_row};

/// Longest side of the image previews in the tool windows
const PREVIEW_SIZE: f32 = 360.0;
/// Screen distance at which a crop corner can be grabbed
const CORNER_GRAB: f32 = 12.0;

enum ToolOutcome {
    Keep,
    Cancel,
    ApplyCrop(LayerId, Crop),
    ApplyPixels(LayerId, Arc<PixelSource>),
}

pub fn modal_windows(app: &mut WatchFaceApp, ctx: &egui::Context) {
    if let Some(mut tool) = app.modal.take() {
        let outcome = match &mut tool {
            ModalTool::Crop(session) => match layer_pixels(app, session.layer) {
                Some(pixels) => crop_window(ctx, session, &pixels),
                None => ToolOutcome::Cancel,
            },
            ModalTool::RemoveBackground(session) => removal_window(ctx, session),
        };
        match outcome {
            ToolOutcome::Keep => app.modal = Some(tool),
            ToolOutcome::Cancel => {}
            ToolOutcome::ApplyCrop(layer, crop) => {
                app.scene.apply_and_commit(layer, &tools::crop_patch(Some(crop)));
            }
            ToolOutcome::ApplyPixels(layer, pixels) => {
                let copy = PixelSource::from_pixmap(pixels.pixmap().clone());
                match tools::replace_source_patch(copy) {
                    Ok(patch) => app.scene.apply_and_commit(layer, &patch),
                    Err(err) => {
                        log::error!("Failed to encode edited image: {}", err);
                        app.set_status(format!("Could not apply: {}", err));
                    }
                }
            }
        }
    }

    if app.show_export {
        export_window(app, ctx);
    }
}

fn layer_pixels(app: &WatchFaceApp, layer: LayerId) -> Option<Arc<PixelSource>> {
    app.scene
        .layer(layer)
        .and_then(|l| l.kind.image())
        .and_then(|img| img.pixels.clone())
}

fn color_image(pixels: &PixelSource) -> egui::ColorImage {
    egui::ColorImage::from_rgba_premultiplied(
        [pixels.width() as usize, pixels.height() as usize],
        pixels.pixmap().data(),
    )
}

fn preview_size(pixels: &PixelSource) -> Vec2 {
    let (w, h) = (pixels.width().max(1) as f32, pixels.height().max(1) as f32);
    let scale = (PREVIEW_SIZE / w).min(PREVIEW_SIZE / h);
    vec2(w * scale, h * scale)
}

fn full_uv() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))
}

fn crop_window(ctx: &egui::Context, session: &mut CropSession, pixels: &PixelSource) -> ToolOutcome {
    let mut open = true;
    let mut outcome = ToolOutcome::Keep;
    let texture = session
        .texture
        .get_or_insert_with(|| ctx.load_texture("crop_source", color_image(pixels), egui::TextureOptions::LINEAR))
        .clone();

    egui::Window::new("Crop image")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(preview_size(pixels), Sense::drag());
            let rect = response.rect;
            painter.image(texture.id(), rect, full_uv(), Color32::WHITE);

            let to_unit = |p: Pos2| pos2((p.x - rect.min.x) / rect.width(), (p.y - rect.min.y) / rect.height());
            let crop = session.crop;
            let crop_rect = Rect::from_min_size(
                rect.min + vec2(crop.x * rect.width(), crop.y * rect.height()),
                vec2(crop.w * rect.width(), crop.h * rect.height()),
            );

            if response.drag_started() {
                let origin = ui.input(|i| i.pointer.press_origin());
                session.drag = origin.and_then(|p| {
                    if p.distance(crop_rect.left_top()) <= CORNER_GRAB {
                        Some(CropDrag::Corner(CropCorner::TopLeft))
                    } else if p.distance(crop_rect.right_bottom()) <= CORNER_GRAB {
                        Some(CropDrag::Corner(CropCorner::BottomRight))
                    } else if crop_rect.contains(p) {
                        Some(CropDrag::Move { start: to_unit(p), crop })
                    } else {
                        None
                    }
                });
            }
            if response.dragged() {
                if let (Some(drag), Some(p)) = (session.drag, response.interact_pointer_pos()) {
                    session.crop = match drag {
                        CropDrag::Corner(corner) => tools::drag_crop_corner(crop, corner, to_unit(p)),
                        CropDrag::Move { start, crop } => tools::move_crop(crop, to_unit(p) - start),
                    };
                }
            }
            if response.drag_stopped() {
                session.drag = None;
            }

            // Dim everything outside the crop window
            let shade = Color32::from_black_alpha(140);
            painter.rect_filled(Rect::from_min_max(rect.min, pos2(rect.max.x, crop_rect.min.y)), 0.0, shade);
            painter.rect_filled(Rect::from_min_max(pos2(rect.min.x, crop_rect.max.y), rect.max), 0.0, shade);
            painter.rect_filled(
                Rect::from_min_max(pos2(rect.min.x, crop_rect.min.y), pos2(crop_rect.min.x, crop_rect.max.y)),
                0.0,
                shade,
            );
            painter.rect_filled(
                Rect::from_min_max(pos2(crop_rect.max.x, crop_rect.min.y), pos2(rect.max.x, crop_rect.max.y)),
                0.0,
                shade,
            );
            painter.rect_stroke(crop_rect, 0.0, Stroke::new(2.0, Color32::WHITE));
            for corner in [crop_rect.left_top(), crop_rect.right_bottom()] {
                painter.circle_filled(corner, 5.0, Color32::WHITE);
            }

            let mut edited = session.crop;
            let mut changed = false;
            for (label, value) in [
                ("X", &mut edited.x),
                ("Y", &mut edited.y),
                ("Width", &mut edited.w),
                ("Height", &mut edited.h),
            ] {
                if let Some(v) = slider_row(ui, label, *value, 0.0..=1.0) {
                    *value = v;
                    changed = true;
                }
            }
            if changed {
                session.crop = edited.normalized();
            }

            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    outcome = ToolOutcome::ApplyCrop(session.layer, session.crop);
                }
                if ui.button("Reset").clicked() {
                    session.crop = Crop::FULL;
                }
                if ui.button("Cancel").clicked() {
                    outcome = ToolOutcome::Cancel;
                }
            });
        });

    if open { outcome } else { ToolOutcome::Cancel }
}

fn removal_window(ctx: &egui::Context, session: &mut RemovalSession) -> ToolOutcome {
    let mut open = true;
    let mut outcome = ToolOutcome::Keep;

    if session.texture_dirty || session.texture.is_none() {
        let image = color_image(&session.working);
        match &mut session.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                session.texture = Some(ctx.load_texture("removal_preview", image, egui::TextureOptions::LINEAR));
            }
        }
        session.texture_dirty = false;
    }

    egui::Window::new("Remove background")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut session.mode, RemovalMode::Color, "Colour");
                ui.selectable_value(&mut session.mode, RemovalMode::Brush, "Brush");
            });

            let size = preview_size(&session.working);
            let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
            let rect = response.rect;
            painter.rect_filled(rect, 0.0, Color32::from_gray(200));
            if let Some(texture) = &session.texture {
                painter.image(texture.id(), rect, full_uv(), Color32::WHITE);
            }
            let (img_w, img_h) = (session.working.width() as f32, session.working.height() as f32);
            let to_image = |p: Pos2| {
                pos2(
                    (p.x - rect.min.x) / rect.width() * img_w,
                    (p.y - rect.min.y) / rect.height() * img_h,
                )
            };

            match session.mode {
                RemovalMode::Color => {
                    if session.picking && response.hovered() {
                        ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                    }
                    if session.picking && response.clicked() {
                        if let Some(p) = response.interact_pointer_pos().map(to_image) {
                            if let Some(color) = tools::sample_color(&session.working, p.x as u32, p.y as u32) {
                                session.target = color;
                                session.picking = false;
                            }
                        }
                    }

                    ui.horizontal(|ui| {
                        if let Some(c) = color_row(ui, "Target", session.target) {
                            session.target = c;
                        }
                        ui.toggle_value(&mut session.picking, "Pick from image");
                    });
                    if let Some(v) = slider_row(ui, "Tolerance", session.tolerance, 0.0..=100.0) {
                        session.tolerance = v;
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Remove color").clicked() {
                            session.remove_everywhere();
                        }
                        if ui.button("Reset").clicked() {
                            session.reset();
                        }
                    });
                }
                RemovalMode::Brush => {
                    if let Some(hover) = response.hover_pos() {
                        let screen_radius = session.brush_size / 2.0 * rect.width() / img_w.max(1.0);
                        painter.circle_stroke(hover, screen_radius, Stroke::new(1.0, Color32::WHITE));
                    }
                    if response.is_pointer_button_down_on() {
                        if let Some(p) = response.interact_pointer_pos() {
                            session.brush_at(to_image(p));
                        }
                    }

                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut session.brush, BrushKind::Erase, "Erase");
                        ui.selectable_value(&mut session.brush, BrushKind::Restore, "Restore");
                    });
                    if let Some(v) = slider_row(ui, "Brush size", session.brush_size, tools::BRUSH_SIZES) {
                        session.brush_size = v;
                    }
                    if session.brush == BrushKind::Erase {
                        if let Some(c) = color_row(ui, "Target", session.target) {
                            session.target = c;
                        }
                        if let Some(v) = slider_row(ui, "Tolerance", session.tolerance, 0.0..=100.0) {
                            session.tolerance = v;
                        }
                    }
                    if ui.button("Reset").clicked() {
                        session.reset();
                    }
                }
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    outcome = ToolOutcome::ApplyPixels(session.layer, Arc::clone(&session.working));
                }
                if ui.button("Cancel").clicked() {
                    outcome = ToolOutcome::Cancel;
                }
            });
        });

    if session.texture_dirty {
        ctx.request_repaint();
    }
    if open { outcome } else { ToolOutcome::Cancel }
}

fn export_window(app: &mut WatchFaceApp, ctx: &egui::Context) {
    let template = app.template();
    let mut open = true;
    let mut run_export = false;

    egui::Window::new("Export")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Format");
                ui.radio_value(&mut app.config.export_format, ExportFormat::Png, "PNG");
                ui.radio_value(&mut app.config.export_format, ExportFormat::Jpeg, "JPEG");
            });
            ui.horizontal(|ui| {
                ui.label("Scale");
                for scale in EXPORT_SCALES {
                    ui.selectable_value(&mut app.config.export_scale, scale, format!("{}×", scale));
                }
            });
            let (w, h) = export::export_dimensions(template, app.config.export_scale);
            ui.label(format!("{} · {}×{} px", export::export_file_name(app.config.export_format), w, h));
            if app.config.export_format == ExportFormat::Jpeg {
                ui.weak("JPEG has no transparency; corners export black.");
            }
            if ui.button("Export").clicked() {
                run_export = true;
            }
        });

    if run_export {
        let format = app.config.export_format;
        let result = export::export_image(&app.scene, template, format, app.config.export_scale)
            .and_then(|bytes| export::write_export(&bytes, format, None));
        match result {
            Ok(path) => {
                log::info!("Exported {}", path.display());
                app.set_status(format!("Exported {}", path.display()));
                open = false;
            }
            Err(err) => {
                log::error!("Export failed: {}", err);
                app.set_status(format!("Export failed: {}", err));
            }
        }
    }
    app.show_export = open;
}
