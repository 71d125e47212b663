use egui::{Color32, CursorIcon, PointerButton, Rect, Sense, Stroke, pos2, vec2};

use crate::WatchFaceApp;
use crate::geometry::{self, HandleKey};
use crate::interaction::{CANVAS_MARGIN, Gesture};
use crate::renderer::RenderOptions;
use crate::template::DeviceTemplate;

const BACKDROP: Color32 = Color32::from_rgb(0x1f, 0x23, 0x2b);
const SAFE_AREA_COLOR: Color32 = Color32::from_rgba_premultiplied(0x22, 0xc5, 0x5e, 0xb0);

pub fn central_panel(app: &mut WatchFaceApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(BACKDROP))
        .show(ctx, |ui| {
            let template = app.template();
            let available = ui.available_rect_before_wrap();
            if app.needs_fit {
                app.controller.viewport.fit(available.size(), template.size());
                app.needs_fit = false;
            }

            let (response, painter) = ui.allocate_painter(available.size(), Sense::click_and_drag());
            let surface = app.controller.viewport.surface_size(template.size());
            app.controller.viewport.origin = response.rect.center() - surface / 2.0;

            handle_pointer(app, ui, &response);
            paint_canvas(app, ctx, &painter, template);
            if app.show_safe_area {
                draw_safe_area(app, &painter, template);
            }
            if response.hovered() {
                ctx.set_cursor_icon(cursor_for(app, ui));
            }
        });
}

fn handle_pointer(app: &mut WatchFaceApp, ui: &egui::Ui, response: &egui::Response) {
    let modal_active = app.modal_active();
    let (pressed, down, pointer, zoom_delta) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
            i.pointer.interact_pos(),
            i.zoom_delta(),
        )
    });

    match pointer {
        Some(pos) => {
            let world = app.controller.viewport.screen_to_world(pos);
            if pressed && response.hovered() {
                app.controller.pointer_down(&mut app.scene, world, modal_active);
            } else if down && app.controller.is_dragging() {
                app.controller.pointer_move(&mut app.scene, world, modal_active);
            }
        }
        // Pointer left the window
        None => app.controller.pointer_up(&mut app.scene),
    }
    if !down && app.controller.is_dragging() {
        app.controller.pointer_up(&mut app.scene);
    }

    if response.dragged_by(PointerButton::Middle) || response.dragged_by(PointerButton::Secondary) {
        app.controller.viewport.pan += response.drag_delta();
    }
    if response.hovered() && zoom_delta != 1.0 {
        let zoom = app.controller.viewport.zoom();
        app.controller.viewport.set_zoom(zoom * zoom_delta);
    }
}

/// Render the scene with its margin and show it as a texture.
fn paint_canvas(
    app: &mut WatchFaceApp,
    ctx: &egui::Context,
    painter: &egui::Painter,
    template: &DeviceTemplate,
) {
    let viewport = app.controller.viewport;
    let surface = viewport.surface_size(template.size());
    let (width, height) = (surface.x.round().max(1.0) as u32, surface.y.round().max(1.0) as u32);
    let options = RenderOptions::editor(viewport.zoom(), app.scene.selected(), app.modal_active());

    match app.renderer.render_to_pixmap(&app.scene, template, &options, width, height) {
        Ok(pixmap) => {
            let image = egui::ColorImage::from_rgba_premultiplied(
                [width as usize, height as usize],
                pixmap.data(),
            );
            match &mut app.canvas_texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    app.canvas_texture =
                        Some(ctx.load_texture("canvas", image, egui::TextureOptions::LINEAR));
                }
            }
        }
        Err(err) => log::error!("Failed to render canvas: {}", err),
    }

    if let Some(texture) = &app.canvas_texture {
        let min = viewport.world_to_screen(pos2(-CANVAS_MARGIN, -CANVAS_MARGIN));
        painter.image(
            texture.id(),
            Rect::from_min_size(min, vec2(width as f32, height as f32)),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }
}

fn draw_safe_area(app: &WatchFaceApp, painter: &egui::Painter, template: &DeviceTemplate) {
    let insets = template.safe_insets;
    let viewport = &app.controller.viewport;
    let min = viewport.world_to_screen(pos2(insets.left, insets.top));
    let max = viewport.world_to_screen(pos2(
        template.width - insets.right,
        template.height - insets.bottom,
    ));
    let rect = Rect::from_min_max(min, max);
    let outline = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ];
    painter.extend(egui::Shape::dashed_line(
        &outline,
        Stroke::new(1.0, SAFE_AREA_COLOR),
        6.0,
        4.0,
    ));
}

fn cursor_for(app: &WatchFaceApp, ui: &egui::Ui) -> CursorIcon {
    match app.controller.gesture() {
        Gesture::Moving => return CursorIcon::Grabbing,
        Gesture::Rotating => return CursorIcon::Grabbing,
        Gesture::Resizing(handle) => return handle_cursor(handle),
        Gesture::Idle => {}
    }
    if app.modal_active() {
        return CursorIcon::Default;
    }
    let Some(pos) = ui.input(|i| i.pointer.hover_pos()) else {
        return CursorIcon::Default;
    };
    let world = app.controller.viewport.screen_to_world(pos);
    let handle = app
        .scene
        .selected_layer()
        .filter(|l| !l.locked && !l.hidden)
        .and_then(|layer| geometry::hit_handle(layer, world));
    match handle {
        Some(handle) => handle_cursor(handle),
        None if app.scene.hit_test(world).is_some() => CursorIcon::Grab,
        None => CursorIcon::Default,
    }
}

fn handle_cursor(handle: HandleKey) -> CursorIcon {
    match handle {
        HandleKey::TopLeft | HandleKey::BottomRight => CursorIcon::ResizeNwSe,
        HandleKey::TopRight | HandleKey::BottomLeft => CursorIcon::ResizeNeSw,
        HandleKey::Left | HandleKey::Right => CursorIcon::ResizeHorizontal,
        HandleKey::Top | HandleKey::Bottom => CursorIcon::ResizeVertical,
        HandleKey::Rotate => CursorIcon::Alias,
    }
}
