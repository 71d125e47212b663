use crate::WatchFaceApp;
use crate::app::SidebarTab;
use crate::color::Color;
use crate::layer::{
    ArrowShape, LayerKind, LayerPatch, LineShape, PlainShape, PolygonShape, RectShape, StarShape,
    TextContent,
};
use crate::scene::AssetId;

use super::widgets;

const BACKGROUND_PRESETS: [Color; 9] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xff, 0xff, 0xff),
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x63, 0x66, 0xf1),
    Color::rgb(0x8b, 0x5c, 0xf6),
    Color::rgb(0xec, 0x48, 0x99),
];

/// Shape buttons: label, payload and initial size
fn shape_presets() -> Vec<(&'static str, LayerKind, LayerPatch)> {
    let square = || LayerPatch::size(100.0, 100.0);
    vec![
        ("Rectangle", LayerKind::Rect(RectShape::default()), square()),
        ("Rounded", LayerKind::Rect(RectShape { corner_radius: 20.0, ..Default::default() }), square()),
        ("Circle", LayerKind::Circle(PlainShape::default()), square()),
        ("Triangle", LayerKind::Triangle(PlainShape::default()), square()),
        ("Diamond", LayerKind::Diamond(PlainShape::default()), square()),
        ("Star", LayerKind::Star(StarShape::default()), square()),
        ("Hexagon", LayerKind::Polygon(PolygonShape::default()), square()),
        ("Arrow", LayerKind::Arrow(ArrowShape::default()), LayerPatch::size(140.0, 70.0)),
        ("Line", LayerKind::Line(LineShape::default()), LayerPatch::size(160.0, 8.0)),
    ]
}

fn text_presets() -> Vec<(&'static str, LayerKind)> {
    let text = |s: &str, size: f32, weight: u16| TextContent {
        font_size: size,
        font_weight: weight,
        ..TextContent::new(s)
    };
    vec![
        ("Add heading", LayerKind::Text(text("Heading", 64.0, 700))),
        ("Add body text", LayerKind::Text(text("Body text", 32.0, 400))),
        ("Add clock", LayerKind::Clock(text("10:09", 72.0, 700))),
    ]
}

pub fn tools_panel(app: &mut WatchFaceApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for tab in SidebarTab::ALL {
                    ui.selectable_value(&mut app.tab, tab, tab.label());
                }
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match app.tab {
                SidebarTab::Elements => elements_tab(app, ui),
                SidebarTab::Text => text_tab(app, ui),
                SidebarTab::Upload => upload_tab(app, ui),
                SidebarTab::Background => background_tab(app, ui),
            });
        });
}

fn elements_tab(app: &mut WatchFaceApp, ui: &mut egui::Ui) {
    ui.heading("Shapes");
    egui::Grid::new("shape_grid").num_columns(3).show(ui, |ui| {
        for (i, (label, kind, size)) in shape_presets().into_iter().enumerate() {
            if ui.add_sized([64.0, 40.0], egui::Button::new(label)).clicked() {
                app.scene.add_layer(kind, size);
            }
            if i % 3 == 2 {
                ui.end_row();
            }
        }
    });
}

fn text_tab(app: &mut WatchFaceApp, ui: &mut egui::Ui) {
    ui.heading("Text");
    for (label, kind) in text_presets() {
        if ui.add_sized([ui.available_width(), 32.0], egui::Button::new(label)).clicked() {
            app.scene.add_layer(kind, LayerPatch::default());
        }
    }

    ui.separator();
    ui.label("Custom text");
    ui.text_edit_singleline(&mut app.text_draft);
    let ready = !app.text_draft.trim().is_empty();
    if ui.add_enabled(ready, egui::Button::new("Add")).clicked() {
        let kind = LayerKind::Text(TextContent::new(app.text_draft.trim()));
        app.scene.add_layer(kind, LayerPatch::default());
        app.text_draft.clear();
    }
}

fn upload_tab(app: &mut WatchFaceApp, ui: &mut egui::Ui) {
    ui.heading("Images");
    ui.label("Drop image files onto the window, or load one by path:");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut app.upload_path);
        if ui.add_enabled(!app.upload_path.trim().is_empty(), egui::Button::new("Load")).clicked() {
            let path = std::mem::take(&mut app.upload_path);
            app.upload_from_path(&path);
        }
    });
    if app.decoder.is_busy() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Decoding…");
        });
    }

    ui.separator();
    if app.scene.assets().is_empty() {
        ui.weak("No images yet");
        return;
    }

    let mut place: Option<AssetId> = None;
    for asset in app.scene.assets() {
        ui.horizontal(|ui| {
            ui.label(&asset.name)
                .on_hover_text(format!("{}×{}", asset.width, asset.height));
            if ui.small_button("Add to canvas").clicked() {
                place = Some(asset.id);
            }
        });
    }
    if let Some(id) = place {
        app.scene.add_asset_to_canvas(id);
    }
}

fn background_tab(app: &mut WatchFaceApp, ui: &mut egui::Ui) {
    ui.heading("Background");
    let current = app.scene.background();
    if let Some(color) = widgets::color_row(ui, "Color", current) {
        app.scene.set_background_transient(color);
        app.pending_commit = true;
    }
    ui.horizontal_wrapped(|ui| {
        for preset in BACKGROUND_PRESETS {
            if widgets::swatch(ui, preset, preset == current).clicked() {
                app.scene.set_background_and_commit(preset);
            }
        }
    });
}
