use watchface_editor::color::Color;
use watchface_editor::export::{self, ExportFormat};
use watchface_editor::layer::{LayerKind, LayerPatch, RectShape};
use watchface_editor::persistence::{self, PersistedDocument};
use watchface_editor::template::{TEMPLATES, template_by_id};
use watchface_editor::{ExportError, SceneStore};

const RED: Color = Color::rgb(255, 0, 0);

/// A red rectangle covering the whole band10 canvas
fn flooded_scene() -> SceneStore {
    let template = template_by_id("band10");
    let mut scene = SceneStore::new(template);
    scene.add_layer(
        LayerKind::Rect(RectShape::default()),
        LayerPatch {
            fill: Some(RED),
            ..LayerPatch::size(template.width, template.height)
        },
    );
    scene
}

#[test]
fn test_export_dimensions_follow_scale() {
    for template in TEMPLATES {
        let scene = SceneStore::new(template);
        for scale in [1.0, 2.0, 3.0, 0.5] {
            let png = export::export_image(&scene, template, ExportFormat::Png, scale).unwrap();
            let decoded = image::load_from_memory(&png).unwrap();
            assert_eq!(
                (decoded.width(), decoded.height()),
                (
                    (template.width * scale).round() as u32,
                    (template.height * scale).round() as u32
                ),
                "{} at {}",
                template.id,
                scale
            );
        }
    }
}

#[test]
fn test_png_corners_outside_pill_are_empty() {
    let scene = flooded_scene();
    let png = export::export_image(&scene, template_by_id("band10"), ExportFormat::Png, 2.0).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    let (w, h) = img.dimensions();

    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1), (4, 4)] {
        assert_eq!(img.get_pixel(x, y).0[3], 0, "corner ({}, {})", x, y);
    }
    assert_eq!(img.get_pixel(w / 2, h / 2).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(w / 2, 5).0, [255, 0, 0, 255]);
}

#[test]
fn test_jpeg_corners_are_black() {
    let scene = flooded_scene();
    let jpeg = export::export_image(&scene, template_by_id("band10"), ExportFormat::Jpeg, 1.0).unwrap();
    let img = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    let (w, h) = img.dimensions();

    let corner = img.get_pixel(0, 0).0;
    assert!(corner.iter().all(|&c| c < 24), "corner {:?}", corner);
    let middle = img.get_pixel(w / 2, h / 2).0;
    assert!(middle[0] > 230 && middle[1] < 24 && middle[2] < 24, "middle {:?}", middle);
}

#[test]
fn test_invalid_scale_is_rejected() {
    let scene = flooded_scene();
    let result = export::export_image(&scene, template_by_id("band10"), ExportFormat::Png, f32::NAN);
    assert!(matches!(result, Err(ExportError::InvalidScale(_))));
}

#[test]
fn test_saved_document_survives_reload() {
    let template = template_by_id("band9");
    let mut scene = flooded_scene();
    scene.set_background_and_commit(Color::rgb(0x3b, 0x82, 0xf6));

    let json = PersistedDocument::from_scene(&scene).to_json().unwrap();
    let reloaded = persistence::load_best_effort(Some(&json), template);

    assert_eq!(reloaded.snapshot(), scene.snapshot());
    assert!(!reloaded.can_undo());
}

#[test]
fn test_malformed_document_loads_empty_scene() {
    let template = template_by_id("band10");
    let scene = persistence::load_best_effort(Some("{\"layers\": [{\"type\": 7}"), template);
    assert!(scene.layers().is_empty());
    assert_eq!(scene.background(), Color::BLACK);
}
