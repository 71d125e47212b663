use std::sync::Arc;

use egui::{Pos2, pos2, vec2};
use watchface_editor::color::Color;
use watchface_editor::geometry::{self, HandleKey};
use watchface_editor::image_source::PixelSource;
use watchface_editor::layer::{Crop, LayerKind, LayerPatch, RectShape, TextContent};
use watchface_editor::template::template_by_id;
use watchface_editor::{InteractionController, LayerId, RenderOptions, Renderer, SceneStore};

fn scene() -> SceneStore {
    SceneStore::new(template_by_id("band10"))
}

fn add_rect(scene: &mut SceneStore, x: f32, y: f32) -> LayerId {
    scene.add_layer(
        LayerKind::Rect(RectShape::default()),
        LayerPatch::position(x, y).with_size(100.0, 100.0),
    )
}

fn handle_pos(scene: &SceneStore, id: LayerId, key: HandleKey) -> Pos2 {
    let layer = scene.layer(id).unwrap();
    geometry::handle_coords(layer)
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, p)| p)
        .unwrap()
}

#[test]
fn test_rotation_round_trip() {
    let center = pos2(106.0, 260.0);
    for angle in [0.0, 17.5, 90.0, -135.0, 400.0] {
        let p = pos2(150.0, 210.0);
        let back = geometry::unrotate(geometry::rotate(p, center, angle), center, angle);
        assert!((back.x - p.x).abs() < 1e-3 && (back.y - p.y).abs() < 1e-3, "angle {}", angle);
    }
}

#[test]
fn test_drag_moves_layer_and_commits_once() {
    let mut scene = scene();
    let id = add_rect(&mut scene, 100.0, 200.0);
    let mut controller = InteractionController::new();
    let before = scene.history_len();

    controller.pointer_down(&mut scene, pos2(100.0, 200.0), false);
    controller.pointer_move(&mut scene, pos2(110.0, 205.0), false);
    controller.pointer_move(&mut scene, pos2(130.0, 210.0), false);
    controller.pointer_up(&mut scene);

    let layer = scene.layer(id).unwrap();
    assert_eq!((layer.x, layer.y), (130.0, 210.0));
    assert_eq!(scene.history_len(), before + 1);

    scene.undo();
    let layer = scene.layer(id).unwrap();
    assert_eq!((layer.x, layer.y), (100.0, 200.0));
}

#[test]
fn test_release_at_start_point_changes_nothing() {
    let mut scene = scene();
    let id = add_rect(&mut scene, 100.0, 200.0);
    let original = scene.layer(id).unwrap().clone();
    let mut controller = InteractionController::new();
    let before = scene.history_len();

    for key in [HandleKey::BottomRight, HandleKey::Rotate, HandleKey::Left] {
        let p = handle_pos(&scene, id, key);
        controller.pointer_down(&mut scene, p, false);
        controller.pointer_move(&mut scene, p, false);
        controller.pointer_up(&mut scene);
    }
    controller.pointer_down(&mut scene, pos2(100.0, 200.0), false);
    controller.pointer_move(&mut scene, pos2(100.0, 200.0), false);
    controller.pointer_up(&mut scene);

    let layer = scene.layer(id).unwrap();
    assert!(layer.same_transform(&original));
    assert_eq!(scene.history_len(), before);
}

#[test]
fn test_corner_resize_keeps_aspect_ratio() {
    let mut scene = scene();
    let id = add_rect(&mut scene, 100.0, 200.0);
    let mut controller = InteractionController::new();

    let start = handle_pos(&scene, id, HandleKey::BottomRight);
    controller.pointer_down(&mut scene, start, false);
    controller.pointer_move(&mut scene, start + vec2(50.0, 0.0), false);
    controller.pointer_up(&mut scene);

    let layer = scene.layer(id).unwrap();
    assert!((layer.scale_x - 1.5).abs() < 1e-3, "scale_x {}", layer.scale_x);
    assert!((layer.scale_y - 1.5).abs() < 1e-3, "scale_y {}", layer.scale_y);
}

#[test]
fn test_corner_resize_on_rotated_layer_anchors_opposite_corner() {
    let mut scene = scene();
    let id = add_rect(&mut scene, 100.0, 200.0);
    scene.apply_and_commit(id, &LayerPatch { rotation: Some(37.0), ..Default::default() });
    let anchor = handle_pos(&scene, id, HandleKey::TopLeft);
    let mut controller = InteractionController::new();

    // 50 right and 20 down in the layer's own frame
    let start = handle_pos(&scene, id, HandleKey::BottomRight);
    let end = geometry::rotate(start + vec2(50.0, 20.0), start, 37.0);
    controller.pointer_down(&mut scene, start, false);
    assert_eq!(controller.gesture(), watchface_editor::interaction::Gesture::Resizing(HandleKey::BottomRight));
    controller.pointer_move(&mut scene, end, false);
    controller.pointer_up(&mut scene);

    let layer = scene.layer(id).unwrap();
    assert_eq!(layer.rotation, 37.0);
    assert!((layer.scale_x - 1.5).abs() < 1e-3, "scale_x {}", layer.scale_x);
    assert!((layer.scale_y - 1.5).abs() < 1e-3, "scale_y {}", layer.scale_y);
    let moved = handle_pos(&scene, id, HandleKey::TopLeft);
    assert!(moved.distance(anchor) < 1e-2, "top-left moved from {:?} to {:?}", anchor, moved);
}

#[test]
fn test_topmost_layer_wins_hit_test() {
    let mut scene = scene();
    let bottom = add_rect(&mut scene, 100.0, 200.0);
    let top = add_rect(&mut scene, 120.0, 220.0);
    let mut controller = InteractionController::new();

    controller.pointer_down(&mut scene, pos2(110.0, 210.0), false);
    controller.pointer_up(&mut scene);
    assert_eq!(scene.selected(), Some(top));

    controller.pointer_down(&mut scene, pos2(55.0, 240.0), false);
    controller.pointer_up(&mut scene);
    assert_eq!(scene.selected(), Some(bottom));

    controller.pointer_down(&mut scene, pos2(5.0, 5.0), false);
    controller.pointer_up(&mut scene);
    assert_eq!(scene.selected(), None);
}

#[test]
fn test_reorder_drops_onto_target_slot() {
    let mut scene = scene();
    let a = add_rect(&mut scene, 50.0, 50.0);
    let b = add_rect(&mut scene, 60.0, 60.0);
    let c = add_rect(&mut scene, 70.0, 70.0);

    scene.reorder(a, c);

    let order: Vec<LayerId> = scene.layers().iter().map(|l| l.id).collect();
    assert_eq!(order, vec![b, c, a]);
}

#[test]
fn test_history_keeps_most_recent_fifty() {
    let mut scene = scene();
    for i in 0..60u8 {
        scene.set_background_and_commit(Color::rgb(i, 0, 0));
    }
    assert_eq!(scene.history_len(), 50);
    assert!(!scene.can_redo());

    let mut undos = 0;
    while scene.can_undo() {
        scene.undo();
        undos += 1;
    }
    assert_eq!(undos, 49);
    assert_eq!(scene.background(), Color::rgb(10, 0, 0));
}

#[test]
fn test_undo_then_redo_restores_state() {
    let mut scene = scene();
    let id = add_rect(&mut scene, 100.0, 200.0);
    scene.apply_and_commit(id, &LayerPatch { rotation: Some(30.0), ..Default::default() });
    let edited = scene.snapshot();

    scene.undo();
    assert_eq!(scene.layer(id).unwrap().rotation, 0.0);
    scene.redo();
    assert_eq!(scene.snapshot(), edited);
}

#[test]
fn test_text_box_tracks_content() {
    let mut scene = scene();
    let id = scene.add_layer(LayerKind::Text(TextContent::new("A")), LayerPatch::default());
    let narrow = scene.layer(id).unwrap().width;
    assert!(narrow > 0.0);

    scene.apply_and_commit(id, &LayerPatch { text: Some("AAAA".into()), ..Default::default() });
    let wide = scene.layer(id).unwrap().width;
    let ratio = wide / narrow;
    assert!((3.5..=4.5).contains(&ratio), "ratio {}", ratio);
}

#[test]
fn test_image_pixels_survive_undo_and_redo() {
    let template = template_by_id("band10");
    let mut scene = SceneStore::new(template);
    let green = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 255]));
    let pixels = Arc::new(PixelSource::from_rgba_image(&green).unwrap());
    let src = pixels.to_png_data_url().unwrap();
    let asset = scene.add_asset("green.png".into(), src, pixels);
    let id = scene.add_asset_to_canvas(asset).unwrap();

    let crop = Crop { x: 0.25, y: 0.25, w: 0.5, h: 0.5 };
    scene.apply_and_commit(id, &LayerPatch { crop: Some(Some(crop)), ..Default::default() });

    let center_pixel = |scene: &SceneStore| {
        let (w, h) = (template.width.round() as u32, template.height.round() as u32);
        let pixmap = Renderer::new()
            .render_to_pixmap(scene, template, &RenderOptions::export(1.0), w, h)
            .unwrap();
        let c = pixmap.pixel(w / 2, h / 2).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    };

    scene.undo();
    let image = scene.layer(id).unwrap().kind.image().unwrap();
    assert_eq!(image.crop, None);
    assert!(image.pixels.is_some());
    assert_eq!(center_pixel(&scene), [0, 255, 0, 255]);

    scene.redo();
    let image = scene.layer(id).unwrap().kind.image().unwrap();
    assert_eq!(image.crop, Some(crop));
    assert!(image.pixels.is_some());
    assert_eq!(center_pixel(&scene), [0, 255, 0, 255]);
}
