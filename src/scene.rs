//! The editable composition: layers, background, uploaded assets and the
//! current selection, with explicit history commits.

use std::sync::Arc;

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Color;
use crate::geometry;
use crate::history::{DEFAULT_HISTORY_CAPACITY, History};
use crate::image_source::{DecodeCache, PixelSource};
use crate::layer::{ImageContent, Layer, LayerId, LayerKind, LayerPatch};
use crate::template::DeviceTemplate;

/// Size given to new shapes that do not specify one
pub const DEFAULT_SHAPE_SIZE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

/// An uploaded source image kept in the side gallery
#[derive(Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub src: String,
    #[serde(skip)]
    pub pixels: Option<Arc<PixelSource>>,
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// What goes into the history log: everything but assets and selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub background_color: Color,
    pub layers: Vec<Layer>,
}

pub struct SceneStore {
    layers: Vec<Layer>,
    background: Color,
    assets: Vec<Asset>,
    selected: Option<LayerId>,
    canvas: Vec2,
    /// Serialized [`SceneSnapshot`]s
    history: History<String>,
    decode_cache: DecodeCache,
}

impl SceneStore {
    /// An empty black scene whose initial state is already committed.
    pub fn new(template: &DeviceTemplate) -> Self {
        Self::with_history_capacity(template, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(template: &DeviceTemplate, capacity: usize) -> Self {
        let mut store = Self {
            layers: Vec::new(),
            background: Color::BLACK,
            assets: Vec::new(),
            selected: None,
            canvas: template.size(),
            history: History::new(capacity),
            decode_cache: DecodeCache::new(),
        };
        store.commit();
        store
    }

    /// Replace the whole scene and restart history from it.
    pub fn replace_contents(&mut self, background: Color, assets: Vec<Asset>, layers: Vec<Layer>) {
        self.background = background;
        self.layers = layers;
        self.assets = assets;
        self.selected = None;
        self.rehydrate_images();
        self.rehydrate_assets();
        self.history.clear();
        self.commit();
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas
    }

    pub fn canvas_center(&self) -> Pos2 {
        (self.canvas / 2.0).to_pos2()
    }

    /// Switch device. Layers keep their world coordinates.
    pub fn set_template(&mut self, template: &DeviceTemplate) {
        self.canvas = template.size();
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // Selection -----------------------------------------------------------

    /// Select a layer, or clear the selection. Unknown ids clear it too.
    pub fn select(&mut self, id: Option<LayerId>) {
        self.selected = id.filter(|id| self.layer(*id).is_some());
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.and_then(|id| self.layer(id))
    }

    /// Topmost visible, unlocked layer whose content box contains `world`
    pub fn hit_test(&self, world: Pos2) -> Option<LayerId> {
        self.layers
            .iter()
            .rev()
            .filter(|l| !l.hidden && !l.locked)
            .find(|l| geometry::contains_local(l, world))
            .map(|l| l.id)
    }

    // Mutation ------------------------------------------------------------

    /// Append a new topmost layer, select it and commit.
    pub fn add_layer(&mut self, kind: LayerKind, attrs: LayerPatch) -> LayerId {
        let mut layer = Layer::new(kind);
        let center = self.canvas_center();
        layer.x = center.x;
        layer.y = center.y;

        if layer.kind.is_shape() {
            layer.width = DEFAULT_SHAPE_SIZE;
            layer.height = DEFAULT_SHAPE_SIZE;
        }
        if let Some(img) = layer.kind.image_mut() {
            if img.pixels.is_none() && !img.src.is_empty() {
                img.pixels = self.decode_cache.get_or_decode(&img.src).ok();
            }
            if let Some(pixels) = &img.pixels {
                self.decode_cache.insert(&img.src, Arc::clone(pixels));
                layer.width = pixels.width() as f32;
                layer.height = pixels.height() as f32;
            }
        }

        layer.apply(&attrs);
        layer.refresh_text_metrics();

        let id = layer.id;
        log::debug!("Adding {} layer {}", layer.kind.type_name(), id);
        self.layers.push(layer);
        self.selected = Some(id);
        self.commit();
        id
    }

    /// Merge `patch` into a layer without recording history.
    pub fn apply_transient(&mut self, id: LayerId, patch: &LayerPatch) {
        if let Some(layer) = self.layer_mut(id) {
            layer.apply(patch);
        }
    }

    pub fn apply_and_commit(&mut self, id: LayerId, patch: &LayerPatch) {
        if self.layer(id).is_none() {
            return;
        }
        self.apply_transient(id, patch);
        self.commit();
    }

    pub fn delete_layer(&mut self, id: LayerId) {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        if self.layers.len() == before {
            return;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit();
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected {
            self.delete_layer(id);
        }
    }

    /// Move `dragged` into `target`'s slot as seen in the topmost-first list.
    pub fn reorder(&mut self, dragged: LayerId, target: LayerId) {
        let len = self.layers.len();
        let view_index = |id: LayerId| self.layers.iter().rev().position(|l| l.id == id);
        let (Some(from_rev), Some(to_rev)) = (view_index(dragged), view_index(target)) else {
            return;
        };
        if from_rev == to_rev {
            return;
        }
        let from = len - 1 - from_rev;
        let to = len - 1 - to_rev;
        let moved = self.layers.remove(from);
        self.layers.insert(to, moved);
        self.commit();
    }

    pub fn set_background_transient(&mut self, color: Color) {
        self.background = color;
    }

    pub fn set_background_and_commit(&mut self, color: Color) {
        self.background = color;
        self.commit();
    }

    /// Copy of `id` offset by `offset` on both axes, added on top and selected
    pub fn duplicate_layer(&mut self, id: LayerId, offset: f32) -> Option<LayerId> {
        let source = self.layer(id)?.clone();
        Some(self.paste_layer(&source, offset))
    }

    /// Insert a copy of `template` (any id is replaced) offset by `offset`.
    pub fn paste_layer(&mut self, template: &Layer, offset: f32) -> LayerId {
        let mut layer = template.duplicate();
        layer.x += offset;
        layer.y += offset;
        if let Some(img) = layer.kind.image_mut() {
            if img.pixels.is_none() {
                img.pixels = self.decode_cache.get_or_decode(&img.src).ok();
            }
        }
        let id = layer.id;
        self.layers.push(layer);
        self.selected = Some(id);
        self.commit();
        id
    }

    // Assets --------------------------------------------------------------

    pub fn add_asset(&mut self, name: String, src: String, pixels: Arc<PixelSource>) -> AssetId {
        let id = AssetId::new();
        self.decode_cache.insert(&src, Arc::clone(&pixels));
        log::info!("Added asset '{}' ({}x{})", name, pixels.width(), pixels.height());
        self.assets.push(Asset {
            id,
            name,
            width: pixels.width() as f32,
            height: pixels.height() as f32,
            src,
            pixels: Some(pixels),
        });
        id
    }

    /// Place an asset as a new image layer scaled to cover the canvas.
    pub fn add_asset_to_canvas(&mut self, asset_id: AssetId) -> Option<LayerId> {
        let asset = self.assets.iter().find(|a| a.id == asset_id)?.clone();
        let cover = if asset.width > 0.0 && asset.height > 0.0 {
            (self.canvas.x / asset.width).max(self.canvas.y / asset.height)
        } else {
            1.0
        };
        let attrs = LayerPatch {
            name: Some(asset.name.clone()),
            ..LayerPatch::size(asset.width, asset.height).with_scale(cover, cover)
        };
        let kind = LayerKind::Image(ImageContent::new(asset.src, asset.pixels));
        Some(self.add_layer(kind, attrs))
    }

    // History -------------------------------------------------------------

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            background_color: self.background,
            layers: self.layers.clone(),
        }
    }

    /// Record the current state as the end of an action.
    ///
    /// A state identical to the current history entry is not pushed again.
    pub fn commit(&mut self) {
        let json = match serde_json::to_string(&self.snapshot()) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize scene snapshot: {}", err);
                return;
            }
        };
        if self.history.current() == Some(&json) {
            return;
        }
        self.history.push(json);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) {
        if let Some(json) = self.history.undo().cloned() {
            self.restore(&json);
        }
    }

    pub fn redo(&mut self) {
        if let Some(json) = self.history.redo().cloned() {
            self.restore(&json);
        }
    }

    fn restore(&mut self, json: &str) {
        match serde_json::from_str::<SceneSnapshot>(json) {
            Ok(snapshot) => {
                self.background = snapshot.background_color;
                self.layers = snapshot.layers;
                self.rehydrate_images();
                if let Some(id) = self.selected {
                    if self.layer(id).is_none() {
                        self.selected = None;
                    }
                }
            }
            Err(err) => log::error!("Corrupt history entry: {}", err),
        }
    }

    fn rehydrate_images(&mut self) {
        let cache = &mut self.decode_cache;
        for layer in &mut self.layers {
            if let Some(img) = layer.kind.image_mut() {
                if img.pixels.is_some() {
                    continue;
                }
                match cache.get_or_decode(&img.src) {
                    Ok(pixels) => img.pixels = Some(pixels),
                    Err(err) => log::warn!("Failed to decode image of layer {}: {}", layer.id, err),
                }
            }
        }
    }

    fn rehydrate_assets(&mut self) {
        let cache = &mut self.decode_cache;
        for asset in &mut self.assets {
            if asset.pixels.is_some() {
                continue;
            }
            match cache.get_or_decode(&asset.src) {
                Ok(pixels) => {
                    asset.width = pixels.width() as f32;
                    asset.height = pixels.height() as f32;
                    asset.pixels = Some(pixels);
                }
                Err(err) => log::warn!("Failed to decode asset '{}': {}", asset.name, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{PlainShape, RectShape, TextContent};
    use crate::template::default_template;

    fn store() -> SceneStore {
        SceneStore::new(default_template())
    }

    fn rect() -> LayerKind {
        LayerKind::Rect(RectShape::default())
    }

    #[test]
    fn test_add_layer_defaults() {
        let mut scene = store();
        let id = scene.add_layer(rect(), LayerPatch::default());
        let layer = scene.layer(id).unwrap();
        assert_eq!((layer.x, layer.y), (106.0, 260.0));
        assert_eq!((layer.width, layer.height), (100.0, 100.0));
        assert_eq!(scene.selected(), Some(id));
        assert!(scene.can_undo());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut scene = store();
        let ghost = LayerId::new();
        let len = scene.history_len();
        scene.apply_and_commit(ghost, &LayerPatch::position(1.0, 1.0));
        scene.delete_layer(ghost);
        scene.reorder(ghost, ghost);
        scene.select(Some(ghost));
        assert_eq!(scene.history_len(), len);
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_identical_commit_is_not_pushed() {
        let mut scene = store();
        scene.add_layer(rect(), LayerPatch::default());
        let len = scene.history_len();
        scene.commit();
        scene.commit();
        assert_eq!(scene.history_len(), len);
    }

    #[test]
    fn test_undo_clears_vanished_selection() {
        let mut scene = store();
        let id = scene.add_layer(rect(), LayerPatch::default());
        scene.undo();
        assert!(scene.layers().is_empty());
        assert_eq!(scene.selected(), None);
        scene.redo();
        assert_eq!(scene.layers()[0].id, id);
    }

    #[test]
    fn test_text_is_measured_on_add() {
        let mut scene = store();
        let id = scene.add_layer(
            LayerKind::Text(TextContent::new("12:30")),
            LayerPatch::default(),
        );
        let layer = scene.layer(id).unwrap();
        assert!(layer.width >= 1.0 && layer.height >= 1.0);
    }

    #[test]
    fn test_hit_test_skips_hidden_and_locked() {
        let mut scene = store();
        let bottom = scene.add_layer(LayerKind::Circle(PlainShape::default()), LayerPatch::default());
        let top = scene.add_layer(rect(), LayerPatch::default());
        let center = scene.canvas_center();
        assert_eq!(scene.hit_test(center), Some(top));
        scene.apply_transient(top, &LayerPatch { locked: Some(true), ..Default::default() });
        assert_eq!(scene.hit_test(center), Some(bottom));
        scene.apply_transient(bottom, &LayerPatch { hidden: Some(true), ..Default::default() });
        assert_eq!(scene.hit_test(center), None);
    }

    #[test]
    fn test_duplicate_offsets_copy() {
        let mut scene = store();
        let id = scene.add_layer(rect(), LayerPatch::default());
        let copy = scene.duplicate_layer(id, 20.0).unwrap();
        assert_ne!(copy, id);
        let (a, b) = (scene.layer(id).unwrap(), scene.layer(copy).unwrap());
        assert_eq!((b.x - a.x, b.y - a.y), (20.0, 20.0));
        assert_eq!(scene.selected(), Some(copy));
    }

    #[test]
    fn test_background_transient_then_commit() {
        let mut scene = store();
        let len = scene.history_len();
        scene.set_background_transient(Color::WHITE);
        assert_eq!(scene.history_len(), len);
        scene.set_background_and_commit(Color::rgb(1, 2, 3));
        assert_eq!(scene.history_len(), len + 1);
        scene.undo();
        assert_eq!(scene.background(), Color::BLACK);
    }
}
