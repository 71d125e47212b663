//! Pointer and keyboard handling for the canvas.
//!
//! Every pointer move recomputes the dragged layer from the snapshot taken
//! at pointer-down, so the result never accumulates rounding drift. History
//! is committed once when the gesture ends.

use egui::{Key, Modifiers, Pos2, Vec2, pos2, vec2};

use crate::geometry::{self, HandleKey};
use crate::layer::{Layer, LayerPatch};
use crate::scene::SceneStore;

/// Off-canvas world margin drawn around the device on each side
pub const CANVAS_MARGIN: f32 = 200.0;

/// Smallest scale a resize can produce
pub const MIN_LAYER_SCALE: f32 = 0.01;

/// Offset of pasted and duplicated layers
pub const PASTE_OFFSET: f32 = 20.0;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 3.0;

/// Maps between screen points and world (canvas) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the top-left corner of the margin area
    pub origin: Pos2,
    pub pan: Vec2,
    zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { 1.0 };
    }

    /// Fit the canvas into `available` screen space, leaving a 60 px border.
    pub fn fit(&mut self, available: Vec2, canvas: Vec2) {
        self.set_zoom(fit_zoom(available, canvas));
        self.pan = Vec2::ZERO;
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        let p = (screen - self.origin - self.pan) / self.zoom;
        pos2(p.x - CANVAS_MARGIN, p.y - CANVAS_MARGIN)
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        let p = vec2(world.x + CANVAS_MARGIN, world.y + CANVAS_MARGIN) * self.zoom;
        self.origin + self.pan + p
    }

    /// Screen size of the canvas plus its margin
    pub fn surface_size(&self, canvas: Vec2) -> Vec2 {
        (canvas + Vec2::splat(CANVAS_MARGIN * 2.0)) * self.zoom
    }
}

pub fn fit_zoom(available: Vec2, canvas: Vec2) -> f32 {
    let w = canvas.x.max(1.0);
    let h = canvas.y.max(1.0);
    ((available.x - 120.0) / w).min((available.y - 120.0) / h).max(0.2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Moving,
    Resizing(HandleKey),
    Rotating,
}

/// Pointer position and layer state captured at pointer-down
#[derive(Debug, Clone)]
struct DragStart {
    pointer: Pos2,
    layer_before: Layer,
}

/// Who owns keyboard input this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFocus {
    Canvas,
    /// A text field has focus; editor shortcuts must not fire
    TextEditing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Delete,
    Copy,
    Cut,
    Paste,
    Duplicate,
}

impl Shortcut {
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Shortcut> {
        let command = modifiers.command || modifiers.ctrl || modifiers.mac_cmd;
        match key {
            Key::Z if command && modifiers.shift => Some(Shortcut::Redo),
            Key::Z if command => Some(Shortcut::Undo),
            Key::Y if command => Some(Shortcut::Redo),
            Key::C if command => Some(Shortcut::Copy),
            Key::X if command => Some(Shortcut::Cut),
            Key::V if command => Some(Shortcut::Paste),
            Key::D if command => Some(Shortcut::Duplicate),
            Key::Delete | Key::Backspace if !command => Some(Shortcut::Delete),
            _ => None,
        }
    }

    /// Shortcuts triggered this frame.
    ///
    /// egui turns the platform copy/cut/paste chords into dedicated events,
    /// so those are picked up alongside plain key presses.
    pub fn from_input(input: &egui::InputState) -> Vec<Shortcut> {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key { key, pressed: true, modifiers, .. } => Shortcut::from_key(*key, *modifiers),
                egui::Event::Copy => Some(Shortcut::Copy),
                egui::Event::Cut => Some(Shortcut::Cut),
                egui::Event::Paste(_) => Some(Shortcut::Paste),
                _ => None,
            })
            .collect()
    }

    pub fn pasted_text(input: &egui::InputState) -> Option<String> {
        input.events.iter().find_map(|event| match event {
            egui::Event::Paste(text) => Some(text.clone()),
            _ => None,
        })
    }
}

/// The canvas state machine: idle, or moving/resizing/rotating one layer.
#[derive(Debug)]
pub struct InteractionController {
    gesture: Gesture,
    drag: Option<DragStart>,
    clipboard: Option<Layer>,
    pub viewport: Viewport,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            drag: None,
            clipboard: None,
            viewport: Viewport::default(),
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// The copied layer as JSON, for the system clipboard.
    ///
    /// egui only reports a paste when the system clipboard holds text, so
    /// copies are mirrored there.
    pub fn clipboard_json(&self) -> Option<String> {
        let layer = self.clipboard.as_ref()?;
        match serde_json::to_string(layer) {
            Ok(json) => Some(json),
            Err(err) => {
                log::error!("Failed to serialize layer {}: {}", layer.id, err);
                None
            }
        }
    }

    /// Take a layer pasted from the system clipboard. Other text is ignored.
    pub fn accept_pasted_text(&mut self, text: &str) {
        match serde_json::from_str::<Layer>(text) {
            Ok(layer) => self.clipboard = Some(layer),
            Err(_) => log::debug!("Pasted text is not a layer"),
        }
    }

    /// Start a gesture at `world`. Ignored while a modal tool is open.
    pub fn pointer_down(&mut self, scene: &mut SceneStore, world: Pos2, modal_active: bool) {
        if modal_active {
            return;
        }

        if let Some(layer) = scene.selected_layer().filter(|l| !l.locked && !l.hidden) {
            if let Some(handle) = geometry::hit_handle(layer, world) {
                self.gesture = if handle == HandleKey::Rotate {
                    Gesture::Rotating
                } else {
                    Gesture::Resizing(handle)
                };
                self.drag = Some(DragStart { pointer: world, layer_before: layer.clone() });
                log::debug!("Grabbed handle {} of layer {}", handle.name(), layer.id);
                return;
            }
        }

        match scene.hit_test(world) {
            Some(id) => {
                scene.select(Some(id));
                self.drag = scene
                    .layer(id)
                    .map(|layer| DragStart { pointer: world, layer_before: layer.clone() });
                self.gesture = Gesture::Moving;
            }
            None => {
                scene.select(None);
                self.drag = None;
                self.gesture = Gesture::Idle;
            }
        }
    }

    pub fn pointer_move(&mut self, scene: &mut SceneStore, world: Pos2, modal_active: bool) {
        if modal_active {
            return;
        }
        let Some(drag) = &self.drag else {
            return;
        };
        if scene.selected() != Some(drag.layer_before.id) {
            return;
        }
        let patch = match self.gesture {
            Gesture::Idle => return,
            Gesture::Moving => move_patch(&drag.layer_before, drag.pointer, world),
            Gesture::Rotating => rotate_patch(&drag.layer_before, drag.pointer, world),
            Gesture::Resizing(handle) => resize_patch(&drag.layer_before, handle, drag.pointer, world),
        };
        scene.apply_transient(drag.layer_before.id, &patch);
    }

    /// End the gesture, committing once if one was active. Also used on pointer leave.
    pub fn pointer_up(&mut self, scene: &mut SceneStore) {
        if self.gesture != Gesture::Idle {
            scene.commit();
        }
        self.gesture = Gesture::Idle;
        self.drag = None;
    }

    /// Run a keyboard shortcut. Returns whether it did anything.
    pub fn handle_shortcut(
        &mut self,
        scene: &mut SceneStore,
        shortcut: Shortcut,
        focus: InputFocus,
        modal_active: bool,
    ) -> bool {
        if focus == InputFocus::TextEditing {
            return false;
        }

        match shortcut {
            Shortcut::Undo => {
                let can = scene.can_undo();
                scene.undo();
                can
            }
            Shortcut::Redo => {
                let can = scene.can_redo();
                scene.redo();
                can
            }
            Shortcut::Delete => {
                if modal_active || scene.selected().is_none() {
                    return false;
                }
                scene.delete_selected();
                true
            }
            Shortcut::Copy => self.copy(scene),
            Shortcut::Cut => {
                if modal_active || !self.copy(scene) {
                    return false;
                }
                scene.delete_selected();
                true
            }
            Shortcut::Paste => match &self.clipboard {
                Some(layer) => {
                    scene.paste_layer(layer, PASTE_OFFSET);
                    true
                }
                None => false,
            },
            Shortcut::Duplicate => scene
                .selected()
                .and_then(|id| scene.duplicate_layer(id, PASTE_OFFSET))
                .is_some(),
        }
    }

    fn copy(&mut self, scene: &SceneStore) -> bool {
        match scene.selected_layer() {
            Some(layer) => {
                self.clipboard = Some(layer.clone());
                true
            }
            None => false,
        }
    }
}

fn move_patch(before: &Layer, start: Pos2, pointer: Pos2) -> LayerPatch {
    let delta = pointer - start;
    LayerPatch::position(before.x + delta.x, before.y + delta.y)
}

fn rotate_patch(before: &Layer, start: Pos2, pointer: Pos2) -> LayerPatch {
    if pointer == start {
        return LayerPatch::transform_of(before);
    }
    let center = pos2(before.x, before.y);
    let a0 = (start - center).angle();
    let a1 = (pointer - center).angle();
    LayerPatch {
        rotation: Some(before.rotation + (a1 - a0).to_degrees()),
        ..Default::default()
    }
}

/// Resize from one handle in the layer's unrotated frame.
///
/// Corner handles keep the aspect ratio: the axis with the larger absolute
/// size change drives, ties drive by height. The opposite edge stays put.
fn resize_patch(before: &Layer, handle: HandleKey, start: Pos2, pointer: Pos2) -> LayerPatch {
    if pointer == start {
        return LayerPatch::transform_of(before);
    }

    let center = pos2(before.x, before.y);
    let sl = geometry::unrotate(start, center, before.rotation);
    let cl = geometry::unrotate(pointer, center, before.rotation);
    let (dx, dy) = (cl.x - sl.x, cl.y - sl.y);

    let mut d_left = if handle.moves_left() { dx } else { 0.0 };
    let mut d_right = if handle.moves_right() { dx } else { 0.0 };
    let mut d_top = if handle.moves_top() { dy } else { 0.0 };
    let mut d_bottom = if handle.moves_bottom() { dy } else { 0.0 };

    let content = geometry::content_size(before);
    let (cw, ch) = (content.x.max(f32::EPSILON), content.y.max(f32::EPSILON));
    let w0 = cw * before.scale_x;
    let h0 = ch * before.scale_y;

    if handle.is_corner() && w0 != 0.0 && h0 != 0.0 {
        let rw = w0 + (d_right - d_left);
        let rh = h0 + (d_bottom - d_top);
        let ratio = w0 / h0;
        if (rw - w0).abs() > (rh - h0).abs() {
            let rh = rw / ratio;
            if handle.moves_bottom() {
                d_bottom = rh - h0;
            } else {
                d_top = -(rh - h0);
            }
        } else {
            let rw = rh * ratio;
            if handle.moves_right() {
                d_right = rw - w0;
            } else {
                d_left = -(rw - w0);
            }
        }
    }

    let (hw, hh) = (w0 / 2.0, h0 / 2.0);
    let l = -hw + d_left;
    let r = hw + d_right;
    let t = -hh + d_top;
    let b = hh + d_bottom;

    let mid = geometry::rotate(pos2((l + r) / 2.0, (t + b) / 2.0), Pos2::ZERO, before.rotation);
    LayerPatch::position(before.x + mid.x, before.y + mid.y).with_scale(
        ((r - l).abs() / cw).max(MIN_LAYER_SCALE),
        ((b - t).abs() / ch).max(MIN_LAYER_SCALE),
    )
}
