use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use egui::TextureHandle;

use crate::color::Color;
use crate::config::EditorConfig;
use crate::image_source::{self, DecodeWorker, PixelSource};
use crate::interaction::{InputFocus, InteractionController, Shortcut};
use crate::layer::{Crop, LayerId};
use crate::panels;
use crate::persistence;
use crate::renderer::Renderer;
use crate::scene::SceneStore;
use crate::template::DeviceTemplate;
use crate::tools::{self, CropCorner};

/// Tabs of the left-hand panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarTab {
    Elements,
    Text,
    Upload,
    Background,
}

impl SidebarTab {
    pub const ALL: [SidebarTab; 4] = [
        SidebarTab::Elements,
        SidebarTab::Text,
        SidebarTab::Upload,
        SidebarTab::Background,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SidebarTab::Elements => "Shapes",
            SidebarTab::Text => "Text",
            SidebarTab::Upload => "Upload",
            SidebarTab::Background => "Background",
        }
    }
}

/// What the crop window is dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropDrag {
    Corner(CropCorner),
    Move { start: egui::Pos2, crop: Crop },
}

pub struct CropSession {
    pub layer: LayerId,
    pub crop: Crop,
    pub drag: Option<CropDrag>,
    pub texture: Option<TextureHandle>,
}

/// Whole-image colour keying or local brush strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMode {
    Color,
    Brush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushKind {
    Erase,
    Restore,
}

pub struct RemovalSession {
    pub layer: LayerId,
    /// Pixels as they were when the window opened
    pub original: Arc<PixelSource>,
    pub working: Arc<PixelSource>,
    pub mode: RemovalMode,
    pub target: Color,
    pub tolerance: f32,
    pub brush: BrushKind,
    /// Brush diameter in image pixels
    pub brush_size: f32,
    pub picking: bool,
    pub texture: Option<TextureHandle>,
    pub texture_dirty: bool,
}

impl RemovalSession {
    pub fn new(layer: LayerId, pixels: Arc<PixelSource>) -> Self {
        Self {
            layer,
            original: Arc::clone(&pixels),
            working: pixels,
            mode: RemovalMode::Color,
            target: Color::BLACK,
            tolerance: tools::DEFAULT_TOLERANCE,
            brush: BrushKind::Erase,
            brush_size: tools::DEFAULT_BRUSH_SIZE,
            picking: false,
            texture: None,
            texture_dirty: true,
        }
    }

    /// Key out the target colour across the whole working copy.
    pub fn remove_everywhere(&mut self) {
        self.working = Arc::new(tools::remove_color(&self.working, self.target, self.tolerance));
        self.texture_dirty = true;
    }

    /// One brush dab at `center`, in image pixels.
    pub fn brush_at(&mut self, center: egui::Pos2) {
        let radius = self.brush_size / 2.0;
        let next = match self.brush {
            BrushKind::Erase => {
                tools::brush_erase(&self.working, center, radius, self.target, self.tolerance)
            }
            BrushKind::Restore => tools::brush_restore(&self.working, &self.original, center, radius),
        };
        self.working = Arc::new(next);
        self.texture_dirty = true;
    }

    pub fn reset(&mut self) {
        self.working = Arc::clone(&self.original);
        self.texture_dirty = true;
    }
}

/// Image tools that take over the canvas while open
pub enum ModalTool {
    Crop(CropSession),
    RemoveBackground(RemovalSession),
}

pub struct WatchFaceApp {
    pub(crate) config: EditorConfig,
    pub(crate) scene: SceneStore,
    pub(crate) controller: InteractionController,
    pub(crate) renderer: Renderer,
    pub(crate) decoder: DecodeWorker,
    pub(crate) canvas_texture: Option<TextureHandle>,
    pub(crate) tab: SidebarTab,
    pub(crate) modal: Option<ModalTool>,
    pub(crate) show_export: bool,
    pub(crate) show_safe_area: bool,
    pub(crate) needs_fit: bool,
    /// A slider or picker edited the scene transiently; commit once the pointer is released
    pub(crate) pending_commit: bool,
    pub(crate) upload_path: String,
    pub(crate) text_draft: String,
    pub(crate) status: Option<String>,
}

impl WatchFaceApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = EditorConfig::load(cc.storage);
        let mut scene = SceneStore::with_history_capacity(config.template(), config.history_capacity);
        persistence::restore_from_storage(cc.storage, &mut scene);
        log::info!("Editing for {}", config.template().label);
        Self::with_scene(config, scene)
    }

    pub fn with_scene(config: EditorConfig, scene: SceneStore) -> Self {
        Self {
            config,
            scene,
            controller: InteractionController::new(),
            renderer: Renderer::new(),
            decoder: DecodeWorker::new(),
            canvas_texture: None,
            tab: SidebarTab::Elements,
            modal: None,
            show_export: false,
            show_safe_area: false,
            needs_fit: true,
            pending_commit: false,
            upload_path: String::new(),
            text_draft: String::new(),
            status: None,
        }
    }

    pub fn template(&self) -> &'static DeviceTemplate {
        self.config.template()
    }

    pub fn modal_active(&self) -> bool {
        self.modal.is_some()
    }

    pub(crate) fn set_template(&mut self, template: &'static DeviceTemplate) {
        if template.id == self.config.template_id {
            return;
        }
        log::info!("Switching device to {}", template.label);
        self.config.template_id = template.id.to_owned();
        self.scene.set_template(template);
        self.needs_fit = true;
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Read an image file from disk and hand it to the decode worker.
    pub(crate) fn upload_from_path(&mut self, path: &str) {
        let path = PathBuf::from(path.trim());
        match std::fs::read(&path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.decoder.submit(name, bytes);
            }
            Err(err) => {
                log::error!("Failed to read {}: {}", path.display(), err);
                self.set_status(format!("Could not read {}: {}", path.display(), err));
            }
        }
    }

    pub(crate) fn open_crop(&mut self, layer: LayerId) {
        let Some(crop) = self.scene.layer(layer).and_then(|l| l.kind.image()).map(|img| img.crop) else {
            return;
        };
        self.controller.pointer_up(&mut self.scene);
        self.modal = Some(ModalTool::Crop(CropSession {
            layer,
            crop: crop.unwrap_or(Crop::FULL),
            drag: None,
            texture: None,
        }));
    }

    pub(crate) fn open_background_removal(&mut self, layer: LayerId) {
        let pixels = self
            .scene
            .layer(layer)
            .and_then(|l| l.kind.image())
            .and_then(|img| img.pixels.clone());
        let Some(pixels) = pixels else {
            self.set_status("The image is still loading");
            return;
        };
        self.controller.pointer_up(&mut self.scene);
        self.modal = Some(ModalTool::RemoveBackground(RemovalSession::new(layer, pixels)));
    }

    fn poll_uploads(&mut self, ctx: &egui::Context) {
        if image_source::queue_dropped_files(ctx, &mut self.decoder) > 0 {
            self.tab = SidebarTab::Upload;
        }
        for result in self.decoder.poll() {
            match result {
                Ok(upload) => {
                    self.scene.add_asset(upload.name, upload.src, upload.pixels);
                }
                Err((name, err)) => {
                    log::error!("Failed to decode {}: {}", name, err);
                    self.set_status(format!("Could not load {}: {}", name, err));
                }
            }
        }
        if self.decoder.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let focus = if ctx.wants_keyboard_input() {
            InputFocus::TextEditing
        } else {
            InputFocus::Canvas
        };
        let modal_active = self.modal_active();
        if focus == InputFocus::Canvas {
            if let Some(text) = ctx.input(Shortcut::pasted_text) {
                self.controller.accept_pasted_text(&text);
            }
        }
        for shortcut in ctx.input(Shortcut::from_input) {
            if !self
                .controller
                .handle_shortcut(&mut self.scene, shortcut, focus, modal_active)
            {
                continue;
            }
            log::debug!("Shortcut {:?}", shortcut);
            if matches!(shortcut, Shortcut::Copy | Shortcut::Cut) {
                if let Some(json) = self.controller.clipboard_json() {
                    ctx.copy_text(json);
                }
            }
        }
    }

    /// Commit transient UI edits once no button is held.
    fn settle_pending_commit(&mut self, ctx: &egui::Context) {
        if self.pending_commit && !ctx.input(|i| i.pointer.any_down()) {
            self.scene.commit();
            self.pending_commit = false;
        }
    }
}

impl eframe::App for WatchFaceApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.config.save(storage);
        persistence::save_to_storage(storage, &self.scene);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_uploads(ctx);
        self.handle_shortcuts(ctx);

        panels::toolbar_panel(self, ctx);
        panels::status_bar(self, ctx);
        panels::tools_panel(self, ctx);
        panels::layers_panel(self, ctx);
        panels::central_panel(self, ctx);
        panels::modal_windows(self, ctx);

        self.settle_pending_commit(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn white_session() -> RemovalSession {
        let img = image::RgbaImage::from_pixel(10, 10, image::Rgba([255, 255, 255, 255]));
        let pixels = Arc::new(PixelSource::from_rgba_image(&img).unwrap());
        let mut session = RemovalSession::new(LayerId::new(), pixels);
        session.mode = RemovalMode::Brush;
        session.target = Color::WHITE;
        session.brush_size = 4.0;
        session.texture_dirty = false;
        session
    }

    fn alpha(session: &RemovalSession, x: u32, y: u32) -> u8 {
        tools::sample_color(&session.working, x, y).unwrap().a
    }

    #[test]
    fn test_brush_strokes_erase_then_restore() {
        let mut session = white_session();

        session.brush_at(pos2(5.0, 5.0));
        assert!(session.texture_dirty);
        assert_eq!(alpha(&session, 5, 5), 0);
        assert_eq!(alpha(&session, 0, 0), 255);
        // the pristine copy is never touched by strokes
        assert_eq!(tools::sample_color(&session.original, 5, 5).unwrap(), Color::WHITE);

        session.brush = BrushKind::Restore;
        session.brush_at(pos2(5.0, 5.0));
        assert_eq!(alpha(&session, 5, 5), 255);
    }

    #[test]
    fn test_reset_discards_strokes() {
        let mut session = white_session();
        session.brush_at(pos2(2.0, 2.0));
        session.brush_at(pos2(8.0, 8.0));
        assert_eq!(alpha(&session, 8, 8), 0);

        session.reset();
        assert!(Arc::ptr_eq(&session.working, &session.original));
        assert_eq!(alpha(&session, 2, 2), 255);
    }
}
