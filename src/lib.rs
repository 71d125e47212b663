#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod image_source;
pub mod interaction;
pub mod layer;
pub mod panels;
pub mod persistence;
pub mod renderer;
pub mod scene;
pub mod template;
pub mod text;
pub mod tools;

pub use app::WatchFaceApp;
pub use color::Color;
pub use error::{ExportError, ImageError, PersistenceError, RenderError};
pub use export::{ExportFormat, export_image};
pub use interaction::{InteractionController, Viewport};
pub use layer::{Layer, LayerId, LayerKind, LayerPatch};
pub use renderer::{RenderOptions, Renderer};
pub use scene::SceneStore;
pub use template::{DeviceTemplate, TEMPLATES};
