//! egui panels and windows around the canvas.

mod central_panel;
mod layers_panel;
mod modals;
mod toolbar_panel;
mod tools_panel;
mod widgets;

pub use central_panel::central_panel;
pub use layers_panel::layers_panel;
pub use modals::modal_windows;
pub use toolbar_panel::{status_bar, toolbar_panel};
pub use tools_panel::tools_panel;
