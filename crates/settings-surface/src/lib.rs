//! Settings surface controller.
//!
//! Owns at most one overlay session at a time. A session embeds the isolated
//! settings surface in the host page, listens for its boundary messages, runs the
//! extraction → generation → insertion pipeline, and tears itself down afterwards.

pub mod controller;
pub mod errors;
pub mod placement;
pub mod ports;
pub mod surface;

pub use controller::{ControllerOptions, SurfaceController, OVERLAY_CLASS};
pub use errors::SurfaceError;
pub use placement::OverlayPlacement;
pub use ports::{LogNotifier, Notifier};
pub use surface::{ButtonState, SettingsSurface, GENERATE_LABEL, GENERATING_LABEL};
