//! The model viewer widget.
//!
//! [`lifecycle::ViewerLifecycle`] decides what may happen and when;
//! [`commands::apply_viewer_commands`] carries each decision out on the scene.

pub mod asset_source;
pub mod commands;
pub mod config;
pub mod errors;
pub mod lifecycle;
/// Logs every viewer error and forwards it to the host.
pub mod reporter;
pub mod status;
