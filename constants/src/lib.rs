//! Shared constants for the AR model viewer.

pub mod catalogue;
pub mod controls;
pub mod path;
pub mod placement;
pub mod render_settings;
