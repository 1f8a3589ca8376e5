//! Core application setup and state management.
//!
//! Builds the app, owns the boot state machine and the per-frame system
//! ordering, and configures the window for native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Registers the viewer resources, events and systems, plus the web-only
/// asset sources for absolute and object URLs.
pub mod app_setup;

/// Boot states and the ordered system sets every viewer system belongs to.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
