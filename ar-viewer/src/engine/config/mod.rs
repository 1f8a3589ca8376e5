//! Runtime configuration for the viewer.
//!
//! Compile-time defaults live in the `constants` crate; this module loads the
//! JSON settings file that can override them per deployment.

/// Settings file schema and defaults.
pub mod viewer_settings;

/// Boot-time loading of the settings file as a Bevy asset.
pub mod settings_loader;
