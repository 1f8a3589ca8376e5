/// Runtime settings file, relative to the asset root.
pub const VIEWER_SETTINGS_PATH: &str = "viewer.settings.json";

/// Canvas the web build renders into.
pub const CANVAS_SELECTOR: &str = "#bevy";

pub const SUPPORTED_ASSET_EXTENSIONS: &[&str] = &["glb", "gltf"];
