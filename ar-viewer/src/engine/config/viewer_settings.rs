use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::catalogue::{DEFAULT_CATALOGUE, DEFAULT_MODEL_URL};
use constants::render_settings::*;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: CAMERA_POSITION.to_array(),
            fov_degrees: CAMERA_FOV_DEGREES,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrbitSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            damping_factor: ORBIT_DAMPING_FACTOR,
            rotate_speed: ORBIT_ROTATE_SPEED,
            enable_zoom: true,
            enable_pan: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogueModel {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// Runtime settings, loaded from `viewer.settings.json` in the asset root.
#[derive(Asset, TypePath, Resource, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerSettings {
    /// Model the viewer loads when it mounts itself at startup. Empty shows the placeholder.
    pub default_model: String,
    pub auto_mount: bool,
    pub camera: CameraSettings,
    pub orbit: OrbitSettings,
    pub catalogue: Vec<CatalogueModel>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL_URL.to_string(),
            auto_mount: true,
            camera: CameraSettings::default(),
            orbit: OrbitSettings::default(),
            catalogue: DEFAULT_CATALOGUE
                .iter()
                .map(|entry| CatalogueModel {
                    id: entry.id.to_string(),
                    name: entry.name.to_string(),
                    url: entry.url.to_string(),
                    thumbnail: entry.thumbnail.to_string(),
                })
                .collect(),
        }
    }
}
