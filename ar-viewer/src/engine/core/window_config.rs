use bevy::prelude::*;
use bevy::window::{CompositeAlphaMode, PresentMode};

#[cfg(target_arch = "wasm32")]
use constants::path::CANVAS_SELECTOR;

pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        // Transparent so the camera feed behind the canvas shows through.
        Window {
            canvas: Some(CANVAS_SELECTOR.into()),
            fit_canvas_to_parent: true,
            transparent: true,
            composite_alpha_mode: CompositeAlphaMode::PreMultiplied,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "AR Viewer".into(),
            composite_alpha_mode: CompositeAlphaMode::Auto,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
