// Standard library and external crates
use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::camera::orbit_camera::orbit_camera_controller;
use crate::engine::config::settings_loader::{
    SettingsLoader, finish_settings_load, start_settings_load,
};
use crate::engine::config::viewer_settings::ViewerSettings;
use crate::engine::core::app_state::{AppState, ViewerSystems, auto_mount};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::asset_loader::{PendingLoads, poll_pending_loads};
use crate::engine::loading::local_handles::LocalHandleRegistry;
use crate::engine::scene::SceneNodes;
use crate::engine::scene::model::{ModelTransform, apply_model_transform};
use crate::engine::surface::context_loss::{
    ContextLossListener, report_context_loss, sync_context_loss_listener,
};
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::viewer::commands::{ViewerCommand, apply_viewer_commands, sync_surface_size};
use crate::engine::viewer::errors::ViewerErrorEvent;
use crate::engine::viewer::lifecycle::{ViewerLifecycle, ViewerLifecycleEvent, viewer_mounted};
use crate::engine::viewer::reporter::report_viewer_errors;
use crate::engine::viewer::status::LoadStatusChanged;

// Browser, AR and RPC modules
use crate::ar::ArPlugin;
use crate::browser::inbox::{BrowserEventReceived, BrowserInbox, dispatch_browser_events};
use crate::rpc::notifications::forward_load_status;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{fps_text_update_system, spawn_fps_overlay};

pub fn create_app() -> App {
    let mut app = App::new();

    // Asset sources must exist before the asset plugin builds.
    #[cfg(target_arch = "wasm32")]
    register_web_asset_sources(&mut app);

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers ViewerSettings as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ViewerSettings>::new(&["settings.json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(ArPlugin);

    app.configure_sets(
        Update,
        (
            ViewerSystems::Intake,
            ViewerSystems::Apply,
            ViewerSystems::Settle,
            ViewerSystems::Report,
            ViewerSystems::Transmit,
        )
            .chain()
            .run_if(in_state(AppState::Ready)),
    );

    // Initialise resources early
    app.init_resource::<SettingsLoader>()
        .init_resource::<ViewerLifecycle>()
        .init_resource::<SceneNodes>()
        .init_resource::<PendingLoads>()
        .init_resource::<LocalHandleRegistry>()
        .init_resource::<ModelTransform>()
        .init_resource::<BrowserInbox>()
        .init_non_send_resource::<ContextLossListener>()
        .add_event::<ViewerCommand>()
        .add_event::<ViewerErrorEvent>()
        .add_event::<LoadStatusChanged>()
        .add_event::<ViewerLifecycleEvent>()
        .add_event::<BrowserEventReceived>();

    // Boot: wait for the settings file, then mount if configured to.
    app.add_systems(Startup, start_settings_load)
        .add_systems(
            Update,
            finish_settings_load.run_if(in_state(AppState::Booting)),
        )
        .add_systems(OnEnter(AppState::Ready), auto_mount);

    app.add_systems(
        Update,
        (dispatch_browser_events, sync_surface_size).in_set(ViewerSystems::Intake),
    )
    .add_systems(
        Update,
        apply_viewer_commands.in_set(ViewerSystems::Apply),
    )
    .add_systems(
        Update,
        (
            poll_pending_loads,
            sync_context_loss_listener,
            report_context_loss,
            (orbit_camera_controller, apply_model_transform).run_if(viewer_mounted),
        )
            .chain()
            .in_set(ViewerSystems::Settle),
    )
    .add_systems(
        Update,
        (
            report_viewer_errors,
            forward_load_status,
            fps_notification_system,
        )
            .in_set(ViewerSystems::Report),
    );

    // Add the FPS overlay only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Startup, spawn_fps_overlay)
            .add_systems(Update, fps_text_update_system);
    }

    app
}

/// `https://` and `http://` URIs parse as paths in sources named after their
/// scheme; `blob:` object URLs are fetched as-is.
#[cfg(target_arch = "wasm32")]
fn register_web_asset_sources(app: &mut App) {
    use crate::engine::viewer::asset_source::{BLOB_SOURCE, HTTP_SOURCE, HTTPS_SOURCE};
    use bevy::asset::io::AssetSource;
    use bevy::asset::io::wasm::HttpWasmAssetReader;

    for (name, root) in [
        (HTTPS_SOURCE, "https://"),
        (HTTP_SOURCE, "http://"),
        (BLOB_SOURCE, ""),
    ] {
        app.register_asset_source(
            name,
            AssetSource::build().with_reader(move || Box::new(HttpWasmAssetReader::new(root))),
        );
    }
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
