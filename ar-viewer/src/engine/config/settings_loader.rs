use bevy::asset::LoadState;
use bevy::prelude::*;

use super::viewer_settings::ViewerSettings;
use crate::engine::core::app_state::AppState;
use constants::path::VIEWER_SETTINGS_PATH;

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<ViewerSettings>>,
}

pub fn start_settings_load(mut loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    info!("Loading viewer settings from: {}", VIEWER_SETTINGS_PATH);
    loader.handle = Some(asset_server.load(VIEWER_SETTINGS_PATH));
}

/// Insert the settings resource once the file resolves, falling back to defaults on failure.
pub fn finish_settings_load(
    mut loader: ResMut<SettingsLoader>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<ViewerSettings>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = loader.handle.as_ref() else {
        return;
    };

    let settings = if let Some(settings) = settings_assets.get(handle) {
        info!("✓ Viewer settings loaded");
        settings.clone()
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Viewer settings unavailable ({}), using built-in defaults", err);
        ViewerSettings::default()
    } else {
        return;
    };

    loader.handle = None;
    commands.insert_resource(settings);
    info!("→ Transitioning to Ready state");
    next_state.set(AppState::Ready);
}
