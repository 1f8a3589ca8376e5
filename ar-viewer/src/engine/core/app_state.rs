use bevy::prelude::*;

use crate::engine::config::viewer_settings::ViewerSettings;
use crate::engine::viewer::asset_source::AssetSource;
use crate::engine::viewer::commands::{MountRequest, ViewerCommand};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Waiting for `viewer.settings.json`.
    #[default]
    Booting,
    Ready,
}

/// Per-frame ordering. Host and browser input is read first, viewer
/// commands are applied, async work settles, then results go out.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerSystems {
    Intake,
    Apply,
    Settle,
    Report,
    Transmit,
}

#[derive(Component)]
pub struct FpsText;

/// Mount on the `#bevy` canvas with the configured default model, unless the
/// host has asked to drive mounting itself.
pub fn auto_mount(settings: Res<ViewerSettings>, mut commands: EventWriter<ViewerCommand>) {
    if !settings.auto_mount {
        info!("Auto-mount disabled, waiting for host");
        return;
    }

    info!("→ Auto-mounting viewer");
    commands.write(ViewerCommand::Mount(MountRequest {
        asset: AssetSource::from_uri(&settings.default_model),
        ..default()
    }));
}
