//! AR glue around the viewer: camera passthrough, permissions, location,
//! device-orientation placement and the model catalogue.
//!
//! Browser results arrive through [`BrowserInbox`](crate::browser::inbox::BrowserInbox);
//! host requests arrive as [`ArCommand`] events from the RPC layer.

use bevy::prelude::*;

use crate::browser::media::MediaHost;
use crate::browser::orientation::{OrientationListener, sync_orientation_listener};
use crate::engine::config::viewer_settings::CatalogueModel;
use crate::engine::core::app_state::{AppState, ViewerSystems};
use crate::engine::viewer::lifecycle::viewer_mounted;

pub mod camera_stream;
pub mod catalogue;
pub mod geolocation;
pub mod orientation;
pub mod permissions;
pub mod placement;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum ArCommand {
    FlipCamera,
    RequestCameraPermission,
    SelectModel(CatalogueModel),
    PlaceModel,
}

pub struct ArPlugin;

impl Plugin for ArPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<camera_stream::CameraStreamState>()
            .init_resource::<catalogue::ModelCatalogue>()
            .init_resource::<geolocation::LocationState>()
            .init_resource::<orientation::Trajectory>()
            .init_resource::<permissions::PermissionState>()
            .init_resource::<placement::PlacementSession>()
            .init_non_send_resource::<MediaHost>()
            .init_non_send_resource::<OrientationListener>()
            .add_event::<ArCommand>()
            .add_systems(OnEnter(AppState::Ready), catalogue::load_catalogue)
            .add_systems(
                Update,
                placement::handle_model_selection.in_set(ViewerSystems::Intake),
            )
            .add_systems(
                Update,
                (
                    permissions::request_camera_permission,
                    permissions::apply_permission_probes,
                    camera_stream::follow_viewer_lifecycle,
                    camera_stream::handle_camera_commands,
                    camera_stream::settle_camera_streams,
                    geolocation::request_location_on_mount,
                    geolocation::apply_position_updates,
                    sync_orientation_listener,
                    orientation::track_device_orientation.run_if(viewer_mounted),
                    placement::handle_place_model,
                )
                    .chain()
                    .in_set(ViewerSystems::Settle),
            );
    }
}
