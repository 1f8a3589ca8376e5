use bevy::prelude::*;
use serde::Serialize;

use super::permissions::PermissionState;
use crate::browser::inbox::{BrowserEvent, BrowserEventReceived, BrowserInbox};
use crate::browser::location::request_position;
use crate::engine::viewer::errors::Capability;
use crate::engine::viewer::lifecycle::ViewerLifecycleEvent;
use crate::rpc::web_rpc::WebRpcInterface;

pub const LOCATION_WARNING: &str =
    "Failed to get your location. Location-based features may not work properly.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres, as reported by the browser.
    pub accuracy: f64,
}

#[derive(Resource, Debug, Default)]
pub struct LocationState {
    fix: Option<GeoFix>,
    requested: bool,
}

impl LocationState {
    pub fn fix(&self) -> Option<&GeoFix> {
        self.fix.as_ref()
    }

    /// Returns false while a request is already outstanding.
    pub fn begin_request(&mut self) -> bool {
        if self.requested {
            return false;
        }
        self.requested = true;
        true
    }

    pub fn record(&mut self, result: &Result<GeoFix, String>) {
        self.requested = false;
        if let Ok(fix) = result {
            self.fix = Some(*fix);
        }
    }
}

/// One-shot position request each time placement mode starts.
pub fn request_location_on_mount(
    mut lifecycle_events: EventReader<ViewerLifecycleEvent>,
    mut location: ResMut<LocationState>,
    inbox: Res<BrowserInbox>,
) {
    let mounted = lifecycle_events
        .read()
        .any(|event| *event == ViewerLifecycleEvent::Mounted);
    if mounted && location.begin_request() {
        info!("Requesting high accuracy position");
        request_position(&inbox);
    }
}

/// A failed fix is a warning, never an error: placement degrades but the viewer keeps running.
pub fn apply_position_updates(
    mut browser_events: EventReader<BrowserEventReceived>,
    mut location: ResMut<LocationState>,
    mut permissions: ResMut<PermissionState>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in browser_events.read() {
        let BrowserEvent::Position(result) = &event.0 else {
            continue;
        };
        location.record(result);
        permissions.record(Capability::Geolocation, result.as_ref().map(|_| ()).map_err(Clone::clone));

        match result {
            Ok(fix) => info!(
                "Current location: {:.6}, {:.6} (±{:.0} m)",
                fix.latitude, fix.longitude, fix.accuracy
            ),
            Err(reason) => {
                warn!("Error getting geolocation: {}", reason);
                rpc_interface.send_notification(
                    "location_warning",
                    serde_json::json!({
                        "message": LOCATION_WARNING,
                        "reason": reason,
                    }),
                );
            }
        }
    }
}
