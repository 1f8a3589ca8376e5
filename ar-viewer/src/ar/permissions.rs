use bevy::prelude::*;

use super::ArCommand;
use crate::browser::inbox::{BrowserEvent, BrowserEventReceived, BrowserInbox};
use crate::browser::media::MediaHost;
use crate::engine::viewer::errors::{Capability, ViewerError, ViewerErrorEvent};
use crate::rpc::web_rpc::WebRpcInterface;

/// Denied is recoverable: the host may ask again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PermissionStatus {
    #[default]
    Unknown,
    Granted,
    Denied(String),
}

#[derive(Resource, Debug, Default)]
pub struct PermissionState {
    camera: PermissionStatus,
    geolocation: PermissionStatus,
}

impl PermissionState {
    pub fn status(&self, capability: Capability) -> &PermissionStatus {
        match capability {
            Capability::Camera => &self.camera,
            Capability::Geolocation => &self.geolocation,
        }
    }

    /// Record a probe result. Returns true when the status changed.
    pub fn record(&mut self, capability: Capability, result: Result<(), String>) -> bool {
        let next = match result {
            Ok(()) => PermissionStatus::Granted,
            Err(reason) => PermissionStatus::Denied(reason),
        };
        let slot = match capability {
            Capability::Camera => &mut self.camera,
            Capability::Geolocation => &mut self.geolocation,
        };
        if *slot == next {
            return false;
        }
        *slot = next;
        true
    }
}

pub fn permission_payload(capability: Capability, status: &PermissionStatus) -> serde_json::Value {
    match status {
        PermissionStatus::Denied(reason) => serde_json::json!({
            "capability": capability,
            "granted": false,
            "reason": reason,
        }),
        _ => serde_json::json!({
            "capability": capability,
            "granted": *status == PermissionStatus::Granted,
        }),
    }
}

pub fn request_camera_permission(
    mut ar_commands: EventReader<ArCommand>,
    mut media: NonSendMut<MediaHost>,
    inbox: Res<BrowserInbox>,
) {
    if ar_commands
        .read()
        .any(|command| *command == ArCommand::RequestCameraPermission)
    {
        info!("Requesting camera permission");
        media.probe_permission(&inbox);
    }
}

/// Every probe result is reported, so a repeated denial still reaches the retry prompt.
pub fn apply_permission_probes(
    mut browser_events: EventReader<BrowserEventReceived>,
    mut permissions: ResMut<PermissionState>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut errors: EventWriter<ViewerErrorEvent>,
) {
    for event in browser_events.read() {
        let BrowserEvent::PermissionProbe { capability, result } = &event.0 else {
            continue;
        };
        if permissions.record(*capability, result.clone()) {
            info!("{} permission is now {:?}", capability, permissions.status(*capability));
        }
        rpc_interface.send_notification(
            "permission_changed",
            permission_payload(*capability, permissions.status(*capability)),
        );
        if let Err(reason) = result {
            errors.write(ViewerErrorEvent(ViewerError::PermissionDenied {
                capability: *capability,
                reason: reason.clone(),
            }));
        }
    }
}
