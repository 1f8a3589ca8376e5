use bevy::prelude::*;
use serde_json::json;

use super::web_rpc::WebRpcInterface;
use crate::engine::viewer::status::LoadStatusChanged;

/// Push every settled load status to the host.
pub fn forward_load_status(
    mut status_events: EventReader<LoadStatusChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for LoadStatusChanged(status) in status_events.read() {
        debug!("Load status → {}", status.label());
        rpc_interface.send_notification("load_status_changed", json!({ "status": status }));
    }
}
