use bevy::prelude::*;

use super::commands::ViewerCommand;
use super::errors::{ViewerError, ViewerErrorEvent};
use super::lifecycle::ViewerLifecycle;
use crate::rpc::web_rpc::WebRpcInterface;

/// Payload of the `viewer_error` notification.
pub fn error_payload(error: &ViewerError) -> serde_json::Value {
    serde_json::json!({
        "kind": error.kind(),
        "message": error.to_string(),
        "fatal": error.is_fatal(),
    })
}

/// Single exit for viewer errors: log, notify the host, and unmount on fatal ones.
pub fn report_viewer_errors(
    mut errors: EventReader<ViewerErrorEvent>,
    lifecycle: Res<ViewerLifecycle>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut viewer_commands: EventWriter<ViewerCommand>,
) {
    let mut unmount_requested = false;
    for ViewerErrorEvent(error) in errors.read() {
        if error.is_fatal() {
            error!("Viewer error: {}", error);
        } else {
            warn!("Viewer error: {}", error);
        }
        rpc_interface.send_notification("viewer_error", error_payload(error));

        if error.is_fatal() && lifecycle.is_mounted() && !unmount_requested {
            viewer_commands.write(ViewerCommand::Unmount);
            unmount_requested = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::viewer::asset_source::AssetSource;
    use crate::engine::viewer::config::{SurfaceSize, SurfaceTarget, ViewerConfiguration};

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<ViewerLifecycle>()
            .init_resource::<WebRpcInterface>()
            .add_event::<ViewerErrorEvent>()
            .add_event::<ViewerCommand>()
            .add_systems(Update, report_viewer_errors);
        app.world_mut()
            .resource_mut::<ViewerLifecycle>()
            .mount(ViewerConfiguration {
                asset_source: AssetSource::None,
                container: SurfaceTarget::new(SurfaceSize::new(100.0, 100.0)),
            })
            .unwrap();
        app
    }

    fn unmounts(app: &App) -> usize {
        let events = app.world().resource::<Events<ViewerCommand>>();
        let mut cursor = events.get_cursor();
        cursor
            .read(events)
            .filter(|c| **c == ViewerCommand::Unmount)
            .count()
    }

    #[test]
    fn test_recoverable_error_is_forwarded_without_unmount() {
        let mut app = test_app();
        app.world_mut()
            .send_event(ViewerErrorEvent(ViewerError::AssetLoad {
                uri: "missing.glb".to_string(),
                reason: "404".to_string(),
            }));
        app.update();

        let rpc = app.world().resource::<WebRpcInterface>();
        let sent = rpc.queued_notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "viewer_error");
        assert_eq!(sent[0].params["kind"], "asset_load");
        assert_eq!(sent[0].params["fatal"], false);
        assert_eq!(unmounts(&app), 0);
    }

    #[test]
    fn test_fatal_error_unmounts_once() {
        let mut app = test_app();
        app.world_mut()
            .send_event(ViewerErrorEvent(ViewerError::ContextLost));
        app.world_mut()
            .send_event(ViewerErrorEvent(ViewerError::ContextLost));
        app.update();

        assert_eq!(unmounts(&app), 1);
        let rpc = app.world().resource::<WebRpcInterface>();
        assert_eq!(rpc.queued_notifications().len(), 2);
        assert_eq!(rpc.queued_notifications()[0].params["fatal"], true);
    }
}
