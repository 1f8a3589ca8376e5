use bevy::prelude::*;
use serde::Serialize;

use super::ArCommand;
use super::permissions::{PermissionState, PermissionStatus};
use crate::browser::inbox::{BrowserEvent, BrowserEventReceived, BrowserInbox};
use crate::browser::media::MediaHost;
use crate::engine::viewer::errors::{Capability, ViewerError, ViewerErrorEvent};
use crate::engine::viewer::lifecycle::{ViewerLifecycle, ViewerLifecycleEvent};

/// Which camera the stream asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraFacing {
    /// Front camera.
    User,
    /// Rear camera.
    #[default]
    Environment,
}

impl CameraFacing {
    pub fn flipped(self) -> Self {
        match self {
            CameraFacing::User => CameraFacing::Environment,
            CameraFacing::Environment => CameraFacing::User,
        }
    }

    /// `facingMode` constraint value for `getUserMedia`.
    pub fn constraint(self) -> &'static str {
        match self {
            CameraFacing::User => "user",
            CameraFacing::Environment => "environment",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StreamStatus {
    #[default]
    Stopped,
    Requesting,
    Live,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub generation: u64,
    pub facing: CameraFacing,
}

/// What to do with a stream that just arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDecision {
    Attach,
    /// Superseded or stopped; its tracks must be stopped.
    Discard,
    Failed(String),
}

/// Camera stream requests, using the same last-requested-wins generation
/// counter as asset loads.
#[derive(Resource, Debug, Default)]
pub struct CameraStreamState {
    facing: CameraFacing,
    generation: u64,
    status: StreamStatus,
}

impl CameraStreamState {
    pub fn request(&mut self) -> StreamRequest {
        self.generation += 1;
        self.status = StreamStatus::Requesting;
        StreamRequest {
            generation: self.generation,
            facing: self.facing,
        }
    }

    pub fn flip(&mut self) -> StreamRequest {
        self.toggle_facing();
        self.request()
    }

    /// Change the preference without requesting a stream.
    pub fn toggle_facing(&mut self) -> CameraFacing {
        self.facing = self.facing.flipped();
        self.facing
    }

    pub fn on_acquired(&mut self, generation: u64, result: Result<(), String>) -> StreamDecision {
        if generation != self.generation || self.status != StreamStatus::Requesting {
            return StreamDecision::Discard;
        }
        match result {
            Ok(()) => {
                self.status = StreamStatus::Live;
                StreamDecision::Attach
            }
            Err(reason) => {
                self.status = StreamStatus::Failed(reason.clone());
                StreamDecision::Failed(reason)
            }
        }
    }

    /// Returns false if nothing was running or pending.
    pub fn stop(&mut self) -> bool {
        if self.status == StreamStatus::Stopped {
            return false;
        }
        self.generation += 1;
        self.status = StreamStatus::Stopped;
        true
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn status(&self) -> &StreamStatus {
        &self.status
    }
}

/// Start the stream once the viewer is up and camera access is granted,
/// and stop every track on teardown.
pub fn follow_viewer_lifecycle(
    mut lifecycle_events: EventReader<ViewerLifecycleEvent>,
    permissions: Res<PermissionState>,
    mut stream: ResMut<CameraStreamState>,
    mut media: NonSendMut<MediaHost>,
    inbox: Res<BrowserInbox>,
) {
    for event in lifecycle_events.read() {
        match event {
            ViewerLifecycleEvent::Mounted => {
                if permissions.status(Capability::Camera) == &PermissionStatus::Granted {
                    media.request_stream(stream.request(), &inbox);
                }
            }
            ViewerLifecycleEvent::Unmounted => {
                if stream.stop() {
                    media.stop_all();
                    info!("Camera stream stopped");
                }
            }
        }
    }
}

/// Flip requests and permission grants both (re)start the stream. Without
/// camera access a flip only changes the preference.
pub fn handle_camera_commands(
    mut ar_commands: EventReader<ArCommand>,
    mut browser_events: EventReader<BrowserEventReceived>,
    lifecycle: Res<ViewerLifecycle>,
    permissions: Res<PermissionState>,
    mut stream: ResMut<CameraStreamState>,
    mut media: NonSendMut<MediaHost>,
    inbox: Res<BrowserInbox>,
) {
    for command in ar_commands.read() {
        if *command == ArCommand::FlipCamera {
            let granted = permissions.status(Capability::Camera) == &PermissionStatus::Granted;
            if !lifecycle.is_mounted() || !granted {
                let facing = stream.toggle_facing();
                info!("Camera preference set to {}", facing.constraint());
                continue;
            }
            // The old stream's tracks stop before the new request goes out.
            media.stop_all();
            let request = stream.flip();
            info!("Flipping camera to {}", request.facing.constraint());
            media.request_stream(request, &inbox);
        }
    }

    let granted = browser_events.read().any(|event| {
        matches!(
            &event.0,
            BrowserEvent::PermissionProbe {
                capability: Capability::Camera,
                result: Ok(()),
            }
        )
    });
    if granted && lifecycle.is_mounted() && *stream.status() != StreamStatus::Live {
        media.request_stream(stream.request(), &inbox);
    }
}

pub fn settle_camera_streams(
    mut browser_events: EventReader<BrowserEventReceived>,
    mut stream: ResMut<CameraStreamState>,
    mut media: NonSendMut<MediaHost>,
    mut errors: EventWriter<ViewerErrorEvent>,
) {
    for event in browser_events.read() {
        let BrowserEvent::CameraStream { generation, result } = &event.0 else {
            continue;
        };
        match stream.on_acquired(*generation, result.clone()) {
            StreamDecision::Attach => {
                media.attach(*generation);
                info!("Camera stream {} live ({})", generation, stream.facing().constraint());
            }
            StreamDecision::Discard => {
                debug!("Stopping superseded camera stream {}", generation);
                media.discard(*generation);
            }
            StreamDecision::Failed(reason) => {
                errors.write(ViewerErrorEvent(ViewerError::PermissionDenied {
                    capability: Capability::Camera,
                    reason,
                }));
            }
        }
    }
}
