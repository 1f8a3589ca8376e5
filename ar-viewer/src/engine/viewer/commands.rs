use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use super::asset_source::AssetSource;
use super::config::{SurfaceSize, SurfaceTarget, ViewerConfiguration};
use super::errors::ViewerErrorEvent;
use super::lifecycle::{
    LoadRequest, MountOutcome, ResizeOutcome, UnmountOutcome, ViewerLifecycle,
    ViewerLifecycleEvent,
};
use super::status::{LoadStatus, LoadStatusChanged};
use crate::engine::config::viewer_settings::ViewerSettings;
use crate::engine::loading::asset_loader::PendingLoads;
use crate::engine::loading::local_handles::LocalHandleRegistry;
use crate::engine::scene::model::{ModelTransform, detach_asset};
use crate::engine::scene::placeholder::show_placeholder;
use crate::engine::scene::rig::{ViewerCamera, spawn_scene_rig};
use crate::engine::scene::teardown::dispose_scene;
use crate::engine::scene::{SceneAssets, SceneNodes, ViewerNode};
use crate::engine::surface::resolve_surface;
use constants::path::CANVAS_SELECTOR;

/// Where to mount and what to show. Missing fields fall back to the
/// `#bevy` canvas and its measured size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountRequest {
    pub selector: Option<String>,
    pub asset: AssetSource,
    pub size: Option<SurfaceSize>,
}

/// Operations on the viewer, applied in the order they were written.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    Mount(MountRequest),
    /// Tear down and mount again with a fresh configuration.
    Configure(MountRequest),
    LoadAsset(AssetSource),
    Resize(SurfaceSize),
    SetModelTransform {
        scale: Option<f32>,
        position: Option<Vec3>,
    },
    Unmount,
}

#[derive(SystemParam)]
pub struct ViewerRuntime<'w, 's> {
    commands: Commands<'w, 's>,
    lifecycle: ResMut<'w, ViewerLifecycle>,
    nodes: ResMut<'w, SceneNodes>,
    pending: ResMut<'w, PendingLoads>,
    local_handles: ResMut<'w, LocalHandleRegistry>,
    model_transform: ResMut<'w, ModelTransform>,
    settings: Res<'w, ViewerSettings>,
    asset_server: Res<'w, AssetServer>,
    scene_assets: SceneAssets<'w>,
    owned: Query<'w, 's, Entity, With<ViewerNode>>,
    windows: Query<'w, 's, &'static mut Window, With<PrimaryWindow>>,
    projections: Query<'w, 's, &'static mut Projection, With<ViewerCamera>>,
    status_events: EventWriter<'w, LoadStatusChanged>,
    lifecycle_events: EventWriter<'w, ViewerLifecycleEvent>,
    errors: EventWriter<'w, ViewerErrorEvent>,
}

impl ViewerRuntime<'_, '_> {
    fn mount(&mut self, request: MountRequest) {
        if self.lifecycle.is_mounted() {
            info!("Viewer already mounted, ignoring mount request");
            return;
        }

        let selector = request
            .selector
            .unwrap_or_else(|| CANVAS_SELECTOR.to_string());
        let size = match resolve_surface(&selector, request.size, self.windows.single().ok()) {
            Ok(size) => size,
            Err(err) => {
                self.errors.write(ViewerErrorEvent(err));
                return;
            }
        };
        let config = ViewerConfiguration {
            asset_source: request.asset,
            container: SurfaceTarget { selector, size },
        };

        match self.lifecycle.mount(config.clone()) {
            Ok(MountOutcome::Mounted) => {
                info!(
                    "Mounting viewer on '{}' ({}x{})",
                    config.container.selector, size.width, size.height
                );
                self.nodes.rig = spawn_scene_rig(
                    &mut self.commands,
                    &mut self.scene_assets.meshes,
                    &mut self.scene_assets.materials,
                    &self.settings,
                    size.aspect_ratio(),
                );
                self.show_placeholder();
                self.lifecycle_events.write(ViewerLifecycleEvent::Mounted);
                self.load(config.asset_source);
            }
            Ok(MountOutcome::AlreadyMounted) => {
                info!("Viewer already mounted, ignoring mount request");
            }
            Err(err) => {
                self.errors.write(ViewerErrorEvent(err));
            }
        }
    }

    fn load(&mut self, source: AssetSource) {
        match self.lifecycle.request_load(source) {
            Ok(LoadRequest::Started(ticket)) => {
                match ticket.source() {
                    AssetSource::Local(handle) => {
                        self.local_handles.replace(handle.clone());
                    }
                    _ => {
                        self.local_handles.release();
                    }
                }
                self.pending.begin(ticket, &self.asset_server);
                self.status_events
                    .write(LoadStatusChanged(LoadStatus::Loading));
            }
            Ok(LoadRequest::Cleared) => {
                self.pending.cancel();
                self.local_handles.release();
                detach_asset(&mut self.commands, &mut self.nodes);
                self.show_placeholder();
                self.status_events.write(LoadStatusChanged(LoadStatus::Idle));
            }
            Err(err) => {
                self.errors.write(ViewerErrorEvent(err));
            }
        }
    }

    fn resize(&mut self, size: SurfaceSize) {
        match self.lifecycle.resize(size) {
            ResizeOutcome::Resized(size) => {
                for mut projection in &mut self.projections {
                    if let Projection::Perspective(perspective) = projection.as_mut() {
                        perspective.aspect_ratio = size.aspect_ratio();
                    }
                }
                // On the web the canvas follows its parent, so only native windows are resized.
                #[cfg(not(target_arch = "wasm32"))]
                {
                    if let Ok(mut window) = self.windows.single_mut() {
                        if window.width() != size.width || window.height() != size.height {
                            window.resolution.set(size.width, size.height);
                        }
                    }
                }
                debug!("Viewer resized to {}x{}", size.width, size.height);
            }
            ResizeOutcome::Unchanged => {}
            ResizeOutcome::Ignored => {
                debug!(
                    "Ignoring resize to {}x{} (unmounted or unrenderable)",
                    size.width, size.height
                );
            }
        }
    }

    fn unmount(&mut self) {
        match self.lifecycle.unmount() {
            UnmountOutcome::Disposed => {
                self.pending.cancel();
                self.local_handles.release();
                let released = dispose_scene(&mut self.commands, &mut self.nodes, &self.owned);
                self.lifecycle_events.write(ViewerLifecycleEvent::Unmounted);
                self.status_events.write(LoadStatusChanged(LoadStatus::Idle));
                info!("Viewer unmounted, released {} scene nodes", released);
            }
            UnmountOutcome::AlreadyUnmounted => {
                debug!("Viewer already unmounted");
            }
        }
    }

    fn show_placeholder(&mut self) {
        let transform = self.model_transform.to_transform();
        show_placeholder(
            &mut self.commands,
            &mut self.nodes,
            &mut self.scene_assets.meshes,
            &mut self.scene_assets.materials,
            transform,
        );
    }
}

pub fn apply_viewer_commands(mut events: EventReader<ViewerCommand>, mut runtime: ViewerRuntime) {
    for command in events.read() {
        match command.clone() {
            ViewerCommand::Mount(request) => runtime.mount(request),
            ViewerCommand::Configure(request) => {
                runtime.unmount();
                runtime.mount(request);
            }
            ViewerCommand::LoadAsset(source) => runtime.load(source),
            ViewerCommand::Resize(size) => runtime.resize(size),
            ViewerCommand::SetModelTransform { scale, position } => {
                let updated = runtime.model_transform.with_updates(scale, position);
                *runtime.model_transform = updated;
            }
            ViewerCommand::Unmount => runtime.unmount(),
        }
    }
}

/// Forward primary window resizes; the lifecycle drops repeats.
pub fn sync_surface_size(
    mut resized: EventReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    mut viewer_commands: EventWriter<ViewerCommand>,
) {
    let Ok(primary) = primary.single() else {
        return;
    };
    if let Some(event) = resized.read().filter(|e| e.window == primary).last() {
        viewer_commands.write(ViewerCommand::Resize(SurfaceSize::new(
            event.width,
            event.height,
        )));
    }
}
