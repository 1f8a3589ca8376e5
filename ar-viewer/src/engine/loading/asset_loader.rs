use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::scene::model::{
    AssetAnimation, AttachedAsset, ModelTransform, attach_asset, detach_asset,
};
use crate::engine::scene::placeholder::{remove_placeholder, show_placeholder};
use crate::engine::scene::{SceneAssets, SceneNodes};
use crate::engine::viewer::errors::{ViewerError, ViewerErrorEvent};
use crate::engine::viewer::lifecycle::{Completion, LoadTicket, ViewerLifecycle};
use crate::engine::viewer::status::LoadStatusChanged;

enum LoadProgress {
    Fetching(Handle<Gltf>),
    /// The source can't be loaded by this build; completes on the next poll.
    Rejected(String),
}

struct InFlightLoad {
    ticket: LoadTicket,
    progress: LoadProgress,
}

/// The single load the viewer is waiting on.
#[derive(Resource, Default)]
pub struct PendingLoads {
    current: Option<InFlightLoad>,
}

impl PendingLoads {
    /// Start loading the ticket's source. Any earlier load is dropped, and
    /// with it the last strong handle, so the asset server can stop work.
    pub fn begin(&mut self, ticket: LoadTicket, asset_server: &AssetServer) {
        if let Some(previous) = self.current.take() {
            debug!(
                "Superseding load of {}",
                previous.ticket.source().display_uri()
            );
        }

        let progress = match ticket.source().resolve() {
            Ok(path) => {
                info!("Loading asset: {}", path);
                LoadProgress::Fetching(asset_server.load(path))
            }
            Err(reason) => LoadProgress::Rejected(reason),
        };
        self.current = Some(InFlightLoad { ticket, progress });
    }

    /// Forget the in-flight load, if any.
    pub fn cancel(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}

struct LoadedGltf {
    gltf: Handle<Gltf>,
    scene: Handle<Scene>,
    clip: Option<Handle<AnimationClip>>,
}

/// Settle the in-flight load once the asset server reports a terminal state.
pub fn poll_pending_loads(
    mut pending: ResMut<PendingLoads>,
    mut lifecycle: ResMut<ViewerLifecycle>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut scene_assets: SceneAssets,
    mut nodes: ResMut<SceneNodes>,
    model_transform: Res<ModelTransform>,
    mut commands: Commands,
    mut status_events: EventWriter<LoadStatusChanged>,
    mut errors: EventWriter<ViewerErrorEvent>,
) {
    let Some(load) = pending.current.as_ref() else {
        return;
    };

    if !lifecycle.is_current(&load.ticket) {
        debug!(
            "Dropping stale load of {}",
            load.ticket.source().display_uri()
        );
        pending.current = None;
        return;
    }

    let outcome = match &load.progress {
        LoadProgress::Rejected(reason) => Err(reason.clone()),
        LoadProgress::Fetching(handle) => match fetch_state(&asset_server, handle) {
            Some(Ok(())) => loaded_gltf(handle, &gltfs),
            Some(Err(reason)) => Err(reason),
            None => return,
        },
    };

    let Some(load) = pending.current.take() else {
        return;
    };
    let uri = load.ticket.source().display_uri().to_string();
    let settled = outcome.as_ref().map(|_| ()).map_err(Clone::clone);

    match lifecycle.complete(&load.ticket, settled) {
        Completion::Applied(status) => {
            let transform = model_transform.to_transform();
            match outcome {
                Ok(loaded) => {
                    let animation = loaded.clip.map(|clip| {
                        let (graph, index) = AnimationGraph::from_clip(clip);
                        AssetAnimation {
                            graph: graphs.add(graph),
                            index,
                        }
                    });
                    let asset = AttachedAsset {
                        source: uri.clone(),
                        gltf: loaded.gltf,
                        scene: loaded.scene,
                        animation,
                    };
                    attach_asset(&mut commands, &mut nodes, asset, transform);
                    remove_placeholder(&mut commands, &mut nodes);
                    info!("✓ Asset loaded: {}", uri);
                }
                Err(reason) => {
                    detach_asset(&mut commands, &mut nodes);
                    show_placeholder(
                        &mut commands,
                        &mut nodes,
                        &mut scene_assets.meshes,
                        &mut scene_assets.materials,
                        transform,
                    );
                    errors.write(ViewerErrorEvent(ViewerError::AssetLoad { uri, reason }));
                }
            }
            status_events.write(LoadStatusChanged(status));
        }
        Completion::Stale | Completion::AfterUnmount => {
            debug!("Discarding completion for {}", uri);
        }
    }
}

fn fetch_state(asset_server: &AssetServer, handle: &Handle<Gltf>) -> Option<Result<(), String>> {
    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        return Some(Err(err.to_string()));
    }
    if let Some(RecursiveDependencyLoadState::Failed(err)) =
        asset_server.get_recursive_dependency_load_state(handle)
    {
        return Some(Err(err.to_string()));
    }
    asset_server
        .is_loaded_with_dependencies(handle)
        .then_some(Ok(()))
}

fn loaded_gltf(handle: &Handle<Gltf>, gltfs: &Assets<Gltf>) -> Result<LoadedGltf, String> {
    let gltf = gltfs
        .get(handle)
        .ok_or_else(|| "asset finished loading but is not a glTF".to_string())?;
    let scene = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
        .ok_or_else(|| "asset contains no scenes".to_string())?;
    Ok(LoadedGltf {
        gltf: handle.clone(),
        scene,
        clip: gltf.animations.first().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::placeholder::PlaceholderNode;
    use crate::engine::viewer::asset_source::AssetSource;
    use crate::engine::viewer::config::{SurfaceSize, SurfaceTarget, ViewerConfiguration};
    use crate::engine::viewer::lifecycle::LoadRequest;
    use crate::engine::viewer::status::LoadStatus;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .init_asset::<AnimationGraph>()
            .init_asset::<AnimationClip>()
            .init_asset::<Scene>()
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_resource::<PendingLoads>()
            .init_resource::<ViewerLifecycle>()
            .init_resource::<SceneNodes>()
            .init_resource::<ModelTransform>()
            .add_event::<LoadStatusChanged>()
            .add_event::<ViewerErrorEvent>()
            .add_systems(Update, poll_pending_loads);

        let config = ViewerConfiguration {
            asset_source: AssetSource::None,
            container: SurfaceTarget::new(SurfaceSize::new(800.0, 600.0)),
        };
        app.world_mut()
            .resource_mut::<ViewerLifecycle>()
            .mount(config)
            .unwrap();
        app
    }

    fn request(app: &mut App, uri: &str) -> LoadTicket {
        let request = app
            .world_mut()
            .resource_mut::<ViewerLifecycle>()
            .request_load(AssetSource::from_uri(uri))
            .unwrap();
        match request {
            LoadRequest::Started(ticket) => ticket,
            LoadRequest::Cleared => panic!("expected a started load"),
        }
    }

    fn begin(app: &mut App, ticket: LoadTicket) {
        app.world_mut()
            .resource_scope(|world, mut pending: Mut<PendingLoads>| {
                pending.begin(ticket, world.resource::<AssetServer>());
            });
    }

    fn placeholder_count(app: &mut App) -> usize {
        app.world_mut()
            .query_filtered::<Entity, With<PlaceholderNode>>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn test_rejected_source_fails_with_placeholder() {
        let mut app = test_app();
        let ticket = request(&mut app, "models/chair.obj");
        begin(&mut app, ticket);
        app.update();

        let status = app.world().resource::<ViewerLifecycle>().status().clone();
        assert!(matches!(status, LoadStatus::Failed(ref reason) if reason.contains(".obj")));
        assert_eq!(placeholder_count(&mut app), 1);
        assert!(app.world().resource::<PendingLoads>().is_idle());

        let errors = app.world().resource::<Events<ViewerErrorEvent>>();
        let mut cursor = errors.get_cursor();
        let reported: Vec<_> = cursor.read(errors).collect();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].0.kind(), "asset_load");

        let statuses = app.world().resource::<Events<LoadStatusChanged>>();
        let mut cursor = statuses.get_cursor();
        assert_eq!(cursor.read(statuses).count(), 1);
    }

    #[test]
    fn test_superseded_ticket_is_dropped_without_effect() {
        let mut app = test_app();
        let first = request(&mut app, "models/old.obj");
        let _second = request(&mut app, "models/new.obj");
        begin(&mut app, first);
        app.update();

        assert_eq!(
            app.world().resource::<ViewerLifecycle>().status(),
            &LoadStatus::Loading
        );
        assert_eq!(placeholder_count(&mut app), 0);
        assert!(app.world().resource::<PendingLoads>().is_idle());
    }

    #[test]
    fn test_unmount_discards_in_flight_load() {
        let mut app = test_app();
        let ticket = request(&mut app, "models/chair.obj");
        begin(&mut app, ticket);
        app.world_mut().resource_mut::<ViewerLifecycle>().unmount();
        app.update();

        assert_eq!(placeholder_count(&mut app), 0);
        let errors = app.world().resource::<Events<ViewerErrorEvent>>();
        assert!(errors.is_empty());
    }
}
