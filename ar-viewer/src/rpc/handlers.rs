use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::web_rpc::RpcError;
use crate::ar::ArCommand;
use crate::ar::camera_stream::{CameraFacing, CameraStreamState};
use crate::ar::catalogue::ModelCatalogue;
use crate::ar::geolocation::LocationState;
use crate::ar::placement::PlacementSession;
use crate::engine::scene::model::ModelTransform;
use crate::engine::viewer::asset_source::{AssetSource, LocalAssetHandle};
use crate::engine::viewer::commands::{MountRequest, ViewerCommand};
use crate::engine::viewer::config::SurfaceSize;
use crate::engine::viewer::errors::ViewerError;
use crate::engine::viewer::lifecycle::ViewerLifecycle;
use crate::engine::viewer::status::LoadStatus;

/// Work a request hands to the rest of the app.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Viewer(ViewerCommand),
    Ar(ArCommand),
}

/// Dispatches are written in order, so a request's effects land before
/// those of the next request in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub dispatches: Vec<Dispatch>,
    pub result: Value,
}

impl Routed {
    fn reply(result: Value) -> Self {
        Self {
            dispatches: Vec::new(),
            result,
        }
    }

    fn queued(method: &str, dispatch: Dispatch) -> Self {
        Self {
            dispatches: vec![dispatch],
            result: json!({ "success": true, "queued": method }),
        }
    }
}

/// What the handlers know about the app. Updated as a batch is routed so
/// later requests see the queued effects of earlier ones.
#[derive(Debug, Clone)]
pub struct RpcSnapshot {
    pub mounted: bool,
    pub status: LoadStatus,
    pub catalogue: ModelCatalogue,
    pub has_selection: bool,
    pub has_fix: bool,
    pub facing: CameraFacing,
    pub model_transform: ModelTransform,
    pub fps: f32,
}

impl RpcSnapshot {
    pub fn apply(&mut self, dispatch: &Dispatch) {
        match dispatch {
            Dispatch::Viewer(
                ViewerCommand::Mount(request) | ViewerCommand::Configure(request),
            ) => {
                self.mounted = true;
                self.status = if request.asset.is_none() {
                    LoadStatus::Idle
                } else {
                    LoadStatus::Loading
                };
            }
            Dispatch::Viewer(ViewerCommand::Unmount) => {
                self.mounted = false;
                self.status = LoadStatus::Idle;
            }
            Dispatch::Viewer(ViewerCommand::LoadAsset(source)) => {
                self.status = if source.is_none() {
                    LoadStatus::Idle
                } else {
                    LoadStatus::Loading
                };
            }
            Dispatch::Viewer(ViewerCommand::SetModelTransform { scale, position }) => {
                self.model_transform = self.model_transform.with_updates(*scale, *position);
            }
            Dispatch::Ar(ArCommand::SelectModel(_)) => self.has_selection = true,
            Dispatch::Ar(ArCommand::FlipCamera) => self.facing = self.facing.flipped(),
            _ => {}
        }
    }
}

#[derive(SystemParam)]
pub struct RpcContext<'w> {
    lifecycle: Res<'w, ViewerLifecycle>,
    catalogue: Res<'w, ModelCatalogue>,
    placement: Res<'w, PlacementSession>,
    location: Res<'w, LocationState>,
    camera: Res<'w, CameraStreamState>,
    model_transform: Res<'w, ModelTransform>,
    diagnostics: Res<'w, DiagnosticsStore>,
    viewer_commands: EventWriter<'w, ViewerCommand>,
    ar_commands: EventWriter<'w, ArCommand>,
}

impl RpcContext<'_> {
    pub fn snapshot(&self) -> RpcSnapshot {
        let fps = self
            .diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
            .unwrap_or(0.0) as f32;

        RpcSnapshot {
            mounted: self.lifecycle.is_mounted(),
            status: self.lifecycle.status().clone(),
            catalogue: self.catalogue.clone(),
            has_selection: self.placement.selected().is_some(),
            has_fix: self.location.fix().is_some(),
            facing: self.camera.facing(),
            model_transform: *self.model_transform,
            fps,
        }
    }

    pub fn dispatch(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Viewer(command) => {
                self.viewer_commands.write(command);
            }
            Dispatch::Ar(command) => {
                self.ar_commands.write(command);
            }
        }
    }
}

/// Map a method and its params onto dispatches and an immediate result.
pub fn route(method: &str, params: &Value, snapshot: &RpcSnapshot) -> Result<Routed, RpcError> {
    match method {
        "mount" => handle_mount(params, snapshot),
        "configure" => {
            let request = parse::<MountParams>(params, "'container' and/or 'asset'")?.into_request();
            Ok(Routed::queued(
                method,
                Dispatch::Viewer(ViewerCommand::Configure(request)),
            ))
        }
        "load_asset" => {
            let params = parse::<LoadAssetParams>(params, "'uri' parameter")?;
            require_mounted(snapshot)?;
            Ok(Routed::queued(
                method,
                Dispatch::Viewer(ViewerCommand::LoadAsset(AssetSource::from_uri(&params.uri))),
            ))
        }
        "load_local_asset" => {
            let handle = parse::<LocalAssetHandleParams>(params, "'object_url' and 'file_name'")?;
            require_mounted(snapshot)?;
            Ok(Routed::queued(
                method,
                Dispatch::Viewer(ViewerCommand::LoadAsset(AssetSource::Local(
                    LocalAssetHandle {
                        object_url: handle.object_url,
                        file_name: handle.file_name,
                    },
                ))),
            ))
        }
        "resize" => {
            let params = parse::<ResizeParams>(params, "'width' and 'height'")?;
            require_mounted(snapshot)?;
            Ok(Routed::queued(
                method,
                Dispatch::Viewer(ViewerCommand::Resize(SurfaceSize::new(
                    params.width,
                    params.height,
                ))),
            ))
        }
        "unmount" => Ok(Routed::queued(method, Dispatch::Viewer(ViewerCommand::Unmount))),
        "get_load_status" => Ok(Routed::reply(json!({
            "mounted": snapshot.mounted,
            "status": snapshot.status,
        }))),
        "set_model_transform" => handle_set_model_transform(params, snapshot),
        "flip_camera" => Ok(Routed {
            dispatches: vec![Dispatch::Ar(ArCommand::FlipCamera)],
            result: json!({ "success": true, "facing": snapshot.facing.flipped() }),
        }),
        "request_camera_permission" => Ok(Routed::queued(
            method,
            Dispatch::Ar(ArCommand::RequestCameraPermission),
        )),
        "get_available_models" => Ok(Routed::reply(json!({
            "models": snapshot.catalogue.models(),
        }))),
        "select_model" => {
            let params = parse::<SelectModelParams>(params, "'id' parameter")?;
            let model = snapshot
                .catalogue
                .find(&params.id)
                .cloned()
                .ok_or_else(|| {
                    RpcError::invalid_params(&ViewerError::UnknownModel(params.id.clone()).to_string())
                })?;
            require_mounted(snapshot)?;
            let load = AssetSource::from_uri(&model.url);
            Ok(Routed {
                result: json!({ "success": true, "model": model }),
                dispatches: vec![
                    Dispatch::Viewer(ViewerCommand::LoadAsset(load)),
                    Dispatch::Ar(ArCommand::SelectModel(model)),
                ],
            })
        }
        "place_model" => {
            if !snapshot.has_selection {
                return Err(rejected(ViewerError::NoModelSelected));
            }
            if !snapshot.has_fix {
                return Err(rejected(ViewerError::MissingLocation));
            }
            Ok(Routed::queued(method, Dispatch::Ar(ArCommand::PlaceModel)))
        }
        "get_fps" => Ok(Routed::reply(json!({ "fps": snapshot.fps }))),
        _ => {
            warn!("Unknown RPC method: {}", method);
            Err(RpcError::method_not_found(method))
        }
    }
}

fn handle_mount(params: &Value, snapshot: &RpcSnapshot) -> Result<Routed, RpcError> {
    let request = parse::<MountParams>(params, "'container' and/or 'asset'")?.into_request();
    if snapshot.mounted {
        return Ok(Routed::reply(json!({
            "success": true,
            "already_mounted": true,
        })));
    }
    Ok(Routed::queued(
        "mount",
        Dispatch::Viewer(ViewerCommand::Mount(request)),
    ))
}

fn handle_set_model_transform(params: &Value, snapshot: &RpcSnapshot) -> Result<Routed, RpcError> {
    let params = parse::<ModelTransformParams>(params, "'scale' and/or 'position'")?;
    let position = params.position.map(PositionParam::into_vec3);
    let applied = snapshot.model_transform.with_updates(params.scale, position);

    Ok(Routed {
        dispatches: vec![Dispatch::Viewer(ViewerCommand::SetModelTransform {
            scale: params.scale,
            position,
        })],
        result: json!({
            "success": true,
            "scale": applied.scale,
            "position": [applied.position.x, applied.position.y, applied.position.z],
        }),
    })
}

fn require_mounted(snapshot: &RpcSnapshot) -> Result<(), RpcError> {
    if snapshot.mounted {
        Ok(())
    } else {
        Err(rejected(ViewerError::NotMounted))
    }
}

/// Operation failures carry the viewer error kind so the host can pick a toast.
fn rejected(error: ViewerError) -> RpcError {
    RpcError {
        data: Some(json!({ "kind": error.kind() })),
        ..RpcError::internal_error(&error.to_string())
    }
}

/// Missing params are treated as an empty object.
fn parse<T: DeserializeOwned>(params: &Value, expected: &str) -> Result<T, RpcError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params(&format!("Expected {expected}: {e}")))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ContainerParams {
    selector: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssetParam {
    Uri(String),
    Local { object_url: String, file_name: String },
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct MountParams {
    container: Option<ContainerParams>,
    asset: Option<AssetParam>,
}

impl MountParams {
    fn into_request(self) -> MountRequest {
        let container = self.container.unwrap_or_default();
        let size = match (container.width, container.height) {
            (Some(width), Some(height)) => Some(SurfaceSize::new(width, height)),
            _ => None,
        };
        let asset = match self.asset {
            None => AssetSource::None,
            Some(AssetParam::Uri(uri)) => AssetSource::from_uri(&uri),
            Some(AssetParam::Local {
                object_url,
                file_name,
            }) => AssetSource::Local(LocalAssetHandle {
                object_url,
                file_name,
            }),
        };
        MountRequest {
            selector: container.selector,
            asset,
            size,
        }
    }
}

#[derive(Deserialize)]
struct LoadAssetParams {
    uri: String,
}

#[derive(Deserialize)]
struct LocalAssetHandleParams {
    object_url: String,
    file_name: String,
}

#[derive(Deserialize)]
struct ResizeParams {
    width: f32,
    height: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PositionParam {
    Array([f32; 3]),
    Object { x: f32, y: f32, z: f32 },
}

impl PositionParam {
    fn into_vec3(self) -> Vec3 {
        match self {
            PositionParam::Array([x, y, z]) | PositionParam::Object { x, y, z } => {
                Vec3::new(x, y, z)
            }
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ModelTransformParams {
    scale: Option<f32>,
    position: Option<PositionParam>,
}

#[derive(Deserialize)]
struct SelectModelParams {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::viewer_settings::ViewerSettings;

    fn snapshot() -> RpcSnapshot {
        RpcSnapshot {
            mounted: true,
            status: LoadStatus::Idle,
            catalogue: ModelCatalogue::from_settings(&ViewerSettings::default()),
            has_selection: false,
            has_fix: false,
            facing: CameraFacing::Environment,
            model_transform: ModelTransform::default(),
            fps: 59.5,
        }
    }

    #[test]
    fn test_mount_parses_container_and_asset() {
        let mut snap = snapshot();
        snap.mounted = false;
        let routed = route(
            "mount",
            &json!({
                "container": {"selector": "#viewer", "width": 800, "height": 600},
                "asset": "models/duck.glb"
            }),
            &snap,
        )
        .unwrap();

        assert_eq!(
            routed.dispatches,
            vec![Dispatch::Viewer(ViewerCommand::Mount(MountRequest {
                selector: Some("#viewer".to_string()),
                asset: AssetSource::Remote("models/duck.glb".to_string()),
                size: Some(SurfaceSize::new(800.0, 600.0)),
            }))]
        );
    }

    #[test]
    fn test_mount_when_mounted_reports_already_mounted() {
        let routed = route("mount", &Value::Null, &snapshot()).unwrap();
        assert!(routed.dispatches.is_empty());
        assert_eq!(routed.result["already_mounted"], true);
    }

    #[test]
    fn test_mount_accepts_local_handle() {
        let mut snap = snapshot();
        snap.mounted = false;
        let routed = route(
            "mount",
            &json!({"asset": {"object_url": "blob:http://localhost/1", "file_name": "a.glb"}}),
            &snap,
        )
        .unwrap();
        let [Dispatch::Viewer(ViewerCommand::Mount(request))] = routed.dispatches.as_slice() else {
            panic!("expected mount");
        };
        assert!(matches!(request.asset, AssetSource::Local(ref h) if h.file_name == "a.glb"));
        assert_eq!(request.size, None);
    }

    #[test]
    fn test_load_requires_mount() {
        let mut snap = snapshot();
        snap.mounted = false;
        let error = route("load_asset", &json!({"uri": "a.glb"}), &snap).unwrap_err();
        assert_eq!(error.code, -32603);
        assert_eq!(error.message, "viewer is not mounted");
        assert_eq!(error.data, Some(json!({"kind": "not_mounted"})));
    }

    #[test]
    fn test_missing_params_are_invalid() {
        let error = route("load_asset", &json!({}), &snapshot()).unwrap_err();
        assert_eq!(error.code, -32602);
        let error = route("resize", &json!({"width": 10}), &snapshot()).unwrap_err();
        assert_eq!(error.code, -32602);
    }

    #[test]
    fn test_set_model_transform_reports_clamped_values() {
        let routed = route(
            "set_model_transform",
            &json!({"scale": 7.5, "position": {"x": 1.0, "y": -9.0, "z": 0.0}}),
            &snapshot(),
        )
        .unwrap();
        assert_eq!(routed.result["scale"], 5.0);
        assert_eq!(routed.result["position"][1], -5.0);
        assert_eq!(
            routed.dispatches,
            vec![Dispatch::Viewer(ViewerCommand::SetModelTransform {
                scale: Some(7.5),
                position: Some(Vec3::new(1.0, -9.0, 0.0)),
            })]
        );
    }

    #[test]
    fn test_select_unknown_model_is_invalid_params() {
        let error = route("select_model", &json!({"id": "teapot"}), &snapshot()).unwrap_err();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("teapot"));
    }

    #[test]
    fn test_select_then_place_needs_location() {
        let mut snap = snapshot();
        let routed = route("select_model", &json!({"id": "duck"}), &snap).unwrap();
        for dispatch in &routed.dispatches {
            snap.apply(dispatch);
        }
        assert_eq!(snap.status, LoadStatus::Loading);

        let error = route("place_model", &Value::Null, &snap).unwrap_err();
        assert_eq!(error.message, "cannot place model: missing location data");

        snap.has_fix = true;
        let routed = route("place_model", &Value::Null, &snap).unwrap();
        assert_eq!(routed.dispatches, vec![Dispatch::Ar(ArCommand::PlaceModel)]);
    }

    #[test]
    fn test_select_model_loads_before_selecting() {
        let routed = route("select_model", &json!({"id": "duck"}), &snapshot()).unwrap();
        let [
            Dispatch::Viewer(ViewerCommand::LoadAsset(source)),
            Dispatch::Ar(ArCommand::SelectModel(model)),
        ] = routed.dispatches.as_slice()
        else {
            panic!("expected load then select, got {:?}", routed.dispatches);
        };
        assert_eq!(model.id, "duck");
        assert_eq!(source, &AssetSource::from_uri(&model.url));
    }

    #[test]
    fn test_place_without_selection() {
        let error = route("place_model", &Value::Null, &snapshot()).unwrap_err();
        assert_eq!(error.data, Some(json!({"kind": "no_model_selected"})));
    }

    #[test]
    fn test_queries_answer_from_snapshot() {
        let snap = snapshot();
        let status = route("get_load_status", &Value::Null, &snap).unwrap();
        assert_eq!(status.result["status"]["state"], "idle");

        let models = route("get_available_models", &Value::Null, &snap).unwrap();
        assert_eq!(models.result["models"].as_array().map(Vec::len), Some(3));

        let fps = route("get_fps", &Value::Null, &snap).unwrap();
        assert_eq!(fps.result["fps"], 59.5);

        let flip = route("flip_camera", &Value::Null, &snap).unwrap();
        assert_eq!(flip.result["facing"], "user");
    }

    #[test]
    fn test_unknown_method() {
        let error = route("dance", &Value::Null, &snapshot()).unwrap_err();
        assert_eq!(error.code, -32601);
    }
}
