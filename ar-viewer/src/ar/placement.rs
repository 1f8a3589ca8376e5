use bevy::prelude::*;
use serde::Serialize;

use super::ArCommand;
use super::geolocation::{GeoFix, LocationState};
use super::orientation::Trajectory;
use crate::engine::config::viewer_settings::CatalogueModel;
use crate::engine::scene::model::ModelTransform;
use crate::engine::viewer::errors::{ViewerError, ViewerErrorEvent};
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for PlacedPosition {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// A model pinned to a geographic location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedModelData {
    pub model_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub scale: f32,
    pub position: PlacedPosition,
}

#[derive(Resource, Debug, Default)]
pub struct PlacementSession {
    selected: Option<CatalogueModel>,
    placed: Vec<PlacedModelData>,
}

impl PlacementSession {
    pub fn select(&mut self, model: CatalogueModel) {
        self.selected = Some(model);
    }

    pub fn selected(&self) -> Option<&CatalogueModel> {
        self.selected.as_ref()
    }

    pub fn placed(&self) -> &[PlacedModelData] {
        &self.placed
    }

    /// Record a placement at the trajectory position, then return the trajectory to rest.
    pub fn place(
        &mut self,
        fix: Option<&GeoFix>,
        scale: f32,
        trajectory: &mut Trajectory,
    ) -> Result<PlacedModelData, ViewerError> {
        let model = self.selected.as_ref().ok_or(ViewerError::NoModelSelected)?;
        let fix = fix.ok_or(ViewerError::MissingLocation)?;
        let data = PlacedModelData {
            model_url: model.url.clone(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            scale,
            position: trajectory.position.into(),
        };
        trajectory.reset();
        self.placed.push(data.clone());
        Ok(data)
    }
}

/// Selecting a model starts placement mode. The host bridge queues the
/// model's load itself, in request order.
pub fn handle_model_selection(
    mut ar_commands: EventReader<ArCommand>,
    mut session: ResMut<PlacementSession>,
    mut trajectory: ResMut<Trajectory>,
) {
    for command in ar_commands.read() {
        let ArCommand::SelectModel(model) = command else {
            continue;
        };
        info!("Selected model '{}'", model.name);
        session.select(model.clone());
        trajectory.reset();
        trajectory.placing = true;
    }
}

pub fn handle_place_model(
    mut ar_commands: EventReader<ArCommand>,
    mut session: ResMut<PlacementSession>,
    mut trajectory: ResMut<Trajectory>,
    location: Res<LocationState>,
    model_transform: Res<ModelTransform>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut errors: EventWriter<ViewerErrorEvent>,
) {
    for command in ar_commands.read() {
        if *command != ArCommand::PlaceModel {
            continue;
        }
        match session.place(location.fix(), model_transform.scale, &mut trajectory) {
            Ok(data) => {
                info!("Model placed successfully at {:.6}, {:.6}", data.latitude, data.longitude);
                match serde_json::to_value(&data) {
                    Ok(payload) => rpc_interface.send_notification("model_placed", payload),
                    Err(e) => error!("Failed to serialise placement: {}", e),
                }
            }
            Err(err) => {
                errors.write(ViewerErrorEvent(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::viewer::commands::ViewerCommand;

    fn duck() -> CatalogueModel {
        CatalogueModel {
            id: "duck".to_string(),
            name: "Duck".to_string(),
            url: "models/duck.glb".to_string(),
            thumbnail: String::new(),
        }
    }

    fn fix() -> GeoFix {
        GeoFix {
            latitude: 51.5,
            longitude: -0.12,
            accuracy: 5.0,
        }
    }

    #[test]
    fn test_place_without_location_fails() {
        let mut session = PlacementSession::default();
        session.select(duck());
        let mut trajectory = Trajectory::default();

        let err = session.place(None, 1.0, &mut trajectory).unwrap_err();
        assert_eq!(err, ViewerError::MissingLocation);
        assert_eq!(err.to_string(), "cannot place model: missing location data");
        assert!(session.placed().is_empty());
    }

    #[test]
    fn test_place_without_selection_fails() {
        let mut session = PlacementSession::default();
        let mut trajectory = Trajectory::default();
        let err = session.place(Some(&fix()), 1.0, &mut trajectory).unwrap_err();
        assert_eq!(err, ViewerError::NoModelSelected);
    }

    #[test]
    fn test_place_records_trajectory_and_resets_it() {
        let mut session = PlacementSession::default();
        session.select(duck());
        let mut trajectory = Trajectory {
            position: Vec3::new(1.5, -0.5, -2.0),
            placing: true,
        };

        let data = session.place(Some(&fix()), 2.5, &mut trajectory).unwrap();
        assert_eq!(data.model_url, "models/duck.glb");
        assert_eq!(data.latitude, 51.5);
        assert_eq!(data.scale, 2.5);
        assert_eq!(data.position, PlacedPosition { x: 1.5, y: -0.5, z: -2.0 });
        assert_eq!(trajectory, Trajectory { placing: true, ..default() });
        assert_eq!(session.placed().len(), 1);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["position"]["z"], -2.0);
    }

    #[test]
    fn test_selection_starts_placing_without_loading() {
        let mut app = App::new();
        app.init_resource::<PlacementSession>()
            .init_resource::<Trajectory>()
            .add_event::<ArCommand>()
            .add_event::<ViewerCommand>()
            .add_systems(Update, handle_model_selection);
        app.world_mut().resource_mut::<Trajectory>().position = Vec3::ONE;

        app.world_mut().send_event(ArCommand::SelectModel(duck()));
        app.update();

        assert_eq!(
            app.world().resource::<PlacementSession>().selected(),
            Some(&duck())
        );
        assert_eq!(
            *app.world().resource::<Trajectory>(),
            Trajectory { placing: true, ..default() }
        );
        assert!(app.world().resource::<Events<ViewerCommand>>().is_empty());
    }

    #[test]
    fn test_placement_notifies_host() {
        let mut app = App::new();
        app.init_resource::<PlacementSession>()
            .init_resource::<Trajectory>()
            .init_resource::<LocationState>()
            .init_resource::<ModelTransform>()
            .init_resource::<WebRpcInterface>()
            .add_event::<ArCommand>()
            .add_event::<ViewerErrorEvent>()
            .add_systems(Update, handle_place_model);

        app.world_mut().send_event(ArCommand::PlaceModel);
        app.update();
        let errors = app.world().resource::<Events<ViewerErrorEvent>>();
        let mut cursor = errors.get_cursor();
        let kinds: Vec<_> = cursor.read(errors).map(|e| e.0.kind()).collect();
        assert_eq!(kinds, vec!["no_model_selected"]);
        assert!(app
            .world()
            .resource::<WebRpcInterface>()
            .queued_notifications()
            .is_empty());
    }
}
