//! Scene graph owned by the viewer.
//!
//! Every entity the viewer spawns carries [`ViewerNode`] so teardown can
//! release the whole scene in one pass. [`SceneNodes`] tracks the two
//! swappable nodes: the placeholder and the loaded asset.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Model node, animation playback and the user transform.
pub mod model;

/// Fallback box shown while nothing is loaded.
pub mod placeholder;

/// Camera, lights and ground grid.
pub mod rig;

/// Resource release on unmount.
pub mod teardown;

#[derive(Component)]
pub struct ViewerNode;

/// Nodes whose transform follows [`model::ModelTransform`].
#[derive(Component)]
pub struct ModelTarget;

#[derive(Resource, Default, Debug)]
pub struct SceneNodes {
    pub rig: Vec<Entity>,
    pub placeholder: Option<Entity>,
    pub asset: Option<Entity>,
}

/// Mesh and material stores for nodes the viewer builds itself.
#[derive(SystemParam)]
pub struct SceneAssets<'w> {
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
}
