use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;

use super::{ModelTarget, SceneNodes, ViewerNode};
use constants::controls::{DEFAULT_SCALE, POSITION_RANGE, SCALE_RANGE};

/// Root of a loaded asset. Holding the glTF handle keeps its meshes,
/// materials and textures alive exactly as long as the node.
#[derive(Component)]
pub struct AssetNode {
    pub source: String,
    _gltf: Handle<Gltf>,
}

/// First animation clip of the asset, played once the scene instance is ready.
#[derive(Component, Clone)]
pub struct AssetAnimation {
    pub graph: Handle<AnimationGraph>,
    pub index: AnimationNodeIndex,
}

/// Scale and position set from the host's sliders.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub scale: f32,
    pub position: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            position: Vec3::ZERO,
        }
    }
}

impl ModelTransform {
    pub fn with_updates(self, scale: Option<f32>, position: Option<Vec3>) -> Self {
        let scale = scale.map_or(self.scale, |s| SCALE_RANGE.apply(s));
        let position = position.map_or(self.position, |p| {
            Vec3::new(
                POSITION_RANGE.apply(p.x),
                POSITION_RANGE.apply(p.y),
                POSITION_RANGE.apply(p.z),
            )
        });
        Self { scale, position }
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position).with_scale(Vec3::splat(self.scale))
    }
}

pub struct AttachedAsset {
    pub source: String,
    pub gltf: Handle<Gltf>,
    pub scene: Handle<Scene>,
    pub animation: Option<AssetAnimation>,
}

/// Swap the asset node. The previous node is despawned in the same command
/// flush, so the two are never in the scene together.
pub fn attach_asset(
    commands: &mut Commands,
    nodes: &mut SceneNodes,
    asset: AttachedAsset,
    transform: Transform,
) -> Entity {
    detach_asset(commands, nodes);

    let mut entity = commands.spawn((
        Name::new(format!("Asset {}", asset.source)),
        SceneRoot(asset.scene),
        transform,
        AssetNode {
            source: asset.source,
            _gltf: asset.gltf,
        },
        ModelTarget,
        ViewerNode,
    ));
    if let Some(animation) = asset.animation {
        entity.insert(animation).observe(play_first_clip);
    }

    let id = entity.id();
    nodes.asset = Some(id);
    id
}

pub fn detach_asset(commands: &mut Commands, nodes: &mut SceneNodes) -> bool {
    let Some(entity) = nodes.asset.take() else {
        return false;
    };
    commands.entity(entity).despawn();
    true
}

fn play_first_clip(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    animations: Query<&AssetAnimation>,
    children: Query<&Children>,
    mut players: Query<&mut AnimationPlayer>,
) {
    let root = trigger.target();
    let Ok(animation) = animations.get(root) else {
        return;
    };

    for child in children.iter_descendants(root) {
        if let Ok(mut player) = players.get_mut(child) {
            player.play(animation.index).repeat();
            commands
                .entity(child)
                .insert(AnimationGraphHandle(animation.graph.clone()));
        }
    }
}

pub fn apply_model_transform(
    model_transform: Res<ModelTransform>,
    mut targets: Query<&mut Transform, With<ModelTarget>>,
) {
    let target = model_transform.to_transform();
    for mut transform in &mut targets {
        if *transform != target {
            *transform = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_are_clamped_to_slider_ranges() {
        let updated =
            ModelTransform::default().with_updates(Some(9.0), Some(Vec3::new(-7.0, 0.26, 5.0)));
        assert_eq!(updated.scale, 5.0);
        assert_eq!(updated.position.x, -5.0);
        assert!((updated.position.y - 0.3).abs() < 1e-4);
        assert_eq!(updated.position.z, 5.0);
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let base = ModelTransform::default().with_updates(Some(2.0), None);
        let moved = base.with_updates(None, Some(Vec3::new(1.0, 0.0, -3.0)));
        assert!((moved.scale - 2.0).abs() < 1e-4);
        assert!((moved.position.z + 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_transform_applied_to_targets() {
        let mut app = App::new();
        app.insert_resource(ModelTransform {
            scale: 2.0,
            position: Vec3::new(1.0, 0.0, 0.0),
        })
        .add_systems(Update, apply_model_transform);

        let target = app
            .world_mut()
            .spawn((Transform::IDENTITY, ModelTarget))
            .id();
        let other = app.world_mut().spawn(Transform::IDENTITY).id();
        app.update();

        let transform = app.world().get::<Transform>(target).unwrap();
        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(transform.scale, Vec3::splat(2.0));
        assert_eq!(app.world().get::<Transform>(other).unwrap(), &Transform::IDENTITY);
    }
}
