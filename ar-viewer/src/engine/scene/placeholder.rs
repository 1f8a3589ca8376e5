use bevy::prelude::*;

use super::{ModelTarget, SceneNodes, ViewerNode};
use constants::render_settings::{PLACEHOLDER_COLOUR, PLACEHOLDER_SIZE};

#[derive(Component)]
pub struct PlaceholderNode;

/// Spawn the placeholder box unless one is already in the scene.
pub fn show_placeholder(
    commands: &mut Commands,
    nodes: &mut SceneNodes,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    transform: Transform,
) -> bool {
    if nodes.placeholder.is_some() {
        return false;
    }

    let size = PLACEHOLDER_SIZE;
    let entity = commands
        .spawn((
            Name::new("Placeholder"),
            Mesh3d(meshes.add(Cuboid::new(size, size, size))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: PLACEHOLDER_COLOUR,
                alpha_mode: AlphaMode::Blend,
                ..default()
            })),
            transform,
            PlaceholderNode,
            ModelTarget,
            ViewerNode,
        ))
        .id();
    nodes.placeholder = Some(entity);
    true
}

/// Despawning drops the mesh and material handles, which frees their GPU copies.
pub fn remove_placeholder(commands: &mut Commands, nodes: &mut SceneNodes) -> bool {
    let Some(entity) = nodes.placeholder.take() else {
        return false;
    };
    commands.entity(entity).despawn();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_resource::<SceneNodes>();
        app
    }

    fn show(world: &mut World) -> bool {
        world.resource_scope(|world, mut nodes: Mut<SceneNodes>| {
            world.resource_scope(|world, mut meshes: Mut<Assets<Mesh>>| {
                world.resource_scope(|world, mut materials: Mut<Assets<StandardMaterial>>| {
                    let mut commands = world.commands();
                    show_placeholder(
                        &mut commands,
                        &mut nodes,
                        &mut meshes,
                        &mut materials,
                        Transform::IDENTITY,
                    )
                })
            })
        })
    }

    #[test]
    fn test_placeholder_spawned_once() {
        let mut app = test_app();
        assert!(show(app.world_mut()));
        assert!(!show(app.world_mut()));
        app.world_mut().flush();

        let count = app
            .world_mut()
            .query_filtered::<Entity, With<PlaceholderNode>>()
            .iter(app.world())
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_placeholder_removed_once() {
        let mut app = test_app();
        show(app.world_mut());
        app.world_mut().flush();
        let entity = app.world().resource::<SceneNodes>().placeholder.unwrap();

        let removed = app
            .world_mut()
            .resource_scope(|world, mut nodes: Mut<SceneNodes>| {
                let mut commands = world.commands();
                let first = remove_placeholder(&mut commands, &mut nodes);
                let second = remove_placeholder(&mut commands, &mut nodes);
                (first, second)
            });
        app.world_mut().flush();

        assert_eq!(removed, (true, false));
        assert!(!app.world().entities().contains(entity));
    }
}
