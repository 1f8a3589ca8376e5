use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;

use super::ViewerNode;
use crate::engine::camera::orbit_camera::OrbitController;
use crate::engine::config::viewer_settings::ViewerSettings;
use constants::render_settings::*;

#[derive(Component)]
pub struct ViewerCamera;

#[derive(Component)]
pub struct GroundGrid;

/// Camera, lights and ground grid: everything the viewer shows besides the model.
pub fn spawn_scene_rig(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    settings: &ViewerSettings,
    aspect_ratio: f32,
) -> Vec<Entity> {
    let mut rig = vec![spawn_camera(commands, settings, aspect_ratio)];
    rig.extend(spawn_lighting(commands));
    rig.push(spawn_ground_grid(commands, meshes, materials));
    rig
}

fn spawn_camera(commands: &mut Commands, settings: &ViewerSettings, aspect_ratio: f32) -> Entity {
    let camera = &settings.camera;
    let eye = Vec3::from_array(camera.position);
    let orbit = OrbitController::from_eye(eye, Vec3::ZERO, settings.orbit.clone());

    commands
        .spawn((
            Name::new("Viewer Camera"),
            Camera3d::default(),
            // Transparent clear so the camera feed behind the canvas shows through.
            Camera {
                clear_color: ClearColorConfig::Custom(Color::NONE),
                ..default()
            },
            Projection::from(PerspectiveProjection {
                fov: camera.fov_degrees.to_radians(),
                near: camera.near,
                far: camera.far,
                aspect_ratio,
            }),
            Transform::from_translation(eye).looking_at(Vec3::ZERO, Vec3::Y),
            orbit,
            ViewerCamera,
            ViewerNode,
        ))
        .id()
}

fn spawn_lighting(commands: &mut Commands) -> [Entity; 3] {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });

    let key = commands
        .spawn((
            Name::new("Key Light"),
            DirectionalLight {
                illuminance: KEY_LIGHT_ILLUMINANCE,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_translation(KEY_LIGHT_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
            ViewerNode,
        ))
        .id();
    let fill = commands
        .spawn((
            Name::new("Fill Light"),
            DirectionalLight {
                illuminance: FILL_LIGHT_ILLUMINANCE,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(FILL_LIGHT_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
            ViewerNode,
        ))
        .id();
    let sky = commands
        .spawn((
            Name::new("Sky Light"),
            DirectionalLight {
                illuminance: SKY_LIGHT_ILLUMINANCE,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            ViewerNode,
        ))
        .id();
    [key, fill, sky]
}

fn spawn_ground_grid(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Entity {
    let grid_material = materials.add(StandardMaterial {
        base_color: GRID_COLOUR,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    commands
        .spawn((
            Name::new("Ground Grid"),
            Mesh3d(meshes.add(create_grid_mesh(GRID_HALF_EXTENT, GRID_CELL_SIZE))),
            MeshMaterial3d(grid_material),
            Visibility::Visible,
            NoFrustumCulling,
            Transform::IDENTITY,
            GroundGrid,
            ViewerNode,
        ))
        .id()
}

/// Flat line-list grid on the XZ plane centred at the origin.
pub fn create_grid_mesh(half_extent: f32, cell_size: f32) -> Mesh {
    let line_count = ((half_extent * 2.0) / cell_size).round().max(1.0) as u32;
    let spacing = (half_extent * 2.0) / line_count as f32;

    let mut vertices = Vec::with_capacity(((line_count + 1) * 4) as usize);
    let mut indices = Vec::with_capacity(((line_count + 1) * 4) as usize);

    for i in 0..=line_count {
        let offset = -half_extent + i as f32 * spacing;
        // Line along Z at fixed X, then along X at fixed Z.
        vertices.push([offset, 0.0, -half_extent]);
        vertices.push([offset, 0.0, half_extent]);
        vertices.push([-half_extent, 0.0, offset]);
        vertices.push([half_extent, 0.0, offset]);
    }
    for i in 0..vertices.len() as u32 {
        indices.push(i);
    }

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
