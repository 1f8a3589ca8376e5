use std::collections::HashSet;

use bevy::prelude::*;

use super::{SceneNodes, ViewerNode};

/// Despawn every viewer-owned entity. Entities spawned earlier in the same
/// frame aren't visible to queries yet, so the tracked ids are included too.
pub fn dispose_scene(
    commands: &mut Commands,
    nodes: &mut SceneNodes,
    owned: &Query<Entity, With<ViewerNode>>,
) -> usize {
    let mut doomed: HashSet<Entity> = owned.iter().collect();
    doomed.extend(nodes.rig.drain(..));
    doomed.extend(nodes.placeholder.take());
    doomed.extend(nodes.asset.take());

    for entity in &doomed {
        commands.entity(*entity).try_despawn();
    }
    commands.insert_resource(AmbientLight::default());
    doomed.len()
}
