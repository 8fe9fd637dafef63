//! Bevy adapter for `vizij-rig-core`.
//!
//! Entities under a [`VizijRigRoot`] are indexed by `Name`; a rig description
//! placed in [`PendingRigConfig`] binds against that index and is evaluated
//! every frame in `PostUpdate`, before transform propagation, so rig writes
//! land in the same frame's `GlobalTransform`s.

use bevy::prelude::*;
use bevy::transform::TransformSystem;
use std::collections::HashMap;
use vizij_rig_core::{LocalTransform, PoseNodeData, RigError};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::{VizijBindingHint, VizijRigRoot};
pub use resources::{PendingRigConfig, RigBindingIndex, VizijRig};
pub use systems::{EcsPoseStream, PoseQuery};

/// Ordering for the adapter's systems inside `PostUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum VizijRigSet {
    /// Rebuild the binding index and bind any pending rig.
    Bind,
    /// Evaluate constraints into `Transform`s.
    Evaluate,
}

pub struct VizijRigPlugin;

impl Plugin for VizijRigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VizijRig>()
            .init_resource::<PendingRigConfig>()
            .init_resource::<RigBindingIndex>()
            .configure_sets(
                PostUpdate,
                (VizijRigSet::Bind, VizijRigSet::Evaluate)
                    .chain()
                    .before(TransformSystem::TransformPropagate),
            )
            .add_systems(
                PostUpdate,
                (
                    systems::build_binding_index_system,
                    systems::bind_pending_rig_system,
                )
                    .chain()
                    .in_set(VizijRigSet::Bind),
            )
            .add_systems(
                PostUpdate,
                systems::evaluate_rig_system.in_set(VizijRigSet::Evaluate),
            );
    }
}

pub fn to_bevy_transform(local: &LocalTransform) -> Transform {
    Transform {
        translation: local.translation,
        rotation: local.rotation,
        scale: local.scale,
    }
}

/// Spawn a serialized skeleton as named entities under `root`.
/// Returns name -> entity. Parents must precede their children.
pub fn spawn_pose_hierarchy(
    world: &mut World,
    root: Entity,
    nodes: &[PoseNodeData],
) -> Result<HashMap<String, Entity>, RigError> {
    let mut spawned: HashMap<String, Entity> = HashMap::new();
    for node in nodes {
        if spawned.contains_key(&node.name) {
            return Err(RigError::DuplicateNode(node.name.clone()));
        }
        let parent = match &node.parent {
            Some(name) => *spawned
                .get(name)
                .ok_or_else(|| RigError::UnknownParent(name.clone()))?,
            None => root,
        };
        let local = LocalTransform::from(node);
        let entity = world
            .spawn((
                Name::new(node.name.clone()),
                to_bevy_transform(&local),
                GlobalTransform::default(),
            ))
            .id();
        world.entity_mut(parent).add_child(entity);
        spawned.insert(node.name.clone(), entity);
    }
    Ok(spawned)
}
