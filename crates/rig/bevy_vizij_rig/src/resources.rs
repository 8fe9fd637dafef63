use bevy::prelude::*;
use std::collections::HashMap;
use vizij_rig_core::{NodeId, Rig, RigData, RigError, TransformResolver};

/// The bound rig evaluated every frame, plus the outcome of the last bind.
#[derive(Resource, Default)]
pub struct VizijRig {
    pub rig: Rig,
    pub last_error: Option<RigError>,
}

/// Rig description waiting to be bound. Consumed by the bind system on the
/// first frame the binding index is non-empty.
#[derive(Resource, Default)]
pub struct PendingRigConfig(pub Option<RigData>);

/// Reference name -> entity for everything under a `VizijRigRoot`.
///
/// Node ids are the entity index, so ids held by a bound rig stay valid
/// across index rebuilds as long as the entity lives.
#[derive(Resource, Default)]
pub struct RigBindingIndex {
    by_name: HashMap<String, Entity>,
    by_node: HashMap<NodeId, Entity>,
}

impl RigBindingIndex {
    pub fn node_id(entity: Entity) -> NodeId {
        NodeId(entity.index())
    }

    /// Register `name`. The first entity registered under a name wins.
    pub fn insert(&mut self, name: String, entity: Entity) -> bool {
        if self.by_name.contains_key(&name) {
            return false;
        }
        self.by_name.insert(name, entity);
        self.by_node.insert(Self::node_id(entity), entity);
        true
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_node.clear();
    }

    pub fn entity(&self, node: NodeId) -> Option<Entity> {
        self.by_node.get(&node).copied()
    }

    pub fn entity_by_name(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl TransformResolver for RigBindingIndex {
    fn resolve(&mut self, reference: &str) -> Option<NodeId> {
        self.entity_by_name(reference).map(Self::node_id)
    }
}
