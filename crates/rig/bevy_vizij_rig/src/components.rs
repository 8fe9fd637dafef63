use bevy::prelude::*;

/// Marker component designating the root of a subtree whose named entities
/// rig references resolve against. The binding system walks descendants of
/// every entity carrying this marker.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct VizijRigRoot;

/// Optional per-entity override for the reference name.
/// When present, this name is registered instead of the entity's `Name`.
#[derive(Component, Debug, Clone)]
pub struct VizijBindingHint {
    pub name: String,
}
