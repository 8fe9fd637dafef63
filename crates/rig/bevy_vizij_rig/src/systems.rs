use bevy::prelude::*;
use vizij_rig_core::{NodeId, PoseStream, Rig};

use crate::components::{VizijBindingHint, VizijRigRoot};
use crate::resources::{PendingRigConfig, RigBindingIndex, VizijRig};

/// Local transforms and hierarchy links read and written by rig evaluation.
pub type PoseQuery<'w, 's> = Query<'w, 's, (&'static mut Transform, Option<&'static Parent>)>;

/// [`PoseStream`] over entity `Transform`s.
///
/// World values are composed from local transforms through `Parent` links on
/// demand, so writes made earlier in the same evaluation are visible to later
/// reads without waiting for transform propagation.
pub struct EcsPoseStream<'a, 'w, 's> {
    transforms: &'a mut PoseQuery<'w, 's>,
    index: &'a RigBindingIndex,
}

impl<'a, 'w, 's> EcsPoseStream<'a, 'w, 's> {
    pub fn new(transforms: &'a mut PoseQuery<'w, 's>, index: &'a RigBindingIndex) -> Self {
        Self { transforms, index }
    }

    fn local(&self, node: NodeId) -> Option<Transform> {
        let entity = self.index.entity(node)?;
        self.transforms.get(entity).ok().map(|(tf, _)| *tf)
    }

    fn parent(&self, entity: Entity) -> Option<Entity> {
        self.transforms
            .get(entity)
            .ok()
            .and_then(|(_, parent)| parent.map(Parent::get))
    }

    /// World transform of `entity`, or identity when it has no `Transform`.
    fn world(&self, entity: Entity) -> Transform {
        let Ok((tf, parent)) = self.transforms.get(entity) else {
            return Transform::IDENTITY;
        };
        match parent {
            Some(p) => self.world(p.get()).mul_transform(*tf),
            None => *tf,
        }
    }

    fn parent_world(&self, entity: Entity) -> Transform {
        self.parent(entity)
            .map_or(Transform::IDENTITY, |p| self.world(p))
    }

    fn with_local(&mut self, node: NodeId, f: impl FnOnce(&mut Transform)) {
        let Some(entity) = self.index.entity(node) else {
            return;
        };
        if let Ok((mut tf, _)) = self.transforms.get_mut(entity) {
            f(&mut tf);
        }
    }
}

#[inline]
fn safe_recip(v: Vec3) -> Vec3 {
    let r = |c: f32| if c == 0.0 { 0.0 } else { c.recip() };
    Vec3::new(r(v.x), r(v.y), r(v.z))
}

impl PoseStream for EcsPoseStream<'_, '_, '_> {
    fn local_position(&self, node: NodeId) -> Vec3 {
        self.local(node).map_or(Vec3::ZERO, |tf| tf.translation)
    }

    fn set_local_position(&mut self, node: NodeId, position: Vec3) {
        self.with_local(node, |tf| tf.translation = position);
    }

    fn local_rotation(&self, node: NodeId) -> Quat {
        self.local(node).map_or(Quat::IDENTITY, |tf| tf.rotation)
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: Quat) {
        self.with_local(node, |tf| tf.rotation = rotation);
    }

    fn position(&self, node: NodeId) -> Vec3 {
        self.index
            .entity(node)
            .map_or(Vec3::ZERO, |e| self.world(e).translation)
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) {
        let Some(entity) = self.index.entity(node) else {
            return;
        };
        let parent = self.parent_world(entity);
        let local =
            safe_recip(parent.scale) * (parent.rotation.inverse() * (position - parent.translation));
        self.set_local_position(node, local);
    }

    fn rotation(&self, node: NodeId) -> Quat {
        self.index
            .entity(node)
            .map_or(Quat::IDENTITY, |e| self.world(e).rotation)
    }

    fn set_rotation(&mut self, node: NodeId, rotation: Quat) {
        let Some(entity) = self.index.entity(node) else {
            return;
        };
        let parent = self.parent_world(entity);
        self.set_local_rotation(node, (parent.rotation.inverse() * rotation).normalize());
    }
}

/// Walks descendants under each `VizijRigRoot` and rebuilds the
/// `RigBindingIndex` from entity names (or `VizijBindingHint` overrides).
pub fn build_binding_index_system(
    roots: Query<Entity, With<VizijRigRoot>>,
    children: Query<&Children>,
    names: Query<(Option<&Name>, Option<&VizijBindingHint>)>,
    mut index: ResMut<RigBindingIndex>,
) {
    fn walk(
        e: Entity,
        index: &mut RigBindingIndex,
        names: &Query<(Option<&Name>, Option<&VizijBindingHint>)>,
        children: &Query<&Children>,
    ) {
        if let Ok((name, hint)) = names.get(e) {
            let key = hint
                .map(|h| h.name.clone())
                .or_else(|| name.map(|n| n.as_str().to_string()));
            if let Some(key) = key {
                if !index.insert(key.clone(), e) {
                    debug!("rig binding: duplicate name '{key}' on {e:?} ignored");
                }
            }
        }
        if let Ok(cs) = children.get(e) {
            for &c in cs.iter() {
                walk(c, index, names, children);
            }
        }
    }

    // Bypass change detection; the index is rebuilt every frame.
    let index = index.bypass_change_detection();
    index.clear();
    for root in roots.iter() {
        walk(root, index, &names, &children);
    }
}

/// Binds a pending rig description against the binding index once it has
/// entries. The previous rig is torn down when the new one binds.
pub fn bind_pending_rig_system(
    mut pending: ResMut<PendingRigConfig>,
    mut index: ResMut<RigBindingIndex>,
    mut rig: ResMut<VizijRig>,
) {
    if pending.0.is_none() || index.is_empty() {
        return;
    }
    let Some(data) = pending.0.take() else {
        return;
    };
    match Rig::from_data(&data, &mut *index) {
        Ok(bound) => {
            info!(
                "rig {:?} bound with {} constraint(s)",
                data.name.as_deref().unwrap_or("<unnamed>"),
                bound.len()
            );
            std::mem::replace(&mut rig.rig, bound).teardown();
            rig.last_error = None;
        }
        Err(err) => {
            warn!("rig bind failed: {err}");
            rig.last_error = Some(err);
        }
    }
}

/// Evaluate the bound rig against entity transforms.
pub fn evaluate_rig_system(
    rig: Res<VizijRig>,
    index: Res<RigBindingIndex>,
    mut transforms: PoseQuery,
) {
    if rig.rig.is_empty() {
        return;
    }
    let mut stream = EcsPoseStream::new(&mut transforms, &index);
    rig.rig.evaluate(&mut stream);
}
