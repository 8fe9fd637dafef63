//! In-memory pose graph.
//!
//! `PoseBuffer` is a small named transform hierarchy implementing both
//! [`PoseStream`] and [`TransformResolver`]. It serves as the host for tests,
//! benches and headless tools; engine adapters provide their own streams.
//!
//! Nodes are stored in insertion order and a parent must exist before its
//! children, so the hierarchy is acyclic by construction. Reads of unknown
//! nodes return the identity transform and writes to them are ignored.

use glam::{Quat, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::RigError;
use crate::handle::{NodeId, PoseStream, TransformResolver};

/// Parent-relative TRS.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            ..Self::default()
        }
    }
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Serialized node for building a [`PoseBuffer`] from JSON.
/// Rotation is a quaternion `[x, y, z, w]`; parents are referenced by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseNodeData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl From<&PoseNodeData> for LocalTransform {
    fn from(n: &PoseNodeData) -> Self {
        Self {
            translation: Vec3::from_array(n.translation),
            rotation: Quat::from_array(n.rotation).normalize(),
            scale: Vec3::from_array(n.scale),
        }
    }
}

#[derive(Clone, Debug)]
struct PoseNode {
    name: String,
    parent: Option<NodeId>,
    local: LocalTransform,
}

#[derive(Clone, Debug, Default)]
pub struct PoseBuffer {
    nodes: Vec<PoseNode>,
    by_name: HashMap<String, NodeId>,
}

#[inline]
fn safe_recip(v: Vec3) -> Vec3 {
    let r = |c: f32| if c == 0.0 { 0.0 } else { c.recip() };
    Vec3::new(r(v.x), r(v.y), r(v.z))
}

impl PoseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Names must be unique; `parent` must already exist.
    pub fn add_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        local: LocalTransform,
    ) -> Result<NodeId, RigError> {
        if self.by_name.contains_key(name) {
            return Err(RigError::DuplicateNode(name.to_string()));
        }
        if let Some(p) = parent {
            if self.node(p).is_none() {
                return Err(RigError::UnknownNode(p));
            }
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(PoseNode {
            name: name.to_string(),
            parent,
            local,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Build from serialized nodes. Parents must precede their children.
    pub fn from_node_data(nodes: &[PoseNodeData]) -> Result<Self, RigError> {
        let mut pose = Self::new();
        for n in nodes {
            let parent = match &n.parent {
                Some(name) => Some(
                    pose.find(name)
                        .ok_or_else(|| RigError::UnknownParent(name.clone()))?,
                ),
                None => None,
            };
            pose.add_node(&n.name, parent, n.into())?;
        }
        Ok(pose)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn local(&self, node: NodeId) -> Option<&LocalTransform> {
        self.node(node).map(|n| &n.local)
    }

    pub fn set_local(&mut self, node: NodeId, local: LocalTransform) {
        if let Some(n) = self.node_mut(node) {
            n.local = local;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    fn node(&self, node: NodeId) -> Option<&PoseNode> {
        self.nodes.get(node.0 as usize)
    }

    #[inline]
    fn node_mut(&mut self, node: NodeId) -> Option<&mut PoseNode> {
        self.nodes.get_mut(node.0 as usize)
    }

    /// World (translation, rotation, scale) of a node, or identity for roots'
    /// parents and unknown nodes.
    fn world(&self, node: Option<NodeId>) -> (Vec3, Quat, Vec3) {
        let Some(n) = node.and_then(|id| self.node(id)) else {
            return (Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
        };
        let (pp, pr, ps) = self.world(n.parent);
        let l = &n.local;
        (
            pp + pr * (ps * l.translation),
            pr * l.rotation,
            ps * l.scale,
        )
    }
}

impl PoseStream for PoseBuffer {
    fn local_position(&self, node: NodeId) -> Vec3 {
        self.node(node).map_or(Vec3::ZERO, |n| n.local.translation)
    }

    fn set_local_position(&mut self, node: NodeId, position: Vec3) {
        if let Some(n) = self.node_mut(node) {
            n.local.translation = position;
        }
    }

    fn local_rotation(&self, node: NodeId) -> Quat {
        self.node(node).map_or(Quat::IDENTITY, |n| n.local.rotation)
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: Quat) {
        if let Some(n) = self.node_mut(node) {
            n.local.rotation = rotation;
        }
    }

    fn position(&self, node: NodeId) -> Vec3 {
        self.world(Some(node)).0
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) {
        let Some(parent) = self.node(node).map(|n| n.parent) else {
            return;
        };
        let (pp, pr, ps) = self.world(parent);
        let local = safe_recip(ps) * (pr.inverse() * (position - pp));
        self.set_local_position(node, local);
    }

    fn rotation(&self, node: NodeId) -> Quat {
        self.world(Some(node)).1
    }

    fn set_rotation(&mut self, node: NodeId, rotation: Quat) {
        let Some(parent) = self.node(node).map(|n| n.parent) else {
            return;
        };
        let (_, pr, _) = self.world(parent);
        self.set_local_rotation(node, (pr.inverse() * rotation).normalize());
    }
}

impl TransformResolver for PoseBuffer {
    fn resolve(&mut self, reference: &str) -> Option<NodeId> {
        self.find(reference)
    }
}
