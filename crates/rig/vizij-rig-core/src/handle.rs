//! Transform handles and the pose-graph traits they are bound against.
//!
//! The host owns the transform hierarchy. Constraints only ever see it through
//! [`PoseStream`] (per-frame reads/writes) and [`TransformResolver`] (one-time
//! binding of reference strings to opaque [`NodeId`]s).
//!
//! Capability is carried by type: [`ReadOnlyTransformHandle`] exposes getters
//! only, [`ReadWriteTransformHandle`] adds setters.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::RigError;

/// Opaque node index in the host pose graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Per-frame transform access provided by the host.
///
/// World-space accessors follow the host's parent chain; local accessors are
/// relative to the node's parent.
pub trait PoseStream {
    fn local_position(&self, node: NodeId) -> Vec3;
    fn set_local_position(&mut self, node: NodeId, position: Vec3);
    fn local_rotation(&self, node: NodeId) -> Quat;
    fn set_local_rotation(&mut self, node: NodeId, rotation: Quat);
    fn position(&self, node: NodeId) -> Vec3;
    fn set_position(&mut self, node: NodeId, position: Vec3);
    fn rotation(&self, node: NodeId) -> Quat;
    fn set_rotation(&mut self, node: NodeId, rotation: Quat);
}

/// Resolves authoring references (node names/paths) to nodes.
/// Hosts implement this and pass it into binding.
pub trait TransformResolver {
    fn resolve(&mut self, reference: &str) -> Option<NodeId>;
}

fn resolve_reference<R: TransformResolver + ?Sized>(
    resolver: &mut R,
    constraint: &'static str,
    field: &'static str,
    reference: &str,
) -> Result<NodeId, RigError> {
    if reference.is_empty() {
        return Err(RigError::MissingReference { constraint, field });
    }
    resolver
        .resolve(reference)
        .ok_or_else(|| RigError::UnresolvedReference {
            constraint,
            field,
            path: reference.to_string(),
        })
}

/// Read-only view of one node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ReadOnlyTransformHandle {
    node: NodeId,
}

impl ReadOnlyTransformHandle {
    pub fn bind<R: TransformResolver + ?Sized>(
        resolver: &mut R,
        constraint: &'static str,
        field: &'static str,
        reference: &str,
    ) -> Result<Self, RigError> {
        resolve_reference(resolver, constraint, field, reference).map(|node| Self { node })
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn local_position<S: PoseStream + ?Sized>(&self, stream: &S) -> Vec3 {
        stream.local_position(self.node)
    }

    #[inline]
    pub fn local_rotation<S: PoseStream + ?Sized>(&self, stream: &S) -> Quat {
        stream.local_rotation(self.node)
    }

    #[inline]
    pub fn position<S: PoseStream + ?Sized>(&self, stream: &S) -> Vec3 {
        stream.position(self.node)
    }

    #[inline]
    pub fn rotation<S: PoseStream + ?Sized>(&self, stream: &S) -> Quat {
        stream.rotation(self.node)
    }
}

/// Read-write view of one node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ReadWriteTransformHandle {
    node: NodeId,
}

impl ReadWriteTransformHandle {
    pub fn bind<R: TransformResolver + ?Sized>(
        resolver: &mut R,
        constraint: &'static str,
        field: &'static str,
        reference: &str,
    ) -> Result<Self, RigError> {
        resolve_reference(resolver, constraint, field, reference).map(|node| Self { node })
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn local_position<S: PoseStream + ?Sized>(&self, stream: &S) -> Vec3 {
        stream.local_position(self.node)
    }

    #[inline]
    pub fn set_local_position<S: PoseStream + ?Sized>(&self, stream: &mut S, position: Vec3) {
        stream.set_local_position(self.node, position);
    }

    #[inline]
    pub fn local_rotation<S: PoseStream + ?Sized>(&self, stream: &S) -> Quat {
        stream.local_rotation(self.node)
    }

    #[inline]
    pub fn set_local_rotation<S: PoseStream + ?Sized>(&self, stream: &mut S, rotation: Quat) {
        stream.set_local_rotation(self.node, rotation);
    }

    #[inline]
    pub fn position<S: PoseStream + ?Sized>(&self, stream: &S) -> Vec3 {
        stream.position(self.node)
    }

    #[inline]
    pub fn set_position<S: PoseStream + ?Sized>(&self, stream: &mut S, position: Vec3) {
        stream.set_position(self.node, position);
    }

    #[inline]
    pub fn rotation<S: PoseStream + ?Sized>(&self, stream: &S) -> Quat {
        stream.rotation(self.node)
    }

    #[inline]
    pub fn set_rotation<S: PoseStream + ?Sized>(&self, stream: &mut S, rotation: Quat) {
        stream.set_rotation(self.node, rotation);
    }
}
