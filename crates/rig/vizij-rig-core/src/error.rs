//! Setup-time errors. Evaluation itself never fails.

use thiserror::Error;

use crate::handle::NodeId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RigError {
    /// A required transform reference was left empty in the constraint data.
    #[error("{constraint}: required reference '{field}' is not set")]
    MissingReference {
        constraint: &'static str,
        field: &'static str,
    },
    /// A reference was set but the pose graph has no node for it.
    #[error("{constraint}: reference '{field}' -> '{path}' does not resolve")]
    UnresolvedReference {
        constraint: &'static str,
        field: &'static str,
        path: String,
    },
    #[error("rig json parse error: {0}")]
    Parse(String),
    #[error("constraint id '{0}' is already registered")]
    DuplicateConstraint(String),
    #[error("unknown constraint id '{0}'")]
    UnknownConstraint(String),
    /// Two constraints would write the same node in one frame.
    #[error("constraint '{second}' writes node {node:?} already written by '{first}'")]
    ConflictingWriter {
        node: NodeId,
        first: String,
        second: String,
    },
    #[error("pose node '{0}' already exists")]
    DuplicateNode(String),
    #[error("pose node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("pose node parent '{0}' does not exist")]
    UnknownParent(String),
}
