//! Vizij Rig Core (engine-agnostic)
//!
//! Procedural rig constraints evaluated once per frame against a host pose
//! graph: a blend slider, a foot roll and a hand pose driver. Hosts provide a
//! [`PoseStream`] and a [`TransformResolver`]; [`Rig`] binds constraint data
//! against them and evaluates the bound jobs in order.

pub mod config;
pub mod constraints;
pub mod data;
pub mod error;
pub mod handle;
pub mod math;
pub mod pose;
pub mod rig;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use constraints::{
    BlendSliderData, BlendSliderJob, ConstraintData, ConstraintJob, Finger, FingerData,
    FootRollData, FootRollJob, HandPoseData, HandPoseJob, RigConstraint, RotationRange,
};
pub use data::{parse_rig_json, ConstraintEntry, RigData};
pub use error::RigError;
pub use glam::{Quat, Vec3};
pub use handle::{
    NodeId, PoseStream, ReadOnlyTransformHandle, ReadWriteTransformHandle, TransformResolver,
};
pub use pose::{LocalTransform, PoseBuffer, PoseNodeData};
pub use rig::{Rig, RigSlot};
