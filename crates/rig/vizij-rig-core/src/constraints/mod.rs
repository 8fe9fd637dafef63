//! Rig constraint variants and the lifecycle they share.
//!
//! Every variant is a pair of authoring data (`*Data`, serde) and a bound job
//! (`*Job`). Jobs are created once by [`RigConstraint::bind`], evaluated once
//! per frame and dropped by [`RigConstraint::teardown`].

pub mod blend_slider;
pub mod foot_roll;
pub mod hand_pose;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::RigError;
use crate::handle::{NodeId, PoseStream, ReadWriteTransformHandle, TransformResolver};
use crate::math::clamp01;

pub use blend_slider::{BlendSliderData, BlendSliderJob};
pub use foot_roll::{FootRollData, FootRollJob};
pub use hand_pose::{Finger, FingerData, HandPoseData, HandPoseJob, RotationRange};

/// Lifecycle hooks a constraint exposes to the host.
pub trait RigConstraint: Sized {
    type Data;

    /// Stable name used in errors and logs.
    const KIND: &'static str;

    /// Check that every required reference is set.
    fn validate(data: &Self::Data) -> Result<(), RigError>;

    /// Resolve references into handles. Runs `validate` first.
    fn bind<R: TransformResolver + ?Sized>(
        data: &Self::Data,
        resolver: &mut R,
    ) -> Result<Self, RigError>;

    /// Per-frame evaluation. `weight` is the blend factor for this frame.
    fn evaluate<S: PoseStream + ?Sized>(&self, stream: &mut S, weight: f32);

    /// Nodes this job writes during evaluation.
    fn write_targets(&self) -> Vec<NodeId>;

    /// Release the job. None of the built-in constraints hold resources.
    fn teardown(self) {}
}

/// Read a slider-type control: clamp local y to [0, 1], write back `(0, t, 0)`
/// and return `t`.
pub(crate) fn normalize_slider<S: PoseStream + ?Sized>(
    handle: &ReadWriteTransformHandle,
    stream: &mut S,
) -> f32 {
    let t = clamp01(handle.local_position(stream).y);
    handle.set_local_position(stream, Vec3::new(0.0, t, 0.0));
    t
}

/// Authoring data for any constraint variant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintData {
    BlendSlider(BlendSliderData),
    FootRoll(FootRollData),
    HandPose(HandPoseData),
}

impl ConstraintData {
    pub fn kind(&self) -> &'static str {
        match self {
            ConstraintData::BlendSlider(_) => BlendSliderJob::KIND,
            ConstraintData::FootRoll(_) => FootRollJob::KIND,
            ConstraintData::HandPose(_) => HandPoseJob::KIND,
        }
    }

    pub fn validate(&self) -> Result<(), RigError> {
        match self {
            ConstraintData::BlendSlider(d) => BlendSliderJob::validate(d),
            ConstraintData::FootRoll(d) => FootRollJob::validate(d),
            ConstraintData::HandPose(d) => HandPoseJob::validate(d),
        }
    }

    pub fn bind<R: TransformResolver + ?Sized>(
        &self,
        resolver: &mut R,
    ) -> Result<ConstraintJob, RigError> {
        Ok(match self {
            ConstraintData::BlendSlider(d) => {
                ConstraintJob::BlendSlider(BlendSliderJob::bind(d, resolver)?)
            }
            ConstraintData::FootRoll(d) => ConstraintJob::FootRoll(FootRollJob::bind(d, resolver)?),
            ConstraintData::HandPose(d) => ConstraintJob::HandPose(HandPoseJob::bind(d, resolver)?),
        })
    }
}

/// Bound job for any constraint variant.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintJob {
    BlendSlider(BlendSliderJob),
    FootRoll(FootRollJob),
    HandPose(HandPoseJob),
}

impl ConstraintJob {
    pub fn kind(&self) -> &'static str {
        match self {
            ConstraintJob::BlendSlider(_) => BlendSliderJob::KIND,
            ConstraintJob::FootRoll(_) => FootRollJob::KIND,
            ConstraintJob::HandPose(_) => HandPoseJob::KIND,
        }
    }

    pub fn evaluate<S: PoseStream + ?Sized>(&self, stream: &mut S, weight: f32) {
        match self {
            ConstraintJob::BlendSlider(job) => job.evaluate(stream, weight),
            ConstraintJob::FootRoll(job) => job.evaluate(stream, weight),
            ConstraintJob::HandPose(job) => job.evaluate(stream, weight),
        }
    }

    pub fn write_targets(&self) -> Vec<NodeId> {
        match self {
            ConstraintJob::BlendSlider(job) => job.write_targets(),
            ConstraintJob::FootRoll(job) => job.write_targets(),
            ConstraintJob::HandPose(job) => job.write_targets(),
        }
    }

    pub fn teardown(self) {
        match self {
            ConstraintJob::BlendSlider(job) => job.teardown(),
            ConstraintJob::FootRoll(job) => job.teardown(),
            ConstraintJob::HandPose(job) => job.teardown(),
        }
    }
}

/// Fail with `MissingReference` for the first empty reference in `fields`.
pub(crate) fn require_references(
    constraint: &'static str,
    fields: &[(&'static str, &str)],
) -> Result<(), RigError> {
    match fields.iter().find(|(_, reference)| reference.is_empty()) {
        Some(&(field, _)) => Err(RigError::MissingReference { constraint, field }),
        None => Ok(()),
    }
}
