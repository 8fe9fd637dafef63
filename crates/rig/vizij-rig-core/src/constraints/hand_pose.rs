//! Hand pose: seven slider controls drive fifteen finger joints.
//!
//! Each finger has its own curl slider; `handle_a` scales every finger's curl
//! and `handle_b` spreads all proximal joints. A joint's X angle is
//! `x_range.at(t_finger * t_a)`; proximal joints also get a Z angle
//! `z_range.at(t_b)`. The resulting Euler delta is composed onto the joint's
//! current local rotation and blended in by weight.
//!
//! Control handles are normalized on every evaluation, including at zero
//! weight; joints are only written when weight > 0.

use serde::{Deserialize, Serialize};

use super::{normalize_slider, require_references, RigConstraint};
use crate::error::RigError;
use crate::handle::{NodeId, PoseStream, ReadWriteTransformHandle, TransformResolver};
use crate::math::{euler_degrees, lerp_f32};

/// Rotation limits in degrees, authored as `[min, max]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct RotationRange {
    pub min: f32,
    pub max: f32,
}

impl RotationRange {
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Angle at parameter `t` (unclamped).
    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        lerp_f32(self.min, self.max, t)
    }
}

impl From<[f32; 2]> for RotationRange {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<RotationRange> for [f32; 2] {
    fn from(r: RotationRange) -> Self {
        [r.min, r.max]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Little,
    ];

    /// Reference field names: handle, proximal, intermediate, distal.
    fn fields(self) -> [&'static str; 4] {
        match self {
            Finger::Thumb => [
                "thumb.handle",
                "thumb.proximal",
                "thumb.intermediate",
                "thumb.distal",
            ],
            Finger::Index => [
                "index.handle",
                "index.proximal",
                "index.intermediate",
                "index.distal",
            ],
            Finger::Middle => [
                "middle.handle",
                "middle.proximal",
                "middle.intermediate",
                "middle.distal",
            ],
            Finger::Ring => [
                "ring.handle",
                "ring.proximal",
                "ring.intermediate",
                "ring.distal",
            ],
            Finger::Little => [
                "little.handle",
                "little.proximal",
                "little.intermediate",
                "little.distal",
            ],
        }
    }
}

/// One finger's references and joint ranges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerData {
    /// Curl slider for this finger.
    pub handle: String,
    pub proximal: String,
    pub intermediate: String,
    pub distal: String,
    #[serde(default)]
    pub proximal_x_range: RotationRange,
    #[serde(default)]
    pub proximal_z_range: RotationRange,
    #[serde(default)]
    pub intermediate_x_range: RotationRange,
    #[serde(default)]
    pub distal_x_range: RotationRange,
}

impl FingerData {
    /// References with zero ranges.
    pub fn new(
        handle: impl Into<String>,
        proximal: impl Into<String>,
        intermediate: impl Into<String>,
        distal: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            proximal: proximal.into(),
            intermediate: intermediate.into(),
            distal: distal.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandPoseData {
    pub thumb: FingerData,
    pub index: FingerData,
    pub middle: FingerData,
    pub ring: FingerData,
    pub little: FingerData,
    /// Shared curl multiplier.
    pub handle_a: String,
    /// Shared proximal spread.
    pub handle_b: String,
}

impl HandPoseData {
    pub fn finger(&self, finger: Finger) -> &FingerData {
        match finger {
            Finger::Thumb => &self.thumb,
            Finger::Index => &self.index,
            Finger::Middle => &self.middle,
            Finger::Ring => &self.ring,
            Finger::Little => &self.little,
        }
    }

    pub fn finger_mut(&mut self, finger: Finger) -> &mut FingerData {
        match finger {
            Finger::Thumb => &mut self.thumb,
            Finger::Index => &mut self.index,
            Finger::Middle => &mut self.middle,
            Finger::Ring => &mut self.ring,
            Finger::Little => &mut self.little,
        }
    }
}

/// A bound finger joint. `z_range` is only set on proximal joints.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointJob {
    pub handle: ReadWriteTransformHandle,
    pub x_range: RotationRange,
    pub z_range: Option<RotationRange>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FingerJob {
    pub handle: ReadWriteTransformHandle,
    /// Proximal, intermediate, distal.
    pub joints: [JointJob; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandPoseJob {
    /// Indexed in `Finger::ALL` order.
    pub fingers: [FingerJob; 5],
    pub handle_a: ReadWriteTransformHandle,
    pub handle_b: ReadWriteTransformHandle,
}

/// Compose the Euler delta for `joint` onto its local rotation and blend it in.
pub fn apply_joint_delta<S: PoseStream + ?Sized>(
    stream: &mut S,
    joint: &JointJob,
    curl: f32,
    spread: f32,
    weight: f32,
) {
    let z = joint.z_range.map_or(0.0, |range| range.at(spread));
    let delta = euler_degrees(joint.x_range.at(curl), 0.0, z);
    let current = joint.handle.local_rotation(stream);
    joint
        .handle
        .set_local_rotation(stream, current.slerp(current * delta, weight));
}

fn bind_finger<R: TransformResolver + ?Sized>(
    finger: Finger,
    data: &FingerData,
    resolver: &mut R,
) -> Result<FingerJob, RigError> {
    let [handle_f, proximal_f, intermediate_f, distal_f] = finger.fields();
    let k = HandPoseJob::KIND;
    let joint = |handle, x_range, z_range| JointJob {
        handle,
        x_range,
        z_range,
    };
    Ok(FingerJob {
        handle: ReadWriteTransformHandle::bind(resolver, k, handle_f, &data.handle)?,
        joints: [
            joint(
                ReadWriteTransformHandle::bind(resolver, k, proximal_f, &data.proximal)?,
                data.proximal_x_range,
                Some(data.proximal_z_range),
            ),
            joint(
                ReadWriteTransformHandle::bind(resolver, k, intermediate_f, &data.intermediate)?,
                data.intermediate_x_range,
                None,
            ),
            joint(
                ReadWriteTransformHandle::bind(resolver, k, distal_f, &data.distal)?,
                data.distal_x_range,
                None,
            ),
        ],
    })
}

impl RigConstraint for HandPoseJob {
    type Data = HandPoseData;

    const KIND: &'static str = "hand_pose";

    fn validate(data: &HandPoseData) -> Result<(), RigError> {
        for finger in Finger::ALL {
            let d = data.finger(finger);
            let [handle_f, proximal_f, intermediate_f, distal_f] = finger.fields();
            require_references(
                Self::KIND,
                &[
                    (handle_f, d.handle.as_str()),
                    (proximal_f, d.proximal.as_str()),
                    (intermediate_f, d.intermediate.as_str()),
                    (distal_f, d.distal.as_str()),
                ],
            )?;
        }
        require_references(
            Self::KIND,
            &[
                ("handle_a", data.handle_a.as_str()),
                ("handle_b", data.handle_b.as_str()),
            ],
        )
    }

    fn bind<R: TransformResolver + ?Sized>(
        data: &HandPoseData,
        resolver: &mut R,
    ) -> Result<Self, RigError> {
        Self::validate(data)?;
        Ok(Self {
            fingers: [
                bind_finger(Finger::Thumb, &data.thumb, resolver)?,
                bind_finger(Finger::Index, &data.index, resolver)?,
                bind_finger(Finger::Middle, &data.middle, resolver)?,
                bind_finger(Finger::Ring, &data.ring, resolver)?,
                bind_finger(Finger::Little, &data.little, resolver)?,
            ],
            handle_a: ReadWriteTransformHandle::bind(
                resolver,
                Self::KIND,
                "handle_a",
                &data.handle_a,
            )?,
            handle_b: ReadWriteTransformHandle::bind(
                resolver,
                Self::KIND,
                "handle_b",
                &data.handle_b,
            )?,
        })
    }

    fn evaluate<S: PoseStream + ?Sized>(&self, stream: &mut S, weight: f32) {
        let mut curls = [0.0f32; 5];
        for (t, finger) in curls.iter_mut().zip(&self.fingers) {
            *t = normalize_slider(&finger.handle, stream);
        }
        let t_a = normalize_slider(&self.handle_a, stream);
        let t_b = normalize_slider(&self.handle_b, stream);

        if weight <= 0.0 {
            return;
        }

        for (finger, t) in self.fingers.iter().zip(curls) {
            for joint in &finger.joints {
                apply_joint_delta(stream, joint, t * t_a, t_b, weight);
            }
        }
    }

    fn write_targets(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(22);
        for finger in &self.fingers {
            nodes.push(finger.handle.node());
            nodes.extend(finger.joints.iter().map(|j| j.handle.node()));
        }
        nodes.push(self.handle_a.node());
        nodes.push(self.handle_b.node());
        nodes
    }
}
