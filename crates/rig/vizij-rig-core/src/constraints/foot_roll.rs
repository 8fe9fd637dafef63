//! Foot roll: a 2-D cursor rolls the foot controller about its edges.
//!
//! Cursor x rolls the foot sideways about the left (x >= 0) or right (x < 0)
//! edge, around the controller's forward axis. Cursor y then rolls it about the
//! toe (y >= 0) or heel (y < 0), around the already side-rolled right axis. The
//! toe/heel pivots are carried through the side roll first, so the two
//! rotations compose. Both angles are 180 degrees per unit of cursor travel.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{require_references, RigConstraint};
use crate::error::RigError;
use crate::handle::{
    NodeId, PoseStream, ReadOnlyTransformHandle, ReadWriteTransformHandle, TransformResolver,
};
use crate::math::{angle_axis_degrees, rotate_about_pivot, rotate_point_about_pivot};

/// Degrees of roll per unit of cursor travel.
pub const ROLL_DEGREES_PER_UNIT: f32 = 180.0;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FootRollData {
    pub foot_ik_target: String,
    pub foot_controller_base: String,
    pub foot_roll_cursor: String,
    pub toe_end: String,
    pub foot_heel: String,
    pub foot_left_side: String,
    pub foot_right_side: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FootRollJob {
    pub foot_ik_target: ReadWriteTransformHandle,
    pub foot_controller_base: ReadOnlyTransformHandle,
    pub foot_roll_cursor: ReadWriteTransformHandle,
    pub toe_end: ReadOnlyTransformHandle,
    pub foot_heel: ReadOnlyTransformHandle,
    pub foot_left_side: ReadOnlyTransformHandle,
    pub foot_right_side: ReadOnlyTransformHandle,
}

impl FootRollJob {
    /// Rolled (position, rotation) of the controller base for a cursor value.
    pub fn rolled_pose<S: PoseStream + ?Sized>(&self, stream: &S, cursor: Vec3) -> (Vec3, Quat) {
        let mut pos = self.foot_controller_base.position(stream);
        let mut rot = self.foot_controller_base.rotation(stream);

        let side = if cursor.x < 0.0 {
            self.foot_right_side
        } else {
            self.foot_left_side
        };
        let side_pivot = side.position(stream);
        let side_roll = angle_axis_degrees(ROLL_DEGREES_PER_UNIT * cursor.x, rot * Vec3::Z);
        (pos, rot) = rotate_about_pivot(pos, rot, side_pivot, side_roll);

        let end = if cursor.y >= 0.0 {
            self.toe_end
        } else {
            self.foot_heel
        };
        let end_pivot = rotate_point_about_pivot(end.position(stream), side_pivot, side_roll);
        let end_roll = angle_axis_degrees(ROLL_DEGREES_PER_UNIT * cursor.y, rot * Vec3::X);
        rotate_about_pivot(pos, rot, end_pivot, end_roll)
    }
}

impl RigConstraint for FootRollJob {
    type Data = FootRollData;

    const KIND: &'static str = "foot_roll";

    fn validate(data: &FootRollData) -> Result<(), RigError> {
        require_references(
            Self::KIND,
            &[
                ("foot_ik_target", data.foot_ik_target.as_str()),
                ("foot_controller_base", data.foot_controller_base.as_str()),
                ("foot_roll_cursor", data.foot_roll_cursor.as_str()),
                ("toe_end", data.toe_end.as_str()),
                ("foot_heel", data.foot_heel.as_str()),
                ("foot_left_side", data.foot_left_side.as_str()),
                ("foot_right_side", data.foot_right_side.as_str()),
            ],
        )
    }

    fn bind<R: TransformResolver + ?Sized>(
        data: &FootRollData,
        resolver: &mut R,
    ) -> Result<Self, RigError> {
        Self::validate(data)?;
        let k = Self::KIND;
        Ok(Self {
            foot_ik_target: ReadWriteTransformHandle::bind(
                resolver,
                k,
                "foot_ik_target",
                &data.foot_ik_target,
            )?,
            foot_controller_base: ReadOnlyTransformHandle::bind(
                resolver,
                k,
                "foot_controller_base",
                &data.foot_controller_base,
            )?,
            foot_roll_cursor: ReadWriteTransformHandle::bind(
                resolver,
                k,
                "foot_roll_cursor",
                &data.foot_roll_cursor,
            )?,
            toe_end: ReadOnlyTransformHandle::bind(resolver, k, "toe_end", &data.toe_end)?,
            foot_heel: ReadOnlyTransformHandle::bind(resolver, k, "foot_heel", &data.foot_heel)?,
            foot_left_side: ReadOnlyTransformHandle::bind(
                resolver,
                k,
                "foot_left_side",
                &data.foot_left_side,
            )?,
            foot_right_side: ReadOnlyTransformHandle::bind(
                resolver,
                k,
                "foot_right_side",
                &data.foot_right_side,
            )?,
        })
    }

    fn evaluate<S: PoseStream + ?Sized>(&self, stream: &mut S, weight: f32) {
        if weight <= 0.0 {
            return;
        }

        // The cursor is a planar control: keep x/y, drop z drift.
        let mut cursor = self.foot_roll_cursor.local_position(stream);
        cursor.z = 0.0;
        self.foot_roll_cursor.set_local_position(stream, cursor);

        let (pos, rot) = self.rolled_pose(stream, cursor);

        let current_pos = self.foot_ik_target.position(stream);
        let current_rot = self.foot_ik_target.rotation(stream);
        self.foot_ik_target
            .set_position(stream, current_pos.lerp(pos, weight));
        self.foot_ik_target
            .set_rotation(stream, current_rot.slerp(rot, weight));
    }

    fn write_targets(&self) -> Vec<NodeId> {
        vec![self.foot_ik_target.node(), self.foot_roll_cursor.node()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{LocalTransform, PoseBuffer};

    fn approx_vec(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "left={a:?} right={b:?}");
    }

    fn approx_quat(a: Quat, b: Quat) {
        assert!(a.dot(b).abs() > 1.0 - 1e-5, "left={a:?} right={b:?}");
    }

    /// Foot lying at the origin facing +Z: left edge at +X, right edge at -X,
    /// toe at +Z, heel at -Z. Pivots are children of the controller base.
    fn setup(cursor: Vec3) -> (PoseBuffer, FootRollJob) {
        let mut pose = PoseBuffer::new();
        let base = pose
            .add_node(
                "base",
                None,
                LocalTransform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            )
            .unwrap();
        for (name, at) in [
            ("toe", Vec3::new(0.0, -1.0, 2.0)),
            ("heel", Vec3::new(0.0, -1.0, -1.0)),
            ("left", Vec3::new(0.5, -1.0, 0.0)),
            ("right", Vec3::new(-0.5, -1.0, 0.0)),
        ] {
            pose.add_node(name, Some(base), LocalTransform::from_translation(at))
                .unwrap();
        }
        pose.add_node("cursor", None, LocalTransform::from_translation(cursor))
            .unwrap();
        pose.add_node(
            "ik",
            None,
            LocalTransform::from_translation_rotation(
                Vec3::new(3.0, 3.0, 3.0),
                Quat::from_rotation_x(0.4),
            ),
        )
        .unwrap();

        let data = FootRollData {
            foot_ik_target: "ik".into(),
            foot_controller_base: "base".into(),
            foot_roll_cursor: "cursor".into(),
            toe_end: "toe".into(),
            foot_heel: "heel".into(),
            foot_left_side: "left".into(),
            foot_right_side: "right".into(),
        };
        let job = FootRollJob::bind(&data, &mut pose).unwrap();
        (pose, job)
    }

    #[test]
    fn centered_cursor_reproduces_base_pose() {
        let (mut pose, job) = setup(Vec3::ZERO);
        job.evaluate(&mut pose, 1.0);
        let ik = job.foot_ik_target.node();
        approx_vec(pose.position(ik), Vec3::new(0.0, 1.0, 0.0));
        approx_quat(pose.rotation(ik), Quat::IDENTITY);
    }

    #[test]
    fn full_right_roll_pivots_on_right_edge() {
        let (mut pose, job) = setup(Vec3::new(-1.0, 0.0, 0.0));
        job.evaluate(&mut pose, 1.0);
        let ik = job.foot_ik_target.node();
        // Right edge at (-0.5, 0, 0); base at (0, 1, 0) swings to (-1, -1, 0).
        approx_vec(pose.position(ik), Vec3::new(-1.0, -1.0, 0.0));
        approx_quat(pose.rotation(ik), Quat::from_rotation_z(-std::f32::consts::PI));
    }

    #[test]
    fn left_roll_then_toe_roll_compose() {
        let (mut pose, job) = setup(Vec3::new(1.0, 1.0, 0.0));
        job.evaluate(&mut pose, 1.0);

        // Side roll about the left edge (0.5, 0, 0) by 180 deg around Z.
        let side = Quat::from_rotation_z(std::f32::consts::PI);
        let side_pivot = Vec3::new(0.5, 0.0, 0.0);
        let pos = side_pivot + side * (Vec3::new(0.0, 1.0, 0.0) - side_pivot);
        let toe = side_pivot + side * (Vec3::new(0.0, 0.0, 2.0) - side_pivot);
        // Toe roll around the rolled right axis.
        let toe_roll = Quat::from_axis_angle(side * Vec3::X, std::f32::consts::PI);
        let expected_pos = toe + toe_roll * (pos - toe);
        let expected_rot = toe_roll * side;

        let ik = job.foot_ik_target.node();
        approx_vec(pose.position(ik), expected_pos);
        approx_quat(pose.rotation(ik), expected_rot);
        // Pivot carried through the side roll: toe lands at (1, 0, 2).
        approx_vec(toe, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn negative_y_uses_heel() {
        let (pose, job) = setup(Vec3::ZERO);
        let (pos, rot) = job.rolled_pose(&pose, Vec3::new(0.0, -0.5, 0.0));
        // Heel at (0, 0, -1); -90 deg around +X.
        let q = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let heel = Vec3::new(0.0, 0.0, -1.0);
        approx_vec(pos, heel + q * (Vec3::new(0.0, 1.0, 0.0) - heel));
        approx_quat(rot, q);
    }

    #[test]
    fn cursor_z_is_dropped_but_xy_kept() {
        let (mut pose, job) = setup(Vec3::new(0.25, -0.5, 3.0));
        job.evaluate(&mut pose, 1.0);
        assert_eq!(
            pose.local_position(job.foot_roll_cursor.node()),
            Vec3::new(0.25, -0.5, 0.0)
        );
    }

    #[test]
    fn zero_weight_touches_nothing() {
        let (mut pose, job) = setup(Vec3::new(0.25, -0.5, 3.0));
        let before = pose.clone();
        job.evaluate(&mut pose, 0.0);
        for name in ["cursor", "ik"] {
            let id = pose.find(name).unwrap();
            assert_eq!(pose.local(id), before.local(id), "node {name} changed");
        }
    }

    #[test]
    fn half_weight_blends_from_current_target() {
        let (mut pose, job) = setup(Vec3::ZERO);
        job.evaluate(&mut pose, 0.5);
        let ik = job.foot_ik_target.node();
        approx_vec(pose.position(ik), Vec3::new(1.5, 2.0, 1.5));
        approx_quat(
            pose.rotation(ik),
            Quat::from_rotation_x(0.4).slerp(Quat::IDENTITY, 0.5),
        );
    }

    #[test]
    fn full_weight_is_a_fixed_point() {
        let (mut pose, job) = setup(Vec3::new(-0.3, 0.6, 0.0));
        job.evaluate(&mut pose, 1.0);
        let ik = job.foot_ik_target.node();
        let first = (pose.position(ik), pose.rotation(ik));
        job.evaluate(&mut pose, 1.0);
        approx_vec(pose.position(ik), first.0);
        approx_quat(pose.rotation(ik), first.1);
    }
}
