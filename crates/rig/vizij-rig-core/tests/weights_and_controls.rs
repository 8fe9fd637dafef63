use vizij_rig_core::{
    math::euler_degrees, LocalTransform, NodeId, PoseBuffer, PoseNodeData, PoseStream, Quat, Rig,
    RigData, Vec3,
};

fn approx_vec(a: Vec3, b: Vec3, eps: f32) {
    assert!((a - b).length() <= eps, "left={a:?} right={b:?} eps={eps}");
}

fn approx_quat(a: Quat, b: Quat, eps: f32) {
    assert!(a.dot(b).abs() >= 1.0 - eps, "left={a:?} right={b:?} eps={eps}");
}

fn biped(clamp_weight: bool) -> (Rig, PoseBuffer) {
    let nodes: Vec<PoseNodeData> = vizij_test_fixtures::poses::load("biped").expect("pose");
    let mut pose = PoseBuffer::from_node_data(&nodes).expect("build pose");
    let mut data: RigData = vizij_test_fixtures::rigs::load("biped").expect("rig");
    data.settings.clamp_weight = clamp_weight;
    let rig = Rig::from_data(&data, &mut pose).expect("bind");
    (rig, pose)
}

fn node(pose: &PoseBuffer, name: &str) -> NodeId {
    pose.find(name)
        .unwrap_or_else(|| panic!("fixture node {name}"))
}

fn snapshot(pose: &PoseBuffer) -> Vec<(String, LocalTransform)> {
    (0..pose.len() as u32)
        .map(NodeId)
        .map(|id| {
            (
                pose.name(id).unwrap_or_default().to_string(),
                *pose.local(id).expect("node"),
            )
        })
        .collect()
}

fn disturb_controls(pose: &mut PoseBuffer) {
    let slider = node(pose, "HeadAim_Slider");
    pose.set_local_position(slider, Vec3::new(0.3, 0.8, 0.1));
    let cursor = node(pose, "L_FootRoll_Cursor");
    pose.set_local_position(cursor, Vec3::new(0.2, -0.1, 0.5));
    let curl = node(pose, "R_Index_Curl");
    pose.set_local_position(curl, Vec3::new(0.3, 2.0, 0.4));
}

#[test]
fn non_positive_weight_leaves_blend_and_foot_untouched() {
    for (clamp, weight) in [(true, 0.0), (true, -1.0), (false, 0.0), (false, -0.5)] {
        let (mut rig, mut pose) = biped(clamp);
        for id in ["head_aim", "left_foot_roll", "right_hand"] {
            rig.set_weight(id, weight).expect("known id");
        }
        disturb_controls(&mut pose);
        let before = snapshot(&pose);
        rig.evaluate(&mut pose);
        let after = snapshot(&pose);

        for ((name, a), (_, b)) in before.iter().zip(&after) {
            if name == "R_Index_Curl" {
                continue;
            }
            assert_eq!(a, b, "{name} changed at weight {weight} (clamp {clamp})");
        }
    }
}

#[test]
fn hand_controls_normalize_even_at_zero_weight() {
    let (mut rig, mut pose) = biped(true);
    rig.set_weight("right_hand", 0.0).expect("known id");
    disturb_controls(&mut pose);
    let distal = node(&pose, "R_Index_Distal");
    let before = pose.local_rotation(distal);

    rig.evaluate(&mut pose);

    assert_eq!(
        pose.local_position(node(&pose, "R_Index_Curl")),
        Vec3::new(0.0, 1.0, 0.0)
    );
    assert_eq!(pose.local_rotation(distal), before);
}

#[test]
fn blend_and_foot_are_fixed_points_at_full_weight() {
    let (rig, mut pose) = biped(true);
    disturb_controls(&mut pose);
    rig.evaluate(&mut pose);

    let target = node(&pose, "HeadAim_Target");
    let ik = node(&pose, "L_Foot_IK");
    let once = (
        pose.position(target),
        pose.rotation(target),
        pose.position(ik),
        pose.rotation(ik),
    );
    rig.evaluate(&mut pose);

    approx_vec(pose.position(target), once.0, 1e-6);
    approx_quat(pose.rotation(target), once.1, 1e-6);
    approx_vec(pose.position(ik), once.2, 1e-6);
    approx_quat(pose.rotation(ik), once.3, 1e-6);
}

#[test]
fn hand_delta_accumulates_per_evaluation() {
    let (rig, mut pose) = biped(true);
    let curl = node(&pose, "R_Index_Curl");
    pose.set_local_position(curl, Vec3::new(0.0, 1.0, 0.0));
    let distal = node(&pose, "R_Index_Distal");

    rig.evaluate(&mut pose);
    approx_quat(pose.local_rotation(distal), euler_degrees(80.0, 0.0, 0.0), 1e-5);
    rig.evaluate(&mut pose);
    approx_quat(pose.local_rotation(distal), euler_degrees(160.0, 0.0, 0.0), 1e-5);
}

#[test]
fn slider_values_are_clamped_and_drive_the_blend() {
    let (rig, mut pose) = biped(true);
    let slider = node(&pose, "HeadAim_Slider");
    let target = node(&pose, "HeadAim_Target");
    let a = pose.position(node(&pose, "HeadAim_A"));
    let b = pose.position(node(&pose, "HeadAim_B"));

    for y in [-3.0f32, -0.5, 0.0, 0.25, 0.75, 1.0, 1.5, 42.0] {
        pose.set_local_position(slider, Vec3::new(0.7, y, -0.2));
        rig.evaluate(&mut pose);

        let t = y.clamp(0.0, 1.0);
        assert_eq!(pose.local_position(slider), Vec3::new(0.0, t, 0.0));
        approx_vec(pose.position(target), a.lerp(b, t), 1e-5);
    }
}

#[test]
fn half_weight_moves_halfway_toward_the_rolled_pose() {
    let (mut rig, mut pose) = biped(true);
    let cursor = node(&pose, "L_FootRoll_Cursor");
    let ik = node(&pose, "L_Foot_IK");
    pose.set_local_position(cursor, Vec3::new(0.0, 0.5, 0.0));
    let start = pose.position(ik);

    rig.set_weight("left_foot_roll", 0.5).expect("known id");
    rig.evaluate(&mut pose);

    // Full roll lands at (0.1, 0.15, 0.15).
    approx_vec(
        pose.position(ik),
        start.lerp(Vec3::new(0.1, 0.15, 0.15), 0.5),
        1e-5,
    );
}
