use serde_json::Value;
use vizij_rig_core::{PoseBuffer, PoseNodeData, Rig, RigData, RigError};

fn biped_pose() -> PoseBuffer {
    let nodes: Vec<PoseNodeData> =
        vizij_test_fixtures::poses::load("biped").expect("biped pose fixture");
    PoseBuffer::from_node_data(&nodes).expect("build pose")
}

/// Every transform reference in a constraint object, as a key path plus the
/// field name errors report (`"toe_end"`, `"index.distal"`).
fn reference_paths(constraint: &Value) -> Vec<(Vec<String>, String)> {
    let mut out = Vec::new();
    let Some(obj) = constraint.as_object() else {
        return out;
    };
    for (key, value) in obj {
        if key == "type" {
            continue;
        }
        match value {
            Value::String(_) => out.push((vec![key.clone()], key.clone())),
            Value::Object(inner) => {
                for (k2, v2) in inner {
                    if v2.is_string() {
                        out.push((vec![key.clone(), k2.clone()], format!("{key}.{k2}")));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn with_reference(rig: &Value, index: usize, path: &[String], reference: &str) -> RigData {
    let mut rig = rig.clone();
    let mut cursor = &mut rig["constraints"][index]["constraint"];
    for key in path {
        cursor = &mut cursor[key.as_str()];
    }
    *cursor = Value::String(reference.to_string());
    serde_json::from_value(rig).expect("rig data")
}

#[test]
fn complete_fixture_binds() {
    let rig: RigData = vizij_test_fixtures::rigs::load("biped").expect("biped rig");
    let mut pose = biped_pose();
    let bound = Rig::from_data(&rig, &mut pose).expect("bind");
    assert_eq!(bound.len(), 3);
}

#[test]
fn each_blank_reference_is_reported_by_name() {
    let raw: Value = vizij_test_fixtures::rigs::load("biped").expect("biped rig");
    let constraints = raw["constraints"].as_array().expect("constraints").clone();
    let mut checked = 0;

    for (index, entry) in constraints.iter().enumerate() {
        let kind = entry["constraint"]["type"].as_str().expect("type tag");
        for (path, field) in reference_paths(&entry["constraint"]) {
            let data = with_reference(&raw, index, &path, "");
            assert!(data.validate().is_err(), "{kind}.{field} blank passed validate");

            let mut pose = biped_pose();
            match Rig::from_data(&data, &mut pose) {
                Err(RigError::MissingReference {
                    constraint,
                    field: reported,
                }) => {
                    assert_eq!(constraint, kind);
                    assert_eq!(reported, field.as_str());
                }
                other => panic!("{kind}.{field}: expected MissingReference, got {other:?}"),
            }
            checked += 1;
        }
    }
    // 4 blend slider + 7 foot roll + 22 hand pose references.
    assert_eq!(checked, 33);
}

#[test]
fn each_unknown_reference_is_reported_with_its_path() {
    let raw: Value = vizij_test_fixtures::rigs::load("biped").expect("biped rig");
    let constraints = raw["constraints"].as_array().expect("constraints").clone();

    for (index, entry) in constraints.iter().enumerate() {
        for (path, field) in reference_paths(&entry["constraint"]) {
            let data = with_reference(&raw, index, &path, "NoSuchBone");
            // References are only checked for presence before binding.
            data.validate().expect("validate");

            let mut pose = biped_pose();
            match Rig::from_data(&data, &mut pose) {
                Err(RigError::UnresolvedReference {
                    field: reported,
                    path: resolved,
                    ..
                }) => {
                    assert_eq!(reported, field.as_str());
                    assert_eq!(resolved, "NoSuchBone");
                }
                other => panic!("{field}: expected UnresolvedReference, got {other:?}"),
            }
        }
    }
}

#[test]
fn missing_reference_key_fails_to_parse() {
    let mut raw: Value = vizij_test_fixtures::rigs::load("foot-roll").expect("foot rig");
    raw["constraints"][0]["constraint"]
        .as_object_mut()
        .expect("constraint object")
        .remove("foot_heel");
    let err = vizij_rig_core::parse_rig_json(&raw.to_string()).unwrap_err();
    assert!(matches!(err, RigError::Parse(_)), "{err:?}");
}
