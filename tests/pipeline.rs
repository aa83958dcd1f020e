//! End-to-end planning through JSON part documents.

use std::path::PathBuf;

use procplan::classify::{Axis, PartType};
use procplan::constraints::{Constraint, PocketSeverity};
use procplan::features::FeatureKind;
use procplan::kernel::BrepKernel;
use procplan::pipeline::{plan_batch, plan_part, PlanRequest};
use procplan::profile::SectionProfile;
use procplan::reference::{FixtureType, MachineType, ReferenceData};
use procplan::PlanError;

fn write_part(dir: &tempfile::TempDir, name: &str, json: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, json).unwrap();
    path
}

const PIN: &str = r#"{
    "body": {
        "type": "revolve",
        "start": [0, 0],
        "segments": [
            { "kind": "line", "to": [10, 0] },
            { "kind": "line", "to": [10, 50] },
            { "kind": "line", "to": [0, 50] }
        ]
    },
    "features": [
        { "kind": "od_turn", "position": [10, 0, 40] },
        { "kind": "facing", "position": [0, 0, 50] }
    ]
}"#;

const PIN_WITH_BACK_CHAMFER: &str = r#"{
    "body": {
        "type": "revolve",
        "start": [0, 0],
        "segments": [
            { "kind": "line", "to": [10, 0] },
            { "kind": "line", "to": [10, 50] },
            { "kind": "line", "to": [0, 50] }
        ]
    },
    "features": [
        { "kind": "od_turn", "position": [10, 0, 40] },
        { "kind": "facing", "position": [0, 0, 50] },
        { "kind": "chamfer", "position": [10, 0, 2] }
    ]
}"#;

const BORED_SLEEVE: &str = r#"{
    "name": "sleeve",
    "body": {
        "type": "revolve",
        "start": [0, 0],
        "segments": [
            { "kind": "line", "to": [15, 0] },
            { "kind": "line", "to": [15, 60] },
            { "kind": "line", "to": [5, 60] },
            { "kind": "line", "to": [5, 20] },
            { "kind": "line", "to": [0, 20] }
        ]
    }
}"#;

const BRACKET: &str = r#"{
    "body": {
        "type": "prism",
        "outline": [[0, 0], [80, 0], [80, 50], [0, 50]],
        "height": 20,
        "holes": [
            { "center": [70, 10], "diameter": 6 },
            { "center": [70, 40], "diameter": 6, "depth": 8, "from": "bottom" }
        ],
        "pockets": [{ "min": [10, 10], "max": [50, 40], "depth": 8 }]
    }
}"#;

const MOULD_INSERT: &str = r#"{
    "body": {
        "type": "prism",
        "outline": [[0, 0], [60, 0], [60, 60], [0, 60]],
        "height": 30
    },
    "features": [
        { "kind": "face_mill", "side": "top" },
        { "kind": "freeform_surface", "side": "top", "position": [30, 30, 30] }
    ]
}"#;

#[test]
fn pin_with_front_features_needs_one_setup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "pin.json", PIN);
    let plan = plan_part(&BrepKernel, &ReferenceData::default(), &PlanRequest::new(path, "brass_360")).unwrap();

    assert_eq!(plan.axis.part_type, PartType::Rotational);
    assert_eq!(plan.axis.main_axis, Some(Axis::Z));
    assert!((0.0..=1.0).contains(&plan.axis.rotational_ratio));
    assert_eq!(plan.setups.len(), 1);
    assert_eq!(plan.setups[0].fixture, FixtureType::ThreeJawChuck);
    assert_eq!(plan.machine.recommended, MachineType::Lathe3Ax);
    let feature_minutes: f64 = plan.features.iter().map(|f| f.machining_time_min).sum();
    assert!((feature_minutes - plan.estimate.cutting_min()).abs() < 1e-9);
}

#[test]
fn back_feature_adds_second_setup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "pin.json", PIN_WITH_BACK_CHAMFER);
    let plan = plan_part(&BrepKernel, &ReferenceData::default(), &PlanRequest::new(path, "brass_360")).unwrap();
    assert_eq!(plan.setups.len(), 2);
    assert_eq!(plan.setups[1].features[0].kind, FeatureKind::Chamfer);
}

#[test]
fn deep_bore_is_flagged_and_profiled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "sleeve.json", BORED_SLEEVE);
    let plan = plan_part(&BrepKernel, &ReferenceData::default(), &PlanRequest::new(path, "steel_1045")).unwrap();

    assert_eq!(plan.axis.part_type, PartType::Rotational);
    assert!(plan.constraints.has_critical);
    assert!(plan.constraints.constraints.iter().any(|c| matches!(
        c,
        Constraint::DeepPocket {
            severity: PocketSeverity::Severe,
            ..
        }
    )));
    assert!(plan.features.iter().any(|f| f.kind == FeatureKind::AxialDrill));

    let SectionProfile::Rotational(profile) = &plan.profile else {
        panic!("expected a rotational profile");
    };
    assert!(profile.outer.first().unwrap().r.abs() < 1e-12);
    assert!(profile.outer.last().unwrap().r.abs() < 1e-12);
    assert!(profile.inner.iter().all(|p| (p.r - 5.0).abs() < 1e-9));
    assert!((profile.max_radius() - 15.0).abs() < 1e-9);

    // Removed volume is the bounding block minus the sleeve.
    let part = std::f64::consts::PI * (15.0 * 15.0 * 60.0 - 5.0 * 5.0 * 40.0);
    assert!((plan.mass.volume - part).abs() < 1e-6 * part);
    assert!((plan.estimate.material_to_remove_cm3 - (54_000.0 - part) / 1000.0).abs() < 1e-3);
}

#[test]
fn bracket_is_milled_from_two_sides() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "bracket.json", BRACKET);
    let plan = plan_part(&BrepKernel, &ReferenceData::default(), &PlanRequest::new(path, "aluminum_6061")).unwrap();

    assert_eq!(plan.axis.part_type, PartType::Prismatic);
    assert!(matches!(plan.profile, SectionProfile::Prismatic { ref views } if views.len() == 3));
    let kinds: Vec<_> = plan.features.iter().map(|f| f.kind).collect();
    assert!(kinds.contains(&FeatureKind::FaceMill));
    assert!(kinds.contains(&FeatureKind::Pocket));
    assert_eq!(kinds.iter().filter(|k| **k == FeatureKind::Drill).count(), 2);

    assert_eq!(plan.setups.len(), 2);
    assert_eq!(plan.setups[0].fixture, FixtureType::Vise);
    assert_eq!(plan.setups[1].fixture, FixtureType::Fixture);
    assert_eq!(plan.machine.recommended, MachineType::Mill3Ax);
    assert_eq!(plan.machine.options.len(), 2);
}

#[test]
fn freeform_feature_selects_five_axis_mill() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "insert.json", MOULD_INSERT);
    let plan = plan_part(&BrepKernel, &ReferenceData::default(), &PlanRequest::new(path, "steel_1045")).unwrap();
    assert_eq!(plan.axis.part_type, PartType::Prismatic);
    assert_eq!(plan.machine.recommended, MachineType::Mill5Ax);
}

#[test]
fn unknown_material_is_rejected_before_loading() {
    let err = plan_part(
        &BrepKernel,
        &ReferenceData::default(),
        &PlanRequest::new("/nonexistent/part.json", "unobtainium"),
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::UnknownMaterial(_)));
}

#[test]
fn reference_data_without_a_rate_is_rejected() {
    let mut reference = ReferenceData::default();
    reference.machine_rates.remove(&MachineType::Mill5Ax);
    let err = plan_part(
        &BrepKernel,
        &reference,
        &PlanRequest::new("/nonexistent/part.json", "aluminum_6061"),
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::Config(_)));
}

#[test]
fn missing_file_is_a_geometry_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = plan_part(
        &BrepKernel,
        &ReferenceData::default(),
        &PlanRequest::new(dir.path().join("missing.json"), "aluminum_6061"),
    )
    .unwrap_err();
    assert!(matches!(err, PlanError::GeometryLoad { .. }));
}

#[test]
fn planning_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "bracket.json", BRACKET);
    let request = PlanRequest::new(path, "aluminum_6061");
    let reference = ReferenceData::default();
    let first = plan_part(&BrepKernel, &reference, &request).unwrap();
    let second = plan_part(&BrepKernel, &reference, &request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn batch_keeps_request_order() {
    let dir = tempfile::tempdir().unwrap();
    let requests = vec![
        PlanRequest::new(write_part(&dir, "a.json", PIN), "aluminum_6061"),
        PlanRequest::new(dir.path().join("missing.json"), "aluminum_6061"),
        PlanRequest::new(write_part(&dir, "c.json", BRACKET), "aluminum_6061"),
    ];
    let results = plan_batch(&BrepKernel, &ReferenceData::default(), &requests);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().axis.part_type, PartType::Rotational);
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().axis.part_type, PartType::Prismatic);
}

#[test]
fn plan_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_part(&dir, "pin.json", PIN);
    let plan = plan_part(&BrepKernel, &ReferenceData::default(), &PlanRequest::new(path, "pom_acetal")).unwrap();
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["axis"]["part_type"], "rotational");
    assert_eq!(value["machine"]["recommended"], "lathe_3ax");
    assert_eq!(value["profile"]["mode"], "rotational");
}
