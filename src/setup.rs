//! Setup planning: partitions features into an ordered list of fixturings.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{AxisInfo, PartType};
use crate::features::{is_live_tooling, process_of, AccessSide, Feature, FeatureKind, FeatureRef, ProcessKind};
use crate::kernel::Aabb;
use crate::reference::{FixtureType, MachineType, ReferenceData};

/// One fixturing of the part. Setups run in list order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setup {
    /// 1-based position in the plan.
    pub id: u32,
    pub description: String,
    pub fixture: FixtureType,
    pub features: Vec<FeatureRef>,
    pub estimated_setup_time_min: f64,
    pub machine_type: MachineType,
}

struct Draft {
    description: String,
    fixture: FixtureType,
    features: Vec<FeatureRef>,
    machine_type: MachineType,
}

impl Draft {
    fn new(description: impl Into<String>, fixture: FixtureType, machine_type: MachineType) -> Self {
        Self {
            description: description.into(),
            fixture,
            features: Vec::new(),
            machine_type,
        }
    }
}

/// Plans the setups for a classified part. Never fails: a part without
/// features gets one default setup.
#[must_use]
pub fn plan_setups(info: &AxisInfo, features: &[Feature], bbox: &Aabb, reference: &ReferenceData) -> Vec<Setup> {
    let drafts = if features.is_empty() {
        vec![default_setup(info.part_type)]
    } else {
        match info.part_type {
            PartType::Rotational => {
                let (turned, milled): (Vec<&Feature>, Vec<&Feature>) = features
                    .iter()
                    .partition(|f| process_of(f.kind) == ProcessKind::Turning || is_live_tooling(f.kind));
                if milled.is_empty() {
                    turning_setups(&turned, info, bbox, reference)
                } else {
                    hybrid_setups(&turned, &milled, features.len(), info, bbox, reference)
                }
            }
            PartType::Prismatic => milling_setups(&features.iter().collect::<Vec<_>>()),
        }
    };

    let setups: Vec<Setup> = drafts
        .into_iter()
        .zip(1u32..)
        .map(|(d, id)| Setup {
            id,
            estimated_setup_time_min: reference.fixture_time(d.fixture),
            description: d.description,
            fixture: d.fixture,
            features: d.features,
            machine_type: d.machine_type,
        })
        .collect();
    debug!(setups = setups.len(), part_type = %info.part_type, "setup plan");
    setups
}

fn default_setup(part_type: PartType) -> Draft {
    match part_type {
        PartType::Rotational => Draft::new("Turn complete part", FixtureType::ThreeJawChuck, MachineType::Lathe3Ax),
        PartType::Prismatic => Draft::new("Mill complete part", FixtureType::Vise, MachineType::Mill3Ax),
    }
}

/// Front/back split around the stock midpoint along the main axis.
fn turning_setups(features: &[&Feature], info: &AxisInfo, bbox: &Aabb, reference: &ReferenceData) -> Vec<Draft> {
    let i = info.main_axis.map_or(2, |a| a.index());
    let (start, end) = (bbox.min[i], bbox.max[i]);
    let midpoint = 0.5 * (start + end);
    let stock_length = end - start;

    let live = features.iter().any(|f| is_live_tooling(f.kind));
    let parting = features.iter().any(|f| f.kind == FeatureKind::Parting);
    let machine = if live { MachineType::Lathe4Ax } else { MachineType::Lathe3Ax };

    let mut front = Draft::new("Front side: turn from bar in chuck", FixtureType::ThreeJawChuck, machine);
    let mut back_features = Vec::new();
    for f in features {
        let is_front = is_live_tooling(f.kind)
            || f.kind == FeatureKind::Parting
            || f.axial_position.unwrap_or(midpoint) >= midpoint;
        if is_front {
            front.features.push(f.to_ref());
        } else {
            back_features.push(f.to_ref());
        }
    }

    let mut drafts = vec![front];
    if !back_features.is_empty() || parting || stock_length > reference.policy.setup.long_stock_mm {
        let fixture = if parting { FixtureType::Faceplate } else { FixtureType::SoftJaws };
        let mut back = Draft::new("Back side: reclamp and finish", fixture, machine);
        back.features = back_features;
        drafts.push(back);
    }
    drafts
}

fn hybrid_setups(
    turned: &[&Feature],
    milled: &[&Feature],
    total: usize,
    info: &AxisInfo,
    bbox: &Aabb,
    reference: &ReferenceData,
) -> Vec<Draft> {
    #[allow(clippy::cast_precision_loss)]
    let turning_fraction = turned.len() as f64 / total as f64;
    let mut drafts = if turning_fraction > reference.policy.setup.hybrid_turning_fraction {
        turning_setups(turned, info, bbox, reference)
    } else {
        let machine = if turned.iter().any(|f| is_live_tooling(f.kind)) {
            MachineType::Lathe4Ax
        } else {
            MachineType::Lathe3Ax
        };
        let mut basic = Draft::new("Turn basic shape", FixtureType::ThreeJawChuck, machine);
        basic.features = turned.iter().map(|f| f.to_ref()).collect();
        vec![basic]
    };
    drafts.extend(milling_setups(milled));
    drafts
}

/// One setup per access side on a 3-axis mill.
fn milling_setups(features: &[&Feature]) -> Vec<Draft> {
    let mut by_side: BTreeMap<AccessSide, Vec<FeatureRef>> = BTreeMap::new();
    for f in features {
        by_side.entry(f.side.unwrap_or(AccessSide::Top)).or_default().push(f.to_ref());
    }
    if by_side.len() > 2 {
        // TODO: consolidate into one 5-axis setup once tilted-fixture planning exists.
        warn!(
            faces = by_side.len(),
            "5-axis setup consolidation not implemented; planning one 3-axis setup per face"
        );
    }
    by_side
        .into_iter()
        .enumerate()
        .map(|(n, (side, features))| {
            let fixture = if n == 0 { FixtureType::Vise } else { FixtureType::Fixture };
            let mut draft = Draft::new(format!("Mill {side} side"), fixture, MachineType::Mill3Ax);
            draft.features = features;
            draft
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::classify::Axis;
    use crate::math::Point3;

    fn feature(n: usize, kind: FeatureKind, z: Option<f64>, side: Option<AccessSide>) -> Feature {
        Feature {
            id: format!("F{n}"),
            kind,
            side,
            axial_position: z,
            location: Point3::new(0.0, 0.0, z.unwrap_or(0.0)),
            machining_time_min: 1.0,
        }
    }

    fn part(part_type: PartType) -> AxisInfo {
        AxisInfo {
            part_type,
            main_axis: Some(Axis::Z),
            axis_position: Point3::origin(),
            rotational_ratio: 0.6,
            face_type_counts: BTreeMap::new(),
            largest_cylinder_radius: 10.0,
            n_distinct_axis_positions: 1,
        }
    }

    fn stock(length: f64) -> Aabb {
        Aabb {
            min: Point3::new(-10.0, -10.0, 0.0),
            max: Point3::new(10.0, 10.0, length),
        }
    }

    #[test]
    fn front_features_on_short_stock_need_one_setup() {
        let features = vec![
            feature(1, FeatureKind::OdTurn, Some(30.0), None),
            feature(2, FeatureKind::Facing, Some(50.0), None),
        ];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(50.0), &ReferenceData::default());
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].id, 1);
        assert_eq!(setups[0].fixture, FixtureType::ThreeJawChuck);
        assert_eq!(setups[0].machine_type, MachineType::Lathe3Ax);
        assert_eq!(setups[0].features.len(), 2);
        assert!((setups[0].estimated_setup_time_min - 15.0).abs() < 1e-12);
    }

    #[test]
    fn back_feature_adds_soft_jaw_setup() {
        let features = vec![
            feature(1, FeatureKind::OdTurn, Some(30.0), None),
            feature(2, FeatureKind::Chamfer, Some(2.0), None),
        ];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(50.0), &ReferenceData::default());
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[1].id, 2);
        assert_eq!(setups[1].fixture, FixtureType::SoftJaws);
        assert_eq!(setups[1].features[0].id, "F2");
    }

    #[test]
    fn parting_forces_faceplate() {
        let features = vec![
            feature(1, FeatureKind::OdTurn, Some(30.0), None),
            feature(2, FeatureKind::Parting, Some(1.0), None),
        ];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(50.0), &ReferenceData::default());
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[0].features.len(), 2);
        assert_eq!(setups[1].fixture, FixtureType::Faceplate);
        assert!(setups[1].features.is_empty());
    }

    #[test]
    fn long_stock_is_turned_twice() {
        let features = vec![feature(1, FeatureKind::OdTurn, Some(150.0), None)];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(200.0), &ReferenceData::default());
        assert_eq!(setups.len(), 2);
    }

    #[test]
    fn live_tooling_goes_front_on_a_four_axis_lathe() {
        let features = vec![
            feature(1, FeatureKind::OdTurn, Some(30.0), None),
            feature(2, FeatureKind::RadialDrill, Some(5.0), None),
        ];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(50.0), &ReferenceData::default());
        assert_eq!(setups.len(), 1);
        assert_eq!(setups[0].machine_type, MachineType::Lathe4Ax);
        assert_eq!(setups[0].features.len(), 2);
    }

    #[test]
    fn prismatic_sides_get_vise_then_fixture() {
        let features = vec![
            feature(1, FeatureKind::Drill, None, Some(AccessSide::Bottom)),
            feature(2, FeatureKind::FaceMill, None, Some(AccessSide::Top)),
            feature(3, FeatureKind::Pocket, None, Some(AccessSide::Top)),
        ];
        let setups = plan_setups(&part(PartType::Prismatic), &features, &stock(20.0), &ReferenceData::default());
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[0].description, "Mill top side");
        assert_eq!(setups[0].fixture, FixtureType::Vise);
        assert_eq!(setups[0].features.len(), 2);
        assert_eq!(setups[1].fixture, FixtureType::Fixture);
        assert!((setups[1].estimated_setup_time_min - 25.0).abs() < 1e-12);
        assert!(setups.iter().all(|s| s.machine_type == MachineType::Mill3Ax));
    }

    #[test]
    fn three_sides_keep_per_face_setups() {
        let features = vec![
            feature(1, FeatureKind::Drill, None, Some(AccessSide::Left)),
            feature(2, FeatureKind::Drill, None, Some(AccessSide::Top)),
            feature(3, FeatureKind::Drill, None, Some(AccessSide::Front)),
        ];
        let setups = plan_setups(&part(PartType::Prismatic), &features, &stock(20.0), &ReferenceData::default());
        assert_eq!(setups.len(), 3);
    }

    #[test]
    fn mostly_turned_hybrid_turns_then_mills() {
        let features = vec![
            feature(1, FeatureKind::OdTurn, Some(30.0), None),
            feature(2, FeatureKind::Facing, Some(50.0), None),
            feature(3, FeatureKind::Chamfer, Some(45.0), None),
            feature(4, FeatureKind::Groove, Some(35.0), None),
            feature(5, FeatureKind::Pocket, Some(30.0), Some(AccessSide::Top)),
        ];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(50.0), &ReferenceData::default());
        assert_eq!(setups.len(), 2);
        assert_eq!(setups[0].machine_type, MachineType::Lathe3Ax);
        assert_eq!(setups[0].features.len(), 4);
        assert_eq!(setups[1].machine_type, MachineType::Mill3Ax);
    }

    #[test]
    fn milling_heavy_hybrid_turns_basic_shape() {
        let features = vec![
            feature(1, FeatureKind::OdTurn, Some(30.0), None),
            feature(2, FeatureKind::Pocket, Some(30.0), Some(AccessSide::Top)),
        ];
        let setups = plan_setups(&part(PartType::Rotational), &features, &stock(50.0), &ReferenceData::default());
        assert_eq!(setups[0].description, "Turn basic shape");
        assert_eq!(setups.last().unwrap().machine_type, MachineType::Mill3Ax);
    }

    #[test]
    fn no_features_gets_default_setup() {
        let reference = ReferenceData::default();
        let turned = plan_setups(&part(PartType::Rotational), &[], &stock(50.0), &reference);
        assert_eq!(turned.len(), 1);
        assert_eq!(turned[0].fixture, FixtureType::ThreeJawChuck);
        let milled = plan_setups(&part(PartType::Prismatic), &[], &stock(50.0), &reference);
        assert_eq!(milled[0].fixture, FixtureType::Vise);
        assert_eq!(milled[0].machine_type, MachineType::Mill3Ax);
    }
}
