//! End-to-end planning of one part, and of batches on a worker pool.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{classify, AxisInfo};
use crate::constraints::{detect_constraints, ConstraintAnalysis};
use crate::error::{PlanError, Result};
use crate::estimate::{estimate_time, TimeEstimate};
use crate::features::{apportion_time, from_declared, recognize, Feature};
use crate::kernel::{Aabb, GeometryKernel, MassProperties};
use crate::machine::{select_machine, MachineRecommendation};
use crate::profile::{extract_profile, SectionProfile};
use crate::reference::ReferenceData;
use crate::setup::{plan_setups, Setup};

/// One part to plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub path: PathBuf,
    pub material: String,
}

impl PlanRequest {
    pub fn new(path: impl Into<PathBuf>, material: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            material: material.into(),
        }
    }
}

/// Every record produced for one part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessPlan {
    pub source: PathBuf,
    pub material: String,
    pub bounding_box: Aabb,
    pub mass: MassProperties,
    pub axis: AxisInfo,
    pub features: Vec<Feature>,
    pub profile: SectionProfile,
    pub constraints: ConstraintAnalysis,
    pub estimate: TimeEstimate,
    pub setups: Vec<Setup>,
    pub machine: MachineRecommendation,
}

/// Plans one part.
///
/// The reference data is validated and the material resolved before the
/// file is touched. The loaded shape lives only for the duration of the call.
///
/// # Errors
///
/// Returns [`PlanError::Config`] for reference data that fails validation,
/// [`PlanError::UnknownMaterial`] for a material missing from the
/// table, [`PlanError::GeometryLoad`] when the file cannot be loaded or holds
/// no faces, and kernel errors from failed geometry queries.
pub fn plan_part<K: GeometryKernel>(kernel: &K, reference: &ReferenceData, request: &PlanRequest) -> Result<ProcessPlan> {
    reference.validate()?;
    let material = reference.material(&request.material)?;
    let policy = &reference.policy;

    let shape = load_shape(kernel, &request.path)?;
    let faces = kernel.faces(&shape)?;
    if faces.is_empty() {
        return Err(geometry_load(&request.path, "shape has no faces"));
    }
    let bounding_box = kernel.bounding_box(&shape)?;
    let mass = kernel.mass_properties(&shape)?;

    let axis = classify(&faces, &policy.classifier);
    debug!(part_type = %axis.part_type, ratio = axis.rotational_ratio, "classified");

    let declared = kernel.declared_features(&shape);
    let mut features = if declared.is_empty() {
        recognize(kernel, &shape, &faces, &axis, &bounding_box)?
    } else {
        from_declared(&declared, &axis, &bounding_box)
    };
    debug!(features = features.len(), declared = !declared.is_empty(), "features");

    let profile = extract_profile(kernel, &shape, &axis, &bounding_box, &mass, &policy.section);
    let constraints = detect_constraints(kernel, &shape, &faces, &policy.constraints)?;
    drop(shape);

    let estimate = estimate_time(
        &bounding_box,
        &mass,
        material,
        constraints.penalty_multiplier,
        &policy.estimator,
    );
    apportion_time(&mut features, estimate.cutting_min());

    let setups = plan_setups(&axis, &features, &bounding_box, reference);
    let machine = select_machine(&axis, &features, &setups, estimate.cutting_min(), &bounding_box, reference)?;

    info!(
        path = %request.path.display(),
        part_type = %axis.part_type,
        setups = setups.len(),
        machine = %machine.recommended,
        total_min = estimate.total_min,
        "planned part"
    );

    Ok(ProcessPlan {
        source: request.path.clone(),
        material: material.code.clone(),
        bounding_box,
        mass,
        axis,
        features,
        profile,
        constraints,
        estimate,
        setups,
        machine,
    })
}

/// Plans many parts on the rayon pool. Results come back in request order.
pub fn plan_batch<K>(kernel: &K, reference: &ReferenceData, requests: &[PlanRequest]) -> Vec<Result<ProcessPlan>>
where
    K: GeometryKernel + Sync,
{
    requests
        .par_iter()
        .map(|request| plan_part(kernel, reference, request))
        .collect()
}

fn load_shape<K: GeometryKernel>(kernel: &K, path: &Path) -> Result<K::Shape> {
    kernel.load(path).map_err(|err| geometry_load(path, &err.to_string()))
}

fn geometry_load(path: &Path, reason: &str) -> PlanError {
    PlanError::GeometryLoad {
        path: path.to_path_buf(),
        reason: reason.to_owned(),
    }
}
