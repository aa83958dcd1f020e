//! Machine selection: costs each feasible configuration and recommends the cheapest.

use serde::Serialize;
use tracing::debug;

use crate::classify::{AxisInfo, PartType};
use crate::error::{PlanError, Result};
use crate::features::{is_complex_3d, is_live_tooling, Feature};
use crate::kernel::Aabb;
use crate::math::TOLERANCE;
use crate::reference::{MachineType, ReferenceData};
use crate::setup::Setup;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineCostOption {
    pub machine_type: MachineType,
    pub setup_count: usize,
    pub setup_time_min: f64,
    pub machining_time_min: f64,
    pub total_time_min: f64,
    pub hourly_rate: f64,
    pub total_cost: f64,
}

impl MachineCostOption {
    fn new(machine_type: MachineType, setup_count: usize, setup_time_min: f64, machining_time_min: f64, reference: &ReferenceData) -> Self {
        let hourly_rate = reference.hourly_rate(machine_type);
        let total_time_min = setup_time_min + machining_time_min;
        Self {
            machine_type,
            setup_count,
            setup_time_min,
            machining_time_min,
            total_time_min,
            hourly_rate,
            total_cost: total_time_min / 60.0 * hourly_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineRecommendation {
    pub recommended: MachineType,
    pub reason: String,
    /// Every configuration costed, the recommended one included.
    pub options: Vec<MachineCostOption>,
}

impl MachineRecommendation {
    /// Cost option of the recommended machine.
    #[must_use]
    pub fn recommended_option(&self) -> Option<&MachineCostOption> {
        self.options.iter().find(|o| o.machine_type == self.recommended)
    }
}

/// Picks a machine for the planned setups.
///
/// `machining_time_min` is the cutting time apportioned over `features`.
///
/// # Errors
///
/// Returns [`PlanError::InvalidPlanningInput`] for empty geometry or an empty setup list.
pub fn select_machine(
    info: &AxisInfo,
    features: &[Feature],
    setups: &[Setup],
    machining_time_min: f64,
    bbox: &Aabb,
    reference: &ReferenceData,
) -> Result<MachineRecommendation> {
    if bbox.is_empty() || bbox.volume() <= 0.0 {
        return Err(PlanError::InvalidPlanningInput("part geometry is empty".into()));
    }
    if setups.is_empty() {
        return Err(PlanError::InvalidPlanningInput("no setups to cost".into()));
    }

    let policy = &reference.policy.machine;
    let setup_time: f64 = setups.iter().map(|s| s.estimated_setup_time_min).sum();
    let n = setups.len();

    let recommendation = match info.part_type {
        PartType::Rotational => {
            let radial = features.iter().any(|f| is_live_tooling(f.kind));
            if radial {
                let lathe3 = MachineCostOption::new(
                    MachineType::Lathe3Ax,
                    n + 1,
                    setup_time + policy.extra_milling_setup_min,
                    machining_time_min,
                    reference,
                );
                let lathe4 = MachineCostOption::new(MachineType::Lathe4Ax, n, setup_time, machining_time_min, reference);
                let (recommended, reason) = if lathe4.total_cost < lathe3.total_cost {
                    (MachineType::Lathe4Ax, "live tooling avoids a separate milling setup")
                } else {
                    (MachineType::Lathe3Ax, "separate milling setup is cheaper than live tooling")
                };
                MachineRecommendation {
                    recommended,
                    reason: reason.into(),
                    options: vec![lathe3, lathe4],
                }
            } else {
                let milled = setups.iter().any(|s| s.machine_type.is_mill());
                let reason = if milled {
                    "turning on a 3-axis lathe; milling setups are costed at the lathe rate"
                } else {
                    "turning only"
                };
                MachineRecommendation {
                    recommended: MachineType::Lathe3Ax,
                    reason: reason.into(),
                    options: vec![MachineCostOption::new(
                        MachineType::Lathe3Ax,
                        n,
                        setup_time,
                        machining_time_min,
                        reference,
                    )],
                }
            }
        }
        PartType::Prismatic => {
            // A 5-axis mill reaches several faces per clamping.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let reduced = ((n as f64 * policy.five_axis_setup_ratio - TOLERANCE).ceil() as usize).clamp(1, n);
            let reduced_time: f64 = setups.iter().take(reduced).map(|s| s.estimated_setup_time_min).sum();
            let mill5 =
                MachineCostOption::new(MachineType::Mill5Ax, reduced, reduced_time, machining_time_min, reference);

            if features.iter().any(|f| is_complex_3d(f.kind)) {
                MachineRecommendation {
                    recommended: MachineType::Mill5Ax,
                    reason: "complex 3D surfaces need simultaneous 5-axis motion".into(),
                    options: vec![mill5],
                }
            } else {
                let mill3 = MachineCostOption::new(MachineType::Mill3Ax, n, setup_time, machining_time_min, reference);
                let (recommended, reason) = if mill5.total_cost <= policy.five_axis_premium * mill3.total_cost {
                    (MachineType::Mill5Ax, "fewer setups offset the 5-axis rate")
                } else {
                    (MachineType::Mill3Ax, "3-axis milling is cheapest")
                };
                MachineRecommendation {
                    recommended,
                    reason: reason.into(),
                    options: vec![mill3, mill5],
                }
            }
        }
    };

    debug!(
        machine = %recommendation.recommended,
        options = recommendation.options.len(),
        "machine selected"
    );
    Ok(recommendation)
}
