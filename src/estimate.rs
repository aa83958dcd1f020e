//! Machining time from a volumetric material-removal model.

use serde::Serialize;
use tracing::{debug, warn};

use crate::kernel::{Aabb, MassProperties};
use crate::math::Vector3;
use crate::reference::{EstimatorPolicy, MaterialParams};

/// Where an estimate's volumes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    Geometry,
    /// Volumes derived from a hash of the file name; only produced by
    /// [`estimate_without_geometry`].
    FilenameHash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEstimate {
    pub material: String,
    pub stock_volume_mm3: f64,
    pub part_volume_mm3: f64,
    pub material_to_remove_cm3: f64,
    /// Removed share of the stock, in `[0, 1]`.
    pub removal_ratio: f64,
    /// Cutting time before any multiplier.
    pub base_cutting_min: f64,
    pub geometric_multiplier: f64,
    /// Penalty from the constraint analysis.
    pub difficulty_multiplier: f64,
    pub roughing_min: f64,
    pub finishing_min: f64,
    pub setup_min: f64,
    pub total_min: f64,
    pub source: EstimateSource,
}

impl TimeEstimate {
    /// Roughing plus finishing.
    #[must_use]
    pub fn cutting_min(&self) -> f64 {
        self.roughing_min + self.finishing_min
    }
}

/// Estimates machining time for a part cut from its bounding-box stock.
#[must_use]
pub fn estimate_time(
    bbox: &Aabb,
    mass: &MassProperties,
    material: &MaterialParams,
    difficulty: f64,
    policy: &EstimatorPolicy,
) -> TimeEstimate {
    let estimate = estimate_from_volumes(
        bbox.volume(),
        mass.volume,
        &bbox.extent(),
        material,
        difficulty,
        policy,
    );
    debug!(
        removed_cm3 = estimate.material_to_remove_cm3,
        total_min = estimate.total_min,
        "time estimate"
    );
    estimate
}

/// The time model over plain volumes, in cubic millimetres.
#[must_use]
pub fn estimate_from_volumes(
    stock_volume_mm3: f64,
    part_volume_mm3: f64,
    extent: &Vector3,
    material: &MaterialParams,
    difficulty: f64,
    policy: &EstimatorPolicy,
) -> TimeEstimate {
    let removed_mm3 = (stock_volume_mm3 - part_volume_mm3).max(0.0);
    let removal_ratio = if stock_volume_mm3 > 0.0 {
        removed_mm3 / stock_volume_mm3
    } else {
        0.0
    };

    let mut geometric = 1.0;
    let (lo, hi) = (extent.min(), extent.max());
    if lo > 0.0 && hi / lo > policy.slender_ratio {
        geometric += policy.slender_bonus;
    }
    if removal_ratio < policy.low_removal_ratio {
        geometric += policy.low_removal_bonus;
    }
    if removal_ratio > policy.high_removal_ratio {
        geometric += policy.high_removal_bonus;
    }

    assemble(
        material,
        stock_volume_mm3,
        part_volume_mm3,
        removal_ratio,
        geometric,
        difficulty,
        policy,
        EstimateSource::Geometry,
    )
}

/// Deterministic placeholder estimate for a part whose geometry is unavailable.
///
/// The removed volume (10 to 100 cm³) is derived from an FNV-1a hash of
/// `file_name`. The pipeline never calls this; callers opt in explicitly and
/// the result is marked [`EstimateSource::FilenameHash`].
#[must_use]
pub fn estimate_without_geometry(file_name: &str, material: &MaterialParams, policy: &EstimatorPolicy) -> TimeEstimate {
    warn!(file = file_name, "estimating from the file name; geometry unavailable");
    let hash = fnv1a(file_name.as_bytes());
    #[allow(clippy::cast_precision_loss)]
    let removed_cm3 = 10.0 + (hash % 9001) as f64 / 100.0;
    assemble(
        material,
        removed_cm3 * 1000.0,
        0.0,
        0.0,
        1.0,
        1.0,
        policy,
        EstimateSource::FilenameHash,
    )
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    material: &MaterialParams,
    stock_volume_mm3: f64,
    part_volume_mm3: f64,
    removal_ratio: f64,
    geometric: f64,
    difficulty: f64,
    policy: &EstimatorPolicy,
    source: EstimateSource,
) -> TimeEstimate {
    let material_to_remove_cm3 = (stock_volume_mm3 - part_volume_mm3).max(0.0) / 1000.0;
    let base = material_to_remove_cm3 * material.mrr_factor_min_per_cm3;
    let multiplier = geometric * difficulty;
    let roughing_min = base * policy.roughing_share * multiplier;
    let finishing_min = base * (1.0 - policy.roughing_share) * multiplier;
    TimeEstimate {
        material: material.code.clone(),
        stock_volume_mm3,
        part_volume_mm3,
        material_to_remove_cm3,
        removal_ratio,
        base_cutting_min: base,
        geometric_multiplier: geometric,
        difficulty_multiplier: difficulty,
        roughing_min,
        finishing_min,
        setup_min: material.setup_time_min,
        total_min: material.setup_time_min + roughing_min + finishing_min,
        source,
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(PRIME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::reference::ReferenceData;

    fn aluminum() -> MaterialParams {
        ReferenceData::default().material("aluminum_6061").unwrap().clone()
    }

    #[test]
    fn cube_with_half_removed() {
        let policy = EstimatorPolicy::default();
        let est = estimate_from_volumes(
            100_000.0,
            50_000.0,
            &Vector3::new(50.0, 50.0, 40.0),
            &aluminum(),
            1.0,
            &policy,
        );
        assert_relative_eq!(est.material_to_remove_cm3, 50.0, epsilon = 1e-12);
        assert_relative_eq!(est.base_cutting_min, 2.5, epsilon = 1e-12);
        assert_relative_eq!(est.geometric_multiplier, 1.0, epsilon = 1e-12);
        assert_relative_eq!(est.roughing_min, 2.0, epsilon = 1e-12);
        assert_relative_eq!(est.finishing_min, 0.5, epsilon = 1e-12);
        assert_relative_eq!(est.total_min, 32.5, epsilon = 1e-12);
        assert_eq!(est.source, EstimateSource::Geometry);
    }

    #[test]
    fn multipliers_stack() {
        let policy = EstimatorPolicy::default();
        // Slender bar with almost nothing removed.
        let est = estimate_from_volumes(
            100_000.0,
            98_000.0,
            &Vector3::new(10.0, 10.0, 1000.0),
            &aluminum(),
            1.5,
            &policy,
        );
        assert_relative_eq!(est.geometric_multiplier, 1.3, epsilon = 1e-12);
        assert_relative_eq!(est.cutting_min(), 2.0 * 0.05 * 1.3 * 1.5, epsilon = 1e-12);
    }

    #[test]
    fn time_is_monotone_in_removed_volume() {
        let policy = EstimatorPolicy::default();
        let extent = Vector3::new(50.0, 50.0, 40.0);
        let mut last = 0.0;
        for part in [90_000.0, 80_000.0, 60_000.0, 40_000.0] {
            let est = estimate_from_volumes(100_000.0, part, &extent, &aluminum(), 1.0, &policy);
            assert!(est.total_min >= last);
            last = est.total_min;
        }
    }

    #[test]
    fn filename_fallback_is_deterministic_and_marked() {
        let policy = EstimatorPolicy::default();
        let a = estimate_without_geometry("bracket.json", &aluminum(), &policy);
        let b = estimate_without_geometry("bracket.json", &aluminum(), &policy);
        assert_eq!(a, b);
        assert_eq!(a.source, EstimateSource::FilenameHash);
        assert!((10.0..=100.0).contains(&a.material_to_remove_cm3));
    }

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }
}
