//! Reference tables and planning tunables.
//!
//! Every invocation receives one immutable [`ReferenceData`]. The built-in
//! tables are the `Default`; a shop can override them with a TOML or JSON
//! file loaded by [`ReferenceData::load_from_file`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PlanError, Result};

/// Cutting and setup parameters of a stock material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialParams {
    pub code: String,
    /// Minutes of cutting per cubic centimetre removed.
    pub mrr_factor_min_per_cm3: f64,
    pub setup_time_min: f64,
}

impl MaterialParams {
    fn new(code: &str, mrr_factor_min_per_cm3: f64, setup_time_min: f64) -> Self {
        Self {
            code: code.to_owned(),
            mrr_factor_min_per_cm3,
            setup_time_min,
        }
    }
}

/// Machine configurations the selector can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MachineType {
    #[serde(rename = "lathe_3ax")]
    Lathe3Ax,
    #[serde(rename = "lathe_4ax")]
    Lathe4Ax,
    #[serde(rename = "mill_3ax")]
    Mill3Ax,
    #[serde(rename = "mill_5ax")]
    Mill5Ax,
}

impl MachineType {
    pub const ALL: [Self; 4] = [Self::Lathe3Ax, Self::Lathe4Ax, Self::Mill3Ax, Self::Mill5Ax];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lathe3Ax => "lathe_3ax",
            Self::Lathe4Ax => "lathe_4ax",
            Self::Mill3Ax => "mill_3ax",
            Self::Mill5Ax => "mill_5ax",
        }
    }

    #[must_use]
    pub fn is_mill(self) -> bool {
        matches!(self, Self::Mill3Ax | Self::Mill5Ax)
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work-holding used by a setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureType {
    ThreeJawChuck,
    SoftJaws,
    Faceplate,
    Vise,
    /// Generic dedicated fixture for re-clamped prismatic setups.
    Fixture,
}

impl FixtureType {
    pub const ALL: [Self; 5] = [
        Self::ThreeJawChuck,
        Self::SoftJaws,
        Self::Faceplate,
        Self::Vise,
        Self::Fixture,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeJawChuck => "three_jaw_chuck",
            Self::SoftJaws => "soft_jaws",
            Self::Faceplate => "faceplate",
            Self::Vise => "vise",
            Self::Fixture => "fixture",
        }
    }
}

impl fmt::Display for FixtureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part classifier thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierPolicy {
    /// A direction counts as X, Y or Z when that component exceeds this.
    pub axis_dominance: f64,
    /// Rotational parts need strictly more than this share of rotational faces.
    pub min_rotational_ratio: f64,
    /// Rotational parts have at most this many distinct axis positions.
    pub max_axis_positions: usize,
    /// Grid used to tell axis positions apart, in millimetres.
    pub axis_position_grid_mm: f64,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            axis_dominance: 0.9,
            min_rotational_ratio: 0.40,
            max_axis_positions: 3,
            axis_position_grid_mm: 1.0,
        }
    }
}

/// Section-cut sampling and contour grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionPolicy {
    pub line_samples: usize,
    pub arc_samples: usize,
    pub curve_samples: usize,
    /// Points within this axial distance share a contour station.
    pub z_group_tolerance_mm: f64,
    /// An inner point is kept only this far inside the outer one.
    pub inner_gap_mm: f64,
}

impl Default for SectionPolicy {
    fn default() -> Self {
        Self {
            line_samples: 2,
            arc_samples: 20,
            curve_samples: 15,
            z_group_tolerance_mm: 0.05,
            inner_gap_mm: 0.1,
        }
    }
}

/// Deep-pocket and thin-wall thresholds and penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstraintPolicy {
    /// Depth-to-width ratio at which a pocket is flagged.
    pub pocket_ratio_moderate: f64,
    /// Depth-to-width ratio from which a pocket is severe.
    pub pocket_ratio_severe: f64,
    pub pocket_dedup_mm: f64,
    /// Minimum `|n1 · n2|` for two planar faces to bound a wall.
    pub wall_parallel_dot: f64,
    /// Walls must be strictly thicker than this to count (ignores touching faces).
    pub wall_min_mm: f64,
    /// Walls strictly thinner than this are flagged.
    pub wall_max_mm: f64,
    /// Walls at or below this thickness are critical.
    pub wall_critical_mm: f64,
    pub wall_dedup_mm: f64,
    pub penalty_moderate_pocket: f64,
    pub penalty_severe_pocket: f64,
    pub penalty_thin_wall: f64,
}

impl Default for ConstraintPolicy {
    fn default() -> Self {
        Self {
            pocket_ratio_moderate: 3.0,
            pocket_ratio_severe: 4.0,
            pocket_dedup_mm: 10.0,
            wall_parallel_dot: 0.9,
            wall_min_mm: 0.1,
            wall_max_mm: 3.0,
            wall_critical_mm: 2.0,
            wall_dedup_mm: 5.0,
            penalty_moderate_pocket: 1.5,
            penalty_severe_pocket: 1.8,
            penalty_thin_wall: 2.5,
        }
    }
}

/// Machining-time model multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorPolicy {
    /// Share of cutting time spent roughing; the rest is finishing.
    pub roughing_share: f64,
    pub slender_ratio: f64,
    pub slender_bonus: f64,
    pub low_removal_ratio: f64,
    pub low_removal_bonus: f64,
    pub high_removal_ratio: f64,
    pub high_removal_bonus: f64,
}

impl Default for EstimatorPolicy {
    fn default() -> Self {
        Self {
            roughing_share: 0.8,
            slender_ratio: 4.0,
            slender_bonus: 0.20,
            low_removal_ratio: 0.05,
            low_removal_bonus: 0.10,
            high_removal_ratio: 0.70,
            high_removal_bonus: 0.05,
        }
    }
}

/// Setup planner limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupPolicy {
    /// Bar stock longer than this is turned in two setups.
    pub long_stock_mm: f64,
    /// Hybrid parts above this turning share are turned complete before milling.
    pub hybrid_turning_fraction: f64,
}

impl Default for SetupPolicy {
    fn default() -> Self {
        Self {
            long_stock_mm: 150.0,
            hybrid_turning_fraction: 0.7,
        }
    }
}

/// Machine selector economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachinePolicy {
    /// A 5-axis mill is chosen while it costs at most this multiple of the 3-axis plan.
    pub five_axis_premium: f64,
    /// Share of 3-axis setups a 5-axis mill still needs.
    pub five_axis_setup_ratio: f64,
    /// Extra setup a plain lathe needs to mill radial features on another machine.
    pub extra_milling_setup_min: f64,
}

impl Default for MachinePolicy {
    fn default() -> Self {
        Self {
            five_axis_premium: 1.2,
            five_axis_setup_ratio: 0.7,
            extra_milling_setup_min: 30.0,
        }
    }
}

/// Every heuristic constant of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanningPolicy {
    pub classifier: ClassifierPolicy,
    pub section: SectionPolicy,
    pub constraints: ConstraintPolicy,
    pub estimator: EstimatorPolicy,
    pub setup: SetupPolicy,
    pub machine: MachinePolicy,
}

/// Immutable reference data injected into each planning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceData {
    pub materials: Vec<MaterialParams>,
    pub machine_rates: BTreeMap<MachineType, f64>,
    pub fixture_times: BTreeMap<FixtureType, f64>,
    pub policy: PlanningPolicy,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            materials: vec![
                MaterialParams::new("aluminum_6061", 0.05, 30.0),
                MaterialParams::new("brass_360", 0.06, 30.0),
                MaterialParams::new("steel_1045", 0.12, 45.0),
                MaterialParams::new("stainless_304", 0.18, 45.0),
                MaterialParams::new("titanium_6al4v", 0.30, 60.0),
                MaterialParams::new("pom_acetal", 0.03, 20.0),
            ],
            machine_rates: BTreeMap::from([
                (MachineType::Lathe3Ax, 65.0),
                (MachineType::Lathe4Ax, 85.0),
                (MachineType::Mill3Ax, 70.0),
                (MachineType::Mill5Ax, 120.0),
            ]),
            fixture_times: BTreeMap::from([
                (FixtureType::ThreeJawChuck, 15.0),
                (FixtureType::SoftJaws, 20.0),
                (FixtureType::Faceplate, 30.0),
                (FixtureType::Vise, 15.0),
                (FixtureType::Fixture, 25.0),
            ]),
            policy: PlanningPolicy::default(),
        }
    }
}

/// A shop override file. Materials are merged into the built-in table by
/// code; rates and fixture times replace single entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShopConfig {
    pub materials: Vec<MaterialParams>,
    /// Keyed by machine code, e.g. `mill_5ax`.
    pub machine_rates: BTreeMap<String, f64>,
    /// Keyed by fixture code, e.g. `soft_jaws`.
    pub fixture_times: BTreeMap<String, f64>,
    pub policy: PlanningPolicy,
}

/// Parses the string keys of an override table into `K`.
fn parse_keys<K>(table: BTreeMap<String, f64>, section: &str) -> std::result::Result<BTreeMap<K, f64>, ConfigError>
where
    K: DeserializeOwned + Ord,
{
    table
        .into_iter()
        .map(|(key, value)| {
            let de: StrDeserializer<'_, serde::de::value::Error> = key.as_str().into_deserializer();
            K::deserialize(de)
                .map(|k| (k, value))
                .map_err(|err| ConfigError::InvalidSetting {
                    key: format!("{section}.{key}"),
                    reason: err.to_string(),
                })
        })
        .collect()
}

impl ReferenceData {
    /// Looks up a material by code.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownMaterial`] if the code is not in the table.
    pub fn material(&self, code: &str) -> Result<&MaterialParams> {
        self.materials
            .iter()
            .find(|m| m.code == code)
            .ok_or_else(|| PlanError::UnknownMaterial(code.to_owned()))
    }

    /// Hourly rate of a machine. Zero when missing, which [`Self::validate`] rejects.
    #[must_use]
    pub fn hourly_rate(&self, machine: MachineType) -> f64 {
        self.machine_rates.get(&machine).copied().unwrap_or(0.0)
    }

    /// Setup time of a fixture. Zero when missing, which [`Self::validate`] rejects.
    #[must_use]
    pub fn fixture_time(&self, fixture: FixtureType) -> f64 {
        self.fixture_times.get(&fixture).copied().unwrap_or(0.0)
    }

    /// Applies a shop override to these tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for an unknown machine or fixture code.
    pub fn with_overrides(mut self, shop: ShopConfig) -> std::result::Result<Self, ConfigError> {
        for material in shop.materials {
            match self.materials.iter_mut().find(|m| m.code == material.code) {
                Some(existing) => *existing = material,
                None => self.materials.push(material),
            }
        }
        self.machine_rates
            .extend(parse_keys::<MachineType>(shop.machine_rates, "machine_rates")?);
        self.fixture_times
            .extend(parse_keys::<FixtureType>(shop.fixture_times, "fixture_times")?);
        self.policy = shop.policy;
        Ok(self)
    }

    /// Loads a shop override (`.toml` or `.json`) on top of the built-in tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the merged
    /// tables fail validation.
    pub fn load_from_file(path: &Path) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let shop: ShopConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        };

        let data = Self::default().with_overrides(shop)?;
        data.validate()?;
        Ok(data)
    }

    /// Checks table completeness and tunable ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] naming the first offending key.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::InvalidSetting {
            key: key.to_owned(),
            reason: reason.to_owned(),
        };

        if self.materials.is_empty() {
            return Err(invalid("materials", "table is empty"));
        }
        for m in &self.materials {
            if m.mrr_factor_min_per_cm3 <= 0.0 || m.setup_time_min < 0.0 {
                return Err(invalid(&format!("materials.{}", m.code), "rates must be positive"));
            }
        }
        for machine in MachineType::ALL {
            if !self.machine_rates.get(&machine).is_some_and(|r| *r > 0.0) {
                return Err(invalid(&format!("machine_rates.{machine}"), "must be > 0"));
            }
        }
        for fixture in FixtureType::ALL {
            if !self.fixture_times.get(&fixture).is_some_and(|t| *t >= 0.0) {
                return Err(invalid(&format!("fixture_times.{fixture}"), "must be >= 0"));
            }
        }

        let p = &self.policy;
        if !(0.0..=1.0).contains(&p.classifier.min_rotational_ratio) {
            return Err(invalid("policy.classifier.min_rotational_ratio", "must be within [0, 1]"));
        }
        if p.constraints.pocket_ratio_severe < p.constraints.pocket_ratio_moderate {
            return Err(invalid("policy.constraints.pocket_ratio_severe", "must not be below the moderate ratio"));
        }
        if p.constraints.wall_critical_mm > p.constraints.wall_max_mm
            || p.constraints.wall_min_mm >= p.constraints.wall_max_mm
        {
            return Err(invalid("policy.constraints.wall_max_mm", "wall thresholds are out of order"));
        }
        if !(0.0..=1.0).contains(&p.estimator.roughing_share) {
            return Err(invalid("policy.estimator.roughing_share", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&p.machine.five_axis_setup_ratio) || p.machine.five_axis_premium < 1.0 {
            return Err(invalid("policy.machine", "five-axis ratio must be within [0, 1] and premium >= 1"));
        }
        if p.section.line_samples < 2 || p.section.arc_samples < 2 || p.section.curve_samples < 2 {
            return Err(invalid("policy.section", "every curve needs at least two samples"));
        }
        Ok(())
    }
}
