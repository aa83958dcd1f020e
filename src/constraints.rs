//! Machining constraint detection: deep pockets and thin walls.

use serde::Serialize;
use tracing::debug;

use crate::classify::Axis;
use crate::error::KernelResult;
use crate::kernel::{Aabb, FaceInfo, GeometryKernel, SurfaceInfo};
use crate::math::{Point3, Vector3, LINEAR_TOLERANCE};
use crate::reference::ConstraintPolicy;

/// A bore counts as lying along X, Y or Z past this direction component.
const BORE_AXIS_DOMINANCE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PocketSeverity {
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WallSeverity {
    Moderate,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    DeepPocket {
        depth_mm: f64,
        width_mm: f64,
        ratio: f64,
        z_level: f64,
        severity: PocketSeverity,
    },
    ThinWall {
        thickness_mm: f64,
        location: Point3,
        severity: WallSeverity,
    },
}

impl Constraint {
    /// Time multiplier this finding contributes.
    #[must_use]
    pub fn penalty(&self, policy: &ConstraintPolicy) -> f64 {
        match self {
            Self::DeepPocket {
                severity: PocketSeverity::Moderate,
                ..
            } => policy.penalty_moderate_pocket,
            Self::DeepPocket {
                severity: PocketSeverity::Severe,
                ..
            } => policy.penalty_severe_pocket,
            Self::ThinWall { .. } => policy.penalty_thin_wall,
        }
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::DeepPocket {
                severity: PocketSeverity::Severe,
                ..
            } | Self::ThinWall {
                severity: WallSeverity::Critical,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintAnalysis {
    pub constraints: Vec<Constraint>,
    /// Product of the per-finding penalties, 1.0 when nothing was found.
    pub penalty_multiplier: f64,
    pub has_critical: bool,
}

impl ConstraintAnalysis {
    fn from_constraints(constraints: Vec<Constraint>, policy: &ConstraintPolicy) -> Self {
        let penalty_multiplier = constraints.iter().map(|c| c.penalty(policy)).product();
        let has_critical = constraints.iter().any(Constraint::is_critical);
        Self {
            constraints,
            penalty_multiplier,
            has_critical,
        }
    }
}

/// Finds deep pockets and thin walls.
///
/// # Errors
///
/// Returns an error if a face bounding box or distance query fails.
pub fn detect_constraints<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    faces: &[FaceInfo],
    policy: &ConstraintPolicy,
) -> KernelResult<ConstraintAnalysis> {
    let mut boxes = Vec::with_capacity(faces.len());
    for face in faces {
        boxes.push(kernel.face_bounding_box(shape, face.index)?);
    }

    let mut constraints = deep_pockets(faces, &boxes, policy);
    constraints.extend(thin_walls(kernel, shape, faces, &boxes, policy)?);

    let analysis = ConstraintAnalysis::from_constraints(constraints, policy);
    debug!(
        findings = analysis.constraints.len(),
        penalty = analysis.penalty_multiplier,
        critical = analysis.has_critical,
        "constraint analysis"
    );
    Ok(analysis)
}

fn deep_pockets(faces: &[FaceInfo], boxes: &[Aabb], policy: &ConstraintPolicy) -> Vec<Constraint> {
    let mut found: Vec<(f64, f64, f64, f64)> = Vec::new();
    for (face, bbox) in faces.iter().zip(boxes) {
        let SurfaceInfo::Cylinder { axis, radius, .. } = face.surface else {
            continue;
        };
        if !face.reversed {
            continue;
        }
        // Depth is measured along the bore's world axis; Z when it has none.
        let i = Axis::dominant(&axis, BORE_AXIS_DOMINANCE).map_or(2, Axis::index);
        let depth = bbox.max[i] - bbox.min[i];
        let width = 2.0 * radius;
        let ratio = depth / width;
        if ratio + LINEAR_TOLERANCE >= policy.pocket_ratio_moderate {
            found.push((depth, width, ratio, bbox.center()[i]));
        }
    }

    found.sort_by(|a, b| b.2.total_cmp(&a.2));
    let mut kept: Vec<(f64, f64, f64, f64)> = Vec::new();
    for pocket in found {
        if kept.iter().all(|k| (k.3 - pocket.3).abs() >= policy.pocket_dedup_mm) {
            kept.push(pocket);
        }
    }

    kept.into_iter()
        .map(|(depth_mm, width_mm, ratio, z_level)| Constraint::DeepPocket {
            depth_mm,
            width_mm,
            ratio,
            z_level,
            severity: if ratio + LINEAR_TOLERANCE >= policy.pocket_ratio_severe {
                PocketSeverity::Severe
            } else {
                PocketSeverity::Moderate
            },
        })
        .collect()
}

fn thin_walls<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    faces: &[FaceInfo],
    boxes: &[Aabb],
    policy: &ConstraintPolicy,
) -> KernelResult<Vec<Constraint>> {
    let planes: Vec<(usize, Vector3)> = faces
        .iter()
        .enumerate()
        .filter_map(|(i, f)| match f.surface {
            SurfaceInfo::Plane { normal, .. } => Some((i, normal)),
            _ => None,
        })
        .collect();

    let mut found: Vec<(f64, Point3)> = Vec::new();
    for (k, &(i, ni)) in planes.iter().enumerate() {
        for &(j, nj) in &planes[k + 1..] {
            if ni.dot(&nj).abs() < policy.wall_parallel_dot {
                continue;
            }
            if box_gap(&boxes[i], &boxes[j]) >= policy.wall_max_mm {
                continue;
            }
            let d = kernel.face_distance(shape, faces[i].index, faces[j].index)?;
            if d > policy.wall_min_mm && d < policy.wall_max_mm {
                let location = nalgebra::center(&boxes[i].center(), &boxes[j].center());
                found.push((d, location));
            }
        }
    }

    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut kept: Vec<(f64, Point3)> = Vec::new();
    for wall in found {
        if kept.iter().all(|k| (k.1 - wall.1).norm() >= policy.wall_dedup_mm) {
            kept.push(wall);
        }
    }

    Ok(kept
        .into_iter()
        .map(|(thickness_mm, location)| Constraint::ThinWall {
            thickness_mm,
            location,
            severity: if thickness_mm <= policy.wall_critical_mm + LINEAR_TOLERANCE {
                WallSeverity::Critical
            } else {
                WallSeverity::Moderate
            },
        })
        .collect())
}

/// Distance between two boxes, zero when they overlap.
fn box_gap(a: &Aabb, b: &Aabb) -> f64 {
    let gap = |i: usize| (a.min[i] - b.max[i]).max(b.min[i] - a.max[i]).max(0.0);
    Vector3::new(gap(0), gap(1), gap(2)).norm()
}
