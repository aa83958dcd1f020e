//! Part classification: rotational or prismatic, and the dominant axis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::kernel::{FaceInfo, SurfaceInfo, SurfaceKind};
use crate::math::{Point3, Vector3, LINEAR_TOLERANCE};
use crate::reference::ClassifierPolicy;

/// A world coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    #[must_use]
    pub fn unit(self) -> Vector3 {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// Coordinate index (0, 1 or 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The world axis `dir` is dominated by, if any component exceeds `dominance`.
    #[must_use]
    pub fn dominant(dir: &Vector3, dominance: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|a| dir[a.index()].abs() > dominance)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartType {
    Rotational,
    Prismatic,
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rotational => "rotational",
            Self::Prismatic => "prismatic",
        })
    }
}

/// Result of classifying a part from its face inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisInfo {
    pub part_type: PartType,
    pub main_axis: Option<Axis>,
    /// A point on the main rotation axis.
    pub axis_position: Point3,
    /// Share of cylinder, cone and torus faces, in `[0, 1]`.
    pub rotational_ratio: f64,
    pub face_type_counts: BTreeMap<SurfaceKind, usize>,
    pub largest_cylinder_radius: f64,
    pub n_distinct_axis_positions: usize,
}

impl AxisInfo {
    #[must_use]
    pub fn is_rotational(&self) -> bool {
        self.part_type == PartType::Rotational
    }
}

#[derive(Default)]
struct AxisStats {
    count: usize,
    max_radius: f64,
    /// Axis location of the widest face seen so far.
    position: Option<Point3>,
}

/// Classifies a part from its faces.
///
/// Zero faces give a prismatic part with no main axis.
#[must_use]
pub fn classify(faces: &[FaceInfo], policy: &ClassifierPolicy) -> AxisInfo {
    let mut counts = BTreeMap::new();
    let mut per_axis: BTreeMap<Axis, AxisStats> = BTreeMap::new();
    let mut rotational = 0usize;

    for face in faces {
        *counts.entry(face.surface.kind()).or_insert(0) += 1;
        let Some((location, dir)) = face.surface.rotation_axis() else {
            continue;
        };
        rotational += 1;
        let Some(axis) = Axis::dominant(&dir, policy.axis_dominance) else {
            continue;
        };
        let radius = face.surface.cylinder_radius();
        let stats = per_axis.entry(axis).or_default();
        stats.count += 1;
        if stats.position.is_none() || radius > stats.max_radius {
            stats.max_radius = stats.max_radius.max(radius);
            stats.position = Some(location);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let rotational_ratio = if faces.is_empty() {
        0.0
    } else {
        rotational as f64 / faces.len() as f64
    };

    let mut main: Option<(Axis, &AxisStats)> = None;
    for (&axis, stats) in &per_axis {
        let better = match main {
            None => true,
            Some((_, best)) => {
                stats.max_radius > best.max_radius + LINEAR_TOLERANCE
                    || ((stats.max_radius - best.max_radius).abs() <= LINEAR_TOLERANCE && stats.count > best.count)
            }
        };
        if better {
            main = Some((axis, stats));
        }
    }

    let main_axis = main.map(|(axis, _)| axis);
    let axis_position = main.and_then(|(_, s)| s.position).unwrap_or_else(Point3::origin);
    let largest_cylinder_radius = main.map_or(0.0, |(_, s)| s.max_radius);
    let n_distinct_axis_positions = main_axis.map_or(0, |axis| distinct_positions(faces, axis, policy));

    let part_type = if main_axis.is_some()
        && rotational_ratio > policy.min_rotational_ratio
        && n_distinct_axis_positions <= policy.max_axis_positions
    {
        PartType::Rotational
    } else {
        PartType::Prismatic
    };

    AxisInfo {
        part_type,
        main_axis,
        axis_position,
        rotational_ratio,
        face_type_counts: counts,
        largest_cylinder_radius,
        n_distinct_axis_positions,
    }
}

/// Counts cylinders on `axis` whose axis lines are more than a grid cell apart.
fn distinct_positions(faces: &[FaceInfo], axis: Axis, policy: &ClassifierPolicy) -> usize {
    let grid = policy.axis_position_grid_mm;
    let others: Vec<usize> = (0..3).filter(|&i| i != axis.index()).collect();
    let mut seen = BTreeSet::new();
    for face in faces {
        let SurfaceInfo::Cylinder { location, axis: dir, .. } = face.surface else {
            continue;
        };
        if Axis::dominant(&dir, policy.axis_dominance) != Some(axis) {
            continue;
        }
        // Slide the location along the axis to the plane through the origin.
        let on_plane = location - dir * location.coords.dot(&dir);
        #[allow(clippy::cast_possible_truncation)]
        let key: Vec<i64> = others.iter().map(|&i| (on_plane[i] / grid).round() as i64).collect();
        seen.insert(key);
    }
    seen.len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::{BrepKernel, GeometryKernel, HoleEntry, HoleSpec, Prism, Revolve};
    use crate::math::polygon_2d::BoundarySegment;
    use crate::math::Point2;

    fn line(a: (f64, f64), b: (f64, f64)) -> BoundarySegment {
        BoundarySegment::Line {
            a: Point2::new(a.0, a.1),
            b: Point2::new(b.0, b.1),
        }
    }

    fn faces_of(shape: &crate::kernel::BrepShape) -> Vec<FaceInfo> {
        BrepKernel.faces(shape).unwrap()
    }

    #[test]
    fn stepped_shaft_along_x_is_rotational() {
        let profile = vec![
            line((0.0, 0.0), (15.0, 0.0)),
            line((15.0, 0.0), (15.0, 30.0)),
            line((15.0, 30.0), (10.0, 30.0)),
            line((10.0, 30.0), (10.0, 70.0)),
            line((10.0, 70.0), (0.0, 70.0)),
            line((0.0, 70.0), (0.0, 0.0)),
        ];
        let origin = Point3::new(0.0, 5.0, -3.0);
        let shape = Revolve::new(origin, Vector3::x(), profile).unwrap().build("shaft").unwrap();
        let info = classify(&faces_of(&shape), &ClassifierPolicy::default());
        assert_eq!(info.part_type, PartType::Rotational);
        assert_eq!(info.main_axis, Some(Axis::X));
        assert!((info.largest_cylinder_radius - 15.0).abs() < 1e-12);
        assert_eq!(info.n_distinct_axis_positions, 1);
        assert!((info.axis_position.y - 5.0).abs() < 1e-9);
        assert!((info.axis_position.z + 3.0).abs() < 1e-9);
        assert!(info.rotational_ratio > 0.4 && info.rotational_ratio <= 1.0);
    }

    #[test]
    fn plate_with_four_holes_is_prismatic() {
        let outline = vec![
            Point2::new(0.0, 0.0),
            Point2::new(80.0, 0.0),
            Point2::new(80.0, 60.0),
            Point2::new(0.0, 60.0),
        ];
        let mut prism = Prism::new(outline, 10.0);
        for (x, y) in [(15.0, 15.0), (65.0, 15.0), (65.0, 45.0), (15.0, 45.0)] {
            prism = prism.with_hole(HoleSpec {
                center: Point2::new(x, y),
                diameter: 6.0,
                depth: None,
                from: HoleEntry::Top,
            });
        }
        let shape = prism.build("plate").unwrap();
        let info = classify(&faces_of(&shape), &ClassifierPolicy::default());
        // Eight cylinder halves out of fourteen faces, but four axis positions.
        assert!(info.rotational_ratio > 0.4);
        assert_eq!(info.n_distinct_axis_positions, 4);
        assert_eq!(info.part_type, PartType::Prismatic);
        assert_eq!(info.main_axis, Some(Axis::Z));
        assert_eq!(info.face_type_counts[&SurfaceKind::Plane], 6);
        assert_eq!(info.face_type_counts[&SurfaceKind::Cylinder], 8);
    }

    #[test]
    fn no_faces_is_prismatic_without_axis() {
        let info = classify(&[], &ClassifierPolicy::default());
        assert_eq!(info.part_type, PartType::Prismatic);
        assert_eq!(info.main_axis, None);
        assert!(info.rotational_ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn larger_radius_wins_over_count() {
        let cyl = |axis: Vector3, radius: f64| FaceInfo {
            index: 0,
            surface: SurfaceInfo::Cylinder {
                location: Point3::origin(),
                axis,
                radius,
            },
            reversed: false,
        };
        let faces = vec![
            cyl(Vector3::z(), 3.0),
            cyl(Vector3::z(), 3.0),
            cyl(Vector3::z(), 3.0),
            cyl(Vector3::y(), 20.0),
        ];
        let info = classify(&faces, &ClassifierPolicy::default());
        assert_eq!(info.main_axis, Some(Axis::Y));
        assert!((info.largest_cylinder_radius - 20.0).abs() < 1e-12);
    }
}
