//! Section-cut profile extraction.
//!
//! Rotational parts are cut by two perpendicular planes through the main
//! axis and reduced to an `(r, z)` contour. Prismatic parts are cut by three
//! orthogonal planes through the center of mass and kept as raw point lists.

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{Axis, AxisInfo};
use crate::error::{PlanError, Result};
use crate::kernel::{Aabb, CurveKind, CutPlane, GeometryKernel, MassProperties, SectionEdge};
use crate::math::{perpendicular_dir, Point3, Vector3};
use crate::reference::SectionPolicy;

/// Radii below this are on the axis and carry no inner contour.
const ON_AXIS_MM: f64 = 1e-6;

/// One station of a rotational contour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadialPoint {
    /// Distance from the axis line, never negative.
    pub r: f64,
    /// Position along the axis.
    pub z: f64,
}

/// Outer and inner contours of a rotational part, ordered by `z`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadialProfile {
    /// Starts and ends at `r = 0`.
    pub outer: Vec<RadialPoint>,
    pub inner: Vec<RadialPoint>,
}

impl RadialProfile {
    /// Largest outer radius.
    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.outer.iter().map(|p| p.r).fold(0.0, f64::max)
    }

    /// Axial extent covered by the outer contour.
    #[must_use]
    pub fn length(&self) -> f64 {
        match (self.outer.first(), self.outer.last()) {
            (Some(a), Some(b)) => b.z - a.z,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPlane {
    Xy,
    Xz,
    Yz,
}

impl ViewPlane {
    const ALL: [Self; 3] = [Self::Xy, Self::Xz, Self::Yz];

    fn normal(self) -> Vector3 {
        match self {
            Self::Xy => Vector3::z(),
            Self::Xz => Vector3::y(),
            Self::Yz => Vector3::x(),
        }
    }
}

/// Section of a prismatic part in one orthogonal plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub plane: ViewPlane,
    /// Sampled points of each section edge.
    pub edges: Vec<Vec<Point3>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SectionProfile {
    Rotational(RadialProfile),
    Prismatic { views: Vec<SectionView> },
    /// The section could not be computed.
    NoResult { reason: String },
}

/// Extracts the section profile of a classified part.
///
/// Section failures do not abort planning; they come back as
/// [`SectionProfile::NoResult`].
pub fn extract_profile<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    info: &AxisInfo,
    bbox: &Aabb,
    mass: &MassProperties,
    policy: &SectionPolicy,
) -> SectionProfile {
    let result = match info.main_axis.filter(|_| info.is_rotational()) {
        Some(axis) => rotational_profile(kernel, shape, axis, &info.axis_position, bbox, policy)
            .map(SectionProfile::Rotational),
        None => prismatic_views(kernel, shape, &mass.center_of_mass, policy)
            .map(|views| SectionProfile::Prismatic { views }),
    };
    result.unwrap_or_else(|err| {
        warn!(error = %err, "section profile unavailable");
        SectionProfile::NoResult { reason: err.to_string() }
    })
}

fn rotational_profile<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    axis: Axis,
    axis_point: &Point3,
    bbox: &Aabb,
    policy: &SectionPolicy,
) -> Result<RadialProfile> {
    let a = axis.unit();
    let anchor = axis_point + a * (bbox.center() - axis_point).dot(&a);
    let n1 = perpendicular_dir(&a);
    let n2 = a.cross(&n1);

    let mut stations = Vec::new();
    for normal in [n1, n2] {
        for points in sampled_section(kernel, shape, &CutPlane::new(anchor, normal), policy)? {
            for p in points {
                let d = p - anchor;
                let along = d.dot(&a);
                let r = (d - a * along).norm();
                stations.push((p.coords.dot(&a), r));
            }
        }
    }
    if stations.is_empty() {
        return Err(PlanError::SectionCut("axial planes do not meet the part".into()));
    }

    let profile = radial_contours(stations, policy);
    debug!(
        outer = profile.outer.len(),
        inner = profile.inner.len(),
        "rotational section profile"
    );
    Ok(profile)
}

/// Groups `(z, r)` samples into stations and reduces each to outer and inner radii.
fn radial_contours(mut stations: Vec<(f64, f64)>, policy: &SectionPolicy) -> RadialProfile {
    stations.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut groups: Vec<Vec<(f64, f64)>> = Vec::new();
    for (z, r) in stations {
        match groups.last_mut() {
            Some(group) if (z - mean_z(group)).abs() <= policy.z_group_tolerance_mm => group.push((z, r)),
            _ => groups.push(vec![(z, r)]),
        }
    }

    let mut profile = RadialProfile::default();
    for group in &groups {
        let z = mean_z(group);
        let max = group.iter().map(|s| s.1).fold(0.0, f64::max);
        let min = group.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
        profile.outer.push(RadialPoint { r: max, z });
        if min < max - policy.inner_gap_mm && min > ON_AXIS_MM {
            profile.inner.push(RadialPoint { r: min, z });
        }
    }

    if let Some(first) = profile.outer.first().copied() {
        if first.r > ON_AXIS_MM {
            profile.outer.insert(0, RadialPoint { r: 0.0, z: first.z });
        }
    }
    if let Some(last) = profile.outer.last().copied() {
        if last.r > ON_AXIS_MM {
            profile.outer.push(RadialPoint { r: 0.0, z: last.z });
        }
    }
    profile
}

fn mean_z(group: &[(f64, f64)]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = group.len() as f64;
    group.iter().map(|s| s.0).sum::<f64>() / n
}

fn prismatic_views<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    center: &Point3,
    policy: &SectionPolicy,
) -> Result<Vec<SectionView>> {
    ViewPlane::ALL
        .into_iter()
        .map(|plane| {
            let edges = sampled_section(kernel, shape, &CutPlane::new(*center, plane.normal()), policy)?;
            Ok(SectionView { plane, edges })
        })
        .collect()
}

fn sampled_section<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    plane: &CutPlane,
    policy: &SectionPolicy,
) -> Result<Vec<Vec<Point3>>> {
    let edges = kernel
        .section(shape, plane)
        .map_err(|err| PlanError::SectionCut(err.to_string()))?;
    Ok(edges.iter().map(|e| sample_edge(kernel, e, policy)).collect())
}

fn sample_edge<K: GeometryKernel>(kernel: &K, edge: &SectionEdge, policy: &SectionPolicy) -> Vec<Point3> {
    let n = match edge.kind() {
        CurveKind::Line => policy.line_samples,
        CurveKind::Circle => policy.arc_samples,
        CurveKind::Other => policy.curve_samples,
    };
    kernel.sample_curve(edge, &edge.domain.uniform(n))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::kernel::{BrepKernel, BrepShape, HoleEntry, HoleSpec, Prism, Revolve};
    use crate::math::polygon_2d::BoundarySegment;
    use crate::math::Point2;
    use crate::reference::ClassifierPolicy;

    fn profile_of(shape: &BrepShape) -> SectionProfile {
        let faces = BrepKernel.faces(shape).unwrap();
        let info = classify(&faces, &ClassifierPolicy::default());
        let bbox = BrepKernel.bounding_box(shape).unwrap();
        let mass = BrepKernel.mass_properties(shape).unwrap();
        extract_profile(&BrepKernel, shape, &info, &bbox, &mass, &SectionPolicy::default())
    }

    fn revolve(points: &[(f64, f64)], origin: Point3, axis: Vector3) -> BrepShape {
        let profile = (0..points.len())
            .map(|i| {
                let (a, b) = (points[i], points[(i + 1) % points.len()]);
                BoundarySegment::Line {
                    a: Point2::new(a.0, a.1),
                    b: Point2::new(b.0, b.1),
                }
            })
            .collect();
        Revolve::new(origin, axis, profile).unwrap().build("part").unwrap()
    }

    #[test]
    fn stepped_shaft_contour_is_closed_on_the_axis() {
        let shape = revolve(
            &[(0.0, 0.0), (20.0, 0.0), (20.0, 30.0), (12.0, 30.0), (12.0, 60.0), (0.0, 60.0)],
            Point3::origin(),
            Vector3::z(),
        );
        let SectionProfile::Rotational(profile) = profile_of(&shape) else {
            panic!("expected a rotational profile");
        };
        let first = profile.outer.first().unwrap();
        let last = profile.outer.last().unwrap();
        assert!(first.r.abs() < 1e-12 && last.r.abs() < 1e-12);
        assert!(first.z.abs() < 1e-9);
        assert!((last.z - 60.0).abs() < 1e-9);
        assert!((profile.max_radius() - 20.0).abs() < 1e-9);
        assert!((profile.length() - 60.0).abs() < 1e-9);
        assert!(profile.outer.iter().all(|p| p.r >= 0.0));
        assert!(profile.outer.windows(2).all(|w| w[0].z <= w[1].z));
    }

    #[test]
    fn bored_sleeve_off_origin_has_inner_contour() {
        // Sleeve along Y whose axis passes through (5, 0, -2).
        let shape = revolve(
            &[(6.0, 0.0), (15.0, 0.0), (15.0, 40.0), (6.0, 40.0)],
            Point3::new(5.0, 0.0, -2.0),
            Vector3::y(),
        );
        let SectionProfile::Rotational(profile) = profile_of(&shape) else {
            panic!("expected a rotational profile");
        };
        assert!(!profile.inner.is_empty());
        for inner in &profile.inner {
            assert!((inner.r - 6.0).abs() < 1e-9);
            let outer_r = profile
                .outer
                .iter()
                .filter(|o| (o.z - inner.z).abs() < 1e-9)
                .map(|o| o.r)
                .fold(0.0, f64::max);
            assert!(inner.r < outer_r);
        }
        assert!((profile.max_radius() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn tilted_axis_falls_back_to_no_result() {
        let shape = revolve(
            &[(0.0, 0.0), (15.0, 0.0), (15.0, 40.0), (0.0, 40.0)],
            Point3::origin(),
            Vector3::new(0.2, 0.0, 1.0),
        );
        let SectionProfile::NoResult { reason } = profile_of(&shape) else {
            panic!("expected the section failure to be recovered");
        };
        assert!(!reason.is_empty());
    }

    #[test]
    fn plate_gets_three_views() {
        let outline = vec![
            Point2::new(0.0, 0.0),
            Point2::new(60.0, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(0.0, 40.0),
        ];
        let shape = Prism::new(outline, 10.0)
            .with_hole(HoleSpec {
                center: Point2::new(20.0, 15.0),
                diameter: 8.0,
                depth: None,
                from: HoleEntry::Top,
            })
            .build("plate")
            .unwrap();
        let SectionProfile::Prismatic { views } = profile_of(&shape) else {
            panic!("expected prismatic views");
        };
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].plane, ViewPlane::Xy);
        for view in &views {
            assert!(!view.edges.is_empty());
            assert!(view.edges.iter().all(|e| e.len() >= 2));
        }
        // The XY view at mid height crosses the hole wall as circular arcs.
        assert!(views[0].edges.iter().any(|e| e.len() == 20));
    }

    #[test]
    fn close_stations_are_grouped() {
        let policy = SectionPolicy::default();
        let profile = radial_contours(vec![(10.0, 5.0), (10.03, 9.0), (20.0, 9.0), (0.0, 9.0)], &policy);
        assert_eq!(profile.outer.len(), 5);
        let mid = profile.outer[2];
        assert!((mid.z - 10.015).abs() < 1e-12);
        assert!((mid.r - 9.0).abs() < 1e-12);
        assert_eq!(profile.inner.len(), 1);
        assert!((profile.inner[0].r - 5.0).abs() < 1e-12);
        assert!((profile.inner[0].z - 10.015).abs() < 1e-12);
    }
}
