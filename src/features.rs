//! Machining features: the closed feature vocabulary, its classification
//! tables, and recognition from a shape's face inventory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::{Axis, AxisInfo};
use crate::error::KernelResult;
use crate::kernel::{Aabb, FaceInfo, GeometryKernel, SurfaceInfo};
use crate::math::{Point3, Vector3};

/// Coaxial holes up to this radius are drilled rather than bored.
const AXIAL_DRILL_MAX_RADIUS: f64 = 6.0;

/// Parallel test on unit vectors for recognition.
const PARALLEL_DOT: f64 = 0.9;

/// Perpendicular test on unit vectors for recognition.
const PERPENDICULAR_DOT: f64 = 0.1;

/// Coaxial faces lie within this distance of the main axis line.
const COAXIAL_OFFSET_MM: f64 = 1.0;

/// Tolerance for faces lying on the part's bounding box.
const BOUNDARY_TOLERANCE_MM: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    OdTurn,
    Facing,
    Bore,
    Groove,
    Chamfer,
    Thread,
    AxialDrill,
    Parting,
    RadialDrill,
    RadialMill,
    Flat,
    Slot,
    OffAxisDrill,
    FaceMill,
    Pocket,
    Drill,
    Contour,
    Step,
    FreeformSurface,
    SculptedPocket,
}

impl FeatureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OdTurn => "od_turn",
            Self::Facing => "facing",
            Self::Bore => "bore",
            Self::Groove => "groove",
            Self::Chamfer => "chamfer",
            Self::Thread => "thread",
            Self::AxialDrill => "axial_drill",
            Self::Parting => "parting",
            Self::RadialDrill => "radial_drill",
            Self::RadialMill => "radial_mill",
            Self::Flat => "flat",
            Self::Slot => "slot",
            Self::OffAxisDrill => "off_axis_drill",
            Self::FaceMill => "face_mill",
            Self::Pocket => "pocket",
            Self::Drill => "drill",
            Self::Contour => "contour",
            Self::Step => "step",
            Self::FreeformSurface => "freeform_surface",
            Self::SculptedPocket => "sculpted_pocket",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Turning,
    Milling,
}

/// Which process family machines a feature kind.
#[must_use]
pub fn process_of(kind: FeatureKind) -> ProcessKind {
    match kind {
        FeatureKind::OdTurn
        | FeatureKind::Facing
        | FeatureKind::Bore
        | FeatureKind::Groove
        | FeatureKind::Chamfer
        | FeatureKind::Thread
        | FeatureKind::AxialDrill
        | FeatureKind::Parting => ProcessKind::Turning,
        FeatureKind::RadialDrill
        | FeatureKind::RadialMill
        | FeatureKind::Flat
        | FeatureKind::Slot
        | FeatureKind::OffAxisDrill
        | FeatureKind::FaceMill
        | FeatureKind::Pocket
        | FeatureKind::Drill
        | FeatureKind::Contour
        | FeatureKind::Step
        | FeatureKind::FreeformSurface
        | FeatureKind::SculptedPocket => ProcessKind::Milling,
    }
}

/// Milling operations a lathe performs with driven tools.
#[must_use]
pub fn is_live_tooling(kind: FeatureKind) -> bool {
    matches!(
        kind,
        FeatureKind::RadialDrill
            | FeatureKind::RadialMill
            | FeatureKind::Flat
            | FeatureKind::Slot
            | FeatureKind::OffAxisDrill
    )
}

/// Surfaces that need simultaneous multi-axis motion.
#[must_use]
pub fn is_complex_3d(kind: FeatureKind) -> bool {
    matches!(kind, FeatureKind::FreeformSurface | FeatureKind::SculptedPocket)
}

/// Face of a prismatic part a feature is machined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSide {
    /// +Z
    Top,
    /// -Z
    Bottom,
    /// -Y
    Front,
    /// +Y
    Back,
    /// -X
    Left,
    /// +X
    Right,
}

impl AccessSide {
    fn along(axis: Axis, positive: bool) -> Self {
        match (axis, positive) {
            (Axis::Z, true) => Self::Top,
            (Axis::Z, false) => Self::Bottom,
            (Axis::Y, true) => Self::Back,
            (Axis::Y, false) => Self::Front,
            (Axis::X, true) => Self::Right,
            (Axis::X, false) => Self::Left,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for AccessSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feature listed explicitly in a part document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclaredFeature {
    pub kind: FeatureKind,
    #[serde(default)]
    pub side: Option<AccessSide>,
    #[serde(default)]
    pub position: Option<Point3>,
}

/// A machining feature of the planned part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    /// `F1`, `F2`, ... in recognition order.
    pub id: String,
    pub kind: FeatureKind,
    pub side: Option<AccessSide>,
    /// Coordinate along the main axis, for rotational parts.
    pub axial_position: Option<f64>,
    pub location: Point3,
    pub machining_time_min: f64,
}

impl Feature {
    #[must_use]
    pub fn to_ref(&self) -> FeatureRef {
        FeatureRef {
            id: self.id.clone(),
            kind: self.kind,
        }
    }
}

/// Compact feature reference stored in setups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRef {
    pub id: String,
    pub kind: FeatureKind,
}

/// Builds features from a document's explicit list.
#[must_use]
pub fn from_declared(declared: &[DeclaredFeature], info: &AxisInfo, bbox: &Aabb) -> Vec<Feature> {
    let axis = info.main_axis.filter(|_| info.is_rotational());
    let candidates = declared
        .iter()
        .map(|d| {
            let location = d.position.unwrap_or_else(|| bbox.center());
            let side = d.side.or(if axis.is_some() { None } else { Some(AccessSide::Top) });
            (d.kind, side, location)
        })
        .collect();
    numbered(candidates, axis)
}

/// Recognizes features from the face inventory.
///
/// # Errors
///
/// Returns an error if a face bounding box query fails.
pub fn recognize<K: GeometryKernel>(
    kernel: &K,
    shape: &K::Shape,
    faces: &[FaceInfo],
    info: &AxisInfo,
    bbox: &Aabb,
) -> KernelResult<Vec<Feature>> {
    let groups = merge_split_faces(kernel, shape, faces)?;
    let rotational_axis = info.main_axis.filter(|_| info.is_rotational());
    let candidates = match rotational_axis {
        Some(axis) => recognize_turned(&groups, axis, &info.axis_position, bbox),
        None => recognize_milled(&groups, bbox),
    };
    Ok(numbered(candidates, rotational_axis))
}

/// Spreads a cutting time evenly over the features.
pub fn apportion_time(features: &mut [Feature], total_min: f64) {
    if features.is_empty() {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let share = total_min / features.len() as f64;
    for feature in features {
        feature.machining_time_min = share;
    }
}

fn numbered(candidates: Vec<(FeatureKind, Option<AccessSide>, Point3)>, axis: Option<Axis>) -> Vec<Feature> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, (kind, side, location))| Feature {
            id: format!("F{}", i + 1),
            kind,
            side,
            axial_position: axis.map(|a| location[a.index()]),
            location,
            machining_time_min: 0.0,
        })
        .collect()
}

/// A face, or the halves of a face split at its seam, with their joint box.
struct FaceGroup {
    face: FaceInfo,
    bbox: Aabb,
}

fn merge_split_faces<K: GeometryKernel>(kernel: &K, shape: &K::Shape, faces: &[FaceInfo]) -> KernelResult<Vec<FaceGroup>> {
    let mut groups: Vec<FaceGroup> = Vec::new();
    for face in faces {
        let bbox = kernel.face_bounding_box(shape, face.index)?;
        let mergeable = !matches!(face.surface, SurfaceInfo::Plane { .. });
        let existing = groups.iter_mut().find(|g| {
            mergeable
                && g.face.surface == face.surface
                && g.face.reversed == face.reversed
                && same_axial_span(&g.face.surface, &g.bbox, &bbox)
        });
        match existing {
            Some(group) => group.bbox.merge(&bbox),
            None => groups.push(FaceGroup { face: *face, bbox }),
        }
    }
    Ok(groups)
}

fn same_axial_span(surface: &SurfaceInfo, a: &Aabb, b: &Aabb) -> bool {
    let Some((_, dir)) = surface.rotation_axis() else {
        return true;
    };
    let (a_lo, a_hi) = projected_span(a, &dir);
    let (b_lo, b_hi) = projected_span(b, &dir);
    (a_lo - b_lo).abs() < BOUNDARY_TOLERANCE_MM && (a_hi - b_hi).abs() < BOUNDARY_TOLERANCE_MM
}

fn projected_span(bbox: &Aabb, dir: &Vector3) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..8 {
        let corner = Vector3::new(
            if i & 1 == 0 { bbox.min.x } else { bbox.max.x },
            if i & 2 == 0 { bbox.min.y } else { bbox.max.y },
            if i & 4 == 0 { bbox.min.z } else { bbox.max.z },
        );
        let t = corner.dot(dir);
        lo = lo.min(t);
        hi = hi.max(t);
    }
    (lo, hi)
}

fn recognize_turned(
    groups: &[FaceGroup],
    axis: Axis,
    axis_point: &Point3,
    bbox: &Aabb,
) -> Vec<(FeatureKind, Option<AccessSide>, Point3)> {
    let a = axis.unit();
    let idx = axis.index();
    let off_axis = |p: &Point3| {
        let d = p - axis_point;
        (d - a * d.dot(&a)).norm()
    };

    let mut out = Vec::new();
    for g in groups {
        let kind = match g.face.surface {
            SurfaceInfo::Cylinder { location, axis: dir, radius } => {
                let dot = dir.dot(&a).abs();
                if dot > PARALLEL_DOT {
                    match (off_axis(&location) < COAXIAL_OFFSET_MM, g.face.reversed) {
                        (true, false) => Some(FeatureKind::OdTurn),
                        (true, true) if radius <= AXIAL_DRILL_MAX_RADIUS => Some(FeatureKind::AxialDrill),
                        (true, true) => Some(FeatureKind::Bore),
                        (false, true) => Some(FeatureKind::OffAxisDrill),
                        (false, false) => Some(FeatureKind::RadialMill),
                    }
                } else if dot < PERPENDICULAR_DOT && g.face.reversed {
                    Some(FeatureKind::RadialDrill)
                } else {
                    Some(FeatureKind::RadialMill)
                }
            }
            SurfaceInfo::Cone { apex, axis: dir, .. } => {
                if dir.dot(&a).abs() > PARALLEL_DOT && off_axis(&apex) < COAXIAL_OFFSET_MM {
                    Some(FeatureKind::Chamfer)
                } else {
                    Some(FeatureKind::RadialMill)
                }
            }
            SurfaceInfo::Torus { center, axis: dir, .. } => {
                let coaxial = dir.dot(&a).abs() > PARALLEL_DOT && off_axis(&center) < COAXIAL_OFFSET_MM;
                match (coaxial, g.face.reversed) {
                    (true, true) => Some(FeatureKind::Groove),
                    // Convex fillets are cut by the OD profile pass.
                    (true, false) => None,
                    (false, _) => Some(FeatureKind::RadialMill),
                }
            }
            SurfaceInfo::Sphere { center, .. } => {
                if off_axis(&center) < COAXIAL_OFFSET_MM {
                    Some(FeatureKind::OdTurn)
                } else {
                    Some(FeatureKind::FreeformSurface)
                }
            }
            SurfaceInfo::Plane { normal, .. } => {
                let dot = normal.dot(&a).abs();
                if dot > PARALLEL_DOT {
                    let c = g.bbox.center()[idx];
                    let at_end = (c - bbox.min[idx]).abs() < BOUNDARY_TOLERANCE_MM
                        || (c - bbox.max[idx]).abs() < BOUNDARY_TOLERANCE_MM;
                    // Shoulders and bore floors come with the turned profile.
                    at_end.then_some(FeatureKind::Facing)
                } else {
                    Some(FeatureKind::Flat)
                }
            }
        };
        if let Some(kind) = kind {
            out.push((kind, None, g.bbox.center()));
        }
    }
    out
}

fn recognize_milled(groups: &[FaceGroup], bbox: &Aabb) -> Vec<(FeatureKind, Option<AccessSide>, Point3)> {
    let tol = BOUNDARY_TOLERANCE_MM;
    let holes: Vec<&FaceGroup> = groups
        .iter()
        .filter(|g| g.face.reversed && matches!(g.face.surface, SurfaceInfo::Cylinder { .. }))
        .collect();
    let inside_hole = |b: &Aabb| {
        holes.iter().any(|h| {
            (0..3).all(|i| b.min[i] >= h.bbox.min[i] - tol && b.max[i] <= h.bbox.max[i] + tol)
        })
    };
    let on_box = |value: f64, i: usize| (value - bbox.min[i]).abs() < tol || (value - bbox.max[i]).abs() < tol;

    let mut out: Vec<(FeatureKind, Option<AccessSide>, Aabb)> = Vec::new();
    for g in groups {
        let candidate = match g.face.surface {
            SurfaceInfo::Cylinder { axis, .. } if g.face.reversed => {
                let side = Axis::dominant(&axis, PARALLEL_DOT).map_or(AccessSide::Top, |ax| {
                    let i = ax.index();
                    let at_max = (g.bbox.max[i] - bbox.max[i]).abs() < tol;
                    let at_min = (g.bbox.min[i] - bbox.min[i]).abs() < tol;
                    AccessSide::along(ax, at_max || !at_min)
                });
                Some((FeatureKind::Drill, side))
            }
            SurfaceInfo::Cylinder { .. } | SurfaceInfo::Cone { .. } | SurfaceInfo::Torus { .. } => {
                Some((FeatureKind::Contour, AccessSide::Top))
            }
            SurfaceInfo::Sphere { .. } => Some((FeatureKind::FreeformSurface, AccessSide::Top)),
            SurfaceInfo::Plane { .. } => {
                let outward = g.face.outward_plane_normal().unwrap_or_else(Vector3::z);
                match Axis::dominant(&outward, PARALLEL_DOT) {
                    None => Some((FeatureKind::Contour, AccessSide::Top)),
                    Some(_) if inside_hole(&g.bbox) => None,
                    Some(ax) => {
                        let i = ax.index();
                        let positive = outward[i] > 0.0;
                        if on_box(g.bbox.min[i], i) {
                            (ax == Axis::Z && positive).then_some((FeatureKind::FaceMill, AccessSide::Top))
                        } else if ax == Axis::Z {
                            let enclosed = (0..2).all(|j| {
                                g.bbox.min[j] > bbox.min[j] + tol && g.bbox.max[j] < bbox.max[j] - tol
                            });
                            let kind = if enclosed { FeatureKind::Pocket } else { FeatureKind::Step };
                            Some((kind, AccessSide::along(Axis::Z, positive)))
                        } else {
                            // Full-height inner walls belong to the outline; shorter
                            // ones bound a pocket or step machined with its floor.
                            let full_height =
                                g.bbox.min.z <= bbox.min.z + tol && g.bbox.max.z >= bbox.max.z - tol;
                            full_height.then_some((FeatureKind::Contour, AccessSide::Top))
                        }
                    }
                }
            }
        };
        let Some((kind, side)) = candidate else {
            continue;
        };
        if matches!(kind, FeatureKind::Contour | FeatureKind::FaceMill) {
            if let Some((_, _, b)) = out.iter_mut().find(|(k, s, _)| *k == kind && *s == Some(side)) {
                b.merge(&g.bbox);
                continue;
            }
        }
        out.push((kind, Some(side), g.bbox));
    }
    out.into_iter().map(|(kind, side, b)| (kind, side, b.center())).collect()
}
