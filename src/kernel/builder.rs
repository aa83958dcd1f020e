//! In-memory construction of solids: turned profiles and extruded blocks.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GeometryError, KernelResult, OperationError};
use crate::geometry::curve::{Arc, Line};
use crate::geometry::surface::{Cone, Cylinder, Plane, Sphere, Torus};
use crate::math::polygon_2d::{point_in_polygon, point_segment_distance, signed_area, BoundarySegment, RegionMoments};
use crate::math::{perpendicular_dir, Point2, Point3, Vector3, LINEAR_TOLERANCE, TOLERANCE};
use crate::topology::{
    AxisFrame, EdgeCurve, EdgeData, FaceBounds, FaceData, FaceId, FaceSurface, RevolvedPatch, SolidData,
    TopologyStore, WireData, WireId,
};

use super::BrepShape;

/// A closed `(r, z)` profile revolved a full turn about an axis.
///
/// Each profile segment becomes one face: a line at constant radius a
/// cylinder, at constant height a flat ring, otherwise a cone; an arc a
/// sphere when centred on the axis, otherwise a torus. Segments lying on the
/// axis produce no face. Faces other than flat rings are split at the seam
/// into two half-faces.
#[derive(Debug, Clone)]
pub struct Revolve {
    frame: AxisFrame,
    profile: Vec<BoundarySegment>,
}

impl Revolve {
    /// Validates a profile given as consecutive segments in `(r, z)`.
    ///
    /// The profile may be wound either way; it is stored counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is zero-length, the profile is empty, open,
    /// crosses to negative radius or encloses no area.
    pub fn new(origin: Point3, axis: Vector3, profile: Vec<BoundarySegment>) -> KernelResult<Self> {
        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / len;
        if profile.is_empty() {
            return Err(OperationError::InvalidInput("revolve profile is empty".into()).into());
        }
        for (i, seg) in profile.iter().enumerate() {
            let next = &profile[(i + 1) % profile.len()];
            if (seg.point_at(1.0) - next.point_at(0.0)).norm() > LINEAR_TOLERANCE {
                return Err(OperationError::InvalidInput(format!("revolve profile is open after segment {i}")).into());
            }
            if seg.sample(33).iter().any(|p| p.x < -LINEAR_TOLERANCE) {
                return Err(OperationError::InvalidInput(format!("segment {i} crosses the axis")).into());
            }
        }
        let area = RegionMoments::of_loop(&profile).area();
        if area.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput("revolve profile encloses no area".into()).into());
        }
        let profile = if area < 0.0 { reverse_loop(&profile) } else { profile };

        Ok(Self {
            frame: AxisFrame {
                origin,
                axis,
                ref_dir: perpendicular_dir(&axis),
            },
            profile,
        })
    }

    /// Builds the solid.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment yields an unsupported surface, such as an
    /// arc whose circle crosses the axis.
    pub fn build(&self, name: &str) -> KernelResult<BrepShape> {
        let mut store = TopologyStore::new();
        let mut faces = Vec::new();
        for seg in &self.profile {
            if let BoundarySegment::Line { a, b } = seg {
                if a.x.abs() < LINEAR_TOLERANCE && b.x.abs() < LINEAR_TOLERANCE {
                    continue;
                }
                if (b - a).norm() < LINEAR_TOLERANCE {
                    continue;
                }
            }
            let surface = self.surface_for(seg)?;
            let ring = matches!(surface, FaceSurface::Plane(_));
            let spans: &[(f64, f64)] = if ring { &[(0.0, TAU)] } else { &[(0.0, PI), (PI, TAU)] };
            for &(u_start, u_end) in spans {
                let patch = RevolvedPatch {
                    meridian: *seg,
                    frame: self.frame,
                    u_start,
                    u_end,
                };
                faces.push(store.add_face(revolved_face(surface.clone(), patch)?));
            }
        }
        if faces.is_empty() {
            return Err(OperationError::InvalidInput("profile lies entirely on the axis".into()).into());
        }
        debug!(part = name, faces = faces.len(), "built revolved solid");
        let solid = store.add_solid(SolidData { faces });
        Ok(BrepShape::new(name, store, solid))
    }

    fn surface_for(&self, seg: &BoundarySegment) -> KernelResult<FaceSurface> {
        let f = &self.frame;
        let on_axis = |h: f64| f.origin + f.axis * h;
        match *seg {
            BoundarySegment::Line { a, b } => {
                let (dr, dh) = (b.x - a.x, b.y - a.y);
                if dr.abs() < LINEAR_TOLERANCE {
                    Ok(FaceSurface::Cylinder(Cylinder::new(f.origin, a.x, f.axis, f.ref_dir)?))
                } else if dh.abs() < LINEAR_TOLERANCE {
                    Ok(FaceSurface::Plane(Plane::new(on_axis(a.y), f.ref_dir, f.binormal())?))
                } else {
                    let apex_h = a.y - a.x * dh / dr;
                    let opening = if dr * dh > 0.0 { f.axis } else { -f.axis };
                    let half_angle = (dr.abs() / dh.abs()).atan();
                    Ok(FaceSurface::Cone(Cone::new(on_axis(apex_h), opening, half_angle, f.ref_dir)?))
                }
            }
            BoundarySegment::Arc { center, radius, .. } => {
                if center.x.abs() < LINEAR_TOLERANCE {
                    Ok(FaceSurface::Sphere(Sphere::new(on_axis(center.y), radius, f.axis, f.ref_dir)?))
                } else if radius < center.x {
                    Ok(FaceSurface::Torus(Torus::new(
                        on_axis(center.y),
                        center.x,
                        radius,
                        f.axis,
                        f.ref_dir,
                    )?))
                } else {
                    Err(OperationError::Unsupported(format!(
                        "arc of radius {radius} centred {} from the axis",
                        center.x
                    ))
                    .into())
                }
            }
        }
    }
}

fn reverse_loop(profile: &[BoundarySegment]) -> Vec<BoundarySegment> {
    profile
        .iter()
        .rev()
        .map(|seg| match *seg {
            BoundarySegment::Line { a, b } => BoundarySegment::Line { a: b, b: a },
            BoundarySegment::Arc {
                center,
                radius,
                start,
                end,
            } => BoundarySegment::Arc {
                center,
                radius,
                start: end,
                end: start,
            },
        })
        .collect()
}

/// Wraps a patch in a face, comparing its outward area element with the
/// surface's natural normal at the patch centre.
fn revolved_face(surface: FaceSurface, patch: RevolvedPatch) -> KernelResult<FaceData> {
    let u_mid = 0.5 * (patch.u_start + patch.u_end);
    let point = patch.point(u_mid, 0.5);
    let outward = patch.area_element(u_mid, 0.5);
    let natural = surface.as_surface().normal_at(&point)?;
    Ok(FaceData {
        surface,
        reversed: outward.dot(&natural) < 0.0,
        bounds: FaceBounds::Revolved(patch),
    })
}

/// Which end face a hole is drilled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleEntry {
    #[default]
    Top,
    Bottom,
}

/// A round hole parallel to the extrusion direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoleSpec {
    pub center: Point2,
    pub diameter: f64,
    /// `None` drills through.
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub from: HoleEntry,
}

/// A rectangular pocket milled down from the top face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PocketSpec {
    pub min: Point2,
    pub max: Point2,
    pub depth: f64,
}

/// A polygon outline extruded along +Z from `z = 0` to `z = height`, with
/// holes and pockets.
#[derive(Debug, Clone)]
pub struct Prism {
    outline: Vec<Point2>,
    height: f64,
    holes: Vec<HoleSpec>,
    pockets: Vec<PocketSpec>,
}

impl Prism {
    #[must_use]
    pub fn new(outline: Vec<Point2>, height: f64) -> Self {
        Self {
            outline,
            height,
            holes: Vec::new(),
            pockets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hole(mut self, hole: HoleSpec) -> Self {
        self.holes.push(hole);
        self
    }

    #[must_use]
    pub fn with_pocket(mut self, pocket: PocketSpec) -> Self {
        self.pockets.push(pocket);
        self
    }

    /// Builds the solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the outline is degenerate, or a hole or pocket
    /// leaves the outline, breaks through the bottom or overlaps another.
    pub fn build(&self, name: &str) -> KernelResult<BrepShape> {
        let outline = self.validated_outline()?;
        self.validate_cutouts(&outline)?;
        let h = self.height;
        let at = |p: &Point2, z: f64| Point3::new(p.x, p.y, z);

        let mut store = TopologyStore::new();
        let mut faces = Vec::new();

        // Bottom and top faces with the openings they carry.
        let mut bottom_inner = Vec::new();
        let mut top_inner = Vec::new();
        for hole in &self.holes {
            let through = self.is_through(hole);
            if through || hole.from == HoleEntry::Bottom {
                bottom_inner.push(circle_wire(&mut store, at(&hole.center, 0.0), hole.diameter / 2.0)?);
            }
            if through || hole.from == HoleEntry::Top {
                top_inner.push(circle_wire(&mut store, at(&hole.center, h), hole.diameter / 2.0)?);
            }
        }
        for pocket in &self.pockets {
            let corners = rect_corners(pocket, h);
            top_inner.push(polygon_wire(&mut store, &corners)?);
        }
        let bottom_outer = polygon_wire(&mut store, &outline.iter().map(|p| at(p, 0.0)).collect::<Vec<_>>())?;
        let top_outer = polygon_wire(&mut store, &outline.iter().map(|p| at(p, h)).collect::<Vec<_>>())?;
        faces.push(planar_face(
            &mut store,
            Plane::new(Point3::origin(), Vector3::x(), -Vector3::y())?,
            bottom_outer,
            bottom_inner,
        ));
        faces.push(planar_face(
            &mut store,
            Plane::new(Point3::new(0.0, 0.0, h), Vector3::x(), Vector3::y())?,
            top_outer,
            top_inner,
        ));

        // Side walls.
        for (i, a) in outline.iter().enumerate() {
            let b = &outline[(i + 1) % outline.len()];
            let d = b - a;
            let outward = Vector3::new(d.y, -d.x, 0.0).normalize();
            faces.push(rect_face(&mut store, [at(a, 0.0), at(b, 0.0), at(b, h), at(a, h)], outward)?);
        }

        for hole in &self.holes {
            faces.extend(self.hole_faces(&mut store, hole)?);
        }
        for pocket in &self.pockets {
            faces.extend(pocket_faces(&mut store, pocket, h)?);
        }

        debug!(part = name, faces = faces.len(), "built prismatic solid");
        let solid = store.add_solid(SolidData { faces });
        Ok(BrepShape::new(name, store, solid))
    }

    fn is_through(&self, hole: &HoleSpec) -> bool {
        !matches!(hole.depth, Some(d) if d < self.height - LINEAR_TOLERANCE)
    }

    fn validated_outline(&self) -> KernelResult<Vec<Point2>> {
        if self.outline.len() < 3 {
            return Err(OperationError::InvalidInput("outline needs at least three points".into()).into());
        }
        if self.height <= LINEAR_TOLERANCE {
            return Err(OperationError::InvalidInput("extrusion height must be positive".into()).into());
        }
        let area = signed_area(&self.outline);
        if area.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput("outline encloses no area".into()).into());
        }
        let mut outline = self.outline.clone();
        if area < 0.0 {
            outline.reverse();
        }
        Ok(outline)
    }

    fn validate_cutouts(&self, outline: &[Point2]) -> KernelResult<()> {
        let clearance = |p: &Point2| {
            (0..outline.len())
                .map(|i| point_segment_distance(p, &outline[i], &outline[(i + 1) % outline.len()]))
                .fold(f64::INFINITY, f64::min)
        };
        let invalid = |msg: String| -> KernelResult<()> { Err(OperationError::InvalidInput(msg).into()) };

        for (i, hole) in self.holes.iter().enumerate() {
            let r = hole.diameter / 2.0;
            if r <= LINEAR_TOLERANCE {
                return invalid(format!("hole {i} has no diameter"));
            }
            if hole.depth.is_some_and(|d| d <= LINEAR_TOLERANCE) {
                return invalid(format!("hole {i} has no depth"));
            }
            if !point_in_polygon(&hole.center, outline) || clearance(&hole.center) <= r {
                return invalid(format!("hole {i} breaks out of the outline"));
            }
            for (j, other) in self.holes.iter().enumerate().skip(i + 1) {
                if (hole.center - other.center).norm() <= r + other.diameter / 2.0 {
                    return invalid(format!("holes {i} and {j} overlap"));
                }
            }
            for (j, pocket) in self.pockets.iter().enumerate() {
                let nearest = Point2::new(
                    hole.center.x.clamp(pocket.min.x, pocket.max.x),
                    hole.center.y.clamp(pocket.min.y, pocket.max.y),
                );
                if (hole.center - nearest).norm() <= r {
                    return invalid(format!("hole {i} overlaps pocket {j}"));
                }
            }
        }

        for (i, pocket) in self.pockets.iter().enumerate() {
            if pocket.max.x - pocket.min.x <= LINEAR_TOLERANCE || pocket.max.y - pocket.min.y <= LINEAR_TOLERANCE {
                return invalid(format!("pocket {i} has no area"));
            }
            if pocket.depth <= LINEAR_TOLERANCE || pocket.depth >= self.height - LINEAR_TOLERANCE {
                return invalid(format!("pocket {i} depth must be inside the part"));
            }
            let corners = [
                pocket.min,
                Point2::new(pocket.max.x, pocket.min.y),
                pocket.max,
                Point2::new(pocket.min.x, pocket.max.y),
            ];
            let inside = corners
                .iter()
                .all(|c| point_in_polygon(c, outline) && clearance(c) > LINEAR_TOLERANCE);
            let swallows_vertex = outline
                .iter()
                .any(|v| v.x > pocket.min.x && v.x < pocket.max.x && v.y > pocket.min.y && v.y < pocket.max.y);
            if !inside || swallows_vertex {
                return invalid(format!("pocket {i} breaks out of the outline"));
            }
            for (j, other) in self.pockets.iter().enumerate().skip(i + 1) {
                let apart = pocket.max.x < other.min.x
                    || other.max.x < pocket.min.x
                    || pocket.max.y < other.min.y
                    || other.max.y < pocket.min.y;
                if !apart {
                    return invalid(format!("pockets {i} and {j} overlap"));
                }
            }
        }
        Ok(())
    }

    /// Wall halves, plus a floor for blind holes. Meridians run downward so
    /// the area element points at the hole axis.
    fn hole_faces(&self, store: &mut TopologyStore, hole: &HoleSpec) -> KernelResult<Vec<FaceId>> {
        let r = hole.diameter / 2.0;
        let h = self.height;
        let (z_lo, z_hi) = match (self.is_through(hole), hole.from, hole.depth) {
            (false, HoleEntry::Top, Some(d)) => (h - d, h),
            (false, HoleEntry::Bottom, Some(d)) => (0.0, d),
            _ => (0.0, h),
        };
        let frame = AxisFrame {
            origin: Point3::new(hole.center.x, hole.center.y, 0.0),
            axis: Vector3::z(),
            ref_dir: Vector3::x(),
        };
        let wall = BoundarySegment::Line {
            a: Point2::new(r, z_hi),
            b: Point2::new(r, z_lo),
        };
        let cylinder = FaceSurface::Cylinder(Cylinder::new(frame.origin, r, frame.axis, frame.ref_dir)?);

        let mut faces = Vec::new();
        for (u_start, u_end) in [(0.0, PI), (PI, TAU)] {
            let patch = RevolvedPatch {
                meridian: wall,
                frame,
                u_start,
                u_end,
            };
            faces.push(store.add_face(revolved_face(cylinder.clone(), patch)?));
        }

        if !self.is_through(hole) {
            let (z_floor, meridian) = match hole.from {
                HoleEntry::Top => (
                    z_lo,
                    BoundarySegment::Line {
                        a: Point2::new(r, z_lo),
                        b: Point2::new(0.0, z_lo),
                    },
                ),
                HoleEntry::Bottom => (
                    z_hi,
                    BoundarySegment::Line {
                        a: Point2::new(0.0, z_hi),
                        b: Point2::new(r, z_hi),
                    },
                ),
            };
            let plane = Plane::new(frame.point(0.0, 0.0, z_floor), Vector3::x(), Vector3::y())?;
            let patch = RevolvedPatch {
                meridian,
                frame,
                u_start: 0.0,
                u_end: TAU,
            };
            faces.push(store.add_face(revolved_face(FaceSurface::Plane(plane), patch)?));
        }
        Ok(faces)
    }
}

fn rect_corners(pocket: &PocketSpec, z: f64) -> [Point3; 4] {
    [
        Point3::new(pocket.min.x, pocket.min.y, z),
        Point3::new(pocket.max.x, pocket.min.y, z),
        Point3::new(pocket.max.x, pocket.max.y, z),
        Point3::new(pocket.min.x, pocket.max.y, z),
    ]
}

/// Floor and four walls, each wall facing into the pocket.
fn pocket_faces(store: &mut TopologyStore, pocket: &PocketSpec, height: f64) -> KernelResult<Vec<FaceId>> {
    let z = height - pocket.depth;
    let floor = rect_corners(pocket, z);
    let top = rect_corners(pocket, height);
    let centre = Point3::new(
        0.5 * (pocket.min.x + pocket.max.x),
        0.5 * (pocket.min.y + pocket.max.y),
        z,
    );

    let mut faces = vec![rect_face(store, floor, Vector3::z())?];
    for i in 0..4 {
        let j = (i + 1) % 4;
        let mid = nalgebra::center(&floor[i], &floor[j]);
        let inward = centre - mid;
        let outward = Vector3::new(inward.x, inward.y, 0.0).normalize();
        faces.push(rect_face(store, [floor[i], floor[j], top[j], top[i]], outward)?);
    }
    Ok(faces)
}

fn line_edge(a: Point3, b: Point3) -> KernelResult<EdgeData> {
    let (line, length) = Line::through(a, b)?;
    Ok(EdgeData {
        curve: EdgeCurve::Line(line),
        t_start: 0.0,
        t_end: length,
    })
}

fn polygon_wire(store: &mut TopologyStore, points: &[Point3]) -> KernelResult<WireId> {
    let mut edges = Vec::with_capacity(points.len());
    for (i, a) in points.iter().enumerate() {
        let edge = line_edge(*a, points[(i + 1) % points.len()])?;
        edges.push(store.add_edge(edge));
    }
    Ok(store.add_wire(WireData { edges })?)
}

/// Full circle about +Z as two half arcs, matching the split wall faces.
fn circle_wire(store: &mut TopologyStore, center: Point3, radius: f64) -> KernelResult<WireId> {
    let arc = Arc::new(center, radius, Vector3::z(), Vector3::x())?;
    let edges = [(0.0, PI), (PI, TAU)]
        .into_iter()
        .map(|(t_start, t_end)| {
            store.add_edge(EdgeData {
                curve: EdgeCurve::Arc(arc.clone()),
                t_start,
                t_end,
            })
        })
        .collect();
    Ok(store.add_wire(WireData { edges })?)
}

/// A planar face whose plane normal is already the outward normal.
fn planar_face(store: &mut TopologyStore, plane: Plane, outer: WireId, inner: Vec<WireId>) -> FaceId {
    store.add_face(FaceData {
        surface: FaceSurface::Plane(plane),
        bounds: FaceBounds::Loops { outer, inner },
        reversed: false,
    })
}

fn rect_face(store: &mut TopologyStore, corners: [Point3; 4], outward: Vector3) -> KernelResult<FaceId> {
    let u = corners[1] - corners[0];
    let v = outward.cross(&u);
    let plane = Plane::new(corners[0], u, v)?;
    let wire = polygon_wire(store, &corners)?;
    Ok(planar_face(store, plane, wire, Vec::new()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::kernel::{BrepKernel, GeometryKernel, SurfaceKind};

    fn block() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 0.0),
            Point2::new(40.0, 30.0),
            Point2::new(0.0, 30.0),
        ]
    }

    fn line(a: (f64, f64), b: (f64, f64)) -> BoundarySegment {
        BoundarySegment::Line {
            a: Point2::new(a.0, a.1),
            b: Point2::new(b.0, b.1),
        }
    }

    #[test]
    fn clockwise_profile_is_reoriented() {
        let profile = vec![
            line((0.0, 0.0), (0.0, 10.0)),
            line((0.0, 10.0), (5.0, 10.0)),
            line((5.0, 10.0), (5.0, 0.0)),
            line((5.0, 0.0), (0.0, 0.0)),
        ];
        let shape = Revolve::new(Point3::origin(), Vector3::z(), profile).unwrap().build("pin").unwrap();
        let faces = BrepKernel.faces(&shape).unwrap();
        // Two end discs and two cylinder halves; the axis segment is skipped.
        assert_eq!(faces.len(), 4);
        let cylinders: Vec<_> = faces.iter().filter(|f| f.surface.kind() == SurfaceKind::Cylinder).collect();
        assert_eq!(cylinders.len(), 2);
        assert!(cylinders.iter().all(|f| !f.reversed));
        // The bottom disc faces down, against its plane's natural normal.
        assert_eq!(faces.iter().filter(|f| f.reversed).count(), 1);
    }

    #[test]
    fn bore_faces_are_reversed() {
        let profile = vec![
            line((4.0, 0.0), (10.0, 0.0)),
            line((10.0, 0.0), (10.0, 20.0)),
            line((10.0, 20.0), (4.0, 20.0)),
            line((4.0, 20.0), (4.0, 0.0)),
        ];
        let shape = Revolve::new(Point3::origin(), Vector3::z(), profile).unwrap().build("ring").unwrap();
        let faces = BrepKernel.faces(&shape).unwrap();
        let reversed_cylinders: Vec<_> = faces
            .iter()
            .filter(|f| f.surface.kind() == SurfaceKind::Cylinder && f.reversed)
            .collect();
        assert_eq!(reversed_cylinders.len(), 2);
        assert!(reversed_cylinders.iter().all(|f| (f.surface.cylinder_radius() - 4.0).abs() < 1e-12));
    }

    #[test]
    fn chamfer_becomes_cone_and_fillet_torus() {
        let profile = vec![
            line((0.0, 0.0), (8.0, 0.0)),
            line((8.0, 0.0), (10.0, 2.0)),
            line((10.0, 2.0), (10.0, 18.0)),
            BoundarySegment::Arc {
                center: Point2::new(8.0, 18.0),
                radius: 2.0,
                start: 0.0,
                end: PI / 2.0,
            },
            line((8.0, 20.0), (0.0, 20.0)),
            line((0.0, 20.0), (0.0, 0.0)),
        ];
        let shape = Revolve::new(Point3::origin(), Vector3::z(), profile).unwrap().build("pin").unwrap();
        let kinds: Vec<_> = BrepKernel.faces(&shape).unwrap().iter().map(|f| f.surface.kind()).collect();
        assert_eq!(kinds.iter().filter(|k| **k == SurfaceKind::Cone).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == SurfaceKind::Torus).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == SurfaceKind::Plane).count(), 2);
    }

    #[test]
    fn open_profile_is_rejected() {
        let profile = vec![line((0.0, 0.0), (5.0, 0.0)), line((5.0, 0.0), (5.0, 5.0))];
        assert!(Revolve::new(Point3::origin(), Vector3::z(), profile).is_err());
    }

    #[test]
    fn through_hole_has_two_reversed_halves() {
        let shape = Prism::new(block(), 10.0)
            .with_hole(HoleSpec {
                center: Point2::new(20.0, 15.0),
                diameter: 8.0,
                depth: None,
                from: HoleEntry::Top,
            })
            .build("plate")
            .unwrap();
        let faces = BrepKernel.faces(&shape).unwrap();
        assert_eq!(faces.len(), 8);
        let holes: Vec<_> = faces.iter().filter(|f| f.surface.kind() == SurfaceKind::Cylinder).collect();
        assert_eq!(holes.len(), 2);
        assert!(holes.iter().all(|f| f.reversed));
    }

    #[test]
    fn blind_hole_from_bottom_has_downward_floor() {
        let shape = Prism::new(block(), 10.0)
            .with_hole(HoleSpec {
                center: Point2::new(10.0, 10.0),
                diameter: 6.0,
                depth: Some(4.0),
                from: HoleEntry::Bottom,
            })
            .build("plate")
            .unwrap();
        let faces = BrepKernel.faces(&shape).unwrap();
        let floor = faces.last().unwrap();
        assert_eq!(floor.surface.kind(), SurfaceKind::Plane);
        let n = floor.outward_plane_normal().unwrap();
        assert!((n + Vector3::z()).norm() < 1e-12);
        let bbox = BrepKernel.face_bounding_box(&shape, floor.index).unwrap();
        assert!((bbox.min.z - 4.0).abs() < 1e-12);
    }

    #[test]
    fn hole_breaking_out_is_rejected() {
        let result = Prism::new(block(), 10.0)
            .with_hole(HoleSpec {
                center: Point2::new(2.0, 15.0),
                diameter: 8.0,
                depth: None,
                from: HoleEntry::Top,
            })
            .build("plate");
        assert!(result.is_err());
    }

    #[test]
    fn pocket_adds_floor_and_four_walls() {
        let shape = Prism::new(block(), 10.0)
            .with_pocket(PocketSpec {
                min: Point2::new(5.0, 5.0),
                max: Point2::new(20.0, 25.0),
                depth: 4.0,
            })
            .build("plate")
            .unwrap();
        assert_eq!(BrepKernel.faces(&shape).unwrap().len(), 11);
        let bbox = BrepKernel.bounding_box(&shape).unwrap();
        assert!((bbox.extent() - Vector3::new(40.0, 30.0, 10.0)).norm() < 1e-12);
    }
}
