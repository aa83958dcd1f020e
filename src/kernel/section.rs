//! Planar sections of B-rep faces.

use std::f64::consts::PI;

use crate::error::{KernelResult, OperationError};
use crate::geometry::curve::{Arc, Line, Polyline};
use crate::geometry::surface::Plane;
use crate::math::intersect_3d::{plane_plane_intersect, PlanePairRelation};
use crate::math::polygon_2d::BoundarySegment;
use crate::math::{angle_between, Point2, Point3, Vector2, Vector3, LINEAR_TOLERANCE};
use crate::topology::{FaceBounds, FaceData, FaceSurface, RevolvedPatch, TopologyStore};

use super::region::{edge_segment, flatten};
use super::{CutPlane, SectionEdge};

/// Meridian samples used when a cut produces a non-circular curve.
const MERIDIAN_SAMPLES: usize = 48;

/// Cosine threshold for treating the cut as parallel or perpendicular to an axis.
const AXIS_ALIGNMENT: f64 = 1e-9;

pub(crate) fn section_face(store: &TopologyStore, face: &FaceData, cut: &CutPlane) -> KernelResult<Vec<SectionEdge>> {
    match (&face.surface, &face.bounds) {
        (FaceSurface::Plane(plane), FaceBounds::Loops { outer, inner }) => {
            let mut loops = Vec::with_capacity(inner.len() + 1);
            for &wire in std::iter::once(outer).chain(inner) {
                let mut segments = Vec::new();
                for &id in &store.wire(wire)?.edges {
                    segments.push(edge_segment(plane, store.edge(id)?));
                }
                loops.push(segments);
            }
            section_planar(plane, &loops, cut)
        }
        (_, FaceBounds::Revolved(patch)) => section_revolved(patch, cut),
        (_, FaceBounds::Loops { .. }) => Err(OperationError::Unsupported(
            "bounded loops on a curved surface".into(),
        )
        .into()),
    }
}

/// Cuts a planar region with the even-odd rule along the intersection line.
///
/// A boundary point exactly on the line counts as lying on its negative
/// side, so a line through a vertex is crossed once, not twice.
fn section_planar(plane: &Plane, loops: &[Vec<BoundarySegment>], cut: &CutPlane) -> KernelResult<Vec<SectionEdge>> {
    let cut_plane = Plane::from_normal(cut.origin, cut.normal)?;
    let PlanePairRelation::IntersectionLine { origin, direction } = plane_plane_intersect(plane, &cut_plane) else {
        return Ok(Vec::new());
    };
    let o2 = plane.project(&origin);
    let d2 = Vector2::new(direction.dot(plane.u_dir()), direction.dot(plane.v_dir())).normalize();
    let n2 = Vector2::new(-d2.y, d2.x);
    let side = |p: &Point2| n2.dot(&(p - o2));

    let mut hits = Vec::new();
    for segments in loops {
        for seg in segments {
            let mut points = flatten(std::slice::from_ref(seg));
            points.push(seg.point_at(1.0));
            for pair in points.windows(2) {
                let (fa, fb) = (side(&pair[0]), side(&pair[1]));
                if (fa > 0.0) == (fb > 0.0) {
                    continue;
                }
                let x = pair[0] + (pair[1] - pair[0]) * (fa / (fa - fb));
                let mut lambda = d2.dot(&(x - o2));
                if let BoundarySegment::Arc { center, radius, .. } = *seg {
                    if let Some(exact) = circle_root_near(o2, d2, center, radius, lambda) {
                        lambda = exact;
                    }
                }
                hits.push(lambda);
            }
        }
    }
    hits.sort_by(f64::total_cmp);

    let mut edges = Vec::new();
    for pair in hits.chunks_exact(2) {
        let length = pair[1] - pair[0];
        if length > LINEAR_TOLERANCE {
            let start = origin + direction * pair[0];
            edges.push(SectionEdge::line(Line::new(start, direction)?, length));
        }
    }
    Ok(edges)
}

/// Root of `|o + λd - c| = r` closest to the estimate `guess`.
fn circle_root_near(o: Point2, d: Vector2, c: Point2, r: f64, guess: f64) -> Option<f64> {
    let q = o - c;
    let b = d.dot(&q);
    let disc = b * b - (q.dot(&q) - r * r);
    if disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    let (l1, l2) = (-b - s, -b + s);
    Some(if (l1 - guess).abs() <= (l2 - guess).abs() { l1 } else { l2 })
}

fn section_revolved(patch: &RevolvedPatch, cut: &CutPlane) -> KernelResult<Vec<SectionEdge>> {
    let frame = &patch.frame;
    let m = cut.normal;
    let along = m.dot(&frame.axis);

    if along.abs() < AXIS_ALIGNMENT {
        let w = frame.axis.cross(&m);
        let delta = m.dot(&(frame.origin - cut.origin));
        if delta.abs() < LINEAR_TOLERANCE {
            axial_cut(patch, &w)
        } else {
            offset_cut(patch, &m, &w, delta)
        }
    } else if along.abs() > 1.0 - AXIS_ALIGNMENT {
        transverse_cut(patch, frame.height_of(&cut.origin))
    } else {
        Err(OperationError::Unsupported("oblique cut through a face of revolution".into()).into())
    }
}

/// Plane containing the axis: the meridian appears at `±w`.
fn axial_cut(patch: &RevolvedPatch, w: &Vector3) -> KernelResult<Vec<SectionEdge>> {
    let mut edges = Vec::new();
    for dir in [*w, -w] {
        if patch.contains_angle(patch.frame.angle_of(&dir)) {
            if let Some(edge) = meridian_copy(patch, &dir)? {
                edges.push(edge);
            }
        }
    }
    Ok(edges)
}

/// The meridian placed in the half-plane spanned by the axis and `dir`.
fn meridian_copy(patch: &RevolvedPatch, dir: &Vector3) -> KernelResult<Option<SectionEdge>> {
    let frame = &patch.frame;
    match patch.meridian {
        BoundarySegment::Line { a, b } => {
            let pa = frame.origin + frame.axis * a.y + dir * a.x;
            let pb = frame.origin + frame.axis * b.y + dir * b.x;
            if (pb - pa).norm() < LINEAR_TOLERANCE {
                return Ok(None);
            }
            let (line, length) = Line::through(pa, pb)?;
            Ok(Some(SectionEdge::line(line, length)))
        }
        BoundarySegment::Arc {
            center,
            radius,
            start,
            end,
        } => {
            let c = frame.origin + frame.axis * center.y + dir * center.x;
            let arc = Arc::new(c, radius, dir.cross(&frame.axis), *dir)?;
            Ok(Some(SectionEdge::arc(arc, start, end)))
        }
    }
}

/// Direction at radius `r` whose point lies on a plane at signed offset
/// `delta` from the axis: `R = (-delta/r) m ± sqrt(1 - (delta/r)²) w`.
fn offset_direction(m: &Vector3, w: &Vector3, delta: f64, r: f64, sign: f64) -> Option<Vector3> {
    if r <= delta.abs() {
        return None;
    }
    let c = -delta / r;
    Some(m * c + w * (sign * (1.0 - c * c).max(0.0).sqrt()))
}

/// Plane parallel to the axis at distance `|delta|`.
fn offset_cut(patch: &RevolvedPatch, m: &Vector3, w: &Vector3, delta: f64) -> KernelResult<Vec<SectionEdge>> {
    let frame = &patch.frame;
    let (a, b) = (patch.meridian.point_at(0.0), patch.meridian.point_at(1.0));
    let mut edges = Vec::new();

    match patch.meridian {
        BoundarySegment::Line { .. } if (a.x - b.x).abs() < 1e-12 => {
            // Cylinder: straight generator lines.
            for sign in [1.0, -1.0] {
                if let Some(dir) = offset_direction(m, w, delta, a.x, sign) {
                    if patch.contains_angle(frame.angle_of(&dir)) {
                        edges.extend(meridian_copy(patch, &dir)?);
                    }
                }
            }
        }
        BoundarySegment::Line { .. } if patch.is_annulus() => {
            // Flat ring: chords of the plane line between the two radii.
            let (r_in, r_out) = (a.x.min(b.x), a.x.max(b.x));
            if r_out <= delta.abs() {
                return Ok(edges);
            }
            let foot = frame.origin + frame.axis * a.y - m * delta;
            let s_out = (r_out * r_out - delta * delta).sqrt();
            let spans = if r_in <= delta.abs() {
                vec![(-s_out, s_out)]
            } else {
                let s_in = (r_in * r_in - delta * delta).sqrt();
                vec![(-s_out, -s_in), (s_in, s_out)]
            };
            for (s0, s1) in spans {
                let mid = foot + w * (0.5 * (s0 + s1));
                let radial = mid - (frame.origin + frame.axis * a.y);
                if patch.contains_angle(frame.angle_of(&radial)) {
                    let (line, length) = Line::through(foot + w * s0, foot + w * s1)?;
                    edges.push(SectionEdge::line(line, length));
                }
            }
        }
        _ => {
            for sign in [1.0, -1.0] {
                let mut run: Vec<Point3> = Vec::new();
                for i in 0..=MERIDIAN_SAMPLES {
                    #[allow(clippy::cast_precision_loss)]
                    let tau = i as f64 / MERIDIAN_SAMPLES as f64;
                    let p = patch.meridian.point_at(tau);
                    let point = offset_direction(m, w, delta, p.x, sign)
                        .filter(|dir| patch.contains_angle(frame.angle_of(dir)))
                        .map(|dir| frame.origin + frame.axis * p.y + dir * p.x);
                    match point {
                        Some(pt) => run.push(pt),
                        None => flush_run(&mut run, &mut edges)?,
                    }
                }
                flush_run(&mut run, &mut edges)?;
            }
        }
    }
    Ok(edges)
}

fn flush_run(run: &mut Vec<Point3>, edges: &mut Vec<SectionEdge>) -> KernelResult<()> {
    if run.len() >= 2 {
        edges.push(SectionEdge::polyline(Polyline::new(std::mem::take(run))?));
    } else {
        run.clear();
    }
    Ok(())
}

/// Plane perpendicular to the axis at height `h`: circles where the meridian
/// reaches that height.
fn transverse_cut(patch: &RevolvedPatch, h: f64) -> KernelResult<Vec<SectionEdge>> {
    let radii: Vec<f64> = match patch.meridian {
        BoundarySegment::Line { a, b } => {
            let dh = b.y - a.y;
            if dh.abs() < 1e-12 {
                // Coplanar ring.
                Vec::new()
            } else {
                let tau = (h - a.y) / dh;
                if (-1e-12..=1.0 + 1e-12).contains(&tau) {
                    vec![a.x + (b.x - a.x) * tau]
                } else {
                    Vec::new()
                }
            }
        }
        BoundarySegment::Arc {
            center,
            radius,
            start,
            end,
        } => {
            let s = (h - center.y) / radius;
            if s.abs() > 1.0 {
                Vec::new()
            } else {
                let t1 = s.asin();
                let mut thetas = vec![t1];
                if (PI - 2.0 * t1).abs() > 1e-12 {
                    thetas.push(PI - t1);
                }
                thetas
                    .into_iter()
                    .filter(|&t| angle_between(t, start, end, 1e-12))
                    .map(|t| center.x + radius * t.cos())
                    .collect()
            }
        }
    };

    let frame = &patch.frame;
    let mut edges = Vec::new();
    for r in radii {
        if r > LINEAR_TOLERANCE {
            let arc = Arc::new(frame.origin + frame.axis * h, r, frame.axis, frame.ref_dir)?;
            edges.push(SectionEdge::arc(arc, patch.u_start, patch.u_end));
        }
    }
    Ok(edges)
}
