//! Exact axis-aligned bounds of faces.

use std::f64::consts::PI;

use crate::error::KernelResult;
use crate::math::polygon_2d::BoundarySegment;
use crate::math::{angle_between, Vector3};
use crate::topology::{EdgeCurve, EdgeData, FaceBounds, FaceData, RevolvedPatch, TopologyStore};

use super::Aabb;

fn coordinate_axes() -> [Vector3; 3] {
    [Vector3::x(), Vector3::y(), Vector3::z()]
}

pub(crate) fn face_bounds(store: &TopologyStore, face: &FaceData) -> KernelResult<Aabb> {
    let mut bbox = Aabb::empty();
    match &face.bounds {
        FaceBounds::Loops { outer, .. } => {
            // Holes lie inside the outer loop.
            for &id in &store.wire(*outer)?.edges {
                include_edge(&mut bbox, store.edge(id)?);
            }
        }
        FaceBounds::Revolved(patch) => include_patch(&mut bbox, patch),
    }
    Ok(bbox)
}

fn include_edge(bbox: &mut Aabb, edge: &EdgeData) {
    bbox.include(&edge.start());
    bbox.include(&edge.end());
    if let EdgeCurve::Arc(arc) = &edge.curve {
        let binormal = arc.binormal();
        for e in &coordinate_axes() {
            let critical = binormal.dot(e).atan2(arc.ref_dir().dot(e));
            for t in [critical, critical + PI] {
                if angle_between(t, edge.t_start, edge.t_end, 1e-12) {
                    bbox.include(&edge.point_at(t));
                }
            }
        }
    }
}

/// The coordinate `x_e` of a point of revolution is extremal over `u` at the
/// same angles for every meridian point, so only those angles (and the range
/// ends) need to be searched along the meridian.
fn include_patch(bbox: &mut Aabb, patch: &RevolvedPatch) {
    let frame = &patch.frame;
    let binormal = frame.binormal();
    let mut angles = vec![patch.u_start, patch.u_end];
    for e in &coordinate_axes() {
        let critical = binormal.dot(e).atan2(frame.ref_dir.dot(e));
        for u in [critical, critical + PI] {
            if angle_between(u, patch.u_start, patch.u_end, 1e-12) {
                angles.push(u);
            }
        }
    }

    for &u in &angles {
        let radial = frame.radial(u);
        bbox.include(&patch.point(u, 0.0));
        bbox.include(&patch.point(u, 1.0));
        if let BoundarySegment::Arc {
            center,
            radius,
            start,
            end,
        } = patch.meridian
        {
            for e in &coordinate_axes() {
                let critical = frame.axis.dot(e).atan2(radial.dot(e));
                for theta in [critical, critical + PI] {
                    if angle_between(theta, start, end, 1e-12) {
                        let r = center.x + radius * theta.cos();
                        let h = center.y + radius * theta.sin();
                        bbox.include(&frame.point(u, r, h));
                    }
                }
            }
        }
    }
}
