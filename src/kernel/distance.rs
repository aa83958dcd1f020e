//! Minimum distance between two faces.

use crate::error::KernelResult;
use crate::math::intersect_3d::segment_segment_distance;
use crate::math::Point3;
use crate::topology::{FaceBounds, FaceData, RevolvedPatch, TopologyStore};

use super::region::PlanarRegion;

/// Interior grid resolution used to detect overlapping planar faces.
const OVERLAP_GRID: usize = 16;

/// Grid resolution used to sample curved faces.
const SURFACE_GRID: usize = 24;

pub(crate) fn face_distance(store: &TopologyStore, a: &FaceData, b: &FaceData) -> KernelResult<f64> {
    let (ra, rb) = (PlanarRegion::of_face(store, a)?, PlanarRegion::of_face(store, b)?);
    if let (Some(ra), Some(rb)) = (&ra, &rb) {
        return Ok(planar_distance(ra, rb));
    }
    // Curved faces: closest pair of surface samples.
    let pa = surface_samples(a, ra.as_ref());
    let pb = surface_samples(b, rb.as_ref());
    let mut best = f64::INFINITY;
    for p in &pa {
        for q in &pb {
            best = best.min((p - q).norm());
        }
    }
    Ok(best)
}

/// Parallel faces whose projections overlap are exactly the plane gap
/// apart; anything else is closest along the boundaries.
fn planar_distance(a: &PlanarRegion, b: &PlanarRegion) -> f64 {
    if a.normal.cross(&b.normal).norm() < 1e-9 && (overlaps(a, b) || overlaps(b, a)) {
        return b.normal.dot(&(a.plane.origin() - b.plane.origin())).abs();
    }
    boundary_distance(a, b)
}

/// Whether some interior point of `a` projects strictly inside `b`.
fn overlaps(a: &PlanarRegion, b: &PlanarRegion) -> bool {
    let polygons = b.polygons();
    a.interior_samples(OVERLAP_GRID)
        .iter()
        .any(|p| b.contains_strictly(&polygons, &b.plane.project(p), 1e-6))
}

fn boundary_distance(a: &PlanarRegion, b: &PlanarRegion) -> f64 {
    let (la, lb) = (a.boundary_3d(), b.boundary_3d());
    let mut best = f64::INFINITY;
    for pa in &la {
        for sa in pa.windows(2) {
            for pb in &lb {
                for sb in pb.windows(2) {
                    best = best.min(segment_segment_distance(&sa[0], &sa[1], &sb[0], &sb[1]));
                }
            }
        }
    }
    best
}

fn surface_samples(face: &FaceData, region: Option<&PlanarRegion>) -> Vec<Point3> {
    if let Some(region) = region {
        let mut points = region.interior_samples(OVERLAP_GRID);
        points.extend(region.boundary_3d().into_iter().flatten());
        return points;
    }
    match &face.bounds {
        FaceBounds::Revolved(patch) => patch_grid(patch),
        FaceBounds::Loops { .. } => Vec::new(),
    }
}

fn patch_grid(patch: &RevolvedPatch) -> Vec<Point3> {
    let mut out = Vec::with_capacity((SURFACE_GRID + 1) * (SURFACE_GRID + 1));
    for i in 0..=SURFACE_GRID {
        #[allow(clippy::cast_precision_loss)]
        let u = patch.u_start + patch.sweep() * (i as f64 / SURFACE_GRID as f64);
        for j in 0..=SURFACE_GRID {
            #[allow(clippy::cast_precision_loss)]
            let tau = j as f64 / SURFACE_GRID as f64;
            out.push(patch.point(u, tau));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use crate::kernel::{BrepKernel, GeometryKernel, PocketSpec, Prism, SurfaceInfo};
    use crate::math::{Point2, Vector3};

    fn plate_with_pocket(wall: f64) -> crate::kernel::BrepShape {
        let outline = vec![
            Point2::new(0.0, 0.0),
            Point2::new(50.0, 0.0),
            Point2::new(50.0, 30.0),
            Point2::new(0.0, 30.0),
        ];
        Prism::new(outline, 20.0)
            .with_pocket(PocketSpec {
                min: Point2::new(wall, 5.0),
                max: Point2::new(40.0, 25.0),
                depth: 15.0,
            })
            .build("pocketed")
            .unwrap()
    }

    fn plane_with_normal(shape: &crate::kernel::BrepShape, normal: Vector3, x: f64) -> usize {
        BrepKernel
            .faces(shape)
            .unwrap()
            .into_iter()
            .find(|f| match f.surface {
                SurfaceInfo::Plane { origin, .. } => {
                    f.outward_plane_normal().is_some_and(|n| (n - normal).norm() < 1e-9) && (origin.x - x).abs() < 1e-9
                }
                _ => false,
            })
            .unwrap()
            .index
    }

    #[test]
    fn wall_between_side_and_pocket_is_plane_gap() {
        let shape = plate_with_pocket(2.0);
        let outer = plane_with_normal(&shape, -Vector3::x(), 0.0);
        let inner = plane_with_normal(&shape, Vector3::x(), 2.0);
        let d = BrepKernel.face_distance(&shape, outer, inner).unwrap();
        assert_relative_eq!(d, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn non_overlapping_faces_use_boundary_distance() {
        let shape = plate_with_pocket(2.0);
        let faces = BrepKernel.faces(&shape).unwrap();
        let top = faces
            .iter()
            .find(|f| f.outward_plane_normal().is_some_and(|n| n.z > 0.9) && BrepKernel.face_bounding_box(&shape, f.index).unwrap().min.z > 19.0)
            .unwrap();
        let floor = faces
            .iter()
            .find(|f| {
                f.outward_plane_normal().is_some_and(|n| n.z > 0.9)
                    && (BrepKernel.face_bounding_box(&shape, f.index).unwrap().min.z - 5.0).abs() < 1e-9
            })
            .unwrap();
        let d = BrepKernel.face_distance(&shape, top.index, floor.index).unwrap();
        assert_relative_eq!(d, 15.0, epsilon = 1e-9);
    }
}
