//! Planar faces viewed as 2D regions in their plane's local frame.

use std::f64::consts::TAU;

use crate::error::KernelResult;
use crate::geometry::surface::Plane;
use crate::math::polygon_2d::{point_in_polygon, point_segment_distance, BoundarySegment, RegionMoments};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};
use crate::topology::{EdgeCurve, EdgeData, FaceBounds, FaceData, FaceSurface, RevolvedPatch, TopologyStore, WireId};

/// Samples per full turn when a boundary arc is flattened.
const ARC_SAMPLES_PER_TURN: f64 = 64.0;

/// A planar face: its plane and boundary loops in plane coordinates.
#[derive(Debug, Clone)]
pub(crate) struct PlanarRegion {
    pub plane: Plane,
    /// Outward unit normal.
    pub normal: Vector3,
    /// First loop is the outer boundary, the rest are holes.
    pub loops: Vec<Vec<BoundarySegment>>,
}

impl PlanarRegion {
    /// Builds the region of a planar face, or `None` for curved faces.
    pub fn of_face(store: &TopologyStore, face: &FaceData) -> KernelResult<Option<Self>> {
        match (&face.surface, &face.bounds) {
            (FaceSurface::Plane(plane), FaceBounds::Loops { outer, inner }) => {
                let mut loops = Vec::with_capacity(inner.len() + 1);
                loops.push(wire_segments(store, plane, *outer)?);
                for wire in inner {
                    loops.push(wire_segments(store, plane, *wire)?);
                }
                let normal = if face.reversed {
                    -plane.plane_normal()
                } else {
                    *plane.plane_normal()
                };
                Ok(Some(Self {
                    plane: plane.clone(),
                    normal,
                    loops,
                }))
            }
            (_, FaceBounds::Revolved(patch)) if patch.is_annulus() => Ok(Some(annulus_region(patch)?)),
            _ => Ok(None),
        }
    }

    /// Area moments of the region.
    pub fn moments(&self) -> RegionMoments {
        match self.loops.split_first() {
            Some((outer, holes)) => RegionMoments::of_region(outer, holes),
            None => RegionMoments::default(),
        }
    }

    /// Flattened boundary loops.
    pub fn polygons(&self) -> Vec<Vec<Point2>> {
        self.loops.iter().map(|segments| flatten(segments)).collect()
    }

    /// Even-odd containment that rejects points within `margin` of the boundary.
    pub fn contains_strictly(&self, polygons: &[Vec<Point2>], p: &Point2, margin: f64) -> bool {
        let mut inside = false;
        for poly in polygons {
            if point_in_polygon(p, poly) {
                inside = !inside;
            }
            let n = poly.len();
            for i in 0..n {
                if point_segment_distance(p, &poly[i], &poly[(i + 1) % n]) <= margin {
                    return false;
                }
            }
        }
        inside
    }

    /// Grid points strictly inside the region, lifted to 3D.
    pub fn interior_samples(&self, grid: usize) -> Vec<Point3> {
        let polygons = self.polygons();
        let Some((lo, hi)) = bounds_2d(&polygons) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for i in 0..grid {
            for j in 0..grid {
                #[allow(clippy::cast_precision_loss)]
                let (fx, fy) = ((i as f64 + 0.5) / grid as f64, (j as f64 + 0.5) / grid as f64);
                let p = Point2::new(lo.x + (hi.x - lo.x) * fx, lo.y + (hi.y - lo.y) * fy);
                if self.contains_strictly(&polygons, &p, 1e-6) {
                    out.push(self.plane.point_at(&p));
                }
            }
        }
        out
    }

    /// Boundary polylines lifted to 3D, each closed (first point repeated).
    pub fn boundary_3d(&self) -> Vec<Vec<Point3>> {
        self.polygons()
            .iter()
            .map(|poly| {
                let mut pts: Vec<Point3> = poly.iter().map(|p| self.plane.point_at(p)).collect();
                if let Some(first) = pts.first().copied() {
                    pts.push(first);
                }
                pts
            })
            .collect()
    }
}

/// Projects one edge into the plane's local frame.
pub(crate) fn edge_segment(plane: &Plane, edge: &EdgeData) -> BoundarySegment {
    match &edge.curve {
        EdgeCurve::Line(_) => BoundarySegment::Line {
            a: plane.project(&edge.start()),
            b: plane.project(&edge.end()),
        },
        EdgeCurve::Arc(arc) => {
            let phase = arc.ref_dir().dot(plane.v_dir()).atan2(arc.ref_dir().dot(plane.u_dir()));
            let sense = if arc.normal().dot(plane.plane_normal()) < 0.0 {
                -1.0
            } else {
                1.0
            };
            BoundarySegment::Arc {
                center: plane.project(arc.center()),
                radius: arc.radius(),
                start: phase + sense * edge.t_start,
                end: phase + sense * edge.t_end,
            }
        }
    }
}

pub(crate) fn wire_segments(store: &TopologyStore, plane: &Plane, wire: WireId) -> KernelResult<Vec<BoundarySegment>> {
    let mut out = Vec::new();
    for &id in &store.wire(wire)?.edges {
        out.push(edge_segment(plane, store.edge(id)?));
    }
    Ok(out)
}

/// Flattens a loop of segments into a polygon (closing point omitted).
pub(crate) fn flatten(segments: &[BoundarySegment]) -> Vec<Point2> {
    let mut out = Vec::new();
    for seg in segments {
        let n = match *seg {
            BoundarySegment::Line { .. } => 2,
            BoundarySegment::Arc { start, end, .. } => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = ((end - start).abs() / TAU * ARC_SAMPLES_PER_TURN).ceil() as usize;
                n.max(4) + 1
            }
        };
        let mut pts = seg.sample(n);
        pts.pop();
        out.extend(pts);
    }
    out
}

fn bounds_2d(polygons: &[Vec<Point2>]) -> Option<(Point2, Point2)> {
    let mut points = polygons.iter().flatten();
    let first = *points.next()?;
    let (mut lo, mut hi) = (first, first);
    for p in points {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    Some((lo, hi))
}

/// Region of a flat face of revolution: a disc, an annulus or a sector of one.
fn annulus_region(patch: &RevolvedPatch) -> KernelResult<PlanarRegion> {
    let frame = &patch.frame;
    let (a, b) = (patch.meridian.point_at(0.0), patch.meridian.point_at(1.0));
    let plane = Plane::new(frame.point(0.0, 0.0, a.y), frame.ref_dir, frame.binormal())?;
    // The area element is -r * r' * A.
    let normal = if b.x > a.x { -frame.axis } else { frame.axis };
    let (r_in, r_out) = (a.x.min(b.x), a.x.max(b.x));
    let centre = Point2::origin();
    let outer_arc = BoundarySegment::Arc {
        center: centre,
        radius: r_out,
        start: patch.u_start,
        end: patch.u_end,
    };
    let full = patch.sweep() >= TAU - 1e-9;
    let loops = if full {
        let mut loops = vec![vec![outer_arc]];
        if r_in > TOLERANCE {
            loops.push(vec![BoundarySegment::Arc {
                center: centre,
                radius: r_in,
                start: patch.u_end,
                end: patch.u_start,
            }]);
        }
        loops
    } else {
        let at = |r: f64, u: f64| Point2::new(r * u.cos(), r * u.sin());
        let mut outer = vec![
            outer_arc,
            BoundarySegment::Line {
                a: at(r_out, patch.u_end),
                b: at(r_in, patch.u_end),
            },
        ];
        if r_in > TOLERANCE {
            outer.push(BoundarySegment::Arc {
                center: centre,
                radius: r_in,
                start: patch.u_end,
                end: patch.u_start,
            });
        }
        outer.push(BoundarySegment::Line {
            a: at(r_in, patch.u_start),
            b: at(r_out, patch.u_start),
        });
        vec![outer]
    };
    Ok(PlanarRegion { plane, normal, loops })
}
