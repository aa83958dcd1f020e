use crate::geometry::surface::{Cone, Cylinder, Plane, Sphere, Surface, Torus};
use crate::math::polygon_2d::BoundarySegment;
use crate::math::{angle_in_sweep, Point3, Vector3};

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// The geometric surface associated with a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface.
    Cylinder(Cylinder),
    /// A conical surface.
    Cone(Cone),
    /// A spherical surface.
    Sphere(Sphere),
    /// A toroidal surface.
    Torus(Torus),
}

impl FaceSurface {
    /// Returns the surface behind the enum.
    #[must_use]
    pub fn as_surface(&self) -> &dyn Surface {
        match self {
            Self::Plane(s) => s,
            Self::Cylinder(s) => s,
            Self::Cone(s) => s,
            Self::Sphere(s) => s,
            Self::Torus(s) => s,
        }
    }
}

/// Orthonormal frame of a rotation axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisFrame {
    /// A point on the axis; `h = 0` there.
    pub origin: Point3,
    /// Unit axis direction.
    pub axis: Vector3,
    /// Unit direction at `u = 0`, perpendicular to `axis`.
    pub ref_dir: Vector3,
}

impl AxisFrame {
    /// `axis x ref_dir`, the direction at `u = pi/2`.
    #[must_use]
    pub fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    /// Unit radial direction at angle `u`.
    #[must_use]
    pub fn radial(&self, u: f64) -> Vector3 {
        self.ref_dir * u.cos() + self.binormal() * u.sin()
    }

    /// Angle of a direction perpendicular to the axis.
    #[must_use]
    pub fn angle_of(&self, dir: &Vector3) -> f64 {
        dir.dot(&self.binormal()).atan2(dir.dot(&self.ref_dir))
    }

    /// Point at angle `u`, radius `r` and height `h`.
    #[must_use]
    pub fn point(&self, u: f64, r: f64, h: f64) -> Point3 {
        self.origin + self.axis * h + self.radial(u) * r
    }

    /// Height of a point along the axis.
    #[must_use]
    pub fn height_of(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.axis)
    }
}

/// A face swept by rotating a meridian about an axis.
///
/// The meridian lives in the `(r, h)` half-plane. It is directed so that the
/// area element `r * (h' * R(u) - r' * A)` points out of the solid.
#[derive(Debug, Clone, Copy)]
pub struct RevolvedPatch {
    /// Meridian curve, `x = r` and `y = h`.
    pub meridian: BoundarySegment,
    /// Rotation frame.
    pub frame: AxisFrame,
    /// Start of the angular range.
    pub u_start: f64,
    /// End of the angular range, `u_end > u_start`.
    pub u_end: f64,
}

impl RevolvedPatch {
    /// Point at angle `u` and meridian parameter `tau` in `[0, 1]`.
    #[must_use]
    pub fn point(&self, u: f64, tau: f64) -> Point3 {
        let m = self.meridian.point_at(tau);
        self.frame.point(u, m.x, m.y)
    }

    /// Outward area element per unit `du * dtau`.
    #[must_use]
    pub fn area_element(&self, u: f64, tau: f64) -> Vector3 {
        let m = self.meridian.point_at(tau);
        let (dr, dh) = self.meridian.derivative_at(tau);
        (self.frame.radial(u) * dh - self.frame.axis * dr) * m.x
    }

    /// Angular sweep of the patch.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.u_end - self.u_start
    }

    /// Whether the direction at angle `u` belongs to this patch.
    ///
    /// The range is half-open so the seam between two halves of a split face
    /// is claimed by exactly one of them.
    #[must_use]
    pub fn contains_angle(&self, u: f64) -> bool {
        if self.sweep() >= std::f64::consts::TAU - 1e-9 {
            return true;
        }
        let end_hit = angle_in_sweep(u, self.u_end, 0.0, 1e-9);
        angle_in_sweep(u, self.u_start, self.sweep(), 1e-9) && !end_hit
    }

    /// Whether the meridian is a straight line at constant height.
    #[must_use]
    pub fn is_annulus(&self) -> bool {
        match self.meridian {
            BoundarySegment::Line { a, b } => (a.y - b.y).abs() < 1e-9,
            BoundarySegment::Arc { .. } => false,
        }
    }
}

/// How a face is bounded on its surface.
#[derive(Debug, Clone)]
pub enum FaceBounds {
    /// Planar region: an outer wire and hole wires, counter-clockwise and
    /// clockwise respectively about the outward normal.
    Loops {
        /// The outer boundary wire.
        outer: WireId,
        /// Inner boundary wires (holes).
        inner: Vec<WireId>,
    },
    /// Face of revolution.
    Revolved(RevolvedPatch),
}

/// Data associated with a topological face.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The geometric surface on which this face lies.
    pub surface: FaceSurface,
    /// Boundary description.
    pub bounds: FaceBounds,
    /// `true` when the outward normal opposes the surface's natural normal.
    pub reversed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use std::f64::consts::PI;

    fn half_cylinder(u_start: f64) -> RevolvedPatch {
        RevolvedPatch {
            meridian: BoundarySegment::Line {
                a: Point2::new(5.0, 0.0),
                b: Point2::new(5.0, 10.0),
            },
            frame: AxisFrame {
                origin: Point3::origin(),
                axis: Vector3::z(),
                ref_dir: Vector3::x(),
            },
            u_start,
            u_end: u_start + PI,
        }
    }

    #[test]
    fn area_element_points_away_from_axis_for_rising_meridian() {
        let patch = half_cylinder(0.0);
        let da = patch.area_element(0.0, 0.5);
        assert!(da.x > 0.0);
        assert!(da.z.abs() < 1e-12);
    }

    #[test]
    fn seam_belongs_to_one_half() {
        let first = half_cylinder(0.0);
        let second = half_cylinder(PI);
        assert!(first.contains_angle(0.0));
        assert!(!first.contains_angle(PI));
        assert!(second.contains_angle(PI));
        assert!(!second.contains_angle(0.0));
    }
}
