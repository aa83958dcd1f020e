use crate::error::{GeometryError, KernelResult};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::cylinder::orthonormal_frame;
use super::Surface;

/// A conical surface in 3D space.
///
/// `P(u, v) = apex + v * (cos(alpha) * axis + sin(alpha) * (cos(u) * ref_dir + sin(u) * binormal))`
/// where `alpha` is the half-angle and `v >= 0` is the distance along the
/// generator from the apex. The axis points from the apex into the opening.
#[derive(Debug, Clone)]
pub struct Cone {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
    ref_dir: Vector3,
}

impl Cone {
    /// Creates a new cone.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is outside `(0, pi/2)`, the axis is
    /// zero-length, or the reference direction is not perpendicular to the axis.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64, ref_dir: Vector3) -> KernelResult<Self> {
        if half_angle <= TOLERANCE || half_angle >= std::f64::consts::FRAC_PI_2 - TOLERANCE {
            return Err(GeometryError::Degenerate("cone half-angle must be in (0, pi/2)".into()).into());
        }
        let (axis, ref_dir) = orthonormal_frame(axis, ref_dir)?;
        Ok(Self {
            apex,
            axis,
            half_angle,
            ref_dir,
        })
    }

    /// Returns the apex point.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }

    fn radial(&self, u: f64) -> Vector3 {
        self.ref_dir * u.cos() + self.binormal() * u.sin()
    }
}

impl Surface for Cone {
    fn evaluate(&self, u: f64, v: f64) -> KernelResult<Point3> {
        let (sa, ca) = self.half_angle.sin_cos();
        Ok(self.apex + (self.axis * ca + self.radial(u) * sa) * v)
    }

    fn normal(&self, u: f64, v: f64) -> KernelResult<Vector3> {
        if v.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("cone normal is degenerate at apex".into()).into());
        }
        // Perpendicular to the generator, pointing away from the axis.
        let (sa, ca) = self.half_angle.sin_cos();
        Ok(self.radial(u) * ca - self.axis * sa)
    }

    fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.apex;
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        (u, dp.norm())
    }
}
