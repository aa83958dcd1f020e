use crate::error::{GeometryError, KernelResult};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::cylinder::orthonormal_frame;
use super::Surface;

/// A spherical surface in 3D space.
///
/// `u` is the longitude around `axis`, `v` the latitude in `[-pi/2, pi/2]`.
/// The natural normal is `(P - center) / radius`.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Sphere {
    /// Creates a new sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the frame is degenerate.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> KernelResult<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("sphere radius must be positive".into()).into());
        }
        let (axis, ref_dir) = orthonormal_frame(axis, ref_dir)?;
        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
        })
    }

    /// Returns the center of the sphere.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    fn direction(&self, u: f64, v: f64) -> Vector3 {
        let binormal = self.axis.cross(&self.ref_dir);
        (self.ref_dir * u.cos() + binormal * u.sin()) * v.cos() + self.axis * v.sin()
    }
}

impl Surface for Sphere {
    fn evaluate(&self, u: f64, v: f64) -> KernelResult<Point3> {
        Ok(self.center + self.direction(u, v) * self.radius)
    }

    fn normal(&self, u: f64, v: f64) -> KernelResult<Vector3> {
        Ok(self.direction(u, v))
    }

    fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = (point - self.center) / self.radius;
        let binormal = self.axis.cross(&self.ref_dir);
        let v = dp.dot(&self.axis).clamp(-1.0, 1.0).asin();
        let u = dp.dot(&binormal).atan2(dp.dot(&self.ref_dir));
        (u, v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normal_at_pole() {
        let s = Sphere::new(Point3::new(0.0, 0.0, 5.0), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let n = s.normal_at(&Point3::new(0.0, 0.0, 7.0)).unwrap();
        assert!((n - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn invalid_radius() {
        assert!(Sphere::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
    }
}
