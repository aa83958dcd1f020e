use crate::error::{GeometryError, KernelResult};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::cylinder::orthonormal_frame;
use super::Surface;

/// A toroidal surface in 3D space.
///
/// `P(u, v) = center + (R + r*cos(v)) * (cos(u)*ref_dir + sin(u)*binormal) + r*sin(v)*axis`
/// with major radius `R` (axis to tube center) and minor radius `r` (tube).
/// The natural normal points away from the tube center.
#[derive(Debug, Clone)]
pub struct Torus {
    center: Point3,
    major_radius: f64,
    minor_radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Torus {
    /// Creates a new torus.
    ///
    /// # Errors
    ///
    /// Returns an error if either radius is non-positive, the minor radius is
    /// not smaller than the major radius, or the frame is degenerate.
    pub fn new(
        center: Point3,
        major_radius: f64,
        minor_radius: f64,
        axis: Vector3,
        ref_dir: Vector3,
    ) -> KernelResult<Self> {
        if major_radius < TOLERANCE || minor_radius < TOLERANCE {
            return Err(GeometryError::Degenerate("torus radii must be positive".into()).into());
        }
        if minor_radius >= major_radius {
            return Err(GeometryError::Degenerate(
                "torus minor radius must be less than major radius".into(),
            )
            .into());
        }
        let (axis, ref_dir) = orthonormal_frame(axis, ref_dir)?;
        Ok(Self {
            center,
            major_radius,
            minor_radius,
            axis,
            ref_dir,
        })
    }

    /// Returns the center of the torus.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the major radius.
    #[must_use]
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Returns the minor (tube) radius.
    #[must_use]
    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    /// Returns the symmetry axis (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    fn radial(&self, u: f64) -> Vector3 {
        self.ref_dir * u.cos() + self.axis.cross(&self.ref_dir) * u.sin()
    }
}

impl Surface for Torus {
    fn evaluate(&self, u: f64, v: f64) -> KernelResult<Point3> {
        let r = self.major_radius + self.minor_radius * v.cos();
        Ok(self.center + self.radial(u) * r + self.axis * (self.minor_radius * v.sin()))
    }

    fn normal(&self, u: f64, v: f64) -> KernelResult<Vector3> {
        Ok(self.radial(u) * v.cos() + self.axis * v.sin())
    }

    fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.center;
        let binormal = self.axis.cross(&self.ref_dir);
        let u = dp.dot(&binormal).atan2(dp.dot(&self.ref_dir));
        let radial = self.radial(u);
        let to_tube = point - (self.center + radial * self.major_radius);
        let v = to_tube.dot(&self.axis).atan2(to_tube.dot(&radial));
        (u, v)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn xy_torus() -> Torus {
        Torus::new(Point3::origin(), 3.0, 1.0, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_inner_equator() {
        let p = xy_torus().evaluate(0.0, PI).unwrap();
        assert!((p - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn normal_at_top_points_up() {
        let n = xy_torus().normal_at(&Point3::new(0.0, 3.0, 1.0)).unwrap();
        assert!((n - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn minor_not_smaller_than_major_fails() {
        assert!(Torus::new(Point3::origin(), 1.0, 1.0, Vector3::z(), Vector3::x()).is_err());
    }

    #[test]
    fn inverse_roundtrip() {
        let t = xy_torus();
        let p = t.evaluate(FRAC_PI_2, -1.0).unwrap();
        let (u, v) = t.inverse(&p);
        assert!((t.evaluate(u, v).unwrap() - p).norm() < 1e-9);
    }
}
