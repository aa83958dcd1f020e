use crate::error::{GeometryError, KernelResult};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Surface;

/// A cylindrical surface in 3D space.
///
/// `P(u, v) = location + radius * (cos(u) * ref_dir + sin(u) * binormal) + v * axis`
/// where `binormal = axis x ref_dir`. The natural normal points away from the axis.
#[derive(Debug, Clone)]
pub struct Cylinder {
    location: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(location: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> KernelResult<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("cylinder radius must be positive".into()).into());
        }
        let (axis, ref_dir) = orthonormal_frame(axis, ref_dir)?;
        Ok(Self {
            location,
            radius,
            axis,
            ref_dir,
        })
    }

    /// Returns a point on the axis.
    #[must_use]
    pub fn location(&self) -> &Point3 {
        &self.location
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    fn binormal(&self) -> Vector3 {
        self.axis.cross(&self.ref_dir)
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> KernelResult<Point3> {
        let radial = self.ref_dir * u.cos() + self.binormal() * u.sin();
        Ok(self.location + radial * self.radius + self.axis * v)
    }

    fn normal(&self, u: f64, _v: f64) -> KernelResult<Vector3> {
        Ok(self.ref_dir * u.cos() + self.binormal() * u.sin())
    }

    fn inverse(&self, point: &Point3) -> (f64, f64) {
        let dp = point - self.location;
        let u = dp.dot(&self.binormal()).atan2(dp.dot(&self.ref_dir));
        (u, dp.dot(&self.axis))
    }
}

/// Normalizes an axis and a reference direction and checks they are perpendicular.
pub(super) fn orthonormal_frame(axis: Vector3, ref_dir: Vector3) -> KernelResult<(Vector3, Vector3)> {
    let axis_len = axis.norm();
    let ref_len = ref_dir.norm();
    if axis_len < TOLERANCE || ref_len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    let axis = axis / axis_len;
    let ref_dir = ref_dir / ref_len;
    if axis.dot(&ref_dir).abs() > 1e-9 {
        return Err(GeometryError::Degenerate(
            "reference direction must be perpendicular to axis".into(),
        )
        .into());
    }
    Ok((axis, ref_dir))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn z_cylinder(radius: f64) -> Cylinder {
        Cylinder::new(Point3::origin(), radius, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_with_height() {
        let p = z_cylinder(1.0).evaluate(0.0, 5.0).unwrap();
        assert!((p - Point3::new(1.0, 0.0, 5.0)).norm() < TOLERANCE);
    }

    #[test]
    fn natural_normal_points_away_from_axis() {
        let c = z_cylinder(2.0);
        let n = c.normal_at(&Point3::new(0.0, 2.0, 7.0)).unwrap();
        assert!((n - Vector3::y()).norm() < 1e-9);
    }

    #[test]
    fn inverse_roundtrip() {
        let c = z_cylinder(2.0);
        for &(u, v) in &[(0.0, 0.0), (FRAC_PI_2, 3.0), (1.0, -2.5)] {
            let p = c.evaluate(u, v).unwrap();
            let (u2, v2) = c.inverse(&p);
            assert!((c.evaluate(u2, v2).unwrap() - p).norm() < 1e-9);
        }
    }

    #[test]
    fn invalid_radius() {
        assert!(Cylinder::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
    }

    #[test]
    fn skewed_reference_direction_fails() {
        assert!(Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::new(1.0, 0.0, 1.0)).is_err());
    }
}
