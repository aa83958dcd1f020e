use crate::error::{GeometryError, KernelResult};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Curve;

/// A circle in 3D space, bounded by the parameter range of whatever uses it.
///
/// `P(t) = center + radius * (cos(t) * ref_dir + sin(t) * binormal)` with
/// `binormal = normal x ref_dir`.
#[derive(Debug, Clone)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
}

impl Arc {
    /// Creates a new arc circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is zero-length,
    /// or the reference direction is not perpendicular to the normal.
    pub fn new(center: Point3, radius: f64, normal: Vector3, ref_dir: Vector3) -> KernelResult<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        let normal_len = normal.norm();
        let ref_len = ref_dir.norm();
        if normal_len < TOLERANCE || ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;
        let ref_dir = ref_dir / ref_len;
        if normal.dot(&ref_dir).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }
        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
        })
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the zero-angle direction.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Returns the quarter-turn direction, `normal x ref_dir`.
    #[must_use]
    pub fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Point3 {
        self.center + (self.ref_dir * t.cos() + self.binormal() * t.sin()) * self.radius
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn evaluate_quarter_turn() {
        let arc = Arc::new(Point3::new(0.0, 0.0, 2.0), 3.0, Vector3::z(), Vector3::x()).unwrap();
        let p = arc.evaluate(FRAC_PI_2);
        assert!((p - Point3::new(0.0, 3.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn skewed_reference_fails() {
        assert!(Arc::new(Point3::origin(), 1.0, Vector3::z(), Vector3::new(0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn zero_radius_fails() {
        assert!(Arc::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
    }
}
