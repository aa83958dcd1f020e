use crate::error::{GeometryError, KernelResult};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::Surface;

/// An infinite plane in 3D space.
///
/// Defined by an origin point, and two orthogonal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir x v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a new plane from an origin and two direction vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> KernelResult<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;

        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::Degenerate("plane directions are parallel".into()).into());
        }
        let normal = normal / normal_len;
        // Re-orthogonalize so the local frame is exactly orthonormal.
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> KernelResult<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Maps local coordinates to a 3D point.
    #[must_use]
    pub fn point_at(&self, local: &Point2) -> Point3 {
        self.origin + self.u_dir * local.x + self.v_dir * local.y
    }

    /// Projects a 3D point into the plane's local coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> KernelResult<Point3> {
        Ok(self.point_at(&Point2::new(u, v)))
    }

    fn normal(&self, _u: f64, _v: f64) -> KernelResult<Vector3> {
        Ok(self.normal)
    }

    fn inverse(&self, point: &Point3) -> (f64, f64) {
        let local = self.project(point);
        (local.x, local.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_normal_builds_orthonormal_frame() {
        let plane = Plane::from_normal(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert!((plane.plane_normal() - Vector3::z()).norm() < TOLERANCE);
        assert!(plane.u_dir().dot(plane.v_dir()).abs() < TOLERANCE);
        assert!((plane.u_dir().cross(plane.v_dir()) - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn project_roundtrip() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 5.0), Vector3::x(), Vector3::y()).unwrap();
        let p = Point3::new(3.0, -4.0, 5.0);
        let local = plane.project(&p);
        assert!((plane.point_at(&local) - p).norm() < TOLERANCE);
    }

    #[test]
    fn parallel_directions_fail() {
        assert!(Plane::new(Point3::origin(), Vector3::x(), Vector3::x() * 2.0).is_err());
    }
}
