mod cone;
mod cylinder;
mod plane;
mod sphere;
mod torus;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use plane::Plane;
pub use sphere::Sphere;
pub use torus::Torus;

use crate::error::KernelResult;
use crate::math::{Point3, Vector3};

/// Trait for parametric surfaces in 3D space.
pub trait Surface {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation is degenerate at the given parameters.
    fn evaluate(&self, u: f64, v: f64) -> KernelResult<Point3>;

    /// Computes the natural surface normal at parameters `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is degenerate (e.g. at a cone apex).
    fn normal(&self, u: f64, v: f64) -> KernelResult<Vector3>;

    /// Computes the `(u, v)` parameters of a point lying on the surface.
    fn inverse(&self, point: &Point3) -> (f64, f64);

    /// Natural surface normal at a point lying on the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is degenerate at that point.
    fn normal_at(&self, point: &Point3) -> KernelResult<Vector3> {
        let (u, v) = self.inverse(point);
        self.normal(u, v)
    }
}
