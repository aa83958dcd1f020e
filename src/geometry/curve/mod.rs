mod arc;
mod line;
mod polyline;

pub use arc::Arc;
pub use line::Line;
pub use polyline::Polyline;

use crate::math::Point3;

/// Parameter interval of a bounded piece of curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Returns `n` parameters spread uniformly over the domain, endpoints included.
    #[must_use]
    pub fn uniform(&self, n: usize) -> Vec<f64> {
        let n = n.max(2);
        #[allow(clippy::cast_precision_loss)]
        let last = (n - 1) as f64;
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let k = i as f64 / last;
                self.t_min + (self.t_max - self.t_min) * k
            })
            .collect()
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_includes_endpoints() {
        let ts = CurveDomain::new(1.0, 3.0).uniform(5);
        assert_eq!(ts.len(), 5);
        assert!((ts[0] - 1.0).abs() < 1e-12);
        assert!((ts[2] - 2.0).abs() < 1e-12);
        assert!((ts[4] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn uniform_clamps_to_two_samples() {
        assert_eq!(CurveDomain::new(0.0, 1.0).uniform(0).len(), 2);
    }
}
