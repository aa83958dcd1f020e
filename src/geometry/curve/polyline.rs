use crate::error::{GeometryError, KernelResult};
use crate::math::Point3;

use super::{Curve, CurveDomain};

/// A piecewise-linear curve through sampled points.
///
/// Parameter `t` runs from `0` at the first vertex to `n - 1` at the last,
/// with vertex `i` at `t = i`.
#[derive(Debug, Clone)]
pub struct Polyline {
    points: Vec<Point3>,
}

impl Polyline {
    /// Creates a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given.
    pub fn new(points: Vec<Point3>) -> KernelResult<Self> {
        if points.len() < 2 {
            return Err(GeometryError::Degenerate("polyline needs at least two points".into()).into());
        }
        Ok(Self { points })
    }

    /// Full parameter range, `[0, n - 1]`.
    #[must_use]
    pub fn domain(&self) -> CurveDomain {
        #[allow(clippy::cast_precision_loss)]
        let last = (self.points.len() - 1) as f64;
        CurveDomain::new(0.0, last)
    }
}

impl Curve for Polyline {
    fn evaluate(&self, t: f64) -> Point3 {
        let last = self.points.len() - 1;
        let t = t.clamp(0.0, self.domain().t_max);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = (t.floor() as usize).min(last.saturating_sub(1));
        #[allow(clippy::cast_precision_loss)]
        let frac = t - i as f64;
        let a = self.points[i];
        let b = self.points[(i + 1).min(last)];
        a + (b - a) * frac
    }
}
