//! Gauss-Legendre quadrature used by the mass-property integrals.

/// Abscissae of the 8-point Gauss-Legendre rule on `[-1, 1]` (positive half).
const NODES: [f64; 4] = [
    0.183_434_642_495_649_8,
    0.525_532_409_916_329_0,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_3,
];

/// Weights matching [`NODES`].
const WEIGHTS: [f64; 4] = [
    0.362_683_783_378_362_0,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
];

/// Returns the 8-point Gauss-Legendre sample positions and weights mapped
/// onto `[a, b]`, split into `pieces` equal sub-intervals.
#[must_use]
pub fn gauss_points(a: f64, b: f64, pieces: usize) -> Vec<(f64, f64)> {
    let pieces = pieces.max(1);
    #[allow(clippy::cast_precision_loss)]
    let step = (b - a) / pieces as f64;
    let mut out = Vec::with_capacity(pieces * 8);
    for k in 0..pieces {
        #[allow(clippy::cast_precision_loss)]
        let lo = a + step * k as f64;
        let half = step * 0.5;
        let mid = lo + half;
        for (x, w) in NODES.iter().zip(WEIGHTS.iter()) {
            out.push((mid - half * x, half * w));
            out.push((mid + half * x, half * w));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn weights_sum_to_interval_length() {
        let total: f64 = gauss_points(2.0, 5.0, 3).iter().map(|(_, w)| w).sum();
        assert_relative_eq!(total, 3.0, epsilon = 1e-12);
    }

    fn integrate(a: f64, b: f64, pieces: usize, f: impl Fn(f64) -> f64) -> f64 {
        gauss_points(a, b, pieces).into_iter().map(|(x, w)| w * f(x)).sum()
    }

    #[test]
    fn polynomial_is_exact() {
        let value = integrate(0.0, 2.0, 1, |x| x.powi(7) - 3.0 * x * x);
        assert_relative_eq!(value, 256.0 / 8.0 - 8.0, epsilon = 1e-9);
    }

    #[test]
    fn trigonometric_is_accurate() {
        let value = integrate(0.0, PI, 4, f64::sin);
        assert_relative_eq!(value, 2.0, epsilon = 1e-12);
    }
}
