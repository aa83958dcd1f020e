pub mod intersect_3d;
pub mod polygon_2d;
pub mod quadrature;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance for coincidence tests in model units (millimetres).
pub const LINEAR_TOLERANCE: f64 = 1e-6;

/// Finds a unit direction perpendicular to the given unit vector.
#[must_use]
pub fn perpendicular_dir(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let perp = axis.cross(&candidate);
    perp / perp.norm()
}

/// Normalizes an angle into `[0, 2*pi)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(std::f64::consts::TAU);
    if a >= std::f64::consts::TAU {
        0.0
    } else {
        a
    }
}

/// Returns `true` if `angle` lies within the counter-clockwise sweep
/// starting at `start` and spanning `sweep` radians (`0 <= sweep <= 2*pi`).
#[must_use]
pub fn angle_in_sweep(angle: f64, start: f64, sweep: f64, tol: f64) -> bool {
    if sweep >= std::f64::consts::TAU - tol {
        return true;
    }
    let offset = normalize_angle(angle - start);
    offset <= sweep + tol || offset >= std::f64::consts::TAU - tol
}

/// Returns `true` if `angle` lies on the arc swept from `start` to `end`,
/// in whichever direction the sweep runs.
#[must_use]
pub fn angle_between(angle: f64, start: f64, end: f64, tol: f64) -> bool {
    if end >= start {
        angle_in_sweep(angle, start, end - start, tol)
    } else {
        angle_in_sweep(angle, end, start - end, tol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn perpendicular_is_unit_and_orthogonal() {
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            let p = perpendicular_dir(&axis);
            assert!((p.norm() - 1.0).abs() < TOLERANCE);
            assert!(p.dot(&axis).abs() < TOLERANCE);
        }
    }

    #[test]
    fn normalize_wraps_negative_angles() {
        assert!((normalize_angle(-FRAC_PI_2) - 1.5 * PI).abs() < TOLERANCE);
        assert!(normalize_angle(TAU).abs() < TOLERANCE);
    }

    #[test]
    fn sweep_membership() {
        assert!(angle_in_sweep(FRAC_PI_2, 0.0, PI, 1e-9));
        assert!(!angle_in_sweep(1.5 * PI, 0.0, PI, 1e-9));
        assert!(angle_in_sweep(-FRAC_PI_2, PI, PI, 1e-9));
        assert!(angle_in_sweep(PI, 0.0, PI, 1e-9));
        assert!(angle_in_sweep(42.0, 0.0, TAU, 1e-9));
    }
}
