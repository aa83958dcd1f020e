//! Volume and centroid by the divergence theorem.
//!
//! `V = 1/3 ∮ p·n dA` and `∫ x_i dV = 1/2 ∮ x_i² n_i dA`, summed over the
//! outward-oriented boundary faces.

use std::f64::consts::FRAC_PI_4;

use crate::error::{GeometryError, KernelResult};
use crate::math::quadrature::gauss_points;
use crate::math::{Vector3, TOLERANCE};
use crate::topology::{FaceBounds, FaceData, RevolvedPatch, TopologyStore};

use super::region::PlanarRegion;
use super::MassProperties;

/// Boundary integrals accumulated over faces.
#[derive(Debug, Default, Clone, Copy)]
struct FluxSums {
    /// `∮ p·n dA`
    position: f64,
    /// `∮ x_i² n_i dA` per axis
    squares: Vector3,
}

pub(crate) fn mass_properties(store: &TopologyStore, faces: &[&FaceData]) -> KernelResult<MassProperties> {
    let mut sums = FluxSums::default();
    for face in faces {
        let face_sums = match &face.bounds {
            FaceBounds::Revolved(patch) => revolved_flux(patch),
            FaceBounds::Loops { .. } => match PlanarRegion::of_face(store, face)? {
                Some(region) => planar_flux(&region),
                None => FluxSums::default(),
            },
        };
        sums.position += face_sums.position;
        sums.squares += face_sums.squares;
    }

    let volume = sums.position / 3.0;
    if volume <= TOLERANCE {
        return Err(GeometryError::Degenerate(format!("solid encloses no volume ({volume:.3e} mm3)")).into());
    }
    let first_moments = sums.squares * 0.5;
    Ok(MassProperties {
        volume,
        center_of_mass: (first_moments / volume).into(),
    })
}

/// Closed form over the region moments: `p = O + s*u + t*v` is affine, so
/// `x_i²` integrates to a combination of moments up to second order.
fn planar_flux(region: &PlanarRegion) -> FluxSums {
    let m = region.moments();
    let n = region.normal;
    let o = region.plane.origin().coords;
    let (u, v) = (region.plane.u_dir(), region.plane.v_dir());

    let mut squares = Vector3::zeros();
    for i in 0..3 {
        let integral = o[i] * o[i] * m.m00
            + 2.0 * o[i] * (u[i] * m.m10 + v[i] * m.m01)
            + u[i] * u[i] * m.m20
            + 2.0 * u[i] * v[i] * m.m11
            + v[i] * v[i] * m.m02;
        squares[i] = integral * n[i];
    }
    FluxSums {
        position: o.dot(&n) * m.m00,
        squares,
    }
}

fn revolved_flux(patch: &RevolvedPatch) -> FluxSums {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let u_pieces = (patch.sweep() / FRAC_PI_4).ceil().max(1.0) as usize;
    let u_points = gauss_points(patch.u_start, patch.u_end, u_pieces);
    let t_points = gauss_points(0.0, 1.0, patch.meridian.pieces());

    let mut sums = FluxSums::default();
    for &(u, wu) in &u_points {
        for &(tau, wt) in &t_points {
            let w = wu * wt;
            let p = patch.point(u, tau).coords;
            let da = patch.area_element(u, tau);
            sums.position += w * p.dot(&da);
            sums.squares += p.component_mul(&p).component_mul(&da) * w;
        }
    }
    sums
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use crate::kernel::{BrepKernel, GeometryKernel, HoleEntry, HoleSpec, Prism, Revolve};
    use crate::math::polygon_2d::BoundarySegment;
    use crate::math::{Point2, Point3, Vector3};

    fn rectangle_profile(r0: f64, r1: f64, h0: f64, h1: f64) -> Vec<BoundarySegment> {
        let c = [
            Point2::new(r0, h0),
            Point2::new(r1, h0),
            Point2::new(r1, h1),
            Point2::new(r0, h1),
        ];
        (0..4)
            .map(|i| BoundarySegment::Line { a: c[i], b: c[(i + 1) % 4] })
            .collect()
    }

    #[test]
    fn solid_cylinder_volume_and_centroid() {
        let shape = Revolve::new(Point3::new(1.0, 2.0, 0.0), Vector3::z(), rectangle_profile(0.0, 10.0, 0.0, 50.0))
            .unwrap()
            .build("cylinder")
            .unwrap();
        let props = BrepKernel.mass_properties(&shape).unwrap();
        assert_relative_eq!(props.volume, PI * 100.0 * 50.0, max_relative = 1e-9);
        assert_relative_eq!(props.center_of_mass.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(props.center_of_mass.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(props.center_of_mass.z, 25.0, epsilon = 1e-6);
    }

    #[test]
    fn tube_volume_subtracts_bore() {
        let shape = Revolve::new(Point3::origin(), Vector3::x(), rectangle_profile(4.0, 10.0, 0.0, 20.0))
            .unwrap()
            .build("tube")
            .unwrap();
        let props = BrepKernel.mass_properties(&shape).unwrap();
        assert_relative_eq!(props.volume, PI * (100.0 - 16.0) * 20.0, max_relative = 1e-9);
        assert_relative_eq!(props.center_of_mass.x, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn ball_volume() {
        let profile = vec![
            BoundarySegment::Arc {
                center: Point2::origin(),
                radius: 5.0,
                start: -PI / 2.0,
                end: PI / 2.0,
            },
            BoundarySegment::Line {
                a: Point2::new(0.0, 5.0),
                b: Point2::new(0.0, -5.0),
            },
        ];
        let shape = Revolve::new(Point3::origin(), Vector3::z(), profile).unwrap().build("ball").unwrap();
        let props = BrepKernel.mass_properties(&shape).unwrap();
        assert_relative_eq!(props.volume, 4.0 / 3.0 * PI * 125.0, max_relative = 1e-9);
    }

    #[test]
    fn block_with_blind_hole() {
        let outline = vec![
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 0.0),
            Point2::new(40.0, 30.0),
            Point2::new(0.0, 30.0),
        ];
        let hole = HoleSpec {
            center: Point2::new(20.0, 15.0),
            diameter: 10.0,
            depth: Some(12.0),
            from: HoleEntry::Top,
        };
        let shape = Prism::new(outline, 20.0).with_hole(hole).build("block").unwrap();
        let props = BrepKernel.mass_properties(&shape).unwrap();
        let expected = 40.0 * 30.0 * 20.0 - PI * 25.0 * 12.0;
        assert_relative_eq!(props.volume, expected, max_relative = 1e-9);
        assert_relative_eq!(props.center_of_mass.x, 20.0, epsilon = 1e-6);
        assert!(props.center_of_mass.z < 10.0);
    }
}
