use super::quadrature::gauss_points;
use super::{Point2, TOLERANCE};

/// One piece of a closed planar boundary, expressed in a face's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundarySegment {
    /// Straight segment from `a` to `b`.
    Line { a: Point2, b: Point2 },
    /// Circular arc swept from `start` to `end` (radians, either direction).
    Arc {
        center: Point2,
        radius: f64,
        start: f64,
        end: f64,
    },
}

impl BoundarySegment {
    /// Evaluates the segment at normalized parameter `tau` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, tau: f64) -> Point2 {
        match *self {
            Self::Line { a, b } => a + (b - a) * tau,
            Self::Arc {
                center,
                radius,
                start,
                end,
            } => {
                let theta = start + (end - start) * tau;
                Point2::new(
                    center.x + radius * theta.cos(),
                    center.y + radius * theta.sin(),
                )
            }
        }
    }

    /// Derivative of [`point_at`](Self::point_at) with respect to `tau`.
    #[must_use]
    pub fn derivative_at(&self, tau: f64) -> (f64, f64) {
        match *self {
            Self::Line { a, b } => (b.x - a.x, b.y - a.y),
            Self::Arc {
                radius, start, end, ..
            } => {
                let sweep = end - start;
                let theta = start + sweep * tau;
                (-radius * theta.sin() * sweep, radius * theta.cos() * sweep)
            }
        }
    }

    /// Number of quadrature pieces needed for an accurate boundary integral.
    #[must_use]
    pub fn pieces(&self) -> usize {
        match *self {
            Self::Line { .. } => 1,
            Self::Arc { start, end, .. } => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = ((end - start).abs() / std::f64::consts::FRAC_PI_4).ceil() as usize;
                n.max(1)
            }
        }
    }

    /// Samples `n >= 2` points uniformly in parameter, endpoints included.
    #[must_use]
    pub fn sample(&self, n: usize) -> Vec<Point2> {
        let n = n.max(2);
        #[allow(clippy::cast_precision_loss)]
        let last = (n - 1) as f64;
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let tau = i as f64 / last;
                self.point_at(tau)
            })
            .collect()
    }
}

/// Area moments of a planar region up to second order.
///
/// `m_pq = ∫∫ s^p t^q ds dt` over the region, computed from the boundary
/// with Green's theorem. Counter-clockwise loops contribute positively.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m02: f64,
    pub m11: f64,
}

impl RegionMoments {
    /// Computes the signed moments of one closed loop.
    #[must_use]
    pub fn of_loop(segments: &[BoundarySegment]) -> Self {
        let mut m = Self::default();
        for seg in segments {
            for (tau, w) in gauss_points(0.0, 1.0, seg.pieces()) {
                let p = seg.point_at(tau);
                let (_, dt) = seg.derivative_at(tau);
                let (s, t) = (p.x, p.y);
                let f = w * dt;
                m.m00 += f * s;
                m.m10 += f * s * s * 0.5;
                m.m01 += f * s * t;
                m.m20 += f * s * s * s / 3.0;
                m.m02 += f * s * t * t;
                m.m11 += f * s * s * t * 0.5;
            }
        }
        m
    }

    /// Combines an outer loop with hole loops, independent of loop winding.
    #[must_use]
    pub fn of_region(outer: &[BoundarySegment], holes: &[Vec<BoundarySegment>]) -> Self {
        let mut total = Self::of_loop(outer).oriented();
        for hole in holes {
            total = total.minus(&Self::of_loop(hole).oriented());
        }
        total
    }

    /// Flips the moments so the enclosed area is positive.
    #[must_use]
    pub fn oriented(self) -> Self {
        if self.m00 < 0.0 {
            self.scaled(-1.0)
        } else {
            self
        }
    }

    fn scaled(self, k: f64) -> Self {
        Self {
            m00: self.m00 * k,
            m10: self.m10 * k,
            m01: self.m01 * k,
            m20: self.m20 * k,
            m02: self.m02 * k,
            m11: self.m11 * k,
        }
    }

    fn minus(self, other: &Self) -> Self {
        Self {
            m00: self.m00 - other.m00,
            m10: self.m10 - other.m10,
            m01: self.m01 - other.m01,
            m20: self.m20 - other.m20,
            m02: self.m02 - other.m02,
            m11: self.m11 - other.m11,
        }
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.m00
    }

    /// Area centroid, or `None` for a degenerate region.
    #[must_use]
    pub fn centroid(&self) -> Option<Point2> {
        if self.m00.abs() < TOLERANCE {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Even-odd point-in-polygon test. Points on the boundary may go either way.
#[must_use]
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (&polygon[i], &polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `point` to the segment `a`-`b`.
#[must_use]
pub fn point_segment_distance(point: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < TOLERANCE {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}
