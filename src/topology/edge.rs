use crate::geometry::curve::{Arc, Curve, CurveDomain, Line};
use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// The geometric curve associated with an edge.
#[derive(Debug, Clone)]
pub enum EdgeCurve {
    /// A line segment.
    Line(Line),
    /// A circular arc.
    Arc(Arc),
}

/// Data associated with a topological edge.
///
/// The edge runs along its curve from `t_start` to `t_end`; wires traverse
/// their edges in that direction.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// The geometric curve defining this edge's shape.
    pub curve: EdgeCurve,
    /// Parameter at the start of the edge.
    pub t_start: f64,
    /// Parameter at the end of the edge.
    pub t_end: f64,
}

impl EdgeData {
    /// Evaluates the underlying curve at `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        match &self.curve {
            EdgeCurve::Line(line) => line.evaluate(t),
            EdgeCurve::Arc(arc) => arc.evaluate(t),
        }
    }

    /// Parameter range of the edge.
    #[must_use]
    pub fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.t_start, self.t_end)
    }

    /// Start point.
    #[must_use]
    pub fn start(&self) -> Point3 {
        self.point_at(self.t_start)
    }

    /// End point.
    #[must_use]
    pub fn end(&self) -> Point3 {
        self.point_at(self.t_end)
    }

    /// Samples the edge with a density suited to its curve type.
    #[must_use]
    pub fn sample(&self) -> Vec<Point3> {
        let n = match &self.curve {
            EdgeCurve::Line(_) => 2,
            EdgeCurve::Arc(_) => {
                let sweep = (self.t_end - self.t_start).abs();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = (sweep / std::f64::consts::TAU * 64.0).ceil() as usize;
                n.max(4) + 1
            }
        };
        self.domain().uniform(n).into_iter().map(|t| self.point_at(t)).collect()
    }
}
