pub mod edge;
pub mod face;
pub mod solid;
pub mod wire;

pub use edge::{EdgeCurve, EdgeData, EdgeId};
pub use face::{AxisFrame, FaceBounds, FaceData, FaceId, FaceSurface, RevolvedPatch};
pub use solid::{SolidData, SolidId};
pub use wire::{WireData, WireId};

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Central arena that owns all topological entities of one shape.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures.
#[derive(Debug, Default)]
pub struct TopologyStore {
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    solids: SlotMap<SolidId, SolidData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Inserts a wire after checking that its edges form a closed loop.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is missing or consecutive edges do not meet.
    pub fn add_wire(&mut self, data: WireData) -> Result<WireId, TopologyError> {
        if data.edges.is_empty() {
            return Err(TopologyError::InvalidTopology("wire has no edges".into()));
        }
        let n = data.edges.len();
        for i in 0..n {
            let end = self.edge(data.edges[i])?.end();
            let next_start = self.edge(data.edges[(i + 1) % n])?.start();
            if (end - next_start).norm() > 1e-6 {
                return Err(TopologyError::WireNotClosed);
            }
        }
        Ok(self.wires.insert(data))
    }

    /// Returns a reference to the wire data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> Result<&WireData, TopologyError> {
        self.wires
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wire".into()))
    }

    /// Samples a wire into a closed point loop (last point not repeated).
    ///
    /// # Errors
    ///
    /// Returns an error if the wire or one of its edges is missing.
    pub fn wire_points(&self, id: WireId) -> Result<Vec<Point3>, TopologyError> {
        let mut points = Vec::new();
        for &edge_id in &self.wire(id)?.edges {
            let mut samples = self.edge(edge_id)?.sample();
            samples.pop();
            points.extend(samples);
        }
        Ok(points)
    }

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, TopologyError> {
        self.solids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Line;

    fn segment(store: &mut TopologyStore, a: Point3, b: Point3) -> EdgeId {
        let (line, len) = Line::through(a, b).unwrap();
        store.add_edge(EdgeData {
            curve: EdgeCurve::Line(line),
            t_start: 0.0,
            t_end: len,
        })
    }

    #[test]
    fn closed_triangle_wire_is_accepted() {
        let mut store = TopologyStore::new();
        let (a, b, c) = (
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let edges = vec![segment(&mut store, a, b), segment(&mut store, b, c), segment(&mut store, c, a)];
        let wire = store.add_wire(WireData { edges }).unwrap();
        assert_eq!(store.wire_points(wire).unwrap().len(), 3);
    }

    #[test]
    fn open_wire_is_rejected() {
        let mut store = TopologyStore::new();
        let e1 = segment(&mut store, Point3::origin(), Point3::new(1.0, 0.0, 0.0));
        let e2 = segment(&mut store, Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let err = store.add_wire(WireData { edges: vec![e1, e2] }).unwrap_err();
        assert!(matches!(err, TopologyError::WireNotClosed));
    }

    #[test]
    fn missing_face_is_reported() {
        let store = TopologyStore::new();
        assert!(store.face(FaceId::default()).is_err());
    }
}
