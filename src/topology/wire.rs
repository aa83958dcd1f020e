use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a wire in the topology store.
    pub struct WireId;
}

/// Data associated with a topological wire.
///
/// A wire is a closed loop of edges in traversal order; each edge is walked
/// from its `t_start` to its `t_end`.
#[derive(Debug, Clone)]
pub struct WireData {
    /// The ordered sequence of edges.
    pub edges: Vec<EdgeId>,
}
