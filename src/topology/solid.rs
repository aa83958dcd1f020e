use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the topology store.
    pub struct SolidId;
}

/// A closed solid, bounded by its faces.
///
/// Face order is the order the builder emitted them in and is stable.
#[derive(Debug, Clone)]
pub struct SolidData {
    /// Bounding faces.
    pub faces: Vec<FaceId>,
}
