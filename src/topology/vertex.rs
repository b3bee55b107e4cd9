use std::collections::HashSet;

use crate::error::TopologyError;
use crate::mesh::{to_index, Vertex};

use super::{MeshPart, PartKind};

/// One vertex part per distinct position, referencing the first vertex
/// record that uses it.
///
/// # Errors
///
/// Returns [`TopologyError::IndexOverflow`] if there are more vertices than
/// a 32-bit index can address.
pub fn reconstruct_vertices(vertices: &[Vertex]) -> Result<Vec<MeshPart>, TopologyError> {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for (i, vertex) in vertices.iter().enumerate() {
        if seen.insert(vertex.position_index) {
            parts.push(MeshPart::new(PartKind::Vertex([to_index(i)?])));
        }
    }
    Ok(parts)
}
