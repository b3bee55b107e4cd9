use std::collections::{HashMap, HashSet};

use crate::error::TopologyError;
use crate::mesh::Vertex;

use super::{edge_key, triangles, MeshPart, PartKind};

/// Collects edges seen an odd number of times, as `[min, max]` vertex pairs.
///
/// Every observation of an undirected edge toggles its presence, so an edge
/// shared by two triangles cancels out. On a manifold mesh this leaves the
/// boundary. Survivors are returned in the order they were last inserted.
#[must_use]
pub fn boundary_edges(indices: &[u32]) -> Vec<[u32; 2]> {
    let mut order: Vec<Option<(u32, u32)>> = Vec::new();
    let mut live: HashMap<(u32, u32), usize> = HashMap::new();

    for tri in triangles(indices) {
        for j in 0..3 {
            let key = edge_key(tri[j], tri[(j + 1) % 3]);
            if let Some(slot) = live.remove(&key) {
                order[slot] = None;
            } else {
                live.insert(key, order.len());
                order.push(Some(key));
            }
        }
    }

    order.into_iter().flatten().map(|(a, b)| [a, b]).collect()
}

/// Builds edge parts from the toggle pass, keeping one edge per undirected
/// position pair.
///
/// # Errors
///
/// Returns [`TopologyError::IndexOutOfRange`] if an edge references a
/// missing vertex.
pub fn reconstruct_edges(indices: &[u32], vertices: &[Vertex]) -> Result<Vec<MeshPart>, TopologyError> {
    let position_of = |v: u32| {
        vertices
            .get(v as usize)
            .map(|vertex| vertex.position_index)
            .ok_or(TopologyError::IndexOutOfRange {
                kind: "vertex",
                index: v as usize,
                len: vertices.len(),
            })
    };

    let mut seen = HashSet::new();
    let mut parts = Vec::new();
    for [a, b] in boundary_edges(indices) {
        if seen.insert(edge_key(position_of(a)?, position_of(b)?)) {
            parts.push(MeshPart::new(PartKind::Edge([a, b])));
        }
    }
    Ok(parts)
}
