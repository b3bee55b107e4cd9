use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::warn;

use super::{edge_key, triangles, MeshPart, PartKind};

/// State of an undirected edge during the quad scan.
#[derive(Debug, Clone, Copy)]
enum EdgeSlot {
    /// Seen once, by the triangle with this number.
    Open(usize),
    /// Already merged into a quad; later sharers are ignored.
    Paired,
}

/// Merges pairs of triangles that share an edge into quad faces.
///
/// Triangles are scanned in index-buffer order. The first triangle to touch
/// an edge claims it; the second one forms a quad with it, and the edge is
/// then retired, so any further triangle on that edge stays unmatched.
/// The emitted face stores the shared edge in the later triangle's winding,
/// followed by the earlier triangle's wing and the later triangle's wing.
///
/// A pair without two distinct wings is not a quad: either one triangle is
/// degenerate, or both triangles cover the same three vertices and so share
/// all their edges. Such pairs still retire the edge but emit nothing.
#[must_use]
pub fn reconstruct_quads(indices: &[u32]) -> Vec<MeshPart> {
    let tris: Vec<[u32; 3]> = triangles(indices).collect();
    let mut edges: HashMap<(u32, u32), EdgeSlot> = HashMap::new();
    let mut faces = Vec::new();

    for (t, tri) in tris.iter().enumerate() {
        for j in 0..3 {
            let a = tri[j];
            let b = tri[(j + 1) % 3];
            match edges.entry(edge_key(a, b)) {
                Entry::Vacant(slot) => {
                    slot.insert(EdgeSlot::Open(t));
                }
                Entry::Occupied(mut slot) => {
                    let EdgeSlot::Open(earlier) = *slot.get() else {
                        continue;
                    };
                    slot.insert(EdgeSlot::Paired);
                    match (wing(&tris[earlier], a, b), wing(tri, a, b)) {
                        (Some(c), Some(d)) if c != d => {
                            faces.push(MeshPart::new(PartKind::Face([a, b, c, d])));
                        }
                        _ => warn!(triangle = t, earlier, "skipping degenerate triangle pair"),
                    }
                }
            }
        }
    }

    faces
}

/// The vertex of `tri` that is not on edge `a`-`b`.
fn wing(tri: &[u32; 3], a: u32, b: u32) -> Option<u32> {
    tri.iter().copied().find(|&v| v != a && v != b)
}
