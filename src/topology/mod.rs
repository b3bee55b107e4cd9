pub mod edge;
pub mod quad;
pub mod registry;
pub mod vertex;

pub use edge::{boundary_edges, reconstruct_edges};
pub use quad::reconstruct_quads;
pub use registry::{PartHandle, PartRegistry};
pub use vertex::reconstruct_vertices;

use crate::error::TopologyError;
use crate::mesh::Vertex;

/// The shape of a selectable part, as vertex-sequence indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// A single vertex.
    Vertex([u32; 1]),
    /// An edge, stored as `[min, max]`.
    Edge([u32; 2]),
    /// A quad merged from two triangles: the two hinge vertices of the
    /// shared edge, then the wing of the earlier triangle, then the wing of
    /// the later one.
    Face([u32; 4]),
}

impl PartKind {
    /// The vertex indices this part references, in stored order.
    #[must_use]
    pub fn vertex_indices(&self) -> &[u32] {
        match self {
            Self::Vertex(v) => v,
            Self::Edge(e) => e,
            Self::Face(f) => f,
        }
    }

    /// Structural key: kind plus sorted indices.
    #[must_use]
    pub fn key(&self) -> PartKey {
        match *self {
            Self::Vertex([a]) => PartKey::Vertex(a),
            Self::Edge(mut e) => {
                e.sort_unstable();
                PartKey::Edge(e)
            }
            Self::Face(mut f) => {
                f.sort_unstable();
                PartKey::Face(f)
            }
        }
    }
}

/// Stable identity of a part across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKey {
    Vertex(u32),
    Edge([u32; 2]),
    Face([u32; 4]),
}

/// A derived, selectable topological feature of the mesh.
///
/// Parts are rebuilt from scratch whenever mesh data changes. A part's
/// identity across rebuilds is its [`PartKey`], never its position in the
/// part list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshPart {
    pub kind: PartKind,
    /// Set by the editor; the mesh only carries it across rebuilds.
    pub selected: bool,
}

impl MeshPart {
    /// Creates an unselected part.
    #[must_use]
    pub fn new(kind: PartKind) -> Self {
        Self {
            kind,
            selected: false,
        }
    }

    /// Shorthand for [`PartKind::key`].
    #[must_use]
    pub fn key(&self) -> PartKey {
        self.kind.key()
    }

    /// Shorthand for [`PartKind::vertex_indices`].
    #[must_use]
    pub fn vertex_indices(&self) -> &[u32] {
        self.kind.vertex_indices()
    }

    #[must_use]
    pub fn is_face(&self) -> bool {
        matches!(self.kind, PartKind::Face(_))
    }
}

/// Canonical undirected edge key `(min, max)`.
#[must_use]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Iterates the complete triangles of an index buffer.
///
/// A trailing partial triangle is ignored.
pub fn triangles(indices: &[u32]) -> impl Iterator<Item = [u32; 3]> + '_ {
    indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
}

/// Finds the first triangle whose corners are exactly `corners`, in any order.
///
/// Returns the triangle number (offset into the index buffer divided by 3).
#[must_use]
pub fn find_triangle(indices: &[u32], mut corners: [u32; 3]) -> Option<usize> {
    corners.sort_unstable();
    triangles(indices).position(|mut tri| {
        tri.sort_unstable();
        tri == corners
    })
}

/// Rebuilds the full part list: quads, then edges, then vertices.
///
/// # Errors
///
/// Returns [`TopologyError::IndexOutOfRange`] if an index references a
/// missing vertex.
pub fn reconstruct_parts(indices: &[u32], vertices: &[Vertex]) -> Result<Vec<MeshPart>, TopologyError> {
    let mut parts = reconstruct_quads(indices);
    parts.extend(reconstruct_edges(indices, vertices)?);
    parts.extend(reconstruct_vertices(vertices)?);
    Ok(parts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn key_sorts_indices() {
        let face = PartKind::Face([7, 2, 9, 1]);
        assert_eq!(face.key(), PartKey::Face([1, 2, 7, 9]));
        assert_eq!(PartKind::Edge([5, 3]).key(), PartKey::Edge([3, 5]));
    }

    #[test]
    fn keys_distinguish_kinds() {
        assert_ne!(PartKind::Vertex([1]).key(), PartKind::Edge([1, 1]).key());
    }

    #[test]
    fn triangles_ignore_trailing_indices() {
        let tris: Vec<_> = triangles(&[0, 1, 2, 3, 4]).collect();
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn find_triangle_ignores_winding() {
        let indices = [0, 1, 2, 2, 1, 3];
        assert_eq!(find_triangle(&indices, [3, 2, 1]), Some(1));
        assert_eq!(find_triangle(&indices, [0, 1, 3]), None);
    }

    #[test]
    fn edge_key_is_undirected() {
        assert_eq!(edge_key(4, 1), edge_key(1, 4));
    }
}
