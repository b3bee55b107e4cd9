use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::mesh::{to_index, EditableMesh, MeshData, Vertex};
use crate::topology::{find_triangle, triangles, MeshPart, PartKind};

/// Deletes parts together with the triangles that depend on them.
///
/// - a face removes its two triangles;
/// - an edge removes every triangle containing both of its positions;
/// - a vertex removes every triangle touching its position.
///
/// Vertices left without triangles and positions left without vertices are
/// then dropped, and the remaining elements are renumbered in their
/// original order.
pub struct DeleteParts {
    parts: Vec<MeshPart>,
}

impl DeleteParts {
    /// Creates a new `DeleteParts` operation for the given parts.
    #[must_use]
    pub fn new(parts: Vec<MeshPart>) -> Self {
        Self { parts }
    }

    /// Creates a `DeleteParts` operation for the current selection.
    #[must_use]
    pub fn selection(mesh: &EditableMesh) -> Self {
        Self::new(mesh.selection().copied().collect())
    }

    /// Executes the deletion and rebuilds the mesh with an empty selection.
    ///
    /// Does nothing when there are no parts to delete.
    ///
    /// # Errors
    ///
    /// Returns a [`TopologyError`] if a part references missing vertices or a
    /// face whose triangles no longer exist. The mesh is left untouched.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        if self.parts.is_empty() {
            return Ok(());
        }
        let data = mesh.data();
        let mut doomed = vec![false; data.triangle_count()];
        for part in &self.parts {
            mark_dependent_triangles(data, part, &mut doomed)?;
        }
        let removed = doomed.iter().filter(|&&d| d).count();
        let edited = compact(data, &doomed)?;

        debug!(
            parts = self.parts.len(),
            triangles = removed,
            vertices = data.vertices.len() - edited.vertices.len(),
            positions = data.positions.len() - edited.positions.len(),
            "deleting parts"
        );
        mesh.commit(edited, &HashSet::new())
    }
}

fn mark_dependent_triangles(data: &MeshData, part: &MeshPart, doomed: &mut [bool]) -> Result<()> {
    match part.kind {
        PartKind::Face([a, b, c, d]) => {
            for corners in [[a, b, c], [a, b, d]] {
                let t = find_triangle(&data.indices, corners).ok_or_else(|| {
                    TopologyError::StalePart(format!("no triangle {corners:?} for face"))
                })?;
                doomed[t] = true;
            }
        }
        PartKind::Edge([a, b]) => {
            let pa = data.position_index_of(a)?;
            let pb = data.position_index_of(b)?;
            mark_where(data, doomed, |positions| {
                positions.contains(&pa) && positions.contains(&pb)
            })?;
        }
        PartKind::Vertex([a]) => {
            let pa = data.position_index_of(a)?;
            mark_where(data, doomed, |positions| positions.contains(&pa))?;
        }
    }
    Ok(())
}

/// Marks every triangle whose corner positions satisfy `pred`.
fn mark_where(
    data: &MeshData,
    doomed: &mut [bool],
    pred: impl Fn(&[u32; 3]) -> bool,
) -> Result<()> {
    for (t, tri) in triangles(&data.indices).enumerate() {
        let positions = [
            data.position_index_of(tri[0])?,
            data.position_index_of(tri[1])?,
            data.position_index_of(tri[2])?,
        ];
        if pred(&positions) {
            doomed[t] = true;
        }
    }
    Ok(())
}

/// Copies the surviving triangles and everything they reference.
fn compact(data: &MeshData, doomed: &[bool]) -> Result<MeshData> {
    let kept: Vec<[u32; 3]> = triangles(&data.indices)
        .zip(doomed)
        .filter(|(_, &d)| !d)
        .map(|(tri, _)| tri)
        .collect();

    let mut vertex_used = vec![false; data.vertices.len()];
    for &v in kept.iter().flatten() {
        vertex_used[v as usize] = true;
    }
    let mut position_used = vec![false; data.positions.len()];
    for (vertex, _) in data.vertices.iter().zip(&vertex_used).filter(|(_, &u)| u) {
        position_used[vertex.position_index as usize] = true;
    }

    let mut position_map = vec![0u32; data.positions.len()];
    let mut positions = Vec::new();
    for (i, position) in data.positions.iter().enumerate() {
        if position_used[i] {
            position_map[i] = to_index(positions.len())?;
            positions.push(*position);
        }
    }

    let mut vertex_map = vec![0u32; data.vertices.len()];
    let mut vertices = Vec::new();
    for (i, vertex) in data.vertices.iter().enumerate() {
        if vertex_used[i] {
            vertex_map[i] = to_index(vertices.len())?;
            vertices.push(Vertex {
                position_index: position_map[vertex.position_index as usize],
                ..vertex.clone()
            });
        }
    }

    let indices = kept
        .iter()
        .flatten()
        .map(|&v| vertex_map[v as usize])
        .collect();

    Ok(MeshData {
        positions,
        vertices,
        indices,
    })
}
