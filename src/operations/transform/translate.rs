use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::Result;
use crate::math::Vector3;
use crate::mesh::EditableMesh;

/// Translates every position referenced by the selection.
///
/// Positions are collected as a set first, so a position referenced by
/// several selected parts moves exactly once. All vertices sharing a moved
/// position follow it.
pub struct TranslateSelection {
    displacement: Vector3,
}

impl TranslateSelection {
    /// Creates a new `TranslateSelection` operation.
    #[must_use]
    pub fn new(displacement: Vector3) -> Self {
        Self { displacement }
    }

    /// Executes the translation and rebuilds the mesh.
    ///
    /// Does nothing (and fires no notification) when the selection
    /// references no positions.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::TopologyError`] if a selected part references
    /// a missing vertex. The mesh is left untouched in that case.
    pub fn execute(&self, mesh: &mut EditableMesh) -> Result<()> {
        let data = mesh.data();
        let mut affected = BTreeSet::new();
        for part in mesh.selection() {
            for &vertex in part.vertex_indices() {
                affected.insert(data.position_index_of(vertex)?);
            }
        }
        if affected.is_empty() {
            trace!("translate with empty selection");
            return Ok(());
        }

        let mut edited = data.clone();
        for &index in &affected {
            let moved = edited.position(index)? + self.displacement;
            edited.positions[index as usize] = moved;
            for vertex in edited
                .vertices
                .iter_mut()
                .filter(|v| v.position_index == index)
            {
                vertex.position = moved;
            }
        }

        debug!(
            positions = affected.len(),
            dx = self.displacement.x,
            dy = self.displacement.y,
            dz = self.displacement.z,
            "translating selection"
        );
        let selected = mesh.selected_keys();
        mesh.commit(edited, &selected)
    }
}
