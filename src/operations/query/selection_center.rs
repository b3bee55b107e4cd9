use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::mesh::{EditableMesh, MeshData};
use crate::topology::MeshPart;

/// Averages the positions referenced by the selected parts.
///
/// Each part contributes all of its corners (four for a face, two for an
/// edge, one for a vertex), so a position shared by several selected parts
/// is weighted once per reference.
#[derive(Debug, Default)]
pub struct SelectionCenter;

impl SelectionCenter {
    /// Creates a new `SelectionCenter` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the query. An empty selection yields the origin.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::TopologyError`] if a selected part references
    /// a missing vertex.
    pub fn execute(&self, mesh: &EditableMesh) -> Result<Point3> {
        Self::of(mesh.data(), mesh.selection())
    }

    /// Center of an arbitrary set of parts over `data`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::TopologyError`] if a part references a
    /// missing vertex.
    #[allow(clippy::cast_precision_loss)]
    pub fn of<'a>(data: &MeshData, parts: impl IntoIterator<Item = &'a MeshPart>) -> Result<Point3> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for part in parts {
            for &vertex in part.vertex_indices() {
                sum += data.position_of(vertex)?.coords;
                count += 1;
            }
        }
        if count == 0 {
            return Ok(Point3::origin());
        }
        Ok(Point3::from(sum / count as f64))
    }
}
