use crate::error::TopologyError;
use crate::math::{Point3, Vector2, Vector3};

/// Per-corner rendering attributes referencing a shared position.
///
/// `position` is a cached copy of `positions[position_index]`; the mesh
/// rewrites it on every rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3,
    pub normal: Vector3,
    pub tangent: Vector3,
    pub texcoord: Vector2,
    /// Index into [`MeshData::positions`].
    pub position_index: u32,
}

impl Vertex {
    /// Creates a vertex for the given position with zeroed attributes.
    #[must_use]
    pub fn at(position: Point3, position_index: u32) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            tangent: Vector3::zeros(),
            texcoord: Vector2::zeros(),
            position_index,
        }
    }
}

/// The three ground-truth sequences of an indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Unique object-space points.
    pub positions: Vec<Point3>,
    /// Rendering vertices; their order is the vertex buffer order.
    pub vertices: Vec<Vertex>,
    /// Triangle list, three vertex indices per triangle.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of complete triangles in the index buffer.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the position index of vertex `vertex`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if the vertex does not exist.
    pub fn position_index_of(&self, vertex: u32) -> Result<u32, TopologyError> {
        self.vertices
            .get(vertex as usize)
            .map(|v| v.position_index)
            .ok_or(TopologyError::IndexOutOfRange {
                kind: "vertex",
                index: vertex as usize,
                len: self.vertices.len(),
            })
    }

    /// Returns the canonical position of vertex `vertex`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if the vertex or its
    /// position does not exist.
    pub fn position_of(&self, vertex: u32) -> Result<Point3, TopologyError> {
        let index = self.position_index_of(vertex)?;
        self.position(index)
    }

    /// Returns position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::IndexOutOfRange`] if the position does not exist.
    pub fn position(&self, index: u32) -> Result<Point3, TopologyError> {
        self.positions
            .get(index as usize)
            .copied()
            .ok_or(TopologyError::IndexOutOfRange {
                kind: "position",
                index: index as usize,
                len: self.positions.len(),
            })
    }

    /// Checks that every reference between the sequences is in range and
    /// that every count fits a 32-bit index.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if u32::try_from(self.positions.len()).is_err() {
            return Err(TopologyError::IndexOverflow(self.positions.len()));
        }
        if u32::try_from(self.vertices.len()).is_err() {
            return Err(TopologyError::IndexOverflow(self.vertices.len()));
        }
        for vertex in &self.vertices {
            if vertex.position_index as usize >= self.positions.len() {
                return Err(TopologyError::IndexOutOfRange {
                    kind: "position",
                    index: vertex.position_index as usize,
                    len: self.positions.len(),
                });
            }
        }
        if let Some(&bad) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(TopologyError::IndexOutOfRange {
                kind: "vertex",
                index: bad as usize,
                len: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// Rewrites every cached vertex position from its canonical position.
    ///
    /// Must only be called on validated data.
    pub(crate) fn sync_vertex_positions(&mut self) {
        let positions = &self.positions;
        for vertex in &mut self.vertices {
            vertex.position = positions[vertex.position_index as usize];
        }
    }
}

/// Converts a sequence length or offset to a 32-bit mesh index.
///
/// # Errors
///
/// Returns [`TopologyError::IndexOverflow`] if `value` exceeds `u32::MAX`.
pub fn to_index(value: usize) -> Result<u32, TopologyError> {
    u32::try_from(value).map_err(|_| TopologyError::IndexOverflow(value))
}
