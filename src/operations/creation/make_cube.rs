use crate::config::MeshConfig;
use crate::error::Result;
use crate::math::polygon_3d::planar_uv;
use crate::math::{Point3, Vector3};
use crate::mesh::{to_index, EditableMesh, MeshData, Vertex};

/// Corner indices of each side, wound so the two triangles
/// `(0, 2, 1)` and `(2, 0, 3)` face outward.
const SIDES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [7, 6, 5, 4],
    [0, 4, 5, 1],
    [1, 5, 6, 2],
    [2, 6, 7, 3],
    [3, 7, 4, 0],
];

/// Creates an axis-aligned box mesh centered at the origin.
///
/// Each side gets its own four vertices with a flat normal, a tangent and
/// planar texture coordinates, so the box has 8 positions, 24 vertices and
/// 12 triangles.
pub struct MakeCube {
    size: Vector3,
    config: MeshConfig,
}

impl MakeCube {
    /// Creates a new `MakeCube` operation with the default configuration.
    #[must_use]
    pub fn new(size: Vector3) -> Self {
        Self {
            size,
            config: MeshConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MeshConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the raw mesh sequences.
    ///
    /// # Errors
    ///
    /// Does not fail for any size; the signature matches the other builders.
    pub fn build(&self) -> Result<MeshData> {
        let h = self.size / 2.0;
        let positions = vec![
            Point3::new(-h.x, -h.y, h.z),
            Point3::new(-h.x, h.y, h.z),
            Point3::new(h.x, h.y, h.z),
            Point3::new(h.x, -h.y, h.z),
            Point3::new(-h.x, -h.y, -h.z),
            Point3::new(-h.x, h.y, -h.z),
            Point3::new(h.x, h.y, -h.z),
            Point3::new(h.x, -h.y, -h.z),
        ];

        let forward = Vector3::x();
        let left = Vector3::y();
        let down = -Vector3::z();
        let u_axes = [forward, left, left, forward, -left, -forward];
        let v_axes = [left, forward, down, down, down, down];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (side, corners) in SIDES.iter().enumerate() {
            let tangent = u_axes[side];
            let bitangent = v_axes[side];
            let normal = tangent.cross(&bitangent);

            for &corner in corners {
                let position = positions[corner];
                vertices.push(Vertex {
                    position,
                    normal,
                    tangent,
                    texcoord: planar_uv(&position, &tangent, &bitangent, self.config.uv_scale),
                    position_index: to_index(corner)?,
                });
            }

            let base = to_index(side * 4)?;
            indices.extend_from_slice(&[base, base + 2, base + 1, base + 2, base, base + 3]);
        }

        Ok(MeshData {
            positions,
            vertices,
            indices,
        })
    }

    /// Builds the cube and wraps it in an [`EditableMesh`].
    ///
    /// # Errors
    ///
    /// Returns an error if the generated data fails validation.
    pub fn execute(&self) -> Result<EditableMesh> {
        EditableMesh::new(self.build()?, self.config.clone())
    }
}
