use crate::math::Point3;

use super::data::{MeshData, Vertex};

/// GPU-facing vertex layout: position, normal, tangent, texcoord.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub texcoord: [f32; 2],
}

impl From<&Vertex> for RenderVertex {
    #[allow(clippy::cast_possible_truncation)]
    fn from(v: &Vertex) -> Self {
        Self {
            position: [v.position.x as f32, v.position.y as f32, v.position.z as f32],
            normal: [v.normal.x as f32, v.normal.y as f32, v.normal.z as f32],
            tangent: [v.tangent.x as f32, v.tangent.y as f32, v.tangent.z as f32],
            texcoord: [v.texcoord.x as f32, v.texcoord.y as f32],
        }
    }
}

/// Vertex and index buffers in the layout a renderer consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    pub vertices: Vec<RenderVertex>,
    pub indices: Vec<u32>,
    /// Material path from [`crate::MeshConfig::material`].
    pub material: String,
}

impl RenderBuffers {
    /// Resizes and rewrites both buffers from `data`.
    pub(crate) fn rewrite(&mut self, data: &MeshData) {
        self.vertices.clear();
        self.vertices.extend(data.vertices.iter().map(RenderVertex::from));
        self.indices.clear();
        self.indices.extend_from_slice(&data.indices);
    }
}

/// Flattened geometry for building a static collision shape.
///
/// `positions` holds one entry per vertex record so that `indices` can
/// address it directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionGeometry {
    pub positions: Vec<Point3>,
    pub indices: Vec<u32>,
}

impl From<&MeshData> for CollisionGeometry {
    fn from(data: &MeshData) -> Self {
        Self {
            positions: data.vertices.iter().map(|v| v.position).collect(),
            indices: data.indices.clone(),
        }
    }
}
