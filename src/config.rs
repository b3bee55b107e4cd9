/// Parameters shared by mesh generation and editing.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    /// Object-space units covered by one texture repeat in planar UVs.
    pub uv_scale: f64,
    /// Material the host binds to the render buffers.
    pub material: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            uv_scale: 32.0,
            material: "materials/dev/reflectivity_30.vmat".into(),
        }
    }
}
