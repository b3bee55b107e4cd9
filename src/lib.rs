pub mod config;
pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod topology;

pub use config::MeshConfig;
pub use error::{EditMeshError, Result};
pub use mesh::{EditableMesh, MeshData, Vertex};
pub use topology::{MeshPart, PartKey, PartKind};
