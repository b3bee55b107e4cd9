use thiserror::Error;

/// Top-level error type for the editable mesh core.
#[derive(Debug, Error)]
pub enum EditMeshError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to mesh storage and derived topology.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("{kind} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{0} does not fit in a 32-bit index")]
    IndexOverflow(usize),

    #[error("part no longer matches the mesh: {0}")]
    StalePart(String),
}

/// Errors related to edit operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`EditMeshError`].
pub type Result<T> = std::result::Result<T, EditMeshError>;
