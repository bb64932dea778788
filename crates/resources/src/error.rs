//! Mesh validation errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("Mesh has no vertices")]
    Empty,

    /// Fewer vertices than one triangle needs.
    #[error("Mesh needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// An index refers past the end of the vertex list.
    #[error("Index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;
