//! CPU-side geometry.
//!
//! - [`MeshData`]: vertices plus optional indices, validated before upload
//! - [`primitives`]: procedural cube and Sierpinski triangle generators
//!
//! Uploading to the GPU lives in the renderer crate; nothing here touches a device.

mod error;

pub mod mesh;
pub mod primitives;

pub use error::{MeshError, MeshResult};
pub use mesh::MeshData;
pub use vkframe_rhi::vertex::Vertex;
