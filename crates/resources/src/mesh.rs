//! Vertex/index data as handed to the GPU upload path.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{MeshError, MeshResult};
use vkframe_rhi::vertex::Vertex;

/// Vertices with an optional index list.
///
/// Without indices every three consecutive vertices form a triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    pub fn indexed(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Number of vertices a draw call covers: indices if present, vertices otherwise.
    pub fn draw_count(&self) -> usize {
        self.indices.as_ref().map_or(self.vertices.len(), Vec::len)
    }

    /// Checks the mesh can be uploaded and drawn.
    ///
    /// # Errors
    ///
    /// [`MeshError::Empty`], [`MeshError::TooFewVertices`] or
    /// [`MeshError::IndexOutOfRange`] for the first problem found.
    pub fn validate(&self) -> MeshResult<()> {
        let vertex_count = self.vertices.len();
        if vertex_count == 0 {
            return Err(MeshError::Empty);
        }
        if vertex_count < 3 {
            return Err(MeshError::TooFewVertices(vertex_count));
        }
        if let Some(indices) = &self.indices
            && let Some((position, &index)) = indices
                .iter()
                .enumerate()
                .find(|&(_, &index)| index as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Returns an indexed mesh in which bit-identical vertices are shared.
    ///
    /// Triangle order is preserved; vertices keep the order of their first use.
    ///
    /// # Errors
    ///
    /// Whatever [`MeshData::validate`] reports; an index past the end of the
    /// vertex list is rejected rather than followed.
    pub fn deduplicate(&self) -> MeshResult<MeshData> {
        self.validate()?;
        let sequence: Box<dyn Iterator<Item = &Vertex>> = match &self.indices {
            Some(indices) => Box::new(indices.iter().map(|&i| &self.vertices[i as usize])),
            None => Box::new(self.vertices.iter()),
        };

        let mut unique: HashMap<[u32; 11], u32> = HashMap::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(self.draw_count());

        for vertex in sequence {
            let key: [u32; 11] = bytemuck::cast(*vertex);
            let index = *unique.entry(key).or_insert_with(|| {
                vertices.push(*vertex);
                (vertices.len() - 1) as u32
            });
            indices.push(index);
        }

        debug!(
            "Deduplicated mesh: {} -> {} vertices, {} indices",
            self.vertices.len(),
            vertices.len(),
            indices.len()
        );

        Ok(MeshData::indexed(vertices, indices))
    }
}
