//! Mesh data uploaded to device-local buffers.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use vkframe_resources::MeshData;
use vkframe_rhi::RhiResult;
use vkframe_rhi::buffer::{GpuBuffer, WHOLE_SIZE};
use vkframe_rhi::command::{CommandBuffer, CommandPool};
use vkframe_rhi::device::Device;
use vkframe_rhi::vertex::Vertex;

use crate::error::RendererResult;

/// Vertex and optional index buffer for one mesh.
///
/// Immutable after upload; share it between objects with `Arc`.
pub struct Model {
    vertex_buffer: GpuBuffer,
    vertex_count: u32,
    index_buffer: Option<GpuBuffer>,
    index_count: u32,
}

impl Model {
    /// Validates `mesh` and copies it to device-local memory through a
    /// host-visible staging buffer. Blocks until the copy has finished.
    ///
    /// # Errors
    ///
    /// [`MeshError`](vkframe_resources::MeshError) for an unusable mesh,
    /// allocation or submission errors otherwise.
    pub fn new(device: Arc<Device>, pool: &CommandPool, mesh: &MeshData) -> RendererResult<Self> {
        mesh.validate()?;

        let vertex_count = mesh.vertex_count() as u32;
        let vertex_buffer = upload(
            &device,
            pool,
            bytemuck::cast_slice(&mesh.vertices),
            std::mem::size_of::<Vertex>() as vk::DeviceSize,
            vertex_count,
            vk::BufferUsageFlags::VERTEX_BUFFER,
        )?;

        let (index_buffer, index_count) = match &mesh.indices {
            Some(indices) => {
                let count = indices.len() as u32;
                let buffer = upload(
                    &device,
                    pool,
                    bytemuck::cast_slice(indices),
                    std::mem::size_of::<u32>() as vk::DeviceSize,
                    count,
                    vk::BufferUsageFlags::INDEX_BUFFER,
                )?;
                (Some(buffer), count)
            }
            None => (None, 0),
        };

        debug!(
            "Model uploaded: {} vertices, {} indices",
            vertex_count, index_count
        );

        Ok(Self {
            vertex_buffer,
            vertex_count,
            index_buffer,
            index_count,
        })
    }

    pub fn bind(&self, command_buffer: &CommandBuffer) {
        command_buffer.bind_vertex_buffers(0, &[self.vertex_buffer.handle()], &[0]);
        if let Some(index_buffer) = &self.index_buffer {
            command_buffer.bind_index_buffer(index_buffer.handle(), 0, vk::IndexType::UINT32);
        }
    }

    /// Indexed draw when the mesh had indices, plain draw otherwise.
    pub fn draw(&self, command_buffer: &CommandBuffer) {
        if self.index_buffer.is_some() {
            command_buffer.draw_indexed(self.index_count, 1, 0, 0, 0);
        } else {
            command_buffer.draw(self.vertex_count, 1, 0, 0);
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

fn upload(
    device: &Arc<Device>,
    pool: &CommandPool,
    bytes: &[u8],
    element_size: vk::DeviceSize,
    element_count: u32,
    usage: vk::BufferUsageFlags,
) -> RhiResult<GpuBuffer> {
    let mut staging = GpuBuffer::new(
        device.clone(),
        element_size,
        element_count,
        vk::BufferUsageFlags::TRANSFER_SRC,
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        1,
    )?;
    staging.map(WHOLE_SIZE, 0)?;
    staging.write_to_buffer(bytes, WHOLE_SIZE, 0);
    staging.flush(WHOLE_SIZE, 0)?;
    staging.unmap();

    let buffer = GpuBuffer::new(
        device.clone(),
        element_size,
        element_count,
        usage | vk::BufferUsageFlags::TRANSFER_DST,
        vk::MemoryPropertyFlags::DEVICE_LOCAL,
        1,
    )?;
    pool.copy_buffer(staging.handle(), buffer.handle(), staging.size())?;
    Ok(buffer)
}
