//! Per-frame global uniform buffer and the descriptor sets that expose it.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use vkframe_rhi::RhiResult;
use vkframe_rhi::buffer::{GpuBuffer, WHOLE_SIZE};
use vkframe_rhi::descriptor::{
    DescriptorPool, DescriptorPoolBuilder, DescriptorSetLayout, DescriptorSetLayoutBuilder,
    DescriptorWriter,
};
use vkframe_rhi::device::Device;
use vkframe_rhi::sync::MAX_FRAMES_IN_FLIGHT;

use crate::ubo::GlobalUbo;

/// One [`GlobalUbo`] slot and one descriptor set per frame in flight.
///
/// Slot `i` is only written while frame slot `i`'s fence is signaled, so
/// the GPU never reads a block the CPU is overwriting.
pub struct GlobalResources {
    sets: Vec<vk::DescriptorSet>,
    // Sets are released with the pool.
    _pool: DescriptorPool,
    layout: DescriptorSetLayout,
    buffer: GpuBuffer,
}

impl GlobalResources {
    /// # Errors
    ///
    /// Allocation, layout or pool errors; the pool holds exactly
    /// `MAX_FRAMES_IN_FLIGHT` sets.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let frames = MAX_FRAMES_IN_FLIGHT as u32;
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment;

        let mut buffer = GpuBuffer::new(
            device.clone(),
            GlobalUbo::SIZE as vk::DeviceSize,
            frames,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            min_alignment,
        )?;
        buffer.map(WHOLE_SIZE, 0)?;

        let layout = DescriptorSetLayoutBuilder::new(device.clone())
            .add_binding(
                0,
                vk::DescriptorType::UNIFORM_BUFFER,
                vk::ShaderStageFlags::ALL_GRAPHICS,
                1,
            )
            .build()?;

        let mut pool = DescriptorPoolBuilder::new(device)
            .set_max_sets(frames)
            .add_pool_size(vk::DescriptorType::UNIFORM_BUFFER, frames)
            .build()?;

        let sets = (0..frames)
            .map(|i| {
                DescriptorWriter::new(&layout, &mut pool)
                    .write_buffer(0, buffer.descriptor_info_for_index(i))
                    .build()
            })
            .collect::<RhiResult<Vec<_>>>()?;

        debug!(
            "Global uniforms: {} slots of {} bytes (stride {})",
            frames,
            GlobalUbo::SIZE,
            buffer.layout().aligned_size()
        );

        Ok(Self {
            sets,
            _pool: pool,
            layout,
            buffer,
        })
    }

    /// Writes `ubo` into `frame_index`'s slot and flushes exactly that slot.
    pub fn update(&mut self, frame_index: usize, ubo: &GlobalUbo) -> RhiResult<()> {
        let index = frame_index as u32;
        self.buffer.write_to_index(bytemuck::bytes_of(ubo), index);
        self.buffer.flush_index(index)
    }

    #[inline]
    pub fn descriptor_set(&self, frame_index: usize) -> vk::DescriptorSet {
        self.sets[frame_index]
    }

    #[inline]
    pub fn set_layout(&self) -> &DescriptorSetLayout {
        &self.layout
    }
}
