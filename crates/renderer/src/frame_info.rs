//! Per-frame state handed to render systems.

use ash::vk;

use vkframe_rhi::command::CommandBuffer;
use vkframe_scene::Camera;

/// Everything a render system needs to record one frame.
pub struct FrameInfo<'a> {
    /// Slot in `0..MAX_FRAMES_IN_FLIGHT`; selects per-frame resources.
    pub frame_index: usize,
    /// Seconds since the previous frame.
    pub frame_time: f32,
    pub command_buffer: &'a CommandBuffer,
    pub camera: &'a Camera,
    /// This slot's set pointing at its region of the global uniform buffer.
    pub global_descriptor_set: vk::DescriptorSet,
}
