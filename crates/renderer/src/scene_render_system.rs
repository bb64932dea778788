//! Draws every [`GameObject`](vkframe_scene::GameObject) with the simple
//! lit shader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash::vk;
use tracing::info;

use vkframe_rhi::RhiResult;
use vkframe_rhi::device::Device;
use vkframe_rhi::pipeline::{Pipeline, PipelineConfig, PipelineLayout, ViewportPolicy};
use vkframe_scene::GameObjects;

use crate::error::RendererResult;
use crate::frame_info::FrameInfo;
use crate::model::Model;
use crate::ubo::SimplePushConstantData;

/// Stages that read [`SimplePushConstantData`].
pub const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags = vk::ShaderStageFlags::from_raw(
    vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
);

/// Push constant range matching [`SimplePushConstantData`].
pub fn push_constant_range() -> vk::PushConstantRange {
    vk::PushConstantRange {
        stage_flags: PUSH_CONSTANT_STAGES,
        offset: 0,
        size: SimplePushConstantData::SIZE as u32,
    }
}

/// Pipeline config for the scene: dynamic viewport, targeting `render_pass`.
pub fn scene_pipeline_config(
    layout: vk::PipelineLayout,
    render_pass: vk::RenderPass,
) -> PipelineConfig {
    let mut config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
    config.pipeline_layout = Some(layout);
    config.render_pass = Some(render_pass);
    config
}

/// Owns the scene pipeline and its layout.
///
/// The pipeline uses dynamic viewport and scissor, so it only has to be
/// rebuilt when the render pass itself is replaced.
pub struct SceneRenderSystem {
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
    device: Arc<Device>,
    vertex_shader: PathBuf,
    fragment_shader: PathBuf,
    render_pass_epoch: u64,
}

impl SceneRenderSystem {
    /// # Errors
    ///
    /// Shader load or pipeline creation errors; these are fatal at startup.
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        render_pass_epoch: u64,
        global_set_layout: vk::DescriptorSetLayout,
        vertex_shader: &Path,
        fragment_shader: &Path,
    ) -> RendererResult<Self> {
        let pipeline_layout = PipelineLayout::new(
            device.clone(),
            &[global_set_layout],
            &[push_constant_range()],
        )?;
        let pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            render_pass,
            vertex_shader,
            fragment_shader,
        )?;

        Ok(Self {
            pipeline,
            pipeline_layout,
            device,
            vertex_shader: vertex_shader.to_path_buf(),
            fragment_shader: fragment_shader.to_path_buf(),
            render_pass_epoch,
        })
    }

    /// Rebuilds the pipeline if the renderer replaced its render pass since
    /// this system last built one.
    pub fn ensure_render_pass(
        &mut self,
        render_pass: vk::RenderPass,
        render_pass_epoch: u64,
    ) -> RendererResult<()> {
        if render_pass_epoch == self.render_pass_epoch {
            return Ok(());
        }
        info!("Render pass replaced, rebuilding scene pipeline");
        self.pipeline = create_pipeline(
            &self.device,
            &self.pipeline_layout,
            render_pass,
            &self.vertex_shader,
            &self.fragment_shader,
        )?;
        self.render_pass_epoch = render_pass_epoch;
        Ok(())
    }

    /// Records draws for every object with a model, in insertion order.
    pub fn render(&self, frame_info: &FrameInfo<'_>, objects: &GameObjects<Model>) {
        let command_buffer = frame_info.command_buffer;
        self.pipeline.bind(command_buffer);
        command_buffer.bind_descriptor_sets(
            vk::PipelineBindPoint::GRAPHICS,
            self.pipeline_layout.handle(),
            0,
            &[frame_info.global_descriptor_set],
        );

        for object in objects {
            let Some(model) = &object.model else {
                continue;
            };
            let push = SimplePushConstantData::from(&object.transform);
            command_buffer.push_constants(
                self.pipeline_layout.handle(),
                PUSH_CONSTANT_STAGES,
                0,
                &push,
            );
            model.bind(command_buffer);
            model.draw(command_buffer);
        }
    }
}

fn create_pipeline(
    device: &Arc<Device>,
    layout: &PipelineLayout,
    render_pass: vk::RenderPass,
    vertex_shader: &Path,
    fragment_shader: &Path,
) -> RhiResult<Pipeline> {
    let config = scene_pipeline_config(layout.handle(), render_pass);
    Pipeline::new(device.clone(), vertex_shader, fragment_shader, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn test_push_range_covers_block() {
        let range = push_constant_range();
        assert_eq!(range.offset, 0);
        assert_eq!(range.size, 128);
        assert!(range.stage_flags.contains(vk::ShaderStageFlags::VERTEX));
        assert!(range.stage_flags.contains(vk::ShaderStageFlags::FRAGMENT));
    }

    #[test]
    fn test_scene_config_is_dynamic_and_targeted() {
        let config = scene_pipeline_config(
            vk::PipelineLayout::from_raw(1),
            vk::RenderPass::from_raw(2),
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.viewport, ViewportPolicy::Dynamic);
        assert!(config.depth_test);
    }

    #[test]
    fn test_scene_config_rejects_null_render_pass() {
        let config =
            scene_pipeline_config(vk::PipelineLayout::from_raw(1), vk::RenderPass::null());
        assert!(matches!(
            config.validate(),
            Err(vkframe_rhi::RhiError::MissingRenderPass)
        ));
    }
}
