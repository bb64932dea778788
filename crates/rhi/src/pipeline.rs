//! Graphics pipeline creation.
//!
//! A [`PipelineConfig`] is a plain value holding every piece of fixed-function
//! state plus the pipeline layout and render pass it targets.
//! [`PipelineConfig::default_config`] builds the baseline; callers then set
//! `pipeline_layout` and `render_pass` before handing it to [`Pipeline::new`].
//! The config is validated before any device call, so a missing layout or
//! render pass never reaches the driver.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use ash::vk;
//! use vkframe_rhi::device::Device;
//! use vkframe_rhi::pipeline::{Pipeline, PipelineConfig, PipelineLayout, ViewportPolicy};
//!
//! # fn example(device: Arc<Device>, render_pass: vk::RenderPass) -> vkframe_rhi::RhiResult<()> {
//! let layout = PipelineLayout::new(device.clone(), &[], &[])?;
//! let mut config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
//! config.pipeline_layout = Some(layout.handle());
//! config.render_pass = Some(render_pass);
//! let pipeline = Pipeline::new(
//!     device,
//!     Path::new("shaders/simple_shader.vert.spv"),
//!     Path::new("shaders/simple_shader.frag.spv"),
//!     &config,
//! )?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use crate::command::CommandBuffer;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::shader::{Shader, ShaderStage};
use crate::vertex::Vertex;

/// Vulkan pipeline layout wrapper.
///
/// Describes the descriptor set layouts and push constant ranges a pipeline
/// may access. Must outlive every pipeline created against it.
pub struct PipelineLayout {
    device: Arc<Device>,
    layout: vk::PipelineLayout,
}

impl PipelineLayout {
    /// Creates a new pipeline layout.
    ///
    /// # Errors
    ///
    /// Returns an error if pipeline layout creation fails.
    pub fn new(
        device: Arc<Device>,
        descriptor_set_layouts: &[vk::DescriptorSetLayout],
        push_constant_ranges: &[vk::PushConstantRange],
    ) -> RhiResult<Self> {
        let create_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(descriptor_set_layouts)
            .push_constant_ranges(push_constant_ranges);

        let layout = unsafe { device.handle().create_pipeline_layout(&create_info, None)? };

        debug!(
            "Created pipeline layout with {} set layout(s) and {} push constant range(s)",
            descriptor_set_layouts.len(),
            push_constant_ranges.len()
        );

        Ok(Self { device, layout })
    }

    #[inline]
    pub fn handle(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_pipeline_layout(self.layout, None);
        }
        debug!("Pipeline layout destroyed");
    }
}

/// Where the viewport and scissor come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportPolicy {
    /// Set per command buffer; the pipeline survives swap chain recreation.
    Dynamic,
    /// Baked in at creation; the pipeline must be rebuilt when the extent changes.
    Static(vk::Extent2D),
}

/// Fixed-function state and targets for one graphics pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub viewport: ViewportPolicy,
    pub topology: vk::PrimitiveTopology,
    pub primitive_restart: bool,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub line_width: f32,
    pub rasterization_samples: vk::SampleCountFlags,
    pub color_blend_attachment: vk::PipelineColorBlendAttachmentState,
    pub depth_test: bool,
    pub depth_write: bool,
    pub depth_compare_op: vk::CompareOp,
    pub dynamic_states: Vec<vk::DynamicState>,
    pub binding_descriptions: Vec<vk::VertexInputBindingDescription>,
    pub attribute_descriptions: Vec<vk::VertexInputAttributeDescription>,
    pub pipeline_layout: Option<vk::PipelineLayout>,
    pub render_pass: Option<vk::RenderPass>,
    pub subpass: u32,
}

impl PipelineConfig {
    /// Baseline state: triangle list, filled, no culling, clockwise front
    /// face, one sample, opaque RGBA writes, depth test and write with LESS.
    ///
    /// With [`ViewportPolicy::Dynamic`] viewport and scissor are dynamic
    /// state. Vertex input matches [`Vertex`]. Layout and render pass are
    /// left unset.
    pub fn default_config(viewport: ViewportPolicy) -> Self {
        let dynamic_states = match viewport {
            ViewportPolicy::Dynamic => vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR],
            ViewportPolicy::Static(_) => Vec::new(),
        };

        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(false)
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .src_color_blend_factor(vk::BlendFactor::ONE)
            .dst_color_blend_factor(vk::BlendFactor::ZERO)
            .color_blend_op(vk::BlendOp::ADD)
            .src_alpha_blend_factor(vk::BlendFactor::ONE)
            .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
            .alpha_blend_op(vk::BlendOp::ADD);

        Self {
            viewport,
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            primitive_restart: false,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::CLOCKWISE,
            line_width: 1.0,
            rasterization_samples: vk::SampleCountFlags::TYPE_1,
            color_blend_attachment,
            depth_test: true,
            depth_write: true,
            depth_compare_op: vk::CompareOp::LESS,
            dynamic_states,
            binding_descriptions: Vertex::binding_descriptions().to_vec(),
            attribute_descriptions: Vertex::attribute_descriptions().to_vec(),
            pipeline_layout: None,
            render_pass: None,
            subpass: 0,
        }
    }

    /// Checks the contract that must hold before any device call.
    ///
    /// # Errors
    ///
    /// [`RhiError::MissingPipelineLayout`] / [`RhiError::MissingRenderPass`]
    /// when a target is unset or null; [`RhiError::InvalidArgument`] for a
    /// zero static extent or a dynamic policy without viewport and scissor
    /// dynamic state.
    pub fn validate(&self) -> RhiResult<()> {
        match self.pipeline_layout {
            Some(layout) if layout != vk::PipelineLayout::null() => {}
            _ => return Err(RhiError::MissingPipelineLayout),
        }
        match self.render_pass {
            Some(pass) if pass != vk::RenderPass::null() => {}
            _ => return Err(RhiError::MissingRenderPass),
        }
        match self.viewport {
            ViewportPolicy::Static(extent) if extent.width == 0 || extent.height == 0 => {
                return Err(RhiError::InvalidArgument(format!(
                    "static viewport extent {}x{} is empty",
                    extent.width, extent.height
                )));
            }
            ViewportPolicy::Dynamic
                if !(self.dynamic_states.contains(&vk::DynamicState::VIEWPORT)
                    && self.dynamic_states.contains(&vk::DynamicState::SCISSOR)) =>
            {
                return Err(RhiError::InvalidArgument(
                    "dynamic viewport policy needs VIEWPORT and SCISSOR dynamic state".to_string(),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    fn viewport_and_scissor(&self) -> (vk::Viewport, vk::Rect2D) {
        let extent = match self.viewport {
            ViewportPolicy::Static(extent) => extent,
            // Ignored by the driver when the state is dynamic.
            ViewportPolicy::Dynamic => vk::Extent2D {
                width: 1,
                height: 1,
            },
        };
        (full_viewport(extent), full_scissor(extent))
    }
}

/// Viewport covering `extent` with depth range 0..1.
pub fn full_viewport(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

/// Scissor covering `extent`.
pub fn full_scissor(extent: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    }
}

/// An immutable graphics pipeline and the shader modules it was built from.
///
/// Must be dropped before its pipeline layout and render pass.
pub struct Pipeline {
    device: Arc<Device>,
    pipeline: vk::Pipeline,
    _vertex: Shader,
    _fragment: Shader,
}

impl Pipeline {
    /// Builds a pipeline from two SPIR-V files and a config.
    ///
    /// # Errors
    ///
    /// Contract errors from [`PipelineConfig::validate`] come first, then
    /// [`RhiError::ShaderLoad`] / [`RhiError::InvalidShaderCode`] for either
    /// file, then [`RhiError::PipelineCreation`] if the driver rejects the state.
    pub fn new(
        device: Arc<Device>,
        vertex_path: &Path,
        fragment_path: &Path,
        config: &PipelineConfig,
    ) -> RhiResult<Self> {
        config.validate()?;
        let (Some(layout), Some(render_pass)) = (config.pipeline_layout, config.render_pass) else {
            return Err(RhiError::MissingRenderPass);
        };

        let vertex = Shader::from_spirv_file(device.clone(), vertex_path, ShaderStage::Vertex)?;
        let fragment =
            Shader::from_spirv_file(device.clone(), fragment_path, ShaderStage::Fragment)?;

        let shader_stages = [vertex.stage_create_info(), fragment.stage_create_info()];

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&config.binding_descriptions)
            .vertex_attribute_descriptions(&config.attribute_descriptions);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(config.topology)
            .primitive_restart_enable(config.primitive_restart);

        let (viewport, scissor) = config.viewport_and_scissor();
        let viewports = [viewport];
        let scissors = [scissor];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(config.polygon_mode)
            .line_width(config.line_width)
            .cull_mode(config.cull_mode)
            .front_face(config.front_face)
            .depth_bias_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(config.rasterization_samples)
            .min_sample_shading(1.0);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(config.depth_test)
            .depth_write_enable(config.depth_write)
            .depth_compare_op(config.depth_compare_op)
            .depth_bounds_test_enable(false)
            .min_depth_bounds(0.0)
            .max_depth_bounds(1.0)
            .stencil_test_enable(false);

        let color_blend_attachments = [config.color_blend_attachment];
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .logic_op(vk::LogicOp::COPY)
            .attachments(&color_blend_attachments);

        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&config.dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(config.subpass)
            .base_pipeline_index(-1);

        let pipeline = unsafe {
            device
                .handle()
                .create_graphics_pipelines(
                    vk::PipelineCache::null(),
                    std::slice::from_ref(&pipeline_info),
                    None,
                )
                .map_err(|(_, result)| RhiError::PipelineCreation(result))?[0]
        };

        info!(
            "Graphics pipeline created ({:?} viewport)",
            config.viewport
        );

        Ok(Self {
            device,
            pipeline,
            _vertex: vertex,
            _fragment: fragment,
        })
    }

    /// Records a bind of this pipeline into `command_buffer`.
    pub fn bind(&self, command_buffer: &CommandBuffer) {
        command_buffer.bind_pipeline(vk::PipelineBindPoint::GRAPHICS, self.pipeline);
    }

    #[inline]
    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_pipeline(self.pipeline, None);
        }
        info!("Graphics pipeline destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn targeted(mut config: PipelineConfig) -> PipelineConfig {
        config.pipeline_layout = Some(vk::PipelineLayout::from_raw(1));
        config.render_pass = Some(vk::RenderPass::from_raw(2));
        config
    }

    #[test]
    fn test_default_config_baseline() {
        let config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
        assert_eq!(config.topology, vk::PrimitiveTopology::TRIANGLE_LIST);
        assert_eq!(config.polygon_mode, vk::PolygonMode::FILL);
        assert_eq!(config.cull_mode, vk::CullModeFlags::NONE);
        assert_eq!(config.front_face, vk::FrontFace::CLOCKWISE);
        assert_eq!(config.rasterization_samples, vk::SampleCountFlags::TYPE_1);
        assert_eq!(config.color_blend_attachment.blend_enable, vk::FALSE);
        assert_eq!(
            config.color_blend_attachment.color_write_mask,
            vk::ColorComponentFlags::RGBA
        );
        assert!(config.depth_test);
        assert!(config.depth_write);
        assert_eq!(config.depth_compare_op, vk::CompareOp::LESS);
        assert_eq!(config.subpass, 0);
        assert_eq!(config.binding_descriptions.len(), 1);
        assert_eq!(config.attribute_descriptions.len(), 4);
    }

    #[test]
    fn test_dynamic_policy_enables_viewport_and_scissor_state() {
        let config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
        assert_eq!(
            config.dynamic_states,
            vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR]
        );
    }

    #[test]
    fn test_static_policy_bakes_extent() {
        let extent = vk::Extent2D {
            width: 800,
            height: 600,
        };
        let config = PipelineConfig::default_config(ViewportPolicy::Static(extent));
        assert!(config.dynamic_states.is_empty());
        let (viewport, scissor) = config.viewport_and_scissor();
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!(viewport.max_depth, 1.0);
        assert_eq!(scissor.extent, extent);
    }

    #[test]
    fn test_validate_requires_layout() {
        let mut config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
        config.render_pass = Some(vk::RenderPass::from_raw(2));
        assert!(matches!(
            config.validate(),
            Err(RhiError::MissingPipelineLayout)
        ));
    }

    #[test]
    fn test_validate_rejects_null_render_pass() {
        let mut config = targeted(PipelineConfig::default_config(ViewportPolicy::Dynamic));
        config.render_pass = Some(vk::RenderPass::null());
        assert!(matches!(config.validate(), Err(RhiError::MissingRenderPass)));

        config.render_pass = None;
        assert!(matches!(config.validate(), Err(RhiError::MissingRenderPass)));
    }

    #[test]
    fn test_validate_rejects_empty_static_extent() {
        let config = targeted(PipelineConfig::default_config(ViewportPolicy::Static(
            vk::Extent2D {
                width: 0,
                height: 600,
            },
        )));
        assert!(matches!(
            config.validate(),
            Err(RhiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_dynamic_policy_needs_dynamic_state() {
        let mut config = targeted(PipelineConfig::default_config(ViewportPolicy::Dynamic));
        config.dynamic_states.retain(|s| *s != vk::DynamicState::SCISSOR);
        assert!(matches!(
            config.validate(),
            Err(RhiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = targeted(PipelineConfig::default_config(ViewportPolicy::Dynamic));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_scissor_covers_extent() {
        let extent = vk::Extent2D {
            width: 320,
            height: 200,
        };
        let scissor = full_scissor(extent);
        assert_eq!(scissor.offset.x, 0);
        assert_eq!(scissor.extent, extent);
    }
}
