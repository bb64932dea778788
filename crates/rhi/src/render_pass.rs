//! The swap-chain render pass and its framebuffers.
//!
//! Attachment 0 is the presentable colour image (cleared, stored, left in
//! `PRESENT_SRC_KHR`); attachment 1 is depth (cleared, not stored). A single
//! subpass writes both, with an external dependency that orders the first
//! colour write and depth test after the previous use of the attachments.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// Formats that decide whether an existing render pass is still compatible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttachmentFormats {
    pub color: vk::Format,
    pub depth: vk::Format,
}

impl AttachmentFormats {
    /// Whether a render pass built for `self` must be rebuilt to target `next`.
    #[inline]
    pub fn requires_rebuild(&self, next: &AttachmentFormats) -> bool {
        self != next
    }
}

pub struct RenderPass {
    device: Arc<Device>,
    render_pass: vk::RenderPass,
    formats: AttachmentFormats,
}

impl RenderPass {
    pub fn new(device: Arc<Device>, formats: AttachmentFormats) -> RhiResult<Self> {
        let attachments = [
            vk::AttachmentDescription::default()
                .format(formats.color)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
            vk::AttachmentDescription::default()
                .format(formats.depth)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::DONT_CARE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
        ];

        let color_ref = vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        let depth_ref = vk::AttachmentReference::default()
            .attachment(1)
            .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

        let subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(std::slice::from_ref(&color_ref))
            .depth_stencil_attachment(&depth_ref);

        let stages = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
            | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS;
        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(stages)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(stages)
            .dst_access_mask(
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            );

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(std::slice::from_ref(&dependency));

        let render_pass = unsafe { device.handle().create_render_pass(&create_info, None)? };

        debug!(
            "Created render pass (color {:?}, depth {:?})",
            formats.color, formats.depth
        );

        Ok(Self {
            device,
            render_pass,
            formats,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::RenderPass {
        self.render_pass
    }

    #[inline]
    pub fn formats(&self) -> AttachmentFormats {
        self.formats
    }

    /// Framebuffer binding `color` and `depth` to this pass.
    pub fn create_framebuffer(
        &self,
        color: vk::ImageView,
        depth: vk::ImageView,
        extent: vk::Extent2D,
    ) -> RhiResult<Framebuffer> {
        let attachments = [color, depth];
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(self.render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe { self.device.handle().create_framebuffer(&create_info, None)? };

        Ok(Framebuffer {
            device: self.device.clone(),
            framebuffer,
        })
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_render_pass(self.render_pass, None);
        }
        debug!("Destroyed render pass");
    }
}

pub struct Framebuffer {
    device: Arc<Device>,
    framebuffer: vk::Framebuffer,
}

impl Framebuffer {
    #[inline]
    pub fn handle(&self) -> vk::Framebuffer {
        self.framebuffer
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_framebuffer(self.framebuffer, None);
        }
    }
}
