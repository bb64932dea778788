//! Frame orchestration on top of the swap chain.
//!
//! [`Renderer`] owns the swap chain and one command buffer per frame slot.
//! A frame is `begin_frame` → `begin_swap_chain_render_pass` → draw calls
//! → `end_swap_chain_render_pass` → `end_frame`. Any step that finds the
//! swap chain stale schedules a rebuild for the next frame instead of
//! failing.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info};

use vkframe_core::PresentModePreference;
use vkframe_rhi::command::{CommandBuffer, CommandPool};
use vkframe_rhi::device::Device;
use vkframe_rhi::pipeline::{full_scissor, full_viewport};
use vkframe_rhi::render_pass::RenderPass;
use vkframe_rhi::swapchain::{Acquired, RecreateOutcome, SwapChain};
use vkframe_rhi::sync::MAX_FRAMES_IN_FLIGHT;

use crate::context::RenderContext;
use crate::error::RendererResult;
use crate::resize::{ResizeAction, ResizeTracker};

/// Maps the configured preference to a Vulkan present mode.
pub fn present_mode_for(preference: PresentModePreference) -> vk::PresentModeKHR {
    match preference {
        PresentModePreference::Fifo => vk::PresentModeKHR::FIFO,
        PresentModePreference::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentModePreference::Immediate => vk::PresentModeKHR::IMMEDIATE,
    }
}

/// Drives acquire, record, submit and present for every frame.
///
/// # Resource Destruction Order
///
/// Dropping waits for the device to go idle. Fields then drop top to
/// bottom: command buffers, their pool, a retired render pass, then the
/// swap chain. The [`RenderContext`] it was built from must outlive it, and
/// pipelines built against [`Renderer::render_pass`] must be dropped first.
pub struct Renderer {
    command_buffers: Vec<CommandBuffer>,
    command_pool: CommandPool,
    /// Replaced by the last recreation; released in `end_frame`.
    retired_render_pass: Option<RenderPass>,
    swap_chain: SwapChain,
    device: Arc<Device>,
    resize: ResizeTracker,
    clear_color: [f32; 4],
    /// Image acquired by the frame in progress.
    current_image: Option<u32>,
    render_pass_epoch: u64,
}

impl Renderer {
    /// # Errors
    ///
    /// Fails if the swap chain, its attachments or the command buffers cannot
    /// be created. `window_extent` must not be empty.
    pub fn new(
        context: &RenderContext,
        window_extent: vk::Extent2D,
        present_mode: vk::PresentModeKHR,
        clear_color: [f32; 4],
    ) -> RendererResult<Self> {
        let device = context.device().clone();
        let swap_chain = SwapChain::new(
            context.instance(),
            device.clone(),
            context.surface().handle(),
            context.surface().loader(),
            window_extent,
            present_mode,
        )?;

        let command_pool = CommandPool::for_graphics(device.clone())?;
        let command_buffers = command_pool.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;

        info!(
            "Renderer initialized: {} swap chain images, {} frames in flight",
            swap_chain.image_count(),
            MAX_FRAMES_IN_FLIGHT
        );

        Ok(Self {
            command_buffers,
            command_pool,
            retired_render_pass: None,
            swap_chain,
            device,
            resize: ResizeTracker::new(),
            clear_color,
            current_image: None,
            render_pass_epoch: 0,
        })
    }

    /// Window resized; the swap chain is rebuilt before the next acquire.
    pub fn notify_resized(&mut self) {
        self.resize.mark_resized();
    }

    /// Starts a frame and returns the slot's command buffer, already begun.
    ///
    /// Returns `None` when there is nothing to draw into: the window has no
    /// area, or the swap chain went out of date while acquiring. The caller
    /// just skips the frame.
    ///
    /// If this call replaced the render pass, [`Renderer::render_pass_epoch`]
    /// has moved on. Pipelines built against the old pass must be rebuilt
    /// before [`Renderer::end_frame`], which releases it.
    ///
    /// # Panics
    ///
    /// Panics if the previous frame was not ended.
    pub fn begin_frame(
        &mut self,
        window_extent: vk::Extent2D,
    ) -> RendererResult<Option<CommandBuffer>> {
        assert!(
            self.current_image.is_none(),
            "begin_frame called while a frame is in progress"
        );

        match self.resize.decide(window_extent) {
            ResizeAction::Suspend => return Ok(None),
            ResizeAction::Recreate(extent) => {
                if !self.recreate_swap_chain(extent)? {
                    return Ok(None);
                }
            }
            ResizeAction::Render => {}
        }

        let index = match self.swap_chain.acquire_next_image()? {
            Acquired::Image { index, suboptimal } => {
                if suboptimal {
                    self.resize.mark_resized();
                }
                index
            }
            Acquired::OutOfDate => {
                self.resize.mark_resized();
                return Ok(None);
            }
        };
        self.current_image = Some(index);

        let command_buffer = self.command_buffers[self.swap_chain.current_frame()].clone();
        command_buffer.begin()?;
        Ok(Some(command_buffer))
    }

    /// Ends recording, submits and presents the frame.
    ///
    /// A suboptimal or out-of-date present schedules recreation.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn end_frame(&mut self) -> RendererResult<()> {
        let image_index = self
            .current_image
            .take()
            .expect("end_frame called without begin_frame");

        if self.retired_render_pass.take().is_some() {
            debug!("Released the render pass replaced by recreation");
        }

        let command_buffer = &self.command_buffers[self.swap_chain.current_frame()];
        command_buffer.end()?;
        self.swap_chain
            .submit_command_buffers(&[command_buffer.handle()], image_index)?;

        let status = self.swap_chain.present(image_index)?;
        if status.needs_recreate() {
            debug!("Present reported {:?}, scheduling swap chain rebuild", status);
            self.resize.mark_resized();
        }
        Ok(())
    }

    /// Begins the swap chain render pass on `command_buffer` and sets the
    /// dynamic viewport and scissor to the full extent.
    pub fn begin_swap_chain_render_pass(&self, command_buffer: &CommandBuffer) {
        let image_index = self
            .current_image
            .expect("render pass begun outside a frame");
        assert_eq!(
            command_buffer.handle(),
            self.command_buffers[self.swap_chain.current_frame()].handle(),
            "render pass begun on another frame's command buffer"
        );

        let extent = self.swap_chain.extent();
        command_buffer.begin_render_pass(
            self.swap_chain.render_pass(),
            self.swap_chain.framebuffer(image_index),
            extent,
            self.clear_color,
        );
        command_buffer.set_viewport(&full_viewport(extent));
        command_buffer.set_scissor(&full_scissor(extent));
    }

    pub fn end_swap_chain_render_pass(&self, command_buffer: &CommandBuffer) {
        assert!(
            self.current_image.is_some(),
            "render pass ended outside a frame"
        );
        command_buffer.end_render_pass();
    }

    /// Returns false if the surface has no area yet.
    fn recreate_swap_chain(&mut self, extent: vk::Extent2D) -> RendererResult<bool> {
        match self.swap_chain.recreate(extent)? {
            RecreateOutcome::Suspended => {
                self.resize.mark_resized();
                Ok(false)
            }
            RecreateOutcome::Recreated {
                retired_render_pass,
            } => {
                if let Some(retired) = retired_render_pass {
                    // Pipelines still target the oldest retired pass; a pass
                    // replaced before any frame was recorded has no users.
                    if self.retired_render_pass.is_none() {
                        self.retired_render_pass = Some(retired);
                    }
                    self.render_pass_epoch += 1;
                    // Recorded against the old render pass; start from fresh buffers.
                    let stale = std::mem::take(&mut self.command_buffers);
                    self.command_pool.free_command_buffers(stale);
                    self.command_buffers = self
                        .command_pool
                        .allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;
                }
                Ok(true)
            }
        }
    }

    /// Frame slot of the current or next frame, in `0..MAX_FRAMES_IN_FLIGHT`.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.swap_chain.current_frame()
    }

    #[inline]
    pub fn is_frame_in_progress(&self) -> bool {
        self.current_image.is_some()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.swap_chain.extent_aspect_ratio()
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.swap_chain.extent()
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.swap_chain.render_pass()
    }

    /// Bumped whenever recreation replaces the render pass; pipelines built
    /// against an older epoch must be rebuilt.
    #[inline]
    pub fn render_pass_epoch(&self) -> u64 {
        self.render_pass_epoch
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    /// Pool for one-off transfer work such as model uploads.
    #[inline]
    pub fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle during renderer drop: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_mode_mapping() {
        assert_eq!(
            present_mode_for(PresentModePreference::Fifo),
            vk::PresentModeKHR::FIFO
        );
        assert_eq!(
            present_mode_for(PresentModePreference::default()),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            present_mode_for(PresentModePreference::Immediate),
            vk::PresentModeKHR::IMMEDIATE
        );
    }
}
