//! Swap chain: presentable images, their framebuffers, the render pass and
//! per-slot synchronization.
//!
//! # Frame protocol
//!
//! ```text
//! acquire_next_image()          waits on the slot fence, acquires an image
//! submit_command_buffers(..)    waits on the image's previous slot if needed,
//!                               submits gated on "image available"
//! present(..)                   presents gated on "render finished"
//! ```
//!
//! `OutOfDate` from acquire and `Suboptimal`/`OutOfDate` from present are
//! ordinary results, not errors. The caller reacts with [`SwapChain::recreate`].
//!
//! Slot bookkeeping lives in [`FramePacer`]; this type drives the real
//! fences and semaphores from it.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info, warn};

use crate::depth::DepthImage;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::frame_pacing::FramePacer;
use crate::instance::Instance;
use crate::render_pass::{AttachmentFormats, Framebuffer, RenderPass};
use crate::sync::{FENCE_TIMEOUT, FrameSync, map_wait_error, wait_for_fence};

/// What a surface supports for one physical device.
#[derive(Debug, Clone)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn query(
        surface_loader: &ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> RhiResult<Self> {
        let (capabilities, formats, present_modes) = unsafe {
            (
                surface_loader
                    .get_physical_device_surface_capabilities(physical_device, surface)?,
                surface_loader.get_physical_device_surface_formats(physical_device, surface)?,
                surface_loader
                    .get_physical_device_surface_present_modes(physical_device, surface)?,
            )
        };

        debug!(
            "Swapchain support: {} formats, {} present modes, image count {}-{}",
            formats.len(),
            present_modes.len(),
            capabilities.min_image_count,
            capabilities.max_image_count
        );

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// At least one surface format and one present mode.
    #[inline]
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Concrete parameters for one swap chain generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapchainSettings {
    pub surface_format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
}

impl SwapchainSettings {
    /// Picks settings from what the surface supports.
    ///
    /// `support` must be adequate (see [`SwapchainSupport::is_adequate`]).
    pub fn choose(
        support: &SwapchainSupport,
        window_extent: vk::Extent2D,
        preferred_present_mode: vk::PresentModeKHR,
    ) -> Self {
        Self {
            surface_format: choose_surface_format(&support.formats),
            present_mode: choose_present_mode(&support.present_modes, preferred_present_mode),
            extent: choose_extent(&support.capabilities, window_extent),
            image_count: determine_image_count(&support.capabilities),
        }
    }

    /// A zero-area swap chain cannot be created; rendering waits instead.
    #[inline]
    pub fn is_renderable(&self) -> bool {
        self.extent.width > 0 && self.extent.height > 0
    }
}

fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or_else(|| {
            warn!("Preferred surface format unavailable, using {:?}", formats[0].format);
            formats[0]
        })
}

fn choose_present_mode(
    present_modes: &[vk::PresentModeKHR],
    preferred: vk::PresentModeKHR,
) -> vk::PresentModeKHR {
    if present_modes.contains(&preferred) {
        preferred
    } else {
        debug!("{:?} unavailable, using FIFO", preferred);
        vk::PresentModeKHR::FIFO
    }
}

fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

fn determine_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let preferred = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        preferred.min(capabilities.max_image_count)
    } else {
        preferred
    }
}

/// Result of [`SwapChain::acquire_next_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acquired {
    Image { index: u32, suboptimal: bool },
    /// The surface changed; nothing was acquired and the slot did not advance.
    OutOfDate,
}

/// Result of [`SwapChain::present`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentStatus {
    Optimal,
    Suboptimal,
    OutOfDate,
}

impl PresentStatus {
    #[inline]
    pub fn needs_recreate(self) -> bool {
        !matches!(self, PresentStatus::Optimal)
    }
}

/// What [`SwapChain::recreate`] does, decided from surface support alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecreatePlan {
    /// Zero-area surface: nothing is waited on or torn down.
    Suspend,
    Rebuild {
        settings: SwapchainSettings,
        formats: AttachmentFormats,
        render_pass_rebuilt: bool,
    },
}

/// Decides how to rebuild a swap chain whose render pass targets `current`.
///
/// `depth_format` is the depth format the device would pick now.
///
/// # Errors
///
/// [`RhiError::Swapchain`] if the surface offers no formats or present modes.
pub fn plan_recreate(
    support: &SwapchainSupport,
    window_extent: vk::Extent2D,
    preferred_present_mode: vk::PresentModeKHR,
    current: AttachmentFormats,
    depth_format: vk::Format,
) -> RhiResult<RecreatePlan> {
    if !support.is_adequate() {
        return Err(RhiError::Swapchain(
            "surface offers no formats or present modes".to_string(),
        ));
    }
    let settings = SwapchainSettings::choose(support, window_extent, preferred_present_mode);
    if !settings.is_renderable() {
        return Ok(RecreatePlan::Suspend);
    }

    let formats = AttachmentFormats {
        color: settings.surface_format.format,
        depth: depth_format,
    };
    Ok(RecreatePlan::Rebuild {
        settings,
        formats,
        render_pass_rebuilt: current.requires_rebuild(&formats),
    })
}

/// Result of [`SwapChain::recreate`].
pub enum RecreateOutcome {
    /// The surface has zero area; nothing was torn down.
    Suspended,
    /// New images and framebuffers.
    ///
    /// When the render pass was replaced the old one is handed back. Pipelines
    /// built against it must be dropped or rebuilt before it is released.
    Recreated { retired_render_pass: Option<RenderPass> },
}

pub struct SwapChain {
    device: Arc<Device>,
    swapchain_loader: ash::khr::swapchain::Device,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    settings: SwapchainSettings,
    preferred_present_mode: vk::PresentModeKHR,
    render_pass: RenderPass,
    depth_images: Vec<DepthImage>,
    framebuffers: Vec<Framebuffer>,
    frames: Vec<FrameSync>,
    pacer: FramePacer,
    /// Slot whose fence guards the acquired image, when it is not the current slot.
    image_wait: Option<usize>,
}

impl SwapChain {
    /// # Errors
    ///
    /// [`RhiError::Swapchain`] if the surface offers nothing usable or
    /// currently has zero area; Vulkan/allocation errors otherwise.
    pub fn new(
        instance: &Instance,
        device: Arc<Device>,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        window_extent: vk::Extent2D,
        preferred_present_mode: vk::PresentModeKHR,
    ) -> RhiResult<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(instance.handle(), device.handle());

        let support = SwapchainSupport::query(surface_loader, device.physical_device(), surface)?;
        if !support.is_adequate() {
            return Err(RhiError::Swapchain(
                "surface offers no formats or present modes".to_string(),
            ));
        }
        let settings = SwapchainSettings::choose(&support, window_extent, preferred_present_mode);
        if !settings.is_renderable() {
            return Err(RhiError::Swapchain("surface has zero area".to_string()));
        }

        let formats = AttachmentFormats {
            color: settings.surface_format.format,
            depth: device.find_depth_format()?,
        };
        let render_pass = RenderPass::new(device.clone(), formats)?;
        let frames = FrameSync::for_frames_in_flight(&device)?;

        let (swapchain, images, image_views) = create_swapchain(
            &device,
            &swapchain_loader,
            surface,
            &support,
            &settings,
            vk::SwapchainKHR::null(),
        )?;
        let pacer = FramePacer::new(images.len());

        // Owned by `Self` from here on, so Drop cleans up if attachments fail.

        let mut swap_chain = Self {
            device,
            swapchain_loader,
            surface_loader: surface_loader.clone(),
            surface,
            swapchain,
            images,
            image_views,
            settings,
            preferred_present_mode,
            render_pass,
            depth_images: Vec::new(),
            framebuffers: Vec::new(),
            frames,
            pacer,
            image_wait: None,
        };
        swap_chain.create_attachments()?;

        info!(
            "Swap chain created: {}x{}, {:?}, {:?}, {} images",
            settings.extent.width,
            settings.extent.height,
            settings.surface_format.format,
            settings.present_mode,
            swap_chain.images.len()
        );

        Ok(swap_chain)
    }

    fn create_attachments(&mut self) -> RhiResult<()> {
        let depth_format = self.render_pass.formats().depth;
        for &view in &self.image_views {
            let depth = DepthImage::new(self.device.clone(), self.settings.extent, depth_format)?;
            let framebuffer =
                self.render_pass
                    .create_framebuffer(view, depth.view(), self.settings.extent)?;
            self.depth_images.push(depth);
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    fn destroy_attachments(&mut self) {
        self.framebuffers.clear();
        self.depth_images.clear();
        for &view in &self.image_views {
            unsafe { self.device.handle().destroy_image_view(view, None) };
        }
        self.image_views.clear();
    }

    /// Waits for the current slot's fence when it still guards submitted
    /// work, then acquires the next image.
    ///
    /// # Errors
    ///
    /// [`RhiError::DeviceLost`] if a wait times out.
    pub fn acquire_next_image(&mut self) -> RhiResult<Acquired> {
        let start = self.pacer.begin_acquire();
        let frame = &self.frames[start.slot];

        if start.wait_on_fence {
            if let Err(e) = frame.in_flight_fence().wait(FENCE_TIMEOUT) {
                self.pacer.abandon();
                return Err(e);
            }
            self.pacer.fence_waited();
        }

        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                FENCE_TIMEOUT,
                frame.image_available_semaphore().handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((index, suboptimal)) => {
                self.image_wait = self.pacer.image_acquired(index);
                self.pacer.begin_recording();
                Ok(Acquired::Image { index, suboptimal })
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                debug!("Acquire reported out-of-date swap chain");
                self.pacer.abandon();
                Ok(Acquired::OutOfDate)
            }
            Err(e) => {
                self.pacer.abandon();
                Err(map_wait_error(e))
            }
        }
    }

    /// Submits recorded command buffers that render into `image_index`.
    ///
    /// # Safety-relevant ordering
    ///
    /// If the image was last rendered by another slot, that slot's fence is
    /// waited on first. The current slot's fence is reset immediately before
    /// submission and signaled when the GPU finishes.
    pub fn submit_command_buffers(
        &mut self,
        command_buffers: &[vk::CommandBuffer],
        image_index: u32,
    ) -> RhiResult<()> {
        assert_eq!(
            self.pacer.current_image(),
            Some(image_index),
            "submitting for an image that was not acquired"
        );

        if let Some(owner) = self.image_wait.take() {
            wait_for_fence(
                &self.device,
                self.frames[owner].in_flight_fence().handle(),
                FENCE_TIMEOUT,
            )?;
        }

        let frame = &self.frames[self.pacer.current_frame()];
        let wait_semaphores = [frame.image_available_semaphore().handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [frame.render_finished_semaphore().handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(command_buffers)
            .signal_semaphores(&signal_semaphores);

        frame.in_flight_fence().reset()?;
        unsafe {
            self.device.submit_graphics(
                std::slice::from_ref(&submit_info),
                frame.in_flight_fence().handle(),
            )?;
        }

        self.pacer.submitted();
        Ok(())
    }

    /// Presents `image_index` and completes the frame, advancing the slot.
    pub fn present(&mut self, image_index: u32) -> RhiResult<PresentStatus> {
        let frame = &self.frames[self.pacer.current_frame()];
        let wait_semaphores = [frame.render_finished_semaphore().handle()];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.device.present_queue(), &present_info)
        };
        self.pacer.presented();

        match result {
            Ok(false) => Ok(PresentStatus::Optimal),
            Ok(true) => Ok(PresentStatus::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentStatus::OutOfDate),
            Err(e) => Err(e.into()),
        }
    }

    /// Rebuilds images and framebuffers for `window_extent`, reusing the old
    /// swap chain as `old_swapchain`. The render pass is kept unless the
    /// colour or depth format changed (see [`plan_recreate`]).
    ///
    /// A zero-area surface returns [`RecreateOutcome::Suspended`] and leaves
    /// the current swap chain untouched.
    ///
    /// # Errors
    ///
    /// [`RhiError::Swapchain`] if the surface no longer offers any format or
    /// present mode; Vulkan/allocation errors otherwise.
    pub fn recreate(&mut self, window_extent: vk::Extent2D) -> RhiResult<RecreateOutcome> {
        let support = SwapchainSupport::query(
            &self.surface_loader,
            self.device.physical_device(),
            self.surface,
        )?;
        let plan = plan_recreate(
            &support,
            window_extent,
            self.preferred_present_mode,
            self.render_pass.formats(),
            self.device.find_depth_format()?,
        )?;
        let RecreatePlan::Rebuild {
            settings,
            formats,
            render_pass_rebuilt,
        } = plan
        else {
            debug!("Swap chain recreation suspended: zero-area surface");
            return Ok(RecreateOutcome::Suspended);
        };

        self.device.wait_idle()?;

        let (swapchain, images, image_views) = create_swapchain(
            &self.device,
            &self.swapchain_loader,
            self.surface,
            &support,
            &settings,
            self.swapchain,
        )?;

        self.destroy_attachments();
        unsafe {
            self.swapchain_loader
                .destroy_swapchain(self.swapchain, None);
        }
        self.swapchain = swapchain;
        self.images = images;
        self.image_views = image_views;
        self.settings = settings;

        let retired_render_pass = if render_pass_rebuilt {
            info!("Swap chain format changed, rebuilding render pass");
            let next = RenderPass::new(self.device.clone(), formats)?;
            Some(std::mem::replace(&mut self.render_pass, next))
        } else {
            None
        };
        self.create_attachments()?;

        self.pacer.reset_images(self.images.len());
        self.image_wait = None;

        info!(
            "Swap chain recreated after {} frames: {}x{}, {} images",
            self.pacer.frames_completed(),
            settings.extent.width,
            settings.extent.height,
            self.images.len()
        );

        Ok(RecreateOutcome::Recreated {
            retired_render_pass,
        })
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.handle()
    }

    #[inline]
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize].handle()
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.settings.extent
    }

    #[inline]
    pub fn settings(&self) -> &SwapchainSettings {
        &self.settings
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Frame slot the next or current frame uses.
    #[inline]
    pub fn current_frame(&self) -> usize {
        self.pacer.current_frame()
    }

    #[inline]
    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Width over height of the current extent.
    pub fn extent_aspect_ratio(&self) -> f32 {
        self.settings.extent.width as f32 / self.settings.extent.height as f32
    }
}

impl Drop for SwapChain {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle before swap chain teardown: {:?}", e);
        }
        self.destroy_attachments();
        unsafe {
            self.swapchain_loader
                .destroy_swapchain(self.swapchain, None);
        }
        info!("Swap chain destroyed after {} frames", self.pacer.frames_completed());
    }
}

fn create_swapchain(
    device: &Device,
    loader: &ash::khr::swapchain::Device,
    surface: vk::SurfaceKHR,
    support: &SwapchainSupport,
    settings: &SwapchainSettings,
    old_swapchain: vk::SwapchainKHR,
) -> RhiResult<(vk::SwapchainKHR, Vec<vk::Image>, Vec<vk::ImageView>)> {
    let families = device.queue_families().unique_families();
    let (sharing_mode, family_indices) = if families.len() > 1 {
        (vk::SharingMode::CONCURRENT, families.as_slice())
    } else {
        (vk::SharingMode::EXCLUSIVE, &[][..])
    };

    let create_info = vk::SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(settings.image_count)
        .image_format(settings.surface_format.format)
        .image_color_space(settings.surface_format.color_space)
        .image_extent(settings.extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(sharing_mode)
        .queue_family_indices(family_indices)
        .pre_transform(support.capabilities.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(settings.present_mode)
        .clipped(true)
        .old_swapchain(old_swapchain);

    let swapchain = unsafe { loader.create_swapchain(&create_info, None)? };

    let images = match unsafe { loader.get_swapchain_images(swapchain) } {
        Ok(images) => images,
        Err(e) => {
            unsafe { loader.destroy_swapchain(swapchain, None) };
            return Err(e.into());
        }
    };

    match create_image_views(device, &images, settings.surface_format.format) {
        Ok(views) => Ok((swapchain, images, views)),
        Err(e) => {
            unsafe { loader.destroy_swapchain(swapchain, None) };
            Err(e)
        }
    }
}

fn create_image_views(
    device: &Device,
    images: &[vk::Image],
    format: vk::Format,
) -> RhiResult<Vec<vk::ImageView>> {
    let mut views = Vec::with_capacity(images.len());

    for (i, &image) in images.iter().enumerate() {
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .level_count(1)
                    .layer_count(1),
            );

        match unsafe { device.handle().create_image_view(&create_info, None) } {
            Ok(view) => views.push(view),
            Err(e) => {
                for view in views {
                    unsafe { device.handle().destroy_image_view(view, None) };
                }
                return Err(RhiError::Swapchain(format!(
                    "failed to create image view {}: {:?}",
                    i, e
                )));
            }
        }
    }

    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }
    }

    fn support(current: vk::Extent2D) -> SwapchainSupport {
        SwapchainSupport {
            capabilities: vk::SurfaceCapabilitiesKHR {
                current_extent: current,
                min_image_extent: vk::Extent2D {
                    width: 100,
                    height: 100,
                },
                max_image_extent: vk::Extent2D {
                    width: 2000,
                    height: 2000,
                },
                min_image_count: 2,
                max_image_count: 8,
                ..Default::default()
            },
            formats: vec![format(vk::Format::B8G8R8A8_UNORM), format(vk::Format::B8G8R8A8_SRGB)],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
        }
    }

    const UNDEFINED_EXTENT: vk::Extent2D = vk::Extent2D {
        width: u32::MAX,
        height: u32::MAX,
    };

    #[test]
    fn test_choose_surface_format_prefers_srgb() {
        let selected = choose_surface_format(&support(UNDEFINED_EXTENT).formats);
        assert_eq!(selected.format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn test_choose_surface_format_falls_back_to_first() {
        let formats = [format(vk::Format::R8G8B8A8_UNORM), format(vk::Format::B8G8R8A8_UNORM)];
        assert_eq!(
            choose_surface_format(&formats).format,
            vk::Format::R8G8B8A8_UNORM
        );
    }

    #[test]
    fn test_choose_present_mode_honours_preference() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::IMMEDIATE),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn test_choose_extent_uses_current() {
        let current = vk::Extent2D {
            width: 1920,
            height: 1080,
        };
        let caps = support(current).capabilities;
        assert_eq!(
            choose_extent(&caps, vk::Extent2D { width: 800, height: 600 }),
            current
        );
    }

    #[test]
    fn test_choose_extent_clamps_to_limits() {
        let caps = support(UNDEFINED_EXTENT).capabilities;
        let clamp = |width, height| choose_extent(&caps, vk::Extent2D { width, height });
        assert_eq!(clamp(3000, 3000), vk::Extent2D { width: 2000, height: 2000 });
        assert_eq!(clamp(50, 50), vk::Extent2D { width: 100, height: 100 });
        assert_eq!(clamp(800, 600), vk::Extent2D { width: 800, height: 600 });
    }

    #[test]
    fn test_determine_image_count() {
        let caps = |min, max| vk::SurfaceCapabilitiesKHR {
            min_image_count: min,
            max_image_count: max,
            ..Default::default()
        };
        assert_eq!(determine_image_count(&caps(2, 3)), 3);
        assert_eq!(determine_image_count(&caps(2, 2)), 2);
        assert_eq!(determine_image_count(&caps(2, 0)), 3);
    }

    #[test]
    fn test_support_adequacy() {
        let mut s = support(UNDEFINED_EXTENT);
        assert!(s.is_adequate());
        s.present_modes.clear();
        assert!(!s.is_adequate());
    }

    #[test]
    fn test_zero_extent_settings_not_renderable() {
        let zero = vk::Extent2D {
            width: 0,
            height: 0,
        };
        let settings = SwapchainSettings::choose(&support(zero), zero, vk::PresentModeKHR::FIFO);
        assert!(!settings.is_renderable());
    }

    #[test]
    fn test_present_status_recreate_signal() {
        assert!(!PresentStatus::Optimal.needs_recreate());
        assert!(PresentStatus::Suboptimal.needs_recreate());
        assert!(PresentStatus::OutOfDate.needs_recreate());
    }
}
