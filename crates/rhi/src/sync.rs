//! Semaphores, fences and the per-slot synchronization set.
//!
//! - [`Semaphore`] orders queue operations on the GPU and is never observed
//!   by the host.
//! - [`Fence`] lets the host wait for submitted work. A wait that times out
//!   is reported as [`RhiError::DeviceLost`] rather than retried.
//! - [`FrameSync`] groups the three objects one frame slot needs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vkframe_rhi::device::Device;
//! use vkframe_rhi::sync::{FrameSync, FENCE_TIMEOUT};
//!
//! # fn example(device: Arc<Device>) -> vkframe_rhi::RhiResult<()> {
//! let slot = FrameSync::new(device)?;
//! slot.in_flight_fence().wait(FENCE_TIMEOUT)?;
//! slot.in_flight_fence().reset()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, error};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Number of frames the CPU may record ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Timeout for fence waits and image acquisition, in nanoseconds.
pub const FENCE_TIMEOUT: u64 = u64::MAX;

/// Maps the result of a host-side wait.
///
/// `TIMEOUT` and `ERROR_DEVICE_LOST` both mean the GPU stopped making progress.
pub(crate) fn map_wait_error(result: vk::Result) -> RhiError {
    match result {
        vk::Result::TIMEOUT | vk::Result::ERROR_DEVICE_LOST => {
            error!("GPU wait failed: {:?}", result);
            RhiError::DeviceLost
        }
        other => RhiError::Vulkan(other),
    }
}

/// GPU-to-GPU ordering signal.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Creates an unsignaled binary semaphore.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };

        debug!("Created semaphore");

        Ok(Self { device, semaphore })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
        debug!("Destroyed semaphore");
    }
}

/// GPU-to-CPU completion signal.
pub struct Fence {
    device: Arc<Device>,
    fence: vk::Fence,
}

impl Fence {
    /// Creates a fence, optionally already signaled so the first wait on it
    /// returns immediately.
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };

        let create_info = vk::FenceCreateInfo::default().flags(flags);
        let fence = unsafe { device.handle().create_fence(&create_info, None)? };

        debug!(
            "Created fence ({})",
            if signaled { "signaled" } else { "unsignaled" }
        );

        Ok(Self { device, fence })
    }

    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Blocks until the fence is signaled.
    ///
    /// # Errors
    ///
    /// [`RhiError::DeviceLost`] if `timeout` (nanoseconds) elapses first.
    pub fn wait(&self, timeout: u64) -> RhiResult<()> {
        wait_for_fence(&self.device, self.fence, timeout)
    }

    /// Returns the fence to the unsignaled state. It must not be pending on a queue.
    pub fn reset(&self) -> RhiResult<()> {
        unsafe { self.device.handle().reset_fences(&[self.fence])? };
        Ok(())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_fence(self.fence, None);
        }
        debug!("Destroyed fence");
    }
}

/// Waits on a raw fence handle owned elsewhere, such as another slot's fence.
pub fn wait_for_fence(device: &Device, fence: vk::Fence, timeout: u64) -> RhiResult<()> {
    unsafe {
        device
            .handle()
            .wait_for_fences(&[fence], true, timeout)
            .map_err(map_wait_error)
    }
}

/// Synchronization objects owned by one frame slot.
///
/// ```text
/// wait(in_flight) -> acquire (signals image_available)
///   -> submit (waits image_available, signals render_finished + in_flight)
///   -> present (waits render_finished)
/// ```
pub struct FrameSync {
    image_available: Semaphore,
    render_finished: Semaphore,
    in_flight: Fence,
}

impl FrameSync {
    /// The in-flight fence starts signaled so the slot's first wait does not block.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        Ok(Self {
            image_available: Semaphore::new(device.clone())?,
            render_finished: Semaphore::new(device.clone())?,
            in_flight: Fence::new(device, true)?,
        })
    }

    /// One set per frame slot.
    pub fn for_frames_in_flight(device: &Arc<Device>) -> RhiResult<Vec<Self>> {
        (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| Self::new(device.clone()))
            .collect()
    }

    #[inline]
    pub fn image_available_semaphore(&self) -> &Semaphore {
        &self.image_available
    }

    #[inline]
    pub fn render_finished_semaphore(&self) -> &Semaphore {
        &self.render_finished
    }

    #[inline]
    pub fn in_flight_fence(&self) -> &Fence {
        &self.in_flight
    }
}
