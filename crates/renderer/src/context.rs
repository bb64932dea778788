//! Instance, surface and device for one window.

use std::sync::Arc;

use tracing::{error, info};

use vkframe_platform::{Surface, Window, get_required_extensions};
use vkframe_rhi::device::Device;
use vkframe_rhi::instance::Instance;
use vkframe_rhi::physical_device::select_physical_device;

use crate::error::RendererResult;

/// Device bootstrap for a window.
///
/// Fields drop top to bottom: device, then surface, then instance. Every
/// object created from the device must be gone before this is dropped.
pub struct RenderContext {
    device: Arc<Device>,
    surface: Surface,
    instance: Instance,
}

impl RenderContext {
    /// # Errors
    ///
    /// Fails if Vulkan cannot be loaded, the surface cannot be created, or
    /// no GPU can render and present to it.
    pub fn new(window: &Window, enable_validation: bool) -> RendererResult<Self> {
        let extensions = get_required_extensions(window.raw_display_handle()?)?;
        let instance = Instance::new(enable_validation, &extensions)?;
        let surface = window.create_surface(instance.entry(), instance.handle())?;

        let physical_device =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        info!("Selected GPU: {}", physical_device.device_name());
        let device = Device::new(&instance, &physical_device)?;

        Ok(Self {
            device,
            surface,
            instance,
        })
    }

    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            error!("Failed to wait for device idle: {:?}", e);
        }
        let holders = Arc::strong_count(&self.device);
        if holders > 1 {
            error!(
                "Render context dropped while {} other device handle(s) are alive",
                holders - 1
            );
        }
    }
}
