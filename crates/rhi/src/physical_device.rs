//! Physical device (GPU) selection.
//!
//! A device is usable when it has a graphics queue family, a family that can
//! present to the window surface, the swapchain extension, and at least one
//! surface format and present mode. Among usable devices discrete GPUs win.

use std::ffi::CStr;

use ash::vk;
use tracing::{debug, info, warn};

use crate::error::{RhiError, RhiResult};
use crate::swapchain::SwapchainSupport;

/// Device extensions every selected GPU must expose.
pub const DEVICE_EXTENSIONS: &[&CStr] = &[ash::khr::swapchain::NAME];

/// Queue family indices needed for rendering and presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics_family: Option<u32>,
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// Both graphics and present families were found.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// Distinct family indices, graphics first.
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families = Vec::with_capacity(2);
        if let Some(graphics) = self.graphics_family {
            families.push(graphics);
        }
        if let Some(present) = self.present_family
            && !families.contains(&present)
        {
            families.push(present);
        }
        families
    }
}

/// Information about the selected physical device.
#[derive(Clone)]
pub struct PhysicalDeviceInfo {
    pub device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: QueueFamilyIndices,
}

impl PhysicalDeviceInfo {
    /// Returns the device name as a string.
    pub fn device_name(&self) -> &str {
        self.properties
            .device_name_as_c_str()
            .ok()
            .and_then(|name| name.to_str().ok())
            .unwrap_or("Unknown Device")
    }

    /// Total device-local memory in bytes.
    pub fn device_local_memory(&self) -> u64 {
        self.memory_properties
            .memory_heaps
            .iter()
            .take(self.memory_properties.memory_heap_count as usize)
            .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
            .map(|heap| heap.size)
            .sum()
    }
}

impl std::fmt::Debug for PhysicalDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalDeviceInfo")
            .field("name", &self.device_name())
            .field("type", &self.properties.device_type)
            .field("queue_families", &self.queue_families)
            .finish()
    }
}

/// Selects the most suitable physical device for rendering to `surface`.
///
/// # Errors
///
/// Returns [`RhiError::NoSuitableGpu`] if no enumerated GPU qualifies.
pub fn select_physical_device(
    instance: &ash::Instance,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> RhiResult<PhysicalDeviceInfo> {
    let devices = unsafe { instance.enumerate_physical_devices()? };
    info!("Found {} GPU(s)", devices.len());

    let best = devices
        .into_iter()
        .filter_map(|device| check_device_suitability(instance, device, surface, surface_loader))
        .map(|info| {
            let score = rate_device(
                info.properties.device_type,
                info.properties.limits.max_image_dimension2_d,
                info.device_local_memory(),
            );
            debug!("GPU '{}' score {}", info.device_name(), score);
            (info, score)
        })
        .max_by_key(|(_, score)| *score);

    match best {
        Some((info, score)) => {
            info!(
                "Selected GPU: '{}' ({:?}), score {}",
                info.device_name(),
                info.properties.device_type,
                score
            );
            Ok(info)
        }
        None => {
            warn!("No suitable GPU found with required capabilities");
            Err(RhiError::NoSuitableGpu)
        }
    }
}

fn check_device_suitability(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> Option<PhysicalDeviceInfo> {
    let properties = unsafe { instance.get_physical_device_properties(device) };
    let memory_properties = unsafe { instance.get_physical_device_memory_properties(device) };
    let name = properties
        .device_name_as_c_str()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let queue_families = find_queue_families(instance, device, surface, surface_loader);
    if !queue_families.is_complete() {
        debug!("GPU '{}' skipped: missing graphics or present queue", name);
        return None;
    }

    let extensions = unsafe { instance.enumerate_device_extension_properties(device) }.ok()?;
    let available: Vec<&CStr> = extensions
        .iter()
        .filter_map(|ext| ext.extension_name_as_c_str().ok())
        .collect();
    if let Some(missing) = missing_extension(&available, DEVICE_EXTENSIONS) {
        debug!("GPU '{}' skipped: missing extension {:?}", name, missing);
        return None;
    }

    let support = SwapchainSupport::query(surface_loader, device, surface).ok()?;
    if !support.is_adequate() {
        debug!("GPU '{}' skipped: no surface formats or present modes", name);
        return None;
    }

    Some(PhysicalDeviceInfo {
        device,
        properties,
        memory_properties,
        queue_families,
    })
}

fn find_queue_families(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
) -> QueueFamilyIndices {
    let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

    let mut indices = QueueFamilyIndices::default();
    for (i, family) in families.iter().enumerate() {
        let i = i as u32;
        if family.queue_count == 0 {
            continue;
        }

        let has_graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
        if has_graphics && indices.graphics_family.is_none() {
            indices.graphics_family = Some(i);
        }

        let present_support = unsafe {
            surface_loader
                .get_physical_device_surface_support(device, i, surface)
                .unwrap_or(false)
        };
        // Prefer a family that does both.
        if present_support
            && (indices.present_family.is_none() || indices.graphics_family == Some(i))
        {
            indices.present_family = Some(i);
        }

        if indices.is_complete() && indices.graphics_family == indices.present_family {
            break;
        }
    }
    indices
}

/// First required extension not present in `available`.
fn missing_extension<'a>(available: &[&CStr], required: &[&'a CStr]) -> Option<&'a CStr> {
    required
        .iter()
        .copied()
        .find(|req| !available.contains(req))
}

/// Higher is better. Device type dominates; image limits and VRAM break ties.
fn rate_device(device_type: vk::PhysicalDeviceType, max_image_dim: u32, local_memory: u64) -> u32 {
    let type_score = match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 100_000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 50_000,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 10_000,
        vk::PhysicalDeviceType::CPU => 100,
        _ => 1,
    };
    let vram_mb = (local_memory / (1024 * 1024)).min(16_000) as u32;
    type_score + max_image_dim.min(32_768) + vram_mb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_family_indices_default() {
        let indices = QueueFamilyIndices::default();
        assert!(!indices.is_complete());
        assert!(indices.unique_families().is_empty());
    }

    #[test]
    fn test_queue_family_indices_incomplete() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: None,
        };
        assert!(!indices.is_complete());
    }

    #[test]
    fn test_unique_families_shared() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(2),
            present_family: Some(2),
        };
        assert!(indices.is_complete());
        assert_eq!(indices.unique_families(), vec![2]);
    }

    #[test]
    fn test_unique_families_separate() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(1),
        };
        assert_eq!(indices.unique_families(), vec![0, 1]);
    }

    #[test]
    fn test_discrete_beats_integrated_with_more_memory() {
        let discrete = rate_device(vk::PhysicalDeviceType::DISCRETE_GPU, 16_384, 4 << 30);
        let integrated = rate_device(vk::PhysicalDeviceType::INTEGRATED_GPU, 32_768, 64 << 30);
        assert!(discrete > integrated);
    }

    #[test]
    fn test_missing_extension_reported() {
        let available = [ash::khr::maintenance1::NAME];
        assert_eq!(
            missing_extension(&available, DEVICE_EXTENSIONS),
            Some(ash::khr::swapchain::NAME)
        );
        let available = [ash::khr::swapchain::NAME];
        assert_eq!(missing_extension(&available, DEVICE_EXTENSIONS), None);
    }
}
