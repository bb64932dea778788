//! Descriptor set layouts, pools and writers.
//!
//! Layouts and pools are built with builders that accumulate declarations
//! and validate them once in `build()`. A [`DescriptorWriter`] collects
//! buffer/image bindings for one layout, then allocates a set from a pool and
//! fills it in a single step.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ash::vk;
//! use vkframe_rhi::device::Device;
//! use vkframe_rhi::descriptor::{DescriptorPoolBuilder, DescriptorSetLayoutBuilder, DescriptorWriter};
//!
//! # fn example(device: Arc<Device>, ubo: vk::DescriptorBufferInfo) -> vkframe_rhi::RhiResult<()> {
//! let layout = DescriptorSetLayoutBuilder::new(device.clone())
//!     .add_binding(0, vk::DescriptorType::UNIFORM_BUFFER, vk::ShaderStageFlags::VERTEX, 1)
//!     .build()?;
//! let mut pool = DescriptorPoolBuilder::new(device)
//!     .set_max_sets(2)
//!     .add_pool_size(vk::DescriptorType::UNIFORM_BUFFER, 2)
//!     .build()?;
//! let set = DescriptorWriter::new(&layout, &mut pool)
//!     .write_buffer(0, ubo)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Rejects a binding list that declares the same slot twice.
pub fn check_unique_bindings(
    bindings: impl IntoIterator<Item = u32>,
) -> RhiResult<()> {
    let mut seen = std::collections::HashSet::new();
    for slot in bindings {
        if !seen.insert(slot) {
            return Err(RhiError::DuplicateBinding(slot));
        }
    }
    Ok(())
}

/// Accumulates binding declarations for a [`DescriptorSetLayout`].
pub struct DescriptorSetLayoutBuilder {
    device: Arc<Device>,
    bindings: Vec<vk::DescriptorSetLayoutBinding<'static>>,
}

impl DescriptorSetLayoutBuilder {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            bindings: Vec::new(),
        }
    }

    /// Declares `slot` as `count` descriptors of `descriptor_type` visible to `stages`.
    ///
    /// Duplicates are reported by [`build`](Self::build).
    pub fn add_binding(
        mut self,
        slot: u32,
        descriptor_type: vk::DescriptorType,
        stages: vk::ShaderStageFlags,
        count: u32,
    ) -> Self {
        self.bindings.push(
            vk::DescriptorSetLayoutBinding::default()
                .binding(slot)
                .descriptor_type(descriptor_type)
                .descriptor_count(count)
                .stage_flags(stages),
        );
        self
    }

    /// Creates the layout.
    ///
    /// # Errors
    ///
    /// [`RhiError::DuplicateBinding`] if a slot was declared twice, before any
    /// device call; otherwise any Vulkan error from layout creation.
    pub fn build(self) -> RhiResult<DescriptorSetLayout> {
        check_unique_bindings(self.bindings.iter().map(|b| b.binding))?;
        DescriptorSetLayout::new(self.device, self.bindings)
    }
}

/// Immutable descriptor set layout and the bindings it was built from.
pub struct DescriptorSetLayout {
    device: Arc<Device>,
    layout: vk::DescriptorSetLayout,
    bindings: BTreeMap<u32, vk::DescriptorSetLayoutBinding<'static>>,
}

impl DescriptorSetLayout {
    fn new(
        device: Arc<Device>,
        bindings: Vec<vk::DescriptorSetLayoutBinding<'static>>,
    ) -> RhiResult<Self> {
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        let layout = unsafe {
            device
                .handle()
                .create_descriptor_set_layout(&create_info, None)?
        };

        debug!(
            "Created descriptor set layout with {} binding(s)",
            bindings.len()
        );

        Ok(Self {
            device,
            layout,
            bindings: bindings.into_iter().map(|b| (b.binding, b)).collect(),
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    /// Declaration for `slot`, if the layout has one.
    pub fn binding(&self, slot: u32) -> Option<&vk::DescriptorSetLayoutBinding<'static>> {
        self.bindings.get(&slot)
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_set_layout(self.layout, None);
        }
        debug!("Destroyed descriptor set layout");
    }
}

/// Tracks how many sets a pool has handed out against its fixed capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolBudget {
    max_sets: u32,
    allocated: u32,
}

impl PoolBudget {
    pub fn new(max_sets: u32) -> Self {
        Self {
            max_sets,
            allocated: 0,
        }
    }

    /// Reserves `count` sets.
    ///
    /// # Errors
    ///
    /// [`RhiError::PoolExhausted`] if fewer than `count` remain; nothing is
    /// reserved in that case.
    pub fn try_allocate(&mut self, count: u32) -> RhiResult<()> {
        match self.allocated.checked_add(count) {
            Some(total) if total <= self.max_sets => {
                self.allocated = total;
                Ok(())
            }
            _ => Err(RhiError::PoolExhausted {
                max_sets: self.max_sets,
            }),
        }
    }

    /// Returns `count` sets to the budget.
    pub fn release(&mut self, count: u32) {
        self.allocated = self.allocated.saturating_sub(count);
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.max_sets - self.allocated
    }

    #[inline]
    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }
}

/// Accumulates capacity requests for a [`DescriptorPool`].
pub struct DescriptorPoolBuilder {
    device: Arc<Device>,
    pool_sizes: Vec<vk::DescriptorPoolSize>,
    max_sets: u32,
}

impl DescriptorPoolBuilder {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pool_sizes: Vec::new(),
            max_sets: 1000,
        }
    }

    /// Adds room for `count` descriptors of `descriptor_type`.
    pub fn add_pool_size(mut self, descriptor_type: vk::DescriptorType, count: u32) -> Self {
        self.pool_sizes.push(
            vk::DescriptorPoolSize::default()
                .ty(descriptor_type)
                .descriptor_count(count),
        );
        self
    }

    pub fn set_max_sets(mut self, max_sets: u32) -> Self {
        self.max_sets = max_sets;
        self
    }

    pub fn build(self) -> RhiResult<DescriptorPool> {
        if self.max_sets == 0 || self.pool_sizes.is_empty() {
            return Err(RhiError::InvalidArgument(
                "descriptor pool needs max_sets > 0 and at least one pool size".to_string(),
            ));
        }
        DescriptorPool::new(self.device, self.max_sets, &self.pool_sizes)
    }
}

/// Fixed-capacity descriptor pool.
pub struct DescriptorPool {
    device: Arc<Device>,
    pool: vk::DescriptorPool,
    budget: PoolBudget,
}

impl DescriptorPool {
    fn new(
        device: Arc<Device>,
        max_sets: u32,
        pool_sizes: &[vk::DescriptorPoolSize],
    ) -> RhiResult<Self> {
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(max_sets)
            .pool_sizes(pool_sizes);

        let pool = unsafe { device.handle().create_descriptor_pool(&create_info, None)? };

        debug!(
            "Created descriptor pool: max_sets={}, pool_sizes={}",
            max_sets,
            pool_sizes.len()
        );

        Ok(Self {
            device,
            pool,
            budget: PoolBudget::new(max_sets),
        })
    }

    /// Allocates one set with `layout`.
    ///
    /// # Errors
    ///
    /// [`RhiError::PoolExhausted`] once `max_sets` sets are live, or when the
    /// driver reports the pool out of memory or fragmented.
    pub fn allocate_descriptor(
        &mut self,
        layout: vk::DescriptorSetLayout,
    ) -> RhiResult<vk::DescriptorSet> {
        self.budget.try_allocate(1)?;

        let layouts = [layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        match unsafe { self.device.handle().allocate_descriptor_sets(&alloc_info) } {
            Ok(sets) => {
                debug!(
                    "Allocated descriptor set ({} remaining)",
                    self.budget.remaining()
                );
                Ok(sets[0])
            }
            Err(e) => {
                self.budget.release(1);
                Err(map_allocation_error(e, self.budget.max_sets()))
            }
        }
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }

    #[inline]
    pub fn budget(&self) -> &PoolBudget {
        &self.budget
    }

    #[inline]
    pub(crate) fn device(&self) -> &Device {
        &self.device
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_pool(self.pool, None);
        }
        debug!("Destroyed descriptor pool");
    }
}

fn map_allocation_error(result: vk::Result, max_sets: u32) -> RhiError {
    match result {
        vk::Result::ERROR_OUT_OF_POOL_MEMORY | vk::Result::ERROR_FRAGMENTED_POOL => {
            RhiError::PoolExhausted { max_sets }
        }
        other => RhiError::Vulkan(other),
    }
}

/// Collects bindings for one layout, then allocates and fills a set.
///
/// Writing a slot the layout does not declare, or a slot declared with more
/// than one descriptor, is a programming error and panics.
pub struct DescriptorWriter<'a> {
    layout: &'a DescriptorSetLayout,
    pool: &'a mut DescriptorPool,
    buffers: Vec<(u32, vk::DescriptorType, vk::DescriptorBufferInfo)>,
    images: Vec<(u32, vk::DescriptorType, vk::DescriptorImageInfo)>,
}

impl<'a> DescriptorWriter<'a> {
    pub fn new(layout: &'a DescriptorSetLayout, pool: &'a mut DescriptorPool) -> Self {
        Self {
            layout,
            pool,
            buffers: Vec::new(),
            images: Vec::new(),
        }
    }

    fn single_descriptor_type(&self, slot: u32) -> vk::DescriptorType {
        let binding = self
            .layout
            .binding(slot)
            .unwrap_or_else(|| panic!("layout does not contain binding {slot}"));
        assert_eq!(
            binding.descriptor_count, 1,
            "binding {slot} expects {} descriptors, writer binds one",
            binding.descriptor_count
        );
        binding.descriptor_type
    }

    pub fn write_buffer(mut self, slot: u32, info: vk::DescriptorBufferInfo) -> Self {
        let ty = self.single_descriptor_type(slot);
        self.buffers.push((slot, ty, info));
        self
    }

    pub fn write_image(mut self, slot: u32, info: vk::DescriptorImageInfo) -> Self {
        let ty = self.single_descriptor_type(slot);
        self.images.push((slot, ty, info));
        self
    }

    /// Allocates a set from the pool and applies the collected writes to it.
    ///
    /// # Errors
    ///
    /// [`RhiError::PoolExhausted`] if the pool has no capacity left.
    pub fn build(self) -> RhiResult<vk::DescriptorSet> {
        let set = self.pool.allocate_descriptor(self.layout.handle())?;
        self.overwrite(set);
        Ok(set)
    }

    /// Applies the collected writes to an existing set.
    pub fn overwrite(&self, set: vk::DescriptorSet) {
        let buffer_writes = self.buffers.iter().map(|(slot, ty, info)| {
            vk::WriteDescriptorSet::default()
                .dst_set(set)
                .dst_binding(*slot)
                .descriptor_type(*ty)
                .buffer_info(std::slice::from_ref(info))
        });
        let image_writes = self.images.iter().map(|(slot, ty, info)| {
            vk::WriteDescriptorSet::default()
                .dst_set(set)
                .dst_binding(*slot)
                .descriptor_type(*ty)
                .image_info(std::slice::from_ref(info))
        });
        let writes: Vec<vk::WriteDescriptorSet> = buffer_writes.chain(image_writes).collect();

        unsafe {
            self.pool.device().handle().update_descriptor_sets(&writes, &[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_bindings_accepted() {
        assert!(check_unique_bindings([0, 1, 2]).is_ok());
        assert!(check_unique_bindings([]).is_ok());
    }

    #[test]
    fn test_duplicate_binding_reported() {
        let err = check_unique_bindings([0, 3, 1, 3]).unwrap_err();
        assert!(matches!(err, RhiError::DuplicateBinding(3)));
    }

    #[test]
    fn test_budget_allows_exactly_max_sets() {
        let mut budget = PoolBudget::new(2);
        assert!(budget.try_allocate(1).is_ok());
        assert!(budget.try_allocate(1).is_ok());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_rejects_beyond_max_sets() {
        let mut budget = PoolBudget::new(2);
        budget.try_allocate(2).unwrap();
        let err = budget.try_allocate(1).unwrap_err();
        assert!(matches!(err, RhiError::PoolExhausted { max_sets: 2 }));
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_failed_request_reserves_nothing() {
        let mut budget = PoolBudget::new(3);
        budget.try_allocate(2).unwrap();
        assert!(budget.try_allocate(2).is_err());
        assert_eq!(budget.remaining(), 1);
    }

    #[test]
    fn test_budget_release_after_failed_driver_allocation() {
        let mut budget = PoolBudget::new(2);
        budget.try_allocate(2).unwrap();
        budget.release(1);
        assert_eq!(budget.remaining(), 1);
        assert!(budget.try_allocate(1).is_ok());
        assert!(budget.try_allocate(1).is_err());
    }

    #[test]
    fn test_driver_pool_errors_map_to_exhausted() {
        assert!(matches!(
            map_allocation_error(vk::Result::ERROR_OUT_OF_POOL_MEMORY, 4),
            RhiError::PoolExhausted { max_sets: 4 }
        ));
        assert!(matches!(
            map_allocation_error(vk::Result::ERROR_FRAGMENTED_POOL, 4),
            RhiError::PoolExhausted { .. }
        ));
        assert!(matches!(
            map_allocation_error(vk::Result::ERROR_DEVICE_LOST, 4),
            RhiError::Vulkan(vk::Result::ERROR_DEVICE_LOST)
        ));
    }
}
