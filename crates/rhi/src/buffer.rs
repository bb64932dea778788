//! GPU buffers with aligned, indexed access.
//!
//! A [`GpuBuffer`] holds `element_count` elements of `element_size` bytes. Each
//! element starts on a multiple of the buffer's minimum offset alignment, so
//! element `i` lives at `i * aligned_size` and can be bound, flushed or
//! invalidated on its own. All offset arithmetic lives in [`BufferLayout`],
//! which needs no device and is what the tests exercise.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ash::vk;
//! use vkframe_rhi::buffer::{GpuBuffer, WHOLE_SIZE};
//! use vkframe_rhi::device::Device;
//!
//! # fn example(device: Arc<Device>, ubo: [u8; 68]) -> vkframe_rhi::RhiResult<()> {
//! let alignment = device.limits().min_uniform_buffer_offset_alignment;
//! let mut frames = GpuBuffer::new(
//!     device,
//!     68,
//!     2,
//!     vk::BufferUsageFlags::UNIFORM_BUFFER,
//!     vk::MemoryPropertyFlags::HOST_VISIBLE,
//!     alignment,
//! )?;
//! frames.map(WHOLE_SIZE, 0)?;
//! frames.write_to_index(&ubo, 1);
//! frames.flush_index(1)?;
//! let info = frames.descriptor_info_for_index(1);
//! # Ok(())
//! # }
//! ```

use std::ops::Range;
use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Sentinel size meaning "from `offset` to the end of the buffer".
pub const WHOLE_SIZE: vk::DeviceSize = vk::WHOLE_SIZE;

/// Rounds `size` up to the next multiple of `min_alignment`.
///
/// `min_alignment` must be zero or a power of two, which Vulkan guarantees for
/// every alignment limit. Zero means "no requirement" and returns `size`.
#[inline]
pub fn align(size: vk::DeviceSize, min_alignment: vk::DeviceSize) -> vk::DeviceSize {
    if min_alignment > 0 {
        debug_assert!(min_alignment.is_power_of_two());
        (size + min_alignment - 1) & !(min_alignment - 1)
    } else {
        size
    }
}

/// Byte layout of an array of aligned elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferLayout {
    element_size: vk::DeviceSize,
    element_count: u32,
    aligned_size: vk::DeviceSize,
}

impl BufferLayout {
    pub fn new(element_size: vk::DeviceSize, element_count: u32, min_alignment: vk::DeviceSize) -> Self {
        Self {
            element_size,
            element_count,
            aligned_size: align(element_size, min_alignment),
        }
    }

    #[inline]
    pub fn element_size(&self) -> vk::DeviceSize {
        self.element_size
    }

    #[inline]
    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    /// Stride between consecutive elements.
    #[inline]
    pub fn aligned_size(&self) -> vk::DeviceSize {
        self.aligned_size
    }

    /// `aligned_size * element_count`.
    #[inline]
    pub fn total_size(&self) -> vk::DeviceSize {
        self.aligned_size * vk::DeviceSize::from(self.element_count)
    }

    /// Byte offset of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn element_offset(&self, index: u32) -> vk::DeviceSize {
        assert!(
            index < self.element_count,
            "element index {} out of range ({} elements)",
            index,
            self.element_count
        );
        vk::DeviceSize::from(index) * self.aligned_size
    }

    /// `(offset, size)` of the aligned span owned by element `index`.
    ///
    /// This is the range bound, flushed and invalidated for that element.
    #[inline]
    pub fn index_span(&self, index: u32) -> (vk::DeviceSize, vk::DeviceSize) {
        (self.element_offset(index), self.aligned_size)
    }

    /// The full aligned span owned by element `index`.
    pub fn element_range(&self, index: u32) -> Range<usize> {
        let (offset, size) = self.index_span(index);
        offset as usize..(offset + size) as usize
    }

    /// Resolves [`WHOLE_SIZE`] and checks that `offset..offset + size` fits.
    pub fn resolve_range(
        &self,
        size: vk::DeviceSize,
        offset: vk::DeviceSize,
    ) -> RhiResult<(vk::DeviceSize, vk::DeviceSize)> {
        let total = self.total_size();
        let size = if size == WHOLE_SIZE {
            total.saturating_sub(offset)
        } else {
            size
        };
        match offset.checked_add(size) {
            Some(end) if end <= total => Ok((offset, size)),
            _ => Err(RhiError::InvalidArgument(format!(
                "range {}+{} exceeds buffer of {} bytes",
                offset, size, total
            ))),
        }
    }

    /// Copies `data` into element `index` of `memory`.
    ///
    /// Only the first `data.len()` bytes of the element's span change; the
    /// padding up to `aligned_size` and every other element are untouched.
    ///
    /// # Panics
    ///
    /// Panics if `data` is larger than one element or `memory` is too small.
    pub fn write_element(&self, memory: &mut [u8], index: u32, data: &[u8]) {
        assert!(
            data.len() as vk::DeviceSize <= self.element_size,
            "{} bytes do not fit an element of {} bytes",
            data.len(),
            self.element_size
        );
        let start = self.element_range(index).start;
        memory[start..start + data.len()].copy_from_slice(data);
    }

    /// The `element_size` bytes of element `index`.
    pub fn element_bytes<'a>(&self, memory: &'a [u8], index: u32) -> &'a [u8] {
        let start = self.element_range(index).start;
        &memory[start..start + self.element_size as usize]
    }
}

/// Expands `offset..offset + size` to whole `atom` units, as required for
/// flushing or invalidating non-coherent memory.
pub fn atom_aligned_range(
    offset: vk::DeviceSize,
    size: vk::DeviceSize,
    atom: vk::DeviceSize,
) -> (vk::DeviceSize, vk::DeviceSize) {
    if atom <= 1 {
        return (offset, size);
    }
    let start = offset - offset % atom;
    let end = align(offset + size, atom);
    (start, end - start)
}

/// Picks the gpu-allocator location that satisfies `properties`.
pub fn memory_location(properties: vk::MemoryPropertyFlags) -> MemoryLocation {
    if !properties.contains(vk::MemoryPropertyFlags::HOST_VISIBLE) {
        MemoryLocation::GpuOnly
    } else if properties.contains(vk::MemoryPropertyFlags::HOST_CACHED) {
        MemoryLocation::GpuToCpu
    } else {
        MemoryLocation::CpuToGpu
    }
}

/// A device buffer with its own allocation and an optional host mapping.
///
/// Host-visible allocations are persistently mapped by gpu-allocator;
/// [`GpuBuffer::map`] and [`GpuBuffer::unmap`] open and close the window the
/// write calls are allowed to touch. Writing outside an open mapping is a
/// programming error and panics.
pub struct GpuBuffer {
    device: Arc<Device>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    layout: BufferLayout,
    usage: vk::BufferUsageFlags,
    coherent: bool,
    mapped: Option<Range<vk::DeviceSize>>,
}

impl GpuBuffer {
    /// Creates a buffer for `element_count` elements of `element_size` bytes.
    ///
    /// Each element is padded to a multiple of `min_offset_alignment`; pass 1
    /// (or 0) for tightly packed data such as vertices.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::Allocation`] if memory cannot be allocated and
    /// [`RhiError::InvalidArgument`] for an empty buffer.
    pub fn new(
        device: Arc<Device>,
        element_size: vk::DeviceSize,
        element_count: u32,
        usage: vk::BufferUsageFlags,
        memory_properties: vk::MemoryPropertyFlags,
        min_offset_alignment: vk::DeviceSize,
    ) -> RhiResult<Self> {
        let layout = BufferLayout::new(element_size, element_count, min_offset_alignment);
        if layout.total_size() == 0 {
            return Err(RhiError::InvalidArgument(
                "buffer size must be greater than 0".to_string(),
            ));
        }

        let buffer_info = vk::BufferCreateInfo::default()
            .size(layout.total_size())
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.handle().create_buffer(&buffer_info, None)? };
        let requirements = unsafe { device.handle().get_buffer_memory_requirements(buffer) };

        let allocation = device.allocator().allocate(&AllocationCreateDesc {
            name: "gpu buffer",
            requirements,
            location: memory_location(memory_properties),
            linear: true,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        });
        let allocation = match allocation {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { device.handle().destroy_buffer(buffer, None) };
                return Err(e.into());
            }
        };

        if let Err(e) = unsafe {
            device
                .handle()
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
        } {
            let _ = device.allocator().free(allocation);
            unsafe { device.handle().destroy_buffer(buffer, None) };
            return Err(e.into());
        }

        let coherent = allocation
            .memory_properties()
            .contains(vk::MemoryPropertyFlags::HOST_COHERENT);

        debug!(
            "Created buffer: {} x {} bytes (stride {}, total {}, {:?})",
            element_count,
            element_size,
            layout.aligned_size(),
            layout.total_size(),
            usage
        );

        Ok(Self {
            device,
            buffer,
            allocation: Some(allocation),
            layout,
            usage,
            coherent,
            mapped: None,
        })
    }

    /// Opens a host mapping over `offset..offset + size`.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::InvalidArgument`] if the memory is not host visible
    /// or the range does not fit.
    pub fn map(&mut self, size: vk::DeviceSize, offset: vk::DeviceSize) -> RhiResult<()> {
        let (offset, size) = self.layout.resolve_range(size, offset)?;
        let host_visible = self
            .allocation
            .as_ref()
            .is_some_and(|allocation| allocation.mapped_ptr().is_some());
        if !host_visible {
            return Err(RhiError::InvalidArgument(
                "buffer memory is not host visible".to_string(),
            ));
        }
        self.mapped = Some(offset..offset + size);
        Ok(())
    }

    /// Closes the host mapping. Safe to call when not mapped.
    pub fn unmap(&mut self) {
        self.mapped = None;
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    /// Copies `data` into the mapped memory.
    ///
    /// With `size == WHOLE_SIZE` the bytes go to the start of the buffer,
    /// ignoring element alignment. Otherwise `size` bytes of `data` land at
    /// `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not mapped or the write leaves the mapping.
    pub fn write_to_buffer(&mut self, data: &[u8], size: vk::DeviceSize, offset: vk::DeviceSize) {
        let (offset, len) = if size == WHOLE_SIZE {
            (0, data.len() as vk::DeviceSize)
        } else {
            (offset, size)
        };
        assert!(
            len as usize <= data.len(),
            "write of {} bytes from a {} byte slice",
            len,
            data.len()
        );
        let memory = self.mapped_bytes(offset..offset + len);
        memory.copy_from_slice(&data[..len as usize]);
    }

    /// Writes one element at `index * aligned_size`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not mapped over that element.
    pub fn write_to_index(&mut self, data: &[u8], index: u32) {
        assert!(
            data.len() as vk::DeviceSize <= self.layout.element_size(),
            "{} bytes do not fit an element of {} bytes",
            data.len(),
            self.layout.element_size()
        );
        let start = self.layout.element_offset(index);
        let memory = self.mapped_bytes(start..start + data.len() as vk::DeviceSize);
        memory.copy_from_slice(data);
    }

    fn mapped_bytes(&mut self, range: Range<vk::DeviceSize>) -> &mut [u8] {
        let mapped = self
            .mapped
            .clone()
            .expect("GpuBuffer accessed before map()");
        assert!(
            mapped.start <= range.start && range.end <= mapped.end,
            "access {:?} outside mapped range {:?}",
            range,
            mapped
        );
        let slice = self
            .allocation
            .as_mut()
            .and_then(|allocation| allocation.mapped_slice_mut())
            .expect("mapped buffer lost its host pointer");
        &mut slice[range.start as usize..range.end as usize]
    }

    /// Makes host writes in the range visible to the device.
    ///
    /// A no-op for host-coherent memory.
    pub fn flush(&self, size: vk::DeviceSize, offset: vk::DeviceSize) -> RhiResult<()> {
        if self.coherent {
            return Ok(());
        }
        let range = self.memory_range(size, offset)?;
        unsafe {
            self.device
                .handle()
                .flush_mapped_memory_ranges(std::slice::from_ref(&range))?
        };
        Ok(())
    }

    /// Makes device writes in the range visible to the host.
    ///
    /// A no-op for host-coherent memory.
    pub fn invalidate(&self, size: vk::DeviceSize, offset: vk::DeviceSize) -> RhiResult<()> {
        if self.coherent {
            return Ok(());
        }
        let range = self.memory_range(size, offset)?;
        unsafe {
            self.device
                .handle()
                .invalidate_mapped_memory_ranges(std::slice::from_ref(&range))?
        };
        Ok(())
    }

    /// Flushes exactly the aligned span of element `index`.
    pub fn flush_index(&self, index: u32) -> RhiResult<()> {
        let (offset, size) = self.layout.index_span(index);
        self.flush(size, offset)
    }

    /// Invalidates exactly the aligned span of element `index`.
    pub fn invalidate_index(&self, index: u32) -> RhiResult<()> {
        let (offset, size) = self.layout.index_span(index);
        self.invalidate(size, offset)
    }

    fn memory_range(
        &self,
        size: vk::DeviceSize,
        offset: vk::DeviceSize,
    ) -> RhiResult<vk::MappedMemoryRange<'static>> {
        let (offset, size) = self.layout.resolve_range(size, offset)?;
        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| RhiError::InvalidArgument("buffer has no allocation".to_string()))?;
        let atom = self.device.limits().non_coherent_atom_size;
        let (start, len) = atom_aligned_range(allocation.offset() + offset, size, atom);
        Ok(vk::MappedMemoryRange::default()
            .memory(unsafe { allocation.memory() })
            .offset(start)
            .size(len))
    }

    /// Describes `offset..offset + size` for a descriptor write.
    pub fn descriptor_info(
        &self,
        size: vk::DeviceSize,
        offset: vk::DeviceSize,
    ) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo::default()
            .buffer(self.buffer)
            .offset(offset)
            .range(size)
    }

    /// Describes the aligned span of element `index`.
    pub fn descriptor_info_for_index(&self, index: u32) -> vk::DescriptorBufferInfo {
        let (offset, size) = self.layout.index_span(index);
        self.descriptor_info(size, offset)
    }

    /// Returns the Vulkan buffer handle.
    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    #[inline]
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// Total size in bytes.
    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.layout.total_size()
    }

    #[inline]
    pub fn usage(&self) -> vk::BufferUsageFlags {
        self.usage
    }
}

impl Drop for GpuBuffer {
    fn drop(&mut self) {
        self.unmap();
        if let Some(allocation) = self.allocation.take()
            && let Err(e) = self.device.allocator().free(allocation)
        {
            tracing::error!("Failed to free buffer allocation: {:?}", e);
        }

        unsafe {
            self.device.handle().destroy_buffer(self.buffer, None);
        }

        debug!("Destroyed buffer ({} bytes)", self.layout.total_size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_rounds_up_to_power_of_two() {
        assert_eq!(align(68, 64), 128);
        assert_eq!(align(64, 64), 64);
        assert_eq!(align(1, 256), 256);
        assert_eq!(align(0, 16), 0);
    }

    #[test]
    fn test_align_zero_and_one_are_identity() {
        for size in [0, 1, 7, 68, 4096] {
            assert_eq!(align(size, 0), size);
            assert_eq!(align(size, 1), size);
        }
    }

    #[test]
    fn test_align_properties_hold_for_powers_of_two() {
        for shift in 0..10 {
            let min = 1u64 << shift;
            for size in 0..300 {
                let aligned = align(size, min);
                assert!(aligned >= size);
                assert_eq!(aligned % min, 0);
                assert!(aligned - size < min);
            }
        }
    }

    #[test]
    fn test_layout_sizes() {
        let layout = BufferLayout::new(68, 2, 64);
        assert_eq!(layout.aligned_size(), 128);
        assert_eq!(layout.total_size(), 256);
        assert_eq!(layout.element_offset(1), 128);
        assert_eq!(layout.element_range(1), 128..256);
        assert_eq!(layout.index_span(0), (0, 128));
        assert_eq!(layout.index_span(1), (128, 128));
    }

    #[test]
    fn test_layout_tight_packing() {
        let layout = BufferLayout::new(44, 3, 1);
        assert_eq!(layout.aligned_size(), 44);
        assert_eq!(layout.total_size(), 132);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_element_offset_out_of_range_panics() {
        BufferLayout::new(16, 2, 16).element_offset(2);
    }

    #[test]
    fn test_write_element_stays_inside_its_span() {
        let layout = BufferLayout::new(5, 3, 8);
        let mut memory = vec![0u8; layout.total_size() as usize];
        layout.write_element(&mut memory, 1, &[1, 2, 3, 4, 5]);

        assert_eq!(&memory[..8], &[0; 8]);
        assert_eq!(&memory[8..13], &[1, 2, 3, 4, 5]);
        assert_eq!(&memory[13..], &[0; 11]);
        assert_eq!(layout.element_bytes(&memory, 1), &[1, 2, 3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "do not fit")]
    fn test_write_element_rejects_oversized_data() {
        let layout = BufferLayout::new(4, 2, 4);
        let mut memory = vec![0u8; 8];
        layout.write_element(&mut memory, 0, &[0; 5]);
    }

    #[test]
    fn test_resolve_range_whole_size() {
        let layout = BufferLayout::new(68, 2, 64);
        assert_eq!(layout.resolve_range(WHOLE_SIZE, 0).unwrap(), (0, 256));
        assert_eq!(layout.resolve_range(WHOLE_SIZE, 128).unwrap(), (128, 128));
        assert_eq!(layout.resolve_range(64, 64).unwrap(), (64, 64));
        assert!(layout.resolve_range(200, 128).is_err());
    }

    #[test]
    fn test_atom_aligned_range_expands_outward() {
        assert_eq!(atom_aligned_range(130, 20, 64), (128, 64));
        assert_eq!(atom_aligned_range(128, 128, 64), (128, 128));
        assert_eq!(atom_aligned_range(10, 5, 1), (10, 5));
    }

    #[test]
    fn test_memory_location_mapping() {
        assert_eq!(
            memory_location(vk::MemoryPropertyFlags::DEVICE_LOCAL),
            MemoryLocation::GpuOnly
        );
        assert_eq!(
            memory_location(
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
            ),
            MemoryLocation::CpuToGpu
        );
        assert_eq!(
            memory_location(
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_CACHED
            ),
            MemoryLocation::GpuToCpu
        );
    }

    #[test]
    fn test_gpu_buffer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GpuBuffer>();
    }
}
