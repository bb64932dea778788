//! Vulkan abstraction layer (Render Hardware Interface).
//!
//! Thin RAII wrappers over `ash` for everything the frame loop touches:
//! - Instance, physical device selection and logical device creation
//! - Host-visible buffers with aligned per-element access
//! - Shader modules and graphics pipelines
//! - Descriptor set layouts, pools and writers
//! - The swap chain with its render pass, framebuffers and frame pacing
//! - Command pools, command buffers and synchronization primitives
//!
//! Every wrapper keeps an `Arc<Device>` and releases its Vulkan object on
//! drop, so the device always outlives what was created from it.

mod error;

pub mod buffer;
pub mod command;
pub mod depth;
pub mod descriptor;
pub mod device;
pub mod frame_pacing;
pub mod instance;
pub mod physical_device;
pub mod pipeline;
pub mod render_pass;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};

pub use ash::vk;
