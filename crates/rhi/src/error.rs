//! RHI-specific error types.

use std::path::PathBuf;

use thiserror::Error;

/// RHI-specific error type.
#[derive(Error, Debug)]
pub enum RhiError {
    /// Vulkan API error
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] ash::vk::Result),

    /// Failed to load the Vulkan library
    #[error("Failed to load Vulkan: {0}")]
    Loading(#[from] ash::LoadingError),

    /// GPU allocator error, including out-of-memory
    #[error("Allocation error: {0}")]
    Allocation(#[from] gpu_allocator::AllocationError),

    /// No suitable GPU found
    #[error("No suitable GPU found")]
    NoSuitableGpu,

    /// A shader file could not be read
    #[error("Failed to read shader {}: {source}", path.display())]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shader file was read but is not SPIR-V
    #[error("Invalid SPIR-V in {}: {reason}", path.display())]
    InvalidShaderCode { path: PathBuf, reason: String },

    /// The driver rejected the combined pipeline state
    #[error("Pipeline creation failed: {0}")]
    PipelineCreation(ash::vk::Result),

    /// Pipeline requested without a pipeline layout
    #[error("Pipeline config has no pipeline layout")]
    MissingPipelineLayout,

    /// Pipeline requested without a render pass
    #[error("Pipeline config has no render pass")]
    MissingRenderPass,

    /// A descriptor set layout declared the same binding slot twice
    #[error("Descriptor binding {0} declared more than once")]
    DuplicateBinding(u32),

    /// A descriptor pool has no capacity left
    #[error("Descriptor pool exhausted (max sets {max_sets})")]
    PoolExhausted { max_sets: u32 },

    /// A wait timed out; treated as a lost device
    #[error("Device lost")]
    DeviceLost,

    /// Surface query error
    #[error("Surface error: {0}")]
    Surface(String),

    /// Swapchain error
    #[error("Swapchain error: {0}")]
    Swapchain(String),

    /// A call was made with arguments that can never succeed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;

