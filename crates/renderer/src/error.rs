//! Renderer error type.

use thiserror::Error;

use vkframe_resources::MeshError;
use vkframe_rhi::RhiError;

/// Errors surfaced by the renderer.
#[derive(Error, Debug)]
pub enum RendererError {
    /// Vulkan object creation, submission or resource exhaustion
    #[error(transparent)]
    Rhi(#[from] RhiError),

    /// A mesh that cannot be uploaded
    #[error("Invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    /// Window or surface setup
    #[error(transparent)]
    Platform(#[from] vkframe_core::Error),
}

/// Result type alias for renderer operations.
pub type RendererResult<T> = std::result::Result<T, RendererError>;
