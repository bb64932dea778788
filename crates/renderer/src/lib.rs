//! Frame orchestration for vkframe.
//!
//! This crate turns the RHI pieces into a running frame loop:
//! - Device bootstrap for a window ([`RenderContext`])
//! - The acquire/record/submit/present state machine ([`Renderer`])
//! - Resize and minimise handling ([`ResizeTracker`])
//! - CPU mirrors of the shader blocks, GPU models and the scene render system

mod error;

pub mod context;
pub mod frame_info;
pub mod global;
pub mod model;
pub mod renderer;
pub mod resize;
pub mod scene_render_system;
pub mod ubo;

pub use context::RenderContext;
pub use error::{RendererError, RendererResult};
pub use frame_info::FrameInfo;
pub use global::GlobalResources;
pub use model::Model;
pub use renderer::{Renderer, present_mode_for};
pub use resize::{ResizeAction, ResizeTracker};
pub use scene_render_system::SceneRenderSystem;
pub use ubo::{GlobalUbo, SimplePushConstantData};

pub use vkframe_rhi::sync::MAX_FRAMES_IN_FLIGHT;
