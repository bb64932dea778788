//! Core utilities shared by the vkframe crates.
//!
//! This crate provides foundational types used across the engine:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame clock
//! - TOML configuration

mod config;
mod error;
mod logging;
mod timer;

pub use config::{
    CameraConfig, ConfigSource, EngineConfig, PresentModePreference, RendererConfig, SceneConfig,
    ShaderConfig, WindowConfig,
};
pub use error::{Error, Result};
pub use logging::{DEFAULT_FILTER, init_logging};
pub use timer::FrameClock;
