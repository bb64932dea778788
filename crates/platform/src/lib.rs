//! Platform layer for vkframe.
//!
//! This crate provides the window/surface collaborator and keyboard input:
//! - Window management via winit, with resize and minimise tracking
//! - Vulkan surface creation through ash-window
//! - Pressed-key state and the movement key mappings

mod input;
mod window;

pub use input::{InputState, KeyCode, KeyMappings, MovementAxes};
pub use window::{Surface, Window, get_required_extensions};

pub use winit::event::{ElementState, WindowEvent};
pub use winit::event_loop::{ActiveEventLoop, EventLoop};
