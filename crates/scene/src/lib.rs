//! Scene data for vkframe.
//!
//! This crate holds everything the renderer draws from:
//! - A flat, insertion-ordered object collection
//! - Per-object transforms with on-demand model and normal matrices
//! - The camera and its keyboard movement controller

pub mod camera;
pub mod controller;
pub mod game_object;
pub mod transform;

pub use camera::{Camera, WORLD_UP};
pub use controller::{CameraRig, KeyboardMovementController, MovementAxes};
pub use game_object::{GameObject, GameObjects, ObjectId};
pub use transform::Transform;
