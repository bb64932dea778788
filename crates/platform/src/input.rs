//! Keyboard state and movement key bindings.

use std::collections::HashSet;

pub use vkframe_scene::MovementAxes;
pub use winit::keyboard::KeyCode;

/// Tracks which keys are held down.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: HashSet<KeyCode>,
    just_pressed_keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call once per frame after input has been consumed.
    pub fn end_frame(&mut self) {
        self.just_pressed_keys.clear();
    }

    pub fn on_key_pressed(&mut self, key: KeyCode) {
        if self.pressed_keys.insert(key) {
            self.just_pressed_keys.insert(key);
        }
    }

    pub fn on_key_released(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    /// Drop all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.just_pressed_keys.clear();
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed_keys.contains(&key)
    }

    /// `+1` when only `positive` is held, `-1` when only `negative` is held.
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_key_pressed(positive) {
            value += 1.0;
        }
        if self.is_key_pressed(negative) {
            value -= 1.0;
        }
        value
    }
}

/// Keys that drive the camera controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMappings {
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub move_forward: KeyCode,
    pub move_backward: KeyCode,
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub look_left: KeyCode,
    pub look_right: KeyCode,
    pub look_up: KeyCode,
    pub look_down: KeyCode,
}

impl Default for KeyMappings {
    fn default() -> Self {
        Self {
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            move_forward: KeyCode::KeyW,
            move_backward: KeyCode::KeyS,
            move_up: KeyCode::KeyE,
            move_down: KeyCode::KeyQ,
            look_left: KeyCode::ArrowLeft,
            look_right: KeyCode::ArrowRight,
            look_up: KeyCode::ArrowUp,
            look_down: KeyCode::ArrowDown,
        }
    }
}

impl KeyMappings {
    /// Read the current movement intent from the held keys.
    pub fn axes(&self, input: &InputState) -> MovementAxes {
        MovementAxes {
            forward: input.axis(self.move_backward, self.move_forward),
            right: input.axis(self.move_left, self.move_right),
            up: input.axis(self.move_down, self.move_up),
            yaw: input.axis(self.look_left, self.look_right),
            pitch: input.axis(self.look_down, self.look_up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_cleared_after_frame() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::Escape);
        assert!(input.is_key_just_pressed(KeyCode::Escape));
        input.end_frame();
        assert!(!input.is_key_just_pressed(KeyCode::Escape));
        assert!(input.is_key_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_repeat_press_is_not_just_pressed() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyW);
        input.end_frame();
        input.on_key_pressed(KeyCode::KeyW);
        assert!(!input.is_key_just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyA);
        input.on_key_pressed(KeyCode::KeyD);
        let axes = KeyMappings::default().axes(&input);
        assert_eq!(axes.right, 0.0);
    }

    #[test]
    fn test_default_mappings_produce_axes() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyW);
        input.on_key_pressed(KeyCode::KeyQ);
        input.on_key_pressed(KeyCode::ArrowLeft);

        let axes = KeyMappings::default().axes(&input);
        assert_eq!(
            axes,
            MovementAxes {
                forward: 1.0,
                right: 0.0,
                up: -1.0,
                yaw: -1.0,
                pitch: 0.0,
            }
        );
    }

    #[test]
    fn test_release_all_clears_axes() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyS);
        input.release_all();
        assert_eq!(KeyMappings::default().axes(&input), MovementAxes::default());
    }
}
