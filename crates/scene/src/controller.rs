//! Keyboard-driven fly camera.

use std::f32::consts::TAU;

use glam::Vec3;

/// Signed movement intent in `[-1, 1]` per axis, as read from held keys.
///
/// `pitch` is positive when looking up, `yaw` positive when turning right.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MovementAxes {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
    pub yaw: f32,
    pub pitch: f32,
}

/// Position and Euler rotation of the viewer.
///
/// Feed it to [`Camera::set_view_yxz`](crate::Camera::set_view_yxz).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    /// `x` pitch, `y` yaw, `z` roll, in radians.
    pub rotation: Vec3,
}

/// Pitch stays inside this many radians of level.
pub const PITCH_LIMIT: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardMovementController {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub look_speed: f32,
}

impl Default for KeyboardMovementController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_speed: 1.5,
        }
    }
}

impl KeyboardMovementController {
    pub fn new(move_speed: f32, look_speed: f32) -> Self {
        Self {
            move_speed,
            look_speed,
        }
    }

    /// Applies one frame of input to `rig`.
    ///
    /// Look axes turn the rig first, then movement is taken relative to the
    /// new yaw. Diagonal input is normalised so it is no faster than a
    /// single axis. Vertical movement ignores pitch.
    pub fn move_in_plane_xz(&self, input: &MovementAxes, dt: f32, rig: &mut CameraRig) {
        let look = Vec3::new(input.pitch, input.yaw, 0.0);
        if look.length_squared() > f32::EPSILON {
            rig.rotation += self.look_speed * dt * look.normalize();
        }

        rig.rotation.x = rig.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        rig.rotation.y = rig.rotation.y.rem_euclid(TAU);

        let yaw = rig.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::NEG_Y;

        let step = forward * input.forward + right * input.right + up * input.up;
        if step.length_squared() > f32::EPSILON {
            rig.position += self.move_speed * dt * step.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_idle_input_leaves_rig_alone() {
        let controller = KeyboardMovementController::default();
        let mut rig = CameraRig {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.2, 0.4, 0.0),
        };
        let before = rig;
        controller.move_in_plane_xz(&MovementAxes::default(), 0.016, &mut rig);
        assert_eq!(rig, before);
    }

    #[test]
    fn test_forward_follows_yaw() {
        let controller = KeyboardMovementController::new(2.0, 1.0);
        let input = MovementAxes {
            forward: 1.0,
            ..Default::default()
        };

        let mut rig = CameraRig::default();
        controller.move_in_plane_xz(&input, 0.5, &mut rig);
        assert!(approx_eq_vec3(rig.position, Vec3::Z));

        let mut turned = CameraRig {
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 0.5, &mut turned);
        assert!(approx_eq_vec3(turned.position, Vec3::X), "got {:?}", turned.position);
    }

    #[test]
    fn test_pitch_does_not_lift_forward_motion() {
        let controller = KeyboardMovementController::new(1.0, 1.0);
        let mut rig = CameraRig {
            rotation: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let input = MovementAxes {
            forward: 1.0,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 1.0, &mut rig);
        assert_eq!(rig.position.y, 0.0);
    }

    #[test]
    fn test_diagonal_is_normalised() {
        let controller = KeyboardMovementController::new(1.0, 1.0);
        let mut rig = CameraRig::default();
        let input = MovementAxes {
            forward: 1.0,
            right: 1.0,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 1.0, &mut rig);
        assert!((rig.position.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_up_is_negative_y() {
        let controller = KeyboardMovementController::new(1.0, 1.0);
        let mut rig = CameraRig::default();
        let input = MovementAxes {
            up: 1.0,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 1.0, &mut rig);
        assert!(approx_eq_vec3(rig.position, Vec3::NEG_Y));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let controller = KeyboardMovementController::new(1.0, 10.0);
        let mut rig = CameraRig::default();
        let input = MovementAxes {
            pitch: 1.0,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 1.0, &mut rig);
        assert_eq!(rig.rotation.x, PITCH_LIMIT);

        let input = MovementAxes {
            pitch: -1.0,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 1.0, &mut rig);
        assert_eq!(rig.rotation.x, -PITCH_LIMIT);
    }

    #[test]
    fn test_yaw_wraps_into_full_turn() {
        let controller = KeyboardMovementController::new(1.0, 1.0);
        let mut rig = CameraRig::default();
        let input = MovementAxes {
            yaw: -1.0,
            ..Default::default()
        };
        controller.move_in_plane_xz(&input, 0.5, &mut rig);
        assert!((0.0..TAU).contains(&rig.rotation.y));
        assert!((rig.rotation.y - (TAU - 0.5)).abs() < 1e-5);
    }
}
