//! Controller output fed through the camera, as the frame loop does it.

use glam::Vec3;
use vkframe_scene::{Camera, CameraRig, KeyboardMovementController, MovementAxes};

#[test]
fn test_walking_forward_brings_object_closer() {
    let controller = KeyboardMovementController::default();
    let mut rig = CameraRig::default();
    let mut camera = Camera::new();
    let object = Vec3::new(0.0, 0.0, 2.5);

    camera.set_view_yxz(rig.position, rig.rotation);
    let before = camera.view().transform_point3(object).z;

    let forward = MovementAxes {
        forward: 1.0,
        ..Default::default()
    };
    for _ in 0..10 {
        controller.move_in_plane_xz(&forward, 0.016, &mut rig);
    }
    camera.set_view_yxz(rig.position, rig.rotation);
    let after = camera.view().transform_point3(object).z;

    assert!(after < before);
    assert!((before - after - 3.0 * 0.16).abs() < 1e-4);
}

#[test]
fn test_turning_right_moves_object_left_on_screen() {
    let controller = KeyboardMovementController::default();
    let mut rig = CameraRig::default();
    let mut camera = Camera::new();
    camera.set_perspective_projection(50f32.to_radians(), 1.0, 0.1, 100.0);

    let turn_right = MovementAxes {
        yaw: 1.0,
        ..Default::default()
    };
    controller.move_in_plane_xz(&turn_right, 0.1, &mut rig);
    camera.set_view_yxz(rig.position, rig.rotation);

    let clip = camera
        .projection_view()
        .project_point3(Vec3::new(0.0, 0.0, 2.5));
    assert!(clip.x < 0.0);
}
