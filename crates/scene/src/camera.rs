//! Camera matrices in Vulkan clip space.
//!
//! The world is Y-down and the camera looks along +Z, so projections map
//! straight to Vulkan's clip space (Y down, depth 0..1) with no flip.

use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

/// Default up vector for [`Camera::set_view_direction`] and [`Camera::set_view_target`].
pub const WORLD_UP: Vec3 = Vec3::NEG_Y;

/// Projection and view matrices, recomputed by the caller every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box from `left..right`, `top..bottom`, `near..far` mapped to clip space.
    pub fn set_orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        // glam's bottom/top are the edges that land at clip y = -1/+1; with
        // Y down that is our top/bottom.
        self.projection = Mat4::orthographic_lh(left, right, top, bottom, near, far);
    }

    /// `fovy` in radians. `aspect` is width over height and must be non-zero.
    pub fn set_perspective_projection(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        assert!(aspect.abs() > f32::EPSILON, "aspect ratio must be non-zero");
        self.projection = Mat4::perspective_lh(fovy, aspect, near, far);
    }

    /// Places the eye at `position` looking along `direction`.
    ///
    /// `up` must not be parallel to `direction`.
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        let w = direction.normalize();
        let u = w.cross(up).normalize();
        let v = w.cross(u);

        self.view = Mat4::from_cols(
            Vec4::new(u.x, v.x, w.x, 0.0),
            Vec4::new(u.y, v.y, w.y, 0.0),
            Vec4::new(u.z, v.z, w.z, 0.0),
            Vec4::new(-u.dot(position), -v.dot(position), -w.dot(position), 1.0),
        );
    }

    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// Eye at `position` rotated by Euler angles applied Y, X, then Z.
    ///
    /// `rotation.x` is pitch, `rotation.y` yaw and `rotation.z` roll.
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let orientation = Quat::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z);
        self.view = Mat4::from_quat(orientation.inverse()) * Mat4::from_translation(-position);
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// `projection * view`, the matrix the global uniform block carries.
    pub fn projection_view(&self) -> Mat4 {
        self.projection * self.view
    }
}
