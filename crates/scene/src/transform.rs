//! Per-object placement.
//!
//! This module provides the [`Transform`] struct for the translation,
//! rotation, and scale of a scene object. Matrices are computed on demand
//! and never cached, since objects are expected to move every frame.
//!
//! The world is Y-down with +Z pointing away from the viewer, matching
//! Vulkan clip space.
//!
//! # Example
//!
//! ```
//! use vkframe_scene::Transform;
//! use glam::Vec3;
//!
//! let t = Transform::new()
//!     .with_translation(Vec3::new(0.0, 0.0, 2.5))
//!     .with_scale(Vec3::splat(0.5));
//!
//! let p = t.mat4().transform_point3(Vec3::new(1.0, 0.0, 0.0));
//! assert!((p - Vec3::new(0.5, 0.0, 2.5)).length() < 1e-5);
//! ```

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Translation, rotation, and scale of one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create an identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity transform rotated by Tait-Bryan angles applied Y, then X, then Z.
    ///
    /// `euler.x` is pitch, `euler.y` yaw and `euler.z` roll, in radians.
    pub fn from_yxz(euler: Vec3) -> Self {
        Self::new().with_rotation(Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z))
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Inverse transpose of the model matrix's upper 3x3, widened to a `Mat4`.
    ///
    /// Keeps normals perpendicular to surfaces under non-uniform scale. A
    /// degenerate transform (any zero scale axis) yields the identity rather
    /// than NaNs.
    pub fn normal_matrix(&self) -> Mat4 {
        const EPSILON: f32 = 1e-6;

        let linear = Mat3::from_mat4(self.mat4());
        if linear.determinant().abs() < EPSILON {
            return Mat4::IDENTITY;
        }
        Mat4::from_mat3(linear.inverse().transpose())
    }

    /// Direction the object faces (+Z when unrotated).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Up is -Y when unrotated.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.translation, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_mat4_scales_before_translating() {
        let t = Transform::new()
            .with_translation(Vec3::new(10.0, 0.0, 0.0))
            .with_scale(Vec3::splat(2.0));
        let p = t.mat4().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx_eq_vec3(p, Vec3::new(12.0, 0.0, 0.0)), "got {p:?}");
    }

    #[test]
    fn test_mat4_rotates_about_y() {
        let t = Transform::new().with_rotation(Quat::from_rotation_y(FRAC_PI_2));
        let p = t.mat4().transform_point3(Vec3::X);
        assert!(approx_eq_vec3(p, Vec3::NEG_Z), "got {p:?}");
    }

    #[test]
    fn test_normal_matrix_identity() {
        assert_eq!(Transform::default().normal_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        let t = Transform::new()
            .with_translation(Vec3::new(3.0, -1.0, 2.0))
            .with_scale(Vec3::new(1.0, 2.0, 4.0));
        let normal = t.normal_matrix();

        // Translation must not leak into the normal transform.
        assert_eq!(normal.w_axis, glam::Vec4::W);
        assert!(approx_eq_vec3(
            normal.transform_vector3(Vec3::ONE),
            Vec3::new(1.0, 0.5, 0.25)
        ));
    }

    #[test]
    fn test_normal_stays_perpendicular_under_scale() {
        let t = Transform::new().with_scale(Vec3::new(3.0, 1.0, 1.0));
        // Surface containing the tangent (1, -1, 0) with normal (1, 1, 0).
        let tangent = t.mat4().transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        let normal = t.normal_matrix().transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert!(tangent.dot(normal).abs() < EPSILON);
    }

    #[test]
    fn test_normal_matrix_non_invertible() {
        let normal = Transform::new().with_scale(Vec3::ZERO).normal_matrix();
        assert_eq!(normal, Mat4::IDENTITY);
        assert!(!normal.is_nan());
    }

    #[test]
    fn test_direction_vectors() {
        let t = Transform::default();
        assert_eq!(t.forward(), Vec3::Z);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.up(), Vec3::NEG_Y);
    }

    #[test]
    fn test_from_yxz_yaw_turns_forward() {
        let t = Transform::from_yxz(Vec3::new(0.0, FRAC_PI_2, 0.0));
        assert!(approx_eq_vec3(t.forward(), Vec3::X), "got {:?}", t.forward());
        assert_eq!(t.translation, Vec3::ZERO);
    }
}
