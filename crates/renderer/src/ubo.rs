//! CPU-side mirrors of the shader interface blocks.
//!
//! These structures must match `shaders/simple_shader.vert` byte for byte.
//! All structures use `#[repr(C)]` for predictable memory layout and implement
//! `Pod` and `Zeroable` for safe byte casting.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use vkframe_scene::Transform;

/// Per-frame uniform block (set 0, binding 0).
///
/// # Memory Layout
///
/// - Offset 0: projection * view (64 bytes)
/// - Offset 64: light direction (12 bytes)
/// - Offset 76: padding (4 bytes)
/// - Total size: 80 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalUbo {
    pub projection_view: Mat4,
    /// Direction towards the light, normalised. Y is down.
    pub light_direction: Vec3,
    pub _padding: f32,
}

impl GlobalUbo {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(projection_view: Mat4) -> Self {
        Self {
            projection_view,
            ..Self::default()
        }
    }
}

impl Default for GlobalUbo {
    fn default() -> Self {
        Self {
            projection_view: Mat4::IDENTITY,
            light_direction: Vec3::new(1.0, -3.0, -1.0).normalize(),
            _padding: 0.0,
        }
    }
}

/// Per-draw push constant block.
///
/// # Memory Layout
///
/// - Offset 0: model matrix (64 bytes)
/// - Offset 64: normal matrix (64 bytes)
/// - Total size: 128 bytes, the minimum every device guarantees
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct SimplePushConstantData {
    pub transform: Mat4,
    pub normal_matrix: Mat4,
}

impl SimplePushConstantData {
    /// Size of the struct in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

impl From<&Transform> for SimplePushConstantData {
    fn from(transform: &Transform) -> Self {
        Self {
            transform: transform.mat4(),
            normal_matrix: transform.normal_matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_global_ubo_layout() {
        assert_eq!(GlobalUbo::SIZE, 80);
        assert_eq!(std::mem::align_of::<GlobalUbo>(), 16);
        assert_eq!(offset_of!(GlobalUbo, light_direction), 64);
    }

    #[test]
    fn test_push_constant_layout() {
        assert_eq!(SimplePushConstantData::SIZE, 128);
        assert_eq!(offset_of!(SimplePushConstantData, normal_matrix), 64);
    }

    #[test]
    fn test_default_light_is_normalised() {
        let ubo = GlobalUbo::default();
        assert!((ubo.light_direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(ubo.projection_view, Mat4::IDENTITY);
    }

    #[test]
    fn test_push_constants_from_transform() {
        let transform = Transform::new()
            .with_translation(Vec3::new(0.0, 0.5, 2.5))
            .with_scale(Vec3::new(3.0, 0.5, 3.0));
        let push = SimplePushConstantData::from(&transform);
        assert_eq!(push.transform, transform.mat4());
        assert_eq!(push.normal_matrix, transform.normal_matrix());
    }

    #[test]
    fn test_bytes_are_projection_view_first() {
        let projection_view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let ubo = GlobalUbo::new(projection_view);
        let bytes = bytemuck::bytes_of(&ubo);
        assert_eq!(bytes.len(), GlobalUbo::SIZE);
        assert_eq!(&bytes[..64], bytemuck::bytes_of(&projection_view));
    }
}
