//! Vertex layout shared by meshes and the default pipeline config.
//!
//! # Memory Layout
//!
//! - Offset 0: position (vec3)
//! - Offset 12: color (vec3)
//! - Offset 24: normal (vec3)
//! - Offset 36: uv (vec2)
//! - Total size: 44 bytes
//!
//! Shader locations follow field order, 0 through 3.

use std::mem::{offset_of, size_of};

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One mesh vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    #[inline]
    pub const fn new(position: Vec3, color: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            color,
            normal,
            uv,
        }
    }

    /// Position and color only; normal and uv are zero.
    #[inline]
    pub const fn colored(position: Vec3, color: Vec3) -> Self {
        Self::new(position, color, Vec3::ZERO, Vec2::ZERO)
    }

    /// One interleaved binding at slot 0, advanced per vertex.
    pub fn binding_descriptions() -> [vk::VertexInputBindingDescription; 1] {
        [vk::VertexInputBindingDescription {
            binding: 0,
            stride: size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 4] {
        let attribute = |location, format, offset: usize| vk::VertexInputAttributeDescription {
            binding: 0,
            location,
            format,
            offset: offset as u32,
        };
        [
            attribute(0, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, position)),
            attribute(1, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, color)),
            attribute(2, vk::Format::R32G32B32_SFLOAT, offset_of!(Self, normal)),
            attribute(3, vk::Format::R32G32_SFLOAT, offset_of!(Self, uv)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(size_of::<Vertex>(), 44);
    }

    #[test]
    fn test_binding_description() {
        let [binding] = Vertex::binding_descriptions();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, 44);
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    }

    #[test]
    fn test_attribute_offsets_and_locations() {
        let attrs = Vertex::attribute_descriptions();
        let offsets: Vec<u32> = attrs.iter().map(|a| a.offset).collect();
        let locations: Vec<u32> = attrs.iter().map(|a| a.location).collect();
        assert_eq!(offsets, vec![0, 12, 24, 36]);
        assert_eq!(locations, vec![0, 1, 2, 3]);
        assert_eq!(attrs[3].format, vk::Format::R32G32_SFLOAT);
    }

    #[test]
    fn test_colored_zeroes_normal_and_uv() {
        let v = Vertex::colored(Vec3::X, Vec3::ONE);
        assert_eq!(v.normal, Vec3::ZERO);
        assert_eq!(v.uv, Vec2::ZERO);
    }
}
