//! Procedural meshes.

use glam::{Vec2, Vec3};

use crate::mesh::MeshData;
use vkframe_rhi::vertex::Vertex;

/// Colour of every triangle [`sierpinski`] emits.
pub const SIERPINSKI_COLOR: Vec3 = Vec3::new(0.1, 0.1, 0.1);

struct Face {
    normal: Vec3,
    color: Vec3,
    corners: [Vec3; 4],
}

/// Unit cube centred on `offset`, one colour per face, indexed.
///
/// Faces in order: left (x-), right (x+), top (y-), bottom (y+), front (z+),
/// back (z-). Y points down, matching the camera's clip space.
pub fn cube(offset: Vec3) -> MeshData {
    let faces = [
        Face {
            normal: Vec3::NEG_X,
            color: Vec3::new(0.9, 0.9, 0.9),
            corners: [
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(-0.5, 0.5, 0.5),
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(-0.5, 0.5, -0.5),
            ],
        },
        Face {
            normal: Vec3::X,
            color: Vec3::new(0.8, 0.8, 0.1),
            corners: [
                Vec3::new(0.5, -0.5, -0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(0.5, 0.5, -0.5),
            ],
        },
        Face {
            normal: Vec3::NEG_Y,
            color: Vec3::new(0.9, 0.6, 0.1),
            corners: [
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(0.5, -0.5, -0.5),
            ],
        },
        Face {
            normal: Vec3::Y,
            color: Vec3::new(0.8, 0.1, 0.1),
            corners: [
                Vec3::new(-0.5, 0.5, -0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(-0.5, 0.5, 0.5),
                Vec3::new(0.5, 0.5, -0.5),
            ],
        },
        Face {
            normal: Vec3::Z,
            color: Vec3::new(0.1, 0.1, 0.8),
            corners: [
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(-0.5, 0.5, 0.5),
                Vec3::new(0.5, -0.5, 0.5),
            ],
        },
        Face {
            normal: Vec3::NEG_Z,
            color: Vec3::new(0.1, 0.8, 0.1),
            corners: [
                Vec3::new(-0.5, -0.5, -0.5),
                Vec3::new(0.5, 0.5, -0.5),
                Vec3::new(-0.5, 0.5, -0.5),
                Vec3::new(0.5, -0.5, -0.5),
            ],
        },
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in &faces {
        let base = vertices.len() as u32;
        vertices.extend(
            face.corners
                .iter()
                .map(|&corner| Vertex::new(corner + offset, face.color, face.normal, Vec2::ZERO)),
        );
        // Corners 0/1 are opposite, so the quad splits along that diagonal.
        indices.extend([0, 1, 2, 0, 3, 1].map(|i| base + i));
    }

    MeshData::indexed(vertices, indices)
}

/// Appends the triangles of a Sierpinski subdivision of `(a, b, c)` to `out`.
///
/// Each level emits the triangle joining the three edge midpoints and
/// recurses into the three corner triangles. Depth 0 emits nothing, so depth
/// `n` appends `3 * (3^n - 1) / 2` vertices.
pub fn sierpinski(depth: u32, a: Vec3, b: Vec3, c: Vec3, out: &mut Vec<Vertex>) {
    if depth == 0 {
        return;
    }

    let ab = (a + b) * 0.5;
    let bc = (b + c) * 0.5;
    let ac = (a + c) * 0.5;
    let normal = (bc - ab).cross(ac - ab).normalize_or_zero();

    out.extend(
        [ab, bc, ac]
            .map(|position| Vertex::new(position, SIERPINSKI_COLOR, normal, Vec2::ZERO)),
    );

    sierpinski(depth - 1, a, ab, ac, out);
    sierpinski(depth - 1, ab, b, bc, out);
    sierpinski(depth - 1, ac, bc, c, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        )
    }

    #[test]
    fn test_cube_is_valid_and_indexed() {
        let mesh = cube(Vec3::ZERO);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.draw_count(), 36);
    }

    #[test]
    fn test_cube_offset_moves_every_vertex() {
        let offset = Vec3::new(1.0, 2.0, 3.0);
        let centered = cube(Vec3::ZERO);
        let moved = cube(offset);
        for (a, b) in centered.vertices.iter().zip(&moved.vertices) {
            assert_eq!(a.position + offset, b.position);
        }
    }

    #[test]
    fn test_cube_faces_have_outward_normals() {
        let mesh = cube(Vec3::ZERO);
        for v in &mesh.vertices {
            assert!(v.position.dot(v.normal) > 0.0);
        }
    }

    #[test]
    fn test_sierpinski_depth_zero_emits_nothing() {
        let (a, b, c) = corners();
        let mut out = Vec::new();
        sierpinski(0, a, b, c, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sierpinski_vertex_counts() {
        let (a, b, c) = corners();
        for depth in 1..=6u32 {
            let mut out = Vec::new();
            sierpinski(depth, a, b, c, &mut out);
            assert_eq!(out.len(), 3 * (3usize.pow(depth) - 1) / 2);
        }
    }

    #[test]
    fn test_sierpinski_first_level_is_midpoints() {
        let (a, b, c) = corners();
        let mut out = Vec::new();
        sierpinski(1, a, b, c, &mut out);
        let positions: Vec<Vec3> = out.iter().map(|v| v.position).collect();
        assert_eq!(positions, vec![(a + b) * 0.5, (b + c) * 0.5, (a + c) * 0.5]);
        assert!(out.iter().all(|v| v.color == SIERPINSKI_COLOR));
    }

    #[test]
    fn test_sierpinski_appends_to_existing_output() {
        let (a, b, c) = corners();
        let mut out = vec![Vertex::default()];
        sierpinski(2, a, b, c, &mut out);
        assert_eq!(out.len(), 1 + 12);
    }
}
