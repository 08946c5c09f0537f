//! Procedural geometry.
//!
//! Texture coordinates follow the bottom-left origin convention used by model
//! files; images are flipped vertically on load to match.

use glam::Vec3;

use super::layout::BufferLayout;
use super::mesh::SubmeshData;

/// Locations used by the quad programs: position, texcoord.
pub const QUAD_ATTRIBUTES: [(u32, u8); 2] = [(0, 3), (1, 2)];

/// Locations used by the mesh programs: position, normal, texcoord.
pub const MESH_ATTRIBUTES: [(u32, u8); 3] = [(0, 3), (1, 3), (2, 2)];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Screen-space quad spanning `[-extent, extent]` on both axes.
///
/// With `flip_v` the texture is sampled top row first, as needed for render
/// targets whose first row is the top of the image.
pub fn quad(extent: f32, flip_v: bool) -> SubmeshData {
    let corners = [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    let mut vertices = Vec::with_capacity(corners.len() * 5);
    for (sx, sy) in corners {
        let u = (sx + 1.0) * 0.5;
        let v = (sy + 1.0) * 0.5;
        let v = if flip_v { 1.0 - v } else { v };
        vertices.extend_from_slice(&[sx * extent, sy * extent, 0.0, u, v]);
    }

    SubmeshData {
        layout: packed(&QUAD_ATTRIBUTES),
        vertices,
        indices: QUAD_INDICES.to_vec(),
    }
}

/// Unit cube centred on the origin, one flat-shaded face per side.
pub fn cube() -> SubmeshData {
    // (normal, u axis, v axis) with u × v = normal so faces wind counter-clockwise.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(faces.len() * 4 * 8);
    let mut indices = Vec::with_capacity(faces.len() * 6);

    for (face, (n, u, v)) in faces.into_iter().enumerate() {
        push_face(&mut vertices, n, u, v, 0.5);
        let base = face as u32 * 4;
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    SubmeshData {
        layout: packed(&MESH_ATTRIBUTES),
        vertices,
        indices,
    }
}

/// Unit plane on XZ facing +Y.
pub fn plane() -> SubmeshData {
    let mut vertices = Vec::with_capacity(4 * 8);
    push_face(&mut vertices, Vec3::ZERO, Vec3::X, Vec3::NEG_Z, 0.5);
    for normal in vertices.chunks_exact_mut(8) {
        normal[3..6].copy_from_slice(&[0.0, 1.0, 0.0]);
    }

    SubmeshData {
        layout: packed(&MESH_ATTRIBUTES),
        vertices,
        indices: QUAD_INDICES.to_vec(),
    }
}

fn push_face(out: &mut Vec<f32>, n: Vec3, u: Vec3, v: Vec3, half: f32) {
    for (sx, sy) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        let p = (n + u * sx + v * sy) * half;
        out.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, (sx + 1.0) * 0.5, (sy + 1.0) * 0.5]);
    }
}

fn packed(attrs: &[(u32, u8)]) -> BufferLayout {
    // Constant attribute tables: locations are distinct and counts in range.
    match BufferLayout::packed(attrs) {
        Ok(layout) => layout,
        Err(e) => unreachable!("built-in layout rejected: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_four_vertices() {
        let q = quad(0.8, false);
        assert_eq!(q.vertex_count(), 4);
        assert_eq!(q.layout.stride(), 20);
        assert_eq!(&q.vertices[0..5], &[-0.8, -0.8, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn flipped_quad_samples_top_row_at_bottom() {
        let q = quad(1.0, true);
        // bottom-left corner gets v = 1
        assert_eq!(q.vertices[4], 1.0);
    }

    #[test]
    fn cube_faces_wind_outward() {
        let c = cube();
        assert_eq!(c.vertex_count(), 24);
        assert_eq!(c.indices.len(), 36);

        for tri in c.indices.chunks_exact(3) {
            let pos = |i: u32| {
                let o = i as usize * 8;
                Vec3::new(c.vertices[o], c.vertices[o + 1], c.vertices[o + 2])
            };
            let nrm = {
                let o = tri[0] as usize * 8 + 3;
                Vec3::new(c.vertices[o], c.vertices[o + 1], c.vertices[o + 2])
            };
            let face_n = (pos(tri[1]) - pos(tri[0])).cross(pos(tri[2]) - pos(tri[0]));
            assert!(face_n.dot(nrm) > 0.0);
        }
    }

    #[test]
    fn plane_lies_flat() {
        let p = plane();
        for v in p.vertices.chunks_exact(8) {
            assert_eq!(v[1], 0.0);
            assert_eq!(&v[3..6], &[0.0, 1.0, 0.0]);
        }
    }
}
