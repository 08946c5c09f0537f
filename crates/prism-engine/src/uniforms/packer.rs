use crate::error::RenderError;
use crate::range::BufferRange;
use crate::scene::Scene;

use super::buffer::{align_up, UniformBuffer};

/// Bytes per entity block: model matrix then world-view-projection matrix.
pub const ENTITY_BLOCK_SIZE: u64 = 128;

/// Lights the mesh shaders read; extra lights are packed but ignored.
pub const MAX_SHADER_LIGHTS: usize = 16;

/// Size of the shader's global parameter block (header plus `MAX_SHADER_LIGHTS` 64-byte records).
pub const GLOBALS_BLOCK_SIZE: u64 = 16 + MAX_SHADER_LIGHTS as u64 * 64;

const LIGHT_ALIGNMENT: u64 = 16;

/// Where the global block and each light landed in the last pack.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FrameLayout {
    pub globals: BufferRange,
    pub lights: Vec<BufferRange>,
}

/// Packs camera, lights and per-entity matrices into one uniform buffer.
///
/// Layout, starting at offset 0:
///
/// ```text
/// camera position  vec3   @0
/// light count      u32    @12
/// per light (each record starts 16-aligned):
///     type u32, strength u32, color vec3, direction vec3, position vec3
/// per entity (each block starts at the device's dynamic-offset alignment):
///     model mat4, world-view-projection mat4
/// ```
#[derive(Debug, Copy, Clone)]
pub struct UniformPacker {
    entity_alignment: u64,
}

impl UniformPacker {
    pub fn new(entity_alignment: u64) -> Result<Self, RenderError> {
        align_up(0, entity_alignment)?;
        Ok(Self { entity_alignment })
    }

    pub fn entity_alignment(&self) -> u64 {
        self.entity_alignment
    }

    /// Rewrites the whole buffer from `scene` and records each entity's range.
    ///
    /// Packing the same scene twice yields identical bytes and ranges. On
    /// overflow, entities that did not fit are left with an empty range.
    pub fn pack(&self, buf: &mut UniformBuffer, scene: &mut Scene) -> Result<FrameLayout, RenderError> {
        for entity in &mut scene.entities {
            entity.set_uniform_range(BufferRange::default());
        }

        let view_proj = scene.camera.view_projection();
        let mut w = buf.map();

        w.push_vec3(scene.camera.position)?;
        w.push_u32(scene.lights.len() as u32)?;

        let mut lights = Vec::with_capacity(scene.lights.len());
        for light in &scene.lights {
            let start = w.align(LIGHT_ALIGNMENT)?;
            w.push_u32(light.kind as u32)?;
            w.push_u32(light.strength)?;
            w.push_vec3(light.color)?;
            w.push_vec3(light.direction)?;
            w.push_vec3(light.position)?;
            lights.push(BufferRange::new(start, w.head() - start));
        }

        let globals = BufferRange::new(0, w.head());

        for entity in &mut scene.entities {
            let start = w.align(self.entity_alignment)?;
            w.push_mat4(&entity.transform)?;
            w.push_mat4(&(view_proj * entity.transform))?;
            entity.set_uniform_range(BufferRange::new(start, w.head() - start));
        }

        w.unmap();
        Ok(FrameLayout { globals, lights })
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::scene::{Entity, Light, ModelId};

    fn scene(lights: usize, entities: usize) -> Scene {
        let mut s = Scene::default();
        for i in 0..lights {
            s.add_light(Light::point(Vec3::X, Vec3::splat(i as f32)));
        }
        for i in 0..entities {
            s.add_entity(Entity::new(Mat4::from_translation(Vec3::Y * i as f32), ModelId(0)));
        }
        s
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_ne_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        f32::from_bits(u32_at(bytes, offset))
    }

    // ── globals ───────────────────────────────────────────────────────────

    #[test]
    fn light_records_start_on_16_bytes() {
        let mut buf = UniformBuffer::new(4096);
        let mut s = scene(2, 0);
        let layout = UniformPacker::new(256).unwrap().pack(&mut buf, &mut s).unwrap();

        assert_eq!(layout.lights, vec![BufferRange::new(16, 60), BufferRange::new(80, 60)]);
        assert_eq!(layout.globals, BufferRange::new(0, 140));
    }

    #[test]
    fn header_and_light_fields_land_at_shader_offsets() {
        let mut buf = UniformBuffer::new(4096);
        let mut s = scene(2, 0);
        s.camera.position = Vec3::new(4.0, 5.0, 6.0);
        s.lights[1].strength = 3;
        s.lights[1].color = Vec3::new(0.25, 0.5, 0.75);
        UniformPacker::new(256).unwrap().pack(&mut buf, &mut s).unwrap();

        let b = buf.upload_bytes();
        assert_eq!(f32_at(b, 8), 6.0);
        assert_eq!(u32_at(b, 12), 2);
        assert_eq!(u32_at(b, 80), 1); // point
        assert_eq!(u32_at(b, 84), 3);
        assert_eq!(f32_at(b, 80 + 16 + 4), 0.5);
        assert_eq!(f32_at(b, 80 + 48 + 8), 1.0); // position.z of light 1
    }

    #[test]
    fn no_lights_leaves_header_only() {
        let mut buf = UniformBuffer::new(256);
        let layout = UniformPacker::new(256).unwrap().pack(&mut buf, &mut scene(0, 0)).unwrap();
        assert_eq!(layout.globals, BufferRange::new(0, 16));
        assert!(layout.lights.is_empty());
    }

    #[test]
    fn globals_block_matches_shader_struct() {
        assert_eq!(GLOBALS_BLOCK_SIZE, 1040);
    }

    // ── entities ──────────────────────────────────────────────────────────

    #[test]
    fn entity_blocks_are_aligned_and_disjoint() {
        let mut buf = UniformBuffer::new(4096);
        let mut s = scene(2, 3);
        UniformPacker::new(256).unwrap().pack(&mut buf, &mut s).unwrap();

        let ranges: Vec<BufferRange> = s.entities.iter().map(|e| e.uniform_range()).collect();
        assert_eq!(
            ranges,
            vec![
                BufferRange::new(256, ENTITY_BLOCK_SIZE),
                BufferRange::new(512, ENTITY_BLOCK_SIZE),
                BufferRange::new(768, ENTITY_BLOCK_SIZE),
            ]
        );
        for (i, a) in ranges.iter().enumerate() {
            assert_eq!(a.offset % 256, 0);
            for b in &ranges[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
        assert_eq!(buf.written(), 768 + 128);
    }

    #[test]
    fn entity_block_holds_model_then_mvp() {
        let mut buf = UniformBuffer::new(4096);
        let mut s = scene(0, 1);
        s.entities[0].transform = Mat4::from_translation(Vec3::new(7.0, 8.0, 9.0));
        UniformPacker::new(64).unwrap().pack(&mut buf, &mut s).unwrap();

        let b = buf.upload_bytes();
        let start = s.entities[0].uniform_range().offset as usize;
        assert_eq!(start, 64);
        // column 3 of the model matrix holds the translation
        assert_eq!(f32_at(b, start + 48), 7.0);
        let mvp = s.camera.view_projection() * s.entities[0].transform;
        assert_eq!(f32_at(b, start + 64), mvp.x_axis.x);
    }

    #[test]
    fn pack_is_idempotent() {
        let packer = UniformPacker::new(256).unwrap();
        let mut s = scene(3, 2);

        let mut buf = UniformBuffer::new(4096);
        let first_layout = packer.pack(&mut buf, &mut s).unwrap();
        let first_bytes = buf.upload_bytes().to_vec();
        let first_ranges: Vec<_> = s.entities.iter().map(|e| e.uniform_range()).collect();

        let second_layout = packer.pack(&mut buf, &mut s).unwrap();
        assert_eq!(first_layout, second_layout);
        assert_eq!(buf.upload_bytes(), &first_bytes[..]);
        let second_ranges: Vec<_> = s.entities.iter().map(|e| e.uniform_range()).collect();
        assert_eq!(first_ranges, second_ranges);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn too_many_entities_overflow() {
        let mut buf = UniformBuffer::new(512);
        let err = UniformPacker::new(256).unwrap().pack(&mut buf, &mut scene(1, 2)).unwrap_err();
        assert!(matches!(err, RenderError::UniformOverflow { capacity: 512, .. }));
    }

    #[test]
    fn alignment_must_be_power_of_two() {
        assert!(matches!(UniformPacker::new(48), Err(RenderError::InvalidAlignment(48))));
    }

    #[test]
    fn overflow_leaves_no_stale_ranges() {
        let packer = UniformPacker::new(256).unwrap();
        let mut buf = UniformBuffer::new(768);
        let mut s = scene(0, 2);
        packer.pack(&mut buf, &mut s).unwrap();
        assert_eq!(s.entities[0].uniform_range(), BufferRange::new(256, ENTITY_BLOCK_SIZE));
        assert_eq!(s.entities[1].uniform_range(), BufferRange::new(512, ENTITY_BLOCK_SIZE));

        // Four lights push the globals past 256, so only one entity block fits.
        for _ in 0..4 {
            s.add_light(Light::point(Vec3::Z, Vec3::ZERO));
        }
        let err = packer.pack(&mut buf, &mut s).unwrap_err();
        assert!(matches!(err, RenderError::UniformOverflow { capacity: 768, .. }));

        let a = s.entities[0].uniform_range();
        let b = s.entities[1].uniform_range();
        assert_eq!(a, BufferRange::new(512, ENTITY_BLOCK_SIZE));
        assert!(b.is_empty());
        assert!(!a.overlaps(&b));
    }
}
