use glam::Vec3;

use crate::render::TextureId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MeshId(pub usize);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ModelId(pub usize);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MaterialId(pub usize);

/// Surface description. Texture slots left as `None` have no resource.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub albedo: Vec3,
    pub emissive: Vec3,
    pub smoothness: f32,
    pub albedo_texture: Option<TextureId>,
    pub emissive_texture: Option<TextureId>,
    pub specular_texture: Option<TextureId>,
    pub normal_texture: Option<TextureId>,
    pub bump_texture: Option<TextureId>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            albedo: Vec3::ONE,
            emissive: Vec3::ZERO,
            smoothness: 0.0,
            albedo_texture: None,
            emissive_texture: None,
            specular_texture: None,
            normal_texture: None,
            bump_texture: None,
        }
    }

    pub fn with_albedo_texture(mut self, texture: TextureId) -> Self {
        self.albedo_texture = Some(texture);
        self
    }
}

/// A mesh plus one material per submesh.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: MeshId,
    pub materials: Vec<MaterialId>,
}
