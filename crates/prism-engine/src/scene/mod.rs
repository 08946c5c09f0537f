//! Scene contents: camera, lights and entities.
//!
//! Meshes, models and materials are owned by the engine and referenced here
//! by id.

mod camera;
mod entity;
mod light;
mod model;

pub use camera::Camera;
pub use entity::Entity;
pub use light::{Light, LightType};
pub use model::{Material, MaterialId, MeshId, Model, ModelId};

/// Everything the frame uniform packer reads.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub entities: Vec<Entity>,
}

impl Scene {
    pub fn add_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }
}
