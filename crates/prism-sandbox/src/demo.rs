//! Demo scene: three copies of one model chasing each other over a floor,
//! lit by three colored point lights.

use std::path::Path;

use anyhow::Context;
use glam::{Mat4, Vec3};

use prism_engine::geometry::primitives;
use prism_engine::render::TextureFilter;
use prism_engine::scene::{Entity, Light, Material, ModelId, Scene};
use prism_engine::Engine;

const CENTER: Vec3 = Vec3::new(0.0, 1.8, 0.0);
const PULSER_POSITION: Vec3 = Vec3::new(0.0, 1.8, -2.5);
const LIGHT_LIFT: Vec3 = Vec3::new(0.0, 0.1, 0.0);
/// Rotation applied to the central entity every frame.
const SPIN_DEGREES: f32 = 1.0;

/// Indices of the animated parts of the scene.
#[derive(Debug, Clone, Copy)]
pub struct Demo {
    spinner: usize,
    orbiter: usize,
    pulser: usize,
    light: usize,
}

impl Demo {
    /// Loads the demo assets into `engine` and populates its scene.
    pub fn build(
        engine: &mut Engine,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let subject = match model {
            Some(path) => engine
                .load_model(device, queue, path, TextureFilter::Linear)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => {
                let texture = engine
                    .load_texture(device, queue, Path::new("textures/crate.bmp"), TextureFilter::Linear)
                    .unwrap_or(engine.textures().magenta);
                let material = Material::new("crate").with_albedo_texture(texture);
                engine.add_mesh_model(device, "cube", vec![primitives::cube()], material)
            }
        };

        let floor_texture = engine
            .load_texture(device, queue, Path::new("textures/grid.bmp"), TextureFilter::Nearest)
            .unwrap_or(engine.textures().white);
        let floor = engine.add_mesh_model(
            device,
            "floor",
            vec![primitives::plane()],
            Material::new("floor").with_albedo_texture(floor_texture),
        );

        Ok(Self::populate(engine.scene_mut(), subject, floor))
    }

    /// Places the entities and lights.
    pub fn populate(scene: &mut Scene, subject: ModelId, floor: ModelId) -> Self {
        let place = |position: Vec3, scale: f32| {
            Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale))
        };

        let spinner = scene.add_entity(Entity::new(place(CENTER, 0.5), subject));
        let orbiter = scene.add_entity(Entity::new(place(Vec3::new(2.5, 1.8, 0.0), 0.3), subject));
        let pulser = scene.add_entity(Entity::new(place(PULSER_POSITION, 0.2), subject));
        scene.add_entity(Entity::new(place(Vec3::ZERO, 5.0), floor));

        let light = scene.add_light(Light::point(Vec3::X, LIGHT_LIFT));
        scene.add_light(Light::point(Vec3::Y, Vec3::new(1.0, 3.0, 1.5)));
        scene.add_light(Light::point(Vec3::Z, Vec3::new(-1.0, 3.0, 1.5)));

        Self { spinner, orbiter, pulser, light }
    }

    /// Advances the animation by one frame.
    ///
    /// The spinner turns about its own Y axis; the orbiter rides its forward
    /// axis, the pulser scales with it and the first light circles with it.
    pub fn animate(&self, scene: &mut Scene) {
        let Some(spinner) = scene.entities.get_mut(self.spinner) else {
            return;
        };
        spinner.transform *= Mat4::from_rotation_y(SPIN_DEGREES.to_radians());
        let forward = spinner.transform.z_axis.truncate();

        if let Some(orbiter) = scene.entities.get_mut(self.orbiter) {
            orbiter.transform =
                Mat4::from_translation(forward * 3.0 + CENTER) * Mat4::from_scale(Vec3::splat(0.3));
        }
        if let Some(pulser) = scene.entities.get_mut(self.pulser) {
            pulser.transform =
                Mat4::from_translation(PULSER_POSITION) * Mat4::from_scale(Vec3::splat(forward.x));
        }
        if let Some(light) = scene.lights.get_mut(self.light) {
            light.position = forward * 5.0 + LIGHT_LIFT;
        }
    }
}
