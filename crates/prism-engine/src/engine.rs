//! The engine context: owns every subsystem and drives Init, Update and Render.

use std::path::Path;

use crate::assets::{import_obj, MaterialDesc};
use crate::config::EngineConfig;
use crate::error::RenderError;
use crate::geometry::{primitives, Mesh, SubmeshData};
use crate::input::{InputFrame, InputState, MouseButton};
use crate::overlay::{DriverInfo, InfoSnapshot};
use crate::render::{
    FrameData, RenderCtx, RenderMode, RenderTarget, Renderer, TextureFilter, TextureId, TextureStore,
};
use crate::scene::{Material, MaterialId, MeshId, Model, ModelId, Scene};
use crate::shader::{capabilities_for, FsReader, ProgramDesc, ProgramId, ProgramRegistry, SourceReader};
use crate::time::FrameStats;
use crate::uniforms::{FrameLayout, UniformBuffer, UniformPacker};

/// Explicit engine context.
///
/// Single-threaded: `update` and `render` are called back to back once per
/// frame from the window runtime.
pub struct Engine {
    config: EngineConfig,
    reader: Box<dyn SourceReader>,
    registry: ProgramRegistry,
    quad_program: ProgramId,
    mesh_program: ProgramId,

    meshes: Vec<Mesh>,
    models: Vec<Model>,
    materials: Vec<Material>,
    textures: TextureStore,
    quad_mesh: MeshId,
    composite_mesh: MeshId,
    quad_texture: TextureId,

    scene: Scene,
    packer: UniformPacker,
    uniforms: UniformBuffer,
    frame_layout: Option<FrameLayout>,

    renderer: Renderer,
    mode: RenderMode,
    stats: FrameStats,
    driver: DriverInfo,
}

impl Engine {
    /// Loads the programs, the built-in quads and textures, and creates the GPU
    /// side of the renderer.
    ///
    /// Fails on unreadable shader sources, an unusable uniform alignment, or an
    /// offscreen target that cannot be created. Shader compile errors are not
    /// fatal: the program stays broken until its source is fixed.
    pub fn new(
        ctx: &RenderCtx<'_>,
        limits: &wgpu::Limits,
        driver: DriverInfo,
        config: EngineConfig,
    ) -> Result<Self, RenderError> {
        Self::with_reader(ctx, limits, driver, config, Box::new(FsReader))
    }

    /// Like [`Engine::new`] with a custom shader source reader.
    pub fn with_reader(
        ctx: &RenderCtx<'_>,
        limits: &wgpu::Limits,
        driver: DriverInfo,
        config: EngineConfig,
        reader: Box<dyn SourceReader>,
    ) -> Result<Self, RenderError> {
        let device = ctx.device;

        let mut registry = ProgramRegistry::new();
        registry.set_reflect_on_reload(config.reflect_on_reload);
        registry.set_capabilities(capabilities_for(device.features()));
        let quad_program = registry.load(resolved(&config, &config.quad_program), reader.as_ref())?;
        let mesh_program = registry.load(resolved(&config, &config.mesh_program), reader.as_ref())?;

        let mut textures = TextureStore::new(device, ctx.queue);
        let quad_texture_path = config.resolve(&config.quad_texture);
        let quad_texture = textures
            .load(device, ctx.queue, &quad_texture_path, TextureFilter::Linear)
            .unwrap_or(textures.white);

        let mut quad = Mesh::new(vec![primitives::quad(0.8, false)]);
        quad.upload(device, "quad");
        let mut composite = Mesh::new(vec![primitives::quad(1.0, true)]);
        composite.upload(device, "composite");
        let meshes = vec![quad, composite];

        let packer = UniformPacker::new(u64::from(limits.min_uniform_buffer_offset_alignment))?;
        let capacity = config.uniform_capacity_for(u64::from(limits.max_uniform_buffer_binding_size));
        let uniforms = UniformBuffer::new(capacity);
        let renderer = Renderer::new(ctx, &textures, capacity, config.clear_color)?;
        log::info!(
            "uniform buffer: {capacity} bytes, entity alignment {}",
            packer.entity_alignment()
        );

        let mut scene = Scene { camera: config.camera, ..Default::default() };
        scene.camera.set_viewport(ctx.size.0, ctx.size.1);

        Ok(Self {
            mode: config.initial_mode,
            config,
            reader,
            registry,
            quad_program,
            mesh_program,
            meshes,
            models: Vec::new(),
            materials: Vec::new(),
            textures,
            quad_mesh: MeshId(0),
            composite_mesh: MeshId(1),
            quad_texture,
            scene,
            packer,
            uniforms,
            frame_layout: None,
            renderer,
            stats: FrameStats::default(),
            driver,
        })
    }

    /// Per-frame update: mode selection, shader hot reload, camera pan, then
    /// uniform packing.
    ///
    /// `dt` is the previous frame's duration in seconds.
    pub fn update(&mut self, dt: f32, input: &InputState, frame: &InputFrame) {
        self.stats.push(dt);

        let mode = self.mode.select(frame);
        if mode != self.mode {
            log::info!("render mode: {mode}");
            self.mode = mode;
        }

        for reload in self.registry.hot_reload(self.reader.as_ref()) {
            self.renderer.evict_program(reload.old, &mut self.meshes);
        }

        if input.button_down(MouseButton::Left) {
            let (dx, dy) = frame.pointer_delta;
            if dx != 0.0 || dy != 0.0 {
                self.scene.camera.pan(dx, dy);
            }
        }

        match self.packer.pack(&mut self.uniforms, &mut self.scene) {
            Ok(layout) => self.frame_layout = Some(layout),
            Err(e) => {
                log::error!("frame uniforms not packed: {e}");
                self.frame_layout = None;
            }
        }
    }

    /// Uploads the packed uniforms and draws the active mode into `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<(), RenderError> {
        self.renderer.upload(ctx.queue, &self.uniforms);

        let mut data = FrameData {
            registry: &self.registry,
            meshes: &mut self.meshes,
            models: &self.models,
            materials: &self.materials,
            textures: &self.textures,
            scene: &self.scene,
            uniforms_packed: self.frame_layout.is_some(),
            quad_program: self.quad_program,
            mesh_program: self.mesh_program,
            quad_mesh: self.quad_mesh,
            composite_mesh: self.composite_mesh,
            quad_texture: self.quad_texture,
        };
        self.renderer.render(ctx, target, self.mode, &mut data)
    }

    /// Imports an OBJ model with its materials and textures.
    ///
    /// Textures that fail to load leave their material slot empty; submeshes
    /// without an albedo texture are skipped when drawn.
    pub fn load_model(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        filter: TextureFilter,
    ) -> Result<ModelId, RenderError> {
        let imported = import_obj(path)?;
        log::info!(
            "model {}: {} submeshes, {} materials",
            path.display(),
            imported.submeshes.len(),
            imported.materials.len()
        );

        let first_material = self.materials.len();
        for desc in &imported.materials {
            let material = self.material_from(device, queue, desc, filter);
            self.materials.push(material);
        }
        let materials = imported
            .material_indices
            .iter()
            .map(|&i| MaterialId(first_material + i))
            .collect();

        let mesh = self.add_mesh(device, imported.submeshes, &path.display().to_string());
        Ok(self.add_model(Model { mesh, materials }))
    }

    /// Registers procedural geometry drawn with one material for every submesh.
    pub fn add_mesh_model(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        parts: Vec<SubmeshData>,
        material: Material,
    ) -> ModelId {
        let count = parts.len();
        let mesh = self.add_mesh(device, parts, label);
        let material = self.add_material(material);
        self.add_model(Model { mesh, materials: vec![material; count] })
    }

    pub fn load_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        filter: TextureFilter,
    ) -> Option<TextureId> {
        self.textures.load(device, queue, &self.config.resolve(path), filter)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    fn add_mesh(&mut self, device: &wgpu::Device, parts: Vec<SubmeshData>, label: &str) -> MeshId {
        let mut mesh = Mesh::new(parts);
        mesh.upload(device, label);
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    fn add_model(&mut self, model: Model) -> ModelId {
        self.models.push(model);
        ModelId(self.models.len() - 1)
    }

    fn material_from(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        desc: &MaterialDesc,
        filter: TextureFilter,
    ) -> Material {
        let mut load = |path: &Option<std::path::PathBuf>| {
            path.as_deref().and_then(|p| self.textures.load(device, queue, p, filter))
        };

        Material {
            name: desc.name.clone(),
            albedo: desc.albedo,
            emissive: desc.emissive,
            smoothness: desc.smoothness,
            albedo_texture: load(&desc.albedo_texture),
            emissive_texture: load(&desc.emissive_texture),
            specular_texture: load(&desc.specular_texture),
            normal_texture: load(&desc.normal_texture),
            bump_texture: load(&desc.bump_texture),
        }
    }

    /// Keeps the camera aspect in step with the drawable size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.scene.camera.set_viewport(width, height);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Layout of the last successful pack.
    pub fn frame_layout(&self) -> Option<&FrameLayout> {
        self.frame_layout.as_ref()
    }

    pub fn driver(&self) -> &DriverInfo {
        &self.driver
    }

    pub fn info_snapshot(&self) -> InfoSnapshot<'_> {
        InfoSnapshot {
            fps: self.stats.fps(),
            frame_time_ms: self.stats.frame_time_ms(),
            mode: self.mode,
            driver: &self.driver,
        }
    }
}

fn resolved(config: &EngineConfig, desc: &ProgramDesc) -> ProgramDesc {
    ProgramDesc { path: config.resolve(&desc.path), ..desc.clone() }
}
