use std::collections::HashSet;
use std::num::NonZeroU64;

use crate::binding;
use crate::error::RenderError;
use crate::geometry::Mesh;
use crate::scene::{Material, MeshId, Model, Scene};
use crate::shader::{ProgramHandle, ProgramId, ProgramRegistry};
use crate::uniforms::{UniformBuffer, ENTITY_BLOCK_SIZE, GLOBALS_BLOCK_SIZE};

use super::ctx::{RenderCtx, RenderTarget};
use super::mode::RenderMode;
use super::pipelines::{PipelineKind, Pipelines};
use super::target::{DepthBuffer, OffscreenTarget};
use super::texture::{TextureId, TextureStore};

/// Everything a frame draws, borrowed from the engine for the duration of `render`.
pub struct FrameData<'a> {
    pub registry: &'a ProgramRegistry,
    pub meshes: &'a mut [Mesh],
    pub models: &'a [Model],
    pub materials: &'a [Material],
    pub textures: &'a TextureStore,
    pub scene: &'a Scene,
    /// Whether this frame's uniforms were packed; entities are not drawn otherwise.
    pub uniforms_packed: bool,
    /// Program for the quad passes (position at location 0, uv at location 1).
    pub quad_program: ProgramId,
    /// Program for entities (position, normal, uv at locations 0, 1, 2).
    pub mesh_program: ProgramId,
    pub quad_mesh: MeshId,
    pub composite_mesh: MeshId,
    pub quad_texture: TextureId,
}

/// Problems reported once rather than every frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Report {
    Broken(ProgramHandle),
    MissingAttribute(ProgramHandle, MeshId, usize),
    NoAlbedo(MeshId, usize),
}

/// GPU state shared by every pass.
struct DrawState {
    pipelines: Pipelines,
    uniform_buffer: wgpu::Buffer,
    globals_group: wgpu::BindGroup,
    entity_group: wgpu::BindGroup,
    reported: HashSet<Report>,
}

/// Issues the draw calls for the active [`RenderMode`].
pub struct Renderer {
    draw: DrawState,
    surface_depth: Option<DepthBuffer>,
    offscreen: OffscreenTarget,
    clear: wgpu::Color,
}

impl Renderer {
    /// Creates pipeline layouts, the GPU uniform buffer and the offscreen target.
    ///
    /// Fails with [`RenderError::FramebufferIncomplete`] when the offscreen
    /// target cannot be created at `size`.
    pub fn new(
        ctx: &RenderCtx<'_>,
        textures: &TextureStore,
        uniform_capacity: u64,
        clear: wgpu::Color,
    ) -> Result<Self, RenderError> {
        let device = ctx.device;
        let pipelines = Pipelines::new(device, ctx.surface_format, textures.layout());

        let needed = GLOBALS_BLOCK_SIZE.max(ENTITY_BLOCK_SIZE);
        if uniform_capacity < needed {
            return Err(RenderError::UniformOverflow { requested: needed, capacity: uniform_capacity });
        }

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism frame uniforms"),
            size: uniform_capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The shader's global block is a fixed `array<Light, 16>`, so the group
        // binds all of it; `FrameLayout::globals` covers only the bytes written.
        let globals_group = uniform_group(
            device,
            &pipelines.globals_layout,
            &uniform_buffer,
            GLOBALS_BLOCK_SIZE,
            "prism globals",
        );
        let entity_group = uniform_group(
            device,
            &pipelines.entity_layout,
            &uniform_buffer,
            ENTITY_BLOCK_SIZE,
            "prism entity",
        );

        let (w, h) = ctx.size;
        let offscreen = OffscreenTarget::new(device, ctx.surface_format, w, h, textures.layout())?;

        Ok(Self {
            draw: DrawState {
                pipelines,
                uniform_buffer,
                globals_group,
                entity_group,
                reported: HashSet::new(),
            },
            surface_depth: None,
            offscreen,
            clear,
        })
    }

    /// Copies the packed frame uniforms to the GPU.
    pub fn upload(&self, queue: &wgpu::Queue, uniforms: &UniformBuffer) {
        let bytes = uniforms.upload_bytes();
        if !bytes.is_empty() {
            queue.write_buffer(&self.draw.uniform_buffer, 0, bytes);
        }
    }

    /// Forgets GPU objects built for a program handle that has been replaced.
    pub fn evict_program(&mut self, handle: ProgramHandle, meshes: &mut [Mesh]) {
        self.draw.pipelines.evict(handle);
        let dropped: usize = meshes.iter_mut().map(|m| m.evict_program(handle)).sum();
        log::debug!("evicted {dropped} bindings for {handle:?}");
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mode: RenderMode,
        data: &mut FrameData<'_>,
    ) -> Result<(), RenderError> {
        let (w, h) = ctx.size;

        match mode {
            RenderMode::TexturedQuad => {
                let Some(group) = data
                    .textures
                    .bind_group(data.quad_texture)
                    .or_else(|| data.textures.bind_group(data.textures.white))
                else {
                    return Ok(());
                };
                self.draw.quad_pass(
                    ctx,
                    target.encoder,
                    target.color_view,
                    self.clear,
                    group,
                    data.quad_mesh,
                    data,
                );
            }

            RenderMode::Meshes => {
                if !self.surface_depth.as_ref().is_some_and(|d| d.matches(w, h)) {
                    self.surface_depth = Some(DepthBuffer::new(ctx.device, w, h, "prism surface depth"));
                }
                let Some(depth) = self.surface_depth.as_ref() else {
                    return Ok(());
                };
                self.draw.mesh_pass(ctx, target.encoder, target.color_view, &depth.view, self.clear, data);
            }

            RenderMode::FrameBufferPass => {
                if !self.offscreen.matches(w, h) {
                    self.offscreen = OffscreenTarget::new(
                        ctx.device,
                        ctx.surface_format,
                        w,
                        h,
                        data.textures.layout(),
                    )?;
                }
                let off = &self.offscreen;
                self.draw
                    .mesh_pass(ctx, target.encoder, &off.color_view, &off.depth.view, self.clear, data);
                self.draw.quad_pass(
                    ctx,
                    target.encoder,
                    target.color_view,
                    wgpu::Color::BLACK,
                    &off.bind_group,
                    data.composite_mesh,
                    data,
                );
            }
        }

        Ok(())
    }
}

impl DrawState {
    /// Clears `color` and draws one textured mesh with the quad program.
    #[allow(clippy::too_many_arguments)]
    fn quad_pass(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        clear: wgpu::Color,
        texture: &wgpu::BindGroup,
        mesh_id: MeshId,
        data: &mut FrameData<'_>,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism quad pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(program) = data.registry.get(data.quad_program) else { return };
        if self.reported.contains(&Report::Broken(program.handle())) {
            return;
        }
        if !self.pipelines.prepare(ctx.device, program) {
            self.report_once(Report::Broken(program.handle()), || {
                format!("program `{}` is not usable; quad skipped", program.name())
            });
            return;
        }
        let Some(module) = self.pipelines.module(program.handle()) else { return };
        let Some(mesh) = data.meshes.get_mut(mesh_id.0) else { return };

        rpass.set_bind_group(0, texture, &[]);

        for index in 0..mesh.submeshes().len() {
            let sub = &mut mesh.submeshes_mut()[index];
            let pipelines = &self.pipelines;
            match binding::find_or_create(sub, program, |vb| {
                pipelines.build(ctx.device, module, program, vb, PipelineKind::Quad)
            }) {
                Ok(b) => rpass.set_pipeline(b.pipeline()),
                Err(e) if e.is_shader_error() => {
                    if self.reported.insert(Report::Broken(program.handle())) {
                        log::warn!("{e}; quad skipped");
                    }
                    return;
                }
                Err(e) => {
                    let key = Report::MissingAttribute(program.handle(), mesh_id, index);
                    if self.reported.insert(key) {
                        log::warn!("{e}");
                    }
                    continue;
                }
            }
            draw_submesh(&mut rpass, mesh, index);
        }
    }

    /// Clears `color` and `depth`, then draws every entity with the mesh program.
    ///
    /// Only the clear happens when the frame's uniforms were not packed.
    fn mesh_pass(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear: wgpu::Color,
        data: &mut FrameData<'_>,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if !data.uniforms_packed {
            return;
        }
        let Some(program) = data.registry.get(data.mesh_program) else { return };
        if self.reported.contains(&Report::Broken(program.handle())) {
            return;
        }
        if !self.pipelines.prepare(ctx.device, program) {
            self.report_once(Report::Broken(program.handle()), || {
                format!("program `{}` is not usable; meshes skipped", program.name())
            });
            return;
        }
        let Some(module) = self.pipelines.module(program.handle()) else { return };

        rpass.set_bind_group(0, &self.globals_group, &[]);

        for entity in &data.scene.entities {
            let Some(model) = data.models.get(entity.model.0) else { continue };
            let Some(mesh) = data.meshes.get_mut(model.mesh.0) else { continue };

            let range = entity.uniform_range();
            if range.is_empty() {
                continue;
            }
            rpass.set_bind_group(1, &self.entity_group, &[range.offset as u32]);

            for index in 0..mesh.submeshes().len() {
                let albedo = model
                    .materials
                    .get(index)
                    .and_then(|m| data.materials.get(m.0))
                    .and_then(|m| m.albedo_texture)
                    .and_then(|t| data.textures.bind_group(t));
                let Some(albedo) = albedo else {
                    if self.reported.insert(Report::NoAlbedo(model.mesh, index)) {
                        log::warn!("submesh {index} of mesh {} has no albedo texture; skipped", model.mesh.0);
                    }
                    continue;
                };

                let sub = &mut mesh.submeshes_mut()[index];
                let pipelines = &self.pipelines;
                match binding::find_or_create(sub, program, |vb| {
                    pipelines.build(ctx.device, module, program, vb, PipelineKind::Mesh)
                }) {
                    Ok(b) => rpass.set_pipeline(b.pipeline()),
                    Err(e) if e.is_shader_error() => {
                        if self.reported.insert(Report::Broken(program.handle())) {
                            log::warn!("{e}; meshes skipped");
                        }
                        return;
                    }
                    Err(e) => {
                        let key = Report::MissingAttribute(program.handle(), model.mesh, index);
                        if self.reported.insert(key) {
                            log::warn!("{e}");
                        }
                        continue;
                    }
                }

                rpass.set_bind_group(2, albedo, &[]);
                draw_submesh(&mut rpass, mesh, index);
            }
        }
    }

    fn report_once(&mut self, key: Report, message: impl FnOnce() -> String) {
        if self.reported.insert(key) {
            log::warn!("{}", message());
        }
    }
}

/// Binds the submesh's slices of the shared buffers and issues its indexed draw.
fn draw_submesh(rpass: &mut wgpu::RenderPass<'_>, mesh: &Mesh, index: usize) {
    let Some(buffers) = mesh.buffers() else { return };
    let sub = &mesh.submeshes()[index];
    if sub.index_count() == 0 {
        return;
    }

    rpass.set_vertex_buffer(0, buffers.vertex.slice(sub.vertex_range().bounds()));
    rpass.set_index_buffer(buffers.index.slice(sub.index_range().bounds()), wgpu::IndexFormat::Uint32);
    rpass.draw_indexed(0..sub.index_count(), 0, 0..1);
}

fn uniform_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    size: u64,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(size),
            }),
        }],
    })
}
