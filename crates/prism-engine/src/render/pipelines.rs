use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::binding::VertexBinding;
use crate::error::RenderError;
use crate::shader::{Program, ProgramHandle};
use crate::uniforms::{ENTITY_BLOCK_SIZE, GLOBALS_BLOCK_SIZE};

use super::target::DEPTH_FORMAT;

/// Which pipeline layout and fixed state a program is drawn with.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PipelineKind {
    /// Texture at group 0, no depth.
    Quad,
    /// Globals at group 0, entity block at group 1 (dynamic offset), texture at group 2,
    /// depth tested.
    Mesh,
}

/// Layouts shared by every pipeline plus a shader module per program handle.
pub struct Pipelines {
    pub globals_layout: wgpu::BindGroupLayout,
    pub entity_layout: wgpu::BindGroupLayout,
    quad_layout: wgpu::PipelineLayout,
    mesh_layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    modules: HashMap<ProgramHandle, wgpu::ShaderModule>,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let globals_layout = uniform_layout(device, "prism globals bgl", GLOBALS_BLOCK_SIZE, false);
        let entity_layout = uniform_layout(device, "prism entity bgl", ENTITY_BLOCK_SIZE, true);

        let quad_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism quad pipeline layout"),
            bind_group_layouts: &[texture_layout],
            immediate_size: 0,
        });
        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism mesh pipeline layout"),
            bind_group_layouts: &[&globals_layout, &entity_layout, texture_layout],
            immediate_size: 0,
        });

        Self {
            globals_layout,
            entity_layout,
            quad_layout,
            mesh_layout,
            color_format,
            modules: HashMap::new(),
        }
    }

    /// Creates the shader module for the program's current handle if needed.
    ///
    /// Returns `false` when the program did not compile or the device rejected
    /// the module. Nothing is cached in that case.
    pub fn prepare(&mut self, device: &wgpu::Device, program: &Program) -> bool {
        let Some(compiled) = program.compiled() else {
            return false;
        };
        if self.modules.contains_key(&program.handle()) {
            return true;
        }

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.name()),
            source: wgpu::ShaderSource::Wgsl(compiled.source.as_ref().into()),
        });
        if let Some(e) = pollster::block_on(scope.pop()) {
            log::error!("shader module `{}` rejected by the device: {e}", program.name());
            return false;
        }

        self.modules.insert(program.handle(), module);
        true
    }

    pub fn module(&self, handle: ProgramHandle) -> Option<&wgpu::ShaderModule> {
        self.modules.get(&handle)
    }

    /// Drops the shader module of a replaced handle.
    pub fn evict(&mut self, handle: ProgramHandle) {
        self.modules.remove(&handle);
    }

    /// Builds the render pipeline for one (submesh, program) binding.
    ///
    /// A pipeline the device rejects is a [`RenderError::ShaderLink`].
    pub fn build(
        &self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        program: &Program,
        vertex: &VertexBinding,
        kind: PipelineKind,
    ) -> Result<wgpu::RenderPipeline, RenderError> {
        let attributes = vertex.wgpu_attributes();
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: u64::from(vertex.stride()),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let (layout, depth_stencil) = match kind {
            PipelineKind::Quad => (&self.quad_layout, None),
            PipelineKind::Mesh => (
                &self.mesh_layout,
                Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
            ),
        };

        let desc = program.desc();
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.name()),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some(&desc.vertex_entry),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(&desc.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        match pollster::block_on(scope.pop()) {
            Some(e) => Err(RenderError::ShaderLink {
                program: program.name().to_owned(),
                log: e.to_string(),
            }),
            None => Ok(pipeline),
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    dynamic: bool,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}
