//! Per (submesh, program) vertex binding resolution and caching.
//!
//! A submesh can be drawn with any program whose inputs it provides. The first
//! draw with a given program handle resolves the program's inputs against the
//! submesh's buffer layout and builds a GPU object for the result; later draws
//! with the same handle reuse it.

use crate::error::RenderError;
use crate::geometry::{vertex_format, BufferLayout, ShaderInputLayout, Submesh};
use crate::shader::{Program, ProgramHandle};

/// One resolved vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoundAttribute {
    pub location: u32,
    pub component_count: u8,
    /// Absolute byte offset in the mesh's vertex buffer
    /// (attribute offset plus the submesh's vertex offset).
    pub offset: u64,
}

/// Result of matching a program's inputs against a submesh's layout.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexBinding {
    stride: u32,
    base_offset: u64,
    attributes: Vec<BoundAttribute>,
}

impl VertexBinding {
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Byte offset the vertex buffer slice starts at when drawing.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Attributes in the program's declaration order.
    pub fn attributes(&self) -> &[BoundAttribute] {
        &self.attributes
    }

    /// Offset of `attr` relative to the start of its vertex.
    pub fn relative_offset(&self, attr: &BoundAttribute) -> u64 {
        attr.offset - self.base_offset
    }

    /// Attribute descriptors for a vertex buffer slice starting at [`base_offset`](Self::base_offset).
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: vertex_format(a.component_count),
                offset: self.relative_offset(a),
                shader_location: a.location,
            })
            .collect()
    }
}

/// A cached binding: the resolved layout plus the GPU object built from it.
#[derive(Debug)]
pub struct Binding<P> {
    program: ProgramHandle,
    vertex: VertexBinding,
    pipeline: P,
}

impl<P> Binding<P> {
    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn vertex(&self) -> &VertexBinding {
        &self.vertex
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }
}

/// Matches every program input against `layout`.
///
/// Attributes the buffer carries but the program does not read are ignored.
/// An input the buffer lacks fails with [`RenderError::MissingAttribute`].
pub fn resolve(
    layout: &BufferLayout,
    vertex_offset: u64,
    inputs: &ShaderInputLayout,
    program: &str,
) -> Result<VertexBinding, RenderError> {
    let mut attributes = Vec::with_capacity(inputs.attributes().len());

    for input in inputs.attributes() {
        let Some(attr) = layout.find(input.location) else {
            return Err(RenderError::MissingAttribute {
                program: program.to_owned(),
                location: input.location,
            });
        };

        attributes.push(BoundAttribute {
            location: input.location,
            component_count: attr.component_count,
            offset: u64::from(attr.offset) + vertex_offset,
        });
    }

    Ok(VertexBinding {
        stride: layout.stride(),
        base_offset: vertex_offset,
        attributes,
    })
}

/// Returns the binding of `submesh` for the program's current handle, building it on first use.
///
/// `build` runs only on a cache miss, so a GPU object is created at most once
/// per (submesh, handle) pair. A failed build caches nothing.
pub fn find_or_create<'s, P>(
    submesh: &'s mut Submesh<P>,
    program: &Program,
    build: impl FnOnce(&VertexBinding) -> Result<P, RenderError>,
) -> Result<&'s Binding<P>, RenderError> {
    let handle = program.handle();

    let index = match submesh.bindings().iter().position(|b| b.program == handle) {
        Some(i) => i,
        None => {
            let vertex = resolve(
                submesh.layout(),
                submesh.vertex_offset(),
                program.inputs(),
                program.name(),
            )?;
            let pipeline = build(&vertex)?;

            log::debug!(
                "binding created for program `{}` ({:?}), {} attributes",
                program.name(),
                handle,
                vertex.attributes.len()
            );

            let bindings = submesh.bindings_mut();
            bindings.push(Binding { program: handle, vertex, pipeline });
            bindings.len() - 1
        }
    };

    Ok(&submesh.bindings()[index])
}
