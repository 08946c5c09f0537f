use wgpu::util::DeviceExt;

use crate::binding::Binding;
use crate::range::BufferRange;
use crate::shader::ProgramHandle;

use super::layout::BufferLayout;

/// CPU-side geometry for one submesh, as produced by importers and primitives.
#[derive(Debug, Clone)]
pub struct SubmeshData {
    pub layout: BufferLayout,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl SubmeshData {
    pub fn vertex_count(&self) -> usize {
        match self.layout.floats_per_vertex() {
            0 => 0,
            n => self.vertices.len() / n,
        }
    }
}

/// One drawable piece of a mesh.
///
/// Vertex data is immutable after construction. The binding cache grows lazily,
/// one entry per program handle the submesh has been drawn with.
///
/// `P` is the GPU object stored with each binding (a render pipeline in the
/// renderer); it is generic so the cache can be exercised without a device.
#[derive(Debug)]
pub struct Submesh<P = wgpu::RenderPipeline> {
    layout: BufferLayout,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    vertex_offset: u64,
    index_offset: u64,
    bindings: Vec<Binding<P>>,
}

impl<P> Submesh<P> {
    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Byte offset of the first vertex inside the mesh's vertex buffer.
    pub fn vertex_offset(&self) -> u64 {
        self.vertex_offset
    }

    /// Byte offset of the first index inside the mesh's index buffer.
    pub fn index_offset(&self) -> u64 {
        self.index_offset
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_range(&self) -> BufferRange {
        BufferRange::new(self.vertex_offset, byte_len(&self.vertices))
    }

    pub fn index_range(&self) -> BufferRange {
        BufferRange::new(self.index_offset, byte_len(&self.indices))
    }

    pub fn bindings(&self) -> &[Binding<P>] {
        &self.bindings
    }

    pub(crate) fn bindings_mut(&mut self) -> &mut Vec<Binding<P>> {
        &mut self.bindings
    }

    /// Drops bindings keyed by `handle`. Returns how many were removed.
    pub fn evict_program(&mut self, handle: ProgramHandle) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.program() != handle);
        before - self.bindings.len()
    }
}

/// Shared GPU buffers every submesh of a mesh slices into.
#[derive(Debug)]
pub struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
}

/// Ordered submeshes sharing one vertex buffer and one index buffer.
#[derive(Debug)]
pub struct Mesh<P = wgpu::RenderPipeline> {
    submeshes: Vec<Submesh<P>>,
    buffers: Option<MeshBuffers>,
}

impl<P> Mesh<P> {
    /// Lays submeshes out back to back and records their byte offsets.
    pub fn new(parts: Vec<SubmeshData>) -> Self {
        let mut vertex_offset = 0u64;
        let mut index_offset = 0u64;
        let mut submeshes = Vec::with_capacity(parts.len());

        for part in parts {
            debug_assert!(
                part.layout.floats_per_vertex() == 0
                    || part.vertices.len() % part.layout.floats_per_vertex() == 0,
                "vertex data is not a whole number of vertices"
            );

            let vertex_bytes = byte_len(&part.vertices);
            let index_bytes = byte_len(&part.indices);

            submeshes.push(Submesh {
                layout: part.layout,
                vertices: part.vertices,
                indices: part.indices,
                vertex_offset,
                index_offset,
                bindings: Vec::new(),
            });

            vertex_offset += vertex_bytes;
            index_offset += index_bytes;
        }

        Self { submeshes, buffers: None }
    }

    pub fn submeshes(&self) -> &[Submesh<P>] {
        &self.submeshes
    }

    pub fn submeshes_mut(&mut self) -> &mut [Submesh<P>] {
        &mut self.submeshes
    }

    /// Concatenated vertex data of all submeshes.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for s in &self.submeshes {
            out.extend_from_slice(bytemuck::cast_slice(&s.vertices));
        }
        out
    }

    /// Concatenated index data of all submeshes.
    pub fn index_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for s in &self.submeshes {
            out.extend_from_slice(bytemuck::cast_slice(&s.indices));
        }
        out
    }

    /// Creates the shared GPU buffers. Meshes without geometry stay CPU-only.
    pub fn upload(&mut self, device: &wgpu::Device, label: &str) {
        let vertices = self.vertex_bytes();
        let indices = self.index_bytes();
        if vertices.is_empty() || indices.is_empty() {
            log::warn!("mesh `{label}` has no geometry; skipping upload");
            return;
        }

        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("prism {label} vbo")),
            contents: &vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("prism {label} ibo")),
            contents: &indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        self.buffers = Some(MeshBuffers { vertex, index });
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }

    /// Drops bindings keyed by `handle` in every submesh.
    pub fn evict_program(&mut self, handle: ProgramHandle) -> usize {
        self.submeshes.iter_mut().map(|s| s.evict_program(handle)).sum()
    }
}

fn byte_len<T>(items: &[T]) -> u64 {
    std::mem::size_of_val(items) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(floats: usize, indices: usize) -> SubmeshData {
        SubmeshData {
            layout: BufferLayout::packed(&[(0, 3), (2, 2)]).unwrap(),
            vertices: vec![0.5; floats],
            indices: (0..indices as u32).collect(),
        }
    }

    #[test]
    fn offsets_accumulate_in_bytes() {
        let mesh: Mesh<()> = Mesh::new(vec![part(10, 3), part(20, 6), part(5, 3)]);
        let offs: Vec<(u64, u64)> = mesh
            .submeshes()
            .iter()
            .map(|s| (s.vertex_offset(), s.index_offset()))
            .collect();
        assert_eq!(offs, vec![(0, 0), (40, 12), (120, 36)]);
    }

    #[test]
    fn concatenated_bytes_cover_all_submeshes() {
        let mesh: Mesh<()> = Mesh::new(vec![part(10, 3), part(20, 6)]);
        assert_eq!(mesh.vertex_bytes().len(), 120);
        assert_eq!(mesh.index_bytes().len(), 36);
        let last = &mesh.submeshes()[1];
        assert_eq!(last.vertex_range().end(), 120);
        assert_eq!(last.index_range().end(), 36);
    }

    #[test]
    fn vertex_count_uses_layout_stride() {
        assert_eq!(part(10, 3).vertex_count(), 2);
    }

    #[test]
    fn index_count_matches_indices() {
        let mesh: Mesh<()> = Mesh::new(vec![part(5, 6)]);
        assert_eq!(mesh.submeshes()[0].index_count(), 6);
        assert!(mesh.buffers().is_none());
    }
}
