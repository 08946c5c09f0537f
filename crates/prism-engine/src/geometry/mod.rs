//! Vertex layouts, meshes and procedural primitives.
//!
//! A mesh owns one vertex buffer and one index buffer on the GPU; each
//! submesh addresses its own slice of both by byte offset.

mod layout;
mod mesh;
pub mod primitives;

pub use layout::{vertex_format, BufferAttribute, BufferLayout, ShaderAttribute, ShaderInputLayout};
pub use mesh::{Mesh, MeshBuffers, Submesh, SubmeshData};
