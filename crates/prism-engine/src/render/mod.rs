//! GPU rendering.
//!
//! The renderer owns pipeline layouts, the GPU copy of the frame uniforms and
//! the render targets. Pipelines themselves live in each submesh's binding
//! cache, one per program handle.
//!
//! Convention:
//! - one pipeline serves the surface and the offscreen target (same color format)
//! - bind group 0 holds global parameters (or the texture for quad programs)
//! - bind group 1 holds the entity block, selected with a dynamic offset
//! - bind group 2 holds the albedo texture

mod ctx;
mod mode;
mod pipelines;
mod renderer;
mod target;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use mode::RenderMode;
pub use pipelines::{PipelineKind, Pipelines};
pub use renderer::{FrameData, Renderer};
pub use target::{validate_size, DepthBuffer, OffscreenTarget, DEPTH_FORMAT};
pub use texture::{
    create_sampler, texture_bind_group, texture_bind_group_layout, Texture, TextureFilter,
    TextureId, TextureStore,
};
