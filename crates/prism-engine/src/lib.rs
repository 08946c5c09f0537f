//! Prism engine crate.
//!
//! Real-time rendering sandbox core: a geometry store, hot-reloadable WGSL
//! programs, a per-(submesh, program) binding cache, a frame uniform packer and
//! three switchable draw paths, plus the window, GPU and input runtime that
//! drives them.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;
pub mod logging;

pub mod assets;
pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod range;
pub mod render;
pub mod scene;
pub mod shader;
pub mod uniforms;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::RenderError;
pub use range::BufferRange;
