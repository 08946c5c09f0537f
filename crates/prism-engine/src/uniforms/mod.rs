//! Per-frame uniform data.
//!
//! One buffer holds the global parameters (camera, lights) followed by one
//! block per entity. Entity blocks are bound with dynamic offsets, so each
//! starts on the device's `min_uniform_buffer_offset_alignment`.

mod buffer;
mod packer;

pub use buffer::{align_up, UniformBuffer, UniformWriter};
pub use packer::{FrameLayout, UniformPacker, ENTITY_BLOCK_SIZE, GLOBALS_BLOCK_SIZE, MAX_SHADER_LIGHTS};
