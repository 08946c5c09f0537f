//! Window and runtime loop.
//!
//! Owns the winit event loop and the single application window, and wires
//! them to the GPU layer and input state.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
