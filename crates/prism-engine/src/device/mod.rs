//! GPU device and surface.
//!
//! Owns the wgpu instance, adapter, device, queue and the window surface, and
//! hands out one encoder per acquired frame.

mod gpu;

pub use gpu::{Gpu, GpuConfig, GpuFrame, SurfaceErrorAction};
