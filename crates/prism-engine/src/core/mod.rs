//! Contract between the window runtime and the application.
//!
//! The runtime owns the platform loop; applications see one `FrameCtx` per
//! redraw and never touch winit's event loop directly.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
