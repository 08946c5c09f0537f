//! Logging utilities.
//!
//! Centralizes logger initialization and startup diagnostics on top of the
//! `log` facade.

mod init;

pub use init::{init_logging, log_driver_info, LoggingConfig};
