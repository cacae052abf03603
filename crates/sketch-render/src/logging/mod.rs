//! `env_logger` setup for sketch drivers.
//!
//! The renderer itself only emits through the `log` facade under the
//! `sketch_render` target: `info` for initialize and cleanup, `warn` for
//! uniforms the linker dropped, `debug` for shape uploads and per-frame
//! stats. Drivers that own the process call [`init_logging`] once at startup;
//! embedders with their own logger skip this module.

mod init;

pub use init::{init_logging, LoggingConfig};
