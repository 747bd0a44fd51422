//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code only uses the
//! `log` facade; the `env_logger` backend is installed here on request.
//!
//! Targets worth knowing:
//! - `cinder_engine::state` traces every emitted state call at `trace`
//! - `cinder_engine::gl` reports shader compile/link diagnostics

mod init;

pub use init::{init_logging, LoggingConfig};
