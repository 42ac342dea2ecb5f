//! # ironds Utilities
//!
//! Shared helpers for the ironds binaries.
//!
//! Today that is logging: subscriber setup on top of `tracing`, configured
//! from the environment and command-line flags.

pub mod logging;

pub use logging::{init_logging, init_logging_with, LogConfig, LogFormat, LogLevel, LoggingError, LoggingGuard};
pub use tracing::{debug, error, info, trace, warn};
