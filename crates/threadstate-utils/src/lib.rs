//! # threadstate utilities
//!
//! Shared utilities for the threadstate workspace: logging configuration and
//! initialization built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with, LogConfig, LogFormat, LogLevel, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
