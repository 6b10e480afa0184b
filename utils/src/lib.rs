//! Shared utilities for the EWM wallet engine.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
