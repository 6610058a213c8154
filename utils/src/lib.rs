//! Shared utilities for the procura service.

pub mod logging;

pub use logging::{init_logging, LogFormat};
