//! Core error types for Arena services.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the shared core: configuration loading and
/// validation. Request-level error kinds live with each service's API
/// layer, which owns their HTTP mapping.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),
}
