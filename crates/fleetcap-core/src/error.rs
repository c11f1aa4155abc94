//! Error types for capacity normalization and configuration.

use thiserror::Error;

/// Result type alias for core capacity operations.
pub type CapacityResult<T> = Result<T, CapacityError>;

/// Errors raised while normalizing records or loading configuration.
///
/// Payloads are owned strings so the error can be cloned to every caller
/// sharing a cached load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("invalid size descriptor: {0}")]
    InvalidSizeDescriptor(String),

    #[error("invalid instance type: {0}")]
    InvalidInstanceType(String),

    #[error("config error: {0}")]
    Config(String),
}
