//! Error type for scenario loading and validation
//!
//! Numerical degradations (zero-length normalization, out-of-bounds index
//! inserts, depth-capped subdivision) are handled in place and never
//! surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value failed validation at initialization time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Shorthand for building an `InvalidConfig` error
pub(crate) fn invalid(msg: impl Into<String>) -> SimError {
    SimError::InvalidConfig(msg.into())
}
