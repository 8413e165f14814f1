//! Unified error handling.
//!
//! Provides a unified `Error` type for callers that drive the backend client
//! and configuration together (the CLI, for one). The local store never
//! surfaces storage failures, so they have no variant here.

use thiserror::Error;

use crate::backend::ApiError;
use crate::config::ConfigError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl Error {
    /// Whether this error points at a fault worth reporting to error
    /// tracking, as opposed to a user mistake.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(err, ApiError::NotFound(_) | ApiError::RateLimited(_)),
            Self::Config(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }
}

/// Result type alias for `Error`.
pub type Result<T> = std::result::Result<T, Error>;
