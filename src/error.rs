//! Error types for dutycalc

use thiserror::Error;

/// Main error type for dutycalc
///
/// Errors are reserved for infrastructure boundaries (rate providers,
/// malformed configuration, serialization). Business-logic gaps such as a
/// missing profile or an unavailable FX table never surface as errors —
/// the engine degrades to zero-value contributions instead, so an
/// estimate can never block checkout.
#[derive(Error, Debug)]
pub enum DutyError {
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    #[error("Profile store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for dutycalc operations
pub type Result<T> = std::result::Result<T, DutyError>;
