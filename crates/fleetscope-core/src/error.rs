//! Configuration error types.
//!
//! These are the only failures allowed to escape an inspection pass.

use thiserror::Error;

/// Result type alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating configuration, before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("metrics namespace is not configured")]
    MissingNamespace,

    #[error("history window must be positive: earlier_days={earlier_days}, later_days={later_days}")]
    NonPositiveWindow { earlier_days: i64, later_days: i64 },

    #[error("history window misordered: earlier_days={earlier_days} must exceed later_days={later_days}")]
    MisorderedWindow { earlier_days: i64, later_days: i64 },

    #[error("{pool} worker width must be between 1 and {max}, got {width}")]
    InvalidWorkerWidth {
        pool: &'static str,
        width: usize,
        max: usize,
    },

    #[error("batch size must be between 1 and {max}, got {size}")]
    InvalidBatchSize { size: usize, max: usize },

    #[error("history page limit must be positive")]
    InvalidPageLimit,

    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),
}
