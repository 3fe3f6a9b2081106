//! Discovery error types.

use thiserror::Error;

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Failures reported by registry and history adapters.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("unit listing failed: {0}")]
    Listing(String),

    #[error("tag lookup failed for {handle}: {reason}")]
    TagLookup { handle: String, reason: String },

    #[error("history query failed for {resource_id}: {reason}")]
    HistoryQuery { resource_id: String, reason: String },

    #[error("invalid page token: {0}")]
    PageToken(String),

    #[error("failed to load fleet document: {0}")]
    Load(String),
}
