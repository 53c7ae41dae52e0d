//! Crate-wide error taxonomy and result alias.
//!
//! Sync-engine propagation policy:
//! - `Normalization` errors are per-record; the orchestrator counts them and
//!   keeps going.
//! - `UpstreamUnavailable` is the only retryable class; the fetcher retries
//!   it with backoff before surfacing it.
//! - Everything else aborts the affected entity kind's sync and shows up in
//!   the aggregate report.

use thiserror::Error;

/// Errors raised across the dragonhold services
#[derive(Debug, Error)]
pub enum DragonholdError {
    /// Upstream CDN unreachable, or answered with a 5xx / empty version list
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Requested data version is not published upstream (HTTP 404)
    #[error("version '{version}' not published for {resource}")]
    VersionNotFound { version: String, resource: String },

    /// Payload fetched but not parseable as the expected JSON shape
    #[error("malformed upstream payload: {0}")]
    MalformedUpstreamData(String),

    /// A single record failed normalization; never aborts the batch
    #[error("record '{record_id}' rejected: {reason}")]
    Normalization { record_id: String, reason: String },

    /// Transaction-level write failure; the entity kind's batch rolled back
    #[error("write conflict: {0}")]
    WriteConflict(String),

    /// Store connectivity / query failure outside a sync transaction
    #[error("database error: {0}")]
    Database(String),

    /// Invalid startup configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl DragonholdError {
    /// Whether the fetcher should retry after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DragonholdError>;
