//! Error types for the Kindred domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Only
//! [`SynthesisError::Unauthorized`] is meant to reach callers in practice;
//! [`SourceError`] stays inside the aggregator, which recovers from it.

use thiserror::Error;

use crate::source::SourceDomain;

/// The top-level error type for synthesis operations.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// No valid authenticated user behind the handle.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The engine was built from settings it cannot run with.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using [`SynthesisError`].
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Failure of a single source read.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Not authorized to read: {0}")]
    Unauthorized(String),

    #[error("Read of {domain} failed: {reason}")]
    Backend { domain: SourceDomain, reason: String },

    #[error("Read of {domain} timed out after {after_ms}ms")]
    Timeout { domain: SourceDomain, after_ms: u64 },

    #[error("Malformed source data: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn backend(domain: SourceDomain, reason: impl Into<String>) -> Self {
        Self::Backend {
            domain,
            reason: reason.into(),
        }
    }
}
