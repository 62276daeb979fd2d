//! Error types for the audit engine.

use thiserror::Error;

/// Failures reported by a document provider.
///
/// These are per-node and recoverable during a scan: callers log them and
/// degrade to the "absent" case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Text style lookup failed for '{style_id}': {reason}")]
    StyleLookup { style_id: String, reason: String },

    #[error("Font '{family} {style}' could not be loaded")]
    FontUnavailable { family: String, style: String },

    #[error("Page '{0}' could not be loaded")]
    PageLoad(String),

    #[error("Unknown page: {0}")]
    UnknownPage(String),
}

/// Request-level failures.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid document snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid scan options: {0}")]
    InvalidOptions(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;

impl AuditError {
    pub fn invalid_snapshot(msg: impl Into<String>) -> Self {
        Self::InvalidSnapshot(msg.into())
    }
}
