//! # Store Error Types
//!
//! Error types for snapshot persistence operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io::Error / reqwest::Error / serde_json::Error                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Sync agent ← Logs at error level and keeps running                    │
//! │                                                                         │
//! │  Persistence failures never surface to the user: the in-memory        │
//! │  ledger stays authoritative and the next flush retries naturally.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File read or write failed.
    ///
    /// ## When This Occurs
    /// - Data directory is not writable
    /// - Disk full
    /// - Snapshot file deleted between temp write and rename
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - Corrupt local snapshot file
    /// - Remote document with an incompatible shape
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote endpoint could not be constructed.
    ///
    /// ## When This Occurs
    /// - Malformed base URL in configuration
    #[error("Invalid remote endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Request timed out.
    #[error("Remote request timed out")]
    Timeout,

    /// Remote host could not be reached.
    ///
    /// ## When This Occurs
    /// - Device offline
    /// - DNS failure
    /// - Service down
    #[error("Cannot reach remote store: {0}")]
    Offline(String),

    /// Remote returned a non-success status.
    #[error("Remote returned HTTP {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Transport-level HTTP failure.
    #[error("Remote request failed: {0}")]
    Http(String),

    /// Backend refused the operation.
    ///
    /// ## When This Occurs
    /// - MemoryStore with an injected failure (tests)
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates an Unavailable error with a reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable(reason.into())
    }

    /// True when the failure is transient and a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout | StoreError::Offline(_) | StoreError::Http(_)
        )
    }
}

/// Convert reqwest errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// timeout            → StoreError::Timeout
/// connection refused → StoreError::Offline
/// everything else    → StoreError::Http
/// ```
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() {
            StoreError::Offline(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Timeout.is_transient());
        assert!(StoreError::Offline("refused".into()).is_transient());
        assert!(!StoreError::unavailable("injected").is_transient());
        assert!(!StoreError::RemoteStatus {
            status: 401,
            body: "unauthorized".into()
        }
        .is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::RemoteStatus {
            status: 500,
            body: "internal".into(),
        };
        assert_eq!(err.to_string(), "Remote returned HTTP 500: internal");
    }
}
