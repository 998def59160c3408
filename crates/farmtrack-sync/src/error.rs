//! # Sync Error Types
//!
//! Error types for session and sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sync Error Categories                              │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌──────────────────┐  ┌────────────────────┐  │
//! │  │   Configuration    │  │     Storage      │  │    Serialization   │  │
//! │  │                    │  │                  │  │                    │  │
//! │  │  InvalidConfig     │  │  Storage         │  │  Serialization     │  │
//! │  │  ConfigLoadFailed  │  │  (wraps the      │  │  (snapshot JSON)   │  │
//! │  │  ConfigSaveFailed  │  │   store error)   │  │                    │  │
//! │  │  InvalidUrl        │  │                  │  │                    │  │
//! │  └────────────────────┘  └──────────────────┘  └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use farmtrack_store::StoreError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering session, configuration, and storage failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid session configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Invalid remote base URL.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// A storage backend operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    // =========================================================================
    // Ledger Errors
    // =========================================================================
    /// A domain operation surfaced through the session failed.
    #[error("Ledger error: {0}")]
    Ledger(String),

    // =========================================================================
    // Serialization Errors
    // =========================================================================
    /// Snapshot serialization or deserialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<farmtrack_core::CoreError> for SyncError {
    fn from(err: farmtrack_core::CoreError) -> Self {
        SyncError::Ledger(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    ///
    /// Configuration errors are permanent until the operator fixes the
    /// config file or environment, so callers should surface them rather
    /// than retry.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
                | SyncError::InvalidUrl(_)
        )
    }

    /// Returns true if the underlying failure is transient and the
    /// operation can be retried (network hiccups, timeouts).
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Storage(err) => err.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_categorized() {
        assert!(SyncError::InvalidConfig("empty user id".into()).is_config_error());
        assert!(SyncError::ConfigLoadFailed("no such file".into()).is_config_error());
        assert!(!SyncError::Serialization("bad json".into()).is_config_error());
    }

    #[test]
    fn test_transient_storage_errors() {
        let offline = SyncError::Storage(StoreError::Offline("connection refused".into()));
        assert!(offline.is_transient());

        let status = SyncError::Storage(StoreError::RemoteStatus {
            status: 403,
            body: "forbidden".into(),
        });
        assert!(!status.is_transient());
        assert!(!SyncError::InvalidConfig("bad".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::InvalidUrl("relative URL without a base".into());
        assert!(err.to_string().contains("Invalid remote URL"));
    }
}
