//! # Error Types
//!
//! Domain-specific error types for farmtrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  farmtrack-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger operation failures (restore, backup)    │
//! │  └── ImportError      - CSV import contract violations                 │
//! │                                                                         │
//! │  farmtrack-store errors (separate crate)                               │
//! │  └── StoreError       - Persistence backend failures                   │
//! │                                                                         │
//! │  farmtrack-sync errors (separate crate)                                │
//! │  └── SyncError        - Config and session failures                    │
//! │                                                                         │
//! │  Flow: ImportError → CoreError → surfaced to the user by the frontend  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (id, column, line number)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message
//!
//! Most ledger mutations are total functions and return nothing: missing ids
//! are silent no-ops and duplicate product names report back as a plain
//! `bool`. Only restore and the parsers have failure modes worth typing.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent operations that must abort without touching the
/// ledger. They are surfaced to the user as blocking messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The activity log to restore from no longer exists.
    ///
    /// ## When This Occurs
    /// - Restore requested twice for the same log (first call consumed it)
    /// - Log was explicitly deleted before the restore ran
    #[error("Activity log not found: {0}")]
    LogNotFound(String),

    /// The activity log exists but carries no sale snapshot.
    ///
    /// ## When This Occurs
    /// Only Deleted-sale logs capture a metadata snapshot. Created and
    /// Updated logs cannot be restored from.
    #[error("Activity log {0} has no sale snapshot to restore")]
    NoSnapshot(String),

    /// A sale with the snapshot's id already exists.
    ///
    /// ## User Workflow
    /// ```text
    /// Restore from Deleted log
    ///      │
    ///      ▼
    /// Sale id already present in ledger
    ///      │
    ///      ▼
    /// RestoreConflict → UI shows "This sale already exists"
    /// ```
    #[error("Sale {0} already exists, restore aborted")]
    RestoreConflict(String),

    /// Backup JSON could not be parsed or produced.
    ///
    /// ## Behavior
    /// On import, parsing happens before any field is applied, so a
    /// malformed backup never partially overwrites the ledger.
    #[error("Backup error: {0}")]
    Backup(#[from] serde_json::Error),

    /// CSV import failure (wraps ImportError).
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
}

// =============================================================================
// Import Error
// =============================================================================

/// CSV import contract violations.
///
/// An import either applies fully or not at all: the parser validates every
/// row before the ledger sees any of them, so the first bad cell aborts the
/// whole file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file has no header row or no data rows.
    #[error("File contains no data rows")]
    Empty,

    /// A required column could not be resolved from the header row.
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// A required cell is empty.
    #[error("Row {line}: {column} is required")]
    MissingValue { line: usize, column: String },

    /// A numeric cell could not be parsed.
    #[error("Row {line}: invalid {column} value '{value}'")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },

    /// A date cell matched none of the accepted formats.
    #[error("Row {line}: unrecognized date '{value}'")]
    InvalidDate { line: usize, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RestoreConflict("sale-42".to_string());
        assert_eq!(err.to_string(), "Sale sale-42 already exists, restore aborted");

        let err = CoreError::LogNotFound("log-7".to_string());
        assert_eq!(err.to_string(), "Activity log not found: log-7");
    }

    #[test]
    fn test_import_error_messages() {
        let err = ImportError::MissingColumn {
            column: "Amount".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required column: Amount");

        let err = ImportError::InvalidDate {
            line: 3,
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "Row 3: unrecognized date 'yesterday'");
    }

    #[test]
    fn test_import_converts_to_core_error() {
        let import_err = ImportError::Empty;
        let core_err: CoreError = import_err.into();
        assert!(matches!(core_err, CoreError::Import(_)));
    }
}
