//! # Activity Log
//!
//! Append-only, denormalized audit trail of sale lifecycle events.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Activity Log Lifecycle                            │
//! │                                                                         │
//! │   add_sale ───────► Created log                                         │
//! │   update_sale ────► Updated log                                         │
//! │   delete_sale ────► Deleted log  (metadata = full sale snapshot)        │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                    restore_sale  (consumes the log, re-inserts sale)    │
//! │                                                                         │
//! │   Logs leave the trail only via delete_log or restore consumption.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entity and customer names are denormalized into each entry so the audit
//! view renders without joins. The cost is that renames must cascade (see
//! [`Ledger::rename_logs_for_customer`]) and that a later rename of an
//! unrelated same-named customer can touch historical entries; that
//! imprecision is accepted.
//!
//! Only sale mutations record. Product, customer, expense and liability
//! mutations leave no trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::ledger::Ledger;
use crate::money::Money;
use crate::types::Sale;

// =============================================================================
// Log Action
// =============================================================================

/// What happened to the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LogAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogAction::Created => "Created",
            LogAction::Updated => "Updated",
            LogAction::Deleted => "Deleted",
        };
        write!(f, "{label}")
    }
}

// =============================================================================
// Activity Log Entry
// =============================================================================

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Created, Updated or Deleted.
    pub action: LogAction,

    /// When the mutation happened.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Product name at event time (denormalized, "Unknown" if unresolved).
    pub entity_name: String,

    /// Customer name at event time (denormalized, "Retail" if unresolved).
    pub customer_name: String,

    /// Sale amount at event time.
    pub amount: Money,

    /// Human-readable description of the event.
    pub details: String,

    /// Full sale snapshot. Only Deleted entries carry one; it is what
    /// `restore_sale` re-inserts.
    pub metadata: Option<Sale>,
}

impl ActivityLog {
    /// Builds a log entry stamped now with a fresh id.
    pub fn record(
        action: LogAction,
        entity_name: impl Into<String>,
        customer_name: impl Into<String>,
        amount: Money,
        details: impl Into<String>,
        metadata: Option<Sale>,
    ) -> Self {
        ActivityLog {
            id: Uuid::new_v4().to_string(),
            action,
            timestamp: Utc::now(),
            entity_name: entity_name.into(),
            customer_name: customer_name.into(),
            amount,
            details: details.into(),
            metadata,
        }
    }
}

// =============================================================================
// Recorder
// =============================================================================

impl Ledger {
    /// Prepends an audit entry. Newest entries sit at the front, matching
    /// the collections themselves.
    pub(crate) fn record_activity(
        &mut self,
        action: LogAction,
        entity_name: impl Into<String>,
        customer_name: impl Into<String>,
        amount: Money,
        details: impl Into<String>,
        metadata: Option<Sale>,
    ) {
        self.logs.insert(
            0,
            ActivityLog::record(action, entity_name, customer_name, amount, details, metadata),
        );
    }

    /// Rewrites the denormalized customer name on every log that carried the
    /// old one. Best-effort string match: a historical log for a different
    /// customer with the same name is rewritten too.
    pub(crate) fn rename_logs_for_customer(&mut self, old_name: &str, new_name: &str) {
        for log in &mut self.logs {
            if log.customer_name == old_name {
                log.customer_name = new_name.to_string();
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_prepends() {
        let mut ledger = Ledger::new();
        ledger.record_activity(
            LogAction::Created,
            "Kale",
            "Retail",
            Money::from_minor(1800),
            "New sale recorded",
            None,
        );
        ledger.record_activity(
            LogAction::Updated,
            "Milk",
            "Asha",
            Money::from_minor(8000),
            "Sale updated",
            None,
        );

        assert_eq!(ledger.logs.len(), 2);
        assert_eq!(ledger.logs[0].entity_name, "Milk");
        assert_eq!(ledger.logs[0].action, LogAction::Updated);
        assert_eq!(ledger.logs[1].entity_name, "Kale");
    }

    #[test]
    fn test_rename_cascade_touches_only_matching_logs() {
        let mut ledger = Ledger::new();
        ledger.record_activity(
            LogAction::Created,
            "Kale",
            "Alice",
            Money::from_minor(100),
            "sale",
            None,
        );
        ledger.record_activity(
            LogAction::Created,
            "Milk",
            "Bina",
            Money::from_minor(200),
            "sale",
            None,
        );
        ledger.record_activity(
            LogAction::Deleted,
            "Eggs",
            "Alice",
            Money::from_minor(300),
            "sale removed",
            None,
        );

        ledger.rename_logs_for_customer("Alice", "Alice Smith");

        assert_eq!(ledger.logs[0].customer_name, "Alice Smith");
        assert_eq!(ledger.logs[1].customer_name, "Bina");
        assert_eq!(ledger.logs[2].customer_name, "Alice Smith");
    }

    #[test]
    fn test_action_display() {
        assert_eq!(LogAction::Created.to_string(), "Created");
        assert_eq!(LogAction::Deleted.to_string(), "Deleted");
    }
}
