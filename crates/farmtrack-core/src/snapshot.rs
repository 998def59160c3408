//! # Snapshot
//!
//! The full-state wire shape every persistence flush writes and every
//! hydration reads, plus the all-optional patch used to merge loaded data
//! into a live ledger.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Persisted Snapshot                                 │
//! │                                                                         │
//! │  { sales, customers, products, expenses, liabilities, logs,            │
//! │    themeMode, dateSystem, currencyCode, customCurrency, lastUpdated }  │
//! │                                                                         │
//! │  Always the ENTIRE state, never a delta.                                │
//! │                                                                         │
//! │  Snapshot      = every field required  (what a flush writes)            │
//! │  SnapshotPatch = every field optional  (what hydration applies:         │
//! │                  fields absent in storage keep their in-memory value)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON backups reuse the same two types: export is a pretty-printed
//! `Snapshot`, import parses a `SnapshotPatch` fully before applying it, so
//! a malformed file never half-overwrites the ledger.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::activity::ActivityLog;
use crate::error::CoreResult;
use crate::ledger::Ledger;
use crate::types::{
    Customer, CurrencyCode, CustomCurrency, DateSystem, Expense, Liability, Product, Sale,
    Settings, ThemeMode,
};

// =============================================================================
// Snapshot
// =============================================================================

/// The complete serialized state, written wholesale on each flush.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub sales: Vec<Sale>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub expenses: Vec<Expense>,
    pub liabilities: Vec<Liability>,
    pub logs: Vec<ActivityLog>,
    pub theme_mode: ThemeMode,
    pub date_system: DateSystem,
    pub currency_code: CurrencyCode,
    pub custom_currency: Option<CustomCurrency>,
    /// Epoch milliseconds. Stamped server-side on remote writes, locally on
    /// offline writes.
    pub last_updated: i64,
}

impl Snapshot {
    /// Captures the entire ledger.
    pub fn capture(ledger: &Ledger, last_updated: i64) -> Self {
        Snapshot {
            sales: ledger.sales.clone(),
            customers: ledger.customers.clone(),
            products: ledger.products.clone(),
            expenses: ledger.expenses.clone(),
            liabilities: ledger.liabilities.clone(),
            logs: ledger.logs.clone(),
            theme_mode: ledger.settings.theme_mode,
            date_system: ledger.settings.date_system,
            currency_code: ledger.settings.currency_code,
            custom_currency: ledger.settings.custom_currency.clone(),
            last_updated,
        }
    }

    /// Rebuilds a ledger from a snapshot.
    pub fn restore(self) -> Ledger {
        Ledger {
            sales: self.sales,
            customers: self.customers,
            products: self.products,
            expenses: self.expenses,
            liabilities: self.liabilities,
            logs: self.logs,
            settings: Settings {
                theme_mode: self.theme_mode,
                date_system: self.date_system,
                currency_code: self.currency_code,
                custom_currency: self.custom_currency,
            },
        }
    }
}

// =============================================================================
// Snapshot Patch
// =============================================================================

/// A snapshot with every field optional.
///
/// Hydration and backup import apply one of these: only the fields present
/// in the loaded document overwrite the ledger, everything else keeps its
/// current in-memory value. A field that is present-but-null counts as
/// absent for the scalars carried as `Option` internally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotPatch {
    pub sales: Option<Vec<Sale>>,
    pub customers: Option<Vec<Customer>>,
    pub products: Option<Vec<Product>>,
    pub expenses: Option<Vec<Expense>>,
    pub liabilities: Option<Vec<Liability>>,
    pub logs: Option<Vec<ActivityLog>>,
    pub theme_mode: Option<ThemeMode>,
    pub date_system: Option<DateSystem>,
    pub currency_code: Option<CurrencyCode>,
    pub custom_currency: Option<CustomCurrency>,
    pub last_updated: Option<i64>,
}

impl SnapshotPatch {
    /// Overwrites the ledger fields present in this patch.
    pub fn apply_to(self, ledger: &mut Ledger) {
        if let Some(sales) = self.sales {
            ledger.sales = sales;
        }
        if let Some(customers) = self.customers {
            ledger.customers = customers;
        }
        if let Some(products) = self.products {
            ledger.products = products;
        }
        if let Some(expenses) = self.expenses {
            ledger.expenses = expenses;
        }
        if let Some(liabilities) = self.liabilities {
            ledger.liabilities = liabilities;
        }
        if let Some(logs) = self.logs {
            ledger.logs = logs;
        }
        if let Some(theme_mode) = self.theme_mode {
            ledger.settings.theme_mode = theme_mode;
        }
        if let Some(date_system) = self.date_system {
            ledger.settings.date_system = date_system;
        }
        if let Some(currency_code) = self.currency_code {
            ledger.settings.currency_code = currency_code;
        }
        if let Some(custom_currency) = self.custom_currency {
            ledger.settings.custom_currency = Some(custom_currency);
        }
    }
}

/// A full document is a patch with everything present. Used by the remote
/// listener, which always receives complete documents.
impl From<Snapshot> for SnapshotPatch {
    fn from(snapshot: Snapshot) -> Self {
        SnapshotPatch {
            sales: Some(snapshot.sales),
            customers: Some(snapshot.customers),
            products: Some(snapshot.products),
            expenses: Some(snapshot.expenses),
            liabilities: Some(snapshot.liabilities),
            logs: Some(snapshot.logs),
            theme_mode: Some(snapshot.theme_mode),
            date_system: Some(snapshot.date_system),
            currency_code: Some(snapshot.currency_code),
            custom_currency: snapshot.custom_currency,
            last_updated: Some(snapshot.last_updated),
        }
    }
}

// =============================================================================
// JSON Backup
// =============================================================================

/// Serializes the full ledger as a pretty-printed backup document.
///
/// No schema version field; the import side tolerates missing keys instead.
pub fn export_backup(ledger: &Ledger) -> CoreResult<String> {
    let snapshot = Snapshot::capture(ledger, Utc::now().timestamp_millis());
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Applies a backup file to the ledger.
///
/// Parses fully before touching anything: a malformed file returns
/// [`crate::CoreError::Backup`] and leaves the ledger exactly as it was.
/// Keys absent from the file keep their current values.
pub fn import_backup(ledger: &mut Ledger, json: &str) -> CoreResult<()> {
    let patch: SnapshotPatch = serde_json::from_str(json)?;
    patch.apply_to(ledger);
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{PaymentStatus, ProductCategory};

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let mut kale = Product::new(
            "Kale",
            Money::from_minor(4500),
            ProductCategory::Vegetables,
            "kg",
        );
        kale.current_stock = 10.0;
        let kale_id = kale.id.clone();
        ledger.add_product(kale);
        ledger.add_customer(Customer::new("Asha", "9841000000"));
        let customer_id = ledger.customers[0].id.clone();
        ledger.add_sale(Sale::new(
            customer_id,
            kale_id,
            2.0,
            Money::from_minor(9000),
            PaymentStatus::Paid,
        ));
        ledger.settings.theme_mode = ThemeMode::Dark;
        ledger.settings.date_system = DateSystem::Bs;
        ledger
    }

    #[test]
    fn test_capture_restore_round_trip() {
        let ledger = sample_ledger();
        let snapshot = Snapshot::capture(&ledger, 1_700_000_000_000);

        assert_eq!(snapshot.last_updated, 1_700_000_000_000);
        assert_eq!(snapshot.sales.len(), 1);
        assert_eq!(snapshot.logs.len(), 1);

        let restored = snapshot.restore();
        assert_eq!(restored.sales[0].id, ledger.sales[0].id);
        assert_eq!(restored.products[0].current_stock, 8.0);
        assert_eq!(restored.settings.theme_mode, ThemeMode::Dark);
        assert_eq!(restored.settings.date_system, DateSystem::Bs);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let ledger = sample_ledger();
        let snapshot = Snapshot::capture(&ledger, 42);
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(json.contains("\"themeMode\":\"dark\""));
        assert!(json.contains("\"dateSystem\":\"BS\""));
        assert!(json.contains("\"currencyCode\":\"NPR\""));
        assert!(json.contains("\"customCurrency\":null"));
        assert!(json.contains("\"lastUpdated\":42"));
        assert!(json.contains("\"customerId\""));
        assert!(json.contains("\"totalAmount\""));
        assert!(json.contains("\"currentStock\""));
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut ledger = sample_ledger();
        let original_sales = ledger.sales.clone();

        let patch: SnapshotPatch =
            serde_json::from_str(r#"{"themeMode":"light","expenses":[]}"#).unwrap();
        patch.apply_to(&mut ledger);

        assert_eq!(ledger.settings.theme_mode, ThemeMode::Light);
        // Untouched fields kept their values
        assert_eq!(ledger.sales.len(), original_sales.len());
        assert_eq!(ledger.settings.date_system, DateSystem::Bs);
        assert_eq!(ledger.products.len(), 1);
    }

    #[test]
    fn test_full_snapshot_applies_as_patch() {
        let source = sample_ledger();
        let snapshot = Snapshot::capture(&source, 7);

        let mut target = Ledger::new();
        SnapshotPatch::from(snapshot).apply_to(&mut target);

        assert_eq!(target.sales.len(), 1);
        assert_eq!(target.customers[0].name, "Asha");
        assert_eq!(target.settings.theme_mode, ThemeMode::Dark);
    }

    #[test]
    fn test_backup_round_trip() {
        let source = sample_ledger();
        let json = export_backup(&source).unwrap();

        let mut target = Ledger::new();
        import_backup(&mut target, &json).unwrap();

        assert_eq!(target.sales.len(), 1);
        assert_eq!(target.products[0].name, "Kale");
        assert_eq!(target.settings.date_system, DateSystem::Bs);
    }

    #[test]
    fn test_malformed_backup_applies_nothing() {
        let mut ledger = sample_ledger();
        let sales_before = ledger.sales.len();

        let err = import_backup(&mut ledger, "{not json").unwrap_err();
        assert!(matches!(err, crate::CoreError::Backup(_)));
        assert_eq!(ledger.sales.len(), sales_before);
        assert_eq!(ledger.settings.theme_mode, ThemeMode::Dark);
    }

    #[test]
    fn test_patch_tolerates_null_scalars() {
        let mut ledger = sample_ledger();
        let patch: SnapshotPatch =
            serde_json::from_str(r#"{"customCurrency":null,"themeMode":null}"#).unwrap();
        patch.apply_to(&mut ledger);

        // Nulls count as absent: nothing changed
        assert_eq!(ledger.settings.theme_mode, ThemeMode::Dark);
        assert!(ledger.settings.custom_currency.is_none());
    }
}
