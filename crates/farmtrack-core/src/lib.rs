//! # farmtrack-core: Pure Business Logic for FarmTrack
//!
//! This crate is the **heart** of FarmTrack. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       FarmTrack Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │   Sales UI ──► Catalog UI ──► Billing UI ──► Dashboard UI      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ generated TS bindings                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 farmtrack-sync (Session)                        │   │
//! │  │    hydrate, debounced flush, image pipeline, status events     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ farmtrack-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  import   │  │   │
//! │  │   │  Product  │  │   Money   │  │  Ledger   │  │ CSV rows  │  │   │
//! │  │   │   Sale    │  │   Rate    │  │ mutations │  │  headers  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                farmtrack-store (Persistence)                    │   │
//! │  │          local JSON file, remote document, memory               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, Expense, Liability)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - The Ledger aggregate and its closed set of mutations
//! - [`activity`] - Append-only activity log recording and restore support
//! - [`snapshot`] - Full-state snapshot capture, patch apply, JSON backup
//! - [`import`] - CSV import parsing (sales history, product catalog)
//! - [`reports`] - Derived read-only aggregates for dashboards
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Storage, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in minor units (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use farmtrack_core::ledger::Ledger;
//! use farmtrack_core::money::Money;
//! use farmtrack_core::types::{Product, ProductCategory, Sale, PaymentStatus};
//!
//! let mut ledger = Ledger::new();
//!
//! let mut kale = Product::new("Kale", Money::from_minor(450), ProductCategory::Vegetables, "kg");
//! kale.current_stock = 10.0;
//! let kale_id = kale.id.clone();
//! assert!(ledger.add_product(kale));
//!
//! let sale = Sale::new("", &kale_id, 4.0, Money::from_minor(1800), PaymentStatus::Paid);
//! ledger.add_sale(sale);
//!
//! // Stock decremented, activity recorded
//! assert_eq!(ledger.products[0].current_stock, 6.0);
//! assert_eq!(ledger.logs.len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod activity;
pub mod error;
pub mod import;
pub mod ledger;
pub mod money;
pub mod reports;
pub mod snapshot;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use farmtrack_core::Money` instead of
// `use farmtrack_core::money::Money`

pub use activity::{ActivityLog, LogAction};
pub use error::{CoreError, CoreResult, ImportError};
pub use ledger::Ledger;
pub use money::Money;
pub use snapshot::{export_backup, import_backup, Snapshot, SnapshotPatch};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display name used when a sale's customer reference cannot be resolved.
///
/// ## Why a constant?
/// Sales keep a customerId reference with no enforced integrity. Walk-in
/// sales and sales whose customer was later deleted both render under this
/// sentinel instead of failing a lookup.
pub const RETAIL_CUSTOMER: &str = "Retail";

/// Display name used when a sale's product reference cannot be resolved.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

/// Fixed label list for grouping expenses.
///
/// ## Business Reason
/// Expense categories stay free-text on the record itself so imports never
/// fail on an unknown label; this list only drives the entry form and the
/// grouped dashboard totals.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Seeds",
    "Fertilizer",
    "Feed",
    "Labor",
    "Equipment",
    "Fuel",
    "Transport",
    "Utilities",
    "Rent",
    "Veterinary",
    "Maintenance",
    "Other",
];
