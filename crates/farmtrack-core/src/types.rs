//! # Domain Types
//!
//! Core domain types used throughout FarmTrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  customer_id    │   │  name (unique)  │       │
//! │  │  price (Money)  │   │  product_id     │   │  phone          │       │
//! │  │  current_stock  │   │  total_amount   │   │  created_at     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Rate        │   │  PaymentStatus  │   │ LiabilityStatus │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Paid           │   │  Active         │       │
//! │  │  1300 = 13%     │   │  Pending        │   │  Settled        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reference Identity Pattern
//! Sales reference their customer and product by id only. References are not
//! validated on insert; display falls back to the "Retail"/"Unknown"
//! sentinels when a reference no longer resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// Percentage rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1300 bps = 13% (Nepal VAT), 750 bps = 7.5% seasonal discount
///
/// Used for product discount and tax percentages and for a liability's
/// annual interest rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product category for catalog grouping and bulk-import mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProductCategory {
    Vegetables,
    Fruits,
    Grains,
    Dairy,
    General,
    Service,
    Other,
}

impl ProductCategory {
    /// Maps a free-text label onto a category, case-insensitively.
    ///
    /// Unrecognized labels fall back to General so CSV imports never fail
    /// on a category cell.
    pub fn parse_loose(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "vegetables" | "vegetable" => ProductCategory::Vegetables,
            "fruits" | "fruit" => ProductCategory::Fruits,
            "grains" | "grain" => ProductCategory::Grains,
            "dairy" => ProductCategory::Dairy,
            "service" | "services" => ProductCategory::Service,
            "other" => ProductCategory::Other,
            _ => ProductCategory::General,
        }
    }
}

impl Default for ProductCategory {
    fn default() -> Self {
        ProductCategory::General
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProductCategory::Vegetables => "Vegetables",
            ProductCategory::Fruits => "Fruits",
            ProductCategory::Grains => "Grains",
            ProductCategory::Dairy => "Dairy",
            ProductCategory::General => "General",
            ProductCategory::Service => "Service",
            ProductCategory::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// A product in the farm catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Unique case-insensitively after trimming.
    pub name: String,

    /// Catalog category.
    pub category: ProductCategory,

    /// Unit label the product is sold in ("kg", "litre", "dozen", ...).
    pub unit: String,

    /// Base unit price.
    pub price: Money,

    /// Generated product image, if one has been produced.
    pub image_url: Option<String>,

    /// Image generation is currently in flight for this product.
    /// Cleared by the id-keyed patch when generation completes.
    #[serde(default)]
    pub image_pending: bool,

    /// Current stock level in `unit`s. Clamped at 0 on decrement.
    pub current_stock: f64,

    /// Threshold below which the product appears in the low-stock report.
    pub min_stock: f64,

    /// Optional discount applied to the base price.
    pub discount: Option<Rate>,

    /// Optional tax added on top of the discounted price.
    pub tax: Option<Rate>,
}

impl Product {
    /// Creates a product with a fresh id and empty stock.
    pub fn new(
        name: impl Into<String>,
        price: Money,
        category: ProductCategory,
        unit: impl Into<String>,
    ) -> Self {
        Product {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category,
            unit: unit.into(),
            price,
            image_url: None,
            image_pending: false,
            current_stock: 0.0,
            min_stock: 0.0,
            discount: None,
            tax: None,
        }
    }

    /// Effective unit rate after discount and tax.
    ///
    /// ## Behavior
    /// Discount reduces the base price, tax is then added on the discounted
    /// amount. `None` rates are treated as zero.
    pub fn effective_unit_rate(&self) -> Money {
        let discounted = match self.discount {
            Some(rate) => self.price.apply_discount(rate),
            None => self.price,
        };
        match self.tax {
            Some(rate) => discounted + discounted.rate_portion(rate),
            None => discounted,
        }
    }

    /// Line total for a quantity at the effective unit rate.
    pub fn price_for_qty(&self, qty: f64) -> Money {
        self.effective_unit_rate().times_qty(qty)
    }

    /// Whether current stock has fallen to or below the minimum threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer the farm sells to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Unique case-insensitively.
    pub name: String,

    /// Contact phone number.
    pub phone: String,

    /// Optional contact email.
    pub email: Option<String>,

    /// Optional delivery address.
    pub address: Option<String>,

    /// When the customer was first recorded.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a customer with a fresh id, stamped now.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Payment state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentStatus {
    /// Payment received in full.
    Paid,
    /// Payment outstanding (receivable).
    Pending,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

/// A recorded sale of one product to one customer.
///
/// References are by id and never validated; a sale can outlive the entities
/// it points at and renders under sentinel names once they are gone.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer reference. Empty string means a walk-in retail sale.
    pub customer_id: String,

    /// Product reference.
    pub product_id: String,

    /// Quantity sold, in the product's unit. Fractional (weighed produce).
    pub quantity: f64,

    /// Total charged. Derived from quantity × effective rate at entry time
    /// unless the operator overrode it.
    pub total_amount: Money,

    /// When the sale happened.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Paid or Pending (receivable).
    pub payment_status: PaymentStatus,

    /// Free-text notes.
    pub notes: Option<String>,
}

impl Sale {
    /// Creates a sale with a fresh id, dated now.
    pub fn new(
        customer_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: f64,
        total_amount: Money,
        payment_status: PaymentStatus,
    ) -> Self {
        Sale {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.into(),
            product_id: product_id.into(),
            quantity,
            total_amount,
            date: Utc::now(),
            payment_status,
            notes: None,
        }
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense.
///
/// The category is a free string from [`crate::EXPENSE_CATEGORIES`]; it is
/// only used for grouping, so imports never fail on an unknown label.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// What the money was spent on.
    pub description: String,

    /// Amount spent.
    pub amount: Money,

    /// When the expense was incurred.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Grouping label.
    pub category: String,
}

impl Expense {
    /// Creates an expense with a fresh id, dated now.
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
    ) -> Self {
        Expense {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            amount,
            date: Utc::now(),
            category: category.into(),
        }
    }
}

// =============================================================================
// Liability
// =============================================================================

/// Settlement state of a liability. One-way: Active → Settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LiabilityStatus {
    /// Still owed.
    Active,
    /// Paid off. A settled liability never reactivates.
    Settled,
}

impl Default for LiabilityStatus {
    fn default() -> Self {
        LiabilityStatus::Active
    }
}

/// A loan or other outstanding obligation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Liability {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Who the money is owed to (bank, cooperative, supplier).
    pub source: String,

    /// Principal amount borrowed.
    pub principal: Money,

    /// Annual simple-interest rate.
    pub interest_rate: Rate,

    /// When the liability originated.
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    /// When repayment is due.
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,

    /// Active or Settled.
    pub status: LiabilityStatus,
}

impl Liability {
    /// Creates an active liability with a fresh id.
    pub fn new(
        source: impl Into<String>,
        principal: Money,
        interest_rate: Rate,
        start_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Liability {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            principal,
            interest_rate,
            start_date,
            due_date,
            status: LiabilityStatus::Active,
        }
    }
}

// =============================================================================
// Configuration Types
// =============================================================================

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the device preference.
    System,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::System
    }
}

/// Calendar system dates are displayed in.
///
/// Storage is always Gregorian; BS display conversion happens in an external
/// calendar utility, this scalar only records the preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateSystem {
    /// Anno Domini (Gregorian).
    Ad,
    /// Bikram Sambat.
    Bs,
}

impl Default for DateSystem {
    fn default() -> Self {
        DateSystem::Ad
    }
}

/// Supported display currencies, or CUSTOM with a user-defined one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Npr,
    Inr,
    Usd,
    Eur,
    Custom,
}

impl CurrencyCode {
    /// Built-in display symbol. Custom resolves through
    /// [`Settings::currency_symbol`].
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Npr => "Rs",
            CurrencyCode::Inr => "₹",
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Custom => "",
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        CurrencyCode::Npr
    }
}

/// A user-defined currency, used when [`CurrencyCode::Custom`] is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomCurrency {
    /// ISO-style short code ("NRS", "AUD", ...).
    pub code: String,
    /// Symbol shown next to amounts.
    pub symbol: String,
    /// Human-readable name.
    pub name: String,
}

/// The four configuration scalars carried alongside the entity collections.
///
/// Not versioned; last-writer-wins on sync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme_mode: ThemeMode,
    pub date_system: DateSystem,
    pub currency_code: CurrencyCode,
    pub custom_currency: Option<CustomCurrency>,
}

impl Settings {
    /// Resolves the display symbol, honouring a custom currency.
    ///
    /// Falls back to the NPR symbol when CUSTOM is selected but no custom
    /// currency has been defined yet.
    pub fn currency_symbol(&self) -> &str {
        match self.currency_code {
            CurrencyCode::Custom => self
                .custom_currency
                .as_ref()
                .map(|c| c.symbol.as_str())
                .unwrap_or_else(|| CurrencyCode::Npr.symbol()),
            code => code.symbol(),
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
    fn test_rate_from_bps() {
        let rate = Rate::from_bps(1300);
        assert_eq!(rate.bps(), 1300);
        assert!((rate.percentage() - 13.0).abs() < 0.001);
    }

    #[test]
    fn test_rate_from_percentage() {
        let rate = Rate::from_percentage(7.5);
        assert_eq!(rate.bps(), 750);
    }

    #[test]
    fn test_category_parse_loose() {
        assert_eq!(ProductCategory::parse_loose("VEGETABLES"), ProductCategory::Vegetables);
        assert_eq!(ProductCategory::parse_loose(" fruit "), ProductCategory::Fruits);
        assert_eq!(ProductCategory::parse_loose("dairy"), ProductCategory::Dairy);
        assert_eq!(ProductCategory::parse_loose("machinery"), ProductCategory::General);
    }

    #[test]
    fn test_effective_unit_rate() {
        let mut p = Product::new("Kale", Money::from_minor(10000), ProductCategory::Vegetables, "kg");
        assert_eq!(p.effective_unit_rate().minor(), 10000);

        // 10% discount → 9000
        p.discount = Some(Rate::from_bps(1000));
        assert_eq!(p.effective_unit_rate().minor(), 9000);

        // then 13% tax on the discounted price → 9000 + 1170
        p.tax = Some(Rate::from_bps(1300));
        assert_eq!(p.effective_unit_rate().minor(), 10170);
    }

    #[test]
    fn test_price_for_qty() {
        let p = Product::new("Milk", Money::from_minor(8000), ProductCategory::Dairy, "litre");
        assert_eq!(p.price_for_qty(2.5).minor(), 20000);
    }

    #[test]
    fn test_low_stock() {
        let mut p = Product::new("Kale", Money::from_minor(450), ProductCategory::Vegetables, "kg");
        p.current_stock = 10.0;
        p.min_stock = 5.0;
        assert!(!p.is_low_stock());

        p.current_stock = 5.0;
        assert!(p.is_low_stock());
    }

    #[test]
    fn test_currency_symbol_resolution() {
        let mut settings = Settings::default();
        assert_eq!(settings.currency_symbol(), "Rs");

        settings.currency_code = CurrencyCode::Usd;
        assert_eq!(settings.currency_symbol(), "$");

        settings.currency_code = CurrencyCode::Custom;
        // CUSTOM without a defined currency falls back to NPR
        assert_eq!(settings.currency_symbol(), "Rs");

        settings.custom_currency = Some(CustomCurrency {
            code: "AUD".to_string(),
            symbol: "A$".to_string(),
            name: "Australian Dollar".to_string(),
        });
        assert_eq!(settings.currency_symbol(), "A$");
    }

    #[test]
    fn test_config_wire_format() {
        // The snapshot stores these as plain strings; renames must hold.
        assert_eq!(serde_json::to_string(&ThemeMode::Dark).unwrap(), "\"dark\"");
        assert_eq!(serde_json::to_string(&DateSystem::Bs).unwrap(), "\"BS\"");
        assert_eq!(serde_json::to_string(&CurrencyCode::Npr).unwrap(), "\"NPR\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Pending).unwrap(), "\"Pending\"");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Paid);
        assert_eq!(LiabilityStatus::default(), LiabilityStatus::Active);
        assert_eq!(DateSystem::default(), DateSystem::Ad);
        assert_eq!(CurrencyCode::default(), CurrencyCode::Npr);
    }
}
