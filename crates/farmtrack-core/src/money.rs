//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many bookkeeping systems:                                           │
//! │    Rs 10.00 / 3 = Rs 3.33 (×3 = Rs 9.99)  → Lost Rs 0.01!              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    1000 paisa / 3 = 333 paisa (×3 = 999 paisa)                         │
//! │    We KNOW we lost 1 paisa, and handle it explicitly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farmtrack_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor(4550); // Rs 45.50
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // Rs 91.00
//! let total = price + Money::from_minor(500);    // Rs 50.50
//!
//! // NEVER do this:
//! // let bad = Money::from_float(45.50); // NO SUCH METHOD EXISTS!
//! ```
//!
//! The symbol shown next to an amount comes from the currency settings; this
//! type is currency-agnostic and only ever sees minor units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paisa for NPR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and balances
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## User Workflow Context
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price ──► effective unit rate ──► Sale.total_amount            │
/// │                                                                         │
/// │  Expense.amount ──► category totals on the dashboard                    │
/// │                                                                         │
/// │  Liability.principal ──► interest accrual ──► outstanding total         │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    ///
    /// let price = Money::from_minor(4550); // Represents Rs 45.50
    /// assert_eq!(price.minor(), 4550);
    /// ```
    ///
    /// ## Why Minor Units?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// Snapshots, calculations, and reports all use minor units.
    /// Only the UI converts to major units for display.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units (rupees and paisa).
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    ///
    /// let price = Money::from_major_minor(45, 50); // Rs 45.50
    /// assert_eq!(price.minor(), 4550);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -Rs 5.50
    /// assert_eq!(negative.minor(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units (smallest currency unit).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    ///
    /// let price = Money::from_minor(4550);
    /// assert_eq!(price.major_part(), 45);
    ///
    /// let negative = Money::from_minor(-550);
    /// assert_eq!(negative.major_part(), -5);
    /// ```
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    ///
    /// let price = Money::from_minor(4550);
    /// assert_eq!(price.minor_part(), 50);
    ///
    /// let negative = Money::from_minor(-550);
    /// assert_eq!(negative.minor_part(), 50); // Absolute value
    /// ```
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the portion of this amount described by a percentage rate.
    ///
    /// Used for tax portions on a sale line and for annual interest on a
    /// liability principal.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`
    /// The +5000 provides rounding (5000/10000 = 0.5)
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    /// use farmtrack_core::types::Rate;
    ///
    /// let price = Money::from_minor(1000);  // Rs 10.00
    /// let tax = Rate::from_bps(1300);       // 13% VAT
    ///
    /// assert_eq!(price.rate_portion(tax).minor(), 130); // Rs 1.30
    /// ```
    pub fn rate_portion(&self, rate: Rate) -> Money {
        // Use i128 to prevent overflow on large amounts
        let portion = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(portion as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    /// use farmtrack_core::types::Rate;
    ///
    /// let subtotal = Money::from_minor(10000); // Rs 100.00
    /// let discounted = subtotal.apply_discount(Rate::from_bps(1000)); // 10% off
    /// assert_eq!(discounted.minor(), 9000); // Rs 90.00
    /// ```
    pub fn apply_discount(&self, rate: Rate) -> Money {
        // Calculate discount amount, then subtract
        let discount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(self.0 - discount as i64)
    }

    /// Multiplies money by a fractional quantity.
    ///
    /// Produce is weighed, so quantities are fractional: 2.5 kg of kale at
    /// Rs 45.00/kg. Rounds to the nearest minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use farmtrack_core::money::Money;
    ///
    /// let unit_rate = Money::from_minor(4500); // Rs 45.00 per kg
    /// assert_eq!(unit_rate.times_qty(2.5).minor(), 11250); // Rs 112.50
    /// ```
    pub fn times_qty(&self, qty: f64) -> Money {
        Money((self.0 as f64 * qty).round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging. Use frontend formatting for actual UI display so
/// the configured currency symbol and localization apply.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for whole-unit quantities).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation over an iterator of Money values (for report totals).
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
