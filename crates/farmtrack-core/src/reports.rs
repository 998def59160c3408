//! # Dashboard Reports
//!
//! Read-only aggregates derived from ledger collections.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Report Derivation                                  │
//! │                                                                         │
//! │  Ledger collections (sales, expenses, liabilities, products)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  THIS MODULE: pure fold/group/sort over slices                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Dashboard cards and charts                                            │
//! │                                                                         │
//! │  No caching: collections are small enough to re-derive on each         │
//! │  render. Nothing here mutates state or performs I/O.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Grouped results are sorted by amount descending, then name ascending,
//! so chart ordering is stable across re-renders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Customer, Expense, Liability, LiabilityStatus, PaymentStatus, Product, Sale};
use crate::{RETAIL_CUSTOMER, UNKNOWN_PRODUCT};

// =============================================================================
// Report Rows
// =============================================================================

/// One bar in a revenue-by-product or revenue-by-customer chart.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenueLine {
    pub name: String,
    pub amount: Money,
    pub sale_count: usize,
}

/// One slice in the expense-breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

// =============================================================================
// Revenue
// =============================================================================

/// Sum of all sale amounts, regardless of payment status.
pub fn total_revenue(sales: &[Sale]) -> Money {
    sales.iter().map(|s| s.total_amount).sum()
}

/// Sum of sale amounts still awaiting payment.
pub fn pending_revenue(sales: &[Sale]) -> Money {
    sales
        .iter()
        .filter(|s| s.payment_status == PaymentStatus::Pending)
        .map(|s| s.total_amount)
        .sum()
}

/// Revenue grouped by product name.
///
/// Sales whose product no longer exists group under the "Unknown" label
/// rather than disappearing from the chart.
pub fn revenue_by_product(sales: &[Sale], products: &[Product]) -> Vec<RevenueLine> {
    group_revenue(sales, |sale| {
        products
            .iter()
            .find(|p| p.id == sale.product_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string())
    })
}

/// Revenue grouped by customer name.
///
/// Sales without a resolvable customer group under the "Retail" label.
pub fn revenue_by_customer(sales: &[Sale], customers: &[Customer]) -> Vec<RevenueLine> {
    group_revenue(sales, |sale| {
        customers
            .iter()
            .find(|c| c.id == sale.customer_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| RETAIL_CUSTOMER.to_string())
    })
}

fn group_revenue<F>(sales: &[Sale], label_of: F) -> Vec<RevenueLine>
where
    F: Fn(&Sale) -> String,
{
    let mut lines: Vec<RevenueLine> = Vec::new();
    for sale in sales {
        let name = label_of(sale);
        match lines.iter_mut().find(|line| line.name == name) {
            Some(line) => {
                line.amount += sale.total_amount;
                line.sale_count += 1;
            }
            None => lines.push(RevenueLine {
                name,
                amount: sale.total_amount,
                sale_count: 1,
            }),
        }
    }
    lines.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    lines
}

// =============================================================================
// Expenses
// =============================================================================

/// Sum of all expense amounts.
pub fn total_expenses(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount).sum()
}

/// Expense totals grouped by category label, sorted largest first.
pub fn expenses_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(t) => t.total += expense.amount,
            None => totals.push(CategoryTotal {
                category: expense.category.clone(),
                total: expense.amount,
            }),
        }
    }
    totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    totals
}

// =============================================================================
// Stock
// =============================================================================

/// Products at or below their minimum stock level.
pub fn low_stock_products(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|p| p.is_low_stock()).collect()
}

// =============================================================================
// Liabilities
// =============================================================================

/// Total principal across liabilities that are still active.
pub fn outstanding_principal(liabilities: &[Liability]) -> Money {
    liabilities
        .iter()
        .filter(|l| l.status == LiabilityStatus::Active)
        .map(|l| l.principal)
        .sum()
}

/// Simple interest accrued on one liability as of a given instant.
///
/// ## Formula
/// `principal × annual rate × elapsed days / 365`, computed in minor units
/// with integer arithmetic. Settled liabilities and liabilities whose start
/// date lies in the future accrue nothing.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use farmtrack_core::{reports::accrued_interest, Money};
/// use farmtrack_core::types::{Liability, LiabilityStatus, Rate};
///
/// let start = Utc::now() - Duration::days(365);
/// let loan = Liability {
///     id: "loan-1".to_string(),
///     source: "Agri Bank".to_string(),
///     principal: Money::from_minor(100_000),
///     interest_rate: Rate::from_bps(1_000),
///     start_date: start,
///     due_date: start + Duration::days(730),
///     status: LiabilityStatus::Active,
/// };
///
/// // 10% of 1,000.00 over one year
/// assert_eq!(accrued_interest(&loan, Utc::now()), Money::from_minor(10_000));
/// ```
pub fn accrued_interest(liability: &Liability, as_of: DateTime<Utc>) -> Money {
    if liability.status != LiabilityStatus::Active {
        return Money::zero();
    }

    let days = (as_of - liability.start_date).num_days();
    if days <= 0 {
        return Money::zero();
    }

    let minor = liability.principal.minor() as i128
        * liability.interest_rate.bps() as i128
        * days as i128
        / (10_000 * 365);
    Money::from_minor(minor as i64)
}

/// Sum of [`accrued_interest`] across all active liabilities.
pub fn total_accrued_interest(liabilities: &[Liability], as_of: DateTime<Utc>) -> Money {
    liabilities
        .iter()
        .map(|l| accrued_interest(l, as_of))
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductCategory, Rate};
    use chrono::Duration;

    fn sale(customer_id: &str, product_id: &str, minor: i64, status: PaymentStatus) -> Sale {
        Sale::new(
            customer_id.to_string(),
            product_id.to_string(),
            1.0,
            Money::from_minor(minor),
            status,
        )
    }

    fn product(id: &str, name: &str, stock: f64, min_stock: f64) -> Product {
        let mut p = Product::new(
            name,
            Money::from_minor(4_500),
            ProductCategory::Vegetables,
            "kg",
        );
        p.id = id.to_string();
        p.current_stock = stock;
        p.min_stock = min_stock;
        p
    }

    fn expense(category: &str, minor: i64) -> Expense {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            description: format!("{category} purchase"),
            amount: Money::from_minor(minor),
            date: Utc::now(),
            category: category.to_string(),
        }
    }

    fn liability(minor: i64, bps: u32, days_ago: i64, status: LiabilityStatus) -> Liability {
        let start = Utc::now() - Duration::days(days_ago);
        Liability {
            id: uuid::Uuid::new_v4().to_string(),
            source: "Agri Bank".to_string(),
            principal: Money::from_minor(minor),
            interest_rate: Rate::from_bps(bps),
            start_date: start,
            due_date: start + Duration::days(365),
            status,
        }
    }

    #[test]
    fn test_total_and_pending_revenue() {
        let sales = vec![
            sale("c1", "p1", 10_000, PaymentStatus::Paid),
            sale("c1", "p1", 5_000, PaymentStatus::Pending),
            sale("c2", "p2", 2_500, PaymentStatus::Pending),
        ];

        assert_eq!(total_revenue(&sales), Money::from_minor(17_500));
        assert_eq!(pending_revenue(&sales), Money::from_minor(7_500));
        assert_eq!(total_revenue(&[]), Money::zero());
    }

    #[test]
    fn test_revenue_by_product_groups_and_sorts() {
        let products = vec![product("p1", "Kale", 10.0, 2.0), product("p2", "Milk", 10.0, 2.0)];
        let sales = vec![
            sale("c1", "p1", 4_000, PaymentStatus::Paid),
            sale("c1", "p2", 9_000, PaymentStatus::Paid),
            sale("c2", "p1", 2_000, PaymentStatus::Paid),
        ];

        let lines = revenue_by_product(&sales, &products);
        assert_eq!(lines.len(), 2);
        // Largest first
        assert_eq!(lines[0].name, "Milk");
        assert_eq!(lines[0].amount, Money::from_minor(9_000));
        assert_eq!(lines[0].sale_count, 1);
        assert_eq!(lines[1].name, "Kale");
        assert_eq!(lines[1].amount, Money::from_minor(6_000));
        assert_eq!(lines[1].sale_count, 2);
    }

    #[test]
    fn test_revenue_for_deleted_product_groups_under_unknown() {
        let sales = vec![sale("c1", "gone", 4_000, PaymentStatus::Paid)];
        let lines = revenue_by_product(&sales, &[]);
        assert_eq!(lines[0].name, "Unknown");
    }

    #[test]
    fn test_revenue_by_customer_falls_back_to_retail() {
        let customers = vec![Customer::new("Asha", "9800000001")];
        let mut sales = vec![
            sale(&customers[0].id, "p1", 4_000, PaymentStatus::Paid),
            sale("", "p1", 1_000, PaymentStatus::Paid),
        ];
        sales.push(sale("", "p1", 500, PaymentStatus::Paid));

        let lines = revenue_by_customer(&sales, &customers);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Asha");
        assert_eq!(lines[1].name, "Retail");
        assert_eq!(lines[1].amount, Money::from_minor(1_500));
        assert_eq!(lines[1].sale_count, 2);
    }

    #[test]
    fn test_expenses_by_category() {
        let expenses = vec![
            expense("Seeds", 3_000),
            expense("Feed", 8_000),
            expense("Seeds", 1_000),
        ];

        assert_eq!(total_expenses(&expenses), Money::from_minor(12_000));

        let totals = expenses_by_category(&expenses);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "Feed");
        assert_eq!(totals[1].category, "Seeds");
        assert_eq!(totals[1].total, Money::from_minor(4_000));
    }

    #[test]
    fn test_low_stock_boundary_is_inclusive() {
        let products = vec![
            product("p1", "Kale", 2.0, 2.0),
            product("p2", "Milk", 2.1, 2.0),
            product("p3", "Eggs", 0.0, 5.0),
        ];

        let low: Vec<&str> = low_stock_products(&products)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(low, vec!["Kale", "Eggs"]);
    }

    #[test]
    fn test_outstanding_principal_skips_settled() {
        let liabilities = vec![
            liability(100_000, 1_000, 30, LiabilityStatus::Active),
            liability(50_000, 1_000, 30, LiabilityStatus::Settled),
        ];
        assert_eq!(outstanding_principal(&liabilities), Money::from_minor(100_000));
    }

    #[test]
    fn test_accrued_interest_simple_formula() {
        // 10% annual on 1,000.00 for a full year
        let loan = liability(100_000, 1_000, 365, LiabilityStatus::Active);
        assert_eq!(accrued_interest(&loan, Utc::now()), Money::from_minor(10_000));

        // Half a year accrues half
        let loan = liability(100_000, 1_000, 183, LiabilityStatus::Active);
        let expected = 100_000i128 * 1_000 * 183 / (10_000 * 365);
        assert_eq!(
            accrued_interest(&loan, Utc::now()),
            Money::from_minor(expected as i64)
        );
    }

    #[test]
    fn test_accrued_interest_edge_cases() {
        // Settled loans stop accruing
        let loan = liability(100_000, 1_000, 365, LiabilityStatus::Settled);
        assert_eq!(accrued_interest(&loan, Utc::now()), Money::zero());

        // A start date in the future accrues nothing
        let loan = liability(100_000, 1_000, -10, LiabilityStatus::Active);
        assert_eq!(accrued_interest(&loan, Utc::now()), Money::zero());
    }

    #[test]
    fn test_total_accrued_interest() {
        let liabilities = vec![
            liability(100_000, 1_000, 365, LiabilityStatus::Active),
            liability(100_000, 2_000, 365, LiabilityStatus::Active),
            liability(100_000, 5_000, 365, LiabilityStatus::Settled),
        ];
        assert_eq!(
            total_accrued_interest(&liabilities, Utc::now()),
            Money::from_minor(30_000)
        );
    }
}
