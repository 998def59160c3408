//! # Ledger
//!
//! The single aggregate owning every entity collection and the closed set of
//! mutations that may change them.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ledger Operations                                 │
//! │                                                                         │
//! │  Frontend Action          Mutation                 Side Effects         │
//! │  ───────────────          ────────                 ────────────         │
//! │                                                                         │
//! │  Record Sale ───────────► add_sale() ────────────► stock −qty, log     │
//! │                                                                         │
//! │  Edit Sale ─────────────► update_sale() ─────────► stock +old −new,    │
//! │                                                     log                 │
//! │                                                                         │
//! │  Delete Sale ───────────► delete_sale() ─────────► log w/ snapshot     │
//! │                                                     (stock untouched)   │
//! │                                                                         │
//! │  Undo Delete ───────────► restore_sale() ────────► stock −qty,         │
//! │                                                     consume log         │
//! │                                                                         │
//! │  Delete Customer ───────► delete_customer() ─────► cascade sales       │
//! │                                                                         │
//! │  CSV Session Import ────► bulk_import_sales() ───► wipe + synthesize   │
//! │                                                                         │
//! │  NOTE: Every mutation runs under the caller's exclusive write access,  │
//! │        so readers never observe a half-applied transition.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Stock never goes negative: every decrement floors at 0
//! - Deleting a sale does NOT restore stock; deletion removes the record
//!   from the books, it is not a cancellation of the harvest that left
//! - Logs are only written by sale mutations
//! - Newest entries sit at the front of every collection

use crate::activity::LogAction;
use crate::error::{CoreError, CoreResult};
use crate::import::{ProductImportRow, SaleImportRow};
use crate::money::Money;
use crate::types::{
    Customer, Expense, Liability, LiabilityStatus, Product, Sale, Settings,
};
use crate::{ActivityLog, RETAIL_CUSTOMER, UNKNOWN_PRODUCT};

// =============================================================================
// Ledger
// =============================================================================

/// The in-memory entity store: six collections plus the settings scalars.
///
/// Components receive read-only views of this aggregate and invoke the
/// mutation methods below; nothing else may change it.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Recorded sales, newest first.
    pub sales: Vec<Sale>,

    /// Known customers, newest first.
    pub customers: Vec<Customer>,

    /// Product catalog.
    pub products: Vec<Product>,

    /// Business expenses, newest first.
    pub expenses: Vec<Expense>,

    /// Outstanding and settled liabilities.
    pub liabilities: Vec<Liability>,

    /// Audit trail, newest first.
    pub logs: Vec<ActivityLog>,

    /// Theme, calendar, currency preferences.
    pub settings: Settings,
}

impl Ledger {
    /// Creates an empty ledger with default settings.
    pub fn new() -> Self {
        Ledger::default()
    }

    // =========================================================================
    // Lookup helpers
    // =========================================================================

    /// Product display name, or the "Unknown" sentinel.
    pub fn product_name(&self, product_id: &str) -> String {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string())
    }

    /// Customer display name, or the "Retail" sentinel for walk-ins and
    /// dangling references.
    pub fn customer_name(&self, customer_id: &str) -> String {
        self.customers
            .iter()
            .find(|c| c.id == customer_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| RETAIL_CUSTOMER.to_string())
    }

    /// Case-insensitive product name lookup (trimmed).
    fn find_product_by_name(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.products
            .iter()
            .position(|p| p.name.trim().to_lowercase() == needle)
    }

    /// Case-insensitive customer name lookup (trimmed).
    fn find_customer_by_name(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.customers
            .iter()
            .position(|c| c.name.trim().to_lowercase() == needle)
    }

    // =========================================================================
    // Stock helpers
    // =========================================================================

    /// Decrements a product's stock, floored at 0. Dangling references are
    /// ignored.
    fn debit_stock(&mut self, product_id: &str, quantity: f64) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
            product.current_stock = (product.current_stock - quantity).max(0.0);
        }
    }

    /// Returns quantity to a product's stock (the "old side" of an update).
    fn credit_stock(&mut self, product_id: &str, quantity: f64) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
            product.current_stock += quantity;
        }
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Records a sale: prepend, debit stock, log Created.
    ///
    /// References are taken as given; a sale pointing at an id that does not
    /// resolve still lands in the books and renders under sentinel names.
    pub fn add_sale(&mut self, sale: Sale) {
        let entity_name = self.product_name(&sale.product_id);
        let customer_name = self.customer_name(&sale.customer_id);

        self.debit_stock(&sale.product_id, sale.quantity);
        self.record_activity(
            LogAction::Created,
            entity_name,
            customer_name,
            sale.total_amount,
            "New sale recorded",
            None,
        );
        self.sales.insert(0, sale);
    }

    /// Replaces a sale and reconciles stock across the change.
    ///
    /// ## Behavior
    /// The old sale's quantity is returned to the old product, then the new
    /// quantity is taken from the new product (floored at 0). This handles
    /// both a quantity edit and a reassignment to a different product.
    ///
    /// Silent no-op when no sale with that id exists.
    pub fn update_sale(&mut self, updated: Sale) {
        let Some(index) = self.sales.iter().position(|s| s.id == updated.id) else {
            return;
        };

        let old = self.sales[index].clone();
        self.credit_stock(&old.product_id, old.quantity);
        self.debit_stock(&updated.product_id, updated.quantity);

        let entity_name = self.product_name(&updated.product_id);
        let customer_name = self.customer_name(&updated.customer_id);
        self.record_activity(
            LogAction::Updated,
            entity_name,
            customer_name,
            updated.total_amount,
            "Sale details updated",
            None,
        );

        self.sales[index] = updated;
    }

    /// Removes a sale, capturing it in a Deleted log for potential restore.
    ///
    /// Stock is deliberately NOT returned: deletion strikes the record from
    /// the books, the produce is still gone.
    pub fn delete_sale(&mut self, id: &str) {
        let Some(index) = self.sales.iter().position(|s| s.id == id) else {
            return;
        };

        let sale = self.sales[index].clone();
        let entity_name = self.product_name(&sale.product_id);
        let customer_name = self.customer_name(&sale.customer_id);
        self.record_activity(
            LogAction::Deleted,
            entity_name,
            customer_name,
            sale.total_amount,
            "Sale deleted",
            Some(sale),
        );

        self.sales.remove(index);
    }

    /// Re-inserts a deleted sale from its activity-log snapshot.
    ///
    /// ## Behavior
    /// Mirrors `add_sale`: the restored sale debits stock again. The
    /// consumed log is removed and a fresh Created log notes the
    /// restoration.
    ///
    /// ## Errors
    /// - [`CoreError::LogNotFound`]: the log id is unknown. Calling restore
    ///   twice hits this, since the first call consumed the log.
    /// - [`CoreError::NoSnapshot`]: the log carries no sale snapshot.
    /// - [`CoreError::RestoreConflict`]: a sale with the snapshot's id is
    ///   already in the ledger.
    pub fn restore_sale(&mut self, log_id: &str) -> CoreResult<()> {
        let Some(log_index) = self.logs.iter().position(|l| l.id == log_id) else {
            return Err(CoreError::LogNotFound(log_id.to_string()));
        };

        let Some(sale) = self.logs[log_index].metadata.clone() else {
            return Err(CoreError::NoSnapshot(log_id.to_string()));
        };

        if self.sales.iter().any(|s| s.id == sale.id) {
            return Err(CoreError::RestoreConflict(sale.id));
        }

        self.logs.remove(log_index);

        let entity_name = self.product_name(&sale.product_id);
        let customer_name = self.customer_name(&sale.customer_id);
        self.debit_stock(&sale.product_id, sale.quantity);
        self.record_activity(
            LogAction::Created,
            entity_name,
            customer_name,
            sale.total_amount,
            "Sale restored from activity log",
            None,
        );
        self.sales.insert(0, sale);

        Ok(())
    }

    /// Removes an activity log entry (explicit user action).
    pub fn delete_log(&mut self, id: &str) {
        self.logs.retain(|l| l.id != id);
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Adds a customer to the front of the list.
    pub fn add_customer(&mut self, customer: Customer) {
        self.customers.insert(0, customer);
    }

    /// Replaces a customer, cascading a rename into the audit trail.
    ///
    /// Silent no-op when no customer with that id exists.
    pub fn update_customer(&mut self, updated: Customer) {
        let Some(index) = self.customers.iter().position(|c| c.id == updated.id) else {
            return;
        };

        let old_name = self.customers[index].name.clone();
        if old_name != updated.name {
            self.rename_logs_for_customer(&old_name, &updated.name);
        }
        self.customers[index] = updated;
    }

    /// Removes a customer and every sale referencing it. Hard cascade, no
    /// undo: the removed sales leave no Deleted logs.
    pub fn delete_customer(&mut self, id: &str) {
        self.customers.retain(|c| c.id != id);
        self.sales.retain(|s| s.customer_id != id);
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Adds a product unless its name collides with the catalog.
    ///
    /// ## Returns
    /// `false` when a case-insensitive trimmed name match already exists;
    /// the catalog is left untouched. `true` when the product was inserted.
    pub fn add_product(&mut self, product: Product) -> bool {
        if self.find_product_by_name(&product.name).is_some() {
            return false;
        }
        self.products.insert(0, product);
        true
    }

    /// Replaces a product by id. Silent no-op when missing.
    pub fn update_product(&mut self, updated: Product) {
        if let Some(index) = self.products.iter().position(|p| p.id == updated.id) {
            self.products[index] = updated;
        }
    }

    /// Removes a product and every sale referencing it. Hard cascade.
    pub fn delete_product(&mut self, id: &str) {
        self.products.retain(|p| p.id != id);
        self.sales.retain(|s| s.product_id != id);
    }

    /// Sets a product's stock to an absolute value, clamped at 0.
    ///
    /// The add/remove/set adjustment arithmetic is the caller's job; this
    /// operation only accepts the final level.
    pub fn update_stock(&mut self, product_id: &str, new_stock: f64) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
            product.current_stock = new_stock.max(0.0);
        }
    }

    /// Applies the outcome of an image-generation task, keyed by product id.
    ///
    /// ## Behavior
    /// Sets the URL when generation produced one, and always clears the
    /// pending flag. A product deleted while generation was in flight makes
    /// this a no-op; last write wins between concurrent generations for the
    /// same product.
    pub fn apply_product_image(&mut self, product_id: &str, image_url: Option<String>) {
        if let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) {
            if image_url.is_some() {
                product.image_url = image_url;
            }
            product.image_pending = false;
        }
    }

    /// Marks a product as awaiting a freshly generated image and returns its
    /// name for the generation request. `None` when the product is unknown.
    pub fn request_product_image(&mut self, product_id: &str) -> Option<String> {
        let product = self.products.iter_mut().find(|p| p.id == product_id)?;
        product.image_pending = true;
        Some(product.name.clone())
    }

    // =========================================================================
    // Bulk imports
    // =========================================================================

    /// Clears the transactional collections. Settings survive; products are
    /// handled by each import's own semantics.
    fn wipe_session(&mut self) {
        self.sales.clear();
        self.customers.clear();
        self.expenses.clear();
        self.liabilities.clear();
        self.logs.clear();
    }

    /// Session-replacing product import: wipes transactional history and
    /// replaces the catalog with the given set.
    ///
    /// This is "start fresh with this dataset", not an additive import; use
    /// [`Ledger::import_product_catalog`] to grow an existing catalog.
    pub fn add_products_bulk(&mut self, products: Vec<Product>) {
        self.wipe_session();
        self.products = products;
    }

    /// Session-replacing sales import: wipes everything transactional and
    /// rebuilds customers, products and sales from the parsed rows.
    ///
    /// ## Synthesis
    /// Customers and products are created on first sight of a name
    /// (case-insensitive match within the batch). A synthesized product's
    /// unit price is derived from the first row that names it
    /// (amount ÷ quantity) and its stock starts at 0, so the per-sale debit
    /// floors there.
    pub fn bulk_import_sales(&mut self, rows: Vec<SaleImportRow>) {
        self.wipe_session();
        self.products.clear();

        for row in rows {
            let customer_id = match self.find_customer_by_name(&row.customer) {
                Some(index) => self.customers[index].id.clone(),
                None => {
                    let customer = Customer::new(row.customer.trim(), "");
                    let id = customer.id.clone();
                    self.customers.push(customer);
                    id
                }
            };

            let product_id = match self.find_product_by_name(&row.product) {
                Some(index) => self.products[index].id.clone(),
                None => {
                    let unit_price = if row.quantity > 0.0 {
                        Money::from_minor(
                            (row.amount.minor() as f64 / row.quantity).round() as i64
                        )
                    } else {
                        row.amount
                    };
                    let mut product = Product::new(
                        row.product.trim(),
                        unit_price,
                        row.category,
                        row.unit.clone(),
                    );
                    product.current_stock = 0.0;
                    let id = product.id.clone();
                    self.products.push(product);
                    id
                }
            };

            let mut sale = Sale::new(
                customer_id,
                product_id.clone(),
                row.quantity,
                row.amount,
                row.status,
            );
            sale.date = row.date;

            self.debit_stock(&product_id, row.quantity);
            self.sales.push(sale);
        }
    }

    /// Additive catalog import. Rows whose name collides case-insensitively
    /// with the existing catalog are silently skipped.
    ///
    /// ## Returns
    /// The number of products actually inserted.
    pub fn import_product_catalog(&mut self, rows: Vec<ProductImportRow>) -> usize {
        let mut inserted = 0;
        for row in rows {
            if self.find_product_by_name(&row.name).is_some() {
                continue;
            }
            let mut product = Product::new(row.name.trim(), row.price, row.category, row.unit);
            product.current_stock = row.stock;
            product.min_stock = row.min_stock;
            self.products.push(product);
            inserted += 1;
        }
        inserted
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    /// Adds an expense to the front of the list.
    pub fn add_expense(&mut self, expense: Expense) {
        self.expenses.insert(0, expense);
    }

    /// Replaces an expense by id. Silent no-op when missing.
    pub fn update_expense(&mut self, updated: Expense) {
        if let Some(index) = self.expenses.iter().position(|e| e.id == updated.id) {
            self.expenses[index] = updated;
        }
    }

    /// Removes an expense.
    pub fn delete_expense(&mut self, id: &str) {
        self.expenses.retain(|e| e.id != id);
    }

    // =========================================================================
    // Liabilities
    // =========================================================================

    /// Adds a liability to the front of the list.
    pub fn add_liability(&mut self, liability: Liability) {
        self.liabilities.insert(0, liability);
    }

    /// Replaces a liability by id. Settlement is one-way: once the stored
    /// record says Settled, an edit cannot flip it back to Active.
    pub fn update_liability(&mut self, mut updated: Liability) {
        if let Some(index) = self.liabilities.iter().position(|l| l.id == updated.id) {
            if self.liabilities[index].status == LiabilityStatus::Settled {
                updated.status = LiabilityStatus::Settled;
            }
            self.liabilities[index] = updated;
        }
    }

    /// Removes a liability.
    pub fn delete_liability(&mut self, id: &str) {
        self.liabilities.retain(|l| l.id != id);
    }

    /// Marks a liability as settled.
    pub fn settle_liability(&mut self, id: &str) {
        if let Some(liability) = self.liabilities.iter_mut().find(|l| l.id == id) {
            liability.status = LiabilityStatus::Settled;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::SaleImportRow;
    use crate::types::{PaymentStatus, ProductCategory, Rate};
    use chrono::Utc;

    fn stocked_product(name: &str, stock: f64) -> Product {
        let mut product = Product::new(
            name,
            Money::from_minor(4500),
            ProductCategory::Vegetables,
            "kg",
        );
        product.current_stock = stock;
        product.min_stock = 5.0;
        product
    }

    fn sale_for(product: &Product, qty: f64) -> Sale {
        Sale::new(
            "",
            &product.id,
            qty,
            Money::from_minor((4500.0 * qty) as i64),
            PaymentStatus::Paid,
        )
    }

    #[test]
    fn test_add_sale_decrements_stock_and_logs() {
        let mut ledger = Ledger::new();
        let kale = stocked_product("Kale", 10.0);
        let kale_id = kale.id.clone();
        ledger.add_product(kale);

        let sale = sale_for(&ledger.products[0], 4.0);
        ledger.add_sale(sale);

        assert_eq!(ledger.sales.len(), 1);
        assert_eq!(ledger.products[0].current_stock, 6.0);
        assert_eq!(ledger.logs.len(), 1);
        assert_eq!(ledger.logs[0].action, LogAction::Created);
        assert_eq!(ledger.logs[0].entity_name, "Kale");
        assert_eq!(ledger.logs[0].customer_name, RETAIL_CUSTOMER);
        assert_eq!(ledger.product_name(&kale_id), "Kale");
    }

    #[test]
    fn test_add_sale_stock_floors_at_zero() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 3.0));

        let sale = sale_for(&ledger.products[0], 10.0);
        ledger.add_sale(sale);

        assert_eq!(ledger.products[0].current_stock, 0.0);
    }

    #[test]
    fn test_add_sale_with_dangling_product_still_lands() {
        let mut ledger = Ledger::new();
        let sale = Sale::new("", "no-such-product", 2.0, Money::from_minor(900), PaymentStatus::Paid);
        ledger.add_sale(sale);

        assert_eq!(ledger.sales.len(), 1);
        assert_eq!(ledger.logs[0].entity_name, UNKNOWN_PRODUCT);
    }

    #[test]
    fn test_update_sale_reconciles_across_products() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Apples", 20.0));
        ledger.add_product(stocked_product("Kale", 10.0));
        // insert order: Kale sits at index 0, Apples at index 1
        let kale_id = ledger.products[0].id.clone();
        let apples_id = ledger.products[1].id.clone();

        let sale = Sale::new("", &kale_id, 2.0, Money::from_minor(9000), PaymentStatus::Paid);
        let sale_id = sale.id.clone();
        ledger.add_sale(sale);
        assert_eq!(ledger.products[0].current_stock, 8.0);

        // Reassign to Apples with quantity 5
        let mut updated = ledger.sales[0].clone();
        updated.product_id = apples_id.clone();
        updated.quantity = 5.0;
        ledger.update_sale(updated);

        let kale = ledger.products.iter().find(|p| p.id == kale_id).unwrap();
        let apples = ledger.products.iter().find(|p| p.id == apples_id).unwrap();
        assert_eq!(kale.current_stock, 10.0); // +2 back
        assert_eq!(apples.current_stock, 15.0); // −5
        assert_eq!(ledger.sales[0].id, sale_id);
        assert_eq!(ledger.logs[0].action, LogAction::Updated);
    }

    #[test]
    fn test_update_sale_missing_is_noop() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));

        let ghost = Sale::new("", &ledger.products[0].id, 3.0, Money::from_minor(100), PaymentStatus::Paid);
        ledger.update_sale(ghost);

        assert!(ledger.sales.is_empty());
        assert!(ledger.logs.is_empty());
        assert_eq!(ledger.products[0].current_stock, 10.0);
    }

    /// The full delete/restore scenario: stock asymmetry on delete, snapshot
    /// metadata, consumption of the log, and the second debit on restore.
    #[test]
    fn test_kale_delete_restore_scenario() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        let kale_id = ledger.products[0].id.clone();

        let sale = Sale::new("", &kale_id, 4.0, Money::from_minor(18000), PaymentStatus::Paid);
        let sale_id = sale.id.clone();
        ledger.add_sale(sale);
        assert_eq!(ledger.products[0].current_stock, 6.0);

        // Delete: stock stays, Deleted log carries the full sale
        ledger.delete_sale(&sale_id);
        assert!(ledger.sales.is_empty());
        assert_eq!(ledger.products[0].current_stock, 6.0);
        let deleted_log = ledger.logs[0].clone();
        assert_eq!(deleted_log.action, LogAction::Deleted);
        let snapshot = deleted_log.metadata.as_ref().unwrap();
        assert_eq!(snapshot.id, sale_id);
        assert_eq!(snapshot.quantity, 4.0);

        // Restore: sale back under the same id, stock debited again
        ledger.restore_sale(&deleted_log.id).unwrap();
        assert_eq!(ledger.sales.len(), 1);
        assert_eq!(ledger.sales[0].id, sale_id);
        assert_eq!(ledger.products[0].current_stock, 2.0);
        assert!(ledger.logs.iter().all(|l| l.id != deleted_log.id));
        assert_eq!(ledger.logs[0].action, LogAction::Created);
    }

    #[test]
    fn test_restore_twice_errors_on_consumed_log() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        let sale = sale_for(&ledger.products[0], 2.0);
        let sale_id = sale.id.clone();
        ledger.add_sale(sale);
        ledger.delete_sale(&sale_id);

        let log_id = ledger.logs[0].id.clone();
        ledger.restore_sale(&log_id).unwrap();

        let err = ledger.restore_sale(&log_id).unwrap_err();
        assert!(matches!(err, CoreError::LogNotFound(_)));
        assert_eq!(ledger.sales.len(), 1); // no double insert
    }

    #[test]
    fn test_restore_conflict_when_sale_already_exists() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        let sale = sale_for(&ledger.products[0], 2.0);
        let sale_id = sale.id.clone();
        ledger.add_sale(sale.clone());
        ledger.delete_sale(&sale_id);
        let log_id = ledger.logs[0].id.clone();

        // The same sale sneaks back in before the restore
        ledger.add_sale(sale);

        let err = ledger.restore_sale(&log_id).unwrap_err();
        assert!(matches!(err, CoreError::RestoreConflict(_)));
        // The log was not consumed by the failed attempt
        assert!(ledger.logs.iter().any(|l| l.id == log_id));
    }

    #[test]
    fn test_restore_requires_snapshot() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        ledger.add_sale(sale_for(&ledger.products[0], 1.0));

        // Created logs carry no metadata
        let log_id = ledger.logs[0].id.clone();
        let err = ledger.restore_sale(&log_id).unwrap_err();
        assert!(matches!(err, CoreError::NoSnapshot(_)));
    }

    #[test]
    fn test_delete_log() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        ledger.add_sale(sale_for(&ledger.products[0], 1.0));
        let log_id = ledger.logs[0].id.clone();

        ledger.delete_log(&log_id);
        assert!(ledger.logs.is_empty());
    }

    #[test]
    fn test_delete_customer_cascades_sales() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 50.0));
        let product_id = ledger.products[0].id.clone();

        let asha = Customer::new("Asha", "9841000000");
        let asha_id = asha.id.clone();
        ledger.add_customer(asha);
        let bina = Customer::new("Bina", "9841111111");
        let bina_id = bina.id.clone();
        ledger.add_customer(bina);

        ledger.add_sale(Sale::new(&asha_id, &product_id, 1.0, Money::from_minor(100), PaymentStatus::Paid));
        ledger.add_sale(Sale::new(&bina_id, &product_id, 2.0, Money::from_minor(200), PaymentStatus::Paid));
        ledger.add_sale(Sale::new(&asha_id, &product_id, 3.0, Money::from_minor(300), PaymentStatus::Pending));

        ledger.delete_customer(&asha_id);

        assert!(ledger.customers.iter().all(|c| c.id != asha_id));
        assert_eq!(ledger.sales.iter().filter(|s| s.customer_id == asha_id).count(), 0);
        assert_eq!(ledger.sales.len(), 1);
        assert_eq!(ledger.sales[0].customer_id, bina_id);
    }

    #[test]
    fn test_update_customer_cascades_rename_into_logs() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 50.0));
        let product_id = ledger.products[0].id.clone();

        let alice = Customer::new("Alice", "98");
        let alice_id = alice.id.clone();
        ledger.add_customer(alice);
        let carol = Customer::new("Carol", "97");
        let carol_id = carol.id.clone();
        ledger.add_customer(carol);

        ledger.add_sale(Sale::new(&alice_id, &product_id, 1.0, Money::from_minor(100), PaymentStatus::Paid));
        ledger.add_sale(Sale::new(&carol_id, &product_id, 1.0, Money::from_minor(100), PaymentStatus::Paid));

        let mut renamed = ledger.customers.iter().find(|c| c.id == alice_id).unwrap().clone();
        renamed.name = "Alice Smith".to_string();
        ledger.update_customer(renamed);

        assert!(ledger.logs.iter().any(|l| l.customer_name == "Alice Smith"));
        assert!(ledger.logs.iter().all(|l| l.customer_name != "Alice"));
        assert!(ledger.logs.iter().any(|l| l.customer_name == "Carol"));
    }

    #[test]
    fn test_add_product_duplicate_rejected_case_insensitive() {
        let mut ledger = Ledger::new();
        assert!(ledger.add_product(stocked_product("Tomato", 5.0)));
        assert!(!ledger.add_product(stocked_product("tomato", 99.0)));
        assert!(!ledger.add_product(stocked_product("  TOMATO ", 99.0)));
        assert_eq!(ledger.products.len(), 1);
        assert_eq!(ledger.products[0].current_stock, 5.0);
    }

    #[test]
    fn test_delete_product_cascades_sales() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        ledger.add_product(stocked_product("Milk", 10.0));
        let kale_id = ledger.products[1].id.clone();
        let milk_id = ledger.products[0].id.clone();

        ledger.add_sale(Sale::new("", &kale_id, 1.0, Money::from_minor(100), PaymentStatus::Paid));
        ledger.add_sale(Sale::new("", &milk_id, 1.0, Money::from_minor(100), PaymentStatus::Paid));

        ledger.delete_product(&kale_id);

        assert_eq!(ledger.products.len(), 1);
        assert!(ledger.sales.iter().all(|s| s.product_id != kale_id));
        assert_eq!(ledger.sales.len(), 1);
    }

    #[test]
    fn test_update_stock_is_absolute_and_clamped() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        let id = ledger.products[0].id.clone();

        ledger.update_stock(&id, 25.5);
        assert_eq!(ledger.products[0].current_stock, 25.5);

        ledger.update_stock(&id, -3.0);
        assert_eq!(ledger.products[0].current_stock, 0.0);
    }

    #[test]
    fn test_apply_product_image() {
        let mut ledger = Ledger::new();
        let mut kale = stocked_product("Kale", 10.0);
        kale.image_pending = true;
        let id = kale.id.clone();
        ledger.add_product(kale);

        // Failure clears the flag without setting a URL
        ledger.apply_product_image(&id, None);
        assert!(!ledger.products[0].image_pending);
        assert!(ledger.products[0].image_url.is_none());

        ledger.products[0].image_pending = true;
        ledger.apply_product_image(&id, Some("https://img.example/kale.png".to_string()));
        assert!(!ledger.products[0].image_pending);
        assert_eq!(
            ledger.products[0].image_url.as_deref(),
            Some("https://img.example/kale.png")
        );

        // Product gone mid-flight: no panic, no effect
        ledger.apply_product_image("missing", Some("x".to_string()));
    }

    #[test]
    fn test_request_product_image_marks_pending() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        let id = ledger.products[0].id.clone();

        let name = ledger.request_product_image(&id);
        assert_eq!(name.as_deref(), Some("Kale"));
        assert!(ledger.products[0].image_pending);

        assert!(ledger.request_product_image("missing").is_none());
    }

    #[test]
    fn test_add_products_bulk_wipes_session() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Old", 1.0));
        ledger.add_customer(Customer::new("Asha", "98"));
        ledger.add_sale(sale_for(&ledger.products[0], 1.0));
        ledger.add_expense(Expense::new("Seeds", Money::from_minor(500), "Seeds"));
        ledger.add_liability(Liability::new(
            "Coop Bank",
            Money::from_minor(100000),
            Rate::from_bps(1200),
            Utc::now(),
            Utc::now(),
        ));
        ledger.settings.theme_mode = crate::types::ThemeMode::Dark;

        let imported = vec![stocked_product("Kale", 10.0), stocked_product("Milk", 5.0)];
        ledger.add_products_bulk(imported);

        assert!(ledger.sales.is_empty());
        assert!(ledger.customers.is_empty());
        assert!(ledger.expenses.is_empty());
        assert!(ledger.liabilities.is_empty());
        assert!(ledger.logs.is_empty());
        assert_eq!(ledger.products.len(), 2);
        // Settings are not part of the wipe
        assert_eq!(ledger.settings.theme_mode, crate::types::ThemeMode::Dark);
    }

    #[test]
    fn test_bulk_import_sales_synthesizes_entities() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Old", 1.0));

        let rows = vec![
            SaleImportRow {
                date: Utc::now(),
                customer: "Asha".to_string(),
                product: "Kale".to_string(),
                amount: Money::from_minor(9000),
                category: ProductCategory::Vegetables,
                quantity: 2.0,
                unit: "kg".to_string(),
                status: PaymentStatus::Paid,
            },
            SaleImportRow {
                date: Utc::now(),
                customer: "asha".to_string(), // same customer, different case
                product: "KALE".to_string(),  // same product, different case
                amount: Money::from_minor(4500),
                category: ProductCategory::Vegetables,
                quantity: 1.0,
                unit: "kg".to_string(),
                status: PaymentStatus::Pending,
            },
            SaleImportRow {
                date: Utc::now(),
                customer: "Bina".to_string(),
                product: "Milk".to_string(),
                amount: Money::from_minor(16000),
                category: ProductCategory::Dairy,
                quantity: 2.0,
                unit: "litre".to_string(),
                status: PaymentStatus::Paid,
            },
        ];

        ledger.bulk_import_sales(rows);

        assert_eq!(ledger.customers.len(), 2);
        assert_eq!(ledger.products.len(), 2);
        assert_eq!(ledger.sales.len(), 3);
        assert!(ledger.logs.is_empty());

        // Unit price derived from the first Kale row: 9000 / 2
        let kale = ledger.products.iter().find(|p| p.name == "Kale").unwrap();
        assert_eq!(kale.price.minor(), 4500);
        // Stock started at 0 and the debits floored there
        assert_eq!(kale.current_stock, 0.0);

        let milk = ledger.products.iter().find(|p| p.name == "Milk").unwrap();
        assert_eq!(milk.price.minor(), 8000);
        assert_eq!(milk.unit, "litre");
    }

    #[test]
    fn test_import_product_catalog_skips_duplicates() {
        let mut ledger = Ledger::new();
        ledger.add_product(stocked_product("Kale", 10.0));
        ledger.add_customer(Customer::new("Asha", "98"));

        let rows = vec![
            ProductImportRow {
                name: "kale".to_string(), // dup of existing
                price: Money::from_minor(9999),
                category: ProductCategory::Vegetables,
                unit: "kg".to_string(),
                stock: 50.0,
                min_stock: 5.0,
            },
            ProductImportRow {
                name: "Wheat".to_string(),
                price: Money::from_minor(3200),
                category: ProductCategory::Grains,
                unit: "kg".to_string(),
                stock: 100.0,
                min_stock: 20.0,
            },
        ];

        let inserted = ledger.import_product_catalog(rows);

        assert_eq!(inserted, 1);
        assert_eq!(ledger.products.len(), 2);
        // Additive: nothing else was wiped
        assert_eq!(ledger.customers.len(), 1);
        // The existing Kale kept its price
        let kale = ledger.products.iter().find(|p| p.name == "Kale").unwrap();
        assert_eq!(kale.price.minor(), 4500);
    }

    #[test]
    fn test_expense_crud() {
        let mut ledger = Ledger::new();
        let expense = Expense::new("Urea bags", Money::from_minor(250000), "Fertilizer");
        let id = expense.id.clone();
        ledger.add_expense(expense);
        assert_eq!(ledger.expenses.len(), 1);

        let mut updated = ledger.expenses[0].clone();
        updated.amount = Money::from_minor(300000);
        ledger.update_expense(updated);
        assert_eq!(ledger.expenses[0].amount.minor(), 300000);

        ledger.delete_expense(&id);
        assert!(ledger.expenses.is_empty());
    }

    #[test]
    fn test_settle_liability_is_one_way() {
        let mut ledger = Ledger::new();
        let loan = Liability::new(
            "Coop Bank",
            Money::from_minor(5000000),
            Rate::from_bps(1200),
            Utc::now(),
            Utc::now(),
        );
        let id = loan.id.clone();
        ledger.add_liability(loan);

        ledger.settle_liability(&id);
        assert_eq!(ledger.liabilities[0].status, LiabilityStatus::Settled);

        // An edit cannot reactivate a settled liability
        let mut updated = ledger.liabilities[0].clone();
        updated.status = LiabilityStatus::Active;
        updated.source = "Coop Bank Ltd".to_string();
        ledger.update_liability(updated);

        assert_eq!(ledger.liabilities[0].source, "Coop Bank Ltd");
        assert_eq!(ledger.liabilities[0].status, LiabilityStatus::Settled);
    }
}
