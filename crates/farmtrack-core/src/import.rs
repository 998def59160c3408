//! # CSV Import Parsing
//!
//! Pure text-in/rows-out parsing for the two bulk-import surfaces: sales
//! history and the product catalog.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CSV Import Contracts                               │
//! │                                                                         │
//! │  Sales history            Product catalog                               │
//! │  ─────────────            ───────────────                               │
//! │  Date      (required)     Name      (required)                          │
//! │  Customer  (required)     Price     (required)                          │
//! │  Product   (required)     Category  (optional, General)                 │
//! │  Amount    (required)     Unit      (optional, "kg")                    │
//! │  Category  (optional)     Stock     (optional, 0)                       │
//! │  Quantity  (optional, 1)  MinLevel  (optional, 0)                       │
//! │  Unit      (optional,kg)                                                │
//! │  Status    (optional,                                                   │
//! │             Paid)                                                       │
//! │                                                                         │
//! │  Headers resolve case- and substring-insensitively: a column named     │
//! │  "Sale Date (AD)" satisfies Date, "Customer Name" satisfies Customer.  │
//! │                                                                         │
//! │  One bad cell aborts the whole file: rows parsed before the error      │
//! │  are never applied.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The splitter understands quoted fields, doubled-quote escapes, CRLF line
//! endings and a leading BOM. Exports from spreadsheet tools are the
//! expected input, nothing more exotic.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::ImportError;
use crate::money::Money;
use crate::types::{PaymentStatus, ProductCategory};

// =============================================================================
// Parsed Row Types
// =============================================================================

/// One parsed sales-history row, ready for [`crate::Ledger::bulk_import_sales`].
#[derive(Debug, Clone)]
pub struct SaleImportRow {
    pub date: DateTime<Utc>,
    pub customer: String,
    pub product: String,
    pub amount: Money,
    pub category: ProductCategory,
    pub quantity: f64,
    pub unit: String,
    pub status: PaymentStatus,
}

/// One parsed catalog row, ready for [`crate::Ledger::import_product_catalog`].
#[derive(Debug, Clone)]
pub struct ProductImportRow {
    pub name: String,
    pub price: Money,
    pub category: ProductCategory,
    pub unit: String,
    pub stock: f64,
    pub min_stock: f64,
}

// =============================================================================
// CSV Splitter
// =============================================================================

/// Splits raw CSV text into trimmed cells.
///
/// Handles quoted fields (commas and newlines inside quotes), doubled-quote
/// escapes, CR/LF endings and a UTF-8 BOM. Blank lines are dropped.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    // Doubled quote inside a quoted cell is a literal quote
                    if chars.peek() == Some(&'"') {
                        cell.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
                _ => cell.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    row.push(cell.trim().to_string());
                    cell = String::new();
                }
                '\r' => {}
                '\n' => {
                    row.push(cell.trim().to_string());
                    cell = String::new();
                    if row.iter().any(|c| !c.is_empty()) {
                        rows.push(row);
                    }
                    row = Vec::new();
                }
                _ => cell.push(c),
            }
        }
    }

    row.push(cell.trim().to_string());
    if row.iter().any(|c| !c.is_empty()) {
        rows.push(row);
    }

    rows
}

/// Resolves a column index from the header row.
///
/// Exact (case-insensitive) matches win over substring matches so that
/// "Unit" binds before "Unit Price" and "Stock" before "Min Stock".
fn resolve_column(headers: &[String], key: &str) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    lowered
        .iter()
        .position(|h| h == key)
        .or_else(|| lowered.iter().position(|h| h.contains(key)))
}

fn required_column(headers: &[String], key: &str, label: &str) -> Result<usize, ImportError> {
    resolve_column(headers, key).ok_or_else(|| ImportError::MissingColumn {
        column: label.to_string(),
    })
}

/// Cell accessor tolerant of short rows.
fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.as_str()).unwrap_or("")
}

fn optional_cell(row: &[String], index: Option<usize>) -> &str {
    index.map(|i| cell(row, i)).unwrap_or("")
}

// =============================================================================
// Cell Parsers
// =============================================================================

/// Parses an amount cell into minor units without going through floats.
///
/// Tolerates thousands separators and a currency prefix ("Rs 1,450.50").
/// A third decimal digit rounds half up.
fn parse_money_cell(raw: &str) -> Option<Money> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
    let cleaned = cleaned
        .trim_start_matches(|c: char| c != '-' && c != '.' && !c.is_ascii_digit());
    if cleaned.is_empty() {
        return None;
    }

    let negative = cleaned.starts_with('-');
    let unsigned = cleaned.trim_start_matches('-');
    let (major_str, minor_str) = match unsigned.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (unsigned, ""),
    };

    let major: i64 = if major_str.is_empty() {
        0
    } else {
        major_str.parse().ok()?
    };
    let minor: i64 = match minor_str.len() {
        0 => 0,
        1 => minor_str.parse::<i64>().ok()? * 10,
        _ => {
            if !minor_str.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let mut two: i64 = minor_str[..2].parse().ok()?;
            if let Some(third) = minor_str.chars().nth(2).and_then(|c| c.to_digit(10)) {
                if third >= 5 {
                    two += 1;
                }
            }
            two
        }
    };

    let mut total = major * 100 + minor;
    if negative {
        total = -total;
    }
    Some(Money::from_minor(total))
}

/// Parses a date cell. Accepted formats, in order:
/// RFC 3339, `YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY`.
fn parse_date_cell(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&midnight));
        }
    }
    None
}

fn parse_qty_cell(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let qty: f64 = cleaned.trim().parse().ok()?;
    if qty.is_finite() && qty > 0.0 {
        Some(qty)
    } else {
        None
    }
}

fn parse_stock_cell(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let level: f64 = cleaned.trim().parse().ok()?;
    if level.is_finite() {
        Some(level.max(0.0))
    } else {
        None
    }
}

// =============================================================================
// Sales History Import
// =============================================================================

/// Parses a sales-history CSV.
///
/// ## Required columns
/// Date, Customer, Product, Amount (resolved case/substring-insensitively).
///
/// ## Defaults
/// Quantity 1, Unit "kg", Status Paid. A status cell that is not literally
/// "paid" (any case) becomes Pending. Category cells map onto
/// [`ProductCategory`] with a General fallback.
///
/// ## Errors
/// The first unresolvable header or bad cell aborts the whole import; no
/// rows are returned.
pub fn parse_sales_csv(text: &str) -> Result<Vec<SaleImportRow>, ImportError> {
    let rows = parse_csv(text);
    if rows.len() < 2 {
        return Err(ImportError::Empty);
    }

    let headers = &rows[0];
    let date_col = required_column(headers, "date", "Date")?;
    let customer_col = required_column(headers, "customer", "Customer")?;
    let product_col = required_column(headers, "product", "Product")?;
    let amount_col = required_column(headers, "amount", "Amount")?;
    let category_col = resolve_column(headers, "category");
    let quantity_col = resolve_column(headers, "quantity");
    let unit_col = resolve_column(headers, "unit");
    let status_col = resolve_column(headers, "status");

    let mut parsed = Vec::with_capacity(rows.len() - 1);
    for (index, row) in rows.iter().enumerate().skip(1) {
        let line = index + 1;

        let date_raw = cell(row, date_col);
        if date_raw.is_empty() {
            return Err(ImportError::MissingValue {
                line,
                column: "Date".to_string(),
            });
        }
        let date = parse_date_cell(date_raw).ok_or_else(|| ImportError::InvalidDate {
            line,
            value: date_raw.to_string(),
        })?;

        let customer = cell(row, customer_col);
        if customer.is_empty() {
            return Err(ImportError::MissingValue {
                line,
                column: "Customer".to_string(),
            });
        }

        let product = cell(row, product_col);
        if product.is_empty() {
            return Err(ImportError::MissingValue {
                line,
                column: "Product".to_string(),
            });
        }

        let amount_raw = cell(row, amount_col);
        let amount = parse_money_cell(amount_raw).ok_or_else(|| ImportError::InvalidNumber {
            line,
            column: "Amount".to_string(),
            value: amount_raw.to_string(),
        })?;

        let category_raw = optional_cell(row, category_col);
        let category = if category_raw.is_empty() {
            ProductCategory::General
        } else {
            ProductCategory::parse_loose(category_raw)
        };

        let quantity_raw = optional_cell(row, quantity_col);
        let quantity = if quantity_raw.is_empty() {
            1.0
        } else {
            parse_qty_cell(quantity_raw).ok_or_else(|| ImportError::InvalidNumber {
                line,
                column: "Quantity".to_string(),
                value: quantity_raw.to_string(),
            })?
        };

        let unit_raw = optional_cell(row, unit_col);
        let unit = if unit_raw.is_empty() { "kg" } else { unit_raw };

        let status_raw = optional_cell(row, status_col);
        let status = if status_raw.is_empty() || status_raw.eq_ignore_ascii_case("paid") {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };

        parsed.push(SaleImportRow {
            date,
            customer: customer.to_string(),
            product: product.to_string(),
            amount,
            category,
            quantity,
            unit: unit.to_string(),
            status,
        });
    }

    Ok(parsed)
}

// =============================================================================
// Product Catalog Import
// =============================================================================

/// Parses a product-catalog CSV.
///
/// ## Required columns
/// Name, Price. Optional: Category, Unit, Stock, MinLevel.
///
/// Duplicate handling against the existing catalog belongs to
/// [`crate::Ledger::import_product_catalog`]; this function only parses.
pub fn parse_product_csv(text: &str) -> Result<Vec<ProductImportRow>, ImportError> {
    let rows = parse_csv(text);
    if rows.len() < 2 {
        return Err(ImportError::Empty);
    }

    let headers = &rows[0];
    let name_col = required_column(headers, "name", "Name")?;
    let price_col = required_column(headers, "price", "Price")?;
    let category_col = resolve_column(headers, "category");
    let unit_col = resolve_column(headers, "unit");
    let stock_col = resolve_column(headers, "stock");
    let min_col = resolve_column(headers, "min");

    let mut parsed = Vec::with_capacity(rows.len() - 1);
    for (index, row) in rows.iter().enumerate().skip(1) {
        let line = index + 1;

        let name = cell(row, name_col);
        if name.is_empty() {
            return Err(ImportError::MissingValue {
                line,
                column: "Name".to_string(),
            });
        }

        let price_raw = cell(row, price_col);
        let price = parse_money_cell(price_raw).ok_or_else(|| ImportError::InvalidNumber {
            line,
            column: "Price".to_string(),
            value: price_raw.to_string(),
        })?;

        let category_raw = optional_cell(row, category_col);
        let category = if category_raw.is_empty() {
            ProductCategory::General
        } else {
            ProductCategory::parse_loose(category_raw)
        };

        let unit_raw = optional_cell(row, unit_col);
        let unit = if unit_raw.is_empty() { "kg" } else { unit_raw };

        let stock_raw = optional_cell(row, stock_col);
        let stock = if stock_raw.is_empty() {
            0.0
        } else {
            parse_stock_cell(stock_raw).ok_or_else(|| ImportError::InvalidNumber {
                line,
                column: "Stock".to_string(),
                value: stock_raw.to_string(),
            })?
        };

        let min_raw = optional_cell(row, min_col);
        let min_stock = if min_raw.is_empty() {
            0.0
        } else {
            parse_stock_cell(min_raw).ok_or_else(|| ImportError::InvalidNumber {
                line,
                column: "MinLevel".to_string(),
                value: min_raw.to_string(),
            })?
        };

        parsed.push(ProductImportRow {
            name: name.to_string(),
            price,
            category,
            unit: unit.to_string(),
            stock,
            min_stock,
        });
    }

    Ok(parsed)
}

// =============================================================================
// Unit Tests
// =============================================================================
