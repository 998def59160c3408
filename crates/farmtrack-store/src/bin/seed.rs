//! # Seed Data Generator
//!
//! Writes a demo ledger snapshot to the local store for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default directory (./farmtrack_dev)
//! cargo run -p farmtrack-store --bin seed
//!
//! # Seed a specific data directory
//! cargo run -p farmtrack-store --bin seed -- --dir ~/farmtrack-data
//!
//! # Custom number of sales
//! cargo run -p farmtrack-store --bin seed -- --sales 60
//!
//! # Build everything but write nothing
//! cargo run -p farmtrack-store --bin seed -- --dry-run
//! ```
//!
//! ## Generated Data
//! - A farm product catalog (vegetables, fruits, dairy, grains, services)
//! - A handful of regular customers
//! - Sales spread over the last month, mixing paid and pending
//! - Expenses across the standard categories
//! - One active bank loan

use std::env;

use chrono::{Duration, Utc};
use farmtrack_core::{
    Customer, Expense, Ledger, Liability, Money, PaymentStatus, Product, ProductCategory, Rate,
    Sale, Snapshot,
};
use farmtrack_store::{LocalStore, MemoryStore, SnapshotStore};
use tracing_subscriber::EnvFilter;

/// Catalog rows: name, unit price (minor), category, unit, stock, min stock.
const PRODUCTS: &[(&str, i64, &str, &str, f64, f64)] = &[
    ("Kale", 4_500, "Vegetables", "kg", 40.0, 5.0),
    ("Spinach", 3_000, "Vegetables", "kg", 35.0, 5.0),
    ("Tomatoes", 6_000, "Vegetables", "kg", 60.0, 10.0),
    ("Cauliflower", 8_000, "Vegetables", "kg", 25.0, 5.0),
    ("Potatoes", 3_500, "Vegetables", "kg", 120.0, 20.0),
    ("Apples", 18_000, "Fruits", "kg", 30.0, 5.0),
    ("Bananas", 9_000, "Fruits", "dozen", 20.0, 4.0),
    ("Milk", 8_000, "Dairy", "litre", 50.0, 10.0),
    ("Paneer", 45_000, "Dairy", "kg", 8.0, 2.0),
    ("Eggs", 18_000, "Dairy", "dozen", 15.0, 3.0),
    ("Rice", 9_500, "Grains", "kg", 200.0, 50.0),
    ("Wheat", 5_500, "Grains", "kg", 150.0, 30.0),
    ("Maize", 4_000, "Grains", "kg", 80.0, 20.0),
    ("Tractor Rental", 250_000, "Service", "hour", 0.0, 0.0),
];

/// Customer rows: name, phone.
const CUSTOMERS: &[(&str, &str)] = &[
    ("Asha Gurung", "9800000001"),
    ("Bina Thapa", "9800000002"),
    ("Chandra Rai", "9800000003"),
    ("Dipesh Shrestha", "9800000004"),
    ("Hotel Annapurna", "9800000005"),
];

/// Expense rows: description, category, amount (minor).
const EXPENSES: &[(&str, &str, i64)] = &[
    ("Hybrid tomato seeds", "Seeds", 120_000),
    ("Urea fertilizer 50kg", "Fertilizer", 180_000),
    ("Cattle feed pellets", "Feed", 95_000),
    ("Field labor, harvest week", "Labor", 240_000),
    ("Drip irrigation repair", "Maintenance", 35_000),
    ("Diesel for tiller", "Fuel", 42_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut dir = String::from("./farmtrack_dev");
    let mut sale_count: usize = 25;
    let mut dry_run = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" | "-d" => {
                if i + 1 < args.len() {
                    dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sale_count = args[i + 1].parse().unwrap_or(25);
                    i += 1;
                }
            }
            "--dry-run" => {
                dry_run = true;
            }
            "--help" | "-h" => {
                println!("FarmTrack Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --dir <PATH>   Data directory (default: ./farmtrack_dev)");
                println!("  -s, --sales <N>    Number of sales to generate (default: 25)");
                println!("      --dry-run      Build the ledger but write nothing");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 FarmTrack Seed Data Generator");
    println!("================================");
    println!("Directory: {}", dir);
    println!("Sales:     {}", sale_count);
    println!();

    let ledger = build_demo_ledger(sale_count);
    println!("✓ Built demo ledger");
    println!("  Products:    {}", ledger.products.len());
    println!("  Customers:   {}", ledger.customers.len());
    println!("  Sales:       {}", ledger.sales.len());
    println!("  Expenses:    {}", ledger.expenses.len());
    println!("  Liabilities: {}", ledger.liabilities.len());
    println!("  Log entries: {}", ledger.logs.len());

    let snapshot = Snapshot::capture(&ledger, Utc::now().timestamp_millis());

    if dry_run {
        let store = MemoryStore::new();
        store.save(&snapshot).await?;
        println!();
        println!("✓ Dry run: snapshot held in memory only");
        return Ok(());
    }

    let store = LocalStore::new(&dir);

    if store.load().await?.is_some() {
        println!();
        println!("⚠ {} already has a snapshot", store.path().display());
        println!("  Skipping seed to avoid overwriting real data.");
        println!("  Delete the file to regenerate.");
        return Ok(());
    }

    store.save(&snapshot).await?;

    println!();
    println!("✓ Snapshot written to {}", store.path().display());
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a populated ledger through the normal mutation operations, so
/// stock levels and the activity feed come out consistent.
fn build_demo_ledger(sale_count: usize) -> Ledger {
    let mut ledger = Ledger::default();

    for (name, price, category, unit, stock, min_stock) in PRODUCTS {
        let mut product = Product::new(
            *name,
            Money::from_minor(*price),
            ProductCategory::parse_loose(category),
            *unit,
        );
        product.current_stock = *stock;
        product.min_stock = *min_stock;
        ledger.add_product(product);
    }

    for (name, phone) in CUSTOMERS {
        ledger.add_customer(Customer::new(*name, *phone));
    }

    for i in 0..sale_count {
        let product = ledger.products[i % ledger.products.len()].clone();
        let customer = ledger.customers[i % ledger.customers.len()].clone();

        let quantity = 1.0 + (i % 5) as f64;
        let total = product.price_for_qty(quantity);
        let status = if i % 4 == 0 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Paid
        };

        let mut sale = Sale::new(customer.id, product.id, quantity, total, status);
        sale.date = Utc::now() - Duration::days((i % 30) as i64);
        ledger.add_sale(sale);
    }

    for (description, category, amount) in EXPENSES {
        ledger.add_expense(Expense::new(*description, Money::from_minor(*amount), *category));
    }

    let loan_start = Utc::now() - Duration::days(180);
    ledger.add_liability(Liability::new(
        "Agricultural Development Bank",
        Money::from_minor(5_000_000),
        Rate::from_bps(1_200),
        loan_start,
        loan_start + Duration::days(365),
    ));

    ledger
}
