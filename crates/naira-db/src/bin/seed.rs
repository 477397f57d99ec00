//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Default catalog into ./naira_pos.db
//! cargo run -p naira-db --bin seed
//!
//! # Specify database path
//! cargo run -p naira-db --bin seed -- --db ./data/naira_pos.db
//! ```
//!
//! ## Generated Products
//! Everyday Nigerian retail lines across categories (provisions, grains,
//! drinks, toiletries), each with a SKU `{CAT}-{NNN}`, a demo barcode,
//! a Naira price and opening stock.
//!
//! Staff accounts are not seeded here. The server creates the first admin
//! from `NAIRA_BOOTSTRAP_ADMIN_PASSWORD` on startup.

use std::env;

use naira_core::NewProduct;
use naira_db::{Database, DbConfig};

/// (category, sku prefix, [(name, price in naira, opening stock)])
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Provisions",
        "PRV",
        &[
            ("Peak Milk Powder 400g", 2_500, 40),
            ("Milo Refill 500g", 1_800, 35),
            ("Bournvita Refill 500g", 1_900, 30),
            ("Golden Morn 450g", 1_400, 25),
            ("Indomie Chicken 70g", 150, 400),
            ("Indomie Onion Chicken Carton", 7_800, 12),
            ("Maggi Star Cubes (100)", 1_200, 60),
            ("Dangote Sugar 1kg", 1_500, 50),
            ("Devon King's Oil 3L", 6_200, 18),
            ("Gino Tomato Paste 70g", 200, 150),
        ],
    ),
    (
        "Grains",
        "GRN",
        &[
            ("Mama Gold Rice 50kg", 75_000, 6),
            ("Royal Stallion Rice 5kg", 9_500, 20),
            ("Golden Penny Semovita 10kg", 12_500, 15),
            ("Honeywell Wheat Meal 1kg", 1_600, 30),
            ("Ijebu Garri 1kg", 1_200, 45),
            ("Honey Beans 1kg", 2_200, 25),
        ],
    ),
    (
        "Drinks",
        "DRK",
        &[
            ("Coca-Cola 50cl", 300, 120),
            ("Fanta Orange 50cl", 300, 100),
            ("Malta Guinness Can", 500, 96),
            ("Eva Water 75cl", 200, 144),
            ("Chivita 100% Orange 1L", 2_000, 24),
            ("Hollandia Yoghurt 1L", 1_800, 8),
        ],
    ),
    (
        "Toiletries",
        "TOI",
        &[
            ("Dettol Soap 110g", 700, 60),
            ("Close Up Toothpaste 140g", 1_100, 40),
            ("Hypo Bleach 1L", 900, 22),
            ("Omo Detergent 900g", 2_300, 5),
            ("Morning Fresh 400ml", 1_300, 0),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./naira_pos.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Naira POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./naira_pos.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Naira POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating products...");

    let mut created = 0;
    for (category_idx, (category, prefix, lines)) in CATALOG.iter().enumerate() {
        for (line_idx, (name, naira, stock)) in lines.iter().enumerate() {
            let seq = category_idx * 100 + line_idx + 1;
            let input = NewProduct {
                sku: format!("{}-{:03}", prefix, seq),
                // Demo EAN-13 style code, checksum not computed
                barcode: Some(format!("615{:010}", seq)),
                name: name.to_string(),
                description: None,
                category: Some(category.to_string()),
                price_kobo: naira * 100,
                cost_price_kobo: Some(naira * 100 * 80 / 100),
                stock_quantity: *stock,
                reorder_level: None,
            };

            if let Err(e) = db.products().create(&input, None).await {
                eprintln!("Failed to create {}: {}", input.sku, e);
                continue;
            }
            created += 1;
        }
    }

    println!("✓ Created {} products", created);

    println!();
    println!("Verifying FTS index...");
    let hits = db.products().search("indomie", false, 10).await?;
    println!("  Search 'indomie': {} results", hits.len());

    let low = db.reports().low_stock().await?;
    println!("  Low or out of stock: {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
