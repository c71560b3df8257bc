//! # Seed Data Generator
//!
//! Populates an empty database with an admin account, two manufacturers
//! and a few products with opening stock.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom.db
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path and admin account
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db --email me@example.com
//! ```
//!
//! The admin password comes from `--password` or `STOCKROOM_ADMIN_PASSWORD`.

use std::env;
use stockroom_core::forms::{Credentials, ManufacturerDraft, ProductDraft};
use stockroom_core::Manufacturer;
use stockroom_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (name, contact)
const MANUFACTURERS: &[(&str, &str)] = &[("dat", "wechatid:asdfasd"), ("china", "guangzhou")];

/// (name, common name, manufacturer, opening quantity)
const PRODUCTS: &[(&str, &str, &str, i64)] = &[
    ("fuhouan", "stomach relief", "dat", 100),
    ("yunnanbaiyao", "bloodstaunching", "china", 60),
    ("yunnanbaiyao capsules", "bloodstaunching", "china", 24),
    ("baojining", "digestive aid", "dat", 0),
];

const DEFAULT_PASSWORD: &str = "Stockroom1!";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Repository logs at warn unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockroom.db");
    let mut email = String::from("admin@stockroom.local");
    let mut password =
        env::var("STOCKROOM_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--email" | "-e" => {
                if i + 1 < args.len() {
                    email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--password" | "-p" => {
                if i + 1 < args.len() {
                    password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./stockroom.db)");
                println!("  -e, --email <EMAIL>      Admin email (default: admin@stockroom.local)");
                println!("  -p, --password <PASS>    Admin password");
                println!("                           (default: $STOCKROOM_ADMIN_PASSWORD)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Admin account
    if db.users().count().await? == 0 {
        let admin = db.users().create(&Credentials { email, password }).await?;
        println!("✓ Created admin {}", admin.email);
        if env::var("STOCKROOM_ADMIN_PASSWORD").is_err() && password_is_default(&args) {
            println!("⚠ Using the default admin password; change it after signing in");
        }
    } else {
        println!("  Users exist, skipping admin account");
    }

    // Reference data
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut makers: Vec<Manufacturer> = Vec::with_capacity(MANUFACTURERS.len());
    for (name, contact) in MANUFACTURERS {
        let maker = db
            .manufacturers()
            .create(ManufacturerDraft {
                name: name.to_string(),
                contact: Some(contact.to_string()),
                street_number: None,
                street: None,
                zip: None,
                bldg: None,
            })
            .await?;
        println!("✓ Manufacturer {}", maker.name);
        makers.push(maker);
    }

    for (name, common_name, maker_name, opening) in PRODUCTS {
        let Some(maker) = makers.iter().find(|m| m.name == *maker_name) else {
            eprintln!("Unknown manufacturer {} for {}", maker_name, name);
            continue;
        };

        let product = db
            .products()
            .create(ProductDraft {
                name: name.to_string(),
                common_name: Some(common_name.to_string()),
                manufacturer_id: maker.id.clone(),
                image_link: None,
                opening_quantity: *opening,
            })
            .await?;
        println!("✓ Product {} (opening stock {})", product.name, product.quantity);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn password_is_default(args: &[String]) -> bool {
    !args.iter().any(|a| a == "--password" || a == "-p")
}
