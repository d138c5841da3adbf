//! # Seed Data Loader
//!
//! Loads the demo fleet into a database file for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./rentline_dev.db
//! cargo run -p rentline-db --bin seed
//!
//! # Specify database path
//! cargo run -p rentline-db --bin seed -- --db ./data/rentline.db
//! ```

use std::env;

use rentline_db::{seed_if_empty, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./rentline_dev.db");

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
                println!("Rentline Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./rentline_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Rentline Seed Data Loader");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let report = seed_if_empty(&db).await?;
    if !report.seeded {
        println!("⚠ Database already has vehicles");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("✓ {} vehicles", report.vehicles);
    println!("✓ {} reservations (accepted)", report.reservations);
    println!("✓ {} settings", report.settings);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
