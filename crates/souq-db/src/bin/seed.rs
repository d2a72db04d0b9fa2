//! # Settings Seeder
//!
//! Writes the default store settings document into a database.
//!
//! ## Usage
//! ```bash
//! # Seed ./souq_dev.db (skips if a document exists)
//! cargo run -p souq-db --bin seed
//!
//! # Overwrite whatever is stored
//! cargo run -p souq-db --bin seed -- --force
//!
//! # Specify database path
//! cargo run -p souq-db --bin seed -- --db ./data/souq.db
//! ```

use souq_core::Settings;
use souq_db::{Database, DbConfig};
use std::env;

/// What `seed_settings` did with the document.
#[derive(Debug, PartialEq, Eq)]
enum Seeded {
    Replaced,
    Written,
    Skipped,
}

/// Validates `settings`, then writes them.
///
/// Without `force` an existing document is left alone.
async fn seed_settings(
    db: &Database,
    settings: &Settings,
    force: bool,
) -> Result<Seeded, Box<dyn std::error::Error>> {
    settings
        .validate()
        .map_err(|errors| format!("Default settings are invalid: {}", errors))?;

    if force {
        db.settings().replace(settings).await?;
        Ok(Seeded::Replaced)
    } else if db.settings().seed(settings).await? {
        Ok(Seeded::Written)
    } else {
        Ok(Seeded::Skipped)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut force = false;
    let mut db_path = String::from("./souq_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--force" | "-f" => force = true,
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Souq Settings Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./souq_dev.db)");
                println!("  -f, --force        Replace an existing settings document");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Souq Settings Seeder");
    println!("=======================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let settings = Settings::with_defaults();
    match seed_settings(&db, &settings, force).await {
        Ok(Seeded::Replaced) => println!("✓ Settings document replaced"),
        Ok(Seeded::Written) => println!("✓ Settings document written"),
        Ok(Seeded::Skipped) => {
            println!("⚠ Database already has a settings document");
            println!("  Pass --force to replace it.");
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            db.close().await;
            return Err(e);
        }
    }

    println!(
        "  {} currencies, {} languages, {} payment methods, {} delivery dates",
        settings.currencies.len(),
        settings.languages.len(),
        settings.payment_methods.len(),
        settings.delivery_dates.len()
    );

    db.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_then_skip_then_force() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = Settings::with_defaults();

        assert_eq!(seed_settings(&db, &settings, false).await.unwrap(), Seeded::Written);
        assert_eq!(seed_settings(&db, &settings, false).await.unwrap(), Seeded::Skipped);
        assert_eq!(seed_settings(&db, &settings, true).await.unwrap(), Seeded::Replaced);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_not_written() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut settings = Settings::with_defaults();
        settings.site.name.clear();

        let err = seed_settings(&db, &settings, true).await.unwrap_err();
        assert!(err.to_string().starts_with("Default settings are invalid"));
        assert!(db.settings().load().await.unwrap().is_none());
    }
}
