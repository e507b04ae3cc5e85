//! CLI tool for running the notification sweep
//!
//! This binary can be invoked by cron to run one sweep of the alert scans
//! (low stock, expiration, maintenance due) and exit.
//!
//! Usage:
//!   run-notification-sweep [--config <path>] [--verbose]
//!
//! Example cron entry (run daily at 08:00):
//!   0 8 * * * /usr/local/bin/run-notification-sweep --config /etc/labtrack/config.yaml

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use labtrack::services::NotificationSweep;
use labtrack::AppConfig;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("LabTrack - Notification Sweep Runner");

    if let Some(path) = config_path {
        info!("Config file: {}", path.display());
        std::env::set_var("LABTRACK_CONFIG", path.to_str().unwrap_or(""));
    }
    let config = AppConfig::load()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database: {}", config.database.url);

    sqlx::migrate!("./migrations").run(&pool).await?;

    let sweep = NotificationSweep::new(pool, config.alerts.clone());
    let report = sweep.run().await;

    for (scan, result) in [
        ("low_stock", &report.low_stock),
        ("expiration", &report.expiration),
        ("maintenance", &report.maintenance),
    ] {
        match &result.error {
            None => info!("  [OK] {} generated {} notifications", scan, result.generated),
            Some(e) => error!("  [FAIL] {}: {}", scan, e),
        }
    }

    info!("Generated {} notifications in total", report.total_generated());

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_help() {
    println!("LabTrack - Notification Sweep Runner");
    println!();
    println!("Usage:");
    println!("  run-notification-sweep [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <path>  Path to configuration file (default: config/config.yaml)");
    println!("  -v, --verbose    Enable verbose output");
    println!("  -h, --help       Show this help message");
    println!();
    println!("Example cron entry:");
    println!("  # Run daily at 08:00");
    println!("  0 8 * * * /usr/local/bin/run-notification-sweep --config /etc/labtrack/config.yaml");
}
