//! Database layer
//!
//! This module handles database operations for:
//! - Chemical and equipment inventory
//! - Usage and maintenance logs
//! - User accounts
//! - The append-only audit trail

pub mod audit_repository;
pub mod chemical_repository;
pub mod equipment_repository;
pub mod user_repository;

pub use audit_repository::AuditRepository;
pub use chemical_repository::ChemicalRepository;
pub use equipment_repository::EquipmentRepository;
pub use user_repository::UserRepository;

use anyhow::Result;
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
