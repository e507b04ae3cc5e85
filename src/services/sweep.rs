//! Notification generation sweep
//!
//! Scans inventory state for three alert conditions (low stock, upcoming
//! expiration, maintenance due) and materializes a notification for each
//! qualifying item that does not already have an unread notification of the
//! same type outstanding. Marking a notification read re-arms its condition
//! for the next sweep.
//!
//! The sweep is a pure read-then-insert batch; it never mutates chemical or
//! equipment rows. It has no scheduling of its own — the in-process cron
//! loop, the CLI binary and the on-demand API endpoint all call [`NotificationSweep::run`].

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::config::AlertsConfig;
use crate::models::{ItemType, NotificationKind};

/// Outcome of a single scan procedure
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub generated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one full sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub low_stock: ScanResult,
    pub expiration: ScanResult,
    pub maintenance: ScanResult,
}

impl SweepReport {
    pub fn total_generated(&self) -> usize {
        self.low_stock.generated + self.expiration.generated + self.maintenance.generated
    }

    pub fn has_failures(&self) -> bool {
        self.low_stock.error.is_some()
            || self.expiration.error.is_some()
            || self.maintenance.error.is_some()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LowStockCandidate {
    id: i64,
    name: String,
    batch_number: String,
    current_quantity: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct ExpiringCandidate {
    id: i64,
    name: String,
    batch_number: String,
    expiration_date: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct MaintenanceCandidate {
    id: i64,
    name: String,
    serial_id: String,
    next_maintenance: NaiveDate,
}

pub struct NotificationSweep {
    pool: SqlitePool,
    alerts: AlertsConfig,
}

impl NotificationSweep {
    pub fn new(pool: SqlitePool, alerts: AlertsConfig) -> Self {
        Self { pool, alerts }
    }

    /// Run all three scan procedures.
    ///
    /// The scans are independent; a failure in one is logged and does not
    /// stop the others.
    pub async fn run(&self) -> SweepReport {
        let low_stock = self.run_scan("low_stock", self.check_low_stock()).await;
        let expiration = self
            .run_scan("expiration", self.check_expiring_chemicals())
            .await;
        let maintenance = self
            .run_scan("maintenance", self.check_equipment_maintenance())
            .await;

        let report = SweepReport {
            low_stock,
            expiration,
            maintenance,
        };
        info!(
            low_stock = report.low_stock.generated,
            expiration = report.expiration.generated,
            maintenance = report.maintenance.generated,
            "Notification sweep completed"
        );
        report
    }

    async fn run_scan(
        &self,
        scan: &str,
        fut: impl std::future::Future<Output = Result<usize>>,
    ) -> ScanResult {
        match fut.await {
            Ok(generated) => {
                info!(scan = scan, generated = generated, "Scan completed");
                ScanResult {
                    generated,
                    error: None,
                }
            }
            Err(e) => {
                error!(scan = scan, error = %e, "Scan failed");
                ScanResult {
                    generated: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Chemicals whose current quantity has fallen to or below the
    /// configured fraction of their initial quantity.
    async fn check_low_stock(&self) -> Result<usize> {
        let candidates: Vec<LowStockCandidate> = sqlx::query_as(
            r#"
            SELECT id, name, batch_number, current_quantity
            FROM chemicals
            WHERE current_quantity <= initial_quantity * ?
            AND id NOT IN (
                SELECT item_id FROM notifications
                WHERE type = 'low_stock' AND item_type = 'chemical' AND is_read = 0
            )
            "#,
        )
        .bind(self.alerts.low_stock_ratio)
        .fetch_all(&self.pool)
        .await
        .context("Failed to scan for low stock chemicals")?;

        for chemical in &candidates {
            self.insert_notification(
                NotificationKind::LowStock,
                "Low Stock Alert",
                &format!(
                    "Chemical \"{}\" (Batch: {}) is running low. Current quantity: {}",
                    chemical.name, chemical.batch_number, chemical.current_quantity
                ),
                ItemType::Chemical,
                chemical.id,
            )
            .await?;
        }

        Ok(candidates.len())
    }

    /// Chemicals expiring within the configured window. Already-expired
    /// chemicals are excluded; expiration alerts are forward-looking.
    async fn check_expiring_chemicals(&self) -> Result<usize> {
        let candidates: Vec<ExpiringCandidate> = sqlx::query_as(
            r#"
            SELECT id, name, batch_number, expiration_date
            FROM chemicals
            WHERE date(expiration_date) <= date('now', '+' || ? || ' days')
            AND date(expiration_date) > date('now')
            AND id NOT IN (
                SELECT item_id FROM notifications
                WHERE type = 'expiration' AND item_type = 'chemical' AND is_read = 0
            )
            "#,
        )
        .bind(self.alerts.expiration_window_days)
        .fetch_all(&self.pool)
        .await
        .context("Failed to scan for expiring chemicals")?;

        for chemical in &candidates {
            self.insert_notification(
                NotificationKind::Expiration,
                "Expiration Alert",
                &format!(
                    "Chemical \"{}\" (Batch: {}) will expire on {}",
                    chemical.name, chemical.batch_number, chemical.expiration_date
                ),
                ItemType::Chemical,
                chemical.id,
            )
            .await?;
        }

        Ok(candidates.len())
    }

    /// Equipment due for maintenance within the configured window.
    async fn check_equipment_maintenance(&self) -> Result<usize> {
        let candidates: Vec<MaintenanceCandidate> = sqlx::query_as(
            r#"
            SELECT id, name, serial_id, next_maintenance
            FROM equipment
            WHERE next_maintenance IS NOT NULL
            AND date(next_maintenance) <= date('now', '+' || ? || ' days')
            AND date(next_maintenance) > date('now')
            AND id NOT IN (
                SELECT item_id FROM notifications
                WHERE type = 'maintenance' AND item_type = 'equipment' AND is_read = 0
            )
            "#,
        )
        .bind(self.alerts.maintenance_window_days)
        .fetch_all(&self.pool)
        .await
        .context("Failed to scan for equipment maintenance")?;

        for item in &candidates {
            self.insert_notification(
                NotificationKind::Maintenance,
                "Maintenance Alert",
                &format!(
                    "Equipment \"{}\" (ID: {}) requires maintenance by {}",
                    item.name, item.serial_id, item.next_maintenance
                ),
                ItemType::Equipment,
                item.id,
            )
            .await?;
        }

        Ok(candidates.len())
    }

    async fn insert_notification(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        item_type: ItemType,
        item_id: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (type, title, message, item_type, item_id, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(kind.as_str())
        .bind(title)
        .bind(message)
        .bind(item_type.as_str())
        .bind(item_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert notification")?;

        Ok(())
    }
}
