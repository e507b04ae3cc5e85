//! In-process scheduler for the notification sweep
//!
//! Fires [`NotificationSweep::run`] on the configured cron expression. Only
//! one scheduler instance may run against a database at a time; overlapping
//! sweeps from multiple schedulers are not guarded against. Deployments that
//! prefer an external scheduler disable this loop and cron the
//! `run-notification-sweep` binary instead.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use tracing::{error, info, warn};

use crate::config::AlertsConfig;
use crate::db::DbPool;
use crate::services::NotificationSweep;

/// Validate a cron expression
pub fn validate_cron_expression(cron_expr: &str) -> Result<(), String> {
    Schedule::from_str(cron_expr)
        .map(|_| ())
        .map_err(|e| format!("Invalid cron expression: {}", e))
}

/// Spawn the background sweep loop.
pub fn start_sweep_scheduler(pool: DbPool, alerts: AlertsConfig) {
    let schedule = match Schedule::from_str(&alerts.sweep_cron) {
        Ok(s) => s,
        Err(e) => {
            error!(
                cron = %alerts.sweep_cron,
                error = %e,
                "Invalid sweep cron expression, sweep scheduler not started"
            );
            return;
        }
    };

    info!(cron = %alerts.sweep_cron, "Notification sweep scheduler started");

    tokio::spawn(async move {
        loop {
            let Some(next) = schedule.upcoming(Utc).next() else {
                warn!("Sweep schedule has no upcoming firing time, stopping");
                break;
            };

            let wait = (next - Utc::now())
                .to_std()
                .unwrap_or(Duration::from_secs(0));
            tokio::time::sleep(wait).await;

            let sweep = NotificationSweep::new(pool.clone(), alerts.clone());
            let report = sweep.run().await;
            if report.has_failures() {
                warn!("Scheduled notification sweep finished with failures");
            }
        }
    });
}
