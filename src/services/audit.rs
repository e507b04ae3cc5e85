//! Audit trail service
//!
//! Records who did what, when, against which item. Recording is
//! best-effort: a failed audit write is logged server-side and swallowed,
//! so the mutating operation that triggered it still succeeds. The read
//! side is paginated and admin-facing.

use sqlx::SqlitePool;
use tracing::error;

use crate::db::AuditRepository;
use crate::models::{AuditAction, AuditDomain, AuditLogEntry, AuditLogPage, AuditLogQuery, Pagination};
use crate::utils::AppError;

const DEFAULT_PAGE_LIMIT: u32 = 50;

pub struct AuditRecorder<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditRecorder<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one audit entry. Failures are logged and swallowed; the
    /// primary operation must never fail because its audit write did.
    pub async fn record(
        &self,
        domain: AuditDomain,
        action: AuditAction,
        item_name: &str,
        user_id: i64,
        details: serde_json::Value,
    ) {
        let repo = AuditRepository::new(self.pool);
        if let Err(e) = repo
            .insert(domain, &action, item_name, user_id, Some(&details))
            .await
        {
            error!(
                error = %e,
                domain = %domain,
                action = %action,
                item_name = item_name,
                "Failed to record audit entry"
            );
        }
    }

    /// List audit entries, newest first.
    pub async fn list(&self, query: &AuditLogQuery) -> Result<AuditLogPage, AppError> {
        let repo = AuditRepository::new(self.pool);
        let (logs, total) = repo.list(query).await.map_err(|e| {
            error!(error = %e, "Failed to list audit logs");
            AppError::internal("Failed to list audit logs")
        })?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        let pages = (total + limit as i64 - 1) / limit as i64;

        Ok(AuditLogPage {
            logs,
            pagination: Pagination {
                page,
                limit,
                total,
                pages,
            },
        })
    }

    pub async fn get(&self, id: i64) -> Result<AuditLogEntry, AppError> {
        let repo = AuditRepository::new(self.pool);
        repo.get_by_id(id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch audit log entry");
                AppError::internal("Failed to fetch audit log entry")
            })?
            .ok_or_else(|| AppError::not_found("Audit log entry not found"))
    }
}
