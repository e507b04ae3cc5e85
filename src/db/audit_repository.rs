//! Audit log repository
//!
//! Append-only: this repository exposes no update or delete operation, and
//! none may be added. History must survive entity deletion, which is why
//! `item_name` is a snapshot string rather than a foreign key.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{AuditAction, AuditDomain, AuditLogEntry, AuditLogQuery};

const DEFAULT_PAGE_LIMIT: u32 = 50;

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    action: String,
    item_name: String,
    user_id: i64,
    user_name: Option<String>,
    details: Option<String>,
    timestamp: String,
}

pub struct AuditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        domain: AuditDomain,
        action: &AuditAction,
        item_name: &str,
        user_id: i64,
        details: Option<&serde_json::Value>,
    ) -> Result<i64> {
        let timestamp = Utc::now().to_rfc3339();
        let details_str = details.map(|d| d.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (type, action, item_name, user_id, details, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(domain.as_str())
        .bind(action.as_str())
        .bind(item_name)
        .bind(user_id)
        .bind(details_str.as_deref())
        .bind(&timestamp)
        .execute(self.pool)
        .await
        .context("Failed to insert audit log entry")?;

        Ok(result.last_insert_rowid())
    }

    /// List audit entries, newest first, with the recording user's name
    /// joined in. Returns the page plus the total row count for the filter.
    pub async fn list(&self, query: &AuditLogQuery) -> Result<(Vec<AuditLogEntry>, i64)> {
        let mut sql = String::from(
            "SELECT al.id, al.type, al.action, al.item_name, al.user_id, \
             u.name AS user_name, al.details, al.timestamp \
             FROM audit_logs al JOIN users u ON al.user_id = u.id",
        );
        let mut count_sql = String::from("SELECT COUNT(*) FROM audit_logs al");

        let mut conditions = Vec::new();
        if query.r#type.is_some() {
            conditions.push("al.type = ?");
        }
        if query.action.is_some() {
            conditions.push("al.action = ?");
        }
        if !conditions.is_empty() {
            let clause = format!(" WHERE {}", conditions.join(" AND "));
            sql.push_str(&clause);
            count_sql.push_str(&clause);
        }

        sql.push_str(" ORDER BY al.timestamp DESC, al.id DESC LIMIT ? OFFSET ?");

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        let offset = (page - 1) * limit;

        let mut q = sqlx::query_as::<_, AuditRow>(&sql);
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref kind) = query.r#type {
            q = q.bind(kind);
            count_q = count_q.bind(kind);
        }
        if let Some(ref action) = query.action {
            q = q.bind(action);
            count_q = count_q.bind(action);
        }
        q = q.bind(limit as i64).bind(offset as i64);

        let rows = q
            .fetch_all(self.pool)
            .await
            .context("Failed to list audit logs")?;
        let total = count_q
            .fetch_one(self.pool)
            .await
            .context("Failed to count audit logs")?;

        Ok((rows.into_iter().map(row_to_entry).collect(), total))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<AuditLogEntry>> {
        let row = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT al.id, al.type, al.action, al.item_name, al.user_id,
                   u.name AS user_name, al.details, al.timestamp
            FROM audit_logs al
            JOIN users u ON al.user_id = u.id
            WHERE al.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch audit log entry")?;

        Ok(row.map(row_to_entry))
    }
}

fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

fn row_to_entry(row: AuditRow) -> AuditLogEntry {
    AuditLogEntry {
        id: row.id,
        r#type: row.kind,
        action: row.action,
        item_name: row.item_name,
        user_id: row.user_id,
        user_name: row.user_name,
        details: row.details.and_then(|s| serde_json::from_str(&s).ok()),
        timestamp: parse_db_timestamp(&row.timestamp),
    }
}
