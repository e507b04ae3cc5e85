//! Notification store/reader
//!
//! CRUD surface over generated notifications. Title, message, type and
//! subject are immutable after creation; the only mutation is the read
//! flag, and deletion is explicit.

use sqlx::SqlitePool;

use crate::models::{Notification, NotificationQuery};
use crate::utils::AppError;

const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    db: SqlitePool,
}

impl NotificationService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List notifications, newest first, with the subject item's display
    /// name resolved. The subject is a weak reference: when the item has
    /// been deleted since generation, `item_name` is null.
    pub async fn list(&self, query: NotificationQuery) -> Result<Vec<Notification>, AppError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        let offset = (page - 1) * limit;

        let mut sql = String::from(
            r#"
            SELECT n.*,
                CASE
                    WHEN n.item_type = 'chemical' THEN c.name
                    WHEN n.item_type = 'equipment' THEN e.name
                    ELSE NULL
                END AS item_name
            FROM notifications n
            LEFT JOIN chemicals c ON n.item_type = 'chemical' AND n.item_id = c.id
            LEFT JOIN equipment e ON n.item_type = 'equipment' AND n.item_id = e.id
            "#,
        );

        if query.is_read.is_some() {
            sql.push_str(" WHERE n.is_read = ?");
        }
        sql.push_str(" ORDER BY n.created_at DESC, n.id DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, Notification>(&sql);
        if let Some(is_read) = query.is_read {
            q = q.bind(is_read);
        }
        q = q.bind(limit as i64).bind(offset as i64);

        let notifications = q
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(notifications)
    }

    /// Mark a notification as read, re-arming its alert condition for the
    /// next sweep.
    pub async fn mark_read(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification not found"));
        }

        Ok(())
    }

    /// Mark every unread notification as read. Returns the number updated.
    pub async fn mark_all_read(&self) -> Result<i64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE is_read = 0")
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() as i64)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification not found"));
        }

        Ok(())
    }

    /// Count of unread notifications, used by clients for badge counts.
    pub async fn unread_count(&self) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE is_read = 0")
                .fetch_one(&self.db)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }
}
