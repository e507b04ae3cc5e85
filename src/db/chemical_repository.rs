//! Chemical inventory repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{Chemical, ChemicalRequest, LogUsageRequest, UsageLog};

pub struct ChemicalRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChemicalRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Chemical>> {
        let chemicals = sqlx::query_as::<_, Chemical>(
            r#"
            SELECT c.*,
                (SELECT COUNT(*) FROM chemical_usage_logs WHERE chemical_id = c.id) AS usage_count
            FROM chemicals c
            ORDER BY c.name
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list chemicals")?;

        Ok(chemicals)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Chemical>> {
        let chemical = sqlx::query_as::<_, Chemical>("SELECT * FROM chemicals WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .context("Failed to fetch chemical")?;

        Ok(chemical)
    }

    pub async fn usage_logs(&self, chemical_id: i64) -> Result<Vec<UsageLog>> {
        let logs = sqlx::query_as::<_, UsageLog>(
            r#"
            SELECT cul.*, u.name AS user_name
            FROM chemical_usage_logs cul
            JOIN users u ON cul.user_id = u.id
            WHERE cul.chemical_id = ?
            ORDER BY cul.date DESC, cul.id DESC
            "#,
        )
        .bind(chemical_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to fetch usage logs")?;

        Ok(logs)
    }

    pub async fn create(&self, req: &ChemicalRequest) -> Result<Chemical> {
        let current_quantity = req.current_quantity.unwrap_or(req.initial_quantity);
        let ghs_symbols = serde_json::to_string(&req.ghs_symbols)?;

        let chemical = sqlx::query_as::<_, Chemical>(
            r#"
            INSERT INTO chemicals
                (name, batch_number, brand, volume, initial_quantity, current_quantity,
                 expiration_date, date_of_arrival, safety_class, location, ghs_symbols)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.batch_number)
        .bind(&req.brand)
        .bind(&req.volume)
        .bind(req.initial_quantity)
        .bind(current_quantity)
        .bind(req.expiration_date)
        .bind(req.date_of_arrival)
        .bind(req.safety_class.as_str())
        .bind(&req.location)
        .bind(&ghs_symbols)
        .fetch_one(self.pool)
        .await
        .context("Failed to create chemical")?;

        Ok(chemical)
    }

    /// Update a chemical. `initial_quantity` is fixed at creation and is
    /// not touched here.
    pub async fn update(&self, id: i64, req: &ChemicalRequest) -> Result<Option<Chemical>> {
        let ghs_symbols = serde_json::to_string(&req.ghs_symbols)?;

        let chemical = sqlx::query_as::<_, Chemical>(
            r#"
            UPDATE chemicals
            SET name = ?, batch_number = ?, brand = ?, volume = ?,
                current_quantity = COALESCE(?, current_quantity),
                expiration_date = ?, date_of_arrival = ?, safety_class = ?,
                location = ?, ghs_symbols = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.batch_number)
        .bind(&req.brand)
        .bind(&req.volume)
        .bind(req.current_quantity)
        .bind(req.expiration_date)
        .bind(req.date_of_arrival)
        .bind(req.safety_class.as_str())
        .bind(&req.location)
        .bind(&ghs_symbols)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to update chemical")?;

        Ok(chemical)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chemicals WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete chemical")?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a usage log and decrement the chemical's current quantity.
    ///
    /// Both writes run in one transaction so a failure cannot leave the
    /// quantity out of sync with the log. The quantity is not clamped at
    /// zero; enforcing non-negative stock is the caller's concern.
    pub async fn insert_usage(&self, user_id: i64, req: &LogUsageRequest) -> Result<UsageLog> {
        let mut tx = self.pool.begin().await?;

        let log = sqlx::query_as::<_, UsageLog>(
            r#"
            INSERT INTO chemical_usage_logs
                (chemical_id, user_id, date, location, quantity, notes, opened)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(req.chemical_id)
        .bind(user_id)
        .bind(req.date)
        .bind(&req.location)
        .bind(req.quantity)
        .bind(&req.notes)
        .bind(req.opened)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert usage log")?;

        sqlx::query("UPDATE chemicals SET current_quantity = current_quantity - ? WHERE id = ?")
            .bind(req.quantity)
            .bind(req.chemical_id)
            .execute(&mut *tx)
            .await
            .context("Failed to update chemical quantity")?;

        tx.commit().await?;

        Ok(log)
    }
}
