//! Equipment repository

use anyhow::{Context, Result};
use chrono::{Months, Utc};
use sqlx::SqlitePool;

use crate::models::{
    Equipment, EquipmentCondition, EquipmentRequest, EquipmentStatus, LogMaintenanceRequest,
    MaintenanceLog,
};

pub struct EquipmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EquipmentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Equipment>> {
        let equipment = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT e.*, u.name AS assigned_user_name,
                (SELECT COUNT(*) FROM equipment_maintenance_logs WHERE equipment_id = e.id)
                    AS maintenance_count
            FROM equipment e
            LEFT JOIN users u ON e.assigned_user_id = u.id
            ORDER BY e.name
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list equipment")?;

        Ok(equipment)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Equipment>> {
        let equipment = sqlx::query_as::<_, Equipment>(
            r#"
            SELECT e.*, u.name AS assigned_user_name
            FROM equipment e
            LEFT JOIN users u ON e.assigned_user_id = u.id
            WHERE e.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch equipment")?;

        Ok(equipment)
    }

    pub async fn maintenance_logs(&self, equipment_id: i64) -> Result<Vec<MaintenanceLog>> {
        let logs = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            SELECT eml.*, u.name AS user_name
            FROM equipment_maintenance_logs eml
            JOIN users u ON eml.user_id = u.id
            WHERE eml.equipment_id = ?
            ORDER BY eml.date DESC, eml.id DESC
            "#,
        )
        .bind(equipment_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to fetch maintenance logs")?;

        Ok(logs)
    }

    /// Create an equipment item. `last_maintenance` starts at today and
    /// `next_maintenance` six months out.
    pub async fn create(&self, req: &EquipmentRequest) -> Result<Equipment> {
        let today = Utc::now().date_naive();
        let next_maintenance = today
            .checked_add_months(Months::new(6))
            .unwrap_or(today);

        let result = sqlx::query(
            r#"
            INSERT INTO equipment
                (name, model, serial_id, status, location, purchase_date,
                 warranty_expiration, condition, last_maintenance, next_maintenance,
                 assigned_user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(&req.model)
        .bind(&req.serial_id)
        .bind(req.status.unwrap_or(EquipmentStatus::Available).as_str())
        .bind(&req.location)
        .bind(req.purchase_date)
        .bind(req.warranty_expiration)
        .bind(req.condition.unwrap_or(EquipmentCondition::Good).as_str())
        .bind(today)
        .bind(next_maintenance)
        .bind(req.assigned_user_id)
        .execute(self.pool)
        .await
        .context("Failed to create equipment")?;

        let equipment = self
            .get_by_id(result.last_insert_rowid())
            .await?
            .context("Created equipment row not found")?;

        Ok(equipment)
    }

    /// Update an equipment item. The maintenance date fields are left
    /// alone; they only change through an explicit update of their own.
    pub async fn update(&self, id: i64, req: &EquipmentRequest) -> Result<Option<Equipment>> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET name = ?, model = ?, serial_id = ?, status = ?, location = ?,
                purchase_date = ?, warranty_expiration = ?, condition = ?,
                assigned_user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.model)
        .bind(&req.serial_id)
        .bind(req.status.unwrap_or(EquipmentStatus::Available).as_str())
        .bind(&req.location)
        .bind(req.purchase_date)
        .bind(req.warranty_expiration)
        .bind(req.condition.unwrap_or(EquipmentCondition::Good).as_str())
        .bind(req.assigned_user_id)
        .bind(id)
        .execute(self.pool)
        .await
        .context("Failed to update equipment")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .context("Failed to delete equipment")?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a maintenance log. This does not recompute the equipment's
    /// `last_maintenance`/`next_maintenance` fields.
    pub async fn insert_maintenance(
        &self,
        user_id: i64,
        req: &LogMaintenanceRequest,
    ) -> Result<MaintenanceLog> {
        let log = sqlx::query_as::<_, MaintenanceLog>(
            r#"
            INSERT INTO equipment_maintenance_logs (equipment_id, user_id, date, action, notes)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(req.equipment_id)
        .bind(user_id)
        .bind(req.date)
        .bind(&req.action)
        .bind(&req.notes)
        .fetch_one(self.pool)
        .await
        .context("Failed to insert maintenance log")?;

        Ok(log)
    }
}
