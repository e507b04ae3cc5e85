//! Equipment models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Operational status of an equipment item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum EquipmentStatus {
    Available,
    Broken,
    #[serde(rename = "Under Maintenance")]
    #[sqlx(rename = "Under Maintenance")]
    UnderMaintenance,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EquipmentStatus::Available => "Available",
            EquipmentStatus::Broken => "Broken",
            EquipmentStatus::UnderMaintenance => "Under Maintenance",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical condition of an equipment item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum EquipmentCondition {
    Good,
    #[serde(rename = "Needs Repair")]
    #[sqlx(rename = "Needs Repair")]
    NeedsRepair,
    Broken,
}

impl EquipmentCondition {
    pub fn as_str(&self) -> &str {
        match self {
            EquipmentCondition::Good => "Good",
            EquipmentCondition::NeedsRepair => "Needs Repair",
            EquipmentCondition::Broken => "Broken",
        }
    }
}

impl std::fmt::Display for EquipmentCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Equipment model
///
/// `next_maintenance` defaults to six months after creation and is only ever
/// changed by an explicit update; inserting a maintenance log does not touch
/// the maintenance date fields.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub model: Option<String>,
    pub serial_id: String,
    pub status: EquipmentStatus,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub condition: EquipmentCondition,
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,
    pub assigned_user_id: Option<i64>,
    /// Display name of the assigned user; joined on reads
    #[sqlx(default)]
    pub assigned_user_name: Option<String>,
    /// Number of maintenance log entries; populated on list reads only
    #[sqlx(default)]
    #[serde(default)]
    pub maintenance_count: i64,
}

/// Equipment with its maintenance history attached
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentDetail {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub maintenance_log: Vec<MaintenanceLog>,
}

/// Maintenance log entry for an equipment item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceLog {
    pub id: i64,
    pub equipment_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub action: String,
    pub notes: Option<String>,
    #[sqlx(default)]
    pub user_name: Option<String>,
}

/// Create/update equipment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EquipmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub model: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub serial_id: String,
    pub status: Option<EquipmentStatus>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiration: Option<NaiveDate>,
    pub condition: Option<EquipmentCondition>,
    pub assigned_user_id: Option<i64>,
}

/// Log equipment maintenance request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogMaintenanceRequest {
    pub equipment_id: i64,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 255))]
    pub action: String,
    pub notes: Option<String>,
}
