//! Audit log models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resource domain an audit entry refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditDomain {
    Chemical,
    Equipment,
    User,
}

impl AuditDomain {
    pub fn as_str(&self) -> &str {
        match self {
            AuditDomain::Chemical => "chemical",
            AuditDomain::Equipment => "equipment",
            AuditDomain::User => "user",
        }
    }
}

impl std::fmt::Display for AuditDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action recorded in an audit entry
///
/// Maintenance logs record their free-text action label lowercased, so the
/// set is open-ended; known values get closed variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditAction {
    Add,
    Update,
    Delete,
    Usage,
    Custom(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Add => "add",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Usage => "usage",
            AuditAction::Custom(label) => label,
        }
    }

    /// Action for a maintenance log entry, normalized the way the audit
    /// trail stores it
    pub fn custom(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "add" => AuditAction::Add,
            "update" => AuditAction::Update,
            "delete" => AuditAction::Delete,
            "usage" => AuditAction::Usage,
            other => AuditAction::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit log entry
///
/// `item_name` is a snapshot taken at write time, not a live reference;
/// it survives deletion of the item it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub r#type: String,
    pub action: String,
    pub item_name: String,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Audit log list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub r#type: Option<String>,
    pub action: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Pagination metadata returned alongside audit log listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

/// One page of audit log entries
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogPage {
    pub logs: Vec<AuditLogEntry>,
    pub pagination: Pagination,
}
