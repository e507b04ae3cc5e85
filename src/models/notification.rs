//! Notification model and types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert condition that produced a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    Expiration,
    Maintenance,
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::LowStock => "low_stock",
            NotificationKind::Expiration => "expiration",
            NotificationKind::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_stock" => Ok(NotificationKind::LowStock),
            "expiration" => Ok(NotificationKind::Expiration),
            "maintenance" => Ok(NotificationKind::Maintenance),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

/// Kind of inventory item a notification points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Chemical,
    Equipment,
}

impl ItemType {
    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Chemical => "chemical",
            ItemType::Equipment => "equipment",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chemical" => Ok(ItemType::Chemical),
            "equipment" => Ok(ItemType::Equipment),
            _ => Err(format!("Invalid item type: {}", s)),
        }
    }
}

/// Notification model
///
/// `title` and `message` are snapshots taken at generation time; the
/// (item_type, item_id) pair is a weak reference and may dangle after the
/// subject item is deleted, in which case `item_name` resolves to null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub r#type: NotificationKind,
    pub title: String,
    pub message: String,
    pub item_type: ItemType,
    pub item_id: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub item_name: Option<String>,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Notification {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        Ok(Self {
            id: row.try_get("id")?,
            r#type: {
                let type_str: String = row.try_get("type")?;
                type_str.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
                    index: "type".to_string(),
                    source: Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
                })?
            },
            title: row.try_get("title")?,
            message: row.try_get("message")?,
            item_type: {
                let item_type: String = row.try_get("item_type")?;
                item_type.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
                    index: "item_type".to_string(),
                    source: Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
                })?
            },
            item_id: row.try_get("item_id")?,
            is_read: {
                let is_read: i64 = row.try_get("is_read")?;
                is_read != 0
            },
            created_at: row.try_get("created_at")?,
            // Present on enriched list reads only
            item_name: row.try_get("item_name").unwrap_or(None),
        })
    }
}

/// Notification list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    pub is_read: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
