//! Chemical inventory models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hazard classification of a chemical
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SafetyClass {
    Safe,
    Toxic,
    Corrosive,
    Reactive,
    Flammable,
}

impl SafetyClass {
    pub fn as_str(&self) -> &str {
        match self {
            SafetyClass::Safe => "safe",
            SafetyClass::Toxic => "toxic",
            SafetyClass::Corrosive => "corrosive",
            SafetyClass::Reactive => "reactive",
            SafetyClass::Flammable => "flammable",
        }
    }
}

impl std::fmt::Display for SafetyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SafetyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(SafetyClass::Safe),
            "toxic" => Ok(SafetyClass::Toxic),
            "corrosive" => Ok(SafetyClass::Corrosive),
            "reactive" => Ok(SafetyClass::Reactive),
            "flammable" => Ok(SafetyClass::Flammable),
            _ => Err(format!("Invalid safety class: {}", s)),
        }
    }
}

/// Chemical model
///
/// `initial_quantity` is set at creation and never changes afterwards;
/// `current_quantity` is decremented by usage logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chemical {
    pub id: i64,
    pub name: String,
    pub batch_number: String,
    pub brand: Option<String>,
    pub volume: Option<String>,
    pub initial_quantity: f64,
    pub current_quantity: f64,
    pub expiration_date: NaiveDate,
    pub date_of_arrival: NaiveDate,
    pub safety_class: SafetyClass,
    pub location: Option<String>,
    pub ghs_symbols: Vec<String>,
    /// Number of usage log entries; populated on list reads only
    #[serde(default)]
    pub usage_count: i64,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Chemical {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            batch_number: row.try_get("batch_number")?,
            brand: row.try_get("brand")?,
            volume: row.try_get("volume")?,
            initial_quantity: row.try_get("initial_quantity")?,
            current_quantity: row.try_get("current_quantity")?,
            expiration_date: row.try_get("expiration_date")?,
            date_of_arrival: row.try_get("date_of_arrival")?,
            safety_class: {
                let class: String = row.try_get("safety_class")?;
                class.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
                    index: "safety_class".to_string(),
                    source: Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
                })?
            },
            location: row.try_get("location")?,
            ghs_symbols: {
                let raw: String = row.try_get("ghs_symbols")?;
                serde_json::from_str(&raw).unwrap_or_default()
            },
            // Present on list queries only
            usage_count: row.try_get("usage_count").unwrap_or(0),
        })
    }
}

/// Chemical with its usage history attached
#[derive(Debug, Clone, Serialize)]
pub struct ChemicalDetail {
    #[serde(flatten)]
    pub chemical: Chemical,
    pub usage_log: Vec<UsageLog>,
}

/// Usage log entry for a chemical
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsageLog {
    pub id: i64,
    pub chemical_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub quantity: f64,
    pub notes: Option<String>,
    pub opened: bool,
    /// Display name of the recording user; joined on reads
    #[sqlx(default)]
    pub user_name: Option<String>,
}

/// Create/update chemical request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChemicalRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub batch_number: String,
    pub brand: Option<String>,
    pub volume: Option<String>,
    #[validate(range(min = 0.0))]
    pub initial_quantity: f64,
    /// Defaults to `initial_quantity` when omitted at creation
    #[validate(range(min = 0.0))]
    pub current_quantity: Option<f64>,
    pub expiration_date: NaiveDate,
    pub date_of_arrival: NaiveDate,
    pub safety_class: SafetyClass,
    pub location: Option<String>,
    #[serde(default)]
    pub ghs_symbols: Vec<String>,
}

/// Log chemical usage request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogUsageRequest {
    pub chemical_id: i64,
    pub date: NaiveDate,
    pub location: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub opened: bool,
}
