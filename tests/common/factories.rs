//! Test data factories

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use labtrack::db::{ChemicalRepository, EquipmentRepository};
use labtrack::models::{
    Chemical, ChemicalRequest, Equipment, EquipmentRequest, SafetyClass,
};

use super::test_app::TestApp;

/// Request body for a chemical expiring `expires_in_days` from now with the
/// given stock levels
pub fn chemical_request(
    name: &str,
    initial_quantity: f64,
    current_quantity: f64,
    expires_in_days: i64,
) -> ChemicalRequest {
    let today = Utc::now().date_naive();
    ChemicalRequest {
        name: name.to_string(),
        batch_number: format!("B-{}", name.to_uppercase()),
        brand: Some("TestBrand".to_string()),
        volume: Some("500 mL".to_string()),
        initial_quantity,
        current_quantity: Some(current_quantity),
        expiration_date: today + Duration::days(expires_in_days),
        date_of_arrival: today - Duration::days(30),
        safety_class: SafetyClass::Safe,
        location: Some("Shelf A1".to_string()),
        ghs_symbols: vec![],
    }
}

/// Insert a chemical directly through the repository
pub async fn create_chemical(
    app: &TestApp,
    name: &str,
    initial_quantity: f64,
    current_quantity: f64,
    expires_in_days: i64,
) -> Chemical {
    ChemicalRepository::new(&app.state.db)
        .create(&chemical_request(
            name,
            initial_quantity,
            current_quantity,
            expires_in_days,
        ))
        .await
        .expect("Failed to create chemical")
}

/// Insert an equipment item directly through the repository
pub async fn create_equipment(app: &TestApp, name: &str, serial_id: &str) -> Equipment {
    EquipmentRepository::new(&app.state.db)
        .create(&EquipmentRequest {
            name: name.to_string(),
            model: Some("X-1000".to_string()),
            serial_id: serial_id.to_string(),
            status: None,
            location: Some("Lab 2".to_string()),
            purchase_date: Some(Utc::now().date_naive() - Duration::days(365)),
            warranty_expiration: Some(Utc::now().date_naive() + Duration::days(365)),
            condition: None,
            assigned_user_id: None,
        })
        .await
        .expect("Failed to create equipment")
}

/// Point an equipment item's next maintenance date `days` from now.
///
/// Maintenance dates are otherwise only set at creation (six months out),
/// so tests adjust them directly.
pub async fn set_next_maintenance(app: &TestApp, equipment_id: i64, days: i64) {
    let date = Utc::now().date_naive() + Duration::days(days);
    sqlx::query("UPDATE equipment SET next_maintenance = ? WHERE id = ?")
        .bind(date)
        .bind(equipment_id)
        .execute(&app.state.db)
        .await
        .expect("Failed to set next maintenance date");
}

/// JSON body for the chemical creation endpoint
pub fn chemical_json(name: &str, initial_quantity: f64, expires_in_days: i64) -> Value {
    let today = Utc::now().date_naive();
    json!({
        "name": name,
        "batch_number": format!("B-{}", name.to_uppercase()),
        "brand": "TestBrand",
        "volume": "500 mL",
        "initial_quantity": initial_quantity,
        "expiration_date": (today + Duration::days(expires_in_days)).to_string(),
        "date_of_arrival": (today - Duration::days(30)).to_string(),
        "safety_class": "safe",
        "location": "Shelf A1",
        "ghs_symbols": [],
    })
}
