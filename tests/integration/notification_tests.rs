//! Integration tests for the notification store/reader and inventory
//! side effects

use serde_json::json;

use labtrack::models::UserRole;
use labtrack::services::{NotificationService, NotificationSweep};

use crate::common::*;

async fn run_sweep(app: &TestApp) {
    NotificationSweep::new(app.state.db.clone(), app.state.config.alerts.clone())
        .run()
        .await;
}

#[tokio::test]
async fn list_resolves_subject_item_names() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;
    create_chemical(&app, "acetone", 100.0, 5.0, 365).await;

    run_sweep(&app).await;

    let (status, body) = app.get("/api/notifications", &token).await;
    assert_eq!(status, 200);

    let notifications = body.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "low_stock");
    assert_eq!(notifications[0]["item_type"], "chemical");
    assert_eq!(notifications[0]["item_name"], "acetone");
    assert_eq!(notifications[0]["is_read"], false);
}

#[tokio::test]
async fn dangling_subject_degrades_to_null_name() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;
    let chemical = create_chemical(&app, "acetone", 100.0, 5.0, 365).await;

    run_sweep(&app).await;

    // Delete the subject; the notification must survive with a null name
    let (status, _) = app
        .delete(&format!("/api/chemicals/{}", chemical.id), &token)
        .await;
    assert_eq!(status, 200);

    let (status, body) = app.get("/api/notifications", &token).await;
    assert_eq!(status, 200);

    let notifications = body.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0]["item_name"].is_null());
    // The snapshot message still names the item
    assert!(notifications[0]["message"].as_str().unwrap().contains("acetone"));
}

#[tokio::test]
async fn mark_read_and_unread_count() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;
    create_chemical(&app, "acetone", 100.0, 5.0, 365).await;
    create_chemical(&app, "ethanol", 100.0, 3.0, 365).await;

    run_sweep(&app).await;

    let (_, body) = app.get("/api/notifications/unread-count", &token).await;
    assert_eq!(body["count"], 2);

    let (_, notifications) = app.get("/api/notifications", &token).await;
    let id = notifications[0]["id"].as_i64().unwrap();

    let (status, _) = app
        .put(&format!("/api/notifications/{}/read", id), &token, json!({}))
        .await;
    assert_eq!(status, 200);

    let (_, body) = app.get("/api/notifications/unread-count", &token).await;
    assert_eq!(body["count"], 1);

    // Filtering on the read flag
    let (_, unread) = app.get("/api/notifications?is_read=false", &token).await;
    assert_eq!(unread.as_array().unwrap().len(), 1);
    let (_, read) = app.get("/api/notifications?is_read=true", &token).await;
    assert_eq!(read.as_array().unwrap().len(), 1);
    assert_eq!(read[0]["id"], id);
}

#[tokio::test]
async fn mark_all_read() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;
    create_chemical(&app, "acetone", 100.0, 5.0, 365).await;
    create_chemical(&app, "ethanol", 100.0, 3.0, 365).await;

    run_sweep(&app).await;

    let (status, body) = app
        .post("/api/notifications/mark-all-read", &token, json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 2);

    let (_, body) = app.get("/api/notifications/unread-count", &token).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn delete_notification() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;
    create_chemical(&app, "acetone", 100.0, 5.0, 365).await;

    run_sweep(&app).await;

    let (_, notifications) = app.get("/api/notifications", &token).await;
    let id = notifications[0]["id"].as_i64().unwrap();

    let (status, _) = app.delete(&format!("/api/notifications/{}", id), &token).await;
    assert_eq!(status, 200);

    let (_, notifications) = app.get("/api/notifications", &token).await;
    assert!(notifications.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_notification_returns_not_found() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;

    let (status, _) = app
        .put("/api/notifications/999/read", &token, json!({}))
        .await;
    assert_eq!(status, 404);

    let (status, _) = app.delete("/api/notifications/999", &token).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn notifications_require_authentication() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .request(axum::http::Method::GET, "/api/notifications", None, None)
        .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn usage_log_decrements_quantity() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_user(&app, "Tech", "tech@lab.example", UserRole::User).await;
    let chemical = create_chemical(&app, "acetone", 100.0, 50.0, 365).await;

    let (status, _) = app
        .post(
            "/api/chemicals/usage",
            &token,
            json!({
                "chemical_id": chemical.id,
                "date": chrono::Utc::now().date_naive().to_string(),
                "location": "Bench 3",
                "quantity": 20.0,
                "opened": true,
            }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, detail) = app.get(&format!("/api/chemicals/{}", chemical.id), &token).await;
    assert_eq!(detail["current_quantity"], 30.0);
    assert_eq!(detail["usage_log"].as_array().unwrap().len(), 1);
    assert_eq!(detail["usage_log"][0]["user_name"], "Tech");
}

#[tokio::test]
async fn usage_log_can_drain_stock_to_zero() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_user(&app, "Tech", "tech@lab.example", UserRole::User).await;
    let chemical = create_chemical(&app, "acetone", 100.0, 25.0, 365).await;

    let (status, _) = app
        .post(
            "/api/chemicals/usage",
            &token,
            json!({
                "chemical_id": chemical.id,
                "date": chrono::Utc::now().date_naive().to_string(),
                "quantity": 25.0,
            }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, detail) = app.get(&format!("/api/chemicals/{}", chemical.id), &token).await;
    assert_eq!(detail["current_quantity"], 0.0);
}

#[tokio::test]
async fn over_consumption_goes_negative_by_default() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_user(&app, "Tech", "tech@lab.example", UserRole::User).await;
    let chemical = create_chemical(&app, "acetone", 100.0, 10.0, 365).await;

    // The legacy behavior: no clamp, no rejection
    let (status, _) = app
        .post(
            "/api/chemicals/usage",
            &token,
            json!({
                "chemical_id": chemical.id,
                "date": chrono::Utc::now().date_naive().to_string(),
                "quantity": 15.0,
            }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, detail) = app.get(&format!("/api/chemicals/{}", chemical.id), &token).await;
    assert_eq!(detail["current_quantity"], -5.0);
}

#[tokio::test]
async fn over_consumption_rejected_when_enforcement_enabled() {
    let mut config = test_config();
    config.alerts.enforce_non_negative_stock = true;
    let app = TestApp::with_config(config).await;

    let (_, token) = seed_user(&app, "Tech", "tech@lab.example", UserRole::User).await;
    let chemical = create_chemical(&app, "acetone", 100.0, 10.0, 365).await;

    let (status, _) = app
        .post(
            "/api/chemicals/usage",
            &token,
            json!({
                "chemical_id": chemical.id,
                "date": chrono::Utc::now().date_naive().to_string(),
                "quantity": 15.0,
            }),
        )
        .await;
    assert_eq!(status, 422);

    let (_, detail) = app.get(&format!("/api/chemicals/{}", chemical.id), &token).await;
    assert_eq!(detail["current_quantity"], 10.0);
}
