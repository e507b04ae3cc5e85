//! Integration tests for the audit trail
//!
//! Covers attribution and snapshot semantics, strict ordering, pagination,
//! filtering, and the best-effort write policy (a failed audit write must
//! never fail the primary operation).

use serde_json::json;

use labtrack::models::{AuditAction, AuditDomain, AuditLogQuery};
use labtrack::services::AuditRecorder;

use crate::common::*;

#[tokio::test]
async fn mutations_are_recorded_with_attribution() {
    let app = TestApp::spawn().await;
    let (admin, token) = seed_admin(&app).await;

    let (status, created) = app
        .post("/api/chemicals", &token, chemical_json("acetone", 100.0, 365))
        .await;
    assert_eq!(status, 201);

    let (status, body) = app.get("/api/audit-logs", &token).await;
    assert_eq!(status, 200);

    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["type"], "chemical");
    assert_eq!(logs[0]["action"], "add");
    assert_eq!(logs[0]["item_name"], "acetone");
    assert_eq!(logs[0]["user_id"], admin.id);
    assert_eq!(logs[0]["user_name"], "Test Admin");
    assert_eq!(logs[0]["details"]["batch_number"], created["batch_number"]);
}

#[tokio::test]
async fn entries_survive_item_deletion() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;

    let (_, created) = app
        .post("/api/chemicals", &token, chemical_json("formalin", 50.0, 365))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app.delete(&format!("/api/chemicals/{}", id), &token).await;
    assert_eq!(status, 200);

    // The add entry still names the deleted chemical: item_name is a
    // write-time snapshot, not a live reference
    let (_, body) = app.get("/api/audit-logs?action=add", &token).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["item_name"], "formalin");

    let (_, body) = app.get("/api/audit-logs", &token).await;
    assert_eq!(body["pagination"]["total"], 2);
}

#[tokio::test]
async fn list_is_ordered_newest_first() {
    let app = TestApp::spawn().await;
    let (admin, token) = seed_admin(&app).await;

    let recorder = AuditRecorder::new(&app.state.db);
    for i in 1..=5 {
        recorder
            .record(
                AuditDomain::Chemical,
                AuditAction::Add,
                &format!("entry-{:02}", i),
                admin.id,
                json!({}),
            )
            .await;
    }

    let (_, body) = app.get("/api/audit-logs", &token).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 5);

    let names: Vec<&str> = logs.iter().map(|l| l["item_name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["entry-05", "entry-04", "entry-03", "entry-02", "entry-01"]);

    let timestamps: Vec<&str> = logs.iter().map(|l| l["timestamp"].as_str().unwrap()).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted);
}

#[tokio::test]
async fn pagination_slices_and_counts() {
    let app = TestApp::spawn().await;
    let (admin, token) = seed_admin(&app).await;

    let recorder = AuditRecorder::new(&app.state.db);
    for i in 1..=25 {
        recorder
            .record(
                AuditDomain::Chemical,
                AuditAction::Add,
                &format!("entry-{:02}", i),
                admin.id,
                json!({}),
            )
            .await;
    }

    let (status, body) = app.get("/api/audit-logs?page=2&limit=10", &token).await;
    assert_eq!(status, 200);

    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 10);
    // Newest first: page 2 holds the 11th through 20th newest entries
    assert_eq!(logs[0]["item_name"], "entry-15");
    assert_eq!(logs[9]["item_name"], "entry-06");

    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["pages"], 3);
}

#[tokio::test]
async fn filters_by_type_and_action() {
    let app = TestApp::spawn().await;
    let (admin, token) = seed_admin(&app).await;

    let recorder = AuditRecorder::new(&app.state.db);
    recorder
        .record(AuditDomain::Chemical, AuditAction::Add, "acetone", admin.id, json!({}))
        .await;
    recorder
        .record(AuditDomain::Chemical, AuditAction::Usage, "acetone", admin.id, json!({}))
        .await;
    recorder
        .record(AuditDomain::Equipment, AuditAction::Add, "centrifuge", admin.id, json!({}))
        .await;

    let (_, body) = app.get("/api/audit-logs?type=chemical", &token).await;
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = app.get("/api/audit-logs?type=chemical&action=usage", &token).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["logs"][0]["action"], "usage");

    let (_, body) = app.get("/api/audit-logs?type=user", &token).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn get_by_id_and_not_found() {
    let app = TestApp::spawn().await;
    let (admin, token) = seed_admin(&app).await;

    AuditRecorder::new(&app.state.db)
        .record(AuditDomain::User, AuditAction::Add, "New User", admin.id, json!({"role": "user"}))
        .await;

    let (_, body) = app.get("/api/audit-logs", &token).await;
    let id = body["logs"][0]["id"].as_i64().unwrap();

    let (status, entry) = app.get(&format!("/api/audit-logs/{}", id), &token).await;
    assert_eq!(status, 200);
    assert_eq!(entry["item_name"], "New User");
    assert_eq!(entry["details"]["role"], "user");

    let (status, _) = app.get("/api/audit-logs/99999", &token).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn audit_log_access_is_admin_only() {
    let app = TestApp::spawn().await;
    let (_, user_token) = seed_user(
        &app,
        "Regular",
        "regular@lab.example",
        labtrack::models::UserRole::User,
    )
    .await;

    let (status, _) = app.get("/api/audit-logs", &user_token).await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn failed_audit_write_does_not_fail_the_operation() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;

    // Simulate an audit store failure
    sqlx::query("DROP TABLE audit_logs")
        .execute(&app.state.db)
        .await
        .unwrap();

    let (status, created) = app
        .post("/api/chemicals", &token, chemical_json("acetone", 100.0, 365))
        .await;

    // The primary mutation still commits and reports success
    assert_eq!(status, 201);
    assert_eq!(created["name"], "acetone");

    let (status, body) = app.get("/api/chemicals", &token).await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn maintenance_actions_are_recorded_lowercased() {
    let app = TestApp::spawn().await;
    let (_, token) = seed_admin(&app).await;
    let equipment = create_equipment(&app, "centrifuge", "SN-100").await;

    let (status, _) = app
        .post(
            "/api/equipment/maintenance",
            &token,
            json!({
                "equipment_id": equipment.id,
                "date": chrono::Utc::now().date_naive().to_string(),
                "action": "Calibration",
                "notes": "Annual calibration",
            }),
        )
        .await;
    assert_eq!(status, 201);

    let (_, body) = app.get("/api/audit-logs?action=calibration", &token).await;
    let logs = body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["type"], "equipment");
    assert_eq!(logs[0]["item_name"], "centrifuge");
}

#[tokio::test]
async fn recorder_list_works_without_http_layer() {
    let app = TestApp::spawn().await;
    let (admin, _) = seed_admin(&app).await;

    let recorder = AuditRecorder::new(&app.state.db);
    recorder
        .record(AuditDomain::Chemical, AuditAction::Delete, "old-batch", admin.id, json!({}))
        .await;

    let page = recorder.list(&AuditLogQuery::default()).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.logs[0].action, "delete");
    assert_eq!(page.logs[0].item_name, "old-batch");
}
