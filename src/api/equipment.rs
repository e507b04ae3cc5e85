//! Equipment API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::EquipmentRepository,
    middleware::{require_admin, AuthUser},
    models::{
        AuditAction, AuditDomain, Equipment, EquipmentDetail, EquipmentRequest,
        LogMaintenanceRequest, MaintenanceLog,
    },
    services::AuditRecorder,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_equipment).post(create_equipment))
        .route("/maintenance", post(log_maintenance))
        .route(
            "/{id}",
            get(get_equipment).put(update_equipment).delete(delete_equipment),
        )
}

async fn list_equipment(State(state): State<AppState>) -> Result<Json<Vec<Equipment>>, AppError> {
    let equipment = EquipmentRepository::new(&state.db).list().await?;
    Ok(Json(equipment))
}

async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EquipmentDetail>, AppError> {
    let repo = EquipmentRepository::new(&state.db);
    let equipment = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment not found"))?;
    let maintenance_log = repo.maintenance_logs(id).await?;

    Ok(Json(EquipmentDetail {
        equipment,
        maintenance_log,
    }))
}

async fn create_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<EquipmentRequest>,
) -> Result<(StatusCode, Json<Equipment>), AppError> {
    require_admin(&auth_user)?;
    req.validate()?;

    let equipment = EquipmentRepository::new(&state.db).create(&req).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Equipment,
            AuditAction::Add,
            &equipment.name,
            auth_user.id,
            json!({
                "serial_id": equipment.serial_id,
                "model": equipment.model,
                "status": equipment.status,
            }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(equipment)))
}

async fn update_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<EquipmentRequest>,
) -> Result<Json<Equipment>, AppError> {
    require_admin(&auth_user)?;
    req.validate()?;

    let equipment = EquipmentRepository::new(&state.db)
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment not found"))?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Equipment,
            AuditAction::Update,
            &equipment.name,
            auth_user.id,
            json!({
                "serial_id": equipment.serial_id,
                "status": equipment.status,
            }),
        )
        .await;

    Ok(Json(equipment))
}

async fn delete_equipment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&auth_user)?;

    let repo = EquipmentRepository::new(&state.db);
    let equipment = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment not found"))?;

    repo.delete(id).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Equipment,
            AuditAction::Delete,
            &equipment.name,
            auth_user.id,
            json!({ "serial_id": equipment.serial_id }),
        )
        .await;

    Ok(Json(json!({ "message": "Equipment deleted successfully" })))
}

async fn log_maintenance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<LogMaintenanceRequest>,
) -> Result<(StatusCode, Json<MaintenanceLog>), AppError> {
    req.validate()?;

    let repo = EquipmentRepository::new(&state.db);
    let equipment = repo
        .get_by_id(req.equipment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment not found"))?;

    let log = repo.insert_maintenance(auth_user.id, &req).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Equipment,
            AuditAction::custom(&req.action),
            &equipment.name,
            auth_user.id,
            json!({
                "action": req.action,
                "date": req.date,
                "notes": req.notes,
            }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(log)))
}
