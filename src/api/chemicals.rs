//! Chemical inventory API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::ChemicalRepository,
    middleware::{require_admin, AuthUser},
    models::{AuditAction, AuditDomain, Chemical, ChemicalDetail, ChemicalRequest, LogUsageRequest, UsageLog},
    services::AuditRecorder,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_chemicals).post(create_chemical))
        .route("/usage", post(log_usage))
        .route(
            "/{id}",
            get(get_chemical).put(update_chemical).delete(delete_chemical),
        )
}

async fn list_chemicals(State(state): State<AppState>) -> Result<Json<Vec<Chemical>>, AppError> {
    let chemicals = ChemicalRepository::new(&state.db).list().await?;
    Ok(Json(chemicals))
}

async fn get_chemical(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ChemicalDetail>, AppError> {
    let repo = ChemicalRepository::new(&state.db);
    let chemical = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Chemical not found"))?;
    let usage_log = repo.usage_logs(id).await?;

    Ok(Json(ChemicalDetail {
        chemical,
        usage_log,
    }))
}

async fn create_chemical(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<ChemicalRequest>,
) -> Result<(StatusCode, Json<Chemical>), AppError> {
    require_admin(&auth_user)?;
    req.validate()?;

    let chemical = ChemicalRepository::new(&state.db).create(&req).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Chemical,
            AuditAction::Add,
            &chemical.name,
            auth_user.id,
            json!({
                "batch_number": chemical.batch_number,
                "quantity": chemical.initial_quantity,
            }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(chemical)))
}

async fn update_chemical(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ChemicalRequest>,
) -> Result<Json<Chemical>, AppError> {
    require_admin(&auth_user)?;
    req.validate()?;

    let chemical = ChemicalRepository::new(&state.db)
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("Chemical not found"))?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Chemical,
            AuditAction::Update,
            &chemical.name,
            auth_user.id,
            json!({
                "batch_number": chemical.batch_number,
                "quantity": chemical.current_quantity,
            }),
        )
        .await;

    Ok(Json(chemical))
}

async fn delete_chemical(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&auth_user)?;

    let repo = ChemicalRepository::new(&state.db);
    let chemical = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Chemical not found"))?;

    repo.delete(id).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Chemical,
            AuditAction::Delete,
            &chemical.name,
            auth_user.id,
            json!({ "batch_number": chemical.batch_number }),
        )
        .await;

    Ok(Json(json!({ "message": "Chemical deleted successfully" })))
}

async fn log_usage(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<LogUsageRequest>,
) -> Result<(StatusCode, Json<UsageLog>), AppError> {
    req.validate()?;

    let repo = ChemicalRepository::new(&state.db);
    let chemical = repo
        .get_by_id(req.chemical_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chemical not found"))?;

    // Negative inventory is allowed unless the deployment opts into the
    // stricter rule.
    if state.config.alerts.enforce_non_negative_stock && req.quantity > chemical.current_quantity {
        return Err(AppError::ValidationError(format!(
            "Usage quantity {} exceeds current stock {}",
            req.quantity, chemical.current_quantity
        )));
    }

    let log = repo.insert_usage(auth_user.id, &req).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::Chemical,
            AuditAction::Usage,
            &chemical.name,
            auth_user.id,
            json!({
                "quantity": req.quantity,
                "location": req.location,
                "date": req.date,
            }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(log)))
}
