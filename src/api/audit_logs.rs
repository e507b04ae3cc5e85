//! Audit log API endpoints
//!
//! Read-only: the audit trail has no mutation surface.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    middleware::{require_admin, AuthUser},
    models::{AuditLogEntry, AuditLogPage, AuditLogQuery},
    services::AuditRecorder,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/{id}", get(get_audit_log))
}

async fn list_audit_logs(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<AuditLogPage>, AppError> {
    require_admin(&auth_user)?;

    let page = AuditRecorder::new(&state.db).list(&query).await?;
    Ok(Json(page))
}

async fn get_audit_log(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<AuditLogEntry>, AppError> {
    require_admin(&auth_user)?;

    let entry = AuditRecorder::new(&state.db).get(id).await?;
    Ok(Json(entry))
}
