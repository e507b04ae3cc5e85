//! Notification API endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::{
    middleware::{require_admin, AuthUser},
    models::{Notification, NotificationQuery},
    services::{NotificationService, NotificationSweep, SweepReport},
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/mark-all-read", post(mark_all_read))
        .route("/sweep", post(run_sweep))
        .route("/{id}/read", put(mark_notification_read))
        .route("/{id}", delete(delete_notification))
}

async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = NotificationService::new(state.db.clone()).list(query).await?;
    Ok(Json(notifications))
}

async fn unread_count(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = NotificationService::new(state.db.clone()).unread_count().await?;
    Ok(Json(json!({ "count": count })))
}

async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    NotificationService::new(state.db.clone()).mark_read(id).await?;
    Ok(Json(json!({ "message": "Notification marked as read" })))
}

async fn mark_all_read(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let count = NotificationService::new(state.db.clone()).mark_all_read().await?;
    Ok(Json(json!({
        "message": "All notifications marked as read",
        "count": count,
    })))
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    NotificationService::new(state.db.clone()).delete(id).await?;
    Ok(Json(json!({ "message": "Notification deleted successfully" })))
}

/// Run the notification sweep on demand instead of waiting for the
/// scheduler.
async fn run_sweep(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SweepReport>, AppError> {
    require_admin(&auth_user)?;

    let sweep = NotificationSweep::new(state.db.clone(), state.config.alerts.clone());
    let report = sweep.run().await;

    Ok(Json(report))
}
