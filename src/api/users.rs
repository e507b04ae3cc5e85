//! User management API endpoints
//!
//! All user management is admin-only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::UserRepository,
    middleware::{require_admin, AuthUser},
    models::{AuditAction, AuditDomain, User, UserRequest, UserRole},
    services::AuditRecorder,
    utils::AppError,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&auth_user)?;

    let users = UserRepository::new(&state.db).list().await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    require_admin(&auth_user)?;

    let user = UserRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<UserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    require_admin(&auth_user)?;
    req.validate()?;

    let repo = UserRepository::new(&state.db);
    if repo.get_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let user = repo.create(&req).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::User,
            AuditAction::Add,
            &user.name,
            auth_user.id,
            json!({
                "email": user.email,
                "role": req.role.unwrap_or(UserRole::User),
            }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UserRequest>,
) -> Result<Json<User>, AppError> {
    require_admin(&auth_user)?;
    req.validate()?;

    let user = UserRepository::new(&state.db)
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::User,
            AuditAction::Update,
            &user.name,
            auth_user.id,
            json!({
                "email": user.email,
                "role": user.role,
            }),
        )
        .await;

    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&auth_user)?;

    // Deleting one's own account is forbidden
    if id == auth_user.id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let repo = UserRepository::new(&state.db);
    let user = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    repo.delete(id).await?;

    AuditRecorder::new(&state.db)
        .record(
            AuditDomain::User,
            AuditAction::Delete,
            &user.name,
            auth_user.id,
            json!({ "email": user.email }),
        )
        .await;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
