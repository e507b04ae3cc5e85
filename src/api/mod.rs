//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};

use crate::AppState;

mod audit_logs;
mod chemicals;
mod equipment;
mod health;
mod notifications;
mod users;

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/chemicals", chemicals::routes())
        .nest("/equipment", equipment::routes())
        .nest("/users", users::routes())
        .nest("/notifications", notifications::routes())
        .nest("/audit-logs", audit_logs::routes())
}
