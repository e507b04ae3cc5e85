//! Test application setup utilities
//!
//! Provides utilities for setting up test instances of the application
//! with in-memory databases.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use labtrack::{
    api,
    config::AppConfig,
    middleware::{auth_middleware, Claims},
    models::{User, UserRequest, UserRole},
    AppState,
};

pub const TEST_JWT_SECRET: &str = "test-secret-not-for-production";

/// Test application wrapper for integration testing
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application with an in-memory SQLite database
    pub async fn spawn() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a new test application with custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        // A single connection keeps every query on the same in-memory
        // database
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let state = AppState {
            config,
            db,
        };

        let protected = api::protected_routes().layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));
        let router = Router::new()
            .nest("/api", api::public_routes().merge(protected))
            .with_state(state.clone());

        Self { router, state }
    }

    /// Issue a bearer token for the given user
    pub fn token_for(&self, user: &User) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            iat: now,
            exp: now + 3600,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("Failed to encode test token")
    }

    /// Send a request and return the status code plus parsed JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}

/// Default test configuration
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    // The in-process scheduler is never started in tests
    config.alerts.sweep_enabled = false;
    config
}

/// Create a user directly in the database and return it with a valid token
pub async fn seed_user(app: &TestApp, name: &str, email: &str, role: UserRole) -> (User, String) {
    let repo = labtrack::db::UserRepository::new(&app.state.db);
    let user = repo
        .create(&UserRequest {
            email: email.to_string(),
            name: name.to_string(),
            role: Some(role),
        })
        .await
        .expect("Failed to seed user");
    let token = app.token_for(&user);
    (user, token)
}

/// Create an admin user and return it with a valid token
pub async fn seed_admin(app: &TestApp) -> (User, String) {
    seed_user(app, "Test Admin", "admin@lab.example", UserRole::Admin).await
}
