//! Shared fixtures for router and service tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
    response::Response,
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::api;
use crate::auth::role::Role;
use crate::auth::service::hash_password;
use crate::config::Config;
use crate::database::Database;
use crate::database::models::{Admin, CreateAdmin};
use crate::repositories::admin_repository::AdminRepository;
use crate::state::AppState;

pub async fn test_state() -> AppState {
    test_state_with(Config::for_tests()).await
}

/// Fresh in-memory database with migrations applied.
pub async fn test_state_with(config: Config) -> AppState {
    let db = Database::new(&config).await.expect("test database");
    AppState::new(db.pool.clone(), config)
}

pub fn test_app(state: &AppState) -> Router {
    api::router(state.clone())
}

/// Signed token for an admin that does not exist in the database.
pub fn token_for(state: &AppState, email: &str, role: Role) -> String {
    let admin = Admin {
        id: uuid::Uuid::now_v7().to_string(),
        email: email.to_string(),
        name: "Test Admin".to_string(),
        password_hash: String::new(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    state.jwt.generate_token(&admin).expect("token")
}

/// Stores an admin and returns a session token for it.
pub async fn seed_admin(state: &AppState, email: &str, password: &str, role: Role) -> String {
    let admin = AdminRepository::new(&state.pool)
        .create_admin(CreateAdmin {
            email: email.to_string(),
            name: "Test Admin".to_string(),
            password_hash: hash_password(password, state.config.bcrypt_cost).expect("hash"),
            role,
        })
        .await
        .expect("seed admin");
    state.jwt.generate_token(&admin).expect("token")
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("infallible")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
