//! Central module for organizing the application's API endpoints.
//!
//! [`router`] assembles every domain router under `/api`, the public banner
//! and health routes, and the layers shared by all of them.

pub mod admin;
pub mod common;
pub mod metrics;
pub mod product;

use crate::api::common::{ApiResponse, INTERNAL_ERROR_MESSAGE};
use crate::auth::routes::auth_router;
use crate::errors::ServiceError;
use crate::state::AppState;
use axum::{
    Extension, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let expose_internal = state.config.is_development();

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/auth", auth_router(&state))
        .nest("/api/products", product::routes::product_router(&state))
        .nest("/api/admins", admin::routes::admin_router(&state))
        .nest("/api/metrics", metrics::routes::metrics_router(&state))
        .fallback(not_found_handler)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(panic, expose_internal)
        }))
}

async fn root_handler() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(json!({
        "service": "Catalog Admin Backend",
        "version": env!("CARGO_PKG_VERSION")
    })))
}

async fn health_handler() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(json!({ "status": "ok" })))
}

async fn not_found_handler(uri: Uri) -> ServiceError {
    ServiceError::not_found("Route", uri.path())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_internal: bool) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    let message = if expose_internal {
        detail
    } else {
        INTERNAL_ERROR_MESSAGE.to_string()
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("internal_error", message, None)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{body_json, send, test_app, test_state};
    use axum::http::Method;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_public_routes() {
        let state = test_state().await;
        let app = test_app(&state);

        let response = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["status"], "ok");

        let response = send(&app, Method::GET, "/", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_uses_envelope() {
        let state = test_state().await;
        let app = test_app(&state);
        let response = send(&app, Method::GET, "/api/nope", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "not_found");
    }

    async fn boom() -> &'static str {
        panic!("stock table corrupted")
    }

    #[tokio::test]
    async fn test_panics_become_500_envelopes() {
        for (expose, expected) in [
            (true, "stock table corrupted"),
            (false, INTERNAL_ERROR_MESSAGE),
        ] {
            let app = Router::new()
                .route("/boom", get(boom))
                .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
                    panic_response(panic, expose)
                }));
            let response = app
                .oneshot(
                    axum::http::Request::builder()
                        .uri("/boom")
                        .body(axum::body::Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = body_json(response.into_response()).await;
            assert_eq!(body["error"]["message"], expected);
        }
    }
}
