//! Handler functions for authentication-related API endpoints.
//!
//! Login answers with the token in the body and also sets the session and
//! CSRF cookies, so both API clients and the browser dashboard can use it.

use crate::api::common::ApiResponse;
use crate::auth::csrf::CSRF_COOKIE;
use crate::auth::middleware::AUTH_COOKIE;
use crate::auth::models::{AdminInfo, LoginRequest, LoginResponse};
use crate::auth::service::AuthService;
use crate::errors::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::utils::cookies::{delete_cookie, set_cookie};
use crate::utils::jwt::Principal;
use crate::validation::extract::ValidatedJson;
use axum::{
    extract::Extension,
    http::{HeaderValue, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Json as ResponseJson, Response},
};
use serde_json::json;
use std::time::Duration;

/// Handle admin login request
#[axum::debug_handler]
pub async fn login(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Response, ServiceError> {
    let auth_service = AuthService::new(&state.pool, &state.jwt);
    let response: LoginResponse = auth_service.login(payload).await?;

    let secure = !state.config.is_development();
    let max_age = Some(Duration::from_secs(response.expires_in));
    let cookies = [
        (
            SET_COOKIE,
            cookie(set_cookie(AUTH_COOKIE, &response.token, max_age, true, secure))?,
        ),
        (
            SET_COOKIE,
            cookie(set_cookie(CSRF_COOKIE, &response.csrf_token, max_age, false, secure))?,
        ),
    ];

    Ok((AppendHeaders(cookies), ResponseJson(ApiResponse::ok(response))).into_response())
}

/// Handle logout request by clearing the session cookies.
///
/// Tokens are stateless; a bearer token stays valid until it expires.
#[axum::debug_handler]
pub async fn logout() -> Result<Response, ServiceError> {
    let cookies = [
        (SET_COOKIE, cookie(delete_cookie(AUTH_COOKIE, true))?),
        (SET_COOKIE, cookie(delete_cookie(CSRF_COOKIE, false))?),
    ];

    Ok((
        AppendHeaders(cookies),
        ResponseJson(ApiResponse::ok(json!({
            "message": "Logged out successfully"
        }))),
    )
        .into_response())
}

/// Get current admin information from the verified session
#[axum::debug_handler]
pub async fn me(
    Extension(state): Extension<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ResponseJson<ApiResponse<AdminInfo>>, ServiceError> {
    let auth_service = AuthService::new(&state.pool, &state.jwt);
    let admin = auth_service.me(&principal).await?;
    Ok(ResponseJson(ApiResponse::ok(admin)))
}

fn cookie(value: anyhow::Result<HeaderValue>) -> ServiceResult<HeaderValue> {
    value.map_err(|e| ServiceError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::auth::role::Role;
    use crate::test_support::{body_json, send, seed_admin, test_app, test_state};
    use axum::http::{Method, StatusCode, header::SET_COOKIE};
    use serde_json::json;

    #[tokio::test]
    async fn test_login_round_trip() {
        let state = test_state().await;
        seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        let response = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "a@b.com", "password": "Str0ngPass"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("auth_token=") && c.contains("HttpOnly")));
        assert!(cookies.iter().any(|c| c.starts_with("csrf_token=")));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["data"]["user"]["email"], "a@b.com");
        assert!(body["data"]["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_yields_no_token() {
        let state = test_state().await;
        seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        for (email, password) in [("a@b.com", "WrongPass1"), ("nobody@b.com", "Str0ngPass")] {
            let response = send(
                &app,
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert!(body["error"].is_object());
            assert!(body.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn test_login_validation_errors_are_batched() {
        let state = test_state().await;
        let app = test_app(&state);
        let response = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "not-an-email"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let errors = body["error"]["details"]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_traffic_leaves_login_budget_intact() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        let login_budget = state.config.rate_limits.auth.max_requests;
        for _ in 0..login_budget {
            let response = send(&app, Method::GET, "/api/products", Some(&token), None).await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "a@b.com", "password": "Str0ngPass"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_me_and_logout() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::SuperAdmin).await;
        let app = test_app(&state);

        let response = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["role"], "super_admin");

        let response = send(&app, Method::POST, "/api/auth/logout", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .all(|v| v.to_str().unwrap().contains("Max-Age=0"))
        );
    }
}
