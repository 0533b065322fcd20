//! Defines the HTTP routes specifically for authentication.

use crate::auth::handlers::{login, logout, me};
use crate::auth::middleware::{PolicyGuard, RoutePolicy, enforce_policy};
use crate::state::AppState;
use axum::{
    Router,
    http::Method,
    middleware::from_fn_with_state,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router(state: &AppState) -> Router {
    let login_guard = PolicyGuard::new(
        state.clone(),
        RoutePolicy::auth_endpoint().methods(&[Method::POST]),
    );
    let logout_guard = PolicyGuard::new(
        state.clone(),
        RoutePolicy::public().methods(&[Method::POST]),
    );
    let me_guard = PolicyGuard::new(
        state.clone(),
        RoutePolicy::authenticated().methods(&[Method::GET]),
    );

    Router::new()
        .route(
            "/login",
            post(login).layer(from_fn_with_state(login_guard, enforce_policy)),
        )
        .route(
            "/logout",
            post(logout).layer(from_fn_with_state(logout_guard, enforce_policy)),
        )
        .route(
            "/me",
            get(me).layer(from_fn_with_state(me_guard, enforce_policy)),
        )
}
