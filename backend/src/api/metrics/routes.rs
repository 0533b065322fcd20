//! Defines the HTTP routes for dashboard metrics.

use super::handlers::inventory_metrics;
use crate::auth::middleware::{PolicyGuard, RoutePolicy, enforce_policy};
use crate::auth::role::Role;
use crate::state::AppState;
use axum::{Router, http::Method, middleware::from_fn_with_state, routing::get};

pub fn metrics_router(state: &AppState) -> Router {
    let guard = PolicyGuard::new(
        state.clone(),
        RoutePolicy::role(Role::Admin).methods(&[Method::GET]),
    );

    Router::new().route(
        "/inventory",
        get(inventory_metrics).layer(from_fn_with_state(guard, enforce_policy)),
    )
}
