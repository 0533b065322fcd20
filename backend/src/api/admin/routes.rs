//! Defines the HTTP routes for admin account management.

use super::handlers::{create_admin, delete_admin, list_admins};
use crate::auth::middleware::{PolicyGuard, RoutePolicy, enforce_policy};
use crate::auth::role::Role;
use crate::state::AppState;
use axum::{
    Router,
    http::Method,
    middleware::from_fn_with_state,
    routing::{delete, get},
};

pub fn admin_router(state: &AppState) -> Router {
    let collection = PolicyGuard::new(
        state.clone(),
        RoutePolicy::role(Role::SuperAdmin).methods(&[Method::GET, Method::POST]),
    );
    let item = PolicyGuard::new(
        state.clone(),
        RoutePolicy::role(Role::SuperAdmin).methods(&[Method::DELETE]),
    );

    Router::new()
        .route(
            "/",
            get(list_admins)
                .post(create_admin)
                .layer(from_fn_with_state(collection, enforce_policy)),
        )
        .route(
            "/{id}",
            delete(delete_admin).layer(from_fn_with_state(item, enforce_policy)),
        )
}
