//! Defines the HTTP routes for the product catalog.

use super::handlers::{create_product, delete_product, get_product, list_products, update_product};
use crate::auth::middleware::{PolicyGuard, RoutePolicy, enforce_policy};
use crate::auth::role::Role;
use crate::state::AppState;
use axum::{
    Router,
    http::Method,
    middleware::from_fn_with_state,
    routing::get,
};

pub fn product_router(state: &AppState) -> Router {
    let collection = PolicyGuard::new(
        state.clone(),
        RoutePolicy::role(Role::Admin).methods(&[Method::GET, Method::POST]),
    );
    let item = PolicyGuard::new(
        state.clone(),
        RoutePolicy::role(Role::Admin).methods(&[Method::GET, Method::PUT, Method::DELETE]),
    );

    Router::new()
        .route(
            "/",
            get(list_products)
                .post(create_product)
                .layer(from_fn_with_state(collection, enforce_policy)),
        )
        .route(
            "/{id}",
            get(get_product)
                .put(update_product)
                .delete(delete_product)
                .layer(from_fn_with_state(item, enforce_policy)),
        )
}
