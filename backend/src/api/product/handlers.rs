//! Handler functions for product catalog endpoints.
//!
//! Query strings and bodies are validated by the extractors before these
//! run; handlers only call into `ProductService`.

use crate::api::common::ApiResponse;
use crate::database::models::{CreateProductRequest, Product, ProductFilter, UpdateProductRequest};
use crate::errors::ServiceError;
use crate::services::product_service::ProductService;
use crate::state::AppState;
use crate::validation::extract::{ValidatedJson, ValidatedQuery};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde_json::{Value, json};

#[axum::debug_handler]
pub async fn list_products(
    Extension(state): Extension<AppState>,
    ValidatedQuery(filter): ValidatedQuery<ProductFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ServiceError> {
    let service = ProductService::new(&state.pool);
    let (products, pagination) = service.list_products(&filter).await?;
    Ok(ResponseJson(ApiResponse::ok_paginated(products, pagination)))
}

#[axum::debug_handler]
pub async fn create_product(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Product>>), ServiceError> {
    let service = ProductService::new(&state.pool);
    let product = service.create_product(payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::ok(product))))
}

#[axum::debug_handler]
pub async fn get_product(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Product>>, ServiceError> {
    let service = ProductService::new(&state.pool);
    let product = service.get_product(&id).await?;
    Ok(ResponseJson(ApiResponse::ok(product)))
}

#[axum::debug_handler]
pub async fn update_product(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> Result<ResponseJson<ApiResponse<Product>>, ServiceError> {
    let service = ProductService::new(&state.pool);
    let product = service.update_product(&id, payload).await?;
    Ok(ResponseJson(ApiResponse::ok(product)))
}

#[axum::debug_handler]
pub async fn delete_product(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ServiceError> {
    let service = ProductService::new(&state.pool);
    service.delete_product(&id).await?;
    Ok(ResponseJson(ApiResponse::ok(json!({ "id": id, "deleted": true }))))
}

#[cfg(test)]
mod tests {
    use crate::auth::role::Role;
    use crate::test_support::{body_json, send, seed_admin, test_app, test_state};
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    async fn create(app: &axum::Router, token: &str, body: Value) -> Value {
        let response = send(app, Method::POST, "/api/products", Some(token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"].clone()
    }

    #[tokio::test]
    async fn test_product_crud() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        let product = create(
            &app,
            &token,
            json!({"name": "iPhone", "category": "phones", "price": 999.0, "stock": 3}),
        )
        .await;
        assert_eq!(product["status"], "draft");
        let id = product["id"].as_str().unwrap().to_string();
        let path = format!("/api/products/{id}");

        let response = send(&app, Method::GET, &path, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            Method::PUT,
            &path,
            Some(&token),
            Some(json!({"status": "active", "stock": "7"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "active");
        assert_eq!(body["data"]["stock"], 7);
        assert_eq!(body["data"]["name"], "iPhone");

        let response = send(&app, Method::DELETE, &path, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, &path, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        for (name, category, price) in [
            ("iPhone", "phones", 999.0),
            ("MacBook", "laptops", 2499.0),
            ("Pixel Phone", "phones", 699.0),
        ] {
            create(
                &app,
                &token,
                json!({"name": name, "category": category, "price": price, "stock": 1}),
            )
            .await;
        }

        let response = send(
            &app,
            Method::GET,
            "/api/products?search=PHONE&limit=1&page=2",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["total_items"], 2);
        assert_eq!(body["pagination"]["current_page"], 2);

        let response = send(
            &app,
            Method::GET,
            "/api/products?minPrice=1000&maxPrice=10",
            Some(&token),
            None,
        )
        .await;
        let body = body_json(response).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_can_clear_optional_fields() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        let product = create(
            &app,
            &token,
            json!({
                "name": "iPhone",
                "description": "Flagship phone",
                "category": "phones",
                "price": 999.0,
                "stock": 3,
                "image_url": "https://cdn.shop.com/iphone.png"
            }),
        )
        .await;
        assert_eq!(product["image_url"], "https://cdn.shop.com/iphone.png");
        let path = format!("/api/products/{}", product["id"].as_str().unwrap());

        let response = send(
            &app,
            Method::PUT,
            &path,
            Some(&token),
            Some(json!({"description": "", "image_url": ""})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["description"], "");
        assert!(body["data"]["image_url"].is_null());
        assert_eq!(body["data"]["name"], "iPhone");

        let response = send(
            &app,
            Method::PUT,
            &path,
            Some(&token),
            Some(json!({"image_url": "not a url"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_query_parameters_are_ignored() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);
        create(
            &app,
            &token,
            json!({"name": "iPhone", "category": "phones", "price": 999.0, "stock": 3}),
        )
        .await;

        let response = send(
            &app,
            Method::GET,
            "/api/products?search=&category=&page=",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_query_is_rejected_with_all_errors() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        let response = send(
            &app,
            Method::GET,
            "/api/products?page=0&limit=500&status=sold",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["details"]["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        let response = send(
            &app,
            Method::PUT,
            "/api/products/whatever",
            Some(&token),
            Some(json!({})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_products_require_a_session() {
        let state = test_state().await;
        let app = test_app(&state);
        let response = send(&app, Method::GET, "/api/products", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unlisted_method_is_405() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);
        let response = send(&app, Method::PATCH, "/api/products", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "method_not_allowed");
    }
}
