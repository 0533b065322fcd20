//! Handler functions for dashboard metrics.

use crate::api::common::ApiResponse;
use crate::database::models::InventoryMetrics;
use crate::errors::ServiceError;
use crate::services::metrics_service::MetricsService;
use crate::state::AppState;
use axum::{extract::Extension, response::Json as ResponseJson};

#[axum::debug_handler]
pub async fn inventory_metrics(
    Extension(state): Extension<AppState>,
) -> Result<ResponseJson<ApiResponse<InventoryMetrics>>, ServiceError> {
    let service = MetricsService::new(&state.pool, state.config.low_stock_threshold);
    let metrics = service.inventory().await?;
    Ok(ResponseJson(ApiResponse::ok(metrics)))
}

#[cfg(test)]
mod tests {
    use crate::auth::role::Role;
    use crate::test_support::{body_json, send, seed_admin, test_app, test_state};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_inventory_metrics() {
        let state = test_state().await;
        let token = seed_admin(&state, "a@b.com", "Str0ngPass", Role::Admin).await;
        let app = test_app(&state);

        for (stock, status) in [(0, "active"), (2, "active"), (40, "draft")] {
            let response = send(
                &app,
                Method::POST,
                "/api/products",
                Some(&token),
                Some(json!({
                    "name": "Cable",
                    "category": "accessories",
                    "price": 5.0,
                    "stock": stock,
                    "status": status
                })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = send(&app, Method::GET, "/api/metrics/inventory", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let data = &body["data"];
        assert_eq!(data["total_products"], 3);
        assert_eq!(data["active_products"], 2);
        assert_eq!(data["out_of_stock_products"], 1);
        assert_eq!(data["low_stock_products"], 1);
        assert_eq!(data["total_stock_units"], 42);
        assert_eq!(data["inventory_value"], 210.0);
    }
}
