//! Handler functions for admin account management.

use crate::api::common::ApiResponse;
use crate::auth::models::AdminInfo;
use crate::database::models::CreateAdminRequest;
use crate::errors::ServiceError;
use crate::services::admin_service::AdminService;
use crate::state::AppState;
use crate::utils::jwt::Principal;
use crate::validation::extract::ValidatedJson;
use axum::{
    extract::{Extension, Path},
    response::Json as ResponseJson,
};
use serde_json::{Value, json};

#[axum::debug_handler]
pub async fn list_admins(
    Extension(state): Extension<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<ResponseJson<ApiResponse<Vec<AdminInfo>>>, ServiceError> {
    let service = AdminService::new(&state.pool, state.config.bcrypt_cost);
    let admins = service.list_admins(&principal).await?;
    Ok(ResponseJson(ApiResponse::ok(admins)))
}

#[axum::debug_handler]
pub async fn create_admin(
    Extension(state): Extension<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<CreateAdminRequest>,
) -> Result<ResponseJson<ApiResponse<AdminInfo>>, ServiceError> {
    let service = AdminService::new(&state.pool, state.config.bcrypt_cost);
    let admin = service.create_admin(&principal, payload).await?;
    Ok(ResponseJson(ApiResponse::ok(admin)))
}

#[axum::debug_handler]
pub async fn delete_admin(
    Extension(state): Extension<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Value>>, ServiceError> {
    let service = AdminService::new(&state.pool, state.config.bcrypt_cost);
    service.delete_admin(&principal, &id).await?;
    Ok(ResponseJson(ApiResponse::ok(json!({ "id": id, "deleted": true }))))
}
