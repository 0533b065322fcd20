//! Response envelope and error mapping for API responses.
//!
//! Every API response uses the same JSON shape:
//! - success: `{ "success": true, "data": ..., "pagination": ... }`
//! - failure: `{ "success": false, "error": { "code", "message", "details" }, "timestamp" }`
//!
//! # Error Handling Flow
//! 1. Services and extractors return a domain-specific `ServiceError`
//! 2. `ServiceError` renders itself through [`error_response`]
//! 3. Validation failures carry their field errors in `error.details.errors`
//! 4. Internal failures are logged and replaced by a generic message; the
//!    original text travels in an [`InternalErrorDetail`] extension so the
//!    request guard can echo it in development

use crate::errors::ServiceError;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    /// Pagination metadata (present for paginated responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    /// RFC 3339 time the error was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Number of items per page
    pub per_page: u32,
    /// Total number of items across all pages
    pub total_items: u64,
    /// Total number of pages
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
    /// Next page number (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    /// Previous page number (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u32>,
}

/// Original message of an internal failure, attached to the response
/// instead of its body.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl PaginationMeta {
    /// Create pagination metadata from page parameters and total count
    pub fn new(current_page: u32, per_page: u32, total_items: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = if total_items == 0 {
            1
        } else {
            ((total_items - 1) / per_page as u64 + 1) as u32
        };

        let has_next = current_page < total_pages;
        let has_prev = current_page > 1;

        Self {
            current_page,
            per_page,
            total_items,
            total_pages,
            has_next,
            has_prev,
            next_page: if has_next {
                Some(current_page + 1)
            } else {
                None
            },
            prev_page: if has_prev {
                Some(current_page - 1)
            } else {
                None
            },
        }
    }
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            pagination: None,
            timestamp: None,
        }
    }

    /// Create a successful paginated response
    pub fn ok_paginated(data: T, pagination: PaginationMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    /// Create an error response
    pub fn error(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
                details,
            }),
            pagination: None,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// Converts a ServiceError to its HTTP status and envelope.
pub fn error_response(error: ServiceError) -> Response {
    let mut internal_detail = None;
    let mut retry_after = None;

    let (status, code, message, details) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message, None)
        }
        ServiceError::ValidationFailed { errors } => (
            StatusCode::BAD_REQUEST,
            "validation_error",
            "Validation failed".to_string(),
            Some(json!({ "errors": errors })),
        ),
        ServiceError::Unauthenticated { message } => {
            (StatusCode::UNAUTHORIZED, "unauthenticated", message, None)
        }
        ServiceError::PermissionDenied { message } => {
            (StatusCode::FORBIDDEN, "forbidden", message, None)
        }
        ServiceError::NotFound { entity, identifier } => (
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{} '{}' not found", entity, identifier),
            None,
        ),
        ServiceError::AlreadyExists { entity, identifier } => (
            StatusCode::CONFLICT,
            "conflict",
            format!("{} '{}' already exists", entity, identifier),
            None,
        ),
        ServiceError::InvalidOperation { message } => {
            (StatusCode::BAD_REQUEST, "invalid_operation", message, None)
        }
        ServiceError::MethodNotAllowed { method } => (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            format!("Method {} not allowed", method),
            None,
        ),
        ServiceError::RateLimited { retry_after: secs } => {
            retry_after = Some(secs);
            (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests, please try again later".to_string(),
                Some(json!({ "retry_after": secs })),
            )
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {:#}", source);
            internal_detail = Some(format!("Database error: {:#}", source));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                INTERNAL_ERROR_MESSAGE.to_string(),
                None,
            )
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            internal_detail = Some(message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                INTERNAL_ERROR_MESSAGE.to_string(),
                None,
            )
        }
    };

    let mut response = (status, Json(ApiResponse::error(code, message, details))).into_response();
    if let Some(secs) = retry_after {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(secs));
    }
    if let Some(detail) = internal_detail {
        response.extensions_mut().insert(InternalErrorDetail(detail));
    }
    response
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error_response(self)
    }
}

/// Rewrites a 500 envelope to carry the original failure message.
pub fn expose_internal_detail(response: Response) -> Response {
    if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }
    match response.extensions().get::<InternalErrorDetail>() {
        Some(InternalErrorDetail(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("internal_error", detail.clone(), None)),
        )
            .into_response(),
        None => response,
    }
}

/// Apply pagination to a collection
pub fn apply_pagination<T>(items: Vec<T>, page: u32, per_page: u32) -> Vec<T> {
    let offset = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    items
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_pagination_meta_calculation() {
        // Test normal pagination
        let meta = PaginationMeta::new(2, 10, 25);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total_items, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.next_page, Some(3));
        assert_eq!(meta.prev_page, Some(1));

        // Test first page
        let meta = PaginationMeta::new(1, 10, 25);
        assert!(!meta.has_prev);
        assert!(meta.has_next);
        assert_eq!(meta.prev_page, None);
        assert_eq!(meta.next_page, Some(2));

        // Test last page
        let meta = PaginationMeta::new(3, 10, 25);
        assert!(meta.has_prev);
        assert!(!meta.has_next);
        assert_eq!(meta.prev_page, Some(2));
        assert_eq!(meta.next_page, None);

        // Test empty result set
        let meta = PaginationMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_pagination_helper() {
        let items = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        assert_eq!(apply_pagination(items.clone(), 2, 3), vec![4, 5, 6]);
        assert_eq!(apply_pagination(items.clone(), 4, 3), vec![10]);
        assert!(apply_pagination(items, 5, 3).is_empty());
    }

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::ok(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"id": 1}}));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (ServiceError::unauthenticated("x"), StatusCode::UNAUTHORIZED, "unauthenticated"),
            (ServiceError::permission_denied("x"), StatusCode::FORBIDDEN, "forbidden"),
            (ServiceError::validation("x"), StatusCode::BAD_REQUEST, "validation_error"),
            (ServiceError::not_found("Product", "1"), StatusCode::NOT_FOUND, "not_found"),
            (ServiceError::already_exists("Admin", "a"), StatusCode::CONFLICT, "conflict"),
            (ServiceError::method_not_allowed("PATCH"), StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            (ServiceError::rate_limited(30), StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            (ServiceError::internal_error("boom"), StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        ];

        for (error, status, code) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), status);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"]["code"], code);
            assert!(body["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_validation_failure_lists_field_errors() {
        let response = ServiceError::validation_failed(vec![
            FieldError::new("email", "Must be a valid email", "email"),
            FieldError::new("name", "Name is required", "required"),
        ])
        .into_response();
        let body = body_json(response).await;
        let errors = body["error"]["details"]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "email");
        assert_eq!(errors[1]["code"], "required");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ServiceError::rate_limited(42).into_response();
        assert_eq!(response.headers()[RETRY_AFTER], "42");
        let body = body_json(response).await;
        assert_eq!(body["error"]["details"]["retry_after"], 42);
    }

    #[tokio::test]
    async fn test_internal_detail_hidden_unless_exposed() {
        let response = ServiceError::internal_error("disk on fire").into_response();
        let hidden = body_json(response).await;
        assert_eq!(hidden["error"]["message"], INTERNAL_ERROR_MESSAGE);

        let response = expose_internal_detail(ServiceError::internal_error("disk on fire").into_response());
        let shown = body_json(response).await;
        assert_eq!(shown["error"]["message"], "disk on fire");
    }
}
