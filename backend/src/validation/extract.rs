//! Axum extractors that run a payload through its schema before the handler
//! sees it. Rejections are `ServiceError`s, so they render through the same
//! envelope as every other failure.

use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{RequestSchema, parse};
use crate::errors::ServiceError;

/// JSON body validated against `T`'s schema.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ServiceError::validation(rejection.body_text()))?;

        parse::<T>(&body)
            .map(ValidatedJson)
            .map_err(|result| ServiceError::validation_failed(result.errors))
    }
}

/// Query string validated against `T`'s schema. Every value arrives as a
/// string and is coerced by the schema; blank values count as absent.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|rejection| ServiceError::validation(rejection.body_text()))?;

        // `?search=&page=2` leaves `search` unset.
        let object: Map<String, Value> = params
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        parse::<T>(&Value::Object(object))
            .map(ValidatedQuery)
            .map_err(|result| ServiceError::validation_failed(result.errors))
    }
}
