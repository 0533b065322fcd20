//! Request guard that composes the per-route protections.
//!
//! Each route is wrapped with a [`RoutePolicy`]. Stages run in a fixed order
//! and the first failure short-circuits with its error envelope:
//!
//! 1. method allow-list
//! 2. rate limit, keyed by client address
//! 3. authentication from a bearer token or the `auth_token` cookie
//! 4. role gate
//! 5. CSRF check for cookie-authenticated unsafe methods
//!
//! Body and query validation happen afterwards in the handler's extractors.
//! Browser navigations (`Accept: text/html`) get redirects instead of JSON
//! when authentication or the role gate fails.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::common::expose_internal_detail;
use crate::auth::csrf;
use crate::auth::role::Role;
use crate::errors::ServiceError;
use crate::state::AppState;
use crate::utils::cookies::{get_cookie, percent_encode};
use crate::utils::jwt::Principal;
use crate::utils::rate_limiter::{RateDecision, RateLimitPreset, client_key};

pub const AUTH_COOKIE: &str = "auth_token";
pub const LOGIN_PATH: &str = "/login";

/// What a route requires before its handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    pub rate_limit: Option<RateLimitPreset>,
    pub authenticate: bool,
    pub required_role: Option<Role>,
    /// Allowed methods; empty allows any.
    pub methods: Vec<Method>,
}

impl RoutePolicy {
    /// General rate limit only.
    pub fn public() -> Self {
        Self {
            rate_limit: Some(RateLimitPreset::Api),
            authenticate: false,
            required_role: None,
            methods: Vec::new(),
        }
    }

    /// Credential-accepting endpoint with the stricter limit.
    pub fn auth_endpoint() -> Self {
        Self {
            rate_limit: Some(RateLimitPreset::Auth),
            ..Self::public()
        }
    }

    /// Any valid session.
    pub fn authenticated() -> Self {
        Self {
            authenticate: true,
            ..Self::public()
        }
    }

    /// A valid session whose role satisfies `role`.
    pub fn role(role: Role) -> Self {
        Self {
            required_role: Some(role),
            ..Self::authenticated()
        }
    }

    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    pub fn allows_method(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

/// State handed to [`enforce_policy`].
#[derive(Clone)]
pub struct PolicyGuard {
    state: AppState,
    policy: Arc<RoutePolicy>,
}

impl PolicyGuard {
    pub fn new(state: AppState, policy: RoutePolicy) -> Self {
        Self {
            state,
            policy: Arc::new(policy),
        }
    }
}

enum Credential {
    Bearer(String),
    Cookie(String),
}

pub async fn enforce_policy(
    State(guard): State<PolicyGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(&guard, &mut request) {
        Ok(()) => {
            let response = next.run(request).await;
            if guard.state.config.is_development() {
                expose_internal_detail(response)
            } else {
                response
            }
        }
        Err(rejection) => rejection,
    }
}

fn authorize(guard: &PolicyGuard, request: &mut Request) -> Result<(), Response> {
    let policy = &guard.policy;
    let method = request.method().clone();

    if !policy.allows_method(&method) {
        let mut response = ServiceError::method_not_allowed(method.as_str()).into_response();
        let allow = policy
            .methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(header::ALLOW, value);
        }
        return Err(response);
    }

    if let Some(preset) = policy.rate_limit {
        let key = client_key(request.headers());
        if let RateDecision::Limited { retry_after_secs } =
            guard.state.rate_limiter.check_preset(&key, preset)
        {
            warn!("Rate limit exceeded for {} on {}", key, request.uri().path());
            return Err(ServiceError::rate_limited(retry_after_secs).into_response());
        }
    }

    if !policy.authenticate {
        return Ok(());
    }

    let browser = wants_html(request.headers());

    let Some(credential) = credential(request.headers()) else {
        return Err(unauthenticated(request, browser, "Authentication required"));
    };

    let (token, from_cookie) = match &credential {
        Credential::Bearer(token) => (token.as_str(), false),
        Credential::Cookie(token) => (token.as_str(), true),
    };

    let Some(principal) = guard.state.jwt.verify(token) else {
        return Err(unauthenticated(request, browser, "Invalid or expired token"));
    };

    if let Some(required) = policy.required_role {
        if !principal.role.satisfies(required) {
            debug!(
                "Admin {} with role {} denied access requiring {}",
                principal.id, principal.role, required
            );
            if browser {
                return Err(Redirect::to("/").into_response());
            }
            return Err(
                ServiceError::permission_denied("Insufficient permissions").into_response(),
            );
        }
    }

    if from_cookie && csrf::requires_check(&method) && !csrf::verify(request.headers()) {
        warn!("CSRF check failed for admin {}", principal.id);
        return Err(ServiceError::permission_denied("Invalid CSRF token").into_response());
    }

    request.extensions_mut().insert::<Principal>(principal);
    Ok(())
}

/// Bearer header first, then the session cookie.
fn credential(headers: &HeaderMap) -> Option<Credential> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(Credential::Bearer(token.to_string()));
    }

    get_cookie(headers, AUTH_COOKIE).map(Credential::Cookie)
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn unauthenticated(request: &Request, browser: bool, message: &str) -> Response {
    if browser {
        // Nested routers see a stripped path; redirect back to the full one.
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(request.uri());
        let original = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let location = format!("{}?redirect={}", LOGIN_PATH, percent_encode(original));
        return Redirect::to(&location).into_response();
    }
    ServiceError::unauthenticated(message).into_response()
}
