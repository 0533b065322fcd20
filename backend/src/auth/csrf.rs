//! Double-submit CSRF protection for cookie-authenticated requests.
//!
//! Login issues a random token in a readable `csrf_token` cookie. Requests
//! that authenticate with the session cookie and use an unsafe method must
//! echo that token in the `x-csrf-token` header.

use axum::http::{HeaderMap, Method};
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::utils::cookies::get_cookie;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn requires_check(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Compares the header token with the cookie token in constant time.
pub fn verify(headers: &HeaderMap) -> bool {
    let Some(cookie) = get_cookie(headers, CSRF_COOKIE) else {
        return false;
    };
    let Some(header) = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return false;
    };

    header.as_bytes().ct_eq(cookie.as_bytes()).into()
}
