//! Cookie header helpers for the session and CSRF cookies.

use anyhow::{Result, anyhow};
use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
use std::time::Duration;
use tracing::debug;

/// Extract cookie value by name
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

/// Build a `Set-Cookie` value scoped to `/` with `SameSite=Strict`.
pub fn set_cookie(
    name: &str,
    value: &str,
    max_age: Option<Duration>,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/", name, value);

    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", age.as_secs()));
    }

    if http_only {
        cookie.push_str("; HttpOnly");
    }

    if secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str("; SameSite=Strict");

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|e| anyhow!("Invalid cookie value: {}", e))
}

/// Expire a cookie immediately
pub fn delete_cookie(name: &str, http_only: bool) -> Result<HeaderValue> {
    set_cookie(name, "", Some(Duration::ZERO), http_only, false)
}

/// Percent-encode everything outside the URL unreserved set, keeping `/`
/// so paths stay readable.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
