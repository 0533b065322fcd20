//! Collection of general utility modules.
//!
//! Session tokens, the request rate limiter and cookie helpers.

pub mod cookies;
pub mod jwt;
pub mod rate_limiter;
