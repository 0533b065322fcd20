//! Authentication and access control.
//!
//! This module provides login and session lookup, the role gate, CSRF
//! protection, and the request guard that applies per-route policies.

pub mod csrf;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod role;
pub mod routes;
pub mod service;
