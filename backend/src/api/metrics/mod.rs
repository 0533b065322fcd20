//! Module for dashboard metrics API endpoints.

pub mod handlers;
pub mod routes;
