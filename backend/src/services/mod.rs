//! Module for core business logic services.
//!
//! Services validate business rules and orchestrate repositories; the pure
//! product filter and inventory aggregation live here as well.

pub mod admin_service;
pub mod metrics_service;
pub mod product_filter;
pub mod product_service;
