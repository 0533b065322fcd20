//! Module for product catalog API endpoints.
//!
//! This module handles listing, filtering and editing catalog products.

pub mod handlers;
pub mod routes;
