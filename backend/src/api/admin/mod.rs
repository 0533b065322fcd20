//! Module for admin account management API endpoints.
//!
//! Restricted to super admins.

pub mod handlers;
pub mod routes;
