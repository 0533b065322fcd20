//! Data structures for authentication-related payloads.

use crate::auth::role::Role;
use crate::database::models::Admin;
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

/// Login request payload
#[derive(Debug, Clone, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response containing the session token and admin info
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub csrf_token: String,
    pub user: AdminInfo,
    pub expires_in: u64, // Token expiration in seconds
}

/// Admin information safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct AdminInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminInfo {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            role: admin.role,
            created_at: admin.created_at,
        }
    }
}
