//! Core business logic for the authentication system.

use crate::auth::csrf;
use crate::auth::models::{AdminInfo, LoginRequest, LoginResponse};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::admin_repository::AdminRepository;
use crate::utils::jwt::{JwtUtils, Principal};
use sqlx::SqlitePool;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Authentication service for handling login and session lookup
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: &'a JwtUtils,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, jwt_utils: &'a JwtUtils) -> Self {
        AuthService { pool, jwt_utils }
    }

    /// Check credentials and issue a session token.
    ///
    /// An unknown email and a wrong password produce the same error.
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        let repo = AdminRepository::new(self.pool);
        let Some(admin) = repo.get_admin_by_email(&login_request.email).await? else {
            tracing::info!("Login failed: unknown email");
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        };

        if !verify_password(&login_request.password, &admin.password_hash)? {
            tracing::info!("Login failed for admin {}", admin.id);
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        }

        let token = self.jwt_utils.generate_token(&admin)?;
        tracing::info!("Admin {} logged in", admin.id);

        Ok(LoginResponse {
            token,
            csrf_token: csrf::generate_token(),
            user: AdminInfo::from(admin),
            expires_in: self.jwt_utils.expires_in(),
        })
    }

    /// Current admin for a verified principal. A token whose account has
    /// since been deleted no longer resolves.
    pub async fn me(&self, principal: &Principal) -> ServiceResult<AdminInfo> {
        let repo = AdminRepository::new(self.pool);
        let admin = repo
            .get_admin_by_id(&principal.id)
            .await?
            .ok_or_else(|| ServiceError::unauthenticated("Session no longer valid"))?;
        Ok(AdminInfo::from(admin))
    }
}

/// Hash a password before storing it
pub fn hash_password(password: &str, cost: u32) -> ServiceResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
}

/// Verify a password against the stored hash
pub fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| ServiceError::internal_error(format!("Password verification failed: {}", e)))
}
