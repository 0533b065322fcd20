//! Admin account management.
//!
//! Only super admins manage accounts. The route guard already enforces the
//! tier; the service checks again so it stays safe when called directly.

use crate::auth::models::AdminInfo;
use crate::auth::role::Role;
use crate::auth::service::hash_password;
use crate::config::BootstrapAdmin;
use crate::database::models::{CreateAdmin, CreateAdminRequest};
use crate::errors::{ServiceError, ServiceResult, is_unique_violation};
use crate::repositories::admin_repository::AdminRepository;
use crate::utils::jwt::Principal;
use crate::validation::password::validate_password;
use sqlx::SqlitePool;

pub struct AdminService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
    bcrypt_cost: u32,
}

impl<'a> AdminService<'a> {
    /// Creates a new AdminService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    /// * `bcrypt_cost` - Work factor for new password hashes
    pub fn new(pool: &'a SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    fn require_super_admin(principal: &Principal) -> ServiceResult<()> {
        if principal.role.satisfies(Role::SuperAdmin) {
            Ok(())
        } else {
            Err(ServiceError::permission_denied(
                "Only super admins can manage admin accounts",
            ))
        }
    }

    /// Creates an admin account on behalf of `principal`.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - A principal below super admin
    /// - An email that is already registered
    pub async fn create_admin(
        &self,
        principal: &Principal,
        request: CreateAdminRequest,
    ) -> ServiceResult<AdminInfo> {
        Self::require_super_admin(principal)?;

        let repo = AdminRepository::new(self.pool);
        if repo.email_exists(&request.email).await? {
            return Err(ServiceError::already_exists("Admin", &request.email));
        }

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;
        // A concurrent create can still win between the check and the insert.
        let admin = repo
            .create_admin(CreateAdmin {
                email: request.email.clone(),
                name: request.name,
                password_hash,
                role: request.role,
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::already_exists("Admin", &request.email)
                } else {
                    ServiceError::from(e)
                }
            })?;

        tracing::info!(
            "Admin {} created {} admin {}",
            principal.id,
            admin.role,
            admin.id
        );
        Ok(AdminInfo::from(admin))
    }

    pub async fn list_admins(&self, principal: &Principal) -> ServiceResult<Vec<AdminInfo>> {
        Self::require_super_admin(principal)?;

        let repo = AdminRepository::new(self.pool);
        let admins = repo.list_admins().await?;
        Ok(admins.into_iter().map(AdminInfo::from).collect())
    }

    /// Deletes an admin account. Super admins cannot delete themselves.
    pub async fn delete_admin(&self, principal: &Principal, id: &str) -> ServiceResult<()> {
        Self::require_super_admin(principal)?;

        if principal.id == id {
            return Err(ServiceError::invalid_operation(
                "You cannot delete your own account",
            ));
        }

        let repo = AdminRepository::new(self.pool);
        if !repo.delete_admin(id).await? {
            return Err(ServiceError::not_found("Admin", id));
        }

        tracing::info!("Admin {} deleted admin {}", principal.id, id);
        Ok(())
    }

    /// Creates the configured super admin when no admin exists yet.
    ///
    /// # Returns
    /// `true` if an account was created
    pub async fn bootstrap_super_admin(&self, bootstrap: &BootstrapAdmin) -> ServiceResult<bool> {
        let repo = AdminRepository::new(self.pool);
        if repo.count_admins().await? > 0 {
            return Ok(false);
        }

        let strength = validate_password(&bootstrap.password);
        if !strength.is_valid {
            return Err(ServiceError::validation_failed(strength.errors));
        }

        let password_hash = hash_password(&bootstrap.password, self.bcrypt_cost)?;
        let admin = repo
            .create_admin(CreateAdmin {
                email: bootstrap.email.clone(),
                name: bootstrap.name.clone(),
                password_hash,
                role: Role::SuperAdmin,
            })
            .await?;

        tracing::info!("Bootstrapped super admin {}", admin.email);
        Ok(true)
    }
}
