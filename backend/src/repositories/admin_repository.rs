//! Database repository for admin account operations.
//!
//! Provides create, lookup, listing and deletion of dashboard admins.

use crate::database::models::{Admin, CreateAdmin};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const ADMIN_COLUMNS: &str = "id, email, name, password_hash, role, created_at, updated_at";

/// Repository for admin database operations.
pub struct AdminRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> AdminRepository<'a> {
    /// Creates a new AdminRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new admin. Emails are stored lower-cased.
    ///
    /// # Returns
    /// The newly created Admin with all fields populated
    pub async fn create_admin(&self, admin: CreateAdmin) -> Result<Admin> {
        let now = Utc::now();
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (id, email, name, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(Uuid::now_v7().to_string())
        .bind(admin.email.to_lowercase())
        .bind(admin.name)
        .bind(admin.password_hash)
        .bind(admin.role)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(admin)
    }

    /// Retrieves an admin by their unique identifier.
    pub async fn get_admin_by_id(&self, id: &str) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(admin)
    }

    /// Retrieves an admin by email, case-insensitively.
    pub async fn get_admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = ?"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Lists admins, oldest first.
    pub async fn list_admins(&self) -> Result<Vec<Admin>> {
        let admins = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(admins)
    }

    pub async fn count_admins(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(self.pool)
            .await?;

        Ok(count as u64)
    }

    /// Deletes an admin. Returns `false` when no row matched.
    pub async fn delete_admin(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
