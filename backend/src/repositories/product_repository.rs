//! Database repository for the product catalog.
//!
//! Filtering happens in memory over the full listing (see
//! `services::product_filter`), so the repository only offers plain CRUD.

use crate::database::models::{CreateProductRequest, Product, UpdateProductRequest};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price, stock, status, image_url, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Creates a new ProductRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a product.
    ///
    /// # Returns
    /// The stored product, including generated id and timestamps
    pub async fn create_product(&self, product: CreateProductRequest) -> Result<Product> {
        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products
                (id, name, description, category, price, stock, status, image_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(Uuid::now_v7().to_string())
        .bind(product.name)
        .bind(product.description.unwrap_or_default())
        .bind(product.category)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.status)
        .bind(product.image_url)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Retrieves a product by its unique identifier.
    pub async fn get_product_by_id(&self, id: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// All products, newest first.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Applies the present fields of `changes`; absent fields keep their value.
    ///
    /// # Returns
    /// `None` if no product has this id
    pub async fn update_product(
        &self,
        id: &str,
        changes: UpdateProductRequest,
    ) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                category = COALESCE(?, category),
                price = COALESCE(?, price),
                stock = COALESCE(?, stock),
                status = COALESCE(?, status),
                image_url = CASE WHEN ? IS NULL THEN image_url ELSE NULLIF(?, '') END,
                updated_at = ?
             WHERE id = ?
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.category)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.status)
        .bind(changes.image_url.clone())
        .bind(changes.image_url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Deletes a product. Returns `false` when no row matched.
    pub async fn delete_product(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_products(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        Ok(count as u64)
    }
}
