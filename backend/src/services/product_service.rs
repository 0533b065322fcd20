//! Product catalog business logic.

use crate::api::common::{PaginationMeta, apply_pagination};
use crate::database::models::{
    CreateProductRequest, Product, ProductFilter, UpdateProductRequest,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::product_repository::ProductRepository;
use crate::services::product_filter::filter_products;
use sqlx::SqlitePool;

pub struct ProductService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> ProductService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// One page of the products matching `filter`, newest first.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> ServiceResult<(Vec<Product>, PaginationMeta)> {
        let repo = ProductRepository::new(self.pool);
        let products = repo.list_products().await?;
        let matching = filter_products(products, filter);

        let pagination = PaginationMeta::new(filter.page, filter.limit, matching.len() as u64);
        let page = apply_pagination(matching, filter.page, filter.limit);
        Ok((page, pagination))
    }

    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        let repo = ProductRepository::new(self.pool);
        repo.get_product_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    pub async fn create_product(&self, request: CreateProductRequest) -> ServiceResult<Product> {
        let repo = ProductRepository::new(self.pool);
        let product = repo.create_product(request).await?;
        tracing::info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &str,
        changes: UpdateProductRequest,
    ) -> ServiceResult<Product> {
        if changes.is_empty() {
            return Err(ServiceError::validation("At least one field must be provided"));
        }

        let repo = ProductRepository::new(self.pool);
        let product = repo
            .update_product(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        tracing::info!("Updated product {}", product.id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        let repo = ProductRepository::new(self.pool);
        if !repo.delete_product(id).await? {
            return Err(ServiceError::not_found("Product", id));
        }
        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}
