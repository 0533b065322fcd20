//! Inventory metrics for the dashboard overview.

use std::collections::BTreeMap;

use crate::database::models::{CategoryBreakdown, InventoryMetrics, Product, ProductStatus};
use crate::errors::ServiceResult;
use crate::repositories::product_repository::ProductRepository;
use sqlx::SqlitePool;

pub struct MetricsService<'a> {
    pool: &'a SqlitePool,
    low_stock_threshold: i64,
}

impl<'a> MetricsService<'a> {
    pub fn new(pool: &'a SqlitePool, low_stock_threshold: i64) -> Self {
        Self {
            pool,
            low_stock_threshold,
        }
    }

    pub async fn inventory(&self) -> ServiceResult<InventoryMetrics> {
        let products = ProductRepository::new(self.pool).list_products().await?;
        Ok(summarize_inventory(&products, self.low_stock_threshold))
    }
}

/// Aggregates stock figures. A product is low on stock when it has between
/// one and `low_stock_threshold` units; zero units counts as out of stock.
pub fn summarize_inventory(products: &[Product], low_stock_threshold: i64) -> InventoryMetrics {
    let mut metrics = InventoryMetrics {
        total_products: products.len() as u64,
        active_products: 0,
        draft_products: 0,
        archived_products: 0,
        total_stock_units: 0,
        low_stock_products: 0,
        out_of_stock_products: 0,
        inventory_value: 0.0,
        low_stock_threshold,
        categories: Vec::new(),
    };
    let mut categories: BTreeMap<&str, CategoryBreakdown> = BTreeMap::new();

    for product in products {
        match product.status {
            ProductStatus::Active => metrics.active_products += 1,
            ProductStatus::Draft => metrics.draft_products += 1,
            ProductStatus::Archived => metrics.archived_products += 1,
        }

        if product.stock == 0 {
            metrics.out_of_stock_products += 1;
        } else if product.stock <= low_stock_threshold {
            metrics.low_stock_products += 1;
        }

        let value = product.price * product.stock as f64;
        metrics.total_stock_units += product.stock;
        metrics.inventory_value += value;

        let entry = categories
            .entry(product.category.as_str())
            .or_insert_with(|| CategoryBreakdown {
                category: product.category.clone(),
                products: 0,
                stock_units: 0,
                inventory_value: 0.0,
            });
        entry.products += 1;
        entry.stock_units += product.stock;
        entry.inventory_value += value;
    }

    metrics.categories = categories.into_values().collect();
    metrics
}
