//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database, together with the request payloads that create or
//! change them. Request payloads are validated through `crate::validation`.

use crate::auth::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateUrl, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Admin {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to insert into `admins`. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateAdmin {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Validate)]
pub struct CreateAdminRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    // Strength rules are applied separately so every violation is reported.
    pub password: String,

    #[validate(length(
        min = 2,
        max = 100,
        message = "Name must be between 2-100 characters"
    ))]
    pub name: String,

    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub status: ProductStatus,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    #[default]
    Draft,
    Archived,
}

impl ProductStatus {
    pub const VARIANTS: &'static str = "active, draft, archived";
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "draft" => Ok(ProductStatus::Draft),
            "archived" => Ok(ProductStatus::Archived),
            _ => Err(format!("Invalid product status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be between 1-50 characters"))]
    pub category: String,

    #[validate(range(min = 0.0, max = 1_000_000.0, message = "Price must be between 0 and 1000000"))]
    pub price: f64,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,

    pub status: ProductStatus,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be between 1-50 characters"))]
    pub category: Option<String>,

    #[validate(range(min = 0.0, max = 1_000_000.0, message = "Price must be between 0 and 1000000"))]
    pub price: Option<f64>,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,

    pub status: Option<ProductStatus>,

    /// An empty string removes the image.
    #[validate(custom(function = "url_or_empty"))]
    pub image_url: Option<String>,
}

fn url_or_empty(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || url.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Image URL must be a valid URL".into()))
    }
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.status.is_none()
            && self.image_url.is_none()
    }
}

/// Product list criteria, rebuilt from the query string on every request.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProductFilter {
    #[validate(length(max = 100, message = "Search must be at most 100 characters"))]
    pub search: Option<String>,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,

    pub status: Option<ProductStatus>,

    #[validate(range(min = 0.0, message = "Minimum price cannot be negative"))]
    pub min_price: Option<f64>,

    #[validate(range(min = 0.0, message = "Maximum price cannot be negative"))]
    pub max_price: Option<f64>,

    /// Created at or after (inclusive)
    pub created_from: Option<DateTime<Utc>>,

    /// Created at or before (inclusive)
    pub created_to: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1-100"))]
    pub limit: u32,
}

impl ProductFilter {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Calculate offset for the current page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            status: None,
            min_price: None,
            max_price: None,
            created_from: None,
            created_to: None,
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Stock figures for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub products: u64,
    pub stock_units: i64,
    pub inventory_value: f64,
}

/// Inventory overview shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryMetrics {
    pub total_products: u64,
    pub active_products: u64,
    pub draft_products: u64,
    pub archived_products: u64,
    pub total_stock_units: i64,
    pub low_stock_products: u64,
    pub out_of_stock_products: u64,
    pub inventory_value: f64,
    pub low_stock_threshold: i64,
    pub categories: Vec<CategoryBreakdown>,
}
