//! In-memory product filtering.
//!
//! Every present criterion must hold (AND); absent criteria match
//! everything. The relative order of the input is preserved.

use crate::database::models::{Product, ProductFilter};

/// Returns the products matching `criteria`, in input order.
pub fn filter_products(products: Vec<Product>, criteria: &ProductFilter) -> Vec<Product> {
    let needle = criteria
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    products
        .into_iter()
        .filter(|product| matches(product, criteria, needle.as_deref()))
        .collect()
}

fn matches(product: &Product, criteria: &ProductFilter, needle: Option<&str>) -> bool {
    if let Some(needle) = needle {
        let in_name = product.name.to_lowercase().contains(needle);
        if !in_name && !product.description.to_lowercase().contains(needle) {
            return false;
        }
    }

    if let Some(category) = criteria.category.as_deref() {
        if product.category != category {
            return false;
        }
    }

    if criteria.status.is_some_and(|status| product.status != status) {
        return false;
    }

    if criteria.min_price.is_some_and(|min| product.price < min) {
        return false;
    }
    if criteria.max_price.is_some_and(|max| product.price > max) {
        return false;
    }

    if criteria
        .created_from
        .is_some_and(|from| product.created_at < from)
    {
        return false;
    }
    if criteria.created_to.is_some_and(|to| product.created_at > to) {
        return false;
    }

    true
}
