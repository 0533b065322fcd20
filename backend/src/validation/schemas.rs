//! Coercion and refinement for each recognised request payload.

use super::password::password_errors;
use super::{FieldError, Fields, RequestSchema, SchemaName};
use crate::auth::models::LoginRequest;
use crate::auth::role::Role;
use crate::database::models::{
    CreateAdminRequest, CreateProductRequest, ProductFilter, ProductStatus, UpdateProductRequest,
};

const ROLE_VARIANTS: &str = "admin, super_admin";

impl RequestSchema for LoginRequest {
    const NAME: SchemaName = SchemaName::Login;

    fn coerce(fields: &mut Fields<'_>) -> Self {
        Self {
            email: fields
                .required_string("email", "Email is required")
                .trim()
                .to_string(),
            password: fields.required_string("password", "Password is required"),
        }
    }
}

impl RequestSchema for CreateAdminRequest {
    const NAME: SchemaName = SchemaName::CreateAdmin;

    fn coerce(fields: &mut Fields<'_>) -> Self {
        Self {
            email: fields
                .required_string("email", "Email is required")
                .trim()
                .to_string(),
            password: fields.required_string("password", "Password is required"),
            name: fields
                .required_string("name", "Name is required")
                .trim()
                .to_string(),
            role: fields
                .optional_enum::<Role>("role", ROLE_VARIANTS)
                .unwrap_or(Role::Admin),
        }
    }

    fn refine(&self, errors: &mut Vec<FieldError>) {
        errors.extend(password_errors(&self.password));
    }
}

impl RequestSchema for ProductFilter {
    const NAME: SchemaName = SchemaName::ProductFilters;

    fn coerce(fields: &mut Fields<'_>) -> Self {
        Self {
            search: fields.optional_trimmed("search"),
            category: fields.optional_trimmed("category"),
            status: fields.optional_enum::<ProductStatus>("status", ProductStatus::VARIANTS),
            min_price: fields.optional_number("min_price"),
            max_price: fields.optional_number("max_price"),
            created_from: fields.optional_date("created_from"),
            created_to: fields.optional_date("created_to"),
            page: fields
                .optional_count("page")
                .unwrap_or(ProductFilter::DEFAULT_PAGE),
            limit: fields
                .optional_count("limit")
                .unwrap_or(ProductFilter::DEFAULT_LIMIT),
        }
    }
}

impl RequestSchema for CreateProductRequest {
    const NAME: SchemaName = SchemaName::CreateProduct;

    fn coerce(fields: &mut Fields<'_>) -> Self {
        Self {
            name: fields
                .required_string("name", "Name is required")
                .trim()
                .to_string(),
            description: fields.optional_trimmed("description"),
            category: fields
                .required_string("category", "Category is required")
                .trim()
                .to_string(),
            price: fields.required_number("price", "Price is required"),
            stock: fields.required_integer("stock", "Stock is required"),
            status: fields
                .optional_enum::<ProductStatus>("status", ProductStatus::VARIANTS)
                .unwrap_or_default(),
            image_url: fields
                .optional_trimmed("image_url")
                .filter(|url| !url.is_empty()),
        }
    }
}

impl RequestSchema for UpdateProductRequest {
    const NAME: SchemaName = SchemaName::UpdateProduct;

    fn coerce(fields: &mut Fields<'_>) -> Self {
        Self {
            name: fields.optional_trimmed("name"),
            description: fields.optional_trimmed("description"),
            category: fields.optional_trimmed("category"),
            price: fields.optional_number("price"),
            stock: fields.optional_integer("stock"),
            status: fields.optional_enum::<ProductStatus>("status", ProductStatus::VARIANTS),
            image_url: fields.optional_trimmed("image_url"),
        }
    }

    fn refine(&self, errors: &mut Vec<FieldError>) {
        if self.is_empty() {
            errors.push(FieldError::new(
                "body",
                "At least one field must be provided",
                "empty_update",
            ));
        }
    }
}
