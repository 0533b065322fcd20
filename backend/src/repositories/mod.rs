//! Persistence layer, one repository per table.

pub mod admin_repository;
pub mod product_repository;
