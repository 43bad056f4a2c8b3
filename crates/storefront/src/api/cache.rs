//! Cache types for catalog responses.

use crate::api::types::{Category, Product};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

/// Key for a single product.
pub fn product_key(id: &str) -> String {
    format!("product:{id}")
}

/// Prefix shared by every product listing key.
pub const PRODUCTS_PREFIX: &str = "products:";

/// Key for a product listing.
pub fn products_key(query: &str) -> String {
    format!("{PRODUCTS_PREFIX}{query}")
}

/// Key for the category list.
pub const CATEGORIES_KEY: &str = "categories";
