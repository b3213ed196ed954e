//! Cache types for backend responses.

use std::sync::Arc;

use vitrine_core::{CategoryId, ProductId, SortOrder};

use super::types::{Category, Product, ProductDetail};

/// Cache key for catalog requests.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Products {
        category_id: Option<CategoryId>,
        sort: SortOrder,
    },
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<Category>>),
    Products(Arc<Vec<Product>>),
    Product(Box<ProductDetail>),
}
