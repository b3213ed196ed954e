//! Domain types for the catalog.
//!
//! Backend rows are loosely typed: IDs may be numbers or strings, the image
//! may live under `image_url` or `image`, and prices may be strings. The
//! `Raw*` types accept all of that and are normalized exactly once, here, into
//! the canonical [`Product`] and [`Category`] shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_core::{CategoryId, Price, ProductId, SortOrder};

// =============================================================================
// Canonical Types
// =============================================================================

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
    /// Merchant SKU-style code (e.g., "M-SHIRT-001").
    pub code: Option<String>,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub stock: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image_url: Option<String>,
}

/// A product together with its resolved category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    /// Empty when the category is unknown.
    pub category_name: String,
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub sort: SortOrder,
}

impl ProductFilter {
    #[must_use]
    pub fn with_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }
}

/// Sort products in place.
///
/// `Newest` orders by creation time (newest first, undated last) and keeps
/// source order among ties.
pub fn sort_products(products: &mut [Product], sort: SortOrder) {
    match sort {
        SortOrder::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOrder::Name => products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortOrder::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// A product row as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category_id: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Embedded category from a `categories(name)` join.
    #[serde(default)]
    pub categories: Option<RawCategoryRef>,
}

/// Embedded category reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategoryRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// A category row as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Render a JSON scalar ID as a string.
fn id_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawProduct {
    /// Normalize into a [`Product`]. Rows without an ID are rejected.
    #[must_use]
    pub fn normalize(self) -> Option<Product> {
        let id = id_string(self.id.as_ref())?;
        Some(Product {
            id: ProductId::new(id),
            name: self.name.unwrap_or_default(),
            price: Price::coerce(self.price.as_ref()),
            image_url: non_empty(self.image_url).or_else(|| non_empty(self.image)),
            code: non_empty(self.code),
            category_id: id_string(self.category_id.as_ref()).map(CategoryId::new),
            description: non_empty(self.description),
            stock: self.stock.and_then(|s| u32::try_from(s).ok()),
            created_at: self.created_at,
        })
    }

    /// Normalize into a [`ProductDetail`] using the embedded category name.
    #[must_use]
    pub fn normalize_detail(mut self) -> Option<ProductDetail> {
        let category_name = self
            .categories
            .take()
            .and_then(|c| c.name)
            .unwrap_or_default();
        self.normalize().map(|product| ProductDetail {
            product,
            category_name,
        })
    }
}

impl RawCategory {
    /// Normalize into a [`Category`]. Rows without an ID are rejected.
    #[must_use]
    pub fn normalize(self) -> Option<Category> {
        let id = id_string(self.id.as_ref())?;
        Some(Category {
            id: CategoryId::new(id),
            name: self.name.unwrap_or_default(),
            image_url: non_empty(self.image_url),
        })
    }
}

/// Normalize a batch of product rows, logging and skipping unusable ones.
pub fn normalize_products(rows: Vec<RawProduct>) -> Vec<Product> {
    let total = rows.len();
    let products: Vec<Product> = rows.into_iter().filter_map(RawProduct::normalize).collect();
    if products.len() < total {
        tracing::warn!(
            skipped = total - products.len(),
            "Skipped product rows without an id"
        );
    }
    products
}

/// Normalize a batch of category rows, skipping unusable ones.
pub fn normalize_categories(rows: Vec<RawCategory>) -> Vec<Category> {
    rows.into_iter().filter_map(RawCategory::normalize).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn raw(json: &str) -> RawProduct {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_accepts_image_fallback_and_numeric_ids() {
        let product = raw(r#"{"id": 12, "name": "Gold chain", "price": "249.99",
                              "image": "chain.jpg", "category_id": 4}"#)
        .normalize()
        .unwrap();
        assert_eq!(product.id.as_str(), "12");
        assert_eq!(product.price.amount(), Decimal::new(24999, 2));
        assert_eq!(product.image_url.as_deref(), Some("chain.jpg"));
        assert_eq!(product.category_id.unwrap().as_str(), "4");
    }

    #[test]
    fn test_normalize_prefers_image_url() {
        let product = raw(r#"{"id":"1","image_url":"a.jpg","image":"b.jpg"}"#)
            .normalize()
            .unwrap();
        assert_eq!(product.image_url.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_normalize_rejects_missing_id() {
        assert!(raw(r#"{"name":"No id"}"#).normalize().is_none());
        assert!(raw(r#"{"id":"  "}"#).normalize().is_none());
    }

    #[test]
    fn test_normalize_defaults() {
        let product = raw(r#"{"id":"5","price":null,"stock":-2,"code":""}"#)
            .normalize()
            .unwrap();
        assert_eq!(product.price, Price::ZERO);
        assert_eq!(product.stock, None);
        assert_eq!(product.code, None);
        assert_eq!(product.name, "");
    }

    #[test]
    fn test_normalize_detail_reads_join() {
        let detail = raw(r#"{"id":"1","name":"Shirt","categories":{"name":"Menswear"}}"#)
            .normalize_detail()
            .unwrap();
        assert_eq!(detail.category_name, "Menswear");

        let detail = raw(r#"{"id":"1"}"#).normalize_detail().unwrap();
        assert_eq!(detail.category_name, "");
    }

    #[test]
    fn test_normalize_products_skips_bad_rows() {
        let rows = vec![raw(r#"{"id":"1"}"#), raw(r#"{"name":"x"}"#)];
        assert_eq!(normalize_products(rows).len(), 1);
    }

    #[test]
    fn test_sort_products() {
        let mut products = vec![
            raw(r#"{"id":"a","name":"beta","price":20,"created_at":"2025-01-01T00:00:00Z"}"#)
                .normalize()
                .unwrap(),
            raw(r#"{"id":"b","name":"Alpha","price":5,"created_at":"2025-03-01T00:00:00Z"}"#)
                .normalize()
                .unwrap(),
            raw(r#"{"id":"c","name":"gamma","price":10}"#).normalize().unwrap(),
        ];

        sort_products(&mut products, SortOrder::PriceLow);
        assert_eq!(products[0].id.as_str(), "b");
        sort_products(&mut products, SortOrder::PriceHigh);
        assert_eq!(products[0].id.as_str(), "a");
        sort_products(&mut products, SortOrder::Name);
        assert_eq!(products[0].name, "Alpha");
        sort_products(&mut products, SortOrder::Newest);
        let order: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
    }
}
