//! Built-in catalog.
//!
//! Served when the storefront runs without a backend, and used as the
//! fallback when the backend is unreachable.

use vitrine_core::{CategoryId, Price, ProductId};

use super::types::{Category, Product, ProductDetail, ProductFilter, sort_products};
use super::{CatalogError, CatalogSource};

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("1", "Menswear", "https://images.unsplash.com/photo-1441986300917-64674bd600d8?w=600&h=400&fit=crop"),
    ("2", "Womenswear", "https://images.unsplash.com/photo-1490481651871-ab68de25d43d?w=600&h=400&fit=crop"),
    ("3", "Shoes", "https://images.unsplash.com/photo-1549298916-b41d501d3772?w=600&h=400&fit=crop"),
    ("4", "Accessories", "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=600&h=400&fit=crop"),
    ("5", "Bags", "https://images.unsplash.com/photo-1590874103328-eac38a683ce7?w=600&h=400&fit=crop"),
    ("6", "Watches", "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=600&h=400&fit=crop"),
];

/// (id, name, code, price in minor units, image, description, category, stock)
type ProductRow = (
    &'static str,
    &'static str,
    &'static str,
    u64,
    Option<&'static str>,
    Option<&'static str>,
    &'static str,
    u32,
);

const PRODUCTS: &[ProductRow] = &[
    (
        "1",
        "Classic Men's Shirt",
        "M-SHIRT-001",
        8999,
        Some("https://images.unsplash.com/photo-1594938291221-94f313e0a43e?w=600&h=800&fit=crop"),
        Some("An elegant high-quality cotton shirt for daily wear and formal occasions."),
        "1",
        50,
    ),
    (
        "2",
        "Elegant Evening Dress",
        "W-DRESS-001",
        14999,
        Some("https://images.unsplash.com/photo-1595777457583-95e059d581b8?w=600&h=800&fit=crop"),
        Some("A modern dress with a graceful cut, ideal for celebrations."),
        "2",
        30,
    ),
    (
        "3",
        "Men's Jeans",
        "M-JEANS-001",
        11999,
        None,
        None,
        "1",
        32,
    ),
    (
        "4",
        "Linen Summer Shirt",
        "M-SHIRT-002",
        7499,
        Some("https://images.unsplash.com/photo-1596755094514-f87e34085b2c?w=600&h=800&fit=crop"),
        Some("Breathable linen for hot days."),
        "1",
        40,
    ),
    (
        "5",
        "Floral Blouse",
        "W-BLOUSE-001",
        6999,
        Some("https://images.unsplash.com/photo-1564257631407-4deb1f99d992?w=600&h=800&fit=crop"),
        Some("Light blouse with a floral print."),
        "2",
        25,
    ),
    (
        "6",
        "Pleated Midi Skirt",
        "W-SKIRT-001",
        9499,
        None,
        Some("Flowing pleats that pair well with any shirt or blouse."),
        "2",
        18,
    ),
    (
        "11",
        "Casual Sneaker",
        "SHOES-001",
        13999,
        Some("https://images.unsplash.com/photo-1549298916-b41d501d3772?w=600&h=800&fit=crop"),
        Some("Comfortable and stylish, suitable for everyday use."),
        "3",
        22,
    ),
    (
        "12",
        "Gold Chain",
        "NECKLACE-001",
        24999,
        Some("https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=600&h=800&fit=crop"),
        Some("A luxurious chain with a refined design, perfect as a gift."),
        "4",
        18,
    ),
    (
        "13",
        "Oxford Brogues",
        "SHOES-002",
        18999,
        None,
        Some("Hand-finished leather with a classic wingtip."),
        "3",
        12,
    ),
    (
        "14",
        "Weekend Tote",
        "BAG-001",
        12999,
        Some("https://images.unsplash.com/photo-1590874103328-eac38a683ce7?w=600&h=800&fit=crop"),
        Some("Roomy canvas tote with an inner zip pocket."),
        "5",
        15,
    ),
    (
        "15",
        "Chronograph Watch",
        "WATCH-001",
        39999,
        Some("https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=600&h=800&fit=crop"),
        Some("Stainless steel case, water resistant to 50 m."),
        "6",
        8,
    ),
    (
        "16",
        "Silk Scarf",
        "ACC-SCARF-001",
        5499,
        None,
        Some("Hand-rolled edges in pure silk."),
        "4",
        35,
    ),
];

/// The built-in categories.
#[must_use]
pub fn mock_categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|&(id, name, image)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            image_url: Some(image.to_string()),
        })
        .collect()
}

/// The built-in products, in catalog order.
#[must_use]
pub fn mock_products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(
            |&(id, name, code, minor, image, description, category_id, stock)| Product {
                id: ProductId::new(id),
                name: name.to_string(),
                price: Price::from_minor_units(minor),
                image_url: image.map(str::to_string),
                code: Some(code.to_string()),
                category_id: Some(CategoryId::new(category_id)),
                description: description.map(str::to_string),
                stock: Some(stock),
                created_at: None,
            },
        )
        .collect()
}

/// In-memory catalog over a fixed product list.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(mock_categories(), mock_products())
    }
}

impl MockCatalog {
    /// A catalog over the given data (tests use this for larger lists).
    #[must_use]
    pub const fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Synchronous listing used by the async trait methods and the fallback.
    #[must_use]
    pub fn products(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| {
                filter
                    .category_id
                    .as_ref()
                    .is_none_or(|wanted| p.category_id.as_ref() == Some(wanted))
            })
            .cloned()
            .collect();
        sort_products(&mut products, filter.sort);
        products
    }

    /// Synchronous category listing.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    /// Synchronous product lookup.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown ID.
    pub fn product(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        let product = self
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;
        let category_name = product
            .category_id
            .as_ref()
            .and_then(|cid| self.categories.iter().find(|c| &c.id == cid))
            .map(|c| c.name.clone())
            .unwrap_or_default();
        Ok(ProductDetail {
            product,
            category_name,
        })
    }
}

impl CatalogSource for MockCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.categories())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products(filter))
    }

    async fn get_product(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        self.product(id)
    }
}
