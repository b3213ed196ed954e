//! Catalog sources.
//!
//! # Architecture
//!
//! - [`CatalogSource`] is the seam between the engine and wherever products
//!   come from
//! - [`MockCatalog`] serves the built-in catalog
//! - [`RemoteCatalog`] queries a hosted REST backend, with retries and an
//!   in-memory read-through cache via `moka`
//! - [`FallbackCatalog`] wraps any source and serves the built-in catalog when
//!   it fails, so browsing degrades instead of breaking
//!
//! Rows are normalized once at this boundary; everything downstream sees
//! only [`Product`] and [`Category`].

mod cache;
mod fallback;
mod mock;
mod remote;
pub mod types;

use std::future::Future;

pub use fallback::FallbackCatalog;
pub use mock::{MockCatalog, mock_categories, mock_products};
pub use remote::RemoteCatalog;
pub use types::*;

use thiserror::Error;
use vitrine_core::ProductId;

use crate::config::StorefrontConfig;

/// Errors that can occur when querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Backend still failing after all retries.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Backend URL could not be built.
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CatalogError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Parse(_) | Self::NotFound(_) | Self::Unavailable(_) | Self::Url(_) => false,
        }
    }
}

/// A source of categories and products.
pub trait CatalogSource: Send + Sync {
    /// All categories, ordered by name where the source supports it.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// Products matching `filter`, in the requested order.
    fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// A single product with its category name.
    fn get_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<ProductDetail, CatalogError>> + Send;
}

/// The catalog selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredCatalog {
    /// Built-in data only.
    Mock(MockCatalog),
    /// Hosted backend with the built-in data as fallback.
    Remote(FallbackCatalog<RemoteCatalog>),
}

impl ConfiguredCatalog {
    /// Build the catalog described by `config`.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        match &config.backend {
            None => Self::Mock(MockCatalog::default()),
            Some(backend) => Self::Remote(FallbackCatalog::new(RemoteCatalog::new(backend))),
        }
    }
}

impl CatalogSource for ConfiguredCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        match self {
            Self::Mock(c) => c.list_categories().await,
            Self::Remote(c) => c.list_categories().await,
        }
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        match self {
            Self::Mock(c) => c.list_products(filter).await,
            Self::Remote(c) => c.list_products(filter).await,
        }
    }

    async fn get_product(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        match self {
            Self::Mock(c) => c.get_product(id).await,
            Self::Remote(c) => c.get_product(id).await,
        }
    }
}
