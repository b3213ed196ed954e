//! Degrade to the built-in catalog when the primary source fails.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::instrument;
use vitrine_core::ProductId;

use super::mock::MockCatalog;
use super::types::{Category, Product, ProductDetail, ProductFilter};
use super::{CatalogError, CatalogSource};

/// Wraps a primary source and serves [`MockCatalog`] data when it fails.
///
/// A product the primary reports as missing stays missing; only availability
/// failures fall back.
#[derive(Debug, Clone)]
pub struct FallbackCatalog<P> {
    primary: P,
    fallback: MockCatalog,
    degraded: Arc<AtomicBool>,
}

impl<P> FallbackCatalog<P> {
    #[must_use]
    pub fn new(primary: P) -> Self {
        Self::with_fallback(primary, MockCatalog::default())
    }

    #[must_use]
    pub fn with_fallback(primary: P, fallback: MockCatalog) -> Self {
        Self {
            primary,
            fallback,
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the last request was answered from the fallback.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// The wrapped source.
    #[must_use]
    pub const fn primary(&self) -> &P {
        &self.primary
    }

    fn record<T>(&self, result: &Result<T, CatalogError>, what: &str) {
        match result {
            Ok(_) => self.degraded.store(false, Ordering::Relaxed),
            Err(e) => {
                tracing::error!(error = %e, "Error loading {what}, using fallback catalog");
                self.degraded.store(true, Ordering::Relaxed);
            }
        }
    }
}

impl<P: CatalogSource> CatalogSource for FallbackCatalog<P> {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let result = self.primary.list_categories().await;
        self.record(&result, "categories");
        Ok(result.unwrap_or_else(|_| self.fallback.categories()))
    }

    #[instrument(skip(self))]
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let result = self.primary.list_products(filter).await;
        self.record(&result, "products");
        Ok(result.unwrap_or_else(|_| self.fallback.products(filter)))
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        match self.primary.get_product(id).await {
            Err(CatalogError::NotFound(what)) => {
                self.degraded.store(false, Ordering::Relaxed);
                Err(CatalogError::NotFound(what))
            }
            result => {
                self.record(&result, "product");
                match result {
                    Ok(detail) => Ok(detail),
                    Err(_) => self.fallback.product(id),
                }
            }
        }
    }
}
