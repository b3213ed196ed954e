//! Hosted catalog backend client.
//!
//! Talks to a PostgREST-style REST API (`/rest/v1/{table}`) with `reqwest`.
//! Listings and product lookups are cached with `moka` for the configured
//! TTL. Transient failures are retried with exponential backoff before the
//! request is reported as unavailable.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;
use vitrine_core::{ProductId, SortOrder};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    Category, Product, ProductDetail, ProductFilter, RawCategory, RawProduct,
    normalize_categories, normalize_products,
};
use super::{CatalogError, CatalogSource};
use crate::config::BackendConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const CACHE_CAPACITY: u64 = 1000;

/// Client for the hosted catalog backend.
///
/// Cheap to clone; clones share the HTTP client and the response cache.
#[derive(Clone)]
pub struct RemoteCatalog {
    inner: Arc<RemoteCatalogInner>,
}

struct RemoteCatalogInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    max_retries: u32,
    retry_base_delay: Duration,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for RemoteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCatalog")
            .field("base_url", &self.inner.base_url.as_str())
            .field("max_retries", &self.inner.max_retries)
            .finish_non_exhaustive()
    }
}

impl RemoteCatalog {
    /// Create a client for the configured backend.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a client using a preconfigured `reqwest::Client`.
    #[must_use]
    pub fn with_client(config: &BackendConfig, client: reqwest::Client) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(RemoteCatalogInner {
                client,
                base_url: config.url.clone(),
                anon_key: config.anon_key().to_string(),
                max_retries: config.max_retries,
                retry_base_delay: config.retry_base_delay,
                cache,
            }),
        }
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.join(&format!("rest/v1/{table}"))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    /// GET `url` and decode the JSON body, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CatalogError> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    if attempt >= self.inner.max_retries {
                        tracing::error!(error = %e, attempts = attempt + 1, "Catalog backend unavailable");
                        return Err(CatalogError::Unavailable(format!(
                            "{e} (after {} attempts)",
                            attempt + 1
                        )));
                    }
                    let delay = backoff_delay(self.inner.retry_base_delay, attempt, &e);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        delay = ?delay,
                        "Transient catalog failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog backend returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

/// `order` clause for a sort.
const fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::PriceLow => "price.asc",
        SortOrder::PriceHigh => "price.desc",
        SortOrder::Name => "name.asc",
        SortOrder::Newest => "created_at.desc",
    }
}

/// Query parameters for a product listing.
fn products_query(filter: &ProductFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];
    if let Some(category_id) = &filter.category_id {
        params.push(("category_id", format!("eq.{category_id}")));
    }
    params.push(("order", order_clause(filter.sort).to_string()));
    params
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`, at least the
/// server's `Retry-After`, capped at [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32, error: &CatalogError) -> Duration {
    let exponential = base.saturating_mul(1_u32 << attempt.min(16));
    let delay = match error {
        CatalogError::RateLimited(secs) => exponential.max(Duration::from_secs(*secs)),
        _ => exponential,
    };
    delay.min(MAX_BACKOFF)
}

impl CatalogSource for RemoteCatalog {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            tracing::debug!("Cache hit for categories");
            return Ok(categories.as_ref().clone());
        }

        let url = self.table_url(
            "categories",
            &[("select", "*".to_string()), ("order", "name.asc".to_string())],
        )?;
        let rows: Vec<RawCategory> = self.get_json(&url).await?;
        let categories = normalize_categories(rows);

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::new(categories.clone())),
            )
            .await;
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Products {
            category_id: filter.category_id.clone(),
            sort: filter.sort,
        };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            tracing::debug!("Cache hit for product listing");
            return Ok(products.as_ref().clone());
        }

        let url = self.table_url("products", &products_query(filter))?;
        let rows: Vec<RawProduct> = self.get_json(&url).await?;
        let products = normalize_products(rows);

        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::new(products.clone())))
            .await;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(detail)) = self.inner.cache.get(&key).await {
            tracing::debug!("Cache hit for product");
            return Ok(*detail);
        }

        let url = self.table_url(
            "products",
            &[
                ("select", "*,categories(name)".to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ],
        )?;
        let rows: Vec<RawProduct> = self.get_json(&url).await?;
        let detail = rows
            .into_iter()
            .next()
            .and_then(RawProduct::normalize_detail)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(detail.clone())))
            .await;
        Ok(detail)
    }
}
