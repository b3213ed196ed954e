//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! No external services are needed: the hosted catalog is exercised against
//! an address with nothing listening, which drives the fallback path.
//!
//! # Test Categories
//!
//! - `cart` - Cart invariants and persistence across restarts
//! - `browse` - Catalog fallback, search caching and stale loads
//! - `window` - Windowed rendering ranges

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use vitrine_core::{CategoryId, Price, ProductId};
use vitrine_storefront::catalog::{FallbackCatalog, Product, RemoteCatalog};
use vitrine_storefront::config::BackendConfig;

/// A product with only the fields search looks at.
#[must_use]
pub fn product(id: &str, name: &str, code: Option<&str>, description: Option<&str>) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::ZERO,
        image_url: None,
        code: code.map(str::to_string),
        category_id: Some(CategoryId::new("1")),
        description: description.map(str::to_string),
        stock: None,
        created_at: None,
    }
}

/// A hosted catalog pointed at a port nothing listens on, wrapped in the
/// built-in fallback.
///
/// # Panics
///
/// Panics if no local port can be reserved or the HTTP client cannot be built.
#[allow(clippy::expect_used)]
pub async fn offline_catalog() -> FallbackCatalog<RemoteCatalog> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve a local port");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);

    let config = BackendConfig {
        url: Url::parse(&format!("http://{addr}")).expect("Failed to build backend URL"),
        anon_key: SecretString::from("integration-test-key"),
        max_retries: 1,
        retry_base_delay: Duration::from_millis(1),
        cache_ttl: Duration::from_secs(60),
    };
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to create HTTP client");
    FallbackCatalog::new(RemoteCatalog::with_client(&config, client))
}
