//! Product search with a bounded result cache.
//!
//! Matching is a case-insensitive substring test against the product name,
//! code and description (any one field is enough). Results are memoized per
//! normalized query so repeated input does not rescan the product list.
//!
//! The cache is FIFO: once it holds `capacity` queries, the query stored
//! first is evicted first. Lookups do not refresh an entry's position.
//!
//! Replacing the product list does not clear the cache. Call
//! [`SearchIndex::invalidate`] after a catalog refresh if stale results
//! matter.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::catalog::Product;

/// Default number of cached queries.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Trim and case-fold a raw query.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `product` matches an already-normalized query.
#[must_use]
pub fn matches(product: &Product, query: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(query);
    hit(&product.name)
        || product.code.as_deref().is_some_and(hit)
        || product.description.as_deref().is_some_and(hit)
}

/// Linear scan for products matching an already-normalized query.
#[must_use]
pub fn filter_products(products: &[Product], query: &str) -> Vec<Product> {
    products
        .iter()
        .filter(|p| matches(p, query))
        .cloned()
        .collect()
}

// =============================================================================
// SearchCache
// =============================================================================

/// Bounded map from normalized query to shared results.
#[derive(Debug, Clone)]
pub struct SearchCache {
    capacity: usize,
    entries: HashMap<String, Arc<[Product]>>,
    order: VecDeque<String>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SearchCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Cached results for a normalized query. The empty query is never cached.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<Arc<[Product]>> {
        if query.is_empty() {
            return None;
        }
        self.entries.get(query).cloned()
    }

    /// Cache results for a normalized query, evicting the oldest entries
    /// beyond capacity. Storing an existing query replaces its results but
    /// keeps its place in the eviction order.
    pub fn store(&mut self, query: &str, results: Arc<[Product]>) {
        if query.is_empty() || self.capacity == 0 {
            return;
        }
        if self.entries.insert(query.to_string(), results).is_none() {
            self.order.push_back(query.to_string());
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                tracing::trace!(query = %oldest, "Evicted cached search");
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

// =============================================================================
// SearchIndex
// =============================================================================

/// Signature of the routine run on a cache miss.
pub type FilterFn = fn(&[Product], &str) -> Vec<Product>;

/// Product list plus cached searches over it.
pub struct SearchIndex<F = FilterFn> {
    products: Arc<[Product]>,
    cache: SearchCache,
    filter: F,
}

impl<F> std::fmt::Debug for SearchIndex<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("products", &self.products.len())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Index over `products` using [`filter_products`].
    #[must_use]
    pub fn new(products: Vec<Product>, capacity: usize) -> Self {
        Self::with_filter(products, capacity, filter_products)
    }
}

impl<F> SearchIndex<F>
where
    F: Fn(&[Product], &str) -> Vec<Product>,
{
    /// Index using a custom filter routine.
    pub fn with_filter(products: Vec<Product>, capacity: usize, filter: F) -> Self {
        Self {
            products: products.into(),
            cache: SearchCache::new(capacity),
            filter,
        }
    }

    /// Results for a raw query.
    ///
    /// A blank query returns the full product list. Repeated queries return
    /// the same shared slice without running the filter again.
    pub fn search(&mut self, raw: &str) -> Arc<[Product]> {
        let query = normalize_query(raw);
        if query.is_empty() {
            return Arc::clone(&self.products);
        }
        if let Some(hit) = self.cache.lookup(&query) {
            tracing::trace!(query = %query, "Search cache hit");
            return hit;
        }

        let results: Arc<[Product]> = (self.filter)(&self.products, &query).into();
        tracing::debug!(query = %query, results = results.len(), "Search computed");
        self.cache.store(&query, Arc::clone(&results));
        results
    }

    /// The full product list.
    #[must_use]
    pub fn products(&self) -> &Arc<[Product]> {
        &self.products
    }

    /// Swap in a new product list. Cached searches are kept.
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products.into();
    }

    /// Drop every cached search.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub const fn cache(&self) -> &SearchCache {
        &self.cache
    }
}
