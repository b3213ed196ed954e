//! Browsing state: category, sort order, loaded products and search.
//!
//! Each product load takes a [`LoadTicket`]. Only the most recently issued
//! ticket may apply its results, so a slow response for an old filter never
//! overwrites a newer one.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;
use vitrine_core::{CategoryId, ProductId, SortOrder};

use crate::catalog::{CatalogError, CatalogSource, Category, Product, ProductDetail, ProductFilter};
use crate::config::{SearchConfig, StorefrontConfig};
use crate::notify::{Notification, Notifier};
use crate::search::SearchIndex;
use crate::timing::Debouncer;

/// Current browse selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
    pub category_id: Option<CategoryId>,
    pub sort: SortOrder,
    pub page: u32,
    pub is_loading: bool,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            category_id: None,
            sort: SortOrder::default(),
            page: 1,
            is_loading: false,
        }
    }
}

impl BrowseState {
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category_id: self.category_id.clone(),
            sort: self.sort,
        }
    }
}

/// Sequence number of a product load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// Drives catalog loads and search for one shopper.
pub struct BrowseController<C, N> {
    catalog: C,
    notifier: N,
    state: BrowseState,
    categories: Vec<Category>,
    index: SearchIndex,
    items_per_page: usize,
    latest: u64,
}

impl<C, N> std::fmt::Debug for BrowseController<C, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowseController")
            .field("state", &self.state)
            .field("categories", &self.categories.len())
            .field("index", &self.index)
            .field("latest", &self.latest)
            .finish_non_exhaustive()
    }
}

impl<C: CatalogSource, N: Notifier> BrowseController<C, N> {
    #[must_use]
    pub fn new(catalog: C, notifier: N, config: &StorefrontConfig) -> Self {
        Self {
            catalog,
            notifier,
            state: BrowseState::default(),
            categories: Vec::new(),
            index: SearchIndex::new(Vec::new(), config.search.cache_capacity),
            items_per_page: config.items_per_page,
            latest: 0,
        }
    }

    /// Fetch and keep the category list.
    #[instrument(skip(self))]
    pub async fn load_categories(&mut self) -> Result<&[Category], CatalogError> {
        self.categories = self.catalog.list_categories().await?;
        tracing::debug!(count = self.categories.len(), "Categories loaded");
        Ok(&self.categories)
    }

    /// Reload products for the current selection, starting from page one.
    ///
    /// Returns the number of products now shown.
    #[instrument(skip(self), fields(category = ?self.state.category_id, sort = %self.state.sort))]
    pub async fn load_products(&mut self) -> Result<usize, CatalogError> {
        let (ticket, filter) = self.begin_load();
        match self.catalog.list_products(&filter).await {
            Ok(products) => {
                self.apply_products(ticket, products);
                Ok(self.index.products().len())
            }
            Err(e) => {
                if ticket.0 == self.latest {
                    self.state.is_loading = false;
                }
                tracing::error!(error = %e, "Error loading products");
                self.notifier
                    .notify(Notification::error("Error loading products"));
                Err(e)
            }
        }
    }

    /// Issue a ticket for a new load and return the filter to fetch with.
    pub fn begin_load(&mut self) -> (LoadTicket, ProductFilter) {
        self.latest += 1;
        self.state.page = 1;
        self.state.is_loading = true;
        (LoadTicket(self.latest), self.state.filter())
    }

    /// Apply a finished load. Results for a superseded ticket are dropped.
    pub fn apply_products(&mut self, ticket: LoadTicket, products: Vec<Product>) -> bool {
        if ticket.0 != self.latest {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest,
                "Discarding superseded product load"
            );
            return false;
        }
        self.state.is_loading = false;
        self.index.replace_products(products);
        // The cached searches were computed over the old list.
        self.index.invalidate();
        true
    }

    /// Show one category (or all, with `None`) and reload.
    pub async fn set_category(
        &mut self,
        category_id: Option<CategoryId>,
    ) -> Result<usize, CatalogError> {
        self.state.category_id = category_id;
        self.load_products().await
    }

    /// Replace the whole selection and reload once.
    pub async fn set_filter(&mut self, filter: ProductFilter) -> Result<usize, CatalogError> {
        self.state.category_id = filter.category_id;
        self.state.sort = filter.sort;
        self.load_products().await
    }

    /// Change the sort order and reload.
    pub async fn set_sort(&mut self, sort: SortOrder) -> Result<usize, CatalogError> {
        self.state.sort = sort;
        self.load_products().await
    }

    /// Products matching `term` among those loaded. A blank term returns all.
    pub fn search(&mut self, term: &str) -> Arc<[Product]> {
        self.index.search(term)
    }

    /// A product and its category name. Failures are also reported through
    /// the notifier.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn product_detail(&self, id: &ProductId) -> Result<ProductDetail, CatalogError> {
        self.catalog.get_product(id).await.inspect_err(|e| {
            tracing::error!(error = %e, "Error loading product");
            self.notifier
                .notify(Notification::error("Error loading the product"));
        })
    }

    /// Whether a "load more" control should be offered.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.items_per_page > 0 && self.index.products().len() >= self.items_per_page
    }

    #[must_use]
    pub const fn state(&self) -> &BrowseState {
        &self.state
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.index.products()
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }
}

/// Search box input, settled after a quiet period.
#[derive(Debug, Clone)]
pub struct DebouncedSearch {
    debouncer: Debouncer<String>,
}

impl Default for DebouncedSearch {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl DebouncedSearch {
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(quiet),
        }
    }

    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.debounce)
    }

    /// Record the box contents at `now` (milliseconds).
    pub fn input(&mut self, term: impl Into<String>, now: u64) {
        self.debouncer.call(term.into(), now);
    }

    /// The settled term, yielded once.
    pub fn poll(&mut self, now: u64) -> Option<String> {
        self.debouncer.poll(now)
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use vitrine_core::Price;

    use super::*;
    use crate::catalog::MockCatalog;
    use crate::notify::{RecordingNotifier, Severity};

    fn controller() -> (BrowseController<MockCatalog, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let controller = BrowseController::new(
            MockCatalog::default(),
            notifier.clone(),
            &StorefrontConfig::default(),
        );
        (controller, notifier)
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::ZERO,
            image_url: None,
            code: None,
            category_id: None,
            description: None,
            stock: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_load_products_and_categories() {
        let (mut browse, _) = controller();
        assert_eq!(browse.load_categories().await.unwrap().len(), 6);

        let count = browse.load_products().await.unwrap();
        assert_eq!(count, 12);
        assert!(browse.has_more());
        assert!(!browse.state().is_loading);
    }

    #[tokio::test]
    async fn test_set_category_filters_and_resets_page() {
        let (mut browse, _) = controller();
        browse.load_products().await.unwrap();
        let count = browse.set_category(Some(CategoryId::new("1"))).await.unwrap();
        assert!(count > 0 && count < 12);
        assert!(
            browse
                .products()
                .iter()
                .all(|p| p.category_id.as_ref().is_some_and(|c| c.as_str() == "1"))
        );
        assert_eq!(browse.state().page, 1);
        assert!(!browse.has_more());
    }

    #[tokio::test]
    async fn test_set_sort_orders_by_price() {
        let (mut browse, _) = controller();
        browse.set_sort(SortOrder::PriceLow).await.unwrap();
        let prices: Vec<_> = browse.products().iter().map(|p| p.price).collect();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_stale_ticket_is_rejected() {
        let (mut browse, _) = controller();
        let (first, _) = browse.begin_load();
        let (second, _) = browse.begin_load();
        assert!(second > first);

        assert!(browse.apply_products(second, vec![product("new", "New")]));
        assert!(!browse.apply_products(first, vec![product("old", "Old")]));
        assert_eq!(browse.products().len(), 1);
        assert_eq!(browse.products().first().unwrap().id.as_str(), "new");
    }

    #[test]
    fn test_new_product_list_resets_search_cache() {
        let (mut browse, _) = controller();
        let (ticket, _) = browse.begin_load();
        browse.apply_products(ticket, vec![product("1", "Shirt")]);
        assert_eq!(browse.search("shirt").len(), 1);

        let (ticket, _) = browse.begin_load();
        browse.apply_products(ticket, vec![product("1", "Shirt"), product("2", "Tee shirt")]);
        assert_eq!(browse.search("shirt").len(), 2);
    }

    #[tokio::test]
    async fn test_product_detail_failure_notifies() {
        let (browse, notifier) = controller();
        let result = browse.product_detail(&ProductId::new("missing")).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));

        let sent = notifier.notifications();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent.first().unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_debounced_search_settles_once() {
        let mut search = DebouncedSearch::default();
        search.input("s", 0);
        search.input("sh", 100);
        search.input("shirt", 200);
        assert_eq!(search.poll(400), None);
        assert_eq!(search.poll(500), Some("shirt".to_string()));
        assert_eq!(search.poll(900), None);
    }
}
