//! Shopping cart state.
//!
//! The cart is an ordered list of line items, unique by product ID, persisted
//! as a JSON array under a single key of a [`KeyValueStore`]. Every mutation
//! writes through to the store before returning.
//!
//! # Example
//!
//! ```rust
//! use vitrine_storefront::cart::{CartProduct, CartStore};
//! use vitrine_storefront::cart::storage::MemoryStore;
//! use vitrine_storefront::notify::RecordingNotifier;
//! use vitrine_core::Price;
//!
//! let mut cart = CartStore::new(MemoryStore::new(), RecordingNotifier::new());
//! let shirt = CartProduct::new("1", "Classic shirt", Price::from_minor_units(8999));
//! cart.add_item(&shirt, 2)?;
//! assert_eq!(cart.item_count(), 2);
//! # Ok::<(), vitrine_storefront::cart::CartError>(())
//! ```

pub mod storage;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;
use vitrine_core::{CurrencyCode, Price, ProductId};

use crate::catalog::Product;
use crate::notify::{Notification, Notifier};
use storage::{KeyValueStore, StorageError};

/// Key under which the cart is persisted.
pub const CART_STORAGE_KEY: &str = "fashion_store_cart";

/// Image shown for line items without one.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/80";

/// Name used when a product arrives without one.
pub const DEFAULT_ITEM_NAME: &str = "Product";

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The add-to-cart payload is unusable (e.g., no product ID).
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// The durable store could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Add-to-cart payload.
///
/// This is the loosely-typed shape product cards hand to the cart: every
/// field may be missing, and the price may be a number or a numeric string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CartProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Price,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
}

impl CartProduct {
    /// Payload for a product with a known ID, name and price.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            price,
            image: None,
        }
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_ITEM_NAME)
    }
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: Some(product.name.clone()),
            price: product.price,
            image: product.image_url.clone(),
        }
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(Price::coerce(value.as_ref()))
}

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl LineItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// Snapshot produced by a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub reference: Uuid,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub item_count: u64,
    pub created_at: DateTime<Utc>,
}

/// The shopping cart.
///
/// Generic over the durable store and the notification surface so both can be
/// replaced in tests.
#[derive(Debug)]
pub struct CartStore<S, N> {
    items: Vec<LineItem>,
    store: S,
    notifier: N,
}

impl<S: KeyValueStore, N: Notifier> CartStore<S, N> {
    /// Create a cart and load any persisted items.
    pub fn new(store: S, notifier: N) -> Self {
        let mut cart = Self {
            items: Vec::new(),
            store,
            notifier,
        };
        cart.load_from_storage();
        cart
    }

    /// Current line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line item by product ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// `Σ quantity`.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Total formatted for display.
    #[must_use]
    pub fn formatted_total(&self, currency: CurrencyCode) -> String {
        currency.format(self.total())
    }

    /// Add `quantity` units of a product.
    ///
    /// Adding a product already in the cart accumulates its quantity. A
    /// quantity of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidItem` if the payload has no product ID.
    #[instrument(skip(self, product), fields(product_id = ?product.id))]
    pub fn add_item(&mut self, product: &CartProduct, quantity: u32) -> Result<(), CartError> {
        let Some(id) = product.id.as_ref().filter(|id| !id.is_blank()) else {
            tracing::error!("Invalid product data: missing id");
            return Err(CartError::InvalidItem("missing product id".to_string()));
        };
        let quantity = quantity.max(1);

        if let Some(existing) = self.items.iter_mut().find(|item| &item.id == id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(LineItem {
                id: id.clone(),
                name: product.display_name().to_string(),
                price: product.price,
                image: product
                    .image
                    .clone()
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
                quantity,
            });
        }

        self.persist();
        self.notifier.notify(Notification::success(format!(
            "Added {} to cart",
            product.display_name()
        )));
        Ok(())
    }

    /// Remove a product. Removing a product not in the cart is a no-op.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|item| item.id.as_str() != id);
        self.persist();
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A quantity of zero or less removes the product. Unknown IDs are ignored.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        let Some(index) = self.items.iter().position(|item| item.id.as_str() == id) else {
            return;
        };
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Summarise and clear the cart.
    ///
    /// Returns `None` (and notifies the shopper) when the cart is empty. No
    /// order is submitted anywhere; the summary is for display only.
    pub fn checkout(&mut self) -> Option<OrderSummary> {
        if self.items.is_empty() {
            self.notifier.notify(Notification::error("Your cart is empty"));
            return None;
        }

        let summary = OrderSummary {
            reference: Uuid::new_v4(),
            items: self.items.clone(),
            total: self.total(),
            item_count: self.item_count(),
            created_at: Utc::now(),
        };
        tracing::info!(
            reference = %summary.reference,
            total = %summary.total,
            item_count = summary.item_count,
            "Checkout completed"
        );

        self.clear();
        self.notifier
            .notify(Notification::success("Order sent successfully!"));
        Some(summary)
    }

    /// Replace the in-memory items with the persisted ones.
    ///
    /// A missing entry leaves the cart empty. An entry that is not a JSON
    /// array also yields an empty cart; the problem is logged and never
    /// surfaced. Individual rows that are malformed are dropped on their own.
    pub fn load_from_storage(&mut self) {
        self.items = match self.store.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(rows) => sanitize(rows),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored cart is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored cart, starting empty");
                Vec::new()
            }
        };
    }

    /// Write the current items to the durable store.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if serialization or the write fails.
    pub fn save_to_storage(&self) -> Result<(), CartError> {
        let raw = serde_json::to_string(&self.items).map_err(StorageError::from)?;
        self.store.set(CART_STORAGE_KEY, &raw)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save_to_storage() {
            tracing::error!(error = %e, "Failed to persist cart");
        }
    }
}

/// Persisted row, read leniently so one bad entry cannot discard the rest.
#[derive(Debug, Deserialize)]
struct StoredLineItem {
    #[serde(default)]
    id: Option<ProductId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Price,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    quantity: Option<i64>,
}

impl StoredLineItem {
    fn into_line_item(self) -> Option<LineItem> {
        let id = self.id.filter(|id| !id.is_blank())?;
        let quantity = self.quantity.filter(|q| *q > 0)?;
        Some(LineItem {
            id,
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
            price: self.price,
            image: self
                .image
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
        })
    }
}

/// Enforce the cart invariants on loaded rows: no blank IDs, no quantities
/// below one, one entry per ID (later duplicates merge into the first).
/// Negative or unreadable prices become zero.
fn sanitize(rows: Vec<serde_json::Value>) -> Vec<LineItem> {
    let mut clean: Vec<LineItem> = Vec::with_capacity(rows.len());
    for row in rows {
        let item = serde_json::from_value::<StoredLineItem>(row)
            .ok()
            .and_then(StoredLineItem::into_line_item);
        let Some(item) = item else {
            tracing::debug!("Dropping invalid stored line item");
            continue;
        };
        if let Some(existing) = clean.iter_mut().find(|c| c.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            clean.push(item);
        }
    }
    clean
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::notify::{RecordingNotifier, Severity};
    use storage::MemoryStore;

    fn cart() -> (
        CartStore<MemoryStore, RecordingNotifier>,
        MemoryStore,
        RecordingNotifier,
    ) {
        let store = MemoryStore::new();
        let notifier = RecordingNotifier::new();
        (
            CartStore::new(store.clone(), notifier.clone()),
            store,
            notifier,
        )
    }

    fn shirt() -> CartProduct {
        CartProduct::new("1", "Classic shirt", Price::from_minor_units(8999))
    }

    fn dress() -> CartProduct {
        CartProduct::new("2", "Evening dress", Price::from_minor_units(14999))
    }

    #[test]
    fn test_add_item_appends_with_defaults() {
        let (mut cart, _, notifier) = cart();
        cart.add_item(&shirt(), 1).unwrap();

        let item = &cart.items()[0];
        assert_eq!(item.id.as_str(), "1");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.image, PLACEHOLDER_IMAGE);

        let seen = notifier.notifications();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].severity, Severity::Success);
        assert!(seen[0].message.contains("Classic shirt"));
    }

    #[test]
    fn test_add_same_item_twice_merges() {
        let (mut cart, _, _) = cart();
        cart.add_item(&shirt(), 2).unwrap();
        cart.add_item(&shirt(), 3).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_add_item_without_id_is_invalid() {
        let (mut cart, store, notifier) = cart();
        let payload = CartProduct {
            name: Some("Ghost".to_string()),
            ..CartProduct::default()
        };
        assert!(matches!(
            cart.add_item(&payload, 1),
            Err(CartError::InvalidItem(_))
        ));
        let blank = CartProduct::new("  ", "Blank", Price::ZERO);
        assert!(cart.add_item(&blank, 1).is_err());

        assert!(cart.is_empty());
        assert!(notifier.notifications().is_empty());
        assert_eq!(store.get(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_item_zero_quantity_counts_as_one() {
        let (mut cart, _, _) = cart();
        cart.add_item(&shirt(), 0).unwrap();
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_payload_price_coercion() {
        let payload: CartProduct =
            serde_json::from_str(r#"{"id":"7","name":"Cap","price":"-3","image_url":""}"#)
                .unwrap();
        assert_eq!(payload.price, Price::ZERO);

        let payload: CartProduct =
            serde_json::from_str(r#"{"id":"8","price":"12.50"}"#).unwrap();
        assert_eq!(payload.price.amount(), Decimal::new(1250, 2));

        let (mut cart, _, _) = cart();
        let unnamed: CartProduct = serde_json::from_str(r#"{"id":"9"}"#).unwrap();
        cart.add_item(&unnamed, 1).unwrap();
        assert_eq!(cart.items()[0].name, DEFAULT_ITEM_NAME);
        assert_eq!(cart.items()[0].price, Price::ZERO);
    }

    #[test]
    fn test_update_quantity_sets_and_removes() {
        let (mut cart, _, _) = cart();
        cart.add_item(&shirt(), 1).unwrap();
        cart.add_item(&dress(), 1).unwrap();

        cart.update_quantity("1", 4);
        assert_eq!(cart.get("1").unwrap().quantity, 4);

        cart.update_quantity("1", 0);
        assert!(cart.get("1").is_none());

        cart.update_quantity("2", -5);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_and_remove_unknown_id_are_noops() {
        let (mut cart, _, _) = cart();
        cart.add_item(&shirt(), 2).unwrap();
        cart.update_quantity("missing", 3);
        cart.remove_item("missing");
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_totals() {
        let (mut cart, _, _) = cart();
        cart.add_item(&shirt(), 2).unwrap();
        cart.add_item(&dress(), 1).unwrap();
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Decimal::new(32997, 2));
        assert_eq!(cart.formatted_total(CurrencyCode::EGP), "329.97 EGP");
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let (mut cart, store, _) = cart();
        let stored = |store: &MemoryStore| -> Vec<LineItem> {
            serde_json::from_str(&store.get(CART_STORAGE_KEY).unwrap().unwrap()).unwrap()
        };

        cart.add_item(&shirt(), 1).unwrap();
        assert_eq!(stored(&store), cart.items());
        cart.update_quantity("1", 3);
        assert_eq!(stored(&store), cart.items());
        cart.add_item(&dress(), 1).unwrap();
        cart.remove_item("1");
        assert_eq!(stored(&store), cart.items());
        cart.clear();
        assert!(stored(&store).is_empty());
    }

    #[test]
    fn test_reload_reproduces_cart() {
        let (mut cart, store, _) = cart();
        cart.add_item(&shirt(), 2).unwrap();
        cart.add_item(&dress(), 1).unwrap();

        let reloaded = CartStore::new(store, RecordingNotifier::new());
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total(), cart.total());
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let store = MemoryStore::new();
        store.set(CART_STORAGE_KEY, "{not json").unwrap();
        let cart = CartStore::new(store, RecordingNotifier::new());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stored_invalid_entries_are_sanitized() {
        let store = MemoryStore::new();
        store
            .set(
                CART_STORAGE_KEY,
                r#"[
                    {"id":"1","name":"A","price":10,"image":"a.png","quantity":1},
                    {"id":"","name":"B","price":5,"image":"b.png","quantity":1},
                    {"id":"2","name":"C","price":"2.5","image":"c.png","quantity":0},
                    {"id":"1","name":"A","price":10,"image":"a.png","quantity":2}
                ]"#,
            )
            .unwrap();
        let cart = CartStore::new(store, RecordingNotifier::new());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_one_bad_row_keeps_the_others() {
        let store = MemoryStore::new();
        store
            .set(
                CART_STORAGE_KEY,
                r#"[
                    {"id":"1","name":"A","price":10,"image":"a.png","quantity":2},
                    {"id":"2","name":"B","price":5,"image":"b.png","quantity":-1},
                    {"id":"3","name":"C","price":-4,"image":"c.png","quantity":1},
                    "garbage"
                ]"#,
            )
            .unwrap();
        let cart = CartStore::new(store, RecordingNotifier::new());
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.get("1").unwrap().quantity, 2);
        assert_eq!(cart.get("3").unwrap().price, Price::ZERO);
        assert!(cart.get("2").is_none());
        assert_eq!(cart.total(), Decimal::new(20, 0));
    }

    #[test]
    fn test_checkout_empty_cart_notifies_error() {
        let (mut cart, _, notifier) = cart();
        assert!(cart.checkout().is_none());
        assert_eq!(notifier.notifications()[0].severity, Severity::Error);
    }

    #[test]
    fn test_checkout_summarises_and_clears() {
        let (mut cart, store, _) = cart();
        cart.add_item(&shirt(), 2).unwrap();

        let summary = cart.checkout().unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total, Decimal::new(17998, 2));
        assert_eq!(summary.items.len(), 1);
        assert!(cart.is_empty());
        assert_eq!(store.get(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }
}
