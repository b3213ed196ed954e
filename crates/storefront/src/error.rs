//! Unified error handling.
//!
//! Each boundary has its own error enum (`CartError`, `StorageError`,
//! `CatalogError`, `ConfigError`). `AppError` aggregates them for callers that
//! drive several components, such as the CLI.

use thiserror::Error;

use crate::cart::CartError;
use crate::cart::storage::StorageError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Durable store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the caller.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Message suitable for the notification surface.
    ///
    /// Internal details are not exposed to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Cart(CartError::InvalidItem(_)) => "Could not add this product".to_string(),
            Self::Catalog(CatalogError::NotFound(_)) | Self::NotFound(_) => {
                "Product not found".to_string()
            }
            Self::Catalog(_) => "Error loading the product".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Cart(_) | Self::Storage(_) | Self::Config(_) => {
                "Something went wrong".to_string()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
