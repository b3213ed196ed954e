//! Subcommand implementations.
//!
//! Every command writes its output to a caller-supplied writer so it can be
//! exercised without a terminal.

pub mod cart;
pub mod catalog;
pub mod window;

use std::io::Write;

use serde::Serialize;
use thiserror::Error;
use vitrine_storefront::cart::CartError;
use vitrine_storefront::cart::storage::StorageError;
use vitrine_storefront::catalog::CatalogError;
use vitrine_storefront::config::ConfigError;
use vitrine_storefront::error::AppError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Storefront operation failed.
    #[error("{0}")]
    App(#[from] AppError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::App(e.into())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::App(e.into())
    }
}

impl From<CartError> for CliError {
    fn from(e: CartError) -> Self {
        Self::App(e.into())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::App(e.into())
    }
}

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T>(out: &mut impl Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
