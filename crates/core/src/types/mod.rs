//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod sort;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use sort::{SortOrder, UnknownSortOrder};
