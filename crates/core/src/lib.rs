//! Vitrine Core - Shared types library.
//!
//! This crate provides common types used across all Vitrine components:
//! - `storefront` - Cart, catalog, search and windowed rendering engine
//! - `cli` - Terminal driver for browsing and cart management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and sort orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
