//! Vitrine storefront engine.
//!
//! Everything a storefront front end needs apart from drawing: the cart,
//! catalog access with fallback, cached product search, browse state and
//! windowed list rendering. Rendering itself goes through [`RenderTarget`],
//! so the engine has no opinion about the UI toolkit.
//!
//! [`RenderTarget`]: virtual_scroll::RenderTarget

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod browse;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod lazy;
pub mod notify;
pub mod search;
pub mod timing;
pub mod virtual_scroll;
