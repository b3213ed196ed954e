//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are never negative. Catalog payloads are loosely typed (numbers,
//! numeric strings, or missing entirely), so [`Price::coerce`] is the single
//! place where such values are turned into a `Price`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative unit price in the store currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents (or the currency's minor unit).
    #[must_use]
    pub fn from_minor_units(minor: u64) -> Self {
        Self(Decimal::from(minor) / Decimal::ONE_HUNDRED)
    }

    /// Coerce a loosely-typed JSON value into a price.
    ///
    /// Numbers and numeric strings are accepted. Anything missing, unparseable
    /// or negative becomes [`Price::ZERO`].
    #[must_use]
    pub fn coerce(value: Option<&serde_json::Value>) -> Self {
        let parsed = match value {
            Some(serde_json::Value::Number(n)) => Decimal::from_str(&n.to_string())
                .ok()
                .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
            Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        };
        parsed.and_then(|d| Self::new(d).ok()).unwrap_or(Self::ZERO)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EGP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// The ISO code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EGP => "EGP",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }

    /// Format an amount for display (e.g., "89.99 EGP").
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format!("{:.2} {}", amount, self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EGP" => Ok(Self::EGP),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}
