//! Product listing sort orders.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort order for product listings.
///
/// Wire names match the values used by the listing filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Alphabetical by name.
    Name,
}

impl SortOrder {
    /// Wire name of the sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Name => "name",
        }
    }
}

/// Returned when a sort name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "newest" => Ok(Self::Newest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "name" => Ok(Self::Name),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_round_trip_names() {
        for sort in [
            SortOrder::Newest,
            SortOrder::PriceLow,
            SortOrder::PriceHigh,
            SortOrder::Name,
        ] {
            assert_eq!(sort.as_str().parse::<SortOrder>(), Ok(sort));
        }
    }

    #[test]
    fn test_sort_order_empty_is_default() {
        assert_eq!("".parse::<SortOrder>(), Ok(SortOrder::Newest));
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_serde_kebab_case() {
        let json = serde_json::to_string(&SortOrder::PriceHigh).expect("serialize");
        assert_eq!(json, "\"price-high\"");
    }
}
