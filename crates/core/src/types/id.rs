//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Catalog identifiers
//! are opaque strings (the hosted backend and the mock catalog both use them).

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `is_blank()`
/// - `From<&str>`, `From<String>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use vitrine_core::define_id;
/// define_id!(WishlistId);
/// define_id!(ReviewId);
///
/// let wishlist = WishlistId::new("w-1");
/// let review = ReviewId::new("w-1");
///
/// // These are different types, so this won't compile:
/// // let _: WishlistId = review;
/// # let _ = (wishlist, review);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is empty or only whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversion() {
        let id = ProductId::new("42");
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.as_str(), "42");
        assert_eq!(String::from(id.clone()), "42");
        assert_eq!(ProductId::from("42"), id);
    }

    #[test]
    fn test_id_is_blank() {
        assert!(ProductId::new("").is_blank());
        assert!(ProductId::new("   ").is_blank());
        assert!(!CategoryId::new("1").is_blank());
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = CategoryId::new("3");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"3\"");
        let back: CategoryId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
