//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! IDs are opaque strings. The storefront API hands out numeric IDs while
//! guest carts generate their own, so every ID accepts either a JSON string
//! or a JSON integer on the way in and always serializes as a string.

use serde::Deserialize;

/// Wire form accepted for any ID.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Int(i64),
}

impl RawId {
    #[doc(hidden)]
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a plain string, `Deserialize` from a string or an integer
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `From<i64>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("1");
/// let order_id = OrderId::from(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
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
            ::serde::Serialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)
                    .map(|raw| Self(raw.into_string()))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(LineId);
define_id!(OrderId);
define_id!(CategoryId);
define_id!(UserId);

impl LineId {
    /// Generate an ID for a line that only exists in a guest cart.
    ///
    /// Uses a time-ordered UUID so IDs sort by creation time and stay unique
    /// when several lines are created within the same millisecond.
    #[must_use]
    pub fn generate_local() -> Self {
        Self(format!("local-{}", uuid::Uuid::now_v7().simple()))
    }

    /// Whether this ID was generated locally for a guest cart.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with("local-")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_deserializes_from_string_and_integer() {
        let from_str: ProductId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(from_str.as_str(), "p1");

        let from_int: ProductId = serde_json::from_str("1712345678901").unwrap();
        assert_eq!(from_int.as_str(), "1712345678901");
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = OrderId::from(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }

    #[test]
    fn test_id_rejects_other_json_types() {
        assert!(serde_json::from_str::<LineId>("true").is_err());
        assert!(serde_json::from_str::<LineId>("{}").is_err());
    }

    #[test]
    fn test_generated_local_ids_are_unique() {
        let ids: std::collections::HashSet<LineId> =
            (0..100).map(|_| LineId::generate_local()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(LineId::is_local));
    }

    #[test]
    fn test_server_ids_are_not_local() {
        assert!(!LineId::from(7).is_local());
    }

    #[test]
    fn test_display() {
        assert_eq!(CategoryId::new("books").to_string(), "books");
    }
}
