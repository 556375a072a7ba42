//! Newtype IDs for type-safe entity references.
//!
//! Product and order identifiers are both database serials, so keeping them
//! as distinct types stops a product id from being used to look up an order.

/// Define a type-safe ID wrapper around a database serial (`i32`).
///
/// The generated type serializes transparently (so it can sit in a session
/// record or a URL path) and, with the `postgres` feature, binds and decodes as
/// a plain `INTEGER` column.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an `i32` value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying `i32` value.
            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a catalog product. Stable for the product's lifetime.
    ProductId
);

define_id!(
    /// Identifier assigned to an order when the order store appends it.
    OrderId
);
