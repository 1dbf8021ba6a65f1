//! Newtype IDs for type-safe references to remote records.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different record types. The remote service
//! issues string identifiers, so every ID wraps a `String`.

/// Maximum length of an identifier accepted by the remote service.
pub const MAX_ID_LENGTH: usize = 36;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `unique()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use aora_core::define_id;
/// define_id!(AccountId);
/// define_id!(DocumentId);
///
/// let account_id = AccountId::new("6664b6f70009fd943d75");
/// let document_id = DocumentId::unique();
///
/// // These are different types, so this won't compile:
/// // let _: AccountId = document_id;
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
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier issued by the remote service.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh identifier for a record about to be created.
            #[must_use]
            pub fn unique() -> Self {
                Self($crate::types::id::unique_id())
            }

            /// Get the identifier as a string slice.
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

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generate a unique identifier accepted by the remote service.
///
/// A v4 UUID in its 32-character hex form satisfies the service's id rules
/// (at most 36 characters from `[a-zA-Z0-9._-]`, not starting with a
/// special character).
#[must_use]
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

define_id!(AccountId);
define_id!(SessionId);
define_id!(DocumentId);
