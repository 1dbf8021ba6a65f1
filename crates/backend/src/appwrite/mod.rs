//! Remote service contract and its Appwrite implementation.
//!
//! # Architecture
//!
//! - [`RemoteService`] is the seam between the workflows and the backend;
//!   services hold an `Arc<dyn RemoteService>` so tests can substitute a fake
//! - [`AppwriteClient`] implements it over the Appwrite REST API with `reqwest`
//! - The session credential lives inside the client handle, so every service
//!   sharing the handle shares the session
//!
//! # Example
//!
//! ```rust,ignore
//! use aora_backend::appwrite::{AppwriteClient, RemoteService};
//!
//! let client = AppwriteClient::new(&config)?;
//! let session = client.create_email_password_session(&email, &password).await?;
//! let account = client.get_account().await?;
//! ```

mod avatars;
mod client;

pub use avatars::initials_url;
pub use client::AppwriteClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use aora_core::{Account, AccountId, Document, DocumentId, Email, Session};

/// Errors surfaced by the remote service client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("API error: {status} {kind} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error type (e.g., `user_invalid_credentials`).
        kind: String,
        /// Human-readable message from the service.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(String),

    /// A configured value cannot be sent as a header.
    #[error("Invalid header value for {0}")]
    Header(&'static str),
}

impl RemoteError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A query filter or modifier for [`RemoteService::list_documents`].
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Match documents whose attribute equals one of the values.
    Equal {
        attribute: String,
        values: Vec<serde_json::Value>,
    },
    /// Sort ascending by attribute.
    OrderAsc(String),
    /// Sort descending by attribute.
    OrderDesc(String),
    /// Return at most this many documents.
    Limit(u32),
}

impl Query {
    /// Equality filter on a single string value.
    #[must_use]
    pub fn equal(attribute: &str, value: &str) -> Self {
        Self::Equal {
            attribute: attribute.to_string(),
            values: vec![serde_json::Value::String(value.to_string())],
        }
    }

    /// Serialize to the JSON form the service expects in `queries[]`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let value = match self {
            Self::Equal { attribute, values } => serde_json::json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Self::OrderAsc(attribute) => serde_json::json!({
                "method": "orderAsc",
                "attribute": attribute,
            }),
            Self::OrderDesc(attribute) => serde_json::json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            Self::Limit(limit) => serde_json::json!({
                "method": "limit",
                "values": [limit],
            }),
        };
        value.to_string()
    }
}

/// A page of documents returned by a list call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentList {
    /// Total number of documents matching the filters (ignores `limit`).
    #[serde(default)]
    pub total: u64,
    /// Matching documents, in the requested order.
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Operations the application needs from the remote service.
///
/// Implementations hold whatever session state the service requires; the
/// workflows never see credentials beyond passing a password through.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Create an account. `Ok(None)` means the service answered without an
    /// account object.
    async fn create_account(
        &self,
        id: &AccountId,
        email: &Email,
        password: &SecretString,
        name: &str,
    ) -> Result<Option<Account>, RemoteError>;

    /// Build the initials avatar URL for a name. Computed locally.
    fn initials_avatar_url(&self, name: &str) -> String;

    /// Create an email/password session and keep it for later calls.
    async fn create_email_password_session(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, RemoteError>;

    /// Create a document. `Ok(None)` means the service answered without a
    /// document object.
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        id: &DocumentId,
        data: serde_json::Value,
    ) -> Result<Option<Document>, RemoteError>;

    /// Get the account bound to the current session, or `None` without one.
    async fn get_account(&self) -> Result<Option<Account>, RemoteError>;

    /// List documents matching the queries.
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, RemoteError>;
}
