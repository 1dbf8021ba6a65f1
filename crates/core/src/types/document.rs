//! Generic documents stored in the remote database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::DocumentId;

/// Errors that can occur when decoding a typed record from a [`Document`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A required field is absent or null.
    #[error("document {document_id} is missing field `{field}`")]
    MissingField {
        /// The offending document.
        document_id: DocumentId,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field is present but holds an unusable value.
    #[error("document {document_id} has invalid field `{field}`: {reason}")]
    InvalidField {
        /// The offending document.
        document_id: DocumentId,
        /// Name of the invalid field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// A document as returned by the remote database.
///
/// System attributes are decoded into named fields; everything else lands in
/// [`Document::data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    #[serde(rename = "$id")]
    pub id: DocumentId,
    /// Collection the document belongs to.
    #[serde(default, rename = "$collectionId")]
    pub collection_id: String,
    /// Database the collection belongs to.
    #[serde(default, rename = "$databaseId")]
    pub database_id: String,
    /// When the document was created.
    #[serde(
        default,
        rename = "$createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// When the document was last updated.
    #[serde(
        default,
        rename = "$updatedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Permission strings attached to the document.
    #[serde(default, rename = "$permissions")]
    pub permissions: Vec<String>,
    /// Application fields.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Look up an application field, treating `null` as absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name).filter(|v| !v.is_null())
    }

    /// Get a required string field.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::MissingField` if the field is absent or null,
    /// and `DocumentError::InvalidField` if it is not a string.
    pub fn required_str(&self, field: &'static str) -> Result<&str, DocumentError> {
        match self.field(field) {
            None => Err(DocumentError::MissingField {
                document_id: self.id.clone(),
                field,
            }),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(DocumentError::InvalidField {
                document_id: self.id.clone(),
                field,
                reason: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Get an optional string field; non-string values are ignored.
    #[must_use]
    pub fn optional_str(&self, field: &str) -> Option<&str> {
        self.field(field).and_then(Value::as_str)
    }

    /// Build an [`DocumentError::InvalidField`] for this document.
    #[must_use]
    pub fn invalid(&self, field: &'static str, reason: impl Into<String>) -> DocumentError {
        DocumentError::InvalidField {
            document_id: self.id.clone(),
            field,
            reason: reason.into(),
        }
    }
}
