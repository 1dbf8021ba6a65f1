//! Profile records linking an account to its display data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{Document, DocumentError};
use super::email::Email;
use super::id::{AccountId, DocumentId};
use super::username::Username;

/// Field holding the owning account's ID on a profile document.
pub const ACCOUNT_ID_FIELD: &str = "accountId";

/// Fields written when a profile record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    /// The account this profile belongs to.
    pub account_id: AccountId,
    /// Email address, copied from the account at creation.
    pub email: Email,
    /// Display username.
    pub username: Username,
    /// Initials avatar image URL.
    pub avatar: String,
}

impl NewProfile {
    /// Document fields to write for this profile.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            ACCOUNT_ID_FIELD.to_string(),
            Value::String(self.account_id.to_string()),
        );
        fields.insert("email".to_string(), Value::String(self.email.to_string()));
        fields.insert(
            "username".to_string(),
            Value::String(self.username.to_string()),
        );
        fields.insert("avatar".to_string(), Value::String(self.avatar.clone()));
        fields
    }
}

/// An application-owned profile record.
///
/// At most one profile is expected per account. Nothing on the remote side
/// enforces this, so lookups always filter by [`ACCOUNT_ID_FIELD`] and take
/// the oldest match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Document ID of the profile.
    #[serde(rename = "$id")]
    pub id: DocumentId,
    /// The account this profile belongs to.
    pub account_id: AccountId,
    /// Email address.
    pub email: Email,
    /// Display username.
    pub username: Username,
    /// Initials avatar image URL.
    pub avatar: String,
}

impl TryFrom<&Document> for ProfileRecord {
    type Error = DocumentError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let account_id = AccountId::new(doc.required_str(ACCOUNT_ID_FIELD)?);
        let email = Email::parse(doc.required_str("email")?)
            .map_err(|e| doc.invalid("email", e.to_string()))?;
        let username = Username::parse(doc.required_str("username")?)
            .map_err(|e| doc.invalid("username", e.to_string()))?;
        let avatar = doc.required_str("avatar")?.to_owned();

        Ok(Self {
            id: doc.id.clone(),
            account_id,
            email,
            username,
            avatar,
        })
    }
}

/// Who the remote client's session currently belongs to.
///
/// `Unauthenticated` and `ProfileMissing` both mean "no profile to show",
/// but are kept apart so callers can react differently (prompt for sign-in
/// versus resume provisioning).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CurrentUser {
    /// Signed in, with a profile record.
    Authenticated(ProfileRecord),
    /// No active session.
    Unauthenticated,
    /// Signed in, but no profile record exists for the account.
    ProfileMissing {
        /// The signed-in account.
        account_id: AccountId,
    },
}

impl CurrentUser {
    /// Returns the profile, if there is one.
    #[must_use]
    pub const fn profile(&self) -> Option<&ProfileRecord> {
        match self {
            Self::Authenticated(profile) => Some(profile),
            Self::Unauthenticated | Self::ProfileMissing { .. } => None,
        }
    }

    /// Consumes `self` and returns the profile, if there is one.
    #[must_use]
    pub fn into_profile(self) -> Option<ProfileRecord> {
        match self {
            Self::Authenticated(profile) => Some(profile),
            Self::Unauthenticated | Self::ProfileMissing { .. } => None,
        }
    }

    /// Whether a session is active.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_new_profile_field_names() {
        let profile = NewProfile {
            account_id: AccountId::new("acct"),
            email: Email::parse("a@example.com").unwrap(),
            username: Username::parse("alice").unwrap(),
            avatar: "https://example.com/a.png".to_string(),
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(Value::Object(profile.to_fields()), value);
        assert_eq!(
            value,
            json!({
                "accountId": "acct",
                "email": "a@example.com",
                "username": "alice",
                "avatar": "https://example.com/a.png"
            })
        );
    }

    #[test]
    fn test_profile_from_document() {
        let document = doc(json!({
            "$id": "p1",
            "accountId": "acct",
            "email": "a@example.com",
            "username": "alice",
            "avatar": "https://example.com/a.png"
        }));

        let profile = ProfileRecord::try_from(&document).unwrap();
        assert_eq!(profile.id.as_str(), "p1");
        assert_eq!(profile.account_id.as_str(), "acct");
        assert_eq!(profile.username.as_str(), "alice");
    }

    #[test]
    fn test_profile_missing_avatar() {
        let document = doc(json!({
            "$id": "p1",
            "accountId": "acct",
            "email": "a@example.com",
            "username": "alice"
        }));

        assert!(matches!(
            ProfileRecord::try_from(&document),
            Err(DocumentError::MissingField { field: "avatar", .. })
        ));
    }

    #[test]
    fn test_profile_invalid_email() {
        let document = doc(json!({
            "$id": "p1",
            "accountId": "acct",
            "email": "not-an-email",
            "username": "alice",
            "avatar": "x"
        }));

        assert!(matches!(
            ProfileRecord::try_from(&document),
            Err(DocumentError::InvalidField { field: "email", .. })
        ));
    }

    #[test]
    fn test_current_user_profile_accessors() {
        assert!(CurrentUser::Unauthenticated.into_profile().is_none());
        assert!(!CurrentUser::Unauthenticated.is_signed_in());

        let missing = CurrentUser::ProfileMissing {
            account_id: AccountId::new("acct"),
        };
        assert!(missing.profile().is_none());
        assert!(missing.is_signed_in());
    }

    #[test]
    fn test_current_user_serializes_with_status_tag() {
        let value = serde_json::to_value(CurrentUser::Unauthenticated).unwrap();
        assert_eq!(value, json!({ "status": "unauthenticated" }));

        let missing = CurrentUser::ProfileMissing {
            account_id: AccountId::new("acct"),
        };
        assert_eq!(
            serde_json::to_value(missing).unwrap(),
            json!({ "status": "profile_missing", "account_id": "acct" })
        );
    }
}
