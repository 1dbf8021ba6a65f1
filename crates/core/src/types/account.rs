//! Identity records owned by the remote service.
//!
//! Field names follow the remote service's JSON representation; system
//! attributes are prefixed with `$`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AccountId, SessionId};

/// An account issued by the remote service.
///
/// The application never mutates accounts; it only creates them and reads
/// back the one bound to the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID.
    #[serde(rename = "$id")]
    pub id: AccountId,
    /// Email address the account was registered with.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the email address has been verified.
    #[serde(default, rename = "emailVerification")]
    pub email_verification: bool,
    /// When the account was created.
    #[serde(
        default,
        rename = "$createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// A session proving that an account has authenticated.
///
/// Returned to callers unmodified; the credential itself stays inside the
/// remote client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID.
    #[serde(rename = "$id")]
    pub id: SessionId,
    /// The account this session belongs to.
    #[serde(rename = "userId")]
    pub account_id: AccountId,
    /// When the session expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire: Option<DateTime<Utc>>,
    /// Authentication provider (`email` for password sessions).
    #[serde(default)]
    pub provider: String,
    /// Whether this is the session the request was made with.
    #[serde(default)]
    pub current: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_remote_json() {
        let json = r#"{
            "$id": "6664b6f70009fd943d75",
            "$createdAt": "2024-06-08T12:00:00.000+00:00",
            "email": "a@example.com",
            "name": "alice",
            "emailVerification": false,
            "status": true
        }"#;

        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id.as_str(), "6664b6f70009fd943d75");
        assert_eq!(account.email, "a@example.com");
        assert_eq!(account.name, "alice");
        assert!(account.created_at.is_some());
    }

    #[test]
    fn test_session_from_remote_json() {
        let json = r#"{
            "$id": "sess1",
            "userId": "acct1",
            "expire": "2025-06-08T12:00:00.000+00:00",
            "provider": "email",
            "current": true
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id.as_str(), "sess1");
        assert_eq!(session.account_id.as_str(), "acct1");
        assert_eq!(session.provider, "email");
        assert!(session.current);
    }

    #[test]
    fn test_session_minimal_json() {
        let session: Session = serde_json::from_str(r#"{"$id":"s","userId":"u"}"#).unwrap();
        assert!(session.expire.is_none());
        assert!(!session.current);
    }
}
