//! Account workflow error types.

use std::fmt;

use thiserror::Error;

use aora_core::{DocumentError, EmailError, UsernameError};

use crate::appwrite::RemoteError;

/// The remote call a workflow step was making when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateAccount,
    CreateSession,
    CreateProfile,
    GetAccount,
    ListProfiles,
}

impl Operation {
    /// Stable name used in log fields and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateAccount => "create_account",
            Self::CreateSession => "create_session",
            Self::CreateProfile => "create_profile",
            Self::GetAccount => "get_account",
            Self::ListProfiles => "list_profiles",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Account creation answered without an account.
    #[error("account creation returned empty result")]
    EmptyAccount,

    /// Profile creation answered without a document.
    #[error("profile creation returned empty result")]
    EmptyProfile,

    /// The remote service rejected or failed a call.
    #[error("{operation} failed: {source}")]
    Remote {
        /// Which call failed.
        operation: Operation,
        /// The original error.
        #[source]
        source: RemoteError,
    },

    /// A stored profile record could not be decoded.
    #[error("malformed profile record: {0}")]
    MalformedProfile(#[from] DocumentError),

    /// An operation needing a session ran without one.
    #[error("no active session")]
    NotAuthenticated,

    /// The account's display name is not a usable username.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// The account's email address is not usable on a profile.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl AccountError {
    /// Build a closure wrapping a [`RemoteError`] for `operation`, for use
    /// with `map_err`.
    pub(crate) fn remote(operation: Operation) -> impl FnOnce(RemoteError) -> Self {
        move |source| Self::Remote { operation, source }
    }

    /// The failed operation, for remote errors.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Remote { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
