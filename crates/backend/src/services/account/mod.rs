//! Account provisioning service.
//!
//! Sequences the remote calls that turn an email, password and username into
//! a signed-in account with a profile record, and reads that profile back.

mod error;

pub use error::{AccountError, Operation};

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value;
use tracing::instrument;

use aora_core::types::profile::ACCOUNT_ID_FIELD;
use aora_core::{
    AccountId, CurrentUser, DocumentId, Email, NewProfile, ProfileRecord, Session, Username,
};

use crate::appwrite::{Query, RemoteService};
use crate::config::BackendConfig;

/// Account provisioning service.
///
/// Handles sign-up, sign-in, and current-user lookup. Cheap to clone; all
/// clones share the remote handle and therefore the session.
#[derive(Clone)]
pub struct AccountService {
    remote: Arc<dyn RemoteService>,
    database_id: String,
    collection_id: String,
}

impl AccountService {
    /// Create a new account service over a remote handle.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteService>, config: &BackendConfig) -> Self {
        Self {
            remote,
            database_id: config.database_id.clone(),
            collection_id: config.user_collection_id.clone(),
        }
    }

    // =========================================================================
    // Provisioning
    // =========================================================================

    /// Register a new account, sign it in, and create its profile record.
    ///
    /// Steps run strictly in order: account creation, avatar derivation,
    /// sign-in, then the profile step. If sign-in fails no profile is
    /// written. The profile step reuses an existing record for the account
    /// instead of creating a second one.
    ///
    /// Nothing is rolled back on failure. An account left without a profile
    /// can be completed later with [`Self::resume_provisioning`].
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyAccount` if account creation answered
    /// without an account (no further calls are made).
    /// Returns `AccountError::EmptyProfile` if profile creation answered
    /// without a document.
    /// Returns `AccountError::Remote` naming the failed step otherwise.
    #[instrument(
        skip(self, email, password, username),
        fields(email = %email.masked(), username = %username)
    )]
    pub async fn create_user(
        &self,
        email: &Email,
        password: &SecretString,
        username: &Username,
    ) -> Result<ProfileRecord, AccountError> {
        let result = self.provision(email, password, username).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Account provisioning failed");
        }
        result
    }

    async fn provision(
        &self,
        email: &Email,
        password: &SecretString,
        username: &Username,
    ) -> Result<ProfileRecord, AccountError> {
        let account = self
            .remote
            .create_account(&AccountId::unique(), email, password, username.as_str())
            .await
            .map_err(AccountError::remote(Operation::CreateAccount))?
            .ok_or(AccountError::EmptyAccount)?;
        tracing::info!(account_id = %account.id, "Account created");

        let avatar = self.avatar_url(username);

        self.sign_in(email, password).await?;

        self.ensure_profile(NewProfile {
            account_id: account.id,
            email: email.clone(),
            username: username.clone(),
            avatar,
        })
        .await
    }

    /// Finish provisioning for the signed-in account.
    ///
    /// Use after [`Self::create_user`] failed past account creation: the
    /// account exists and can sign in, but may have no profile record yet.
    /// Returns the existing profile when there already is one.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::NotAuthenticated` if there is no session.
    /// Returns `AccountError::InvalidUsername` or `AccountError::InvalidEmail`
    /// if the account's name or email cannot be copied onto a profile.
    /// Returns `AccountError::Remote` if a remote call fails.
    #[instrument(skip(self))]
    pub async fn resume_provisioning(&self) -> Result<ProfileRecord, AccountError> {
        let account = self
            .remote
            .get_account()
            .await
            .map_err(AccountError::remote(Operation::GetAccount))?
            .ok_or(AccountError::NotAuthenticated)?;

        let username = Username::parse(&account.name)?;
        let email = Email::parse(&account.email)?;
        let avatar = self.avatar_url(&username);

        self.ensure_profile(NewProfile {
            account_id: account.id,
            email,
            username,
            avatar,
        })
        .await
    }

    /// Derive the initials avatar URL for a username.
    #[must_use]
    pub fn avatar_url(&self, username: &Username) -> String {
        self.remote.initials_avatar_url(username.as_str())
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// The session is kept by the remote handle for subsequent calls and
    /// also returned unmodified.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Remote` if the credentials are rejected or the
    /// call fails.
    #[instrument(skip(self, email, password), fields(email = %email.masked()))]
    pub async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, AccountError> {
        let session = self
            .remote
            .create_email_password_session(email, password)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Sign-in failed");
                AccountError::remote(Operation::CreateSession)(e)
            })?;

        tracing::info!(account_id = %session.account_id, "Session created");
        Ok(session)
    }

    // =========================================================================
    // Current User
    // =========================================================================

    /// Get the signed-in user's profile.
    ///
    /// A missing session is `CurrentUser::Unauthenticated` and an account
    /// without a profile is `CurrentUser::ProfileMissing`; neither is an
    /// error. If several profiles match the account, the oldest wins.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Remote` if a remote call fails, or
    /// `AccountError::MalformedProfile` if the stored profile is unreadable.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<CurrentUser, AccountError> {
        let result = self.lookup_current_user().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to load current user");
        }
        result
    }

    async fn lookup_current_user(&self) -> Result<CurrentUser, AccountError> {
        let Some(account) = self
            .remote
            .get_account()
            .await
            .map_err(AccountError::remote(Operation::GetAccount))?
        else {
            tracing::debug!("No active session");
            return Ok(CurrentUser::Unauthenticated);
        };

        match self.find_profile(&account.id).await? {
            Some(profile) => Ok(CurrentUser::Authenticated(profile)),
            None => {
                tracing::warn!(account_id = %account.id, "Signed-in account has no profile record");
                Ok(CurrentUser::ProfileMissing {
                    account_id: account.id,
                })
            }
        }
    }

    // =========================================================================
    // Profile Records
    // =========================================================================

    /// Find the oldest profile record for an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Remote` if the query fails, or
    /// `AccountError::MalformedProfile` if the record is unreadable.
    pub async fn find_profile(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<ProfileRecord>, AccountError> {
        let queries = [
            Query::equal(ACCOUNT_ID_FIELD, account_id.as_str()),
            Query::OrderAsc("$createdAt".to_string()),
            Query::Limit(1),
        ];

        let list = self
            .remote
            .list_documents(&self.database_id, &self.collection_id, &queries)
            .await
            .map_err(AccountError::remote(Operation::ListProfiles))?;

        if list.total > 1 {
            tracing::warn!(
                account_id = %account_id,
                count = list.total,
                "Multiple profile records for account"
            );
        }

        let profile = list
            .documents
            .first()
            .map(ProfileRecord::try_from)
            .transpose()?;
        Ok(profile)
    }

    /// Return the account's profile, creating it if none exists.
    async fn ensure_profile(&self, profile: NewProfile) -> Result<ProfileRecord, AccountError> {
        if let Some(existing) = self.find_profile(&profile.account_id).await? {
            tracing::info!(
                account_id = %profile.account_id,
                document_id = %existing.id,
                "Profile record already exists"
            );
            return Ok(existing);
        }

        let document = self
            .remote
            .create_document(
                &self.database_id,
                &self.collection_id,
                &DocumentId::unique(),
                Value::Object(profile.to_fields()),
            )
            .await
            .map_err(AccountError::remote(Operation::CreateProfile))?
            .ok_or(AccountError::EmptyProfile)?;

        let record = ProfileRecord::try_from(&document)?;
        tracing::info!(
            account_id = %record.account_id,
            document_id = %record.id,
            "Profile record created"
        );
        Ok(record)
    }
}
