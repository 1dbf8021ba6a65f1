//! Integration tests for the Aora backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aora-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `provisioning` - Sign-up, sign-in, and resume against [`FakeRemote`]
//! - `current_user` - Current-user lookup against [`FakeRemote`]
//! - `trending` - Trending feed ordering and caching
//! - `appwrite_client` - The HTTP client against a local axum server
//!
//! [`FakeRemote`] keeps accounts, the session, and documents in memory and
//! records every call, so tests can assert on the exact sequence of remote
//! operations a workflow performs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use url::Url;

use aora_backend::appwrite::{DocumentList, Query, RemoteError, RemoteService, initials_url};
use aora_backend::{Backend, BackendConfig};
use aora_core::{Account, AccountId, Document, DocumentId, Email, Session, SessionId};

/// Database ID used by [`test_config`].
pub const DATABASE_ID: &str = "db";
/// Profile collection ID used by [`test_config`].
pub const USER_COLLECTION_ID: &str = "users";
/// Video collection ID used by [`test_config`].
pub const VIDEO_COLLECTION_ID: &str = "videos";

/// Configuration pointing at a local endpoint with fixed resource IDs.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> BackendConfig {
    config_for(Url::parse("http://localhost/v1").unwrap())
}

/// Configuration for an explicit endpoint.
#[must_use]
pub fn config_for(endpoint: Url) -> BackendConfig {
    BackendConfig {
        endpoint,
        platform: "com.example.aora".to_string(),
        project_id: "proj".to_string(),
        database_id: DATABASE_ID.to_string(),
        user_collection_id: USER_COLLECTION_ID.to_string(),
        video_collection_id: VIDEO_COLLECTION_ID.to_string(),
        storage_id: "files".to_string(),
    }
}

/// Build a backend over a fake remote.
#[must_use]
pub fn backend_with(remote: &Arc<FakeRemote>) -> Backend {
    Backend::with_remote(test_config(), Arc::clone(remote) as Arc<dyn RemoteService>)
}

/// A remote call, as recorded by [`FakeRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Call {
    CreateAccount { email: String, name: String },
    CreateSession { email: String },
    CreateDocument { collection_id: String },
    GetAccount,
    ListDocuments { collection_id: String },
}

struct StoredAccount {
    account: Account,
    password: String,
}

#[derive(Default)]
struct FakeState {
    accounts: Vec<StoredAccount>,
    session: Option<AccountId>,
    collections: HashMap<String, Vec<Document>>,
    calls: Vec<Call>,
    ticks: i64,
    empty_account: bool,
    empty_document: bool,
    fail_sign_in: bool,
    fail_create_document: bool,
    fail_list: bool,
}

impl FakeState {
    /// Monotonic creation timestamps, one second apart.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
            + Duration::seconds(self.ticks)
    }

    fn store_document(&mut self, collection_id: &str, id: DocumentId, data: Value) -> Document {
        let created_at = self.next_timestamp();
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let document = Document {
            id,
            collection_id: collection_id.to_string(),
            database_id: DATABASE_ID.to_string(),
            created_at: Some(created_at),
            updated_at: Some(created_at),
            permissions: Vec::new(),
            data,
        };
        self.collections
            .entry(collection_id.to_string())
            .or_default()
            .push(document.clone());
        document
    }
}

/// In-memory stand-in for the remote service.
pub struct FakeRemote {
    endpoint: Url,
    state: Mutex<FakeState>,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: test_config().endpoint,
            state: Mutex::new(FakeState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account directly, without recording a call.
    pub fn add_account(&self, email: &str, password: &str, name: &str) -> AccountId {
        let mut state = self.state();
        let created_at = state.next_timestamp();
        let id = AccountId::unique();
        state.accounts.push(StoredAccount {
            account: Account {
                id: id.clone(),
                email: email.to_string(),
                name: name.to_string(),
                email_verification: false,
                created_at: Some(created_at),
            },
            password: password.to_string(),
        });
        id
    }

    /// Bind the session to an account directly, without recording a call.
    pub fn set_session(&self, account_id: Option<AccountId>) {
        self.state().session = account_id;
    }

    /// Insert a document directly, without recording a call. Later inserts
    /// are newer.
    pub fn insert_document(&self, collection_id: &str, data: Value) -> Document {
        self.state()
            .store_document(collection_id, DocumentId::unique(), data)
    }

    /// All documents in a collection, oldest first.
    #[must_use]
    pub fn documents(&self, collection_id: &str) -> Vec<Document> {
        self.state()
            .collections
            .get(collection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All accounts registered so far.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.state()
            .accounts
            .iter()
            .map(|stored| stored.account.clone())
            .collect()
    }

    /// Account the session is bound to.
    #[must_use]
    pub fn session(&self) -> Option<AccountId> {
        self.state().session.clone()
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Answer account creation without an account object.
    pub fn answer_empty_account(&self, on: bool) {
        self.state().empty_account = on;
    }

    /// Answer document creation without a document object.
    pub fn answer_empty_document(&self, on: bool) {
        self.state().empty_document = on;
    }

    /// Reject every sign-in with a server error.
    pub fn fail_sign_in(&self, on: bool) {
        self.state().fail_sign_in = on;
    }

    /// Reject every document creation with a server error.
    pub fn fail_create_document(&self, on: bool) {
        self.state().fail_create_document = on;
    }

    /// Reject every document listing with a server error.
    pub fn fail_list(&self, on: bool) {
        self.state().fail_list = on;
    }
}

fn api_error(status: u16, kind: &str, message: &str) -> RemoteError {
    RemoteError::Api {
        status,
        kind: kind.to_string(),
        message: message.to_string(),
    }
}

fn matches_query(document: &Document, query: &Query) -> bool {
    match query {
        Query::Equal { attribute, values } => match attribute.as_str() {
            "$id" => values
                .iter()
                .any(|v| v.as_str() == Some(document.id.as_str())),
            _ => document
                .data
                .get(attribute)
                .is_some_and(|field| values.contains(field)),
        },
        Query::OrderAsc(_) | Query::OrderDesc(_) | Query::Limit(_) => true,
    }
}

fn sort_key(document: &Document, attribute: &str) -> String {
    match attribute {
        "$createdAt" => document
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        "$id" => document.id.to_string(),
        _ => document
            .data
            .get(attribute)
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

#[async_trait]
impl RemoteService for FakeRemote {
    async fn create_account(
        &self,
        id: &AccountId,
        email: &Email,
        password: &SecretString,
        name: &str,
    ) -> Result<Option<Account>, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::CreateAccount {
            email: email.to_string(),
            name: name.to_string(),
        });

        if state.empty_account {
            return Ok(None);
        }
        if password.expose_secret().len() < 8 {
            return Err(api_error(
                400,
                "general_argument_invalid",
                "Invalid `password` param: Password must be between 8 and 256 characters long.",
            ));
        }
        if state
            .accounts
            .iter()
            .any(|stored| stored.account.email == email.as_str())
        {
            return Err(api_error(
                409,
                "user_already_exists",
                "A user with the same id, email, or phone already exists in this project.",
            ));
        }

        let created_at = state.next_timestamp();
        let account = Account {
            id: id.clone(),
            email: email.to_string(),
            name: name.to_string(),
            email_verification: false,
            created_at: Some(created_at),
        };
        state.accounts.push(StoredAccount {
            account: account.clone(),
            password: password.expose_secret().to_string(),
        });
        Ok(Some(account))
    }

    fn initials_avatar_url(&self, name: &str) -> String {
        initials_url(&self.endpoint, "proj", name)
    }

    async fn create_email_password_session(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::CreateSession {
            email: email.to_string(),
        });

        if state.fail_sign_in {
            return Err(api_error(503, "general_unknown", "Service unavailable"));
        }

        let account_id = state
            .accounts
            .iter()
            .find(|stored| {
                stored.account.email == email.as_str()
                    && stored.password == password.expose_secret()
            })
            .map(|stored| stored.account.id.clone())
            .ok_or_else(|| {
                api_error(
                    401,
                    "user_invalid_credentials",
                    "Invalid credentials. Please check the email and password.",
                )
            })?;

        state.session = Some(account_id.clone());
        let expire = state.next_timestamp() + Duration::days(365);
        Ok(Session {
            id: SessionId::unique(),
            account_id,
            expire: Some(expire),
            provider: "email".to_string(),
            current: true,
        })
    }

    async fn create_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        id: &DocumentId,
        data: Value,
    ) -> Result<Option<Document>, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::CreateDocument {
            collection_id: collection_id.to_string(),
        });

        if state.fail_create_document {
            return Err(api_error(500, "general_server_error", "Server Error"));
        }
        if state.session.is_none() {
            return Err(api_error(
                401,
                "user_unauthorized",
                "The current user is not authorized to perform the requested action.",
            ));
        }

        let document = state.store_document(collection_id, id.clone(), data);
        if state.empty_document {
            return Ok(None);
        }
        Ok(Some(document))
    }

    async fn get_account(&self) -> Result<Option<Account>, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::GetAccount);

        let Some(session) = state.session.clone() else {
            return Ok(None);
        };
        Ok(state
            .accounts
            .iter()
            .find(|stored| stored.account.id == session)
            .map(|stored| stored.account.clone()))
    }

    async fn list_documents(
        &self,
        _database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::ListDocuments {
            collection_id: collection_id.to_string(),
        });

        if state.fail_list {
            return Err(api_error(500, "general_server_error", "Server Error"));
        }

        let mut documents: Vec<Document> = state
            .collections
            .get(collection_id)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| queries.iter().all(|q| matches_query(doc, q)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let total = u64::try_from(documents.len()).unwrap_or(u64::MAX);

        for query in queries {
            match query {
                Query::OrderAsc(attribute) => {
                    documents.sort_by_cached_key(|doc| sort_key(doc, attribute));
                }
                Query::OrderDesc(attribute) => {
                    documents.sort_by_cached_key(|doc| sort_key(doc, attribute));
                    documents.reverse();
                }
                Query::Limit(limit) => {
                    documents.truncate(usize::try_from(*limit).unwrap_or(usize::MAX));
                }
                Query::Equal { .. } => {}
            }
        }

        Ok(DocumentList { total, documents })
    }
}
