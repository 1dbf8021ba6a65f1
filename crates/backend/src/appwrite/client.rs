//! Appwrite REST API client.
//!
//! Mirrors what the mobile SDK does: every request carries the project and
//! response-format headers, and the session credential handed back in the
//! `X-Fallback-Cookies` header is replayed on subsequent requests.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use aora_core::{Account, AccountId, Document, DocumentId, Email, Session};

use super::{DocumentList, Query, RemoteError, RemoteService, initials_url};
use crate::config::BackendConfig;

/// Response format the client is written against.
const RESPONSE_FORMAT: &str = "1.5.0";

/// Header carrying the session credential for non-browser clients.
const FALLBACK_COOKIES: &str = "X-Fallback-Cookies";

/// Origin scheme the service expects for registered mobile platforms.
const PLATFORM_ORIGIN_SCHEME: &str = "appwrite-android";

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
}

// =============================================================================
// AppwriteClient
// =============================================================================

/// Client for the Appwrite REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Clone)]
pub struct AppwriteClient {
    inner: Arc<AppwriteClientInner>,
}

struct AppwriteClientInner {
    client: reqwest::Client,
    endpoint: Url,
    project_id: String,
    session: RwLock<Option<HeaderValue>>,
}

impl AppwriteClient {
    /// Create a new Appwrite API client.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Header` if the project or platform ID cannot be
    /// sent as a header, or `RemoteError::Http` if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id)
                .map_err(|_| RemoteError::Header("X-Appwrite-Project"))?,
        );
        headers.insert(
            "X-Appwrite-Response-Format",
            HeaderValue::from_static(RESPONSE_FORMAT),
        );
        headers.insert(
            "Origin",
            HeaderValue::from_str(&format!("{PLATFORM_ORIGIN_SCHEME}://{}", config.platform))
                .map_err(|_| RemoteError::Header("Origin"))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(AppwriteClientInner {
                client,
                endpoint: config.endpoint.clone(),
                project_id: config.project_id.clone(),
                session: RwLock::new(None),
            }),
        })
    }

    /// Whether a session credential is currently held.
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.session_header().is_some()
    }

    /// Forget the held session credential.
    pub fn clear_session(&self) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn session_header(&self) -> Option<HeaderValue> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_session(&self, value: HeaderValue) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Build an endpoint URL from path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.inner.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Url(self.inner.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the status and raw body.
    ///
    /// Any session credential in the response replaces the held one.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<(StatusCode, String), RemoteError> {
        let mut request = self.inner.client.request(method, url);
        if let Some(session) = self.session_header() {
            request = request.header(FALLBACK_COOKIES, session);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if let Some(cookies) = response.headers().get(FALLBACK_COOKIES) {
            debug!("Session credential received");
            self.store_session(cookies.clone());
        }

        let text = response.text().await?;
        Ok((status, text))
    }

    /// Send a request and fail on non-success statuses.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<String, RemoteError> {
        let (status, text) = self.send(method, url, body).await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(api_error(status, &text))
        }
    }
}

/// Convert an error response into `RemoteError::Api`.
fn api_error(status: StatusCode, body: &str) -> RemoteError {
    let (kind, message) = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => (parsed.kind, parsed.message),
        Err(_) => (
            String::from("unknown"),
            body.chars().take(200).collect::<String>(),
        ),
    };

    tracing::warn!(
        status = %status,
        kind = %kind,
        "Appwrite API returned non-success status"
    );

    RemoteError::Api {
        status: status.as_u16(),
        kind,
        message,
    }
}

/// Decode a body that may legitimately be empty or `null`.
fn decode_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>, RemoteError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[async_trait]
impl RemoteService for AppwriteClient {
    #[instrument(
        skip(self, id, email, password, name),
        fields(account_id = %id, email = %email.masked())
    )]
    async fn create_account(
        &self,
        id: &AccountId,
        email: &Email,
        password: &SecretString,
        name: &str,
    ) -> Result<Option<Account>, RemoteError> {
        let body = serde_json::json!({
            "userId": id,
            "email": email,
            "password": password.expose_secret(),
            "name": name,
        });

        let text = self
            .execute(Method::POST, self.url(&["account"])?, Some(&body))
            .await?;
        decode_optional(&text)
    }

    fn initials_avatar_url(&self, name: &str) -> String {
        initials_url(&self.inner.endpoint, &self.inner.project_id, name)
    }

    #[instrument(skip(self, email, password), fields(email = %email.masked()))]
    async fn create_email_password_session(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, RemoteError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let text = self
            .execute(
                Method::POST,
                self.url(&["account", "sessions", "email"])?,
                Some(&body),
            )
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    #[instrument(skip(self, id, data), fields(document_id = %id))]
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        id: &DocumentId,
        data: serde_json::Value,
    ) -> Result<Option<Document>, RemoteError> {
        let body = serde_json::json!({
            "documentId": id,
            "data": data,
        });

        let url = self.url(&[
            "databases",
            database_id,
            "collections",
            collection_id,
            "documents",
        ])?;
        let text = self.execute(Method::POST, url, Some(&body)).await?;
        decode_optional(&text)
    }

    #[instrument(skip(self))]
    async fn get_account(&self) -> Result<Option<Account>, RemoteError> {
        let (status, text) = self
            .send(Method::GET, self.url(&["account"])?, None)
            .await?;

        if status == StatusCode::UNAUTHORIZED {
            debug!("No active session");
            self.clear_session();
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        decode_optional(&text)
    }

    #[instrument(skip(self, queries), fields(query_count = queries.len()))]
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, RemoteError> {
        let mut url = self.url(&[
            "databases",
            database_id,
            "collections",
            collection_id,
            "documents",
        ])?;
        if !queries.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for query in queries {
                pairs.append_pair("queries[]", &query.to_query_string());
            }
        }

        let text = self.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&text)?)
    }
}
