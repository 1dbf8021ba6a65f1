//! Integration tests for the Appwrite HTTP client.
//!
//! Each test starts a small axum server on an ephemeral port that answers
//! the endpoints the client uses and records what it received.
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use aora_backend::appwrite::{AppwriteClient, Query, RemoteError, RemoteService};
use aora_core::{AccountId, DocumentId, Email};
use aora_integration_tests::{DATABASE_ID, USER_COLLECTION_ID, config_for};

const SESSION_COOKIE: &str = r#"{"a_session_proj":"token-123"}"#;

#[derive(Clone, Default)]
struct Recorded {
    headers: Arc<Mutex<Vec<HeaderMap>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn push(&self, headers: &HeaderMap) {
        self.headers.lock().unwrap().push(headers.clone());
    }

    fn last_headers(&self) -> HeaderMap {
        self.headers.lock().unwrap().last().cloned().unwrap()
    }
}

fn account_json() -> Value {
    json!({
        "$id": "acc-1",
        "$createdAt": "2024-06-01T12:00:00.000+00:00",
        "name": "alice",
        "email": "a@x.io",
        "emailVerification": false,
    })
}

async fn create_account(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorded.push(&headers);
    if body["name"] == "empty" {
        return (StatusCode::CREATED, "").into_response();
    }
    if body["email"] == "taken@x.io" {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "message": "A user with the same id, email, or phone already exists.",
                "code": 409,
                "type": "user_already_exists",
            })),
        )
            .into_response();
    }
    let mut account = account_json();
    account["$id"] = body["userId"].clone();
    (StatusCode::CREATED, Json(account)).into_response()
}

async fn create_session(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorded.push(&headers);
    if body["password"] != "Secret123" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "message": "Invalid credentials.",
                "code": 401,
                "type": "user_invalid_credentials",
            })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        [("X-Fallback-Cookies", SESSION_COOKIE)],
        Json(json!({
            "$id": "sess-1",
            "userId": "acc-1",
            "expire": "2025-06-01T12:00:00.000+00:00",
            "provider": "email",
            "current": true,
        })),
    )
        .into_response()
}

async fn get_account(State(recorded): State<Recorded>, headers: HeaderMap) -> Response {
    recorded.push(&headers);
    let has_session = headers
        .get("X-Fallback-Cookies")
        .is_some_and(|v| v.as_bytes() == SESSION_COOKIE.as_bytes());
    if !has_session {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "message": "User (role: guests) missing scope (account)",
                "code": 401,
                "type": "general_unauthorized_scope",
            })),
        )
            .into_response();
    }
    Json(account_json()).into_response()
}

async fn create_document(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorded.push(&headers);
    let mut document = body["data"].clone();
    document["$id"] = body["documentId"].clone();
    document["$collectionId"] = json!(USER_COLLECTION_ID);
    document["$databaseId"] = json!(DATABASE_ID);
    document["$createdAt"] = json!("2024-06-01T12:00:01.000+00:00");
    (StatusCode::CREATED, Json(document)).into_response()
}

async fn list_documents(
    State(recorded): State<Recorded>,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    let pairs: Vec<String> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == "queries[]")
        .map(|(_, value)| value.into_owned())
        .collect();
    recorded.queries.lock().unwrap().extend(pairs);
    Json(json!({ "total": 0, "documents": [] }))
}

async fn start_server() -> (AppwriteClient, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v1/account", post(create_account).get(get_account))
        .route("/v1/account/sessions/email", post(create_session))
        .route(
            "/v1/databases/{database_id}/collections/{collection_id}/documents",
            post(create_document).get(list_documents),
        )
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let endpoint = Url::parse(&format!("http://{addr}/v1")).unwrap();
    let client = AppwriteClient::new(&config_for(endpoint)).unwrap();
    (client, recorded)
}

fn email(s: &str) -> Email {
    Email::parse(s).unwrap()
}

#[tokio::test]
async fn test_requests_carry_project_headers() {
    let (client, recorded) = start_server().await;

    client.get_account().await.unwrap();

    let headers = recorded.last_headers();
    assert_eq!(headers["x-appwrite-project"], "proj");
    assert_eq!(headers["x-appwrite-response-format"], "1.5.0");
    assert_eq!(headers["origin"], "appwrite-android://com.example.aora");
    assert!(headers.get("x-fallback-cookies").is_none());
}

#[tokio::test]
async fn test_session_is_replayed_after_sign_in() {
    let (client, recorded) = start_server().await;

    assert!(client.get_account().await.unwrap().is_none());
    assert!(!client.has_session());

    let session = client
        .create_email_password_session(&email("a@x.io"), &SecretString::from("Secret123"))
        .await
        .unwrap();
    assert_eq!(session.account_id.as_str(), "acc-1");
    assert!(client.has_session());

    let account = client.get_account().await.unwrap().unwrap();
    assert_eq!(account.id.as_str(), "acc-1");
    assert_eq!(account.name, "alice");
    assert_eq!(recorded.last_headers()["x-fallback-cookies"], SESSION_COOKIE);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let (client, _recorded) = start_server().await;

    let err = client
        .create_email_password_session(&email("a@x.io"), &SecretString::from("nope"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RemoteError::Api { status: 401, ref kind, .. } if kind == "user_invalid_credentials"
    ));
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_create_account_decodes_result() {
    let (client, _recorded) = start_server().await;
    let id = AccountId::new("acc-42");

    let account = client
        .create_account(&id, &email("a@x.io"), &SecretString::from("Secret123"), "alice")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(account.id, id);
}

#[tokio::test]
async fn test_create_account_empty_body() {
    let (client, _recorded) = start_server().await;

    let account = client
        .create_account(
            &AccountId::unique(),
            &email("a@x.io"),
            &SecretString::from("Secret123"),
            "empty",
        )
        .await
        .unwrap();

    assert!(account.is_none());
}

#[tokio::test]
async fn test_create_account_conflict() {
    let (client, _recorded) = start_server().await;

    let err = client
        .create_account(
            &AccountId::unique(),
            &email("taken@x.io"),
            &SecretString::from("Secret123"),
            "alice",
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn test_create_document_wraps_data() {
    let (client, _recorded) = start_server().await;
    let id = DocumentId::new("doc-1");

    let document = client
        .create_document(
            DATABASE_ID,
            USER_COLLECTION_ID,
            &id,
            json!({ "accountId": "acc-1", "username": "alice" }),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(document.id, id);
    assert_eq!(document.collection_id, USER_COLLECTION_ID);
    assert_eq!(document.optional_str("username"), Some("alice"));
}

#[tokio::test]
async fn test_list_documents_sends_queries() {
    let (client, recorded) = start_server().await;

    let list = client
        .list_documents(
            DATABASE_ID,
            USER_COLLECTION_ID,
            &[
                Query::equal("accountId", "acc-1"),
                Query::OrderAsc("$createdAt".to_string()),
                Query::Limit(1),
            ],
        )
        .await
        .unwrap();
    assert_eq!(list.total, 0);

    let sent: Vec<Value> = recorded
        .queries
        .lock()
        .unwrap()
        .iter()
        .map(|q| serde_json::from_str(q).unwrap())
        .collect();
    assert_eq!(
        sent,
        vec![
            json!({ "method": "equal", "attribute": "accountId", "values": ["acc-1"] }),
            json!({ "method": "orderAsc", "attribute": "$createdAt" }),
            json!({ "method": "limit", "values": [1] }),
        ]
    );
}
