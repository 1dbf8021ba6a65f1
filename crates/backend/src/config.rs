//! Backend configuration loaded from environment variables.
//!
//! The values are read once at startup and never re-read.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AORA_PLATFORM` - Platform identifier registered with the project (e.g., com.jsm.aora)
//! - `AORA_PROJECT_ID` - Appwrite project ID
//! - `AORA_DATABASE_ID` - Database holding the application collections
//! - `AORA_USER_COLLECTION_ID` - Collection of profile records
//! - `AORA_VIDEO_COLLECTION_ID` - Collection of video posts
//! - `AORA_STORAGE_ID` - Storage bucket for uploaded media
//!
//! ## Optional
//! - `AORA_ENDPOINT` - API endpoint (default: <https://cloud.appwrite.io/v1>)

use thiserror::Error;
use url::Url;

/// Default Appwrite Cloud endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection settings and resource identifiers for the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// API endpoint, including the version path (e.g., `https://cloud.appwrite.io/v1`)
    pub endpoint: Url,
    /// Platform identifier registered with the project
    pub platform: String,
    /// Project ID
    pub project_id: String,
    /// Database ID
    pub database_id: String,
    /// Profile record collection ID
    pub user_collection_id: String,
    /// Video post collection ID
    pub video_collection_id: String,
    /// Storage bucket ID
    pub storage_id: String,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or the
    /// endpoint is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let endpoint = parse_endpoint(
            "AORA_ENDPOINT",
            &get_env_or_default("AORA_ENDPOINT", DEFAULT_ENDPOINT),
        )?;

        Ok(Self {
            endpoint,
            platform: get_required_env("AORA_PLATFORM")?,
            project_id: get_required_env("AORA_PROJECT_ID")?,
            database_id: get_required_env("AORA_DATABASE_ID")?,
            user_collection_id: get_required_env("AORA_USER_COLLECTION_ID")?,
            video_collection_id: get_required_env("AORA_VIDEO_COLLECTION_ID")?,
            storage_id: get_required_env("AORA_STORAGE_ID")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required, non-blank environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the API endpoint, which must be an absolute http(s) URL.
///
/// A trailing slash is removed so paths can be appended segment by segment.
fn parse_endpoint(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim().trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "endpoint must include a host".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_default() {
        let url = parse_endpoint("AORA_ENDPOINT", DEFAULT_ENDPOINT).unwrap();
        assert_eq!(url.as_str(), "https://cloud.appwrite.io/v1");
    }

    #[test]
    fn test_parse_endpoint_strips_trailing_slash() {
        let url = parse_endpoint("AORA_ENDPOINT", "http://localhost:8080/v1/").unwrap();
        assert_eq!(url.path(), "/v1");
    }

    #[test]
    fn test_parse_endpoint_rejects_other_schemes() {
        let err = parse_endpoint("AORA_ENDPOINT", "ftp://example.com/v1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "AORA_ENDPOINT"));
    }

    #[test]
    fn test_parse_endpoint_rejects_garbage() {
        assert!(parse_endpoint("AORA_ENDPOINT", "not a url").is_err());
    }

    #[test]
    fn test_missing_required_env() {
        let err = get_required_env("AORA_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: AORA_TEST_SURELY_UNSET_VARIABLE"
        );
    }

    #[test]
    fn test_env_or_default_falls_back() {
        assert_eq!(
            get_env_or_default("AORA_TEST_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
