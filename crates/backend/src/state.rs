//! Backend handle shared by every caller.

use std::sync::Arc;

use crate::appwrite::{AppwriteClient, RemoteError, RemoteService};
use crate::config::BackendConfig;
use crate::services::{AccountService, TrendingService};

/// Handle to the remote service and the services built on it.
///
/// This struct is cheaply cloneable via `Arc`. Every clone shares one
/// remote client, so a sign-in through one clone is visible to all.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    config: BackendConfig,
    accounts: AccountService,
    trending: TrendingService,
}

impl Backend {
    /// Create a backend talking to Appwrite over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built from the
    /// configuration.
    pub fn new(config: BackendConfig) -> Result<Self, RemoteError> {
        let client = AppwriteClient::new(&config)?;
        Ok(Self::with_remote(config, Arc::new(client)))
    }

    /// Create a backend over any remote service implementation.
    #[must_use]
    pub fn with_remote(config: BackendConfig, remote: Arc<dyn RemoteService>) -> Self {
        let accounts = AccountService::new(Arc::clone(&remote), &config);
        let trending = TrendingService::new(remote, &config);

        tracing::debug!(
            endpoint = %config.endpoint,
            project_id = %config.project_id,
            "Backend initialized"
        );

        Self {
            inner: Arc::new(BackendInner {
                config,
                accounts,
                trending,
            }),
        }
    }

    /// Get a reference to the backend configuration.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Get the account provisioning service.
    #[must_use]
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    /// Get the trending feed.
    #[must_use]
    pub fn trending(&self) -> &TrendingService {
        &self.inner.trending
    }
}
