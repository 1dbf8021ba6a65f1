//! Trending video feed.
//!
//! Lists the newest posts from the videos collection. Listings are cached
//! with `moka` for a minute so repeated renders of the trending list don't
//! hit the remote service each time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use aora_core::{DocumentError, VideoPost};

use crate::appwrite::{Query, RemoteError, RemoteService};
use crate::config::BackendConfig;

/// Largest page the feed will request.
pub const MAX_LIMIT: u32 = 100;

/// How long a listing stays cached.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Errors that can occur when loading the feed.
#[derive(Debug, Error)]
pub enum TrendingError {
    /// Listing the videos collection failed.
    #[error("list_videos failed: {0}")]
    Remote(#[from] RemoteError),

    /// A post could not be decoded.
    #[error("malformed video post: {0}")]
    MalformedDocument(#[from] DocumentError),
}

/// Trending video feed.
#[derive(Clone)]
pub struct TrendingService {
    remote: Arc<dyn RemoteService>,
    database_id: String,
    collection_id: String,
    cache: Cache<u32, Arc<Vec<VideoPost>>>,
}

impl TrendingService {
    /// Create a new feed over a remote handle.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteService>, config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            remote,
            database_id: config.database_id.clone(),
            collection_id: config.video_collection_id.clone(),
            cache,
        }
    }

    /// Get the newest posts, at most `limit` (clamped to `1..=100`).
    ///
    /// # Errors
    ///
    /// Returns `TrendingError::Remote` if the listing fails, or
    /// `TrendingError::MalformedDocument` if any post is unreadable.
    #[instrument(skip(self))]
    pub async fn latest(&self, limit: u32) -> Result<Arc<Vec<VideoPost>>, TrendingError> {
        let limit = limit.clamp(1, MAX_LIMIT);

        if let Some(posts) = self.cache.get(&limit).await {
            debug!("Cache hit for trending posts");
            return Ok(posts);
        }

        let queries = [
            Query::OrderDesc("$createdAt".to_string()),
            Query::Limit(limit),
        ];
        let list = self
            .remote
            .list_documents(&self.database_id, &self.collection_id, &queries)
            .await?;

        let posts = list
            .documents
            .iter()
            .map(VideoPost::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let posts = Arc::new(posts);

        self.cache.insert(limit, Arc::clone(&posts)).await;
        Ok(posts)
    }

    /// Drop every cached listing.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
