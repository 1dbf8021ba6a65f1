//! Trending feed command.

use tracing::info;

use aora_backend::Backend;

use super::account::print_json;

/// Print the newest video posts.
///
/// # Errors
///
/// Returns an error if the listing fails or a post is malformed.
pub async fn latest(backend: &Backend, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let posts = backend.trending().latest(limit).await?;
    info!(count = posts.len(), "Loaded trending posts");
    print_json(posts.as_ref())
}
