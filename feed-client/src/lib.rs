pub mod api;
pub mod retry;

#[cfg(test)]
mod tests;

pub use api::FeedApiClient;
pub use retry::{CircuitBreakerState, RetryConfig, RetryExecutor, RetryMetrics};

use finder_core::{CoreError, FeedResponse};

/// A provider of grouped post feeds.
pub trait FeedSource {
    /// Full dataset (`GET /posts`).
    async fn fetch_all(&self) -> Result<FeedResponse, CoreError>;

    /// Dataset pre-filtered by the posts service (`GET /:query`).
    async fn fetch_query(&self, query: &str) -> Result<FeedResponse, CoreError>;

    /// Results from the independent search index (`GET /search?q=`).
    async fn search(&self, query: &str) -> Result<FeedResponse, CoreError>;
}
