use crate::retry::{RetryConfig, RetryExecutor, RetryMetrics};
use crate::FeedSource;
use finder_core::{AppConfig, ConfigError, CoreError, FeedApiError, FeedResponse};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("distributor-finder/", env!("CARGO_PKG_VERSION"));

/// Client for the two post services: the posts service (`/posts` and
/// `/:query`) and the independent search index (`/search?q=`).
#[derive(Debug)]
pub struct FeedApiClient {
    http_client: Client,
    posts_base: Url,
    search_base: Url,
    posts_retry: RetryExecutor,
    search_retry: RetryExecutor,
}

impl FeedApiClient {
    pub fn new(
        posts_base_url: &str,
        search_base_url: &str,
        timeout: Duration,
        retry_config: RetryConfig,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            posts_base: parse_base_url("posts_base_url", posts_base_url)?,
            search_base: parse_base_url("search_base_url", search_base_url)?,
            posts_retry: RetryExecutor::new("posts service", retry_config.clone()),
            search_retry: RetryExecutor::new("search service", retry_config),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.posts_base_url,
            &config.search_base_url,
            Duration::from_secs(config.request_timeout_secs),
            RetryConfig::from(&config.retry),
        )
    }

    pub fn posts_url(&self) -> Url {
        join_segment(&self.posts_base, "posts")
    }

    /// The raw search term becomes a single, percent-encoded path segment.
    pub fn query_url(&self, query: &str) -> Url {
        join_segment(&self.posts_base, query)
    }

    pub fn search_url(&self, query: &str) -> Url {
        let mut url = join_segment(&self.search_base, "search");
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    async fn get_feed(&self, url: &Url) -> Result<FeedResponse, CoreError> {
        let endpoint = url.to_string();

        info!("Requesting {}", endpoint);
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                error!("Network error for {}: {}", endpoint, e);
                if e.is_timeout() {
                    CoreError::FeedApi(FeedApiError::RequestTimeout {
                        endpoint: endpoint.clone(),
                    })
                } else if e.is_connect() {
                    CoreError::FeedApi(FeedApiError::EndpointUnavailable {
                        endpoint: endpoint.clone(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Request failed with status {} for {}", status, endpoint);
            return Err(status_error(status, endpoint).into());
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                CoreError::FeedApi(FeedApiError::RequestTimeout {
                    endpoint: endpoint.clone(),
                })
            } else {
                CoreError::Network(e)
            }
        })?;

        let feed: FeedResponse = serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to parse feed from {}: {}", endpoint, e);
            CoreError::FeedApi(FeedApiError::InvalidResponse {
                endpoint: endpoint.clone(),
                details: e.to_string(),
            })
        })?;

        debug!(
            "Received {} groups / {} posts from {}",
            feed.groups.len(),
            feed.post_count(),
            endpoint
        );
        Ok(feed)
    }

    pub fn posts_retry_metrics(&self) -> RetryMetrics {
        self.posts_retry.get_metrics()
    }

    pub fn search_retry_metrics(&self) -> RetryMetrics {
        self.search_retry.get_metrics()
    }
}

impl FeedSource for FeedApiClient {
    async fn fetch_all(&self) -> Result<FeedResponse, CoreError> {
        let url = self.posts_url();
        self.posts_retry
            .execute("fetch all posts", || self.get_feed(&url))
            .await
    }

    async fn fetch_query(&self, query: &str) -> Result<FeedResponse, CoreError> {
        if is_dot_segment(query) {
            // The URL parser resolves these, which would request the service root.
            return Err(CoreError::InvalidInput {
                message: format!("'{}' cannot be sent as a path segment", query),
            });
        }
        let url = self.query_url(query);
        self.posts_retry
            .execute("fetch posts for query", || self.get_feed(&url))
            .await
    }

    async fn search(&self, query: &str) -> Result<FeedResponse, CoreError> {
        let url = self.search_url(query);
        self.search_retry
            .execute("search index", || self.get_feed(&url))
            .await
    }
}

fn parse_base_url(field: &str, value: &str) -> Result<Url, CoreError> {
    Url::parse(value).map_err(|_| {
        CoreError::Config(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
    })
}

/// `.` and `..`, also in percent-encoded form.
fn is_dot_segment(segment: &str) -> bool {
    let normalized = segment.to_ascii_lowercase().replace("%2e", ".");
    normalized == "." || normalized == ".."
}

fn join_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

fn status_error(status: StatusCode, endpoint: String) -> FeedApiError {
    match status.as_u16() {
        404 => FeedApiError::NotFound { endpoint },
        code if status.is_server_error() => FeedApiError::ServerError {
            endpoint,
            status_code: code,
        },
        code => FeedApiError::ClientError {
            endpoint,
            status_code: code,
        },
    }
}
