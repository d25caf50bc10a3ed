#[cfg(test)]
mod tests {
    use crate::{FeedApiClient, FeedSource, RetryConfig};
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use finder_core::{CoreError, FeedApiError};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            jitter_factor: 0.0,
            ..Default::default()
        }
    }

    fn client_for(base: &str) -> FeedApiClient {
        FeedApiClient::new(base, base, Duration::from_secs(5), fast_retry()).unwrap()
    }

    fn feed(group_name: &str, authors: &[&str]) -> Value {
        let posts: Vec<Value> = authors
            .iter()
            .map(|a| json!({ "author": a, "text": format!("post by {a}"), "postLink": format!("https://fb.test/{a}") }))
            .collect();
        json!({
            "scrapedAt": "2024-01-05T10:00:00Z",
            "groups": [{ "groupName": group_name, "scrapedAt": "2024-01-04", "posts": posts }]
        })
    }

    fn feed_router() -> Router {
        Router::new()
            .route("/posts", get(|| async { Json(feed("all", &["a", "b", "c"])) }))
            .route(
                "/search",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let q = params.get("q").cloned().unwrap_or_default();
                    Json(feed(&format!("search:{q}"), &["s"]))
                }),
            )
            .route(
                "/{query}",
                get(|Path(query): Path<String>| async move {
                    Json(feed(&format!("query:{query}"), &["q1", "q2"]))
                }),
            )
    }

    #[tokio::test]
    async fn test_fetch_all() {
        let base = spawn_stub(feed_router()).await;
        let client = client_for(&base);

        let response = client.fetch_all().await.unwrap();
        assert_eq!(response.groups.len(), 1);
        assert_eq!(response.groups[0].group_name, "all");
        assert_eq!(response.post_count(), 3);
        assert_eq!(response.groups[0].posts[1].author, "b");
    }

    #[tokio::test]
    async fn test_fetch_query_sends_raw_term_as_path() {
        let base = spawn_stub(feed_router()).await;
        let client = client_for(&base);

        let response = client.fetch_query("ลีโอ ขายส่ง").await.unwrap();
        assert_eq!(response.groups[0].group_name, "query:ลีโอ ขายส่ง");
        assert_eq!(response.post_count(), 2);
    }

    #[tokio::test]
    async fn test_search_sends_query_parameter() {
        let base = spawn_stub(feed_router()).await;
        let client = client_for(&base);

        let response = client.search("chang & leo").await.unwrap();
        assert_eq!(response.groups[0].group_name, "search:chang & leo");
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/posts",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::NOT_FOUND
                }
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let result = client.fetch_all().await;
        assert!(matches!(
            result,
            Err(CoreError::FeedApi(FeedApiError::NotFound { .. }))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/search",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        );
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let result = client.search("leo").await;
        assert!(matches!(
            result,
            Err(CoreError::FeedApi(FeedApiError::ServerError {
                status_code: 503,
                ..
            }))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(client.search_retry_metrics().failed_operations, 1);
        assert_eq!(client.posts_retry_metrics().failed_operations, 0);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let router = Router::new().route("/posts", get(|| async { "<html>oops</html>" }));
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        let result = client.fetch_all().await;
        assert!(matches!(
            result,
            Err(CoreError::FeedApi(FeedApiError::InvalidResponse { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = client_for(&base);
        let result = client.fetch_all().await;
        assert!(matches!(
            result,
            Err(CoreError::FeedApi(FeedApiError::EndpointUnavailable { .. }))
        ));
    }
}
