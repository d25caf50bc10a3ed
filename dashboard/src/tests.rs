#[cfg(test)]
mod tests {
    use crate::{Dashboard, LoadState, LOAD_ERROR_MESSAGE};
    use database::{Database, SearchHistory, LAST_SEARCH_TERM_KEY};
    use feed_client::FeedSource;
    use finder_core::{
        AppConfig, CoreError, FeedApiError, FeedResponse, Group, Post, SearchMode, Timestamp,
    };
    use std::collections::HashSet;
    use std::env;
    use std::sync::Mutex;

    struct FakeSource {
        all: Result<FeedResponse, FeedApiError>,
        by_query: Result<FeedResponse, FeedApiError>,
        by_index: Result<FeedResponse, FeedApiError>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(all: FeedResponse) -> Self {
            Self {
                all: Ok(all),
                by_query: Ok(FeedResponse::default()),
                by_index: Ok(FeedResponse::default()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FeedSource for FakeSource {
        async fn fetch_all(&self) -> Result<FeedResponse, CoreError> {
            self.log("all".to_string());
            self.all.clone().map_err(CoreError::from)
        }

        async fn fetch_query(&self, query: &str) -> Result<FeedResponse, CoreError> {
            self.log(format!("query:{query}"));
            self.by_query.clone().map_err(CoreError::from)
        }

        async fn search(&self, query: &str) -> Result<FeedResponse, CoreError> {
            self.log(format!("search:{query}"));
            self.by_index.clone().map_err(CoreError::from)
        }
    }

    fn post(author: &str, text: &str, link: &str) -> Post {
        Post {
            author: author.to_string(),
            text: text.to_string(),
            post_link: Some(link.to_string()),
            ..Default::default()
        }
    }

    fn feed(scraped_at: &str, posts: Vec<Post>) -> FeedResponse {
        FeedResponse {
            groups: vec![Group {
                group_name: "ขายส่งเบียร์".to_string(),
                scraped_at: Some(Timestamp::from(scraped_at)),
                last_updated: None,
                posts,
            }],
            ..Default::default()
        }
    }

    fn base_feed() -> FeedResponse {
        feed(
            "2024-01-01",
            vec![
                post("a", "leo wholesale", "l1"),
                post("b", "chang retail", "l2"),
            ],
        )
    }

    fn unavailable() -> FeedApiError {
        FeedApiError::EndpointUnavailable {
            endpoint: "http://localhost:3001/search".to_string(),
        }
    }

    fn config(mode: SearchMode) -> AppConfig {
        AppConfig {
            search_mode: mode,
            ..Default::default()
        }
    }

    fn authors(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.author.as_str()).collect()
    }

    async fn temp_history(limit: usize) -> SearchHistory {
        let db_path = env::temp_dir().join(format!(
            "test_dashboard_history_{}.db",
            uuid::Uuid::new_v4()
        ));
        let db = Database::open(format!("sqlite://{}", db_path.display()))
            .await
            .expect("Failed to open test database");
        SearchHistory::load(db, limit).await.unwrap()
    }

    #[tokio::test]
    async fn test_parallel_search_unions_both_sources() {
        let mut source = FakeSource::new(base_feed());
        source.by_query = Ok(feed(
            "2024-01-02",
            vec![post("a", "leo wholesale", "l1"), post("c", "leo cans", "l3")],
        ));
        source.by_index = Ok(feed("2024-01-03", vec![post("d", "leo kegs", "l4")]));

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Parallel));
        dashboard.load().await;
        dashboard.search("leo").await;

        assert_eq!(
            dashboard.source().calls(),
            vec!["all", "query:leo", "search:leo"]
        );
        let app = dashboard.app();
        assert!(!app.is_search_in_flight());
        assert_eq!(app.dataset().len(), 4);
        assert_eq!(authors(app.visible()), vec!["d", "a", "c"]);

        let links: HashSet<_> = app.dataset().iter().map(crate::dedup_key).collect();
        assert_eq!(links.len(), app.dataset().len());
    }

    #[tokio::test]
    async fn test_search_degrades_when_a_source_fails() {
        let mut source = FakeSource::new(base_feed());
        source.by_query = Ok(feed("2024-01-02", vec![post("c", "leo cans", "l3")]));
        source.by_index = Err(unavailable());

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Parallel));
        dashboard.load().await;
        dashboard.search("leo").await;

        let app = dashboard.app();
        assert_eq!(app.load_state(), &LoadState::Ready);
        assert_eq!(authors(app.visible()), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_search_keeps_local_results_when_both_fail() {
        let mut source = FakeSource::new(base_feed());
        source.by_query = Err(unavailable());
        source.by_index = Err(unavailable());

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Parallel));
        dashboard.load().await;
        dashboard.search("chang").await;

        assert_eq!(authors(dashboard.app().visible()), vec!["b"]);
        assert_eq!(dashboard.app().dataset().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_search_makes_no_remote_calls() {
        let source = FakeSource::new(base_feed());
        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Parallel));
        dashboard.load().await;
        dashboard.search("   ").await;

        assert_eq!(dashboard.source().calls(), vec!["all"]);
        assert_eq!(dashboard.app().visible(), dashboard.app().dataset());
    }

    #[tokio::test]
    async fn test_sequential_search_order() {
        let mut source = FakeSource::new(base_feed());
        source.by_query = Ok(feed("2024-01-02", vec![post("c", "leo cans", "l3")]));
        source.by_index = Ok(feed("2024-01-03", vec![post("d", "leo kegs", "l4")]));

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Sequential));
        dashboard.load().await;
        dashboard.search("leo").await;

        assert_eq!(
            dashboard.source().calls(),
            vec!["all", "query:leo", "search:leo"]
        );
        assert_eq!(authors(dashboard.app().visible()), vec!["d", "c", "a"]);
    }

    #[tokio::test]
    async fn test_sequential_search_skips_follow_up_on_failure() {
        let mut source = FakeSource::new(base_feed());
        source.by_query = Err(unavailable());

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Sequential));
        dashboard.load().await;
        dashboard.search("leo").await;

        assert_eq!(dashboard.source().calls(), vec!["all", "query:leo"]);
        assert_eq!(authors(dashboard.app().visible()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_replace_mode_uses_query_results_only() {
        let mut source = FakeSource::new(base_feed());
        source.by_query = Ok(feed("2024-01-02", vec![post("c", "leo cans", "l3")]));

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Replace));
        dashboard.load().await;
        dashboard.search("leo").await;

        assert_eq!(dashboard.source().calls(), vec!["all", "query:leo"]);
        assert_eq!(authors(dashboard.app().dataset()), vec!["c"]);
    }

    #[tokio::test]
    async fn test_load_failure_shows_error_screen() {
        let mut source = FakeSource::new(FeedResponse::default());
        source.all = Err(FeedApiError::ServerError {
            endpoint: "http://localhost:4000/posts".to_string(),
            status_code: 500,
        });

        let mut dashboard = Dashboard::new(source, None, &config(SearchMode::Parallel));
        dashboard.load().await;

        assert!(matches!(
            dashboard.app().load_state(),
            LoadState::Failed { .. }
        ));
        assert!(dashboard.app().view().contains(LOAD_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_searches_are_saved_to_history() {
        let history = temp_history(10).await;
        let source = FakeSource::new(base_feed());
        let mut dashboard =
            Dashboard::new(source, Some(history), &config(SearchMode::Parallel));
        dashboard.load().await;

        dashboard.search("leo").await;
        dashboard.search(" chang ").await;
        dashboard.search("LEO").await;
        dashboard.search("").await;
        assert_eq!(dashboard.history_terms(), ["LEO", "chang"]);

        assert!(dashboard.remove_history_term("chang").await.unwrap());
        assert_eq!(dashboard.history_terms(), ["LEO"]);

        let db = dashboard.into_history().unwrap().into_database();
        assert_eq!(
            db.get_setting(LAST_SEARCH_TERM_KEY).await.unwrap(),
            Some(String::new())
        );

        // A fresh load sees the persisted list.
        let reloaded = SearchHistory::load(db, 10).await.unwrap();
        assert_eq!(reloaded.terms(), ["LEO"]);
    }

    #[tokio::test]
    async fn test_history_selection_runs_search() {
        let mut history = temp_history(10).await;
        history.add("chang").await.unwrap();
        history.add("leo").await.unwrap();

        let mut dashboard = Dashboard::new(
            FakeSource::new(base_feed()),
            Some(history),
            &config(SearchMode::Parallel),
        );
        dashboard.load().await;

        let term = dashboard.select_history(1).await.unwrap();
        assert_eq!(term, "chang");
        assert_eq!(dashboard.app().query().term, "chang");
        assert_eq!(authors(dashboard.app().visible()), vec!["b"]);
        assert!(dashboard
            .source()
            .calls()
            .contains(&"query:chang".to_string()));
        assert_eq!(dashboard.history_terms(), ["chang", "leo"]);
    }

    #[tokio::test]
    async fn test_history_selection_can_fill_input_only() {
        let mut history = temp_history(10).await;
        history.add("leo").await.unwrap();

        let config = AppConfig {
            history_selection_triggers_search: false,
            ..Default::default()
        };
        let mut dashboard = Dashboard::new(FakeSource::new(base_feed()), Some(history), &config);
        dashboard.load().await;

        dashboard.select_history(0).await.unwrap();
        assert_eq!(dashboard.app().input(), "leo");
        assert!(dashboard.app().query().term.is_empty());
        assert_eq!(dashboard.source().calls(), vec!["all"]);
    }

    #[tokio::test]
    async fn test_history_selection_out_of_range() {
        let mut dashboard = Dashboard::new(
            FakeSource::new(base_feed()),
            None,
            &config(SearchMode::Parallel),
        );
        let result = dashboard.select_history(0).await;
        assert!(matches!(result, Err(CoreError::NotFound { .. })));
        assert!(dashboard.history_terms().is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_visible_posts() {
        let dir = env::temp_dir().join(format!("dashboard_export_{}", uuid::Uuid::new_v4()));
        let config = AppConfig {
            export_dir: dir.clone(),
            ..Default::default()
        };
        let mut dashboard = Dashboard::new(FakeSource::new(base_feed()), None, &config);
        dashboard.load().await;
        dashboard.select_category(None).await;

        let path = dashboard.export().await.unwrap();
        assert!(path.starts_with(&dir));

        let contents = std::fs::read_to_string(&path).unwrap();
        let exported: Vec<Post> = serde_json::from_str(&contents).unwrap();
        assert_eq!(exported, dashboard.app().visible());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
