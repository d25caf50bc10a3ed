use crate::app::{App, Command, Message, ResultOrigin};
use crate::export::write_export;
use database::SearchHistory;
use feed_client::FeedSource;
use finder_core::{AppConfig, CoreError, ErrorReporter};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Drives an [`App`] against a feed source, performing the commands it
/// returns, and keeps the saved search history in step with submitted
/// searches.
pub struct Dashboard<S> {
    app: App,
    source: S,
    history: Option<SearchHistory>,
    history_triggers_search: bool,
    export_dir: PathBuf,
    reporter: ErrorReporter,
}

impl<S: FeedSource> Dashboard<S> {
    pub fn new(source: S, history: Option<SearchHistory>, config: &AppConfig) -> Self {
        Self {
            app: App::new(config.search_mode),
            source,
            history,
            history_triggers_search: config.history_selection_triggers_search,
            export_dir: config.export_dir.clone(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub async fn load(&mut self) {
        self.dispatch(Message::LoadRequested).await;
    }

    /// Filters locally, records the term, then runs the remote search.
    pub async fn search(&mut self, raw: &str) {
        self.remember(raw).await;
        self.dispatch(Message::SearchSubmitted(raw.to_string())).await;
    }

    pub async fn select_category(&mut self, category: Option<&str>) {
        self.dispatch(Message::CategorySelected(category.map(str::to_string)))
            .await;
    }

    /// Picks a saved term by position. Depending on configuration the term
    /// is searched right away or only placed in the input.
    pub async fn select_history(&mut self, index: usize) -> Result<String, CoreError> {
        let term = self
            .history
            .as_ref()
            .and_then(|history| history.get(index))
            .map(str::to_string)
            .ok_or_else(|| CoreError::NotFound {
                resource: format!("saved search #{}", index),
            })?;

        if self.history_triggers_search {
            self.search(&term).await;
        } else {
            self.dispatch(Message::InputChanged(term.clone())).await;
        }
        Ok(term)
    }

    pub fn history_terms(&self) -> &[String] {
        self.history
            .as_ref()
            .map(SearchHistory::terms)
            .unwrap_or_default()
    }

    pub async fn remove_history_term(&mut self, term: &str) -> Result<bool, CoreError> {
        match self.history.as_mut() {
            Some(history) => history.remove(term).await,
            None => Ok(false),
        }
    }

    pub async fn clear_history(&mut self) -> Result<(), CoreError> {
        match self.history.as_mut() {
            Some(history) => history.clear().await,
            None => Ok(()),
        }
    }

    /// Writes the currently visible posts to the export directory.
    pub async fn export(&self) -> Result<PathBuf, CoreError> {
        write_export(&self.export_dir, self.app.visible()).await
    }

    pub fn into_history(self) -> Option<SearchHistory> {
        self.history
    }

    async fn remember(&mut self, raw: &str) {
        let Some(history) = self.history.as_mut() else {
            return;
        };
        // History is best effort; a storage failure must not block the search.
        if let Err(e) = history.record_raw_term(raw).await {
            self.reporter.report_warning(&e);
        }
        match history.add(raw).await {
            Ok(true) => debug!("Saved search term '{}'", raw.trim()),
            Ok(false) => {}
            Err(e) => self.reporter.report_warning(&e),
        }
    }

    async fn dispatch(&mut self, message: Message) {
        let mut queue = VecDeque::from([message]);
        while let Some(message) = queue.pop_front() {
            let command = self.app.update(message);
            queue.extend(self.perform(command).await);
        }
    }

    async fn perform(&self, command: Command) -> Vec<Message> {
        match command {
            Command::None => Vec::new(),
            Command::LoadAll => {
                info!("Fetching full dataset");
                vec![Message::DataLoaded(self.source.fetch_all().await)]
            }
            Command::FetchBoth { generation, term } => {
                let (by_query, by_index) =
                    tokio::join!(self.source.fetch_query(&term), self.source.search(&term));
                vec![
                    Message::RemoteResults {
                        generation,
                        origin: ResultOrigin::PostsQuery,
                        result: by_query,
                    },
                    Message::RemoteResults {
                        generation,
                        origin: ResultOrigin::SearchIndex,
                        result: by_index,
                    },
                ]
            }
            Command::FetchQuery { generation, term } => vec![Message::RemoteResults {
                generation,
                origin: ResultOrigin::PostsQuery,
                result: self.source.fetch_query(&term).await,
            }],
            Command::SearchIndex { generation, term } => vec![Message::RemoteResults {
                generation,
                origin: ResultOrigin::SearchIndex,
                result: self.source.search(&term).await,
            }],
        }
    }
}
