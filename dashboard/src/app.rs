use crate::loader::{
    assign_display_ids, flatten_groups, load_dataset, materialize, sort_newest_first,
};
use crate::merge::merge_posts;
use crate::stats::DashboardStats;
use crate::view;
use finder_core::{CoreError, ErrorReporter, FeedResponse, Post, SearchMode, SearchQuery};
use tracing::{debug, info};

/// Shown on the full-page error screen when the first load fails.
pub const LOAD_ERROR_MESSAGE: &str = "ไม่สามารถโหลดข้อมูลได้";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed { message: String },
}

/// Which endpoint a batch of remote results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOrigin {
    /// `/:query` on the posts service.
    PostsQuery,
    /// `/search?q=` on the search service.
    SearchIndex,
}

#[derive(Debug)]
pub enum Message {
    LoadRequested,
    DataLoaded(Result<FeedResponse, CoreError>),
    InputChanged(String),
    SearchSubmitted(String),
    CategorySelected(Option<String>),
    RemoteResults {
        generation: u64,
        origin: ResultOrigin,
        result: Result<FeedResponse, CoreError>,
    },
}

/// Side effects requested by [`App::update`]; the caller performs them and
/// feeds the outcome back as a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    LoadAll,
    FetchBoth { generation: u64, term: String },
    FetchQuery { generation: u64, term: String },
    SearchIndex { generation: u64, term: String },
}

pub struct App {
    dataset: Vec<Post>,
    visible: Vec<Post>,
    query: SearchQuery,
    input: String,
    load_state: LoadState,
    mode: SearchMode,
    generation: u64,
    pending_responses: usize,
    reporter: ErrorReporter,
}

impl App {
    pub fn new(mode: SearchMode) -> Self {
        Self {
            dataset: Vec::new(),
            visible: Vec::new(),
            query: SearchQuery::default(),
            input: String::new(),
            load_state: LoadState::Loading,
            mode,
            generation: 0,
            pending_responses: 0,
            reporter: ErrorReporter::new(),
        }
    }

    pub fn update(&mut self, message: Message) -> Command {
        match message {
            Message::LoadRequested => {
                self.load_state = LoadState::Loading;
                Command::LoadAll
            }
            Message::DataLoaded(Ok(response)) => {
                info!("Loaded {} posts", response.post_count());
                self.dataset = load_dataset(response);
                self.refresh();
                self.load_state = LoadState::Ready;
                Command::None
            }
            Message::DataLoaded(Err(error)) => {
                self.reporter.report_error(&error);
                self.load_state = LoadState::Failed {
                    message: LOAD_ERROR_MESSAGE.to_string(),
                };
                Command::None
            }
            Message::InputChanged(input) => {
                self.input = input;
                Command::None
            }
            Message::SearchSubmitted(raw) => self.submit(raw),
            Message::CategorySelected(category) => {
                self.query = SearchQuery::new(&self.query.term, category.as_deref());
                self.refresh();
                Command::None
            }
            Message::RemoteResults {
                generation,
                origin,
                result,
            } => self.apply_remote(generation, origin, result),
        }
    }

    fn submit(&mut self, raw: String) -> Command {
        self.query = SearchQuery::new(&raw, self.query.category.as_deref());
        self.input = raw;
        // Any response still in flight belongs to an older search now.
        self.generation += 1;
        self.refresh();

        if self.query.is_empty() {
            self.pending_responses = 0;
            return Command::None;
        }

        let generation = self.generation;
        let term = self.query.term.clone();
        debug!("Search #{} for '{}' ({:?})", generation, term, self.mode);
        match self.mode {
            SearchMode::Parallel => {
                self.pending_responses = 2;
                Command::FetchBoth { generation, term }
            }
            SearchMode::Sequential | SearchMode::Replace => {
                self.pending_responses = 1;
                Command::FetchQuery { generation, term }
            }
        }
    }

    fn apply_remote(
        &mut self,
        generation: u64,
        origin: ResultOrigin,
        result: Result<FeedResponse, CoreError>,
    ) -> Command {
        if generation != self.generation {
            debug!(
                "Discarding {:?} results of stale search #{} (current #{})",
                origin, generation, self.generation
            );
            return Command::None;
        }
        self.pending_responses = self.pending_responses.saturating_sub(1);

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                // Local results stay on screen.
                self.reporter.report_warning(&error);
                return Command::None;
            }
        };

        let fresh = flatten_groups(response);
        info!("Search #{} got {} posts from {:?}", generation, fresh.len(), origin);
        let dataset = match self.mode {
            SearchMode::Replace => fresh,
            SearchMode::Parallel | SearchMode::Sequential => {
                merge_posts(fresh, std::mem::take(&mut self.dataset))
            }
        };
        self.set_dataset(dataset);
        // Remote results count as loaded data even if the first load failed.
        self.load_state = LoadState::Ready;

        if self.mode == SearchMode::Sequential && origin == ResultOrigin::PostsQuery {
            self.pending_responses = 1;
            return Command::SearchIndex {
                generation,
                term: self.query.term.clone(),
            };
        }
        Command::None
    }

    fn set_dataset(&mut self, mut posts: Vec<Post>) {
        sort_newest_first(&mut posts);
        assign_display_ids(&mut posts);
        self.dataset = posts;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.visible = materialize(&self.dataset, &self.query);
    }

    pub fn dataset(&self) -> &[Post] {
        &self.dataset
    }

    pub fn visible(&self) -> &[Post] {
        &self.visible
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_search_in_flight(&self) -> bool {
        self.pending_responses > 0
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.visible)
    }

    pub fn view(&self) -> String {
        view::render(self)
    }
}
