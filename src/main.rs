//! Command line front end for browsing, searching and exporting distributor
//! leads collected from scraped group posts.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dashboard::Dashboard;
use database::{Database, SearchHistory};
use feed_client::FeedApiClient;
use finder_core::{AppConfig, CoreError, ErrorExt, SearchMode};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "distributor_finder=info,dashboard=info,feed_client=info,database=info";

#[derive(Parser)]
#[command(
    name = "distributor-finder",
    author,
    version,
    about = "Find beer distributor leads in scraped group posts"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every post and print the cards with summary stats.
    Browse {
        #[arg(long)]
        category: Option<String>,
    },
    /// Filter locally, then merge in results from the remote services.
    Search {
        term: String,
        #[arg(long)]
        category: Option<String>,
        /// parallel, sequential or replace. Overrides the configured mode.
        #[arg(long)]
        mode: Option<SearchMode>,
    },
    /// Write the visible posts to `distributor_leads_<epoch-ms>.json`.
    Export {
        #[arg(long)]
        term: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Output directory. Defaults to `export_dir` from the configuration.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage saved search terms.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Clear,
    Remove { term: String },
    /// Select a saved term by its position in `history list`.
    Run { index: usize },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).map_err(|e| {
        e.log_error();
        anyhow::anyhow!(e.user_friendly_message())
    })?;

    match cli.command {
        Commands::Browse { category } => {
            let mut dashboard = open_dashboard(&config).await?;
            dashboard.load().await;
            dashboard.select_category(category.as_deref()).await;
            print!("{}", dashboard.app().view());
        }
        Commands::Search {
            term,
            category,
            mode,
        } => {
            if let Some(mode) = mode {
                config.search_mode = mode;
            }
            let mut dashboard = open_dashboard(&config).await?;
            dashboard.load().await;
            dashboard.select_category(category.as_deref()).await;
            dashboard.search(&term).await;
            print!("{}", dashboard.app().view());
        }
        Commands::Export {
            term,
            category,
            out,
        } => {
            if let Some(out) = out {
                config.export_dir = out;
            }
            let mut dashboard = open_dashboard(&config).await?;
            dashboard.load().await;
            dashboard.select_category(category.as_deref()).await;
            if let Some(term) = term {
                dashboard.search(&term).await;
            }
            let path = dashboard
                .export()
                .await
                .with_context(|| format!("export to {}", dashboard.export_dir().display()))?;
            println!("{}", path.display());
        }
        Commands::History { action } => run_history(&config, action).await?,
    }
    Ok(())
}

async fn run_history(config: &AppConfig, action: HistoryAction) -> anyhow::Result<()> {
    let mut history = open_history(config)
        .await
        .context("search history is unavailable")?;

    match action {
        HistoryAction::List => {
            if history.terms().is_empty() {
                println!("(no saved searches)");
            }
            for (index, term) in history.terms().iter().enumerate() {
                println!("{index}: {term}");
            }
        }
        HistoryAction::Clear => {
            history.clear().await?;
            info!("Cleared saved searches");
        }
        HistoryAction::Remove { term } => {
            if !history.remove(&term).await? {
                warn!("'{}' is not a saved search", term);
            }
        }
        HistoryAction::Run { index } => {
            let client = FeedApiClient::from_config(config)?;
            let mut dashboard = Dashboard::new(client, Some(history), config);
            dashboard.load().await;
            let term = dashboard.select_history(index).await?;
            if config.history_selection_triggers_search {
                print!("{}", dashboard.app().view());
            } else {
                println!("{term}");
            }
        }
    }
    Ok(())
}

async fn open_dashboard(config: &AppConfig) -> anyhow::Result<Dashboard<FeedApiClient>> {
    let client = FeedApiClient::from_config(config)?;
    // Browsing works without saved searches.
    let history = match open_history(config).await {
        Ok(history) => Some(history),
        Err(e) => {
            e.log_warn();
            None
        }
    };
    Ok(Dashboard::new(client, history, config))
}

async fn open_history(config: &AppConfig) -> Result<SearchHistory, CoreError> {
    let db = Database::open(config.database_url.as_str()).await?;
    SearchHistory::load(db, config.history_limit).await
}
