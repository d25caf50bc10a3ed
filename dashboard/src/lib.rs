//! Browsing state for the distributor finder: the loaded dataset, search and
//! category filtering, remote search reconciliation, stats and export.

pub mod app;
pub mod export;
pub mod loader;
pub mod merge;
pub mod session;
pub mod stats;
pub mod view;

#[cfg(test)]
mod tests;

pub use app::{App, Command, LoadState, Message, ResultOrigin, LOAD_ERROR_MESSAGE};
pub use export::{export_file_name, export_json, write_export};
pub use loader::{flatten_groups, load_dataset, materialize};
pub use merge::{dedup_key, filter_posts, merge_posts};
pub use session::Dashboard;
pub use stats::{completeness_score, DashboardStats};
