use chrono::Utc;
use finder_core::{CoreError, Post};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn export_file_name(epoch_millis: i64) -> String {
    format!("distributor_leads_{}.json", epoch_millis)
}

/// Pretty-printed JSON array of the given posts, in display order.
pub fn export_json(posts: &[Post]) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(posts)?)
}

/// Writes the posts to `dir/distributor_leads_<epoch-ms>.json`, creating
/// `dir` if needed, and returns the file path.
pub async fn write_export(dir: &Path, posts: &[Post]) -> Result<PathBuf, CoreError> {
    let json = export_json(posts)?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(export_file_name(Utc::now().timestamp_millis()));
    tokio::fs::write(&path, json).await?;

    info!("Exported {} posts to {}", posts.len(), path.display());
    Ok(path)
}
