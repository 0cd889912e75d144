use std::path::PathBuf;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_scan_library(
    config: &Config,
    path: Option<&str>,
    create_missing: bool,
) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(config.library.media_root.as_str()));
    let create_missing = create_missing || config.library.create_missing;

    let state = SharedState::new(config.clone()).await?;

    println!("Scanning {} ...", root.display());
    let summary = state
        .reconciliation
        .scan_and_reconcile(&root, create_missing)
        .await?;

    println!();
    println!("{:-<70}", "");
    println!("Scan complete!");
    println!("  Files seen:       {}", summary.total_files_seen);
    println!("  Anime matched:    {}", summary.matched_anime_count);
    println!("  Episodes updated: {}", summary.updated_episode_count);
    if create_missing {
        println!("  Anime created:    {}", summary.created_anime_count);
    }

    if !summary.unmatched_files.is_empty() {
        println!();
        println!("Unmatched files ({}):", summary.unmatched_files.len());
        for file in summary.unmatched_files.iter().take(20) {
            println!("  {file}");
        }
        if summary.unmatched_files.len() > 20 {
            println!("  ... and {} more", summary.unmatched_files.len() - 20);
        }
    }

    if !summary.failed_files.is_empty() {
        println!();
        println!("Failed files ({}):", summary.failed_files.len());
        for failure in &summary.failed_files {
            println!("  {}: {}", failure.path, failure.message);
        }
    }

    Ok(())
}
