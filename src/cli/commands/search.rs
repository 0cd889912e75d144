use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_search_anime(config: &Config, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let state = SharedState::new(config.clone()).await?;
    let response = state.search_service.combined_search(query).await?;

    println!();
    println!("In your catalog:");
    println!("{:-<60}", "");
    if response.local_results.is_empty() {
        println!("  (nothing)");
    }
    for anime in &response.local_results {
        let eps = anime
            .episode_count
            .map_or_else(|| "? eps".to_string(), |e| format!("{e} eps"));
        println!("• {} ({}) | ID: {} | {}", anime.title, eps, anime.id, anime.status);
    }

    println!();
    println!("External source:");
    println!("{:-<60}", "");
    if let Some(error) = &response.external_error {
        println!("  ⚠ unavailable: {error}");
    } else if response.external_results.is_empty() {
        println!("  (nothing)");
    }
    for hit in response.external_results.iter().take(10) {
        let marker = if hit.already_in_catalog { "✓" } else { "•" };
        println!("{marker} {}", hit.title);
        println!("  {}", hit.url);
        if let Some(id) = hit.catalog_anime_id {
            println!("  Already in catalog as ID {id}");
        }
    }

    println!();
    println!("To import: anishelf import <url>");

    Ok(())
}
