use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_import(config: &Config, url: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    println!("Importing {url} ...");
    let imported = state.import_service.import_from_external(url).await?;

    println!();
    println!("✓ Imported: {} (ID: {})", imported.anime.title, imported.anime.id);
    println!(
        "  Episodes: {}/{} created",
        imported.episodes_created, imported.episodes_attempted
    );

    if imported.is_partial() {
        println!();
        println!("⚠ Some episodes could not be created:");
        for warning in &imported.warnings {
            println!("  Ep {:>4}: {}", warning.episode_number, warning.message);
        }
    }

    Ok(())
}
