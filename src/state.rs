use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::{AnimeLoadsClient, DetailScraper, ExternalSearch};
use crate::config::Config;
use crate::db::{CatalogStore, Store};
use crate::library::{MediaScanner, WalkdirScanner};
use crate::services::{
    CatalogService, ImportService, ReconciliationService, SearchService, StoreCatalogService,
};

/// The outside world the services talk to besides the database.
#[derive(Clone)]
pub struct Collaborators {
    pub external_search: Arc<dyn ExternalSearch>,

    pub detail_scraper: Arc<dyn DetailScraper>,

    pub media_scanner: Arc<dyn MediaScanner>,
}

impl Collaborators {
    /// The anime-loads client plus a walkdir scanner, both configured from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(
            AnimeLoadsClient::new(
                &config.source.base_url,
                Duration::from_secs(config.source.request_timeout_seconds),
                &config.source.user_agent,
            )
            .map_err(|e| anyhow::anyhow!("Failed to build external source client: {e}"))?,
        );

        Ok(Self {
            external_search: client.clone(),
            detail_scraper: client,
            media_scanner: Arc::new(WalkdirScanner::new(&config.library.video_extensions)),
        })
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub catalog: Arc<dyn CatalogService>,

    pub search_service: Arc<SearchService>,

    pub import_service: Arc<ImportService>,

    pub reconciliation: Arc<ReconciliationService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        let collaborators = Collaborators::from_config(&config)?;

        Ok(Self::with_collaborators(config, store, collaborators))
    }

    #[must_use]
    pub fn with_collaborators(config: Config, store: Store, collaborators: Collaborators) -> Self {
        let backend: Arc<dyn CatalogStore> = Arc::new(store.clone());

        let catalog = Arc::new(StoreCatalogService::new(backend.clone()))
            as Arc<dyn CatalogService>;

        let search_service = Arc::new(SearchService::new(
            backend.clone(),
            collaborators.external_search,
        ));

        let import_service = Arc::new(ImportService::new(
            backend.clone(),
            collaborators.detail_scraper,
        ));

        let reconciliation = Arc::new(ReconciliationService::new(
            backend,
            collaborators.media_scanner,
        ));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            catalog,
            search_service,
            import_service,
            reconciliation,
        }
    }
}
