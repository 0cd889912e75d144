pub mod catalog_service;
pub use catalog_service::{
    AnimeDetail, AnimeListItem, AnimeListQuery, AnimePage, CatalogError, CatalogService, Page,
};

pub mod catalog_service_impl;
pub use catalog_service_impl::StoreCatalogService;

pub mod import_service;
pub use import_service::{ImportError, ImportService, ImportedAnime, ItemWarning};

pub mod scanner;
pub use scanner::{FileFailure, ReconciliationService, ScanError, ScanSummary};

pub mod search;
pub use search::{CombinedSearchResponse, ExternalSearchResult, SearchError, SearchService};
