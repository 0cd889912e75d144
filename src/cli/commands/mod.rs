mod import;
mod scan;
mod search;
mod serve;

pub use import::cmd_import;
pub use scan::cmd_scan_library;
pub use search::cmd_search_anime;
pub use serve::cmd_serve;
