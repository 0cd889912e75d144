//! Command-line front end.

mod commands;

use clap::{Parser, Subcommand};

/// anishelf - personal anime catalog
/// Tracks which episodes you own on disk and which are available online
#[derive(Parser)]
#[command(name = "anishelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "web")]
    Serve,

    /// Scan a media folder and mark matching episodes as owned
    #[command(alias = "scan-library")]
    Scan {
        /// Folder to scan (defaults to library.media_root)
        path: Option<String>,
        /// Create an anime for every title that matches nothing
        #[arg(long)]
        create_missing: bool,
    },

    /// Search the catalog and the external source
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Import an anime from an external detail page
    Import {
        /// Detail page URL
        url: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
