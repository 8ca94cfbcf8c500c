//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for Media Minder.
//! Each group of subcommands is implemented in its own submodule:
//! - `taxonomy`: Genre, media source and certification lookups
//! - `sidecar`: Sidecar inspection, validation and trailer URIs
//! - `artwork`: Artwork downloads through the worker pool
//! - `scrape`: Provider search, merge and sidecar writing
//! - `settings`: Config file creation

mod artwork;
mod scrape;
mod settings;
mod sidecar;
mod taxonomy;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use artwork::cmd_fetch_artwork;
pub use scrape::{ScrapeOptions, cmd_scrape};
pub use settings::cmd_init_config;
pub use sidecar::{cmd_check, cmd_nfo, cmd_trailer};
pub use taxonomy::{cmd_certification, cmd_genres, cmd_resolve};

/// Media Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true, env = "MEDIA_MINDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// List all known genres
    Genres {
        /// Locale for genre names (default: [scraper] language)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Resolve free text to a genre or media source
    Resolve {
        /// Text to resolve, e.g. "Sci-Fi"
        text: String,
        /// Domain: genre, source
        #[arg(short, long, default_value = "genre")]
        domain: String,
        /// Locale for the printed name (default: [scraper] language)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Resolve a certification for a country
    Certification {
        /// Certification text, e.g. "PG-13" or "FSK 12"
        text: String,
        /// Country code (default: [scraper] certification_country)
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Show the playback URI stored in sidecars for a trailer URL
    Trailer {
        /// Trailer URL or playback URI
        url: String,
    },
    /// Print a parsed sidecar file as JSON
    Nfo {
        /// Path to the .nfo file
        path: PathBuf,
        /// Entity kind: movie, tvshow, game (default: from the root element)
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Report sidecar files that fail to parse
    Check {
        /// Directory to walk
        path: PathBuf,
        /// Also list files that parsed fine
        #[arg(short, long)]
        verbose: bool,
    },
    /// Download one artwork image next to an item
    FetchArtwork {
        /// Image URL
        url: String,
        /// Item directory
        #[arg(long)]
        dir: PathBuf,
        /// Base name for the file, e.g. the video stem
        #[arg(long)]
        base: String,
        /// Artwork type: poster, fanart, banner, ...
        #[arg(short = 't', long = "type", default_value = "poster")]
        artwork_type: String,
    },
    /// Search providers for an item, merge the results and write its sidecars
    Scrape {
        /// Item directory
        dir: PathBuf,
        /// Title to search for
        #[arg(long)]
        title: String,
        /// Release year, improves ranking
        #[arg(long)]
        year: Option<i32>,
        /// Entity kind: movie, tvshow, game
        #[arg(short, long, default_value = "movie")]
        kind: String,
        /// Directory searched for existing sidecars (default: the item directory)
        #[arg(long)]
        library: Option<PathBuf>,
        /// Ignore candidates scoring below this
        #[arg(long, default_value_t = 0.5)]
        min_score: f32,
        /// Print the resulting sidecar instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the config file with all defaults filled in
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match &cli.command {
        Commands::Genres { locale } => cmd_genres(&config, locale.as_deref()),
        Commands::Resolve {
            text,
            domain,
            locale,
        } => cmd_resolve(&config, text, domain, locale.as_deref()),
        Commands::Certification { text, country } => {
            cmd_certification(&config, text, country.as_deref())
        }
        Commands::Trailer { url } => cmd_trailer(url),
        Commands::Nfo { path, kind } => cmd_nfo(path, kind.as_deref()),
        Commands::Check { path, verbose } => cmd_check(path, *verbose),
        Commands::FetchArtwork {
            url,
            dir,
            base,
            artwork_type,
        } => {
            let rt = Runtime::new()?;
            cmd_fetch_artwork(&rt, &config, url, dir, base, artwork_type)
        }
        Commands::Scrape {
            dir,
            title,
            year,
            kind,
            library,
            min_score,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            let options = ScrapeOptions {
                dir,
                title,
                year: *year,
                kind,
                library: library.as_deref(),
                min_score: *min_score,
                dry_run: *dry_run,
            };
            cmd_scrape(&rt, &config, &options)
        }
        Commands::InitConfig { force } => {
            cmd_init_config(&config, cli.config.as_deref(), *force)
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Locale to print names in: explicit flag, else the configured language.
pub(crate) fn effective_locale<'a>(config: &'a Config, locale: Option<&'a str>) -> &'a str {
    locale.unwrap_or(&config.scraper.language)
}

/// Check if a path has a sidecar extension
pub(crate) fn is_sidecar_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nfo"))
}
