//! Media Minder - metadata core for a local movie, TV and game library.
//!
//! This application normalizes genres, media sources and certifications,
//! reads and writes `.nfo` sidecar files, downloads artwork next to library
//! items and fans metadata searches out to pluggable providers. It is driven
//! through CLI commands.

pub mod artwork;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod nfo;
pub mod notify;
pub mod provider;
pub mod taxonomy;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("media_minder=info".parse()?))
        .init();

    cli::run_command(&args)
}
