//! Artwork download command.

use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::artwork::{
    ArtworkFetcher, ArtworkRequest, FetchOutcome, HttpArtworkSource, ImageCache, artwork_filename,
};
use crate::config::Config;
use crate::model::{ArtworkType, EntityKind, MediaItem};
use crate::notify::MessageQueue;

/// Download one artwork image through the worker pool
pub fn cmd_fetch_artwork(
    rt: &Runtime,
    config: &Config,
    url: &str,
    dir: &Path,
    base: &str,
    artwork_type: &str,
) -> anyhow::Result<()> {
    let artwork_type = ArtworkType::parse(artwork_type).ok_or_else(|| {
        let known: Vec<_> = ArtworkType::ALL.iter().map(|t| t.as_str()).collect();
        anyhow::anyhow!("Unknown artwork type '{}' (known: {})", artwork_type, known.join(", "))
    })?;
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let item = Arc::new(MediaItem::new(EntityKind::Movie, dir));
    let destination = dir.join(artwork_filename(base, artwork_type, url));
    let messages = Arc::new(MessageQueue::new());
    let source = HttpArtworkSource::new(&config.artwork.user_agent)?;
    let fetcher = ArtworkFetcher::new(
        Arc::new(source),
        messages.clone(),
        Arc::new(ImageCache::new()),
        config.fetcher_settings(),
    );

    let outcome = rt.block_on(async {
        let handle = fetcher.submit(ArtworkRequest {
            entity: item.clone(),
            artwork_type,
            source_url: url.to_string(),
            destination,
            is_primary: true,
        })?;

        let outcome = tokio::select! {
            outcome = handle.outcome() => outcome,
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted, cancelling download...");
                FetchOutcome::Cancelled
            }
        };
        fetcher.shutdown().await;
        anyhow::Ok(outcome)
    })?;

    for message in messages.drain() {
        eprintln!("{}", message);
    }

    match outcome {
        FetchOutcome::Published(path) | FetchOutcome::Written(path) => {
            println!("Saved {} to {}", artwork_type, path.display());
            if let Some(image) = fetcher.cache().get(&path) {
                println!("Size: {}x{}", image.width(), image.height());
            }
            Ok(())
        }
        FetchOutcome::Failed(reason) => anyhow::bail!("Download failed: {}", reason),
        FetchOutcome::Cancelled => anyhow::bail!("Download cancelled"),
    }
}
