//! Scrape command: search providers, merge the results and write sidecars.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::{self, Error, ResultExt};
use crate::metadata::{MetadataDocument, MetadataField};
use crate::model::{EntityKind, MediaFile, MediaFileType, MediaItem};
use crate::nfo::{self, LineEnding, NfoConnector, SidecarDocument};
use crate::provider::{ProviderAggregator, SearchQuery, SidecarProvider};
use crate::taxonomy::{CertificationTable, TaxonomyRegistry};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "m4v", "avi", "mov", "wmv", "mpg", "mpeg", "ts", "m2ts", "webm", "iso",
];

/// Arguments of `scrape`
pub struct ScrapeOptions<'a> {
    pub dir: &'a Path,
    pub title: &'a str,
    pub year: Option<i32>,
    pub kind: &'a str,
    /// Root searched for existing sidecars (default: `dir`)
    pub library: Option<&'a Path>,
    pub min_score: f32,
    pub dry_run: bool,
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|v| v.eq_ignore_ascii_case(ext))
        })
}

/// Video files directly inside an item directory, sorted by name.
fn video_files(dir: &Path) -> error::Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(format!("Failed to list {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_video_file(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Search all providers and fold every candidate scoring at least
/// `min_score` into one document, best candidate first.
pub(crate) async fn scrape(
    aggregator: &ProviderAggregator,
    query: &SearchQuery,
    min_score: f32,
) -> Option<MetadataDocument> {
    let candidates = aggregator.search(query).await;
    let mut merged: Option<MetadataDocument> = None;

    for candidate in candidates.iter().filter(|c| c.score >= min_score) {
        let Some(doc) = aggregator.metadata(candidate).await else {
            continue;
        };
        tracing::debug!(
            provider = %candidate.provider_id,
            id = %candidate.id,
            score = candidate.score,
            "Merging candidate"
        );
        let merged = merged.get_or_insert_with(MetadataDocument::new);
        merged.merge_from(&doc);

        if !merged.has(MetadataField::TrailerUrl)
            && let Some(trailer) = aggregator.trailers(candidate).await.into_iter().next()
        {
            merged.store(MetadataField::TrailerUrl, trailer.url);
        }
    }
    merged
}

/// Scrape one item directory and write its sidecars
pub fn cmd_scrape(rt: &Runtime, config: &Config, options: &ScrapeOptions) -> anyhow::Result<()> {
    let dir = options.dir;
    if !dir.is_dir() {
        return Err(Error::not_found(dir).into());
    }
    let kind = EntityKind::parse(options.kind).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown kind '{}' (expected movie, tvshow or game)",
            options.kind
        )
    })?;

    let item = MediaItem::new(kind, dir);
    for path in video_files(dir)? {
        item.add_media_file(MediaFile::new(path, MediaFileType::Video));
    }

    let country = config.scraper.certification_country;
    let mut aggregator = ProviderAggregator::new();
    aggregator.register(Arc::new(SidecarProvider::new(
        options.library.unwrap_or(dir),
        country,
    )));

    let mut query =
        SearchQuery::new(kind, options.title).with_language(&config.scraper.language);
    if let Some(year) = options.year {
        query = query.with_year(year);
    }

    let Some(doc) = rt.block_on(scrape(&aggregator, &query, options.min_score)) else {
        anyhow::bail!(
            "No match for '{}' scoring at least {}",
            options.title,
            options.min_score
        );
    };

    let registry = Arc::new(TaxonomyRegistry::new());
    item.apply_metadata(&doc, &registry, &CertificationTable::new(), country);

    if options.dry_run {
        let mut sidecar = SidecarDocument::empty(kind);
        sidecar.merge_item(&item);
        print!("{}", nfo::to_xml(&sidecar, LineEnding::Lf));
        return Ok(());
    }

    let connector = NfoConnector::new(config.nfo_settings(), registry);
    let written = connector
        .write(&item)
        .with_context(format!("Failed to write sidecars in {}", dir.display()))?;

    if written.is_empty() {
        println!("No sidecar targets for {}", dir.display());
    }
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
