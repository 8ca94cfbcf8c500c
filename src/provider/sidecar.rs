//! Provider backed by sidecar files already present in the library.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Candidate, MetadataProvider, ProviderError, SearchQuery, TrailerDescriptor};
use crate::metadata::{ArtworkDescriptor, MetadataDocument};
use crate::model::ArtworkType;
use crate::nfo::{self, NfoError, SidecarDocument, trailer};
use crate::taxonomy::Country;

pub const SIDECAR_PROVIDER_ID: &str = "sidecar";

/// Searches `.nfo` files below a library root.
///
/// Candidate ids are sidecar paths. Sidecars carry no downloadable artwork,
/// so [`MetadataProvider::artwork`] is always empty.
pub struct SidecarProvider {
    root: PathBuf,
    country: Country,
}

impl SidecarProvider {
    /// `country` is the certification country sidecar ratings are read as.
    pub fn new(root: impl Into<PathBuf>, country: Country) -> Self {
        Self {
            root: root.into(),
            country,
        }
    }

    fn load(&self, candidate: &Candidate) -> Result<SidecarDocument, ProviderError> {
        nfo::read_any(Path::new(&candidate.id)).map_err(|e| match e {
            NfoError::Read { .. } => ProviderError::NotFound(candidate.id.clone()),
            other => ProviderError::Parse(other.to_string()),
        })
    }
}

/// Title and year confidence, 0.0 - 1.0. Zero means "not a match".
fn confidence(query: &SearchQuery, title: &str, year: Option<i32>) -> f32 {
    let wanted = query.title.trim();
    let title = title.trim();
    if wanted.is_empty() || title.is_empty() {
        return 0.0;
    }

    let base = if wanted == title {
        0.6
    } else if wanted.to_lowercase() == title.to_lowercase() {
        0.5
    } else if title.to_lowercase().contains(&wanted.to_lowercase()) {
        0.25
    } else {
        return 0.0;
    };

    let year_bonus = match (query.year, year) {
        (Some(q), Some(r)) if q == r => 0.4,
        (Some(q), Some(r)) if q.abs_diff(r) <= 1 => 0.2,
        _ => 0.0,
    };

    base + year_bonus
}

fn sidecar_files(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("nfo"))
        })
        .collect()
}

#[async_trait]
impl MetadataProvider for SidecarProvider {
    fn id(&self) -> &str {
        SIDECAR_PROVIDER_ID
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
        let root = self.root.clone();
        let query = query.clone();

        tokio::task::spawn_blocking(move || {
            let mut candidates = Vec::new();
            for path in sidecar_files(&root) {
                let doc = match nfo::read(&path, query.kind) {
                    Ok(doc) => doc,
                    Err(e) => {
                        tracing::debug!(error = %e, "Skipping sidecar");
                        continue;
                    }
                };
                let score = confidence(&query, &doc.content.title, doc.content.year);
                if score <= 0.0 {
                    continue;
                }
                let mut candidate = Candidate::new(
                    SIDECAR_PROVIDER_ID,
                    path.to_string_lossy(),
                    doc.content.title.clone(),
                    score,
                );
                candidate.year = doc.content.year;
                candidates.push(candidate);
            }
            candidates
        })
        .await
        .map_err(|e| ProviderError::Unavailable(format!("{SIDECAR_PROVIDER_ID} ({e})")))
    }

    async fn metadata(&self, candidate: &Candidate) -> Result<MetadataDocument, ProviderError> {
        Ok(self.load(candidate)?.to_metadata(self.country))
    }

    async fn artwork(
        &self,
        _candidate: &Candidate,
        _artwork_type: ArtworkType,
    ) -> Result<Vec<ArtworkDescriptor>, ProviderError> {
        Ok(Vec::new())
    }

    async fn trailers(
        &self,
        candidate: &Candidate,
    ) -> Result<Vec<TrailerDescriptor>, ProviderError> {
        let doc = self.load(candidate)?;
        if doc.content.trailer.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![TrailerDescriptor {
            name: doc.content.title.clone(),
            url: trailer::from_playback_uri(&doc.content.trailer),
            quality: String::new(),
            provider_id: SIDECAR_PROVIDER_ID.to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataField;
    use crate::model::EntityKind;
    use crate::provider::ProviderAggregator;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        let alien = dir.path().join("Alien (1979)");
        std::fs::create_dir(&alien).unwrap();
        std::fs::write(
            alien.join("movie.nfo"),
            r#"<movie>
  <title>Alien</title>
  <year>1979</year>
  <source>BluRay</source>
  <trailer>plugin://plugin.video.youtube/?action=play_video&amp;videoid=abc123</trailer>
</movie>"#,
        )
        .unwrap();
        let aliens = dir.path().join("Aliens (1986)");
        std::fs::create_dir(&aliens).unwrap();
        std::fs::write(
            aliens.join("movie.nfo"),
            "<movie><title>Aliens</title><year>1986</year></movie>",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("show.nfo"),
            "<tvshow><title>Alien</title></tvshow>",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.nfo"), "<movie><title>Alien").unwrap();
        dir
    }

    #[test]
    fn test_confidence() {
        let query = SearchQuery::new(EntityKind::Movie, "Alien").with_year(1979);
        assert!((confidence(&query, "Alien", Some(1979)) - 1.0).abs() < 1e-6);
        assert!((confidence(&query, "alien", None) - 0.5).abs() < f32::EPSILON);
        assert!((confidence(&query, "Aliens", Some(1980)) - 0.45).abs() < 1e-6);
        assert_eq!(confidence(&query, "Predator", Some(1979)), 0.0);
    }

    #[tokio::test]
    async fn test_search_ranks_local_sidecars() {
        let dir = library();
        let mut aggregator = ProviderAggregator::new();
        aggregator.register(Arc::new(SidecarProvider::new(dir.path(), Country::US)));

        let query = SearchQuery::new(EntityKind::Movie, "Alien").with_year(1979);
        let results = aggregator.search(&query).await;

        // The tvshow sidecar has the wrong kind and the broken one is skipped
        let titles: Vec<_> = results.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Alien", "Aliens"]);
        assert_eq!(results[0].year, Some(1979));
        assert_eq!(results[0].provider_id, SIDECAR_PROVIDER_ID);
    }

    #[tokio::test]
    async fn test_metadata_and_trailers() {
        let dir = library();
        let provider = SidecarProvider::new(dir.path(), Country::US);
        let query = SearchQuery::new(EntityKind::Movie, "Alien").with_year(1979);
        let top = provider
            .search(&query)
            .await
            .unwrap()
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap();

        let doc = provider.metadata(&top).await.unwrap();
        assert_eq!(doc.get_string(MetadataField::Title), "Alien");
        assert_eq!(doc.get_string(MetadataField::MediaSource), "BluRay");

        let trailers = provider.trailers(&top).await.unwrap();
        assert_eq!(trailers[0].url, "http://www.youtube.com/watch?v=abc123");
        assert!(
            provider
                .artwork(&top, ArtworkType::Poster)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_missing_sidecar_is_not_found() {
        let dir = TempDir::new().unwrap();
        let provider = SidecarProvider::new(dir.path(), Country::US);
        let gone = Candidate::new(
            SIDECAR_PROVIDER_ID,
            dir.path().join("gone.nfo").to_string_lossy(),
            "Gone",
            1.0,
        );
        assert!(matches!(
            provider.metadata(&gone).await,
            Err(ProviderError::NotFound(_))
        ));
        assert!(!SidecarProvider::new(dir.path().join("nope"), Country::US).is_available());
    }
}
