//! Metadata providers.
//!
//! A provider wraps one external source (TMDB, IMDb, a game database, ...)
//! behind the [`MetadataProvider`] trait. Scraping logic is entirely the
//! provider's business; this crate only fans requests out and routes
//! follow-up calls back to the provider that produced a candidate.
//!
//! # Example
//!
//! ```ignore
//! let mut aggregator = ProviderAggregator::new();
//! aggregator.register(Arc::new(tmdb));
//!
//! let candidates = aggregator.search(&SearchQuery::new(EntityKind::Movie, "Alien")).await;
//! let doc = aggregator.metadata(&candidates[0]).await;
//! ```

mod aggregator;
mod sidecar;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use aggregator::ProviderAggregator;
pub use sidecar::{SIDECAR_PROVIDER_ID, SidecarProvider};

use crate::metadata::{ArtworkDescriptor, MetadataDocument};
use crate::model::{ArtworkType, EntityKind};

/// Provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider {0} is not available")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// What to search for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub kind: EntityKind,
    pub title: String,
    pub year: Option<i32>,
    /// ISO-639-1 language for localized results
    pub language: String,
    /// Known ids, for providers that can look up directly
    pub external_ids: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn new(kind: EntityKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            year: None,
            language: "en".to_string(),
            external_ids: Vec::new(),
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// A provisional search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Provider that returned this candidate
    pub provider_id: String,
    /// Provider-specific id
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    /// Similarity to the query, 0.0 - 1.0
    pub score: f32,
    pub poster_url: Option<String>,
}

impl Candidate {
    pub fn new(
        provider_id: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            id: id.into(),
            title: title.into(),
            year: None,
            score,
            poster_url: None,
        }
    }
}

/// A trailer offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailerDescriptor {
    pub name: String,
    pub url: String,
    /// e.g. `1080p`
    pub quality: String,
    pub provider_id: String,
}

/// An external metadata source.
///
/// Implement this trait to add a provider; the aggregator isolates failures
/// and panics of individual providers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier (e.g. `"tmdb"`). Must be unique.
    fn id(&self) -> &str;

    /// Whether the provider is configured and usable right now.
    fn is_available(&self) -> bool {
        true
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError>;

    async fn metadata(&self, candidate: &Candidate) -> Result<MetadataDocument, ProviderError>;

    async fn artwork(
        &self,
        candidate: &Candidate,
        artwork_type: ArtworkType,
    ) -> Result<Vec<ArtworkDescriptor>, ProviderError>;

    async fn trailers(&self, candidate: &Candidate)
    -> Result<Vec<TrailerDescriptor>, ProviderError>;
}

/// Mock providers for testing.
#[cfg(test)]
pub mod mocks {
    use std::time::Duration;

    use super::*;
    use crate::metadata::MetadataField;

    /// Provider returning canned data.
    pub struct MockProvider {
        pub id: String,
        pub available: bool,
        pub candidates: Vec<Candidate>,
        pub artwork: Vec<ArtworkDescriptor>,
        pub trailers: Vec<TrailerDescriptor>,
        /// Error to return from every call (takes precedence)
        pub error: Option<ProviderError>,
        /// Panic inside every call
        pub panics: bool,
        /// Artificial latency per call
        pub delay: Option<Duration>,
    }

    impl MockProvider {
        /// Provider returning candidates with the given `(title, score)` pairs.
        pub fn with_candidates(id: &str, results: &[(&str, f32)]) -> Self {
            Self {
                id: id.to_string(),
                available: true,
                candidates: results
                    .iter()
                    .enumerate()
                    .map(|(i, (title, score))| {
                        Candidate::new(id, format!("{id}-{i}"), *title, *score)
                    })
                    .collect(),
                artwork: Vec::new(),
                trailers: Vec::new(),
                error: None,
                panics: false,
                delay: None,
            }
        }

        pub fn with_error(id: &str, error: ProviderError) -> Self {
            Self {
                error: Some(error),
                ..Self::with_candidates(id, &[])
            }
        }

        pub fn panicking(id: &str) -> Self {
            Self {
                panics: true,
                ..Self::with_candidates(id, &[])
            }
        }

        pub fn unavailable(id: &str, results: &[(&str, f32)]) -> Self {
            Self {
                available: false,
                ..Self::with_candidates(id, results)
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        async fn enter(&self) -> Result<(), ProviderError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.panics {
                panic!("mock provider {} panicked", self.id);
            }
            match &self.error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl MetadataProvider for MockProvider {
        fn id(&self) -> &str {
            &self.id
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<Candidate>, ProviderError> {
            self.enter().await?;
            Ok(self.candidates.clone())
        }

        async fn metadata(&self, candidate: &Candidate) -> Result<MetadataDocument, ProviderError> {
            self.enter().await?;
            let mut doc = MetadataDocument::new();
            doc.store(MetadataField::Title, candidate.title.as_str());
            doc.add_external_id(self.id.clone(), candidate.id.clone());
            Ok(doc)
        }

        async fn artwork(
            &self,
            _candidate: &Candidate,
            artwork_type: ArtworkType,
        ) -> Result<Vec<ArtworkDescriptor>, ProviderError> {
            self.enter().await?;
            Ok(self
                .artwork
                .iter()
                .filter(|a| a.artwork_type == artwork_type)
                .cloned()
                .collect())
        }

        async fn trailers(
            &self,
            _candidate: &Candidate,
        ) -> Result<Vec<TrailerDescriptor>, ProviderError> {
            self.enter().await?;
            Ok(self.trailers.clone())
        }
    }
}
