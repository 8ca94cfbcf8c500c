//! Fan-out over all registered providers.
//!
//! Each provider call is isolated: an error or a panic in one provider is
//! logged and that provider simply contributes nothing.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;

use super::{Candidate, MetadataProvider, ProviderError, SearchQuery, TrailerDescriptor};
use crate::metadata::{ArtworkDescriptor, MetadataDocument};
use crate::model::ArtworkType;

/// Registry of providers plus the fan-out/routing logic.
#[derive(Default)]
pub struct ProviderAggregator {
    providers: Vec<Arc<dyn MetadataProvider>>,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Clamp a score into `[0, 1]`; NaN becomes 0.
fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Run one provider call, turning errors and panics into `None`.
async fn isolated<T>(
    provider: &str,
    operation: &'static str,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Option<T> {
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(provider, operation, error = %e, "Provider call failed");
            None
        }
        Err(payload) => {
            tracing::error!(
                provider,
                operation,
                panic = %panic_message(payload.as_ref()),
                "Provider panicked"
            );
            None
        }
    }
}

impl ProviderAggregator {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a provider. Search results keep registration order for
    /// equal scores.
    pub fn register(&mut self, provider: Arc<dyn MetadataProvider>) {
        if self.get(provider.id()).is_some() {
            tracing::warn!(provider = provider.id(), "Provider registered twice, ignoring");
            return;
        }
        self.providers.push(provider);
    }

    /// Providers that report themselves available, in registration order.
    pub fn available(&self) -> Vec<Arc<dyn MetadataProvider>> {
        self.providers
            .iter()
            .filter(|p| {
                std::panic::catch_unwind(AssertUnwindSafe(|| p.is_available())).unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn MetadataProvider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Search all available providers concurrently.
    ///
    /// Candidates are concatenated in registration order, then stable-sorted
    /// by descending score. Identical hits from different providers are all
    /// kept. Returns an empty list if every provider failed.
    pub async fn search(&self, query: &SearchQuery) -> Vec<Candidate> {
        let available = self.available();
        if available.is_empty() {
            tracing::debug!("No providers available for search");
            return Vec::new();
        }

        let calls = available.iter().map(|provider| async move {
            let id = provider.id().to_string();
            let found = isolated(&id, "search", provider.search(query)).await;
            (id, found)
        });

        let mut candidates = Vec::new();
        for (id, found) in join_all(calls).await {
            let Some(found) = found else { continue };
            tracing::debug!(provider = %id, count = found.len(), "Search results");
            candidates.extend(found.into_iter().map(|mut c| {
                c.provider_id = id.clone();
                c.score = clamp_score(c.score);
                c
            }));
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    fn owner(&self, candidate: &Candidate) -> Option<Arc<dyn MetadataProvider>> {
        let provider = self.get(&candidate.provider_id);
        if provider.is_none() {
            tracing::warn!(provider = %candidate.provider_id, "Candidate from unknown provider");
        }
        provider
    }

    /// Full metadata from the provider that produced the candidate.
    pub async fn metadata(&self, candidate: &Candidate) -> Option<MetadataDocument> {
        let provider = self.owner(candidate)?;
        isolated(provider.id(), "metadata", provider.metadata(candidate)).await
    }

    /// Artwork of one type from the provider that produced the candidate.
    pub async fn artwork(
        &self,
        candidate: &Candidate,
        artwork_type: ArtworkType,
    ) -> Vec<ArtworkDescriptor> {
        let Some(provider) = self.owner(candidate) else {
            return Vec::new();
        };
        isolated(
            provider.id(),
            "artwork",
            provider.artwork(candidate, artwork_type),
        )
        .await
        .unwrap_or_default()
    }

    /// Trailers from the provider that produced the candidate.
    pub async fn trailers(&self, candidate: &Candidate) -> Vec<TrailerDescriptor> {
        let Some(provider) = self.owner(candidate) else {
            return Vec::new();
        };
        isolated(provider.id(), "trailers", provider.trailers(candidate))
            .await
            .unwrap_or_default()
    }
}
