//! Open-world classification registry for genres and media sources.
//!
//! Scrapers hand us free text ("Sci-Fi", "Komödie", "Science-Fiction") and the
//! library wants one value per concept. The registry resolves such strings
//! against a table of built-in values with locale-tagged alternate names, and
//! registers anything it cannot match as a new value on the fly.
//!
//! # Design
//!
//! - Every domain owns an immutable [`Arc`] snapshot of its values plus lookup
//!   indexes. Readers clone the pointer and search without holding a lock.
//! - Appends are serialized by a per-domain writer mutex. The writer re-checks
//!   the latest snapshot before creating, builds the next snapshot, and swaps
//!   the pointer.
//! - Values are never removed, so a `canonical_id` is never reused.
//!
//! The registry is an explicit handle passed to whoever needs it, so tests can
//! use isolated instances.
//!
//! # Example
//!
//! ```ignore
//! let registry = TaxonomyRegistry::new();
//! let genre = registry.resolve(TaxonomyDomain::Genre, "Sci-Fi").unwrap();
//! assert_eq!(genre.canonical_name, "SCIENCE_FICTION");
//! assert_eq!(registry.localized_name(&genre, "de"), "Science Fiction");
//! ```

pub mod certification;
mod genres;
mod sources;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

pub use certification::{Certification, CertificationTable, Country};

/// A classification axis with its own value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyDomain {
    /// Film/TV/game genres
    Genre,
    /// Release media source (Blu-ray, DVD, TV, ...)
    MediaSource,
}

impl TaxonomyDomain {
    /// All domains, in a stable order.
    pub const ALL: [TaxonomyDomain; 2] = [TaxonomyDomain::Genre, TaxonomyDomain::MediaSource];

    /// Parse a domain from its lowercase name ("genre", "source").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "genre" | "genres" => Some(Self::Genre),
            "source" | "media_source" | "mediasource" => Some(Self::MediaSource),
            _ => None,
        }
    }
}

impl fmt::Display for TaxonomyDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genre => write!(f, "genre"),
            Self::MediaSource => write!(f, "source"),
        }
    }
}

/// A single registered classification value.
///
/// Equality and hashing use `(domain, canonical_id)` only.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyValue {
    pub domain: TaxonomyDomain,
    /// Unique within the domain, assigned in registration order
    pub canonical_id: u32,
    /// Stable identifier, e.g. `SCIENCE_FICTION`
    pub canonical_name: String,
    /// Default (English) name shown to users and written to sidecars
    pub display_name: String,
    /// Alternate spellings, optionally locale-tagged (`de-Komödie`)
    pub alternate_names: Vec<String>,
}

impl PartialEq for TaxonomyValue {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.canonical_id == other.canonical_id
    }
}

impl Eq for TaxonomyValue {}

impl std::hash::Hash for TaxonomyValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.canonical_id.hash(state);
    }
}

impl fmt::Display for TaxonomyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Built-in table row.
pub(crate) struct BuiltIn {
    pub canonical: &'static str,
    pub display: &'static str,
    pub alternates: &'static [&'static str],
}

/// Split a locale-tagged alternate name into `(locale, text)`.
///
/// A tag is 2-3 lowercase ASCII letters followed by `-`, so `"de-Komödie"`
/// is tagged while `"Sci-Fi"` is not.
pub fn split_locale(name: &str) -> (Option<&str>, &str) {
    if let Some((tag, rest)) = name.split_once('-')
        && (2..=3).contains(&tag.len())
        && tag.bytes().all(|b| b.is_ascii_lowercase())
        && !rest.is_empty()
    {
        return (Some(tag), rest);
    }
    (None, name)
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Derive a canonical name (`UPPER_SNAKE`) for a scraped string.
fn canonical_name_for(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_uppercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        // Text made only of punctuation
        out = text.trim().to_string();
    }
    out
}

/// Immutable view of one domain.
#[derive(Default)]
struct Snapshot {
    values: Vec<Arc<TaxonomyValue>>,
    by_canonical: HashMap<String, usize>,
    by_display: HashMap<String, usize>,
    /// Lowercased alternates (full and locale-stripped), display and canonical
    /// names. First registration wins.
    by_folded: HashMap<String, usize>,
}

impl Snapshot {
    fn find(&self, text: &str) -> Option<Arc<TaxonomyValue>> {
        let idx = self
            .by_canonical
            .get(text)
            .or_else(|| self.by_display.get(text))
            .or_else(|| self.by_folded.get(&fold(text)))?;
        self.values.get(*idx).cloned()
    }

    fn index(&mut self, value: Arc<TaxonomyValue>) {
        let idx = self.values.len();
        self.by_canonical
            .entry(value.canonical_name.clone())
            .or_insert(idx);
        self.by_display
            .entry(value.display_name.clone())
            .or_insert(idx);

        let mut keys = vec![fold(&value.canonical_name), fold(&value.display_name)];
        for alt in &value.alternate_names {
            keys.push(fold(alt));
            let (_, text) = split_locale(alt);
            keys.push(fold(text));
        }
        for key in keys {
            self.by_folded.entry(key).or_insert(idx);
        }

        self.values.push(value);
    }

    fn with_appended(&self, value: Arc<TaxonomyValue>) -> Self {
        let mut next = Snapshot {
            values: Vec::with_capacity(self.values.len() + 1),
            by_canonical: self.by_canonical.clone(),
            by_display: self.by_display.clone(),
            by_folded: self.by_folded.clone(),
        };
        next.values.extend(self.values.iter().cloned());
        next.index(value);
        next
    }
}

struct DomainSlot {
    current: RwLock<Arc<Snapshot>>,
    writer: Mutex<()>,
}

impl DomainSlot {
    fn seeded(domain: TaxonomyDomain, table: &[BuiltIn]) -> Self {
        let mut snapshot = Snapshot::default();
        for (id, row) in table.iter().enumerate() {
            snapshot.index(Arc::new(TaxonomyValue {
                domain,
                canonical_id: id as u32,
                canonical_name: row.canonical.to_string(),
                display_name: row.display.to_string(),
                alternate_names: row.alternates.iter().map(|s| s.to_string()).collect(),
            }));
        }
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }
}

/// Registry of taxonomy values across all domains.
pub struct TaxonomyRegistry {
    genres: DomainSlot,
    sources: DomainSlot,
}

impl TaxonomyRegistry {
    /// Create a registry seeded with the built-in tables.
    pub fn new() -> Self {
        Self {
            genres: DomainSlot::seeded(TaxonomyDomain::Genre, genres::GENRES),
            sources: DomainSlot::seeded(TaxonomyDomain::MediaSource, sources::SOURCES),
        }
    }

    fn slot(&self, domain: TaxonomyDomain) -> &DomainSlot {
        match domain {
            TaxonomyDomain::Genre => &self.genres,
            TaxonomyDomain::MediaSource => &self.sources,
        }
    }

    /// Resolve free text to a value, registering a new one if nothing matches.
    ///
    /// Matching order: exact canonical name, exact display name, then a
    /// case-insensitive match on any alternate (locale tag optional) or name.
    /// Returns `None` only for blank input.
    pub fn resolve(&self, domain: TaxonomyDomain, text: &str) -> Option<Arc<TaxonomyValue>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let slot = self.slot(domain);
        if let Some(found) = slot.snapshot().find(text) {
            return Some(found);
        }

        let _guard = slot.writer.lock();
        // Another writer may have registered it while we waited
        let current = slot.snapshot();
        if let Some(found) = current.find(text) {
            return Some(found);
        }

        let canonical_id = current.values.len() as u32;
        let mut canonical_name = canonical_name_for(text);
        if current.by_canonical.contains_key(&canonical_name) {
            canonical_name = format!("{}_{}", canonical_name, canonical_id);
        }

        let value = Arc::new(TaxonomyValue {
            domain,
            canonical_id,
            canonical_name,
            display_name: text.to_string(),
            alternate_names: Vec::new(),
        });

        let next = Arc::new(current.with_appended(value.clone()));
        *slot.current.write() = next;

        tracing::debug!(
            domain = %domain,
            canonical_id,
            name = %value.display_name,
            "Registered new taxonomy value"
        );
        Some(value)
    }

    /// Resolve several strings, skipping blanks and collapsing duplicates.
    pub fn resolve_all<'a>(
        &self,
        domain: TaxonomyDomain,
        texts: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Arc<TaxonomyValue>> {
        let mut out: Vec<Arc<TaxonomyValue>> = Vec::new();
        for text in texts {
            if let Some(value) = self.resolve(domain, text)
                && !out.contains(&value)
            {
                out.push(value);
            }
        }
        out
    }

    /// Look up a value without registering anything.
    pub fn find(&self, domain: TaxonomyDomain, text: &str) -> Option<Arc<TaxonomyValue>> {
        self.slot(domain).snapshot().find(text.trim())
    }

    /// Look up a value by its canonical id.
    pub fn get(&self, domain: TaxonomyDomain, canonical_id: u32) -> Option<Arc<TaxonomyValue>> {
        self.slot(domain)
            .snapshot()
            .values
            .get(canonical_id as usize)
            .cloned()
    }

    /// All values of a domain in registration order.
    pub fn values(&self, domain: TaxonomyDomain) -> Vec<Arc<TaxonomyValue>> {
        self.slot(domain).snapshot().values.clone()
    }

    /// Number of registered values in a domain.
    pub fn len(&self, domain: TaxonomyDomain) -> usize {
        self.slot(domain).snapshot().values.len()
    }

    /// Name of a value for the given locale (`"de"`, `"fr"`, ...).
    ///
    /// Falls back to the display name when no alternate carries that tag.
    pub fn localized_name(&self, value: &TaxonomyValue, locale: &str) -> String {
        let wanted = locale
            .split(['-', '_'])
            .next()
            .unwrap_or(locale)
            .to_lowercase();
        value
            .alternate_names
            .iter()
            .find_map(|alt| match split_locale(alt) {
                (Some(tag), text) if tag == wanted => Some(text.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| value.display_name.clone())
    }
}

impl Default for TaxonomyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_resolve_to_themselves() {
        let registry = TaxonomyRegistry::new();
        for domain in TaxonomyDomain::ALL {
            for value in registry.values(domain) {
                let by_name = registry.resolve(domain, &value.canonical_name).unwrap();
                assert_eq!(by_name, value, "canonical name {}", value.canonical_name);

                for alt in &value.alternate_names {
                    let by_alt = registry.resolve(domain, alt).unwrap();
                    assert_eq!(
                        by_alt.canonical_name, value.canonical_name,
                        "alternate {:?} resolved to the wrong value",
                        alt
                    );
                }
            }
        }
    }

    #[test]
    fn test_builtin_resolution_does_not_grow_domain() {
        let registry = TaxonomyRegistry::new();
        let before = registry.len(TaxonomyDomain::Genre);
        for value in registry.values(TaxonomyDomain::Genre) {
            registry.resolve(TaxonomyDomain::Genre, &value.display_name);
        }
        assert_eq!(registry.len(TaxonomyDomain::Genre), before);
    }

    #[test]
    fn test_scenarios() {
        let registry = TaxonomyRegistry::new();
        let scifi = registry.resolve(TaxonomyDomain::Genre, "Sci-Fi").unwrap();
        assert_eq!(scifi.canonical_name, "SCIENCE_FICTION");

        let comedy = registry.resolve(TaxonomyDomain::Genre, "Komödie").unwrap();
        assert_eq!(comedy.canonical_name, "COMEDY");

        // Case-insensitive on alternates and names
        let comedy_lower = registry.resolve(TaxonomyDomain::Genre, "komödie").unwrap();
        assert_eq!(comedy_lower, comedy);
        let drama = registry.resolve(TaxonomyDomain::Genre, "drama").unwrap();
        assert_eq!(drama.canonical_name, "DRAMA");
    }

    #[test]
    fn test_unknown_text_is_registered_once() {
        let registry = TaxonomyRegistry::new();
        let existing: Vec<u32> = registry
            .values(TaxonomyDomain::Genre)
            .iter()
            .map(|v| v.canonical_id)
            .collect();

        let first = registry
            .resolve(TaxonomyDomain::Genre, "TotallyNewGenreXYZ")
            .unwrap();
        assert!(!existing.contains(&first.canonical_id));
        assert_eq!(first.display_name, "TotallyNewGenreXYZ");
        assert!(first.alternate_names.is_empty());

        let second = registry
            .resolve(TaxonomyDomain::Genre, "TotallyNewGenreXYZ")
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(TaxonomyDomain::Genre), existing.len() + 1);
    }

    #[test]
    fn test_new_ids_increase() {
        let registry = TaxonomyRegistry::new();
        let base = registry.len(TaxonomyDomain::Genre) as u32;
        let a = registry.resolve(TaxonomyDomain::Genre, "Mumblecore").unwrap();
        let b = registry.resolve(TaxonomyDomain::Genre, "Giallo").unwrap();
        assert_eq!(a.canonical_id, base);
        assert_eq!(b.canonical_id, base + 1);
        assert_eq!(registry.get(TaxonomyDomain::Genre, base), Some(a));
    }

    #[test]
    fn test_domains_are_independent() {
        let registry = TaxonomyRegistry::new();
        let sources_before = registry.len(TaxonomyDomain::MediaSource);
        registry.resolve(TaxonomyDomain::Genre, "Cyberpunk Opera");
        assert_eq!(registry.len(TaxonomyDomain::MediaSource), sources_before);

        let bluray = registry
            .resolve(TaxonomyDomain::MediaSource, "BDRip")
            .unwrap();
        assert_eq!(bluray.canonical_name, "BLURAY");
    }

    #[test]
    fn test_blank_text_resolves_to_nothing() {
        let registry = TaxonomyRegistry::new();
        let before = registry.len(TaxonomyDomain::Genre);
        assert!(registry.resolve(TaxonomyDomain::Genre, "   ").is_none());
        assert_eq!(registry.len(TaxonomyDomain::Genre), before);
    }

    #[test]
    fn test_canonical_name_collision_gets_suffix() {
        let registry = TaxonomyRegistry::new();
        // Punctuation-only difference from a built-in canonical name that no
        // alternate covers
        let value = registry
            .resolve(TaxonomyDomain::Genre, "Game!Show?")
            .unwrap();
        assert_ne!(value.canonical_name, "GAME_SHOW");
        assert!(value.canonical_name.starts_with("GAME_SHOW_"));
    }

    #[test]
    fn test_localized_name() {
        let registry = TaxonomyRegistry::new();
        let comedy = registry.find(TaxonomyDomain::Genre, "Comedy").unwrap();
        assert_eq!(registry.localized_name(&comedy, "de"), "Komödie");
        assert_eq!(registry.localized_name(&comedy, "de_AT"), "Komödie");
        assert_eq!(registry.localized_name(&comedy, "fr"), "Comédie");
        // Unknown locale falls back to the display name
        assert_eq!(registry.localized_name(&comedy, "xx"), "Comedy");
    }

    #[test]
    fn test_split_locale() {
        assert_eq!(split_locale("de-Komödie"), (Some("de"), "Komödie"));
        assert_eq!(split_locale("Sci-Fi"), (None, "Sci-Fi"));
        assert_eq!(split_locale("Film-Noir"), (None, "Film-Noir"));
        assert_eq!(split_locale("fr-Science-Fiction"), (Some("fr"), "Science-Fiction"));
    }

    #[test]
    fn test_resolve_all_dedups() {
        let registry = TaxonomyRegistry::new();
        let values = registry.resolve_all(
            TaxonomyDomain::Genre,
            ["Sci-Fi", "Science Fiction", "", "Drama"],
        );
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].canonical_name, "SCIENCE_FICTION");
        assert_eq!(values[1].canonical_name, "DRAMA");
    }

    #[test]
    fn test_concurrent_resolution_registers_once() {
        let registry = Arc::new(TaxonomyRegistry::new());
        let before = registry.len(TaxonomyDomain::Genre);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .resolve(TaxonomyDomain::Genre, "Solarpunk")
                        .unwrap()
                        .canonical_id
                })
            })
            .collect();

        let ids: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(registry.len(TaxonomyDomain::Genre), before + 1);
    }
}
