//! Core data models for the media library.
//!
//! Defines the [`Entity`] capability trait the artwork pipeline and sidecar
//! writer work against, and [`MediaItem`], the concrete movie/TV show/game
//! record.
//!
//! A `MediaItem` is shared as `Arc<MediaItem>` between the scrape workflow and
//! background artwork tasks, so its mutable state lives behind
//! `parking_lot::RwLock`s.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metadata::{CastMember, MetadataDocument, MetadataField};
use crate::taxonomy::{
    Certification, CertificationTable, Country, TaxonomyDomain, TaxonomyRegistry, TaxonomyValue,
};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of library entity. Decides the sidecar root element and field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Movie,
    TvShow,
    Game,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Movie, EntityKind::TvShow, EntityKind::Game];

    /// Root element name of the sidecar.
    pub fn root_tag(&self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::TvShow => "tvshow",
            EntityKind::Game => "game",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Some(EntityKind::Movie),
            "tvshow" | "tv" | "show" => Some(EntityKind::TvShow),
            "game" => Some(EntityKind::Game),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_tag())
    }
}

/// Artwork slots an entity can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkType {
    Poster,
    Fanart,
    Banner,
    ClearArt,
    ClearLogo,
    Disc,
    Thumb,
    Landscape,
    KeyArt,
}

impl ArtworkType {
    pub const ALL: [ArtworkType; 9] = [
        ArtworkType::Poster,
        ArtworkType::Fanart,
        ArtworkType::Banner,
        ArtworkType::ClearArt,
        ArtworkType::ClearLogo,
        ArtworkType::Disc,
        ArtworkType::Thumb,
        ArtworkType::Landscape,
        ArtworkType::KeyArt,
    ];

    /// Filename suffix, as in `<base>-poster.jpg`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkType::Poster => "poster",
            ArtworkType::Fanart => "fanart",
            ArtworkType::Banner => "banner",
            ArtworkType::ClearArt => "clearart",
            ArtworkType::ClearLogo => "clearlogo",
            ArtworkType::Disc => "disc",
            ArtworkType::Thumb => "thumb",
            ArtworkType::Landscape => "landscape",
            ArtworkType::KeyArt => "keyart",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for ArtworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a file belonging to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFileType {
    Video,
    Audio,
    Subtitle,
    Trailer,
    Nfo,
    Graphic,
}

/// One audio track of a video file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioStream {
    pub codec: String,
    /// ISO-639 language code (empty if unknown)
    pub language: String,
    pub channels: u32,
}

/// A file on disk belonging to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub file_type: MediaFileType,
    pub video_codec: String,
    pub width: u32,
    pub height: u32,
    /// Display aspect ratio (0.0 if unknown)
    pub aspect_ratio: f32,
    pub duration_secs: u32,
    pub audio_streams: Vec<AudioStream>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, file_type: MediaFileType) -> Self {
        Self {
            path: path.into(),
            file_type,
            video_codec: String::new(),
            width: 0,
            height: 0,
            aspect_ratio: 0.0,
            duration_secs: 0,
            audio_streams: Vec::new(),
        }
    }

    /// Filename without extension.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Aspect ratio, derived from the resolution when not probed.
    pub fn effective_aspect_ratio(&self) -> f32 {
        if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else if self.height > 0 {
            self.width as f32 / self.height as f32
        } else {
            0.0
        }
    }
}

/// What the artwork pipeline and sidecar writer need from an entity.
///
/// Implementations are shared across tasks, so every method takes `&self`.
pub trait Entity: Send + Sync {
    fn id(&self) -> EntityId;

    /// Directory the entity lives in.
    fn path(&self) -> PathBuf;

    fn media_files(&self, file_type: MediaFileType) -> Vec<MediaFile>;

    /// Current local file for an artwork type.
    fn artwork(&self, artwork_type: ArtworkType) -> Option<PathBuf>;

    fn set_artwork(&self, path: PathBuf, artwork_type: ArtworkType);

    fn clear_artwork(&self, artwork_type: ArtworkType);

    /// Persist the entity. Opaque to this crate.
    fn save_to_db(&self) -> Result<()>;

    /// Called after a new primary artwork has been published.
    fn artwork_written(&self, artwork_type: ArtworkType);
}

/// Persistence backend behind [`MediaItem::save_to_db`].
pub trait ItemStore: Send + Sync {
    fn save(&self, item: &MediaItem) -> Result<()>;
}

/// Scalar and list metadata of an item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemDetails {
    pub title: String,
    pub original_title: String,
    pub sort_title: String,
    pub plot: String,
    pub tagline: String,
    pub year: i32,
    pub rating: f32,
    pub votes: u32,
    /// Minutes
    pub runtime: u32,
    pub premiered: Option<NaiveDate>,
    /// Comma separated, one `<studio>` per entry in sidecars
    pub production_company: String,
    pub publisher: String,
    pub developer: String,
    pub platform: String,
    pub genres: Vec<Arc<TaxonomyValue>>,
    pub media_source: Option<Arc<TaxonomyValue>>,
    pub certification: Option<Certification>,
    /// Provider key to id, in insertion order
    pub external_ids: Vec<(String, String)>,
    pub cast: Vec<CastMember>,
    pub trailer_url: String,
}

impl ItemDetails {
    pub fn external_id(&self, provider_key: &str) -> Option<&str> {
        self.external_ids
            .iter()
            .find(|(k, _)| k == provider_key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_external_id(&mut self, provider_key: &str, id: &str) {
        match self.external_ids.iter_mut().find(|(k, _)| k == provider_key) {
            Some(entry) => entry.1 = id.to_string(),
            None => self
                .external_ids
                .push((provider_key.to_string(), id.to_string())),
        }
    }
}

/// A movie, TV show or game in the library.
pub struct MediaItem {
    id: EntityId,
    kind: EntityKind,
    path: PathBuf,
    details: RwLock<ItemDetails>,
    media_files: RwLock<Vec<MediaFile>>,
    artwork: RwLock<HashMap<ArtworkType, PathBuf>>,
    nfo_files: RwLock<Vec<PathBuf>>,
    written_artwork: RwLock<Vec<ArtworkType>>,
    store: Option<Arc<dyn ItemStore>>,
}

impl fmt::Debug for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaItem")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("title", &self.details.read().title)
            .finish_non_exhaustive()
    }
}

impl MediaItem {
    pub fn new(kind: EntityKind, path: impl Into<PathBuf>) -> Self {
        Self {
            id: EntityId::next(),
            kind,
            path: path.into(),
            details: RwLock::new(ItemDetails::default()),
            media_files: RwLock::new(Vec::new()),
            artwork: RwLock::new(HashMap::new()),
            nfo_files: RwLock::new(Vec::new()),
            written_artwork: RwLock::new(Vec::new()),
            store: None,
        }
    }

    /// Attach a persistence backend.
    pub fn with_store(mut self, store: Arc<dyn ItemStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn dir(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current metadata.
    pub fn details(&self) -> ItemDetails {
        self.details.read().clone()
    }

    /// Mutate metadata in place.
    pub fn update_details<R>(&self, f: impl FnOnce(&mut ItemDetails) -> R) -> R {
        f(&mut self.details.write())
    }

    pub fn add_media_file(&self, file: MediaFile) {
        self.media_files.write().push(file);
    }

    /// First video file, used for stream details and `<stem>.nfo` naming.
    pub fn main_video_file(&self) -> Option<MediaFile> {
        self.media_files
            .read()
            .iter()
            .find(|f| f.file_type == MediaFileType::Video)
            .cloned()
    }

    /// Sidecar files written by the last successful write.
    pub fn nfo_files(&self) -> Vec<PathBuf> {
        self.nfo_files.read().clone()
    }

    /// Replace the tracked sidecar set.
    pub fn set_nfo_files(&self, files: Vec<PathBuf>) {
        *self.nfo_files.write() = files;
    }

    /// Artwork types published so far, in completion order.
    pub fn written_artwork(&self) -> Vec<ArtworkType> {
        self.written_artwork.read().clone()
    }

    /// Copy a scrape result onto the item.
    ///
    /// Non-empty document values replace the current ones. Genre and media
    /// source strings are resolved through the registry (unknown ones extend
    /// it). Certification
    /// strings are matched against `country`'s table; unknown ones are dropped.
    pub fn apply_metadata(
        &self,
        doc: &MetadataDocument,
        registry: &TaxonomyRegistry,
        certifications: &CertificationTable,
        country: Country,
    ) {
        let mut details = self.details.write();

        let set_text = |field: MetadataField, target: &mut String| {
            if doc.has(field) {
                *target = doc.get_string(field);
            }
        };
        set_text(MetadataField::Title, &mut details.title);
        set_text(MetadataField::OriginalTitle, &mut details.original_title);
        set_text(MetadataField::SortTitle, &mut details.sort_title);
        set_text(MetadataField::Plot, &mut details.plot);
        set_text(MetadataField::Tagline, &mut details.tagline);
        set_text(MetadataField::Studio, &mut details.production_company);
        set_text(MetadataField::Publisher, &mut details.publisher);
        set_text(MetadataField::Developer, &mut details.developer);
        set_text(MetadataField::Platform, &mut details.platform);
        set_text(MetadataField::TrailerUrl, &mut details.trailer_url);

        if doc.has(MetadataField::Year) {
            let year = doc.get_int(MetadataField::Year);
            match i32::try_from(year) {
                Ok(year) => details.year = year,
                Err(_) => tracing::warn!(item = %self.id, year, "Year out of range, dropped"),
            }
        }
        if doc.has(MetadataField::Rating) {
            details.rating = doc.get_float(MetadataField::Rating) as f32;
        }
        if doc.has(MetadataField::Votes) {
            details.votes = doc.get_int(MetadataField::Votes).max(0) as u32;
        }
        if doc.has(MetadataField::Runtime) {
            details.runtime = doc.get_int(MetadataField::Runtime).max(0) as u32;
        }
        if let Some(date) = doc.get_date(MetadataField::ReleaseDate) {
            details.premiered = Some(date);
            if details.year == 0 {
                details.year = chrono::Datelike::year(&date);
            }
        }

        if !doc.genres().is_empty() {
            details.genres = registry.resolve_all(
                TaxonomyDomain::Genre,
                doc.genres().iter().map(String::as_str),
            );
        }

        if doc.has(MetadataField::MediaSource) {
            let text = doc.get_string(MetadataField::MediaSource);
            if let Some(source) = registry.resolve(TaxonomyDomain::MediaSource, &text) {
                details.media_source = Some(source);
            }
        }

        let certification = doc
            .certifications()
            .iter()
            .filter(|(c, _)| *c == country)
            .find_map(|(_, text)| certifications.resolve(country, text));
        match certification {
            Some(cert) => details.certification = Some(cert),
            None if !doc.certifications().is_empty() => {
                tracing::debug!(item = %self.id, %country, "No matching certification, dropped");
            }
            None => {}
        }

        for (key, id) in doc.external_ids() {
            details.set_external_id(key, id);
        }

        if !doc.cast().is_empty() {
            details.cast = doc.cast().to_vec();
        }
    }
}

impl Entity for MediaItem {
    fn id(&self) -> EntityId {
        self.id
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn media_files(&self, file_type: MediaFileType) -> Vec<MediaFile> {
        self.media_files
            .read()
            .iter()
            .filter(|f| f.file_type == file_type)
            .cloned()
            .collect()
    }

    fn artwork(&self, artwork_type: ArtworkType) -> Option<PathBuf> {
        self.artwork.read().get(&artwork_type).cloned()
    }

    fn set_artwork(&self, path: PathBuf, artwork_type: ArtworkType) {
        self.artwork.write().insert(artwork_type, path);
    }

    fn clear_artwork(&self, artwork_type: ArtworkType) {
        self.artwork.write().remove(&artwork_type);
    }

    fn save_to_db(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(self),
            None => Ok(()),
        }
    }

    fn artwork_written(&self, artwork_type: ArtworkType) {
        tracing::debug!(item = %self.id, %artwork_type, "Artwork published");
        self.written_artwork.write().push(artwork_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ArtworkDescriptor;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = MediaItem::new(EntityKind::Movie, "/movies/a");
        let b = MediaItem::new(EntityKind::Movie, "/movies/b");
        assert_ne!(Entity::id(&a), Entity::id(&b));
    }

    #[test]
    fn test_artwork_type_parse() {
        for t in ArtworkType::ALL {
            assert_eq!(ArtworkType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ArtworkType::parse("POSTER"), Some(ArtworkType::Poster));
        assert_eq!(ArtworkType::parse("nope"), None);
    }

    #[test]
    fn test_artwork_reference_map() {
        let item = MediaItem::new(EntityKind::Movie, "/movies/alien");
        assert!(item.artwork(ArtworkType::Poster).is_none());

        item.set_artwork("/movies/alien/alien-poster.jpg".into(), ArtworkType::Poster);
        assert_eq!(
            item.artwork(ArtworkType::Poster),
            Some(PathBuf::from("/movies/alien/alien-poster.jpg"))
        );

        item.clear_artwork(ArtworkType::Poster);
        assert!(item.artwork(ArtworkType::Poster).is_none());
    }

    #[test]
    fn test_apply_metadata() {
        let registry = TaxonomyRegistry::new();
        let certs = CertificationTable::new();
        let item = MediaItem::new(EntityKind::Movie, "/movies/alien");

        let mut doc = MetadataDocument::new();
        doc.store(MetadataField::Title, "Alien");
        doc.store(MetadataField::Rating, 8.5);
        doc.store(MetadataField::ReleaseDate, "1979-05-25");
        doc.add_genre("Sci-Fi");
        doc.add_genre("Horror");
        doc.add_certification(Country::DE, "FSK 16");
        doc.add_certification(Country::US, "Rated R");
        doc.add_external_id("imdb", "tt0078748");
        doc.add_cast_member(CastMember::actor("Sigourney Weaver", "Ripley"));
        doc.add_artwork(ArtworkDescriptor::new(ArtworkType::Poster, "https://img/p.jpg"));

        item.apply_metadata(&doc, &registry, &certs, Country::US);

        let details = item.details();
        assert_eq!(details.title, "Alien");
        assert_eq!(details.year, 1979);
        assert_eq!(details.rating, 8.5);
        let genres: Vec<_> = details.genres.iter().map(|g| g.canonical_name.as_str()).collect();
        assert_eq!(genres, ["SCIENCE_FICTION", "HORROR"]);
        assert_eq!(details.certification.map(|c| c.name), Some("R"));
        assert_eq!(details.external_id("imdb"), Some("tt0078748"));
        assert_eq!(details.cast.len(), 1);
    }

    #[test]
    fn test_apply_metadata_drops_unknown_certification() {
        let registry = TaxonomyRegistry::new();
        let certs = CertificationTable::new();
        let item = MediaItem::new(EntityKind::Movie, "/movies/x");

        let mut doc = MetadataDocument::new();
        doc.add_certification(Country::US, "Approved by grandma");
        item.apply_metadata(&doc, &registry, &certs, Country::US);

        assert!(item.details().certification.is_none());
    }

    #[test]
    fn test_apply_metadata_keeps_values_for_empty_fields() {
        let registry = TaxonomyRegistry::new();
        let certs = CertificationTable::new();
        let item = MediaItem::new(EntityKind::Movie, "/movies/x");
        item.update_details(|d| d.plot = "Existing plot".to_string());

        let mut doc = MetadataDocument::new();
        doc.store(MetadataField::Title, "Title");
        item.apply_metadata(&doc, &registry, &certs, Country::US);

        assert_eq!(item.details().plot, "Existing plot");
    }

    #[test]
    fn test_apply_metadata_resolves_media_source() {
        let registry = TaxonomyRegistry::new();
        let certs = CertificationTable::new();
        let item = MediaItem::new(EntityKind::Movie, "/movies/alien");

        let mut doc = MetadataDocument::new();
        doc.store(MetadataField::MediaSource, "BDRip");
        item.apply_metadata(&doc, &registry, &certs, Country::US);

        let source = item.details().media_source.unwrap();
        assert_eq!(source.canonical_name, "BLURAY");
        assert_eq!(source.display_name, "Blu-ray");

        // An empty document leaves the source alone
        item.apply_metadata(&MetadataDocument::new(), &registry, &certs, Country::US);
        assert!(item.details().media_source.is_some());
    }

    #[test]
    fn test_apply_metadata_drops_out_of_range_year() {
        let registry = TaxonomyRegistry::new();
        let certs = CertificationTable::new();
        let item = MediaItem::new(EntityKind::Movie, "/movies/x");
        item.update_details(|d| d.year = 1979);

        let mut doc = MetadataDocument::new();
        doc.store(MetadataField::Year, i64::from(i32::MAX) + 1);
        item.apply_metadata(&doc, &registry, &certs, Country::US);

        assert_eq!(item.details().year, 1979);
    }

    #[test]
    fn test_save_to_db_without_store_is_noop() {
        let item = MediaItem::new(EntityKind::Game, "/games/x");
        assert!(item.save_to_db().is_ok());
    }

    #[test]
    fn test_save_to_db_uses_store() {
        use crate::test_utils::MockStore;

        let store = Arc::new(MockStore::new());
        let item = MediaItem::new(EntityKind::Movie, "/movies/x").with_store(store.clone());
        item.save_to_db().unwrap();
        assert_eq!(store.saves(), 1);

        let failing = Arc::new(MockStore::failing());
        let item = MediaItem::new(EntityKind::Movie, "/movies/y").with_store(failing);
        assert!(matches!(
            item.save_to_db(),
            Err(crate::error::Error::Persistence(_))
        ));
    }

    #[test]
    fn test_main_video_file_and_aspect() {
        let item = MediaItem::new(EntityKind::Movie, "/movies/alien");
        item.add_media_file(MediaFile::new("/movies/alien/poster.jpg", MediaFileType::Graphic));
        let mut video = MediaFile::new("/movies/alien/Alien.mkv", MediaFileType::Video);
        video.width = 1920;
        video.height = 800;
        item.add_media_file(video);

        let main = item.main_video_file().unwrap();
        assert_eq!(main.stem(), Some("Alien"));
        assert!((main.effective_aspect_ratio() - 2.4).abs() < 1e-6);
        assert_eq!(item.media_files(MediaFileType::Graphic).len(), 1);
    }
}
