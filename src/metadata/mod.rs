//! Provider-agnostic scrape results.
//!
//! A [`MetadataDocument`] collects whatever one or more providers returned for
//! an item. It has a single merge contract:
//!
//! - Scalar fields: the first non-empty value wins. Later stores are ignored.
//! - Cast: append-only.
//! - Artwork: append, de-duplicated on `(type, source_url)`.
//! - External IDs: last write wins per provider key.
//! - Genres and certifications: append, de-duplicated.
//!
//! Getters never fail. A missing field reads as `""`, `0`, `0.0` or `None`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::ArtworkType;
use crate::taxonomy::Country;

/// The fixed set of scalar fields a scrape can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Title,
    OriginalTitle,
    SortTitle,
    Plot,
    Tagline,
    Year,
    Rating,
    Votes,
    Runtime,
    ReleaseDate,
    Studio,
    Publisher,
    Developer,
    Platform,
    /// Release medium, resolved through the media source taxonomy
    MediaSource,
    PosterUrl,
    FanartUrl,
    TrailerUrl,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same spelling as the serde representation
        let name = match self {
            Self::Title => "title",
            Self::OriginalTitle => "original_title",
            Self::SortTitle => "sort_title",
            Self::Plot => "plot",
            Self::Tagline => "tagline",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::Votes => "votes",
            Self::Runtime => "runtime",
            Self::ReleaseDate => "release_date",
            Self::Studio => "studio",
            Self::Publisher => "publisher",
            Self::Developer => "developer",
            Self::Platform => "platform",
            Self::MediaSource => "media_source",
            Self::PosterUrl => "poster_url",
            Self::FanartUrl => "fanart_url",
            Self::TrailerUrl => "trailer_url",
        };
        f.write_str(name)
    }
}

/// A stored scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Blank text, zero and NaN count as empty (providers use them for "unknown").
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Int(i) => *i == 0,
            FieldValue::Float(f) => f.is_nan() || *f == 0.0,
            FieldValue::Date(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

/// What a cast member did on the production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    #[default]
    Actor,
    Director,
    Writer,
    Producer,
}

/// A person credited on the item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    /// Character name for actors, job title for crew
    pub role: String,
    pub kind: CastKind,
    pub thumb_url: Option<String>,
    pub profile_url: Option<String>,
}

impl CastMember {
    pub fn actor(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            kind: CastKind::Actor,
            ..Default::default()
        }
    }

    pub fn crew(name: impl Into<String>, kind: CastKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }
}

/// An artwork offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkDescriptor {
    pub artwork_type: ArtworkType,
    pub source_url: String,
    /// Smaller rendition for selection dialogs
    pub preview_url: Option<String>,
    pub width: u32,
    pub height: u32,
    /// ISO-639-1 language of any text on the image
    pub language: Option<String>,
}

impl ArtworkDescriptor {
    pub fn new(artwork_type: ArtworkType, source_url: impl Into<String>) -> Self {
        Self {
            artwork_type,
            source_url: source_url.into(),
            preview_url: None,
            width: 0,
            height: 0,
            language: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Result of one or more scrape calls for a single item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataDocument {
    fields: BTreeMap<MetadataField, FieldValue>,
    cast: Vec<CastMember>,
    artwork: Vec<ArtworkDescriptor>,
    external_ids: Vec<(String, String)>,
    genres: Vec<String>,
    certifications: Vec<(Country, String)>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d %B %Y", "%B %d, %Y"];

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a scalar. Ignored if the field already holds a non-empty value
    /// or if `value` itself is empty.
    pub fn store(&mut self, field: MetadataField, value: impl Into<FieldValue>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        match self.fields.get(&field) {
            Some(existing) if !existing.is_empty() => {
                tracing::trace!(%field, "Keeping existing value");
            }
            _ => {
                self.fields.insert(field, value);
            }
        }
    }

    /// Whether a field holds a non-empty value.
    pub fn has(&self, field: MetadataField) -> bool {
        self.fields.get(&field).is_some_and(|v| !v.is_empty())
    }

    /// Raw access to a stored value.
    pub fn get(&self, field: MetadataField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Field as text; `""` when absent.
    pub fn get_string(&self, field: MetadataField) -> String {
        match self.fields.get(&field) {
            Some(FieldValue::Text(s)) => s.clone(),
            Some(FieldValue::Int(i)) => i.to_string(),
            Some(FieldValue::Float(f)) => f.to_string(),
            Some(FieldValue::Date(d)) => d.format("%Y-%m-%d").to_string(),
            None => String::new(),
        }
    }

    /// Field as integer; `0` when absent or unparsable.
    pub fn get_int(&self, field: MetadataField) -> i64 {
        match self.fields.get(&field) {
            Some(FieldValue::Int(i)) => *i,
            Some(FieldValue::Float(f)) if f.is_finite() => f.trunc() as i64,
            Some(FieldValue::Text(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| parse_float(s).map(|f| f.trunc() as i64))
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Field as float; `0.0` when absent or unparsable.
    pub fn get_float(&self, field: MetadataField) -> f64 {
        match self.fields.get(&field) {
            Some(FieldValue::Float(f)) if !f.is_nan() => *f,
            Some(FieldValue::Int(i)) => *i as f64,
            Some(FieldValue::Text(s)) => parse_float(s).unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Field as date; `None` when absent or unparsable.
    pub fn get_date(&self, field: MetadataField) -> Option<NaiveDate> {
        match self.fields.get(&field)? {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(s) => {
                let s = s.trim();
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            }
            _ => None,
        }
    }

    pub fn add_cast_member(&mut self, member: CastMember) {
        if member.name.trim().is_empty() {
            return;
        }
        self.cast.push(member);
    }

    /// Append an artwork unless one with the same type and source URL exists.
    pub fn add_artwork(&mut self, artwork: ArtworkDescriptor) {
        if artwork.source_url.trim().is_empty() {
            return;
        }
        let duplicate = self.artwork.iter().any(|a| {
            a.artwork_type == artwork.artwork_type && a.source_url == artwork.source_url
        });
        if !duplicate {
            self.artwork.push(artwork);
        }
    }

    /// Set the id for a provider key, replacing any previous id in place.
    pub fn add_external_id(&mut self, provider_key: impl Into<String>, id: impl Into<String>) {
        let key = provider_key.into();
        let id = id.into();
        if key.trim().is_empty() || id.trim().is_empty() {
            return;
        }
        match self.external_ids.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = id,
            None => self.external_ids.push((key, id)),
        }
    }

    /// Append a genre string, ignoring case-insensitive duplicates.
    pub fn add_genre(&mut self, genre: impl Into<String>) {
        let genre = genre.into();
        let genre = genre.trim();
        if genre.is_empty() {
            return;
        }
        let lower = genre.to_lowercase();
        if !self.genres.iter().any(|g| g.to_lowercase() == lower) {
            self.genres.push(genre.to_string());
        }
    }

    /// Append a certification string for a country.
    pub fn add_certification(&mut self, country: Country, text: impl Into<String>) {
        let text = text.into();
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self
            .certifications
            .iter()
            .any(|(c, t)| *c == country && t == text)
        {
            self.certifications.push((country, text.to_string()));
        }
    }

    pub fn cast(&self) -> &[CastMember] {
        &self.cast
    }

    pub fn artwork(&self) -> &[ArtworkDescriptor] {
        &self.artwork
    }

    /// Artwork of one type, in insertion order.
    pub fn artwork_of(&self, artwork_type: ArtworkType) -> impl Iterator<Item = &ArtworkDescriptor> {
        self.artwork
            .iter()
            .filter(move |a| a.artwork_type == artwork_type)
    }

    pub fn external_ids(&self) -> &[(String, String)] {
        &self.external_ids
    }

    pub fn external_id(&self, provider_key: &str) -> Option<&str> {
        self.external_ids
            .iter()
            .find(|(k, _)| k == provider_key)
            .map(|(_, v)| v.as_str())
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn certifications(&self) -> &[(Country, String)] {
        &self.certifications
    }

    /// First certification string recorded for a country.
    pub fn certification_for(&self, country: Country) -> Option<&str> {
        self.certifications
            .iter()
            .find(|(c, _)| *c == country)
            .map(|(_, t)| t.as_str())
    }

    /// Fold another document into this one using the same rules as the
    /// individual setters.
    pub fn merge_from(&mut self, other: &MetadataDocument) {
        for (field, value) in &other.fields {
            self.store(*field, value.clone());
        }
        for member in &other.cast {
            self.add_cast_member(member.clone());
        }
        for artwork in &other.artwork {
            self.add_artwork(artwork.clone());
        }
        for (key, id) in &other.external_ids {
            self.add_external_id(key.clone(), id.clone());
        }
        for genre in &other.genres {
            self.add_genre(genre.clone());
        }
        for (country, text) in &other.certifications {
            self.add_certification(*country, text.clone());
        }
    }
}

/// Parse a float, accepting a decimal comma.
fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    s.parse::<f64>()
        .ok()
        .or_else(|| s.replace(',', ".").parse::<f64>().ok())
        .filter(|f| !f.is_nan())
}
