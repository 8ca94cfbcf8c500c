//! In-memory sidecar: typed content plus the extension bag.

use serde::Serialize;

use super::parser::{TopLevel, XmlElement};
use super::schema::{self, Slot};
use super::trailer;
use crate::metadata::{CastKind, CastMember, MetadataDocument, MetadataField};
use crate::model::{EntityKind, MediaItem};
use crate::taxonomy::Country;

/// `<uniqueid type=".." default="..">`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueId {
    pub provider: String,
    pub value: String,
    pub default: bool,
}

/// `<actor>`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Actor {
    pub name: String,
    pub role: String,
    pub thumb: String,
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VideoDetails {
    pub codec: String,
    pub aspect: f32,
    pub width: u32,
    pub height: u32,
    pub duration_secs: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AudioDetails {
    pub codec: String,
    pub language: String,
    pub channels: u32,
}

/// `<fileinfo><streamdetails>`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StreamDetails {
    pub video: Option<VideoDetails>,
    pub audio: Vec<AudioDetails>,
}

/// Values of the known elements. Empty strings, `None` and empty lists are
/// not written.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NfoContent {
    pub title: String,
    pub original_title: String,
    pub sort_title: String,
    pub rating: Option<f32>,
    pub votes: Option<u32>,
    pub year: Option<i32>,
    pub plot: String,
    pub tagline: String,
    pub runtime: Option<u32>,
    /// Text of `<mpaa>` / `<certification>` as stored
    pub certification: String,
    pub unique_ids: Vec<UniqueId>,
    pub legacy_id: String,
    pub premiered: String,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub source: String,
    pub actors: Vec<Actor>,
    pub directors: Vec<String>,
    pub credits: Vec<String>,
    /// Playback URI form
    pub trailer: String,
    pub publisher: String,
    pub developer: String,
    pub platform: String,
    pub stream_details: Option<StreamDetails>,
}

/// An unknown root child, kept byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extension {
    pub tag: String,
    pub raw: String,
}

/// A sidecar file as loaded or about to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidecarDocument {
    pub kind: EntityKind,
    pub content: NfoContent,
    pub extensions: Vec<Extension>,
}

fn set_text(target: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *target = value.to_string();
    }
}

fn parse_num<T: std::str::FromStr>(element: &XmlElement) -> Option<T> {
    let text = element.text.trim();
    text.parse()
        .ok()
        .or_else(|| text.replace(',', ".").parse().ok())
}

impl SidecarDocument {
    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            content: NfoContent::default(),
            extensions: Vec::new(),
        }
    }

    /// Sort parsed root children into typed content and extensions.
    pub(crate) fn from_children(kind: EntityKind, children: Vec<TopLevel>) -> Self {
        let mut doc = Self::empty(kind);
        for child in children {
            match schema::slot_for(kind, &child.element.name) {
                Some(slot) => doc.content.apply(slot, &child.element),
                None => doc.extensions.push(Extension {
                    tag: child.element.name,
                    raw: child.raw,
                }),
            }
        }
        doc
    }

    /// Overwrite known fields with the item's current state.
    ///
    /// Fields the item leaves empty keep their loaded value. Extensions are
    /// never touched.
    pub fn merge_item(&mut self, item: &MediaItem) {
        let details = item.details();
        let c = &mut self.content;

        set_text(&mut c.title, &details.title);
        set_text(&mut c.original_title, &details.original_title);
        set_text(&mut c.sort_title, &details.sort_title);
        set_text(&mut c.plot, &details.plot);
        set_text(&mut c.tagline, &details.tagline);
        set_text(&mut c.publisher, &details.publisher);
        set_text(&mut c.developer, &details.developer);
        set_text(&mut c.platform, &details.platform);

        if details.rating > 0.0 {
            c.rating = Some(details.rating);
        }
        if details.votes > 0 {
            c.votes = Some(details.votes);
        }
        if details.year > 0 {
            c.year = Some(details.year);
        }
        if details.runtime > 0 {
            c.runtime = Some(details.runtime);
        }
        if let Some(date) = details.premiered {
            c.premiered = date.format("%Y-%m-%d").to_string();
        }
        if let Some(cert) = details.certification {
            c.certification = cert.name.to_string();
        }

        if !details.external_ids.is_empty() {
            let default_key = details
                .external_ids
                .iter()
                .find(|(k, _)| k == "imdb")
                .or_else(|| details.external_ids.first())
                .map(|(k, _)| k.clone());
            c.unique_ids = details
                .external_ids
                .iter()
                .map(|(k, v)| UniqueId {
                    provider: k.clone(),
                    value: v.clone(),
                    default: Some(k) == default_key.as_ref(),
                })
                .collect();
            if let Some(id) = c.unique_ids.iter().find(|u| u.default) {
                c.legacy_id = id.value.clone();
            }
        }

        if !details.genres.is_empty() {
            c.genres = details
                .genres
                .iter()
                .map(|g| g.display_name.clone())
                .collect();
        }
        if let Some(source) = &details.media_source {
            c.source = source.display_name.clone();
        }

        let studios: Vec<String> = details
            .production_company
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if !studios.is_empty() {
            c.studios = studios;
        }

        if !details.cast.is_empty() {
            let names = |kind: CastKind| -> Vec<String> {
                details
                    .cast
                    .iter()
                    .filter(|m| m.kind == kind)
                    .map(|m| m.name.clone())
                    .collect()
            };
            c.actors = details
                .cast
                .iter()
                .filter(|m| m.kind == CastKind::Actor)
                .map(|m| Actor {
                    name: m.name.clone(),
                    role: m.role.clone(),
                    thumb: m.thumb_url.clone().unwrap_or_default(),
                    profile: m.profile_url.clone().unwrap_or_default(),
                })
                .collect();
            c.directors = names(CastKind::Director);
            c.credits = names(CastKind::Writer);
        }

        if !details.trailer_url.trim().is_empty() {
            c.trailer = trailer::to_playback_uri(&details.trailer_url);
        }

        if let Some(video) = item.main_video_file() {
            c.stream_details = Some(StreamDetails {
                video: Some(VideoDetails {
                    codec: video.video_codec.clone(),
                    aspect: video.effective_aspect_ratio(),
                    width: video.width,
                    height: video.height,
                    duration_secs: video.duration_secs,
                }),
                audio: video
                    .audio_streams
                    .iter()
                    .map(|a| AudioDetails {
                        codec: a.codec.clone(),
                        language: a.language.clone(),
                        channels: a.channels,
                    })
                    .collect(),
            });
        }
    }

    /// Read the sidecar back as a scrape result.
    ///
    /// The certification text is recorded for `country`; resolving it
    /// against the table happens when the document is applied to an item.
    pub fn to_metadata(&self, country: Country) -> MetadataDocument {
        let c = &self.content;
        let mut doc = MetadataDocument::new();

        doc.store(MetadataField::Title, c.title.as_str());
        doc.store(MetadataField::OriginalTitle, c.original_title.as_str());
        doc.store(MetadataField::SortTitle, c.sort_title.as_str());
        doc.store(MetadataField::Plot, c.plot.as_str());
        doc.store(MetadataField::Tagline, c.tagline.as_str());
        doc.store(MetadataField::ReleaseDate, c.premiered.as_str());
        doc.store(MetadataField::Publisher, c.publisher.as_str());
        doc.store(MetadataField::Developer, c.developer.as_str());
        doc.store(MetadataField::Platform, c.platform.as_str());
        doc.store(MetadataField::Studio, c.studios.join(", "));
        doc.store(MetadataField::MediaSource, c.source.as_str());
        if let Some(rating) = c.rating {
            doc.store(MetadataField::Rating, rating);
        }
        if let Some(votes) = c.votes {
            doc.store(MetadataField::Votes, votes);
        }
        if let Some(year) = c.year {
            doc.store(MetadataField::Year, year);
        }
        if let Some(runtime) = c.runtime {
            doc.store(MetadataField::Runtime, runtime);
        }
        if !c.trailer.is_empty() {
            doc.store(MetadataField::TrailerUrl, trailer::from_playback_uri(&c.trailer));
        }

        for id in &c.unique_ids {
            doc.add_external_id(id.provider.clone(), id.value.clone());
        }
        if c.unique_ids.is_empty() && c.legacy_id.starts_with("tt") {
            doc.add_external_id("imdb", c.legacy_id.clone());
        }
        for genre in &c.genres {
            doc.add_genre(genre.clone());
        }
        doc.add_certification(country, c.certification.clone());

        for actor in &c.actors {
            let mut member = CastMember::actor(actor.name.clone(), actor.role.clone());
            member.thumb_url = (!actor.thumb.is_empty()).then(|| actor.thumb.clone());
            member.profile_url = (!actor.profile.is_empty()).then(|| actor.profile.clone());
            doc.add_cast_member(member);
        }
        for name in &c.directors {
            doc.add_cast_member(CastMember::crew(name.clone(), CastKind::Director));
        }
        for name in &c.credits {
            doc.add_cast_member(CastMember::crew(name.clone(), CastKind::Writer));
        }
        doc
    }
}

impl NfoContent {
    fn apply(&mut self, slot: Slot, e: &XmlElement) {
        let text = e.text.trim();
        match slot {
            Slot::Title => self.title = text.to_string(),
            Slot::OriginalTitle => self.original_title = text.to_string(),
            Slot::SortTitle => self.sort_title = text.to_string(),
            Slot::Rating => self.rating = parse_num(e),
            Slot::Votes => self.votes = parse_num(e),
            Slot::Year => self.year = parse_num(e),
            Slot::Plot => self.plot = text.to_string(),
            Slot::Tagline => self.tagline = text.to_string(),
            Slot::Runtime => self.runtime = parse_num(e),
            Slot::Certification => self.certification = text.to_string(),
            Slot::UniqueId => {
                if let Some(provider) = e.attribute("type")
                    && !text.is_empty()
                {
                    self.unique_ids.push(UniqueId {
                        provider: provider.to_string(),
                        value: text.to_string(),
                        default: e.attribute("default") == Some("true"),
                    });
                }
            }
            Slot::LegacyId => self.legacy_id = text.to_string(),
            Slot::Premiered => self.premiered = text.to_string(),
            Slot::Genre => push_non_empty(&mut self.genres, text),
            Slot::Studio => push_non_empty(&mut self.studios, text),
            Slot::Source => self.source = text.to_string(),
            Slot::Actor => {
                let name = e.child_text("name").unwrap_or_default();
                if !name.is_empty() {
                    self.actors.push(Actor {
                        name: name.to_string(),
                        role: e.child_text("role").unwrap_or_default().to_string(),
                        thumb: e.child_text("thumb").unwrap_or_default().to_string(),
                        profile: e.child_text("profile").unwrap_or_default().to_string(),
                    });
                }
            }
            Slot::Director => push_non_empty(&mut self.directors, text),
            Slot::Credits => push_non_empty(&mut self.credits, text),
            Slot::Trailer => self.trailer = text.to_string(),
            Slot::Publisher => self.publisher = text.to_string(),
            Slot::Developer => self.developer = text.to_string(),
            Slot::Platform => self.platform = text.to_string(),
            Slot::FileInfo => {
                let Some(details) = e.child("streamdetails") else {
                    return;
                };
                let num = |el: &XmlElement, name: &str| -> u32 {
                    el.child_text(name).and_then(|t| t.parse().ok()).unwrap_or(0)
                };
                let video = details.child("video").map(|v| VideoDetails {
                    codec: v.child_text("codec").unwrap_or_default().to_string(),
                    aspect: v
                        .child_text("aspect")
                        .and_then(|t| t.parse().ok())
                        .unwrap_or(0.0),
                    width: num(v, "width"),
                    height: num(v, "height"),
                    duration_secs: num(v, "durationinseconds"),
                });
                let audio = details
                    .children
                    .iter()
                    .filter(|c| c.name == "audio")
                    .map(|a| AudioDetails {
                        codec: a.child_text("codec").unwrap_or_default().to_string(),
                        language: a.child_text("language").unwrap_or_default().to_string(),
                        channels: num(a, "channels"),
                    })
                    .collect();
                self.stream_details = Some(StreamDetails { video, audio });
            }
        }
    }
}

fn push_non_empty(list: &mut Vec<String>, text: &str) {
    if !text.is_empty() {
        list.push(text.to_string());
    }
}
