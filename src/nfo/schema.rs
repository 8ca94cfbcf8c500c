//! Per-kind sidecar field tables.
//!
//! Each table lists the child elements this crate understands, in output
//! order. Every other child element of the root is an extension.

use crate::model::EntityKind;

/// Where a known element is stored in [`super::NfoContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Title,
    OriginalTitle,
    SortTitle,
    Rating,
    Votes,
    Year,
    Plot,
    Tagline,
    Runtime,
    Certification,
    UniqueId,
    LegacyId,
    Premiered,
    Genre,
    Studio,
    Source,
    Actor,
    Director,
    Credits,
    Trailer,
    Publisher,
    Developer,
    Platform,
    FileInfo,
}

/// A known element: tag name plus storage slot.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub tag: &'static str,
    pub slot: Slot,
}

const fn field(tag: &'static str, slot: Slot) -> FieldSpec {
    FieldSpec { tag, slot }
}

const MOVIE: &[FieldSpec] = &[
    field("title", Slot::Title),
    field("originaltitle", Slot::OriginalTitle),
    field("sorttitle", Slot::SortTitle),
    field("rating", Slot::Rating),
    field("votes", Slot::Votes),
    field("year", Slot::Year),
    field("plot", Slot::Plot),
    field("tagline", Slot::Tagline),
    field("runtime", Slot::Runtime),
    field("mpaa", Slot::Certification),
    field("uniqueid", Slot::UniqueId),
    field("id", Slot::LegacyId),
    field("premiered", Slot::Premiered),
    field("genre", Slot::Genre),
    field("studio", Slot::Studio),
    field("source", Slot::Source),
    field("actor", Slot::Actor),
    field("director", Slot::Director),
    field("credits", Slot::Credits),
    field("trailer", Slot::Trailer),
    field("fileinfo", Slot::FileInfo),
];

const TV_SHOW: &[FieldSpec] = &[
    field("title", Slot::Title),
    field("originaltitle", Slot::OriginalTitle),
    field("sorttitle", Slot::SortTitle),
    field("rating", Slot::Rating),
    field("votes", Slot::Votes),
    field("year", Slot::Year),
    field("plot", Slot::Plot),
    field("tagline", Slot::Tagline),
    field("runtime", Slot::Runtime),
    field("mpaa", Slot::Certification),
    field("uniqueid", Slot::UniqueId),
    field("id", Slot::LegacyId),
    field("premiered", Slot::Premiered),
    field("genre", Slot::Genre),
    field("studio", Slot::Studio),
    field("actor", Slot::Actor),
    field("trailer", Slot::Trailer),
];

const GAME: &[FieldSpec] = &[
    field("title", Slot::Title),
    field("originaltitle", Slot::OriginalTitle),
    field("sorttitle", Slot::SortTitle),
    field("rating", Slot::Rating),
    field("votes", Slot::Votes),
    field("year", Slot::Year),
    field("plot", Slot::Plot),
    field("tagline", Slot::Tagline),
    field("certification", Slot::Certification),
    field("uniqueid", Slot::UniqueId),
    field("id", Slot::LegacyId),
    field("releasedate", Slot::Premiered),
    field("genre", Slot::Genre),
    field("publisher", Slot::Publisher),
    field("developer", Slot::Developer),
    field("platform", Slot::Platform),
    field("trailer", Slot::Trailer),
];

/// Known elements of a kind, in output order.
pub fn fields(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        EntityKind::Movie => MOVIE,
        EntityKind::TvShow => TV_SHOW,
        EntityKind::Game => GAME,
    }
}

/// Slot for a child tag, or `None` if it belongs in the extension bag.
pub fn slot_for(kind: EntityKind, tag: &str) -> Option<Slot> {
    fields(kind).iter().find(|f| f.tag == tag).map(|f| f.slot)
}
