//! Sidecar serialization.

use quick_xml::escape::escape;

use super::document::{NfoContent, SidecarDocument};
use super::schema::{self, Slot};
use super::LineEnding;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

struct Out {
    buf: String,
}

impl Out {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.buf.push_str("  ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn element(&mut self, depth: usize, tag: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let line = format!("<{tag}>{}</{tag}>", escape(value));
        self.line(depth, &line);
    }

    fn number<T: std::fmt::Display>(&mut self, depth: usize, tag: &str, value: Option<T>) {
        if let Some(v) = value {
            self.element(depth, tag, &v.to_string());
        }
    }
}

/// Serialize a sidecar. Known fields come first in table order, then the
/// extensions in their original order.
pub fn serialize(doc: &SidecarDocument, line_ending: LineEnding) -> String {
    let mut out = Out { buf: String::new() };
    let root = doc.kind.root_tag();

    out.line(0, DECLARATION);
    out.line(0, &format!("<{root}>"));
    for spec in schema::fields(doc.kind) {
        write_slot(&mut out, spec.tag, spec.slot, &doc.content);
    }
    for extension in &doc.extensions {
        out.line(1, &extension.raw);
    }
    out.line(0, &format!("</{root}>"));

    if line_ending.is_crlf() {
        out.buf.replace('\n', "\r\n")
    } else {
        out.buf
    }
}

fn write_slot(out: &mut Out, tag: &str, slot: Slot, c: &NfoContent) {
    match slot {
        Slot::Title => out.element(1, tag, &c.title),
        Slot::OriginalTitle => out.element(1, tag, &c.original_title),
        Slot::SortTitle => out.element(1, tag, &c.sort_title),
        Slot::Rating => out.number(1, tag, c.rating),
        Slot::Votes => out.number(1, tag, c.votes),
        Slot::Year => out.number(1, tag, c.year),
        Slot::Plot => out.element(1, tag, &c.plot),
        Slot::Tagline => out.element(1, tag, &c.tagline),
        Slot::Runtime => out.number(1, tag, c.runtime),
        Slot::Certification => out.element(1, tag, &c.certification),
        Slot::UniqueId => {
            for id in &c.unique_ids {
                let line = format!(
                    r#"<{tag} type="{}" default="{}">{}</{tag}>"#,
                    escape(&id.provider),
                    id.default,
                    escape(&id.value)
                );
                out.line(1, &line);
            }
        }
        Slot::LegacyId => out.element(1, tag, &c.legacy_id),
        Slot::Premiered => out.element(1, tag, &c.premiered),
        Slot::Genre => c.genres.iter().for_each(|g| out.element(1, tag, g)),
        Slot::Studio => c.studios.iter().for_each(|s| out.element(1, tag, s)),
        Slot::Source => out.element(1, tag, &c.source),
        Slot::Actor => {
            for actor in &c.actors {
                out.line(1, &format!("<{tag}>"));
                out.element(2, "name", &actor.name);
                out.element(2, "role", &actor.role);
                out.element(2, "thumb", &actor.thumb);
                out.element(2, "profile", &actor.profile);
                out.line(1, &format!("</{tag}>"));
            }
        }
        Slot::Director => c.directors.iter().for_each(|d| out.element(1, tag, d)),
        Slot::Credits => c.credits.iter().for_each(|d| out.element(1, tag, d)),
        Slot::Trailer => out.element(1, tag, &c.trailer),
        Slot::Publisher => out.element(1, tag, &c.publisher),
        Slot::Developer => out.element(1, tag, &c.developer),
        Slot::Platform => out.element(1, tag, &c.platform),
        Slot::FileInfo => {
            let Some(details) = &c.stream_details else {
                return;
            };
            out.line(1, &format!("<{tag}>"));
            out.line(2, "<streamdetails>");
            if let Some(video) = &details.video {
                out.line(3, "<video>");
                out.element(4, "codec", &video.codec);
                if video.aspect > 0.0 {
                    out.element(4, "aspect", &format!("{:.2}", video.aspect));
                }
                out.number(4, "width", Some(video.width));
                out.number(4, "height", Some(video.height));
                out.number(4, "durationinseconds", Some(video.duration_secs));
                out.line(3, "</video>");
            }
            for audio in &details.audio {
                out.line(3, "<audio>");
                out.element(4, "codec", &audio.codec);
                out.element(4, "language", &audio.language);
                out.number(4, "channels", Some(audio.channels));
                out.line(3, "</audio>");
            }
            out.line(2, "</streamdetails>");
            out.line(1, &format!("</{tag}>"));
        }
    }
}
