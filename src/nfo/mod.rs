//! NFO sidecar reading and writing.
//!
//! Sidecars are XML files media centers read next to the video files. Writes
//! are load-merge-save: an existing file is parsed first, the known fields are
//! overwritten from the item, and every element this crate does not know is
//! written back exactly as it was found.
//!
//! # Example
//!
//! ```ignore
//! let connector = NfoConnector::new(settings, registry);
//! let written = connector.write(&item)?;
//! ```

mod document;
mod parser;
mod schema;
pub mod trailer;
mod writer;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use document::{
    Actor, AudioDetails, Extension, NfoContent, SidecarDocument, StreamDetails, UniqueId,
    VideoDetails,
};
pub use parser::ParseError;

use crate::model::{EntityKind, MediaItem};
use crate::taxonomy::{Certification, CertificationTable, Country, TaxonomyRegistry};

/// How sidecar files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NfoNaming {
    /// `<video stem>.nfo`
    Filename,
    /// `movie.nfo`, `tvshow.nfo`, `game.nfo`
    Kind,
}

/// Line terminator used on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// CRLF on Windows, LF elsewhere
    #[default]
    Platform,
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn is_crlf(self) -> bool {
        match self {
            LineEnding::Platform => cfg!(windows),
            LineEnding::Lf => false,
            LineEnding::Crlf => true,
        }
    }
}

/// Sidecar settings, usually taken from the `[nfo]` and `[scraper]` config.
#[derive(Debug, Clone)]
pub struct NfoSettings {
    pub naming: Vec<NfoNaming>,
    pub line_ending: LineEnding,
    /// Country whose certification table applies
    pub country: Country,
}

impl Default for NfoSettings {
    fn default() -> Self {
        Self {
            naming: vec![NfoNaming::Filename],
            line_ending: LineEnding::Platform,
            country: Country::US,
        }
    }
}

/// One target that could not be written.
#[derive(Debug)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.source)
    }
}

fn summarize(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Sidecar errors.
#[derive(Debug, thiserror::Error)]
pub enum NfoError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to write {} sidecar file(s): {}", .failures.len(), summarize(.failures))]
    Write { failures: Vec<WriteFailure> },
}

/// Maps items to sidecar files and back.
pub struct NfoConnector {
    settings: NfoSettings,
    registry: Arc<TaxonomyRegistry>,
    certifications: CertificationTable,
}

impl NfoConnector {
    pub fn new(settings: NfoSettings, registry: Arc<TaxonomyRegistry>) -> Self {
        Self {
            settings,
            registry,
            certifications: CertificationTable::new(),
        }
    }

    pub fn settings(&self) -> &NfoSettings {
        &self.settings
    }

    /// Sidecar paths for an item under the configured naming.
    ///
    /// `Filename` naming is skipped when the item has no video file.
    pub fn target_paths(&self, item: &MediaItem) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for naming in &self.settings.naming {
            let filename = match naming {
                NfoNaming::Filename => match item.main_video_file() {
                    Some(video) => match video.stem() {
                        Some(stem) => format!("{stem}.nfo"),
                        None => continue,
                    },
                    None => {
                        tracing::debug!(dir = %item.dir().display(), "No video file, skipping <stem>.nfo");
                        continue;
                    }
                },
                NfoNaming::Kind => format!("{}.nfo", item.kind().root_tag()),
            };
            let path = item.dir().join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Write the item's sidecars.
    ///
    /// Every target is attempted. The item's tracked sidecar set becomes the
    /// files written by this call, even when some targets failed.
    pub fn write(&self, item: &MediaItem) -> Result<Vec<PathBuf>, NfoError> {
        let mut written = Vec::new();
        let mut failures = Vec::new();

        for target in self.target_paths(item) {
            let mut doc = self.load(&target, item.kind());
            doc.merge_item(item);
            let xml = writer::serialize(&doc, self.settings.line_ending);

            match write_atomic(&target, xml.as_bytes()) {
                Ok(()) => {
                    tracing::info!(path = %target.display(), "Wrote sidecar");
                    written.push(target);
                }
                Err(e) => {
                    tracing::warn!(path = %target.display(), error = %e, "Failed to write sidecar");
                    failures.push(WriteFailure {
                        path: target,
                        source: e,
                    });
                }
            }
        }

        item.set_nfo_files(written.clone());

        if failures.is_empty() {
            Ok(written)
        } else {
            Err(NfoError::Write { failures })
        }
    }

    /// Parse a sidecar, failing on any I/O, encoding or XML problem.
    pub fn read(&self, path: &Path, kind: EntityKind) -> Result<SidecarDocument, NfoError> {
        read(path, kind)
    }

    /// Parse a sidecar, falling back to an empty document on failure.
    pub fn load(&self, path: &Path, kind: EntityKind) -> SidecarDocument {
        if !path.exists() {
            return SidecarDocument::empty(kind);
        }
        match read(path, kind) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable sidecar");
                SidecarDocument::empty(kind)
            }
        }
    }

    /// Certification of a loaded sidecar under the configured country.
    pub fn certification(&self, doc: &SidecarDocument) -> Option<Certification> {
        self.certifications
            .resolve(self.settings.country, &doc.content.certification)
    }

    /// Apply an existing sidecar to an item, as if it were a scrape result.
    pub fn import(&self, item: &MediaItem, path: &Path) -> Result<(), NfoError> {
        let doc = read(path, item.kind())?;
        let metadata = doc.to_metadata(self.settings.country);
        item.apply_metadata(
            &metadata,
            &self.registry,
            &self.certifications,
            self.settings.country,
        );
        Ok(())
    }
}

fn read_text(path: &Path) -> Result<String, NfoError> {
    let bytes = std::fs::read(path).map_err(|source| NfoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| NfoError::Encoding {
        path: path.to_path_buf(),
    })
}

/// Strict sidecar parse.
pub fn read(path: &Path, kind: EntityKind) -> Result<SidecarDocument, NfoError> {
    let text = read_text(path)?;
    parse_str(&text, kind).map_err(|source| NfoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Strict sidecar parse, taking the kind from the root element.
pub fn read_any(path: &Path) -> Result<SidecarDocument, NfoError> {
    let text = read_text(path)?;
    let parsed = match parse_str(&text, EntityKind::Movie) {
        Err(ParseError::WrongRoot { expected, found }) => {
            match EntityKind::ALL.into_iter().find(|k| k.root_tag() == found) {
                Some(kind) => parse_str(&text, kind),
                None => Err(ParseError::WrongRoot { expected, found }),
            }
        }
        other => other,
    };
    parsed.map_err(|source| NfoError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse sidecar text that is already in memory.
pub fn parse_str(text: &str, kind: EntityKind) -> Result<SidecarDocument, ParseError> {
    let text = parser::normalize(text);
    let children = parser::parse(&text, kind.root_tag())?;
    Ok(SidecarDocument::from_children(kind, children))
}

/// Serialize a document with the given line ending.
pub fn to_xml(doc: &SidecarDocument, line_ending: LineEnding) -> String {
    writer::serialize(doc, line_ending)
}

/// Temp file in the target directory, flush, best-effort fsync, rename.
///
/// The replaced file keeps its permissions. New files get the usual
/// world-readable mode instead of the temp file's owner-only one.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    let permissions = match std::fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    if let Err(e) = tmp.as_file().sync_all() {
        tracing::debug!(path = %path.display(), error = %e, "sync_all failed");
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    None
}
