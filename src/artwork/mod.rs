//! Artwork download and publishing.
//!
//! [`ArtworkFetcher`] downloads images on a bounded worker pool, writes them
//! next to the entity through a temp file, and only then points the entity at
//! the new file. A failed or cancelled download leaves the entity exactly as
//! it was.

mod cache;
mod fetcher;
mod source;

use std::path::PathBuf;

pub use cache::ImageCache;
pub use fetcher::{ArtworkFetcher, ArtworkRequest, FetchHandle, FetchOutcome, FetcherSettings};
pub use source::{ArtworkSource, ArtworkStream, HttpArtworkSource};

use crate::model::ArtworkType;

/// Extensions kept as-is when naming artwork files
const KNOWN_EXTENSIONS: &[&str] = &["jpg", "png", "gif", "webp", "bmp", "tbn"];

/// Artwork download errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Downloaded no data from {0}")]
    Empty(String),

    #[error("Download cancelled")]
    Cancelled,

    #[error("Artwork fetcher is shutting down")]
    ShuttingDown,
}

impl FetchError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// File name for an artwork: `<base>-<type>.<ext>`.
///
/// The extension comes from the URL path; `jpeg` becomes `jpg` and anything
/// unknown or missing falls back to `jpg`.
pub fn artwork_filename(base: &str, artwork_type: ArtworkType, url: &str) -> String {
    format!("{base}-{artwork_type}.{}", extension_from_url(url))
}

fn extension_from_url(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = last.rsplit_once('.') else {
        return "jpg";
    };
    let ext = ext.to_ascii_lowercase();
    if ext == "jpeg" {
        return "jpg";
    }
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|known| *known == ext)
        .unwrap_or("jpg")
}
