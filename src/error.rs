//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`NfoError`], [`FetchError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use media_minder::error::{Error, Result};
//!
//! fn import(connector: &NfoConnector, item: &MediaItem, path: &Path) -> Result<()> {
//!     connector.import(item, path)?; // NFO errors auto-convert
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use crate::artwork::FetchError;
use crate::config::ConfigError;
use crate::nfo::NfoError;
use crate::provider::ProviderError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sidecar read/write error
    #[error("NFO error: {0}")]
    Nfo(#[from] NfoError),

    /// Artwork download error
    #[error("Artwork error: {0}")]
    Fetch(#[from] FetchError),

    /// Metadata provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Item store error
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, NfoError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Nfo(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/movies/alien/movie.nfo");
        assert!(err.to_string().contains("/movies/alien/movie.nfo"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::persistence("locked").context("while saving Alien");
        let msg = err.to_string();
        assert!(msg.contains("while saving Alien"));
        assert!(msg.contains("locked"));
    }

    #[test]
    fn test_from_module_errors() {
        let err: Error = FetchError::Cancelled.into();
        assert!(matches!(err, Error::Fetch(FetchError::Cancelled)));

        let err: Error = ProviderError::NotFound("tt0078748".to_string()).into();
        assert!(err.to_string().contains("tt0078748"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::persistence("test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));

        let io: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));
        let msg = io.with_context("writing sidecar").unwrap_err().to_string();
        assert!(msg.contains("writing sidecar"));
        assert!(msg.contains("disk full"));
    }
}
