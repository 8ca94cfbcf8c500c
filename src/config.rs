//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\media-minder\config.toml
//! - macOS: ~/Library/Application Support/media-minder/config.toml
//! - Linux: ~/.config/media-minder/config.toml
//!
//! The config file is human-readable and editable. A missing or broken file
//! never stops the program: defaults are used and the problem is logged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artwork::FetcherSettings;
use crate::nfo::{LineEnding, NfoNaming, NfoSettings};
use crate::taxonomy::Country;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scraping preferences
    pub scraper: ScraperConfig,

    /// Sidecar file settings
    pub nfo: NfoConfig,

    /// Artwork download settings
    pub artwork: ArtworkConfig,
}

/// Scraping preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// ISO-639-1 language for localized names and provider queries
    pub language: String,

    /// Country whose certification table applies
    pub certification_country: Country,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            certification_country: Country::US,
        }
    }
}

/// Sidecar file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NfoConfig {
    /// Output filenames, one sidecar per entry
    pub naming: Vec<NfoNaming>,

    /// "platform", "lf" or "crlf"
    pub line_ending: LineEnding,
}

impl Default for NfoConfig {
    fn default() -> Self {
        Self {
            naming: vec![NfoNaming::Filename],
            line_ending: LineEnding::Platform,
        }
    }
}

/// Artwork download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Concurrent downloads
    pub workers: usize,

    /// How long shutdown waits for running downloads before cancelling them
    pub drain_timeout_ms: u64,

    /// User-Agent sent with artwork requests
    pub user_agent: String,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            drain_timeout_ms: 2000,
            user_agent: concat!("media-minder/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Sidecar settings for an [`NfoConnector`](crate::nfo::NfoConnector).
    pub fn nfo_settings(&self) -> NfoSettings {
        NfoSettings {
            naming: self.nfo.naming.clone(),
            line_ending: self.nfo.line_ending,
            country: self.scraper.certification_country,
        }
    }

    /// Pool settings for an [`ArtworkFetcher`](crate::artwork::ArtworkFetcher).
    pub fn fetcher_settings(&self) -> FetcherSettings {
        FetcherSettings {
            workers: self.artwork.workers.max(1),
            drain_timeout: Duration::from_millis(self.artwork.drain_timeout_ms),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("media-minder"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path, with the same fallbacks as [`load`].
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &dir.join("config.toml"))
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
