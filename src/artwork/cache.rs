//! Decoded artwork cache.
//!
//! Keeps decoded images in memory keyed by file path so views do not decode
//! the same poster repeatedly. The fetcher invalidates an entry whenever it
//! replaces the file behind it.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use parking_lot::Mutex;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Default)]
struct Entries {
    images: HashMap<PathBuf, Arc<DynamicImage>>,
    /// Insertion order for eviction
    order: VecDeque<PathBuf>,
}

/// In-memory cache of decoded images.
pub struct ImageCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    /// Decoded image for `path`, loading it on a miss.
    ///
    /// Returns `None` if the file is missing or not a decodable image.
    pub fn get(&self, path: &Path) -> Option<Arc<DynamicImage>> {
        if let Some(image) = self.entries.lock().images.get(path) {
            return Some(image.clone());
        }

        // Decode outside the lock
        let image = match image::open(path) {
            Ok(image) => Arc::new(image),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Could not decode artwork");
                return None;
            }
        };

        let mut entries = self.entries.lock();
        if entries.images.insert(path.to_path_buf(), image.clone()).is_none() {
            entries.order.push_back(path.to_path_buf());
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.images.remove(&oldest);
            }
        }
        Some(image)
    }

    /// Drop the cached image for a path.
    pub fn invalidate(&self, path: &Path) {
        let mut entries = self.entries.lock();
        if entries.images.remove(path).is_some() {
            entries.order.retain(|p| p != path);
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.lock().images.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}
