//! Test utilities and fixtures for media-minder tests.
//!
//! This module provides scripted artwork sources, recording notification
//! sinks and item stores to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{MockArtworkSource, MockResponse, RecordingSink};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let source = Arc::new(MockArtworkSource::new());
//!     source.respond("https://img/p.jpg", MockResponse::chunks(&[b"abc"]));
//!     // ... hand `source` to an ArtworkFetcher
//! }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::artwork::{ArtworkSource, ArtworkStream, FetchError};
use crate::error::{Error, Result};
use crate::model::{ItemStore, MediaItem};
use crate::notify::{Message, NotificationSink};

/// How a scripted download ends once its chunks are delivered.
#[derive(Debug, Clone)]
enum Ending {
    Finish,
    Fail(String),
    /// Never finishes; the source signals [`MockArtworkSource::wait_for_stall`]
    Stall,
}

/// A scripted download.
#[derive(Debug, Clone)]
pub struct MockResponse {
    chunks: Vec<Vec<u8>>,
    ending: Ending,
}

impl MockResponse {
    /// Deliver the chunks, then end normally.
    pub fn chunks<T: AsRef<[u8]>>(chunks: &[T]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.as_ref().to_vec()).collect(),
            ending: Ending::Finish,
        }
    }

    /// A download with no data at all.
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            ending: Ending::Finish,
        }
    }

    /// Deliver the chunks, then fail with a network error.
    pub fn fail_after<T: AsRef<[u8]>>(chunks: &[T], message: &str) -> Self {
        Self {
            ending: Ending::Fail(message.to_string()),
            ..Self::chunks(chunks)
        }
    }

    /// Deliver the chunks, then hang until cancelled.
    pub fn stall_after<T: AsRef<[u8]>>(chunks: &[T]) -> Self {
        Self {
            ending: Ending::Stall,
            ..Self::chunks(chunks)
        }
    }
}

/// Artwork source answering from a table of scripted responses.
///
/// Unknown URLs answer HTTP 404.
#[derive(Default)]
pub struct MockArtworkSource {
    responses: Mutex<HashMap<String, MockResponse>>,
    stalled: Arc<Notify>,
}

impl MockArtworkSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: MockResponse) {
        self.responses.lock().insert(url.to_string(), response);
    }

    /// Wait until some stalling download has delivered all its chunks.
    pub async fn wait_for_stall(&self) {
        self.stalled.notified().await;
    }
}

#[async_trait]
impl ArtworkSource for MockArtworkSource {
    async fn open(&self, url: &str) -> std::result::Result<Box<dyn ArtworkStream>, FetchError> {
        let Some(response) = self.responses.lock().get(url).cloned() else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };
        Ok(Box::new(MockStream {
            chunks: response.chunks.into(),
            ending: response.ending,
            stalled: self.stalled.clone(),
        }))
    }
}

struct MockStream {
    chunks: VecDeque<Vec<u8>>,
    ending: Ending,
    stalled: Arc<Notify>,
}

#[async_trait]
impl ArtworkStream for MockStream {
    async fn next_chunk(&mut self) -> std::result::Result<Option<Vec<u8>>, FetchError> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Ok(Some(chunk));
        }
        match &self.ending {
            Ending::Finish => Ok(None),
            Ending::Fail(message) => Err(FetchError::Network(message.clone())),
            Ending::Stall => {
                self.stalled.notify_one();
                futures::future::pending().await
            }
        }
    }
}

/// Notification sink that keeps everything pushed to it.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<Message>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn push_message(&self, message: Message) {
        self.messages.lock().push(message);
    }
}

/// Item store that counts saves and can be told to fail.
#[derive(Default)]
pub struct MockStore {
    saves: AtomicUsize,
    fail: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ItemStore for MockStore {
    fn save(&self, item: &MediaItem) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Persistence(format!(
                "database unavailable for {}",
                item.dir().display()
            )));
        }
        Ok(())
    }
}
