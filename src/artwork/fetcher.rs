//! Bounded artwork worker pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::{ArtworkSource, FetchError, ImageCache};
use crate::model::{ArtworkType, Entity, EntityId};
use crate::notify::{Message, NotificationSink};

/// Pool sizing and shutdown behaviour.
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    /// Concurrent downloads
    pub workers: usize,
    /// How long `shutdown` waits before cancelling what is left
    pub drain_timeout: Duration,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            drain_timeout: Duration::from_millis(2000),
        }
    }
}

/// One artwork to fetch.
#[derive(Clone)]
pub struct ArtworkRequest {
    pub entity: Arc<dyn Entity>,
    pub artwork_type: ArtworkType,
    pub source_url: String,
    pub destination: PathBuf,
    /// Whether the entity should point at this file once it is written
    pub is_primary: bool,
}

/// How a fetch ended. Informational only; failures are already logged and
/// reported to the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Written and set as the entity's current artwork
    Published(PathBuf),
    /// Written, entity untouched (non-primary)
    Written(PathBuf),
    Failed(String),
    Cancelled,
}

/// Handle to a submitted fetch.
pub struct FetchHandle {
    token: CancellationToken,
    join: JoinHandle<FetchOutcome>,
}

impl FetchHandle {
    /// Request cancellation. The task stops at its next chunk boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the task to finish.
    pub async fn outcome(self) -> FetchOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => FetchOutcome::Cancelled,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

type LockKey = (EntityId, ArtworkType);

struct Inner {
    source: Arc<dyn ArtworkSource>,
    sink: Arc<dyn NotificationSink>,
    cache: Arc<ImageCache>,
    settings: FetcherSettings,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    token: CancellationToken,
    locks: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
    accepting: AtomicBool,
    active: AtomicUsize,
    queued: AtomicUsize,
    next_task: AtomicU64,
}

/// Decrements a counter when dropped.
struct CountGuard<'a>(&'a AtomicUsize);

impl<'a> CountGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for CountGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Background artwork downloader.
///
/// Cloning is cheap; all clones share one pool.
#[derive(Clone)]
pub struct ArtworkFetcher {
    inner: Arc<Inner>,
}

impl ArtworkFetcher {
    pub fn new(
        source: Arc<dyn ArtworkSource>,
        sink: Arc<dyn NotificationSink>,
        cache: Arc<ImageCache>,
        settings: FetcherSettings,
    ) -> Self {
        let workers = settings.workers.max(1);
        Self {
            inner: Arc::new(Inner {
                source,
                sink,
                cache,
                permits: Arc::new(Semaphore::new(workers)),
                settings,
                tracker: TaskTracker::new(),
                token: CancellationToken::new(),
                locks: Mutex::new(HashMap::new()),
                accepting: AtomicBool::new(true),
                active: AtomicUsize::new(0),
                queued: AtomicUsize::new(0),
                next_task: AtomicU64::new(0),
            }),
        }
    }

    /// Downloads currently running.
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Downloads waiting for a worker or for an earlier fetch of the same
    /// entity and artwork type.
    pub fn queued(&self) -> usize {
        self.inner.queued.load(Ordering::SeqCst)
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.inner.cache
    }

    /// Schedule a fetch. Must be called from within a tokio runtime.
    ///
    /// Only fails when the pool is shutting down.
    pub fn submit(&self, request: ArtworkRequest) -> Result<FetchHandle, FetchError> {
        if !self.inner.accepting.load(Ordering::SeqCst) {
            return Err(FetchError::ShuttingDown);
        }

        let token = self.inner.token.child_token();
        let inner = self.inner.clone();
        let task_token = token.clone();
        let task_id = inner.next_task.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            entity = %request.entity.id(),
            artwork_type = %request.artwork_type,
            url = %request.source_url,
            "Queued artwork fetch"
        );

        // Counted before spawning so `queued()` sees it immediately
        inner.queued.fetch_add(1, Ordering::SeqCst);
        let join = self
            .inner
            .tracker
            .spawn(async move { run(inner, request, task_token, task_id).await });

        Ok(FetchHandle { token, join })
    }

    /// Stop accepting work, let running fetches drain, then cancel the rest.
    pub async fn shutdown(&self) {
        self.inner.accepting.store(false, Ordering::SeqCst);
        self.inner.tracker.close();

        let drain = self.inner.settings.drain_timeout;
        if tokio::time::timeout(drain, self.inner.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = self.inner.tracker.len(),
                "Artwork drain timed out, cancelling remaining fetches"
            );
            self.inner.token.cancel();
            self.inner.tracker.wait().await;
        }
        tracing::info!("Artwork fetcher stopped");
    }
}

fn lock_for(inner: &Inner, key: LockKey) -> Arc<tokio::sync::Mutex<()>> {
    inner.locks.lock().entry(key).or_default().clone()
}

/// Drop the per-key lock once nobody else holds or waits on it.
fn release_lock(inner: &Inner, key: LockKey) {
    let mut locks = inner.locks.lock();
    if locks.get(&key).is_some_and(|l| Arc::strong_count(l) == 1) {
        locks.remove(&key);
    }
}

async fn run(
    inner: Arc<Inner>,
    request: ArtworkRequest,
    token: CancellationToken,
    task_id: u64,
) -> FetchOutcome {
    let key = (request.entity.id(), request.artwork_type);
    let outcome = {
        let queued = QueuedGuard(&inner.queued);
        let lock = lock_for(&inner, key);

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            held = async {
                let guard = lock.lock_owned().await;
                let permit = inner.permits.clone().acquire_owned().await.ok()?;
                Some((guard, permit))
            } => held,
        };

        match result {
            None => {
                drop(queued);
                FetchOutcome::Cancelled
            }
            Some((_guard, _permit)) => {
                drop(queued);
                let _active = CountGuard::new(&inner.active);
                publish(&inner, &request, &token, task_id).await
            }
        }
    };
    release_lock(&inner, key);
    outcome
}

/// Decrements the queued counter exactly once.
struct QueuedGuard<'a>(&'a AtomicUsize);

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Download, write and (for primary artwork) swap the entity reference.
/// Called with the per-(entity, type) lock held.
async fn publish(
    inner: &Inner,
    request: &ArtworkRequest,
    token: &CancellationToken,
    task_id: u64,
) -> FetchOutcome {
    let entity = &request.entity;
    let previous = entity.artwork(request.artwork_type);
    let temp = temp_path(&request.destination, task_id);

    let written = match download(inner, request, &temp, token).await {
        Ok(()) => tokio::fs::rename(&temp, &request.destination)
            .await
            .map_err(|e| FetchError::io(&request.destination, e)),
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        remove_temp(&temp).await;
        // The reference is only swapped after a successful write, so restoring
        // means re-asserting what was there before.
        if let Some(previous) = previous {
            entity.set_artwork(previous, request.artwork_type);
        }
        return match e {
            FetchError::Cancelled => {
                tracing::debug!(
                    entity = %entity.id(),
                    artwork_type = %request.artwork_type,
                    "Artwork fetch cancelled"
                );
                FetchOutcome::Cancelled
            }
            e => {
                tracing::error!(
                    entity = %entity.id(),
                    artwork_type = %request.artwork_type,
                    url = %request.source_url,
                    error = %e,
                    "Artwork download failed"
                );
                inner.sink.push_message(Message::error(
                    entity.path().display().to_string(),
                    "artwork.download.failed",
                    vec![request.source_url.clone(), e.to_string()],
                ));
                FetchOutcome::Failed(e.to_string())
            }
        };
    }

    inner.cache.invalidate(&request.destination);

    if !request.is_primary {
        tracing::info!(path = %request.destination.display(), "Wrote artwork");
        return FetchOutcome::Written(request.destination.clone());
    }

    entity.set_artwork(request.destination.clone(), request.artwork_type);
    if let Err(e) = entity.save_to_db() {
        tracing::warn!(entity = %entity.id(), error = %e, "Failed to persist artwork reference");
        inner.sink.push_message(Message::warning(
            entity.path().display().to_string(),
            "artwork.save.failed",
            vec![e.to_string()],
        ));
    }
    entity.artwork_written(request.artwork_type);

    tracing::info!(
        entity = %entity.id(),
        artwork_type = %request.artwork_type,
        path = %request.destination.display(),
        "Published artwork"
    );
    FetchOutcome::Published(request.destination.clone())
}

/// Stream the source into `temp`, checking for cancellation between chunks.
async fn download(
    inner: &Inner,
    request: &ArtworkRequest,
    temp: &Path,
    token: &CancellationToken,
) -> Result<(), FetchError> {
    let mut stream = tokio::select! {
        _ = token.cancelled() => return Err(FetchError::Cancelled),
        opened = inner.source.open(&request.source_url) => opened?,
    };

    if let Some(dir) = temp.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| FetchError::io(dir, e))?;
    }
    let mut file = tokio::fs::File::create(temp)
        .await
        .map_err(|e| FetchError::io(temp, e))?;

    let mut total = 0usize;
    loop {
        let chunk = tokio::select! {
            _ = token.cancelled() => return Err(FetchError::Cancelled),
            chunk = stream.next_chunk() => chunk?,
        };
        let Some(chunk) = chunk else { break };
        total += chunk.len();
        file.write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(temp, e))?;
    }

    if total == 0 {
        return Err(FetchError::Empty(request.source_url.clone()));
    }

    file.flush().await.map_err(|e| FetchError::io(temp, e))?;
    if let Err(e) = file.sync_all().await {
        tracing::debug!(path = %temp.display(), error = %e, "sync_all failed");
    }
    Ok(())
}

/// `dir/.<filename>.<task>.part`
fn temp_path(destination: &Path, task_id: u64) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artwork".to_string());
    destination.with_file_name(format!(".{name}.{task_id}.part"))
}

async fn remove_temp(temp: &Path) {
    match tokio::fs::remove_file(temp).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %temp.display(), error = %e, "Failed to remove temp file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, MediaItem};
    use crate::notify::MessageLevel;
    use crate::test_utils::{MockArtworkSource, MockResponse, RecordingSink};
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        item: Arc<MediaItem>,
        source: Arc<MockArtworkSource>,
        sink: Arc<RecordingSink>,
        fetcher: ArtworkFetcher,
    }

    fn fixture(workers: usize) -> Fixture {
        let dir = TempDir::new().unwrap();
        let item = Arc::new(MediaItem::new(EntityKind::Movie, dir.path()));
        let source = Arc::new(MockArtworkSource::new());
        let sink = Arc::new(RecordingSink::new());
        let fetcher = ArtworkFetcher::new(
            source.clone(),
            sink.clone(),
            Arc::new(ImageCache::new()),
            FetcherSettings {
                workers,
                drain_timeout: Duration::from_millis(200),
            },
        );
        Fixture {
            dir,
            item,
            source,
            sink,
            fetcher,
        }
    }

    fn request(f: &Fixture, url: &str, file: &str, primary: bool) -> ArtworkRequest {
        ArtworkRequest {
            entity: f.item.clone(),
            artwork_type: ArtworkType::Poster,
            source_url: url.to_string(),
            destination: f.dir.path().join(file),
            is_primary: primary,
        }
    }

    fn leftover_temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".part"))
            .collect()
    }

    #[tokio::test]
    async fn test_primary_fetch_publishes() {
        let f = fixture(2);
        f.source
            .respond("https://img/p.jpg", MockResponse::chunks(&[b"abc", b"def"]));

        let handle = f
            .fetcher
            .submit(request(&f, "https://img/p.jpg", "Alien-poster.jpg", true))
            .unwrap();
        let dest = f.dir.path().join("Alien-poster.jpg");
        assert_eq!(handle.outcome().await, FetchOutcome::Published(dest.clone()));

        assert_eq!(std::fs::read(&dest).unwrap(), b"abcdef");
        assert_eq!(f.item.artwork(ArtworkType::Poster), Some(dest));
        assert_eq!(f.item.written_artwork(), vec![ArtworkType::Poster]);
        assert!(f.sink.messages().is_empty());
        assert!(leftover_temp_files(f.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_non_primary_leaves_entity_alone() {
        let f = fixture(2);
        f.source
            .respond("https://img/extra.jpg", MockResponse::chunks(&[b"x"]));

        let outcome = f
            .fetcher
            .submit(request(&f, "https://img/extra.jpg", "extra.jpg", false))
            .unwrap()
            .outcome()
            .await;

        assert!(matches!(outcome, FetchOutcome::Written(_)));
        assert!(f.item.artwork(ArtworkType::Poster).is_none());
        assert!(f.item.written_artwork().is_empty());
    }

    #[tokio::test]
    async fn test_failure_after_partial_bytes_rolls_back() {
        let f = fixture(2);
        let old = f.dir.path().join("old-poster.jpg");
        std::fs::write(&old, b"old").unwrap();
        f.item.set_artwork(old.clone(), ArtworkType::Poster);
        f.source.respond(
            "https://img/broken.jpg",
            MockResponse::fail_after(&[b"partial"], "connection reset"),
        );

        let outcome = f
            .fetcher
            .submit(request(&f, "https://img/broken.jpg", "Alien-poster.jpg", true))
            .unwrap()
            .outcome()
            .await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(f.item.artwork(ArtworkType::Poster), Some(old));
        assert!(!f.dir.path().join("Alien-poster.jpg").exists());
        assert!(leftover_temp_files(f.dir.path()).is_empty());
        assert!(f.item.written_artwork().is_empty());

        let messages = f.sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, MessageLevel::Error);
        assert_eq!(messages[0].message_key, "artwork.download.failed");
        assert_eq!(messages[0].args[0], "https://img/broken.jpg");
    }

    #[tokio::test]
    async fn test_open_failure_leaves_unset_reference_unset() {
        let f = fixture(1);
        // No response registered: the mock answers 404
        let outcome = f
            .fetcher
            .submit(request(&f, "https://img/missing.jpg", "Alien-poster.jpg", true))
            .unwrap()
            .outcome()
            .await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert!(f.item.artwork(ArtworkType::Poster).is_none());
    }

    #[tokio::test]
    async fn test_empty_download_fails() {
        let f = fixture(1);
        f.source.respond("https://img/empty.jpg", MockResponse::empty());
        let outcome = f
            .fetcher
            .submit(request(&f, "https://img/empty.jpg", "e.jpg", true))
            .unwrap()
            .outcome()
            .await;
        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert!(!f.dir.path().join("e.jpg").exists());
    }

    #[tokio::test]
    async fn test_concurrent_success_and_failure_keep_success() {
        for fail_first in [true, false] {
            let f = fixture(4);
            f.source.respond("https://img/good.jpg", MockResponse::chunks(&[b"good"]));
            f.source.respond(
                "https://img/bad.jpg",
                MockResponse::fail_after(&[b"ba"], "boom"),
            );

            let (first, second) = if fail_first {
                ("https://img/bad.jpg", "https://img/good.jpg")
            } else {
                ("https://img/good.jpg", "https://img/bad.jpg")
            };
            let a = f.fetcher.submit(request(&f, first, "p1.jpg", true)).unwrap();
            let b = f.fetcher.submit(request(&f, second, "p2.jpg", true)).unwrap();
            let (ra, rb) = tokio::join!(a.outcome(), b.outcome());

            let good = if fail_first { (rb, "p2.jpg") } else { (ra, "p1.jpg") };
            let dest = f.dir.path().join(good.1);
            assert_eq!(good.0, FetchOutcome::Published(dest.clone()));
            assert_eq!(f.item.artwork(ArtworkType::Poster), Some(dest));
            assert_eq!(f.item.written_artwork(), vec![ArtworkType::Poster]);
            assert!(leftover_temp_files(f.dir.path()).is_empty());
        }
    }

    #[tokio::test]
    async fn test_cancel_removes_temp_file() {
        let f = fixture(1);
        f.source.respond(
            "https://img/slow.jpg",
            MockResponse::stall_after(&[b"first chunk"]),
        );

        let handle = f
            .fetcher
            .submit(request(&f, "https://img/slow.jpg", "slow.jpg", true))
            .unwrap();
        // Wait until the first chunk has landed in the temp file
        f.source.wait_for_stall().await;
        assert_eq!(leftover_temp_files(f.dir.path()).len(), 1);

        handle.cancel();
        assert_eq!(handle.outcome().await, FetchOutcome::Cancelled);
        assert!(leftover_temp_files(f.dir.path()).is_empty());
        assert!(!f.dir.path().join("slow.jpg").exists());
        assert!(f.item.artwork(ArtworkType::Poster).is_none());
        assert!(f.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_keeps_previous_image() {
        let f = fixture(1);
        let dest = f.dir.path().join("Alien-poster.jpg");
        std::fs::write(&dest, b"old image").unwrap();
        f.item.set_artwork(dest.clone(), ArtworkType::Poster);
        f.source.respond(
            "https://img/slow.jpg",
            MockResponse::stall_after(&[b"new bytes"]),
        );

        let handle = f
            .fetcher
            .submit(request(&f, "https://img/slow.jpg", "Alien-poster.jpg", true))
            .unwrap();
        f.source.wait_for_stall().await;
        handle.cancel();
        assert_eq!(handle.outcome().await, FetchOutcome::Cancelled);

        assert_eq!(std::fs::read(&dest).unwrap(), b"old image");
        assert_eq!(f.item.artwork(ArtworkType::Poster), Some(dest));
        assert!(f.item.written_artwork().is_empty());
        assert!(leftover_temp_files(f.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_artwork_types_do_not_block_each_other() {
        let f = fixture(2);
        f.source.respond(
            "https://img/slow-poster.jpg",
            MockResponse::stall_after(&[b"poster"]),
        );
        f.source
            .respond("https://img/fanart.jpg", MockResponse::chunks(&[b"fanart"]));

        let poster = f
            .fetcher
            .submit(request(&f, "https://img/slow-poster.jpg", "poster.jpg", true))
            .unwrap();
        f.source.wait_for_stall().await;

        // Same entity, other type: finishes while the poster is still stuck
        let mut fanart_request = request(&f, "https://img/fanart.jpg", "fanart.jpg", true);
        fanart_request.artwork_type = ArtworkType::Fanart;
        let fanart = f.fetcher.submit(fanart_request).unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(2), fanart.outcome())
            .await
            .expect("fanart fetch waited on the poster lock");
        let fanart_path = f.dir.path().join("fanart.jpg");
        assert_eq!(outcome, FetchOutcome::Published(fanart_path.clone()));

        poster.cancel();
        assert_eq!(poster.outcome().await, FetchOutcome::Cancelled);

        assert_eq!(f.item.artwork(ArtworkType::Fanart), Some(fanart_path.clone()));
        assert!(f.item.artwork(ArtworkType::Poster).is_none());
        assert_eq!(f.item.written_artwork(), vec![ArtworkType::Fanart]);
        assert_eq!(std::fs::read(&fanart_path).unwrap(), b"fanart");
        assert!(!f.dir.path().join("poster.jpg").exists());
    }

    #[tokio::test]
    async fn test_parallel_types_publish_their_own_files() {
        let f = fixture(2);
        f.source
            .respond("https://img/poster.jpg", MockResponse::chunks(&[&b"po"[..], b"ster"]));
        f.source
            .respond("https://img/banner.jpg", MockResponse::chunks(&[&b"ban"[..], b"ner"]));

        let poster = f
            .fetcher
            .submit(request(&f, "https://img/poster.jpg", "a-poster.jpg", true))
            .unwrap();
        let mut banner_request = request(&f, "https://img/banner.jpg", "a-banner.jpg", true);
        banner_request.artwork_type = ArtworkType::Banner;
        let banner = f.fetcher.submit(banner_request).unwrap();
        let (rp, rb) = tokio::join!(poster.outcome(), banner.outcome());

        let poster_path = f.dir.path().join("a-poster.jpg");
        let banner_path = f.dir.path().join("a-banner.jpg");
        assert_eq!(rp, FetchOutcome::Published(poster_path.clone()));
        assert_eq!(rb, FetchOutcome::Published(banner_path.clone()));
        assert_eq!(f.item.artwork(ArtworkType::Poster), Some(poster_path.clone()));
        assert_eq!(f.item.artwork(ArtworkType::Banner), Some(banner_path.clone()));
        assert_eq!(std::fs::read(&poster_path).unwrap(), b"poster");
        assert_eq!(std::fs::read(&banner_path).unwrap(), b"banner");
        assert_eq!(f.item.written_artwork().len(), 2);
        assert!(leftover_temp_files(f.dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_worker_limit_and_counters() {
        let f = fixture(1);
        f.source.respond(
            "https://img/slow.jpg",
            MockResponse::stall_after(&[b"first chunk"]),
        );
        f.source.respond("https://img/fast.jpg", MockResponse::chunks(&[b"x"]));

        let slow = f
            .fetcher
            .submit(request(&f, "https://img/slow.jpg", "slow.jpg", false))
            .unwrap();
        f.source.wait_for_stall().await;

        let mut fast_request = request(&f, "https://img/fast.jpg", "fast.jpg", false);
        fast_request.artwork_type = ArtworkType::Fanart;
        let fast = f.fetcher.submit(fast_request).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(f.fetcher.active(), 1);
        assert_eq!(f.fetcher.queued(), 1);

        slow.cancel();
        assert_eq!(slow.outcome().await, FetchOutcome::Cancelled);
        assert!(matches!(fast.outcome().await, FetchOutcome::Written(_)));
        assert_eq!(f.fetcher.active(), 0);
        assert_eq!(f.fetcher.queued(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_after_drain_timeout() {
        let f = fixture(2);
        f.source.respond(
            "https://img/slow.jpg",
            MockResponse::stall_after(&[b"first chunk"]),
        );

        let handle = f
            .fetcher
            .submit(request(&f, "https://img/slow.jpg", "slow.jpg", true))
            .unwrap();
        f.source.wait_for_stall().await;

        f.fetcher.shutdown().await;
        assert_eq!(handle.outcome().await, FetchOutcome::Cancelled);
        assert!(leftover_temp_files(f.dir.path()).is_empty());

        let rejected = f
            .fetcher
            .submit(request(&f, "https://img/slow.jpg", "again.jpg", true));
        assert!(matches!(rejected, Err(FetchError::ShuttingDown)));
    }

    #[tokio::test]
    async fn test_publish_invalidates_cache() {
        let f = fixture(1);
        let dest = f.dir.path().join("poster.png");
        image::RgbImage::new(2, 2).save(&dest).unwrap();
        f.fetcher.cache().get(&dest).unwrap();
        assert!(f.fetcher.cache().contains(&dest));

        let mut png = std::io::Cursor::new(Vec::new());
        image::RgbImage::new(5, 5)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        f.source
            .respond("https://img/new.png", MockResponse::chunks(&[png.get_ref().as_slice()]));

        f.fetcher
            .submit(request(&f, "https://img/new.png", "poster.png", true))
            .unwrap()
            .outcome()
            .await;

        assert!(!f.fetcher.cache().contains(&dest));
        assert_eq!(f.fetcher.cache().get(&dest).unwrap().width(), 5);
    }

    #[test]
    fn test_temp_path() {
        let temp = temp_path(Path::new("/movies/alien/Alien-poster.jpg"), 7);
        assert_eq!(temp, PathBuf::from("/movies/alien/.Alien-poster.jpg.7.part"));
    }

    #[tokio::test]
    async fn test_lock_map_is_cleaned_up() {
        let f = fixture(1);
        f.source.respond("https://img/p.jpg", MockResponse::chunks(&[b"p"]));
        f.fetcher
            .submit(request(&f, "https://img/p.jpg", "p.jpg", true))
            .unwrap()
            .outcome()
            .await;
        assert!(f.fetcher.inner.locks.lock().is_empty());
        // A fresh lock is handed out for the next fetch
        let key = (f.item.id(), ArtworkType::Poster);
        assert_eq!(Arc::strong_count(&lock_for(&f.fetcher.inner, key)), 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_new_reference() {
        let f = fixture(1);
        let store = Arc::new(crate::test_utils::MockStore::failing());
        let item = Arc::new(MediaItem::new(EntityKind::Movie, f.dir.path()).with_store(store.clone()));
        f.source.respond("https://img/p.jpg", MockResponse::chunks(&[b"p"]));

        let dest = f.dir.path().join("p.jpg");
        let outcome = f
            .fetcher
            .submit(ArtworkRequest {
                entity: item.clone(),
                ..request(&f, "https://img/p.jpg", "p.jpg", true)
            })
            .unwrap()
            .outcome()
            .await;

        assert_eq!(outcome, FetchOutcome::Published(dest.clone()));
        assert_eq!(item.artwork(ArtworkType::Poster), Some(dest));
        assert_eq!(store.saves(), 1);

        let messages = f.sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, MessageLevel::Warning);
        assert_eq!(messages[0].message_key, "artwork.save.failed");
    }
}
