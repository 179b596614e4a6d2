//! Run counters shared by the crawl loop and image tasks.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Statistics for one crawl run.
///
/// Counters are atomic so image tasks can update them concurrently.
#[derive(Debug, Default)]
pub struct CrawlStats {
    albums_completed: AtomicUsize,
    albums_failed: AtomicUsize,
    albums_skipped: AtomicUsize,
    images_downloaded: AtomicUsize,
    images_failed: AtomicUsize,
    bytes_downloaded: AtomicU64,
    retried: AtomicU64,
    interrupted: AtomicBool,
}

impl CrawlStats {
    /// Creates a tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Albums whose metadata and image list were fetched.
    #[must_use]
    pub fn albums_completed(&self) -> usize {
        self.albums_completed.load(Ordering::SeqCst)
    }

    /// Albums that could not be fetched or written.
    #[must_use]
    pub fn albums_failed(&self) -> usize {
        self.albums_failed.load(Ordering::SeqCst)
    }

    /// Discovered albums left out because of the depth limit.
    #[must_use]
    pub fn albums_skipped(&self) -> usize {
        self.albums_skipped.load(Ordering::SeqCst)
    }

    /// Images stored on disk.
    #[must_use]
    pub fn images_downloaded(&self) -> usize {
        self.images_downloaded.load(Ordering::SeqCst)
    }

    /// Images that failed after all retries.
    #[must_use]
    pub fn images_failed(&self) -> usize {
        self.images_failed.load(Ordering::SeqCst)
    }

    /// Total image bytes written.
    #[must_use]
    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded.load(Ordering::SeqCst)
    }

    /// Retry attempts made for image downloads and API calls.
    #[must_use]
    pub fn retried(&self) -> u64 {
        self.retried.load(Ordering::SeqCst)
    }

    /// Whether the run stopped early on an interrupt.
    #[must_use]
    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Number of successes (albums and images).
    #[must_use]
    pub fn successes(&self) -> usize {
        self.albums_completed() + self.images_downloaded()
    }

    /// Number of failures (albums and images).
    #[must_use]
    pub fn failures(&self) -> usize {
        self.albums_failed() + self.images_failed()
    }

    pub(crate) fn increment_albums_completed(&self) {
        self.albums_completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_albums_failed(&self) {
        self.albums_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_albums_skipped(&self) {
        self.albums_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_image(&self, bytes: u64) {
        self.images_downloaded.fetch_add(1, Ordering::SeqCst);
        self.bytes_downloaded.fetch_add(bytes, Ordering::SeqCst);
    }

    pub(crate) fn increment_images_failed(&self) {
        self.images_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn retry_counter(&self) -> &AtomicU64 {
        &self.retried
    }

    pub(crate) fn add_retries(&self, count: u64) {
        self.retried.fetch_add(count, Ordering::SeqCst);
    }

    pub(crate) fn mark_interrupted(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }
}
