//! Recursive album crawler.
//!
//! The crawler drains a [`CrawlQueue`] one album at a time. For each album it
//! fetches metadata, writes `album-metadata.txt`, fetches the image list and
//! downloads the images with bounded concurrency. In recursive mode, album
//! links found in the album description and in image descriptions are queued.
//!
//! # Concurrency Model
//!
//! - Albums are processed sequentially in queue order
//! - Image file names are assigned up front, in album order
//! - Each image download runs in its own Tokio task behind a semaphore permit
//! - Counters live in a shared [`CrawlStats`]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use super::queue::{CrawlQueue, Enqueue, QueuedAlbum};
use super::stats::CrawlStats;
use super::writer::{METADATA_STEM, write_album_metadata, write_image_description};
use super::CrawlError;
use crate::api::{AlbumSource, Image};
use crate::download::constants::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
use crate::download::{
    HttpClient, RateLimiter, RetryPolicy, SlugRegistry, image_extension, ordered_prefix,
    retry_with_backoff, slugify,
};
use crate::parser::{AlbumId, find_album_ids};

/// Title given to albums without one.
pub const UNTITLED_ALBUM: &str = "Unknown Artists - Untitled Album";

/// What to crawl and how.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Directory that receives one folder per album.
    pub destination: PathBuf,
    /// Follow album links found in descriptions.
    pub recursive: bool,
    /// Prefix image names with their position in the album.
    pub ordered: bool,
    /// Deepest discovered album to process; the root is depth 0. `None` is unbounded.
    pub max_depth: Option<u32>,
    /// Image downloads in flight per album.
    pub concurrency: usize,
}

impl CrawlOptions {
    /// Options with defaults: no recursion, unordered, unbounded depth.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            recursive: false,
            ordered: false,
            max_depth: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// How processing one album ended.
#[derive(Debug)]
pub enum AlbumOutcome {
    /// Metadata and image list were fetched; individual images may still have failed.
    Completed {
        /// Folder the album was written to.
        folder: PathBuf,
        /// Images stored.
        images_downloaded: usize,
        /// Images that failed.
        images_failed: usize,
    },
    /// The album could not be processed.
    Failed(CrawlError),
    /// Stopped by an interrupt before all images were handled.
    Interrupted,
}

/// An image with its on-disk name decided.
#[derive(Debug)]
struct PlannedImage {
    image: Image,
    media_path: PathBuf,
    description_path: PathBuf,
}

/// Crawls albums from an [`AlbumSource`] onto disk.
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use imgur_downloader::{
///     AlbumId, CrawlOptions, Crawler, HttpClient, ImgurClient, ImgurClientConfig,
///     RateLimiter, RetryPolicy,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = Arc::new(RateLimiter::new(Duration::from_millis(200)));
/// let source = Arc::new(ImgurClient::new(
///     ImgurClientConfig::new("0123456789abcde"),
///     Arc::clone(&limiter),
/// )?);
/// let mut options = CrawlOptions::new("./albums");
/// options.recursive = true;
///
/// let crawler = Crawler::new(source, HttpClient::new(), RetryPolicy::default(), limiter, options)?;
/// let stats = crawler.run(AlbumId::new("Z0lda").unwrap()).await;
/// println!("{} images", stats.images_downloaded());
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    source: Arc<dyn AlbumSource>,
    client: HttpClient,
    retry_policy: RetryPolicy,
    rate_limiter: Arc<RateLimiter>,
    options: CrawlOptions,
    semaphore: Arc<Semaphore>,
    stats: Arc<CrawlStats>,
    interrupted: Arc<AtomicBool>,
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("options", &self.options)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl Crawler {
    /// Creates a crawler.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidConcurrency`] if `options.concurrency` is
    /// outside `1..=MAX_CONCURRENCY`.
    #[instrument(level = "debug", skip_all, fields(destination = %options.destination.display()))]
    pub fn new(
        source: Arc<dyn AlbumSource>,
        client: HttpClient,
        retry_policy: RetryPolicy,
        rate_limiter: Arc<RateLimiter>,
        options: CrawlOptions,
    ) -> Result<Self, CrawlError> {
        if !(1..=MAX_CONCURRENCY).contains(&options.concurrency) {
            return Err(CrawlError::InvalidConcurrency {
                value: options.concurrency,
            });
        }

        debug!(
            concurrency = options.concurrency,
            recursive = options.recursive,
            ordered = options.ordered,
            max_depth = ?options.max_depth,
            max_attempts = retry_policy.max_attempts(),
            rate_limit_ms = rate_limiter.default_delay().as_millis(),
            "creating crawler"
        );

        Ok(Self {
            source,
            client,
            retry_policy,
            rate_limiter,
            semaphore: Arc::new(Semaphore::new(options.concurrency)),
            options,
            stats: Arc::new(CrawlStats::new()),
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Uses `flag` as the interrupt signal (e.g. set from a Ctrl-C handler).
    #[must_use]
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// Shared counters, readable while the crawl runs.
    #[must_use]
    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Returns the crawl options.
    #[must_use]
    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Crawls from `root` until the queue is empty or the run is interrupted.
    ///
    /// Album and image failures are logged and counted, never returned.
    #[instrument(skip(self), fields(root = %root))]
    pub async fn run(&self, root: AlbumId) -> Arc<CrawlStats> {
        let mut queue = CrawlQueue::new(self.options.max_depth);
        let mut folders = SlugRegistry::new();
        queue.push_root(root);

        info!(destination = %self.options.destination.display(), "starting crawl");

        while !queue.is_empty() {
            if self.is_interrupted() {
                warn!(pending = queue.len(), "interrupted; stopping before next album");
                self.stats.mark_interrupted();
                break;
            }
            let Some(item) = queue.pop() else {
                break;
            };

            match self.process_album(&item, &mut queue, &mut folders).await {
                AlbumOutcome::Completed {
                    folder,
                    images_downloaded,
                    images_failed,
                } => {
                    self.stats.increment_albums_completed();
                    info!(
                        album = %item.id,
                        folder = %folder.display(),
                        images_downloaded,
                        images_failed,
                        "album done"
                    );
                }
                AlbumOutcome::Failed(e) => {
                    self.stats.increment_albums_failed();
                    error!(album = %item.id, error = %e, "album failed");
                }
                AlbumOutcome::Interrupted => {
                    self.stats.mark_interrupted();
                    warn!(album = %item.id, "interrupted while downloading album");
                    break;
                }
            }
        }

        self.stats.add_retries(self.source.retries());

        info!(
            albums_completed = self.stats.albums_completed(),
            albums_failed = self.stats.albums_failed(),
            albums_skipped = self.stats.albums_skipped(),
            albums_seen = queue.seen_count(),
            images_downloaded = self.stats.images_downloaded(),
            images_failed = self.stats.images_failed(),
            retried = self.stats.retried(),
            "crawl complete"
        );

        self.stats()
    }

    /// Processes one album: folder, metadata file, images and link discovery.
    #[instrument(skip(self, queue, folders), fields(album = %item.id, depth = item.depth))]
    pub async fn process_album(
        &self,
        item: &QueuedAlbum,
        queue: &mut CrawlQueue,
        folders: &mut SlugRegistry,
    ) -> AlbumOutcome {
        let album = match self.source.album(&item.id).await {
            Ok(album) => album,
            Err(e) => return AlbumOutcome::Failed(CrawlError::api(item.id.as_str(), e)),
        };

        let title = album.display_title().unwrap_or(UNTITLED_ALBUM).to_string();
        info!(title = %title, images = album.images_count, "got album");

        let folder = self.claim_album_folder(&title, &item.id, folders);
        if let Err(e) = tokio::fs::create_dir_all(&folder).await {
            return AlbumOutcome::Failed(CrawlError::io(&folder, e));
        }
        debug!(folder = %folder.display(), "saving album");

        if self.options.recursive {
            self.discover(album.display_description(), item, queue);
        }

        if let Err(e) =
            write_album_metadata(&folder, &title, item.id.as_str(), album.display_description())
                .await
        {
            return AlbumOutcome::Failed(e);
        }

        let images = match self.source.album_images(&item.id).await {
            Ok(images) => images,
            Err(e) => return AlbumOutcome::Failed(CrawlError::api(item.id.as_str(), e)),
        };

        let total = usize::try_from(album.images_count)
            .unwrap_or(usize::MAX)
            .max(images.len());
        let planned = self.plan_images(images, total, &folder);

        if self.options.recursive {
            for plan in &planned {
                self.discover(plan.image.display_description(), item, queue);
            }
        }

        self.download_images(planned, folder).await
    }

    /// Album folder under the destination. A second album with the same
    /// title in one run gets `<slug>-<album id>`, or `<slug>-<album id>-N`
    /// when another album's title already produced that name.
    fn claim_album_folder(&self, title: &str, id: &AlbumId, folders: &mut SlugRegistry) -> PathBuf {
        let slug = slugify(title);
        let name = if folders.claim(&slug) {
            slug
        } else {
            let fallback = folders.next_free(format!("{slug}-{id}"));
            debug!(title, folder = %fallback, "album folder already used in this run");
            fallback
        };
        self.options.destination.join(name)
    }

    fn discover(&self, text: Option<&str>, parent: &QueuedAlbum, queue: &mut CrawlQueue) {
        let Some(text) = text else {
            return;
        };
        for found in find_album_ids(text) {
            match queue.push_discovered(found.clone(), parent.depth) {
                Enqueue::Queued => info!(album = %found, from = %parent.id, "queued linked album"),
                Enqueue::TooDeep => {
                    self.stats.increment_albums_skipped();
                    info!(album = %found, "linked album beyond max depth; skipping");
                }
                Enqueue::AlreadySeen => debug!(album = %found, "linked album already seen"),
            }
        }
    }

    fn plan_images(&self, images: Vec<Image>, total: usize, folder: &Path) -> Vec<PlannedImage> {
        let mut names = SlugRegistry::with_reserved([METADATA_STEM]);
        images
            .into_iter()
            .enumerate()
            .map(|(index, image)| {
                let slug = names.unique(image.display_title().unwrap_or(&image.id));
                let stem = if self.options.ordered {
                    format!("{}{slug}", ordered_prefix(index + 1, total))
                } else {
                    slug
                };
                let extension = image_extension(Some(&image.link), image.mime_type.as_deref());
                PlannedImage {
                    media_path: folder.join(format!("{stem}.{extension}")),
                    description_path: folder.join(format!("{stem}.txt")),
                    image,
                }
            })
            .collect()
    }

    async fn download_images(&self, planned: Vec<PlannedImage>, folder: PathBuf) -> AlbumOutcome {
        let mut handles = Vec::with_capacity(planned.len());
        let mut interrupted = false;

        for plan in planned {
            if self.is_interrupted() {
                interrupted = true;
                break;
            }
            let Ok(permit) = Arc::clone(&self.semaphore).acquire_owned().await else {
                warn!("download semaphore closed");
                break;
            };
            // Re-check: the wait for a permit can be long.
            if self.is_interrupted() {
                interrupted = true;
                break;
            }

            let client = self.client.clone();
            let retry_policy = self.retry_policy.clone();
            let rate_limiter = Arc::clone(&self.rate_limiter);
            let stats = Arc::clone(&self.stats);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let result = save_image(&client, &plan, &retry_policy, &rate_limiter, &stats).await;
                match result {
                    Ok(bytes) => {
                        stats.record_image(bytes);
                        info!(image = %plan.image.id, path = %plan.media_path.display(), bytes, "image saved");
                        true
                    }
                    Err(e) => {
                        stats.increment_images_failed();
                        warn!(image = %plan.image.id, link = %plan.image.link, error = %e, "image failed");
                        false
                    }
                }
            }));
        }

        let mut images_downloaded = 0;
        let mut images_failed = 0;
        for handle in handles {
            match handle.await {
                Ok(true) => images_downloaded += 1,
                Ok(false) => images_failed += 1,
                Err(e) => {
                    images_failed += 1;
                    self.stats.increment_images_failed();
                    warn!(error = %e, "image task panicked");
                }
            }
        }

        if interrupted {
            return AlbumOutcome::Interrupted;
        }
        AlbumOutcome::Completed {
            folder,
            images_downloaded,
            images_failed,
        }
    }
}

async fn save_image(
    client: &HttpClient,
    plan: &PlannedImage,
    retry_policy: &RetryPolicy,
    rate_limiter: &RateLimiter,
    stats: &CrawlStats,
) -> Result<u64, CrawlError> {
    let link = plan.image.link.as_str();
    debug!(link, path = %plan.media_path.display(), "downloading image");

    let bytes = retry_with_backoff(retry_policy, rate_limiter, link, stats.retry_counter(), || {
        client.download_to_path(link, &plan.media_path)
    })
    .await
    .map_err(|e| CrawlError::download(plan.image.id.as_str(), e))?;

    if let Some(description) = plan.image.display_description() {
        let title = plan.image.display_title().unwrap_or(&plan.image.id);
        write_image_description(&plan.description_path, title, description).await?;
    }

    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::api::{Album, ApiError};

    /// In-memory album source; albums without images entries fail the image call.
    #[derive(Default)]
    struct FakeSource {
        albums: HashMap<String, Album>,
        images: HashMap<String, Vec<Image>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with_album(mut self, id: &str, title: Option<&str>, description: Option<&str>) -> Self {
            self.albums.insert(
                id.to_string(),
                Album {
                    id: id.to_string(),
                    title: title.map(str::to_string),
                    description: description.map(str::to_string),
                    images_count: 0,
                    link: None,
                },
            );
            self.images.insert(id.to_string(), Vec::new());
            self
        }

        fn with_image_description(mut self, album: &str, description: &str) -> Self {
            // Link is unreachable, the download fails but discovery still runs.
            self.images.entry(album.to_string()).or_default().push(Image {
                id: "img".to_string(),
                title: None,
                description: Some(description.to_string()),
                mime_type: Some("image/png".to_string()),
                link: "http://127.0.0.1:9/img.png".to_string(),
            });
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlbumSource for FakeSource {
        async fn album(&self, id: &AlbumId) -> Result<Album, ApiError> {
            self.calls.lock().unwrap().push(id.to_string());
            self.albums.get(id.as_str()).cloned().ok_or(ApiError::Rejected {
                url: format!("fake://album/{id}"),
                status: 404,
            })
        }

        async fn album_images(&self, id: &AlbumId) -> Result<Vec<Image>, ApiError> {
            self.images.get(id.as_str()).cloned().ok_or(ApiError::Rejected {
                url: format!("fake://album/{id}/images"),
                status: 404,
            })
        }
    }

    fn crawler(source: FakeSource, options: CrawlOptions) -> (Crawler, Arc<FakeSource>) {
        let source = Arc::new(source);
        let crawler = Crawler::new(
            Arc::clone(&source) as Arc<dyn AlbumSource>,
            HttpClient::new(),
            RetryPolicy::with_max_attempts(1),
            Arc::new(RateLimiter::disabled()),
            options,
        )
        .unwrap();
        (crawler, source)
    }

    fn id(value: &str) -> AlbumId {
        AlbumId::new(value).unwrap()
    }

    fn recursive(dir: &TempDir) -> CrawlOptions {
        let mut options = CrawlOptions::new(dir.path());
        options.recursive = true;
        options
    }

    #[test]
    fn test_new_rejects_invalid_concurrency() {
        for value in [0, MAX_CONCURRENCY + 1] {
            let mut options = CrawlOptions::new("/tmp/x");
            options.concurrency = value;
            let result = Crawler::new(
                Arc::new(FakeSource::default()),
                HttpClient::new(),
                RetryPolicy::default(),
                Arc::new(RateLimiter::disabled()),
                options,
            );
            assert!(matches!(result, Err(CrawlError::InvalidConcurrency { .. })));
        }
    }

    #[tokio::test]
    async fn test_untitled_album_gets_default_folder_and_metadata() {
        let dir = TempDir::new().unwrap();
        let (crawler, _) = crawler(
            FakeSource::default().with_album("root", None, None),
            CrawlOptions::new(dir.path()),
        );

        let stats = crawler.run(id("root")).await;

        assert_eq!(stats.albums_completed(), 1);
        let folder = dir.path().join("unknown-artists-untitled-album");
        let metadata = std::fs::read_to_string(folder.join("album-metadata.txt")).unwrap();
        assert!(metadata.starts_with("Title: Unknown Artists - Untitled Album\nAlbum ID: root\n"));
    }

    #[tokio::test]
    async fn test_recursive_follows_links_and_avoids_cycles() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album("aaaaa", Some("A"), Some("next: https://imgur.com/a/bbbbb"))
            .with_album("bbbbb", Some("B"), Some("back to https://imgur.com/gallery/aaaaa"));
        let (crawler, source) = crawler(source, recursive(&dir));

        let stats = crawler.run(id("aaaaa")).await;

        assert_eq!(source.fetched(), ["aaaaa", "bbbbb"]);
        assert_eq!(stats.albums_completed(), 2);
        assert!(dir.path().join("a").join("album-metadata.txt").exists());
        assert!(dir.path().join("b").join("album-metadata.txt").exists());
    }

    #[tokio::test]
    async fn test_non_recursive_ignores_links() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album("aaaaa", Some("A"), Some("https://imgur.com/a/bbbbb"))
            .with_album("bbbbb", Some("B"), None);
        let (crawler, source) = crawler(source, CrawlOptions::new(dir.path()));

        crawler.run(id("aaaaa")).await;

        assert_eq!(source.fetched(), ["aaaaa"]);
    }

    #[tokio::test]
    async fn test_links_in_image_descriptions_are_followed() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album("aaaaa", Some("A"), None)
            .with_image_description("aaaaa", "more at https://imgur.com/a/ccccc")
            .with_album("ccccc", Some("C"), None);
        let (crawler, source) = crawler(source, recursive(&dir));

        let stats = crawler.run(id("aaaaa")).await;

        assert_eq!(source.fetched(), ["aaaaa", "ccccc"]);
        assert_eq!(stats.albums_completed(), 2);
        assert_eq!(stats.images_failed(), 1);
    }

    #[tokio::test]
    async fn test_max_depth_limits_discovery() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album("d0", Some("zero"), Some("https://imgur.com/a/d1"))
            .with_album("d1", Some("one"), Some("https://imgur.com/a/d2"))
            .with_album("d2", Some("two"), None);
        let mut options = recursive(&dir);
        options.max_depth = Some(1);
        let (crawler, source) = crawler(source, options);

        let stats = crawler.run(id("d0")).await;

        assert_eq!(source.fetched(), ["d0", "d1"]);
        assert_eq!(stats.albums_skipped(), 1);
    }

    #[tokio::test]
    async fn test_failed_album_does_not_stop_queue() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default().with_album(
            "aaaaa",
            Some("A"),
            Some("https://imgur.com/a/gone1 https://imgur.com/a/bbbbb"),
        );
        let source = source.with_album("bbbbb", Some("B"), None);
        let (crawler, source) = crawler(source, recursive(&dir));

        let stats = crawler.run(id("aaaaa")).await;

        assert_eq!(source.fetched(), ["aaaaa", "gone1", "bbbbb"]);
        assert_eq!(stats.albums_completed(), 2);
        assert_eq!(stats.albums_failed(), 1);
    }

    #[tokio::test]
    async fn test_same_title_albums_get_distinct_folders() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album("aaaaa", Some("Cats"), Some("https://imgur.com/a/bbbbb"))
            .with_album("bbbbb", Some("Cats"), None);
        let (crawler, _) = crawler(source, recursive(&dir));

        crawler.run(id("aaaaa")).await;

        assert!(dir.path().join("cats").is_dir());
        assert!(dir.path().join("cats-bbbbb").is_dir());
    }

    #[tokio::test]
    async fn test_folder_named_like_fallback_is_not_shared() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album(
                "aaaaa",
                Some("Cats"),
                Some("https://imgur.com/a/bbbbb https://imgur.com/a/ccccc"),
            )
            .with_album("bbbbb", Some("Cats ccccc"), None)
            .with_album("ccccc", Some("Cats"), None);
        let (crawler, _) = crawler(source, recursive(&dir));

        let stats = crawler.run(id("aaaaa")).await;

        assert_eq!(stats.albums_completed(), 3);
        let mut folders: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        folders.sort();
        assert_eq!(folders, ["cats", "cats-ccccc", "cats-ccccc-1"]);

        let metadata = |folder: &str| {
            std::fs::read_to_string(dir.path().join(folder).join("album-metadata.txt")).unwrap()
        };
        assert!(metadata("cats-ccccc").contains("Album ID: bbbbb\n"));
        assert!(metadata("cats-ccccc-1").contains("Album ID: ccccc\n"));
    }

    #[tokio::test]
    async fn test_non_latin_titles_keep_their_folders() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::default()
            .with_album("aaaaa", Some("Кошки"), Some("https://imgur.com/a/bbbbb"))
            .with_album("bbbbb", Some("Собаки"), None);
        let (crawler, _) = crawler(source, recursive(&dir));

        crawler.run(id("aaaaa")).await;

        assert!(dir.path().join("кошки").join("album-metadata.txt").exists());
        assert!(dir.path().join("собаки").join("album-metadata.txt").exists());
    }

    #[tokio::test]
    async fn test_interrupt_before_start_processes_nothing() {
        let dir = TempDir::new().unwrap();
        let (crawler, source) = crawler(
            FakeSource::default().with_album("aaaaa", Some("A"), None),
            CrawlOptions::new(dir.path()),
        );
        let flag = Arc::new(AtomicBool::new(true));
        let crawler = crawler.with_interrupt_flag(flag);

        let stats = crawler.run(id("aaaaa")).await;

        assert!(stats.was_interrupted());
        assert!(source.fetched().is_empty());
    }

    #[test]
    fn test_plan_images_names_and_order() {
        let (crawler, _) = crawler(FakeSource::default(), {
            let mut options = CrawlOptions::new("/albums");
            options.ordered = true;
            options
        });
        let image = |id: &str, title: Option<&str>, link: &str, mime: &str| Image {
            id: id.to_string(),
            title: title.map(str::to_string),
            description: None,
            mime_type: Some(mime.to_string()),
            link: link.to_string(),
        };
        let images = vec![
            image("AAAAA", Some("Sunset"), "https://i.imgur.com/AAAAA.jpg", "image/jpeg"),
            image("BBBBB", Some("sunset"), "https://i.imgur.com/BBBBB", "image/png"),
            image("CCCCC", None, "https://i.imgur.com/CCCCC.mp4", "video/mp4"),
        ];

        let planned = crawler.plan_images(images, 12, Path::new("/albums/x"));
        let names: Vec<String> = planned
            .iter()
            .map(|p| p.media_path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, ["01 - sunset.jpg", "02 - sunset-1.png", "03 - ccccc.mp4"]);
        assert_eq!(
            planned[0].description_path,
            Path::new("/albums/x/01 - sunset.txt")
        );
    }

    #[test]
    fn test_plan_images_never_claims_metadata_name() {
        let (crawler, _) = crawler(FakeSource::default(), CrawlOptions::new("/albums"));
        let images = vec![Image {
            id: "AAAAA".to_string(),
            title: Some("Album Metadata".to_string()),
            description: Some("d".to_string()),
            mime_type: None,
            link: "https://i.imgur.com/AAAAA.gif".to_string(),
        }];

        let planned = crawler.plan_images(images, 1, Path::new("/albums/x"));
        assert_eq!(
            planned[0].description_path,
            Path::new("/albums/x/album-metadata-1.txt")
        );
    }
}
