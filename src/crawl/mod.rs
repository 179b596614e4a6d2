//! Recursive album crawl: work queue, visited set and per-album processing.
//!
//! Starting from one album, the [`Crawler`] writes each album into its own
//! folder under the destination. With recursion on, links to other albums in
//! album and image descriptions are queued; the [`CrawlQueue`] makes sure
//! each album is processed at most once and respects the depth limit.

mod engine;
mod error;
mod queue;
mod stats;
mod writer;

pub use engine::{AlbumOutcome, CrawlOptions, Crawler, UNTITLED_ALBUM};
pub use error::CrawlError;
pub use queue::{CrawlQueue, Enqueue, QueuedAlbum};
pub use stats::CrawlStats;
pub use writer::METADATA_FILE;
