//! Image fetching: streaming HTTP downloads, retries, pacing and file naming.
//!
//! # Features
//!
//! - Streaming downloads straight to the final path (partial files removed on error)
//! - Exponential backoff with jitter for transient failures
//! - Per-host request pacing that also honours server `Retry-After`
//! - Slug-based file and folder names, unique within an album
//!
//! # Example
//!
//! ```no_run
//! use imgur_downloader::download::{HttpClient, SlugRegistry, image_extension};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut names = SlugRegistry::new();
//! let name = names.unique("A very good cat");
//! let ext = image_extension(Some("https://i.imgur.com/AAAAA.jpg"), Some("image/jpeg"));
//! let target = Path::new("./cats").join(format!("{name}.{ext}"));
//!
//! HttpClient::new()
//!     .download_to_path("https://i.imgur.com/AAAAA.jpg", &target)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod error;
mod filename;
pub mod rate_limiter;
mod retry;

pub(crate) use client::build_client;
pub use client::HttpClient;
pub use error::DownloadError;
pub use filename::{SlugRegistry, UNTITLED_SLUG, image_extension, ordered_prefix, slugify};
pub use rate_limiter::{RateLimiter, extract_domain, parse_retry_after};
pub use retry::{
    DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy, RetryableError,
    classify_error, classify_http_status, classify_network_error, retry_with_backoff,
};
