//! Access to album metadata and image lists.
//!
//! The crawl only talks to the hosting service through the [`AlbumSource`]
//! trait. [`ImgurClient`] is the live implementation against the Imgur v3
//! REST API; tests plug in in-memory sources.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use imgur_downloader::api::{AlbumSource, ImgurClient, ImgurClientConfig};
//! use imgur_downloader::download::RateLimiter;
//! use imgur_downloader::parser::parse_album_input;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ImgurClient::new(
//!     ImgurClientConfig::new("0123456789abcde"),
//!     Arc::new(RateLimiter::disabled()),
//! )?;
//! let id = parse_album_input("https://imgur.com/a/Z0lda").ok_or("not an album")?;
//! for image in client.album_images(&id).await? {
//!     println!("{} {}", image.id, image.link);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod model;

pub use client::{DEFAULT_API_BASE_URL, ImgurClient, ImgurClientConfig};
pub use error::ApiError;
pub use model::{Album, Envelope, Image};

use async_trait::async_trait;

use crate::parser::AlbumId;

/// Source of album metadata and image lists.
#[async_trait]
pub trait AlbumSource: Send + Sync {
    /// Fetches album metadata.
    async fn album(&self, id: &AlbumId) -> Result<Album, ApiError>;

    /// Fetches the album's images in display order.
    async fn album_images(&self, id: &AlbumId) -> Result<Vec<Image>, ApiError>;

    /// Number of request retries performed so far.
    fn retries(&self) -> u64 {
        0
    }
}
