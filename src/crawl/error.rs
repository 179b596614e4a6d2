//! Error types for the crawl.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::download::DownloadError;
use crate::download::constants::MAX_CONCURRENCY;

/// Errors raised while processing albums.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Concurrency outside `1..=MAX_CONCURRENCY`.
    #[error("invalid concurrency value {value}: must be between 1 and {MAX_CONCURRENCY}")]
    InvalidConcurrency {
        /// The rejected value.
        value: usize,
    },

    /// Album metadata or image list could not be fetched.
    #[error("album {album}: {source}")]
    Api {
        /// Album being processed.
        album: String,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },

    /// Image could not be downloaded.
    #[error("image {image}: {source}")]
    Download {
        /// Image identifier.
        image: String,
        /// Underlying download error.
        #[source]
        source: DownloadError,
    },

    /// Folder or text file could not be written.
    #[error("cannot write {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CrawlError {
    /// Creates an API error for `album`.
    pub fn api(album: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            album: album.into(),
            source,
        }
    }

    /// Creates a download error for `image`.
    pub fn download(image: impl Into<String>, source: DownloadError) -> Self {
        Self::Download {
            image: image.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
