//! Imgur Downloader Library
//!
//! This library provides the core functionality for the `imgur` tool,
//! which downloads image albums and, optionally, follows album links found
//! in album and image descriptions to download those albums too.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Album link recognition in URLs and free text
//! - [`api`] - Imgur v3 REST client behind the [`AlbumSource`] trait
//! - [`download`] - Streaming image downloads with retry and rate limiting
//! - [`crawl`] - Work queue, visited set and per-album processing

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod crawl;
pub mod download;
pub mod parser;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use api::{
    Album, AlbumSource, ApiError, DEFAULT_API_BASE_URL, Image, ImgurClient, ImgurClientConfig,
};
pub use crawl::{
    AlbumOutcome, CrawlError, CrawlOptions, CrawlQueue, CrawlStats, Crawler, UNTITLED_ALBUM,
};
pub use download::{
    DEFAULT_MAX_RETRIES, DownloadError, FailureType, HttpClient, RateLimiter, RetryDecision,
    RetryPolicy, SlugRegistry, classify_error, slugify,
};
pub use parser::{AlbumId, album_id_from_url, find_album_ids, parse_album_input};
