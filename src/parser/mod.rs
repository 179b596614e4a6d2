//! Album link recognition for command-line input and description text.
//!
//! Imgur links come in a handful of shapes (`/a/<id>`, `/gallery/<id>`,
//! `/r/<subreddit>/<id>`). This module maps those links to an [`AlbumId`]
//! and scans free text for them.
//!
//! # Example
//!
//! ```
//! use imgur_downloader::parser::{album_id_from_url, find_album_ids};
//!
//! let id = album_id_from_url("https://imgur.com/a/Z0lda").unwrap();
//! assert_eq!(id.as_str(), "Z0lda");
//!
//! let found = find_album_ids("part two: https://imgur.com/gallery/Qx9Lm, enjoy");
//! assert_eq!(found.len(), 1);
//! ```

mod album;
mod url;

pub use album::{AlbumId, album_id_from_url, parse_album_input};
pub use url::{extract_urls, find_album_ids};
