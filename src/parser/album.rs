//! Album identifiers and URL-to-album mapping.

use std::fmt;

use tracing::trace;
use url::Url;

/// Maximum length accepted for an album identifier.
const MAX_ALBUM_ID_LEN: usize = 64;

/// Maximum length of a bare identifier typed on the command line.
const MAX_BARE_ID_LEN: usize = 32;

/// Identifier of a hosted album.
///
/// Never empty and never contains URL structure characters (`/`, `?`, `#`),
/// so it is safe to splice into API paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlbumId(String);

impl AlbumId {
    /// Creates an album id, returning `None` for empty or malformed values.
    ///
    /// Accepted characters are ASCII alphanumerics, `-` and `_`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty()
            || value.len() > MAX_ALBUM_ID_LEN
            || !value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            return None;
        }
        Some(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AlbumId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns the album id for an Imgur album URL.
///
/// Recognised shapes:
/// - `https://imgur.com/gallery/<id>`
/// - `https://imgur.com/a/<id>`
/// - `https://imgur.com/r/<subreddit>/<id>`
///
/// Returns `None` for non-Imgur hosts and for any other path shape.
#[must_use]
pub fn album_id_from_url(raw: &str) -> Option<AlbumId> {
    let parsed = Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    if host != "imgur.com" && !host.ends_with(".imgur.com") {
        return None;
    }

    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let candidate = match segments.as_slice() {
        ["gallery", id, ..] | ["a", id, ..] => *id,
        ["r", _subreddit, rest @ ..] if !rest.is_empty() => rest.last().copied()?,
        _ => return None,
    };

    let id = AlbumId::new(candidate);
    trace!(url = raw, album = ?id, "mapped URL to album id");
    id
}

/// Parses the root album given on the command line.
///
/// Accepts either an album URL (see [`album_id_from_url`]) or a bare
/// alphanumeric identifier such as `Z0lda`.
#[must_use]
pub fn parse_album_input(input: &str) -> Option<AlbumId> {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        return album_id_from_url(trimmed);
    }
    if trimmed.len() <= MAX_BARE_ID_LEN && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return AlbumId::new(trimmed);
    }
    None
}
