//! URL discovery in album and image description text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::album::{AlbumId, album_id_from_url};

/// Upper bound on URL length considered during discovery.
const MAX_URL_LENGTH: usize = 2000;

/// Regex pattern for finding URLs in text.
/// Matches http:// and https:// URLs, capturing until whitespace or common delimiters.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Descriptions are user-written text, often markdown or HTML fragments
    Regex::new(r#"https?://[^\s<>"'\]]+"#).expect("URL regex is valid") // Static pattern, safe to panic
});

/// Extracts every HTTP/HTTPS URL candidate from free text, in order of appearance.
///
/// Trailing sentence punctuation and unbalanced closing brackets are stripped.
/// Candidates longer than 2000 characters are dropped.
///
/// # Examples
///
/// ```
/// use imgur_downloader::parser::extract_urls;
///
/// let urls = extract_urls("more at https://imgur.com/a/Z0lda.");
/// assert_eq!(urls, vec!["https://imgur.com/a/Z0lda"]);
/// ```
#[tracing::instrument(level = "trace", skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn extract_urls(input: &str) -> Vec<&str> {
    URL_PATTERN
        .find_iter(input)
        .map(|m| clean_url_trailing(m.as_str()))
        .filter(|url| url.len() <= MAX_URL_LENGTH)
        .inspect(|url| trace!(url = %url, "found URL candidate"))
        .collect()
}

/// Finds links to albums in free text.
///
/// Non-album links are ignored. Duplicates are removed while preserving the
/// order in which albums are first mentioned.
#[must_use]
pub fn find_album_ids(text: &str) -> Vec<AlbumId> {
    debug!(text_len = text.len(), "finding album links");
    let mut seen = HashSet::new();
    extract_urls(text)
        .into_iter()
        .filter_map(album_id_from_url)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Cleans trailing punctuation that often gets captured with URLs.
fn clean_url_trailing(url: &str) -> &str {
    let mut result = url;

    while let Some(last) = result.chars().last() {
        match last {
            // These are often sentence-ending punctuation, not part of URL
            '.' | ',' | ';' | ':' | '!' | '?' => {
                result = &result[..result.len() - 1];
            }
            // Closing parens/brackets at end are usually not part of URL
            ')' | ']' => {
                // Unless there's a matching opener in the URL (like Wikipedia URLs)
                let open = if last == ')' { '(' } else { '[' };
                let open_count = result.chars().filter(|&c| c == open).count();
                let close_count = result.chars().filter(|&c| c == last).count();
                if close_count > open_count {
                    result = &result[..result.len() - 1];
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    result
}
