//! Response types for the Imgur v3 API.

use serde::Deserialize;

/// Every v3 response is wrapped in `{ "data": ..., "success": ..., "status": ... }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// The payload.
    pub data: T,
    /// `false` when the service rejected the request.
    #[serde(default = "default_success")]
    pub success: bool,
    /// HTTP-like status echoed in the body.
    #[serde(default = "default_status")]
    pub status: u16,
}

fn default_success() -> bool {
    true
}

fn default_status() -> u16 {
    200
}

impl<T> Envelope<T> {
    /// Returns whether the envelope reports success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.success && self.status == 200
    }
}

/// Error payload the service puts in `data` for failed requests.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorData {
    pub error: ErrorMessage,
}

/// `error` is usually a string but some endpoints nest an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorMessage {
    Text(String),
    Detailed { message: String },
}

impl ErrorMessage {
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Text(message) | Self::Detailed { message } => message,
        }
    }
}

/// Album metadata (`GET /album/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Album {
    /// Album identifier.
    pub id: String,
    /// Album title; often `null`.
    #[serde(default)]
    pub title: Option<String>,
    /// Album description; may contain links to other albums.
    #[serde(default)]
    pub description: Option<String>,
    /// Number of images the service reports for the album.
    #[serde(default)]
    pub images_count: u64,
    /// Canonical album page.
    #[serde(default)]
    pub link: Option<String>,
}

/// One image of an album (`GET /album/{id}/images`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    /// Image identifier.
    pub id: String,
    /// Image title; often `null`.
    #[serde(default)]
    pub title: Option<String>,
    /// Image description; may contain links to other albums.
    #[serde(default)]
    pub description: Option<String>,
    /// MIME type, e.g. `image/jpeg` or `video/mp4`.
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    /// Direct link to the media file.
    pub link: String,
}

/// Returns `Some(text)` when `value` has non-whitespace content.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

impl Album {
    /// Title with surrounding whitespace removed, or `None` when blank.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Description, or `None` when blank.
    #[must_use]
    pub fn display_description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

impl Image {
    /// Title with surrounding whitespace removed, or `None` when blank.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Description, or `None` when blank.
    #[must_use]
    pub fn display_description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}
