//! Shared User-Agent strings for API and image download HTTP clients.
//!
//! Single source for project URL and UA format so API and image traffic
//! stay consistent and easy to update.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://play.pixelblaster.ro/";

/// Default User-Agent for image download requests.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("imgur-downloader/{version} (album-archiver; +{PROJECT_UA_URL})")
}

/// Default User-Agent for API requests.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("imgur-downloader/{version} (api-client; +{PROJECT_UA_URL})")
}
