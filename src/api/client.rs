//! Imgur v3 REST client.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::model::{Album, Envelope, ErrorData, Image};
use super::{AlbumSource, ApiError};
use crate::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::download::{RateLimiter, RetryPolicy, build_client, retry_with_backoff};
use crate::parser::AlbumId;
use crate::user_agent;

/// Public Imgur API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.imgur.com/3";

/// Read timeout for API calls; JSON bodies are small.
const API_READ_TIMEOUT_SECS: u64 = 60;

/// Settings for [`ImgurClient`].
#[derive(Debug, Clone)]
pub struct ImgurClientConfig {
    /// Application client id sent as `Authorization: Client-ID <id>`.
    pub client_id: String,
    /// API root, without trailing slash. Defaults to [`DEFAULT_API_BASE_URL`].
    pub base_url: String,
    /// TCP connect timeout.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout.
    pub read_timeout_secs: u64,
    /// Retry behaviour for transient failures.
    pub retry_policy: RetryPolicy,
}

impl ImgurClientConfig {
    /// Creates a configuration with defaults for everything but the client id.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: API_READ_TIMEOUT_SECS.min(READ_TIMEOUT_SECS),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Overrides the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// [`AlbumSource`] backed by the live Imgur API.
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use imgur_downloader::{AlbumId, AlbumSource, ImgurClient, ImgurClientConfig, RateLimiter};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = Arc::new(RateLimiter::new(Duration::from_millis(200)));
/// let client = ImgurClient::new(ImgurClientConfig::new("0123456789abcde"), limiter)?;
/// let album = client.album(&AlbumId::new("Z0lda").unwrap()).await?;
/// println!("{:?}", album.title);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ImgurClient {
    client: Client,
    base_url: String,
    authorization: String,
    retry_policy: RetryPolicy,
    rate_limiter: Arc<RateLimiter>,
    retries: AtomicU64,
}

impl ImgurClient {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidConfig`] when the client id is blank, the base URL is
    /// not an absolute HTTP(S) URL, or the HTTP client cannot be built.
    pub fn new(config: ImgurClientConfig, rate_limiter: Arc<RateLimiter>) -> Result<Self, ApiError> {
        let client_id = config.client_id.trim();
        if client_id.is_empty() {
            return Err(ApiError::invalid_config("client id is empty"));
        }

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        match Url::parse(&base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(ApiError::invalid_config(format!(
                    "API base URL must be an absolute http(s) URL, got '{base_url}'"
                )));
            }
        }

        let client = build_client(
            &user_agent::default_api_user_agent(),
            config.connect_timeout_secs,
            config.read_timeout_secs,
        )
        .map_err(|e| ApiError::invalid_config(format!("cannot build HTTP client: {e}")))?;

        debug!(base_url = %base_url, "created Imgur API client");
        Ok(Self {
            client,
            base_url,
            authorization: format!("Client-ID {client_id}"),
            retry_policy: config.retry_policy,
            rate_limiter,
            retries: AtomicU64::new(0),
        })
    }

    /// Returns the API root in use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        retry_with_backoff(
            &self.retry_policy,
            &self.rate_limiter,
            url,
            &self.retries,
            || self.get_once(url),
        )
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| ApiError::network(url, e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(url, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<ErrorData>>(&body)
                .ok()
                .map(|envelope| envelope.data.error.into_message());
            debug!(status = status.as_u16(), ?message, "API request failed");
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                message,
                retry_after,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::decode(url, e))?;
        if !envelope.is_ok() {
            return Err(ApiError::Rejected {
                url: url.to_string(),
                status: envelope.status,
            });
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl AlbumSource for ImgurClient {
    #[instrument(skip(self), fields(album = %id))]
    async fn album(&self, id: &AlbumId) -> Result<Album, ApiError> {
        let url = self.endpoint(&format!("album/{id}"));
        self.get_data(&url).await
    }

    #[instrument(skip(self), fields(album = %id))]
    async fn album_images(&self, id: &AlbumId) -> Result<Vec<Image>, ApiError> {
        let url = self.endpoint(&format!("album/{id}/images"));
        self.get_data(&url).await
    }

    fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
