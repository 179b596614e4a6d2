//! Per-host request pacing shared by the API client and image downloads.
//!
//! Imgur throttles aggressively per client id and per CDN host, so every
//! request goes through [`RateLimiter::acquire`] first. Hosts are paced
//! independently: `api.imgur.com` and `i.imgur.com` never wait on each other.
//!
//! A `Retry-After` value reported by the server is recorded with
//! [`RateLimiter::record_rate_limit`] and holds back *every* later request to
//! that host, including ones issued by other image tasks.
//!
//! ```
//! use std::time::Duration;
//! use imgur_downloader::download::RateLimiter;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(Duration::from_millis(200));
//! limiter.acquire("https://i.imgur.com/AAAAA.jpg").await;
//! limiter.acquire("https://api.imgur.com/3/album/Z0lda").await; // other host, no wait
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::constants::{CUMULATIVE_DELAY_WARNING_THRESHOLD, MAX_RETRY_AFTER};

/// Per-host rate limiter, shared behind an `Arc` by all crawl tasks.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests to the same host.
    default_delay: Duration,
    /// Set for `--rate-limit 0`; server Retry-After is still honoured.
    disabled: bool,
    /// Host state. Entries are `Arc`ed so the shard lock is released before awaiting.
    hosts: DashMap<String, Arc<HostState>>,
}

#[derive(Debug)]
struct HostState {
    /// Earliest instant the next request may start. `None` until the first request.
    next_allowed: Mutex<Option<Instant>>,
    /// Total wait imposed on this host, for the excessive-throttling warning.
    cumulative_delay_ms: AtomicU64,
}

impl HostState {
    fn new() -> Self {
        Self {
            next_allowed: Mutex::new(None),
            cumulative_delay_ms: AtomicU64::new(0),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add_cumulative_delay(&self, delay: Duration) -> Duration {
        let delay_ms = delay.as_millis() as u64;
        let total = self
            .cumulative_delay_ms
            .fetch_add(delay_ms, Ordering::SeqCst)
            .saturating_add(delay_ms);
        Duration::from_millis(total)
    }
}

impl RateLimiter {
    /// Creates a limiter that spaces requests to one host by `default_delay`.
    #[must_use]
    #[instrument(skip_all, fields(delay_ms = default_delay.as_millis()))]
    pub fn new(default_delay: Duration) -> Self {
        debug!("creating rate limiter");
        Self {
            default_delay,
            disabled: default_delay.is_zero(),
            hosts: DashMap::new(),
        }
    }

    /// Creates a limiter without client-side pacing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns whether client-side pacing is off.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the configured spacing between requests to one host.
    #[must_use]
    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    fn host_state(&self, host: &str) -> Arc<HostState> {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(HostState::new()))
            .clone()
    }

    /// Waits until a request to `url`'s host is allowed, then reserves the slot.
    ///
    /// The first request to a host proceeds immediately unless the server has
    /// already asked the client to back off.
    #[instrument(level = "debug", skip(self), fields(host))]
    pub async fn acquire(&self, url: &str) {
        let host = extract_domain(url);
        tracing::Span::current().record("host", host.as_str());

        let state = self.host_state(&host);
        let mut next_allowed = state.next_allowed.lock().await;

        let now = Instant::now();
        if let Some(allowed_at) = *next_allowed
            && allowed_at > now
        {
            let delay = allowed_at - now;
            let cumulative = state.add_cumulative_delay(delay);
            debug!(
                host = %host,
                delay_ms = delay.as_millis(),
                cumulative_ms = cumulative.as_millis(),
                "pacing request"
            );
            if cumulative >= CUMULATIVE_DELAY_WARNING_THRESHOLD {
                warn!(
                    host = %host,
                    cumulative_delay_secs = cumulative.as_secs(),
                    "heavy throttling on this host; consider a larger --rate-limit"
                );
            }
            tokio::time::sleep_until(allowed_at).await;
        }

        *next_allowed = Some(Instant::now() + self.default_delay);
    }

    /// Records a server-mandated back-off for `url`'s host.
    ///
    /// Subsequent [`acquire`](Self::acquire) calls for the host wait at least
    /// until `delay` has elapsed. An existing, later deadline is kept.
    #[instrument(level = "debug", skip(self), fields(host))]
    pub async fn record_rate_limit(&self, url: &str, delay: Duration) {
        let host = extract_domain(url);
        tracing::Span::current().record("host", host.as_str());

        let state = self.host_state(&host);
        let mut next_allowed = state.next_allowed.lock().await;
        let deadline = Instant::now() + delay.min(MAX_RETRY_AFTER);
        if next_allowed.is_none_or(|current| current < deadline) {
            *next_allowed = Some(deadline);
        }
        debug!(host = %host, delay_ms = delay.as_millis(), "recorded server rate limit");
    }
}

/// Extracts the lower-cased host from a URL, or `"unknown"` when it has none.
///
/// ```
/// use imgur_downloader::download::rate_limiter::extract_domain;
///
/// assert_eq!(extract_domain("https://I.Imgur.com/AAAAA.jpg"), "i.imgur.com");
/// assert_eq!(extract_domain("not a url"), "unknown");
/// ```
#[must_use]
pub fn extract_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parses a `Retry-After` header (delta seconds or HTTP-date).
///
/// Values above one hour are capped; past dates yield zero; anything
/// unparseable yields `None`.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        let seconds = u64::try_from(seconds).ok()?;
        return Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER));
    }

    let Ok(datetime) = httpdate::parse_http_date(header_value) else {
        debug!(header_value, "unparseable Retry-After value");
        return None;
    };
    Some(
        datetime
            .duration_since(std::time::SystemTime::now())
            .map_or(Duration::ZERO, |d| d.min(MAX_RETRY_AFTER)),
    )
}
