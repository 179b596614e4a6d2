//! Retry logic with exponential backoff for transient HTTP failures.
//!
//! Used for both API calls and image downloads. A failure is first
//! classified into a [`FailureType`]; the [`RetryPolicy`] then decides whether
//! another attempt is worthwhile and how long to wait.
//!
//! ```
//! use imgur_downloader::download::{
//!     DownloadError, RetryPolicy, RetryDecision, classify_error
//! };
//!
//! let policy = RetryPolicy::default();
//! let error = DownloadError::http_status("https://i.imgur.com/AAAAA.jpg", 503);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("Retrying in {:?} (attempt {})", delay, attempt);
//!     }
//!     RetryDecision::DoNotRetry { reason } => {
//!         println!("Not retrying: {}", reason);
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, instrument};

use super::DownloadError;
use super::rate_limiter::{RateLimiter, parse_retry_after};

/// Default maximum retry attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (1 second).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Classification of request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry (timeouts, 5xx, connection reset).
    Transient,

    /// Failure that won't succeed regardless of retries (404, bad link, disk error).
    Permanent,

    /// The service refused the credentials (401/403), usually a bad client id.
    NeedsAuth,

    /// Server rate limiting (HTTP 429). Retried, honouring Retry-After.
    RateLimited,
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Give up.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry behaviour with exponential backoff.
///
/// Delay for the retry after attempt `n` is
/// `min(base_delay * multiplier^(n-1), max_delay) + jitter`,
/// so with defaults roughly 1s then 2s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Creates a policy from the user-facing retry count (`--max-retries`).
    ///
    /// `retries` is the number of *additional* attempts, so `0` means a single try.
    #[must_use]
    pub fn from_retry_count(retries: u32) -> Self {
        Self::with_max_attempts(retries.saturating_add(1))
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after attempt number `attempt` (1-indexed) failed.
    #[instrument(level = "debug", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::NeedsAuth => {
                return RetryDecision::DoNotRetry {
                    reason: "authorization refused - check the client id".to_string(),
                };
            }
            FailureType::Transient | FailureType::RateLimited => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);
        let exponent = f64::from(attempt.saturating_sub(1));
        let capped_ms = (base_ms * multiplier.powf(exponent)).min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + Self::calculate_jitter()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn calculate_jitter() -> Duration {
        let jitter_ms = rand::thread_rng().gen_range(0..=MAX_JITTER.as_millis() as u64);
        Duration::from_millis(jitter_ms)
    }
}

/// Classifies an image download error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Timeout, most network errors | Transient |
/// | TLS/certificate errors | Permanent |
/// | HTTP status | see [`classify_http_status`] |
/// | IO, invalid URL | Permanent |
#[must_use]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::HttpStatus { status, .. } => classify_http_status(*status),
        DownloadError::Timeout { .. } => FailureType::Transient,
        DownloadError::Network { source, .. } => classify_network_error(source),
        DownloadError::Io { .. } | DownloadError::InvalidUrl { .. } => FailureType::Permanent,
    }
}

/// Classifies a reqwest transport error (no HTTP status received).
#[must_use]
pub fn classify_network_error(error: &reqwest::Error) -> FailureType {
    if error.is_timeout() {
        return FailureType::Transient;
    }
    let message = error.to_string().to_lowercase();
    if ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| message.contains(needle))
    {
        FailureType::Permanent
    } else {
        FailureType::Transient
    }
}

/// Classifies an HTTP status code.
///
/// 401/403 -> `NeedsAuth`, 408 and 5xx -> `Transient`, 429 -> `RateLimited`,
/// everything else -> `Permanent`.
#[must_use]
pub fn classify_http_status(status: u16) -> FailureType {
    match status {
        401 | 403 => FailureType::NeedsAuth,
        408 => FailureType::Transient,
        429 => FailureType::RateLimited,
        500..=599 => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}

/// Errors that the retry loop understands.
pub trait RetryableError: std::fmt::Display {
    /// Classification used by [`RetryPolicy::should_retry`].
    fn failure_type(&self) -> FailureType;

    /// Raw `Retry-After` header value, when the server sent one.
    fn retry_after(&self) -> Option<&str> {
        None
    }
}

impl RetryableError for DownloadError {
    fn failure_type(&self) -> FailureType {
        classify_error(self)
    }

    fn retry_after(&self) -> Option<&str> {
        DownloadError::retry_after(self)
    }
}

/// Runs `operation` until it succeeds or `policy` gives up.
///
/// Every attempt first waits for a pacing slot on `url`'s host. When a
/// rate-limited response carries `Retry-After`, that delay is recorded on the
/// limiter (so other tasks hitting the same host back off too) and used
/// instead of the exponential backoff. Each retry increments `retries`.
///
/// # Errors
///
/// Returns the last error once retries are exhausted or the failure is not retryable.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    rate_limiter: &RateLimiter,
    url: &str,
    retries: &AtomicU64,
    mut operation: F,
) -> Result<T, E>
where
    E: RetryableError,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        rate_limiter.acquire(url).await;
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let failure_type = error.failure_type();
        let retry_after_delay = if failure_type == FailureType::RateLimited {
            error.retry_after().and_then(parse_retry_after)
        } else {
            None
        };

        match policy.should_retry(failure_type, attempt) {
            RetryDecision::Retry {
                delay: backoff_delay,
                attempt: next_attempt,
            } => {
                if let Some(server_delay) = retry_after_delay {
                    rate_limiter.record_rate_limit(url, server_delay).await;
                }
                let delay = retry_after_delay.unwrap_or(backoff_delay);
                info!(
                    url = %url,
                    attempt = next_attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis(),
                    using_retry_after = retry_after_delay.is_some(),
                    error = %error,
                    "retrying request"
                );
                retries.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(delay).await;
                attempt = next_attempt;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(url = %url, attempt, %reason, "giving up");
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(32));
        assert!((policy.backoff_multiplier - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 2.0).max_attempts(), 1);
    }

    #[test]
    fn test_retry_policy_from_retry_count_adds_initial_attempt() {
        assert_eq!(RetryPolicy::from_retry_count(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::from_retry_count(3).max_attempts(), 4);
        assert_eq!(RetryPolicy::from_retry_count(u32::MAX).max_attempts(), u32::MAX);
    }

    #[test]
    fn test_delay_grows_exponentially_within_jitter() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(32), 2.0);
        for (attempt, base_secs) in [(1, 1), (2, 2), (3, 4)] {
            let delay = policy.calculate_delay(attempt);
            assert!(delay >= Duration::from_secs(base_secs), "attempt {attempt}: {delay:?}");
            assert!(
                delay <= Duration::from_secs(base_secs) + MAX_JITTER,
                "attempt {attempt}: {delay:?}"
            );
        }
    }

    #[test]
    fn test_delay_respects_max_delay() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        let delay = policy.calculate_delay(6);
        assert!(delay >= Duration::from_secs(5));
        assert!(delay <= Duration::from_secs(5) + MAX_JITTER);
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            assert!(RetryPolicy::calculate_jitter() <= MAX_JITTER);
        }
    }

    #[test]
    fn test_classify_http_status_table() {
        let cases = [
            (400, FailureType::Permanent),
            (401, FailureType::NeedsAuth),
            (403, FailureType::NeedsAuth),
            (404, FailureType::Permanent),
            (408, FailureType::Transient),
            (429, FailureType::RateLimited),
            (500, FailureType::Transient),
            (503, FailureType::Transient),
            (599, FailureType::Transient),
            (302, FailureType::Permanent),
        ];
        for (status, expected) in cases {
            assert_eq!(classify_http_status(status), expected, "status {status}");
        }
    }

    #[test]
    fn test_classify_error_non_http() {
        assert_eq!(
            classify_error(&DownloadError::timeout("https://i.imgur.com/a.jpg")),
            FailureType::Transient
        );
        assert_eq!(
            classify_error(&DownloadError::invalid_url("nope")),
            FailureType::Permanent
        );
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            classify_error(&DownloadError::io("/album/a.jpg", io_err)),
            FailureType::Permanent
        );
    }

    #[test]
    fn test_should_retry_permanent_and_auth_do_not_retry() {
        let policy = RetryPolicy::default();
        match policy.should_retry(FailureType::Permanent, 1) {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("permanent")),
            other => panic!("expected DoNotRetry, got {other:?}"),
        }
        match policy.should_retry(FailureType::NeedsAuth, 1) {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("client id")),
            other => panic!("expected DoNotRetry, got {other:?}"),
        }
    }

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(3);

        assert!(matches!(
            policy.should_retry(FailureType::Transient, 1),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::RateLimited, 2),
            RetryDecision::Retry { attempt: 3, .. }
        ));
        match policy.should_retry(FailureType::Transient, 3) {
            RetryDecision::DoNotRetry { reason } => assert!(reason.contains("exhausted")),
            other => panic!("expected DoNotRetry, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_backoff_retries_transient_then_succeeds() {
        let policy = RetryPolicy::with_max_attempts(3);
        let limiter = RateLimiter::disabled();
        let retries = AtomicU64::new(0);
        let calls = AtomicU64::new(0);

        let result: Result<u32, DownloadError> =
            retry_with_backoff(&policy, &limiter, "https://i.imgur.com/a.jpg", &retries, || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        Err(DownloadError::http_status("https://i.imgur.com/a.jpg", 503))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(retries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_backoff_stops_on_permanent() {
        let policy = RetryPolicy::with_max_attempts(5);
        let limiter = RateLimiter::disabled();
        let retries = AtomicU64::new(0);
        let calls = AtomicU64::new(0);

        let result: Result<(), DownloadError> =
            retry_with_backoff(&policy, &limiter, "https://i.imgur.com/a.jpg", &retries, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DownloadError::http_status("https://i.imgur.com/a.jpg", 404)) }
            })
            .await;

        assert!(matches!(result, Err(DownloadError::HttpStatus { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(retries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_backoff_honours_retry_after() {
        let policy = RetryPolicy::with_max_attempts(2);
        let limiter = RateLimiter::disabled();
        let retries = AtomicU64::new(0);
        let calls = AtomicU64::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), DownloadError> =
            retry_with_backoff(&policy, &limiter, "https://api.imgur.com/3/album/x", &retries, || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call == 0 {
                        Err(DownloadError::http_status_with_retry_after(
                            "https://api.imgur.com/3/album/x",
                            429,
                            Some("20".to_string()),
                        ))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_with_backoff_exhausts_attempts() {
        let policy = RetryPolicy::with_max_attempts(3);
        let limiter = RateLimiter::disabled();
        let retries = AtomicU64::new(0);
        let calls = AtomicU64::new(0);

        let result: Result<(), DownloadError> =
            retry_with_backoff(&policy, &limiter, "https://i.imgur.com/a.jpg", &retries, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DownloadError::timeout("https://i.imgur.com/a.jpg")) }
            })
            .await;

        assert!(matches!(result, Err(DownloadError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(retries.load(Ordering::SeqCst), 2);
    }
}
