//! Constants for the download module (timeouts, rate limiting, concurrency).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes; GIFs and MP4s can be large).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default spacing between requests to one host, in milliseconds.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 200;

/// Default number of images downloaded concurrently within one album.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound for image download concurrency.
pub const MAX_CONCURRENCY: usize = 32;

/// Warning threshold for cumulative pacing delay per host (30 seconds).
pub const CUMULATIVE_DELAY_WARNING_THRESHOLD: Duration = Duration::from_secs(30);

/// Maximum Retry-After honoured (1 hour).
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);
