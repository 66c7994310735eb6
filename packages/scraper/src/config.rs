//! Configuration constants, runtime settings and validation functions.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{Result, ScrapeError};

/// Root directory for scraped output (`<root>/<abbreviation>/...`).
pub const DEFAULT_DATA_DIR: &str = "data";

/// Directory for cached downloads.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Directory where failed responses are kept for inspection.
pub const DEFAULT_ERROR_DIR: &str = "errors";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Retry attempts for transient failures.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Base wait between retries, doubled on each attempt.
pub const DEFAULT_RETRY_WAIT_SECS: u64 = 10;

/// Default request rate limit.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Jurisdiction abbreviation: two or three lowercase letters.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ABBREVIATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}$").expect("valid regex"));

/// Validate a jurisdiction abbreviation.
///
/// # Examples
/// ```
/// use billy_scraper::config::validate_abbreviation;
///
/// assert!(validate_abbreviation("nc").is_ok());
/// assert!(validate_abbreviation("NC").is_err());
/// assert!(validate_abbreviation("north-carolina").is_err());
/// ```
pub fn validate_abbreviation(abbreviation: &str) -> Result<()> {
    if ABBREVIATION_PATTERN.is_match(abbreviation) {
        Ok(())
    } else {
        Err(ScrapeError::Metadata(format!(
            "invalid abbreviation '{abbreviation}': expected two or three lowercase letters"
        )))
    }
}

/// Fields copied onto every saved record for a jurisdiction level.
///
/// Records of a `state` level jurisdiction get `state: <abbreviation>`,
/// alongside `country: us`.
#[must_use]
pub fn level_fields(level: &str) -> &'static [&'static str] {
    match level {
        "state" => &["state", "country"],
        "country" => &["country"],
        _ => &[],
    }
}

/// Shared settings for fetching and writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of scraped output.
    pub data_dir: PathBuf,
    /// Download cache, `None` when caching is disabled.
    pub cache_dir: Option<PathBuf>,
    /// Where failed responses are written.
    pub error_dir: PathBuf,
    pub timeout: Duration,
    /// `None` disables rate limiting.
    pub requests_per_minute: Option<u32>,
    pub retry_attempts: u32,
    pub retry_wait: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            error_dir: PathBuf::from(DEFAULT_ERROR_DIR),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            requests_per_minute: Some(DEFAULT_REQUESTS_PER_MINUTE),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_wait: Duration::from_secs(DEFAULT_RETRY_WAIT_SECS),
        }
    }
}

impl Settings {
    /// Read settings from `BILLY_*` environment variables over the defaults.
    ///
    /// Unparseable numeric values fall back to the defaults.
    /// `BILLY_REQUESTS_PER_MINUTE=0` disables rate limiting.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = std::env::var("BILLY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let cache_dir = std::env::var("BILLY_CACHE_DIR")
            .map(PathBuf::from)
            .ok()
            .or(defaults.cache_dir);

        let error_dir = std::env::var("BILLY_ERROR_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.error_dir);

        let timeout_secs: u64 = std::env::var("BILLY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(HTTP_TIMEOUT_SECS);

        let requests_per_minute = std::env::var("BILLY_REQUESTS_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .map_or(defaults.requests_per_minute, |rpm| (rpm > 0).then_some(rpm));

        let retry_attempts = std::env::var("BILLY_RETRY_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_ATTEMPTS);

        let retry_wait_secs: u64 = std::env::var("BILLY_RETRY_WAIT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_WAIT_SECS);

        Self {
            data_dir,
            cache_dir,
            error_dir,
            timeout: Duration::from_secs(timeout_secs),
            requests_per_minute,
            retry_attempts,
            retry_wait: Duration::from_secs(retry_wait_secs),
        }
    }

    /// Disable the download cache.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_error_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.error_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the rate limit; `0` disables it.
    #[must_use]
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = (rpm > 0).then_some(rpm);
        self
    }

    #[must_use]
    pub fn with_retries(mut self, attempts: u32, wait: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_wait = wait;
        self
    }

    /// Default output directory for a jurisdiction.
    #[must_use]
    pub fn output_dir(&self, abbreviation: &str) -> PathBuf {
        self.data_dir.join(abbreviation)
    }

    /// Minimum spacing between requests implied by the rate limit.
    #[must_use]
    pub fn min_request_interval(&self) -> Option<Duration> {
        self.requests_per_minute
            .map(|rpm| Duration::from_secs_f64(60.0 / f64::from(rpm)))
    }
}
