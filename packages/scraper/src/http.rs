//! HTTP fetching shared by all scrapers: caching, rate limiting and retries.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::error::{Result, ScrapeError};

/// User agent string identifying this scraper.
const USER_AGENT: &str = concat!("billy/", env!("CARGO_PKG_VERSION"));

/// Downloads pages for scrapers.
///
/// Responses are cached on disk keyed by the SHA-256 of the URL. Network
/// requests are spaced according to the configured rate limit, and transient
/// failures are retried with exponential backoff.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    cache_dir: Option<PathBuf>,
    error_dir: PathBuf,
    retry_attempts: u32,
    retry_wait: Duration,
    min_interval: Option<Duration>,
    last_request: Cell<Option<Instant>>,
}

impl Fetcher {
    /// Create a fetcher from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            cache_dir: settings.cache_dir.clone(),
            error_dir: settings.error_dir.clone(),
            retry_attempts: settings.retry_attempts,
            retry_wait: settings.retry_wait,
            min_interval: settings.min_request_interval(),
            last_request: Cell::new(None),
        })
    }

    /// Fetch a URL as text, decoding invalid UTF-8 lossily.
    pub fn get(&self, url: &str) -> Result<String> {
        let bytes = self.get_bytes(url)?;
        Ok(bytes_to_string(&bytes, url))
    }

    /// Fetch a URL and parse it as JSON.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let bytes = self.get_bytes(url)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch raw bytes, from the cache when possible.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let cache_path = self.cache_dir.as_deref().map(|dir| dir.join(cache_key(url)));

        if let Some(path) = &cache_path {
            if path.exists() {
                tracing::debug!(url, path = %path.display(), "Cache hit");
                return Ok(fs::read(path)?);
            }
        }

        let bytes = self.download(url)?;

        if let Some(path) = &cache_path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &bytes)?;
            tracing::debug!(url, path = %path.display(), "Cached response");
        }

        Ok(bytes)
    }

    /// Download with retry logic.
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let attempts = self.retry_attempts.saturating_add(1);
        let mut last_error: Option<String> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_wait, attempt);
                tracing::debug!(url, attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
                thread::sleep(delay);
            }

            self.throttle();
            tracing::info!(url, "GET");

            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            url,
                            status = %status,
                            attempt = attempt + 1,
                            max_attempts = attempts,
                            "Server error, will retry"
                        );
                        let body = response.bytes().map(|b| b.to_vec()).unwrap_or_default();
                        self.save_error_body(url, &body);
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    if !status.is_success() {
                        let body = response.bytes().map(|b| b.to_vec()).unwrap_or_default();
                        self.save_error_body(url, &body);
                        return Err(ScrapeError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    return Ok(response.bytes()?.to_vec());
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            url,
                            error = %e,
                            attempt = attempt + 1,
                            max_attempts = attempts,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(ScrapeError::Http(e));
                }
            }
        }

        Err(ScrapeError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    /// Sleep until the rate limit allows another request.
    fn throttle(&self) {
        let Some(interval) = self.min_interval else {
            return;
        };
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let wait = interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Rate limited");
                thread::sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    /// Keep the body of a failed response around for debugging.
    fn save_error_body(&self, url: &str, body: &[u8]) {
        let path = self.error_dir.join(cache_key(url));
        let written = fs::create_dir_all(&self.error_dir).and_then(|()| fs::write(&path, body));
        match written {
            Ok(()) => tracing::debug!(url, path = %path.display(), "Saved failed response"),
            Err(e) => tracing::warn!(url, error = %e, "Could not save failed response"),
        }
    }

    /// Location of the cache, if enabled.
    #[must_use]
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}

/// Wait before retry `attempt` (1-based): `wait`, `2 * wait`, `4 * wait`, ...
///
/// The doubling stops after 16 steps and the result saturates at
/// [`Duration::MAX`].
#[must_use]
pub fn backoff_delay(wait: Duration, attempt: u32) -> Duration {
    let factor = 1u32 << attempt.saturating_sub(1).min(16);
    wait.checked_mul(factor).unwrap_or(Duration::MAX)
}

/// File name for a URL in the cache and error directories.
#[must_use]
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Decode bytes as UTF-8, replacing invalid sequences.
pub fn bytes_to_string(bytes: &[u8], url: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) => {
            tracing::warn!(url, error = %e, "Response is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
