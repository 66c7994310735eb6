//! Error types for the scraper core.

use thiserror::Error;

/// Main error type for scraping runs.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The requested session or term does not exist in the metadata.
    #[error("No data exists for {0}")]
    NoDataForPeriod(String),

    /// No scraper is registered for this jurisdiction and type.
    #[error("No {scraper_type} scraper found for {jurisdiction}")]
    UnknownScraper {
        jurisdiction: String,
        scraper_type: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status that is not retried.
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// All retry attempts failed.
    #[error("Giving up on {url} after {attempts} attempts: {message}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Manual match file could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Jurisdiction metadata is missing or malformed.
    #[error("Invalid metadata: {0}")]
    Metadata(String),

    /// A record failed validation in strict mode.
    #[error("Validation failed for {record}: {}", .issues.join("; "))]
    Validation { record: String, issues: Vec<String> },

    /// Chamber name outside upper/lower/joint.
    #[error("Invalid chamber: '{0}'. Expected upper, lower or joint")]
    InvalidChamber(String),

    /// Action rules could not be loaded.
    #[error("Action categorizer error: {0}")]
    Categorizer(#[from] billy_categorizer::CategorizerError),

    /// A scraper could not make sense of a page.
    #[error("{scraper_type} scraper failed: {message}")]
    Scraper {
        scraper_type: String,
        message: String,
    },

    /// Two legislators share a legislator code.
    #[error("Non-unique legislator code: {0}")]
    DuplicateCode(String),

    /// Invalid invocation of the run driver.
    #[error("{0}")]
    Run(String),
}

impl ScrapeError {
    /// Build a site-level scraping failure.
    pub fn scraper(scraper_type: impl ToString, message: impl Into<String>) -> Self {
        Self::Scraper {
            scraper_type: scraper_type.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for scraping operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
