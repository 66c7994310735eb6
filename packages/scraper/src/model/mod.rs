//! Scraped records: bills, people, committees, votes and events.
//!
//! Every record carries its provenance (`sources`) and keeps arbitrary extra
//! fields, which are flattened into the JSON output next to the known ones.

pub mod bill;
pub mod committee;
pub mod date;
pub mod event;
pub mod legislator;
pub mod vote;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ScrapeError;

pub use bill::{Action, Bill, Document, Sponsor};
pub use committee::{Committee, Member};
pub use event::{Event, Participant, RelatedBill};
pub use legislator::{Legislator, Person, Role};
pub use vote::Vote;

/// Extra fields attached to a record or sub-record.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// A legislative chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chamber {
    Upper,
    Lower,
    Joint,
}

impl Chamber {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Joint => "joint",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chamber {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upper" => Ok(Self::Upper),
            "lower" => Ok(Self::Lower),
            "joint" => Ok(Self::Joint),
            _ => Err(ScrapeError::InvalidChamber(s.to_string())),
        }
    }
}

/// Where a record (or part of it) was scraped from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Source {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: Extra::new(),
        }
    }
}

/// Behavior shared by every scraped record.
pub trait Record: Serialize + DeserializeOwned {
    /// Value of the `_type` field in the JSON output.
    const KIND: &'static str;

    fn sources(&self) -> &[Source];

    fn sources_mut(&mut self) -> &mut Vec<Source>;

    /// Add a source URL from which data for this record was scraped.
    fn add_source(&mut self, url: impl Into<String>) {
        self.sources_mut().push(Source::new(url));
    }

    /// Output file name, unique within the record's type directory.
    fn filename(&self) -> String;

    /// Chamber the record belongs to, if any.
    fn chamber(&self) -> Option<Chamber> {
        None
    }

    /// Short description used in log lines.
    fn describe(&self) -> String {
        self.filename()
    }
}

/// Make a file name safe: non-ASCII becomes `?`, path separators become `-`.
///
/// # Examples
/// ```
/// use billy_scraper::model::sanitize_filename;
///
/// assert_eq!(sanitize_filename("2011_lower_HB 1/2.json"), "2011_lower_HB 1-2.json");
/// assert_eq!(sanitize_filename("Muñoz.json"), "Mu?oz.json");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

/// First eight hex digits of the SHA-256 of `text`.
pub(crate) fn short_hash(text: &str) -> String {
    let digest = hex::encode(Sha256::digest(text.as_bytes()));
    digest[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chamber_parse_case_insensitive() {
        assert_eq!("Upper".parse::<Chamber>().unwrap(), Chamber::Upper);
        assert_eq!(" LOWER ".parse::<Chamber>().unwrap(), Chamber::Lower);
        assert_eq!("joint".parse::<Chamber>().unwrap(), Chamber::Joint);
        assert!(matches!(
            "senate".parse::<Chamber>(),
            Err(ScrapeError::InvalidChamber(_))
        ));
    }

    #[test]
    fn test_chamber_serde() {
        assert_eq!(serde_json::to_string(&Chamber::Upper).unwrap(), "\"upper\"");
        let parsed: Chamber = serde_json::from_str("\"joint\"").unwrap();
        assert_eq!(parsed, Chamber::Joint);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a\\b/c"), "a-b-c");
        assert_eq!(sanitize_filename("José Peña"), "Jos? Pe?a");
        assert_eq!(sanitize_filename("plain.json"), "plain.json");
    }

    #[test]
    fn test_source_extra_flattened() {
        let mut source = Source::new("http://example.com");
        source.extra.insert("retrieved".into(), serde_json::json!("today"));
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "http://example.com", "retrieved": "today"})
        );
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash("x").len(), 8);
        assert_eq!(short_hash("x"), short_hash("x"));
        assert_ne!(short_hash("x"), short_hash("y"));
    }
}
