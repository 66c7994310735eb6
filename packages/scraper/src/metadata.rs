//! Jurisdiction metadata: chambers, terms and sessions.
//!
//! Metadata files are JSON or YAML. Terms are listed oldest first; the last
//! term is the current one.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::validate_abbreviation;
use crate::error::{Result, ScrapeError};
use crate::model::Extra;
use crate::scrape::ScraperType;

/// Description of one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub abbreviation: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub legislature_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legislature_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capitol_timezone: Option<String>,
    /// Keyed by `upper`, `lower` (and `joint` where committees are shared).
    #[serde(default)]
    pub chambers: BTreeMap<String, ChamberInfo>,
    pub terms: Vec<Term>,
    #[serde(default)]
    pub session_details: BTreeMap<String, SessionDetail>,
    /// JSON feeds served by the generic feed scraper.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feeds: BTreeMap<ScraperType, FeedConfig>,
    /// Built-in rule set name or rule file for action categorization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_rules: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_level() -> String {
    "state".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChamberInfo {
    pub name: String,
    /// Title of members, e.g. `Senator`.
    #[serde(default)]
    pub title: String,
}

/// A legislative term and the sessions held in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
    pub sessions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `primary` or `special`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Name of the session as shown on the legislature's site.
    #[serde(rename = "_scraped_name", default, skip_serializing_if = "Option::is_none")]
    pub scraped_name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Where the feed scraper reads records of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// URL template with `{session}`, `{term}` and `{chamber}` placeholders.
    pub url: String,
}

impl Metadata {
    /// Load metadata from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut metadata = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&content)?,
            _ => Self::from_json(&content)?,
        };
        if let Some(dir) = path.parent() {
            metadata.anchor_action_rules(dir);
        }
        tracing::debug!(
            path = %path.display(),
            abbreviation = %metadata.abbreviation,
            terms = metadata.terms.len(),
            "Loaded metadata"
        );
        Ok(metadata)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Resolve a relative `action_rules` file against `dir`, the directory
    /// holding the metadata file. Built-in rule set names are left alone.
    pub fn anchor_action_rules(&mut self, dir: &Path) {
        let Some(rules) = &self.action_rules else {
            return;
        };
        if billy_categorizer::rulesets::available().contains(&rules.to_lowercase().as_str()) {
            return;
        }
        let rules_path = Path::new(rules);
        if rules_path.is_relative() {
            let anchored = dir.join(rules_path);
            tracing::debug!(rules = %rules, path = %anchored.display(), "Resolved action rules file");
            self.action_rules = Some(anchored.to_string_lossy().into_owned());
        }
    }

    /// Every session of every term, in order.
    #[must_use]
    pub fn all_sessions(&self) -> Vec<&str> {
        self.terms
            .iter()
            .flat_map(|t| t.sessions.iter().map(String::as_str))
            .collect()
    }

    /// Fail with `NoDataForPeriod` unless `session` is in some term.
    pub fn validate_session(&self, session: &str) -> Result<()> {
        if self.terms.iter().any(|t| t.sessions.iter().any(|s| s == session)) {
            Ok(())
        } else {
            Err(ScrapeError::NoDataForPeriod(session.to_string()))
        }
    }

    /// Fail with `NoDataForPeriod` unless `term` is known.
    ///
    /// With `latest_only` only the current (last) term is accepted.
    pub fn validate_term(&self, term: &str, latest_only: bool) -> Result<()> {
        let known = if latest_only {
            self.latest_term().is_some_and(|t| t.name == term)
        } else {
            self.terms.iter().any(|t| t.name == term)
        };
        if known {
            Ok(())
        } else {
            Err(ScrapeError::NoDataForPeriod(term.to_string()))
        }
    }

    #[must_use]
    pub fn latest_term(&self) -> Option<&Term> {
        self.terms.last()
    }

    /// Last session of the current term.
    #[must_use]
    pub fn latest_session(&self) -> Option<&str> {
        self.latest_term()
            .and_then(|t| t.sessions.last())
            .map(String::as_str)
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.name == name)
    }

    /// Sessions held in a term.
    pub fn sessions_for_term(&self, term: &str) -> Result<&[String]> {
        self.term(term)
            .map(|t| t.sessions.as_slice())
            .ok_or_else(|| ScrapeError::NoDataForPeriod(term.to_string()))
    }

    /// Term containing a session.
    #[must_use]
    pub fn term_for_session(&self, session: &str) -> Option<&Term> {
        self.terms
            .iter()
            .find(|t| t.sessions.iter().any(|s| s == session))
    }

    /// Whether the jurisdiction declares this chamber.
    #[must_use]
    pub fn has_chamber(&self, chamber: &str) -> bool {
        self.chambers.contains_key(chamber)
    }

    #[must_use]
    pub fn feed(&self, scraper_type: ScraperType) -> Option<&FeedConfig> {
        self.feeds.get(&scraper_type)
    }

    /// Structural problems with the metadata. Empty means valid.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push("name is empty".to_string());
        }
        if let Err(e) = validate_abbreviation(&self.abbreviation) {
            problems.push(e.to_string());
        }
        if self.terms.is_empty() {
            problems.push("no terms defined".to_string());
        }

        let mut seen_terms = BTreeSet::new();
        for term in &self.terms {
            if !seen_terms.insert(term.name.as_str()) {
                problems.push(format!("duplicate term '{}'", term.name));
            }
            if term.start_year > term.end_year {
                problems.push(format!(
                    "term '{}' starts after it ends ({} > {})",
                    term.name, term.start_year, term.end_year
                ));
            }
        }

        let mut seen_sessions = BTreeSet::new();
        for session in self.all_sessions() {
            if !seen_sessions.insert(session) {
                problems.push(format!("session '{session}' listed in more than one term"));
            }
        }

        for session in self.session_details.keys() {
            if !seen_sessions.contains(session.as_str()) {
                problems.push(format!("session_details for unknown session '{session}'"));
            }
        }

        for chamber in self.chambers.keys() {
            if !matches!(chamber.as_str(), "upper" | "lower" | "joint") {
                problems.push(format!("unknown chamber '{chamber}'"));
            }
        }

        problems
    }
}
