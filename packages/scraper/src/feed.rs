//! Generic scraper for jurisdictions that publish records as JSON.
//!
//! The feed URL is a template; `{session}`, `{term}` and `{chamber}` are
//! filled in per scrape call. The response must be a JSON array of records
//! of the scraper's type.

use serde_json::Value;

use crate::error::{Result, ScrapeError};
use crate::metadata::Metadata;
use crate::model::{Bill, Chamber, Committee, Event, Legislator, Record, Vote};
use crate::scrape::{PeriodKind, ScrapeContext, Scraper, ScraperType};

/// Reads records of one type from a JSON feed.
#[derive(Debug, Clone)]
pub struct FeedScraper {
    scraper_type: ScraperType,
    url_template: String,
}

impl FeedScraper {
    pub fn new(scraper_type: ScraperType, url_template: impl Into<String>) -> Self {
        Self {
            scraper_type,
            url_template: url_template.into(),
        }
    }

    /// Fill in the URL template for a chamber and period.
    ///
    /// For session-based types `{term}` is the term holding the session; for
    /// term-based types `{session}` is the last session of the term.
    #[must_use]
    pub fn url_for(&self, metadata: &Metadata, chamber: Chamber, period: &str) -> String {
        let (session, term) = match self.scraper_type.period_kind() {
            PeriodKind::Session => {
                let term = metadata
                    .term_for_session(period)
                    .map_or(period, |t| t.name.as_str());
                (period, term)
            }
            PeriodKind::Term => {
                let session = metadata
                    .term(period)
                    .and_then(|t| t.sessions.last())
                    .map_or(period, String::as_str);
                (session, period)
            }
        };

        self.url_template
            .replace("{session}", session)
            .replace("{term}", term)
            .replace("{chamber}", chamber.as_str())
    }

    fn parse<R: Record>(&self, index: usize, item: Value) -> Result<R> {
        serde_json::from_value(item)
            .map_err(|e| ScrapeError::scraper(self.scraper_type, format!("record {index}: {e}")))
    }

    /// Parse, filter by chamber and attach the feed URL as a source.
    fn prepare<R: Record>(
        &self,
        index: usize,
        item: Value,
        chamber: Chamber,
        url: &str,
    ) -> Result<Option<R>> {
        let mut record: R = self.parse(index, item)?;
        if !belongs_to(record.chamber(), chamber) {
            tracing::trace!(record = %record.describe(), chamber = %chamber, "Skipping record of another chamber");
            return Ok(None);
        }
        if !record.sources().iter().any(|s| s.url == url) {
            record.add_source(url);
        }
        Ok(Some(record))
    }
}

/// Chamberless and joint records go with every chamber; they are written
/// to the same file each time.
fn belongs_to(record_chamber: Option<Chamber>, chamber: Chamber) -> bool {
    match record_chamber {
        None | Some(Chamber::Joint) => true,
        Some(c) => c == chamber,
    }
}

impl Scraper for FeedScraper {
    fn scraper_type(&self) -> ScraperType {
        self.scraper_type
    }

    fn scrape(&self, chamber: Chamber, period: &str, ctx: &mut ScrapeContext<'_>) -> Result<()> {
        let url = self.url_for(ctx.metadata(), chamber, period);

        let items: Vec<Value> = match ctx.fetch_json(&url) {
            Ok(items) => items,
            Err(ScrapeError::HttpStatus { status: 404, .. }) => {
                return Err(ScrapeError::NoDataForPeriod(period.to_string()));
            }
            Err(e) => return Err(e),
        };
        tracing::info!(url = %url, records = items.len(), "Fetched feed");

        let session_based = self.scraper_type.period_kind() == PeriodKind::Session;
        for (index, mut item) in items.into_iter().enumerate() {
            if session_based {
                if let Value::Object(fields) = &mut item {
                    fields
                        .entry("session")
                        .or_insert_with(|| Value::from(period));
                }
            }

            match self.scraper_type {
                ScraperType::Bills => {
                    if let Some(bill) = self.prepare::<Bill>(index, item, chamber, &url)? {
                        ctx.save_bill(bill)?;
                    }
                }
                ScraperType::Votes => {
                    if let Some(vote) = self.prepare::<Vote>(index, item, chamber, &url)? {
                        ctx.save_vote(&vote)?;
                    }
                }
                ScraperType::Committees => {
                    if let Some(committee) = self.prepare::<Committee>(index, item, chamber, &url)? {
                        ctx.save_committee(&committee)?;
                    }
                }
                ScraperType::Events => {
                    if let Some(event) = self.prepare::<Event>(index, item, chamber, &url)? {
                        ctx.save_event(&event)?;
                    }
                }
                ScraperType::Legislators => {
                    if let Some(leg) = self.prepare::<Legislator>(index, item, chamber, &url)? {
                        if leg.member_role().is_some_and(|r| r.role == "member") {
                            ctx.save_legislator(&leg)?;
                        } else {
                            ctx.save_person(&leg.into_person())?;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata::from_yaml(
            r#"
name: North Carolina
abbreviation: nc
terms:
  - {name: "2009-2010", start_year: 2009, end_year: 2010, sessions: ["2009", "2010E1"]}
  - {name: "2011-2012", start_year: 2011, end_year: 2012, sessions: ["2011"]}
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_url_for_session_type() {
        let feed = FeedScraper::new(ScraperType::Bills, "http://x/{term}/{session}/{chamber}.json");
        assert_eq!(
            feed.url_for(&metadata(), Chamber::Upper, "2010E1"),
            "http://x/2009-2010/2010E1/upper.json"
        );
    }

    #[test]
    fn test_url_for_term_type() {
        let feed = FeedScraper::new(ScraperType::Legislators, "http://x/{term}/{session}/{chamber}");
        assert_eq!(
            feed.url_for(&metadata(), Chamber::Lower, "2009-2010"),
            "http://x/2009-2010/2010E1/lower"
        );
    }

    #[test]
    fn test_belongs_to() {
        assert!(belongs_to(None, Chamber::Upper));
        assert!(belongs_to(Some(Chamber::Joint), Chamber::Lower));
        assert!(belongs_to(Some(Chamber::Upper), Chamber::Upper));
        assert!(!belongs_to(Some(Chamber::Upper), Chamber::Lower));
    }
}
