//! The scraper abstraction and the context scrapers save records through.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use billy_categorizer::Categorizer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};
use crate::http::Fetcher;
use crate::metadata::Metadata;
use crate::model::{Bill, Chamber, Committee, Event, Legislator, Person, Record, Vote};
use crate::names::Roster;
use crate::validate::{Validate, Validator};
use crate::writer::RecordWriter;

/// Kind of data a scraper produces; also the output subdirectory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperType {
    Bills,
    Legislators,
    Committees,
    Votes,
    Events,
}

/// Whether a scraper is run per session or per term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Session,
    Term,
}

impl ScraperType {
    pub const ALL: [Self; 5] = [
        Self::Bills,
        Self::Legislators,
        Self::Committees,
        Self::Votes,
        Self::Events,
    ];

    /// Types selected by `--alldata`.
    #[must_use]
    pub fn alldata() -> [Self; 4] {
        [Self::Bills, Self::Legislators, Self::Committees, Self::Votes]
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bills => "bills",
            Self::Legislators => "legislators",
            Self::Committees => "committees",
            Self::Votes => "votes",
            Self::Events => "events",
        }
    }

    #[must_use]
    pub fn period_kind(self) -> PeriodKind {
        match self {
            Self::Bills | Self::Votes | Self::Events => PeriodKind::Session,
            Self::Legislators | Self::Committees => PeriodKind::Term,
        }
    }
}

impl fmt::Display for ScraperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScraperType {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ScrapeError::Run(format!("unknown scraper type '{s}'")))
    }
}

/// A scraper for one kind of data in one jurisdiction.
pub trait Scraper {
    fn scraper_type(&self) -> ScraperType;

    /// Scrape everything for a chamber in a session or term.
    ///
    /// Should fail with [`ScrapeError::NoDataForPeriod`] when the site has
    /// nothing for the period.
    fn scrape(&self, chamber: Chamber, period: &str, ctx: &mut ScrapeContext<'_>) -> Result<()>;
}

/// Everything a scraper needs during a run.
pub struct ScrapeContext<'a> {
    metadata: &'a Metadata,
    fetcher: &'a Fetcher,
    writer: &'a RecordWriter,
    validator: &'a Validator,
    categorizer: Option<&'a Categorizer>,
    roster: Roster,
    scraper_type: ScraperType,
    saved: BTreeSet<PathBuf>,
}

impl<'a> ScrapeContext<'a> {
    pub fn new(
        metadata: &'a Metadata,
        fetcher: &'a Fetcher,
        writer: &'a RecordWriter,
        validator: &'a Validator,
        scraper_type: ScraperType,
    ) -> Self {
        Self {
            metadata,
            fetcher,
            writer,
            validator,
            categorizer: None,
            roster: Roster::new(),
            scraper_type,
            saved: BTreeSet::new(),
        }
    }

    /// Categorize uncategorized bill actions before saving bills.
    #[must_use]
    pub fn with_categorizer(mut self, categorizer: &'a Categorizer) -> Self {
        self.categorizer = Some(categorizer);
        self
    }

    /// Start from legislators saved earlier, e.g. by a previous run.
    #[must_use]
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = roster;
        self
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        self.metadata
    }

    #[must_use]
    pub fn categorizer(&self) -> Option<&Categorizer> {
        self.categorizer
    }

    #[must_use]
    pub fn scraper_type(&self) -> ScraperType {
        self.scraper_type
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Record file name of the legislator serving in `term` whose name
    /// uniquely matches `name`, as written in vote rolls or sponsor lists.
    #[must_use]
    pub fn match_legislator(&self, term: &str, name: &str, chamber: Option<Chamber>) -> Option<String> {
        self.roster.match_name(term, name, chamber)
    }

    /// Fetch a page as text.
    pub fn fetch(&self, url: &str) -> Result<String> {
        self.fetcher.get(url)
    }

    pub fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.fetcher.get_json(url)
    }

    /// Number of distinct records written so far.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    /// Save a bill once all of its data is collected.
    pub fn save_bill(&mut self, mut bill: Bill) -> Result<PathBuf> {
        tracing::info!("save_bill {}", bill.describe());
        if let Some(categorizer) = self.categorizer {
            bill.categorize_actions(categorizer);
        }
        self.save(&bill)
    }

    pub fn save_legislator(&mut self, legislator: &Legislator) -> Result<PathBuf> {
        tracing::info!("save_legislator: {}", legislator.full_name);
        let path = self.save(legislator)?;
        self.roster.learn(legislator, &legislator.filename())?;
        Ok(path)
    }

    /// Save someone who is not a legislator, e.g. a governor.
    pub fn save_person(&mut self, person: &Person) -> Result<PathBuf> {
        tracing::info!("save_person: {}", person.full_name);
        self.save(person)
    }

    pub fn save_committee(&mut self, committee: &Committee) -> Result<PathBuf> {
        tracing::info!("save_committee: {}", committee.describe());
        self.save(committee)
    }

    pub fn save_vote(&mut self, vote: &Vote) -> Result<PathBuf> {
        tracing::info!("save_vote: {}", vote.describe());
        self.save(vote)
    }

    pub fn save_event(&mut self, event: &Event) -> Result<PathBuf> {
        tracing::info!("save_event: {}", event.describe());
        self.save(event)
    }

    /// Write a record, then validate it so invalid output stays on disk.
    fn save<R: Record + Validate>(&mut self, record: &R) -> Result<PathBuf> {
        let path = self.writer.write(self.scraper_type, record)?;
        self.validator.check(&record.filename(), record)?;
        self.saved.insert(path.clone());
        Ok(path)
    }
}
