//! Run driver: resolves periods and chambers, then sequences the scrapers.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use billy_categorizer::Categorizer;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use crate::http::Fetcher;
use crate::metadata::Metadata;
use crate::model::{Bill, Chamber, Committee, Event, Person, Vote};
use crate::names::Roster;
use crate::registry::ScraperRegistry;
use crate::scrape::{PeriodKind, ScrapeContext, ScraperType};
use crate::validate::{Validate, Validator};
use crate::writer::RecordWriter;

/// Rule set used when neither the options nor the metadata name one.
pub const DEFAULT_ACTION_RULES: &str = "default";

/// What to scrape.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicitly selected types.
    pub types: Vec<ScraperType>,
    /// Add bills, legislators, committees and votes, skipping those without
    /// a registered scraper.
    pub alldata: bool,
    pub sessions: Vec<String>,
    pub terms: Vec<String>,
    /// Empty means upper then lower.
    pub chambers: Vec<Chamber>,
    pub strict: bool,
    /// Defaults to `<data dir>/<abbreviation>`.
    pub output_dir: Option<PathBuf>,
    /// Rule set name or rule file for categorizing actions.
    pub action_rules: Option<String>,
}

impl RunOptions {
    /// Types to run, in run order, without duplicates.
    #[must_use]
    pub fn selected_types(&self) -> Vec<ScraperType> {
        ScraperType::ALL
            .into_iter()
            .filter(|t| self.types.contains(t) || (self.alldata && ScraperType::alldata().contains(t)))
            .collect()
    }

    #[must_use]
    pub fn selected_chambers(&self) -> Vec<Chamber> {
        if self.chambers.is_empty() {
            vec![Chamber::Upper, Chamber::Lower]
        } else {
            self.chambers.clone()
        }
    }
}

/// A scraper call about to be made.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub scraper_type: ScraperType,
    pub chamber: Chamber,
    pub period: &'a str,
}

/// What one scraper type did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRun {
    pub scraper_type: ScraperType,
    pub periods: Vec<String>,
    pub saved: usize,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    /// Metadata problems, reported as warnings.
    pub metadata_problems: Vec<String>,
    pub runs: Vec<TypeRun>,
    /// `--alldata` types without a registered scraper.
    pub skipped: Vec<ScraperType>,
}

impl RunSummary {
    #[must_use]
    pub fn total_saved(&self) -> usize {
        self.runs.iter().map(|r| r.saved).sum()
    }
}

/// Sessions or terms a scraper type runs for.
///
/// Session-based types use the given sessions, else every session of the
/// given terms, else the latest session. Term-based types use the given
/// terms, else the latest term. Every period is validated.
pub fn resolve_periods(
    metadata: &Metadata,
    scraper_type: ScraperType,
    sessions: &[String],
    terms: &[String],
) -> Result<Vec<String>> {
    let mut periods: Vec<String> = Vec::new();

    match scraper_type.period_kind() {
        PeriodKind::Session => {
            if !sessions.is_empty() {
                periods.extend(sessions.iter().cloned());
            } else if !terms.is_empty() {
                for term in terms {
                    metadata.validate_term(term, false)?;
                    periods.extend(metadata.sessions_for_term(term)?.iter().cloned());
                }
            } else {
                let latest = metadata
                    .latest_session()
                    .ok_or_else(|| ScrapeError::Metadata("no sessions defined".to_string()))?;
                tracing::info!(session = latest, "No session specified, using latest");
                periods.push(latest.to_string());
            }
            for session in &periods {
                metadata.validate_session(session)?;
            }
        }
        PeriodKind::Term => {
            if terms.is_empty() {
                let latest = metadata
                    .latest_term()
                    .ok_or_else(|| ScrapeError::Metadata("no terms defined".to_string()))?;
                tracing::info!(term = %latest.name, "No term specified, using latest");
                periods.push(latest.name.clone());
            } else {
                periods.extend(terms.iter().cloned());
            }
            for term in &periods {
                metadata.validate_term(term, false)?;
            }
        }
    }

    let mut seen = HashSet::new();
    periods.retain(|p| seen.insert(p.clone()));
    Ok(periods)
}

/// Run the selected scrapers.
pub fn run(
    registry: &ScraperRegistry,
    metadata: &Metadata,
    settings: &Settings,
    options: &RunOptions,
) -> Result<RunSummary> {
    run_with_progress(registry, metadata, settings, options, |_| {})
}

/// Run the selected scrapers, reporting each scraper call before it is made.
pub fn run_with_progress<F>(
    registry: &ScraperRegistry,
    metadata: &Metadata,
    settings: &Settings,
    options: &RunOptions,
    mut on_progress: F,
) -> Result<RunSummary>
where
    F: FnMut(Progress<'_>),
{
    let abbreviation = metadata.abbreviation.as_str();
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.output_dir(abbreviation));
    fs::create_dir_all(&output_dir)?;

    let metadata_problems = metadata.problems();
    for problem in &metadata_problems {
        tracing::warn!(jurisdiction = abbreviation, problem = %problem, "metadata validation error");
    }

    let writer = RecordWriter::new(&output_dir, metadata);
    writer.write_metadata(metadata)?;

    let types = options.selected_types();
    if types.is_empty() {
        return Err(ScrapeError::Run(
            "Must specify at least one of --bills, --legislators, --committees, --votes, --events, --alldata"
                .to_string(),
        ));
    }

    let rules = options
        .action_rules
        .as_deref()
        .or(metadata.action_rules.as_deref())
        .unwrap_or(DEFAULT_ACTION_RULES);
    let categorizer: Categorizer = billy_categorizer::resolve(rules)?;
    let fetcher = Fetcher::new(settings)?;
    let validator = Validator::new(metadata, options.strict);
    let chambers = options.selected_chambers();

    let mut summary = RunSummary {
        output_dir: output_dir.clone(),
        metadata_problems,
        ..RunSummary::default()
    };

    for scraper_type in types {
        writer.prepare(scraper_type)?;

        let scraper = match registry.get(abbreviation, scraper_type) {
            Ok(scraper) => scraper,
            Err(e) if options.alldata && !options.types.contains(&scraper_type) => {
                tracing::debug!(error = %e, "Skipping");
                summary.skipped.push(scraper_type);
                continue;
            }
            Err(e) => return Err(e),
        };

        let periods = resolve_periods(metadata, scraper_type, &options.sessions, &options.terms)?;
        // Legislators written so far, so names in votes and bills resolve
        let roster = Roster::from_records(&writer.records(ScraperType::Legislators)?);
        let mut ctx = ScrapeContext::new(metadata, &fetcher, &writer, &validator, scraper_type)
            .with_categorizer(&categorizer)
            .with_roster(roster);

        for period in &periods {
            for &chamber in &chambers {
                on_progress(Progress {
                    scraper_type,
                    chamber,
                    period: period.as_str(),
                });
                tracing::info!(
                    jurisdiction = abbreviation,
                    scraper_type = %scraper_type,
                    chamber = %chamber,
                    period = %period,
                    "Scraping"
                );
                scraper.scrape(chamber, period, &mut ctx)?;
            }
        }

        tracing::info!(scraper_type = %scraper_type, saved = ctx.saved_count(), "Finished");
        summary.runs.push(TypeRun {
            scraper_type,
            periods,
            saved: ctx.saved_count(),
        });
    }

    Ok(summary)
}

/// Outcome of re-validating written records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    /// Files with issues, and the issues.
    pub problems: Vec<(PathBuf, Vec<String>)>,
}

impl CheckSummary {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Re-validate every record written under `output_dir`.
///
/// In strict mode the first record with issues is an error.
pub fn check(metadata: &Metadata, output_dir: &Path, strict: bool) -> Result<CheckSummary> {
    let writer = RecordWriter::new(output_dir, metadata);
    let validator = Validator::new(metadata, strict);
    let mut summary = CheckSummary::default();

    for scraper_type in ScraperType::ALL {
        for path in writer.records(scraper_type)? {
            let issues = match scraper_type {
                ScraperType::Bills => check_file::<Bill>(&validator, &path)?,
                ScraperType::Legislators => check_file::<Person>(&validator, &path)?,
                ScraperType::Committees => check_file::<Committee>(&validator, &path)?,
                ScraperType::Votes => check_file::<Vote>(&validator, &path)?,
                ScraperType::Events => check_file::<Event>(&validator, &path)?,
            };
            summary.checked += 1;
            if !issues.is_empty() {
                summary.problems.push((path, issues));
            }
        }
    }

    tracing::info!(checked = summary.checked, with_issues = summary.problems.len(), "Checked records");
    Ok(summary)
}

fn check_file<R: Validate + DeserializeOwned>(validator: &Validator, path: &Path) -> Result<Vec<String>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let record: R = match serde_json::from_slice(&fs::read(path)?) {
        Ok(record) => record,
        Err(e) if validator.is_strict() => return Err(e.into()),
        Err(e) => return Ok(vec![format!("unreadable record: {e}")]),
    };
    validator.check(&name, &record)
}
