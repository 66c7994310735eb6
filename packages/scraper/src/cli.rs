//! Command-line interface for billy.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;
use crate::metadata::Metadata;
use crate::model::Chamber;
use crate::registry::ScraperRegistry;
use crate::runner::{self, RunOptions, DEFAULT_ACTION_RULES};
use crate::scrape::ScraperType;

/// Billy - scrape legislative data into per-record JSON files.
#[derive(Parser)]
#[command(name = "billy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Be verbose (repeat for more detail). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scrapers of a jurisdiction.
    Scrape(ScrapeArgs),

    /// Categorize action texts and print one JSON result per line.
    Categorize {
        /// Built-in rule set (default, ny, wa) or YAML rule file
        #[arg(long, default_value = DEFAULT_ACTION_RULES)]
        rules: String,

        /// Action texts (read from stdin, one per line, when omitted)
        text: Vec<String>,
    },

    /// Re-validate records written by an earlier scrape.
    Check {
        /// Jurisdiction metadata file (JSON or YAML)
        metadata: PathBuf,

        /// Output directory (default: data/<abbreviation>)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Fail on the first record with issues
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Args)]
pub struct ScrapeArgs {
    /// Jurisdiction metadata file (JSON or YAML)
    pub metadata: PathBuf,

    /// Scrape bill data
    #[arg(long)]
    pub bills: bool,

    /// Scrape legislator data
    #[arg(long)]
    pub legislators: bool,

    /// Scrape committee data
    #[arg(long)]
    pub committees: bool,

    /// Scrape vote data
    #[arg(long)]
    pub votes: bool,

    /// Scrape event data
    #[arg(long)]
    pub events: bool,

    /// Scrape all available types of data
    #[arg(long)]
    pub alldata: bool,

    /// Session(s) to scrape
    #[arg(short = 's', long = "session")]
    pub sessions: Vec<String>,

    /// Term(s) to scrape
    #[arg(short = 't', long = "term")]
    pub terms: Vec<String>,

    /// Scrape the upper chamber
    #[arg(long)]
    pub upper: bool,

    /// Scrape the lower chamber
    #[arg(long)]
    pub lower: bool,

    /// Fail immediately on a validation issue
    #[arg(long)]
    pub strict: bool,

    /// Output directory (default: data/<abbreviation>)
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Don't use the web page cache
    #[arg(short = 'n', long)]
    pub no_cache: bool,

    /// Requests per minute, 0 for no limit
    #[arg(short = 'r', long)]
    pub rpm: Option<u32>,

    /// Retry attempts for failed requests
    #[arg(long)]
    pub retries: Option<u32>,

    /// Seconds to wait before the first retry
    #[arg(long)]
    pub retry_wait: Option<u64>,

    /// Built-in rule set or YAML rule file for action categorization
    #[arg(long)]
    pub rules: Option<String>,
}

impl ScrapeArgs {
    fn run_options(&self) -> RunOptions {
        let selected = [
            (self.bills, ScraperType::Bills),
            (self.legislators, ScraperType::Legislators),
            (self.committees, ScraperType::Committees),
            (self.votes, ScraperType::Votes),
            (self.events, ScraperType::Events),
        ];
        let mut chambers = Vec::new();
        if self.upper {
            chambers.push(Chamber::Upper);
        }
        if self.lower {
            chambers.push(Chamber::Lower);
        }

        RunOptions {
            types: selected.into_iter().filter(|(on, _)| *on).map(|(_, t)| t).collect(),
            alldata: self.alldata,
            sessions: self.sessions.clone(),
            terms: self.terms.clone(),
            chambers,
            strict: self.strict,
            output_dir: self.output_dir.clone(),
            action_rules: self.rules.clone(),
        }
    }

    /// Environment settings with command-line overrides.
    fn settings(&self) -> Settings {
        let mut settings = Settings::from_env();
        if self.no_cache {
            settings = settings.without_cache();
        }
        if let Some(rpm) = self.rpm {
            settings = settings.with_requests_per_minute(rpm);
        }
        if self.retries.is_some() || self.retry_wait.is_some() {
            let attempts = self.retries.unwrap_or(settings.retry_attempts);
            let wait = self.retry_wait.map_or(settings.retry_wait, Duration::from_secs);
            settings = settings.with_retries(attempts, wait);
        }
        settings
    }
}

/// Default log filter for a `-v` count.
#[must_use]
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scrape(args) => scrape_command(&args),
        Commands::Categorize { rules, text } => categorize_command(&rules, text),
        Commands::Check {
            metadata,
            output_dir,
            strict,
        } => check_command(&metadata, output_dir.as_deref(), strict),
    }
}

fn scrape_command(args: &ScrapeArgs) -> Result<()> {
    let metadata = Metadata::load(&args.metadata)?;
    let settings = args.settings();
    let options = args.run_options();

    let mut registry = ScraperRegistry::new();
    registry.register_feeds(&metadata);

    println!(
        "{} {}",
        style("Scraping").bold(),
        style(&metadata.name).cyan()
    );

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = runner::run_with_progress(&registry, &metadata, &settings, &options, |p| {
        pb.set_message(format!("{} {} {}", p.scraper_type, p.chamber, p.period));
    });
    pb.finish_and_clear();
    let summary = result?;

    for problem in &summary.metadata_problems {
        println!("  {} {problem}", style("Metadata warning:").yellow().bold());
    }
    for run in &summary.runs {
        println!(
            "  {}: {} records ({})",
            style(run.scraper_type).green(),
            run.saved,
            run.periods.join(", ")
        );
    }
    for skipped in &summary.skipped {
        println!("  {}: no scraper, skipped", style(skipped).dim());
    }
    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        summary.output_dir.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct CategorizedLine<'a> {
    text: &'a str,
    #[serde(flatten)]
    result: billy_categorizer::Categorization,
}

fn categorize_command(rules: &str, texts: Vec<String>) -> Result<()> {
    let categorizer = billy_categorizer::resolve(rules)?;

    let texts = if texts.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?
    } else {
        texts
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for text in texts.iter().filter(|t| !t.trim().is_empty()) {
        let line = CategorizedLine {
            text,
            result: categorizer.categorize(text),
        };
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }
    Ok(())
}

fn check_command(metadata_path: &Path, output_dir: Option<&Path>, strict: bool) -> Result<()> {
    let metadata = Metadata::load(metadata_path)?;
    let output_dir = output_dir.map_or_else(
        || Settings::from_env().output_dir(&metadata.abbreviation),
        Path::to_path_buf,
    );

    let summary = runner::check(&metadata, &output_dir, strict)?;

    for (path, issues) in &summary.problems {
        println!("{}", style(path.display()).yellow());
        for issue in issues {
            println!("  - {issue}");
        }
    }
    println!(
        "{} {} records, {} with issues",
        style("Checked").bold(),
        summary.checked,
        summary.problems.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_scrape() {
        let cli = Cli::parse_from([
            "billy", "-vv", "scrape", "nc.yaml", "--bills", "--votes", "-s", "2011", "-s", "2012E1",
            "--upper", "-n", "--rpm", "0",
        ]);
        assert_eq!(cli.verbose, 2);

        let Commands::Scrape(args) = cli.command else {
            panic!("expected scrape");
        };
        let options = args.run_options();
        assert_eq!(options.types, vec![ScraperType::Bills, ScraperType::Votes]);
        assert_eq!(options.sessions, vec!["2011", "2012E1"]);
        assert_eq!(options.chambers, vec![Chamber::Upper]);
        assert!(!options.alldata);

        let settings = args.settings();
        assert!(settings.cache_dir.is_none());
        assert!(settings.requests_per_minute.is_none());
    }

    #[test]
    fn test_cli_parse_retries() {
        let cli = Cli::parse_from(["billy", "scrape", "nc.yaml", "--alldata", "--retries", "5", "--retry-wait", "1"]);
        let Commands::Scrape(args) = cli.command else {
            panic!("expected scrape");
        };
        let settings = args.settings();
        assert_eq!(settings.retry_attempts, 5);
        assert_eq!(settings.retry_wait, Duration::from_secs(1));
        assert!(args.run_options().alldata);
    }

    #[test]
    fn test_cli_parse_categorize() {
        let cli = Cli::parse_from(["billy", "categorize", "--rules", "ny", "REFERRED TO CODES"]);
        let Commands::Categorize { rules, text } = cli.command else {
            panic!("expected categorize");
        };
        assert_eq!(rules, "ny");
        assert_eq!(text, vec!["REFERRED TO CODES"]);
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "warn");
        assert_eq!(default_filter(1), "info");
        assert_eq!(default_filter(3), "debug");
    }
}
