//! Billy scraper core - collect legislative data into per-record JSON.
//!
//! Scrapers for a jurisdiction fetch pages through a shared [`http::Fetcher`]
//! (cache, rate limit, retries), build records from [`model`] and save them
//! through a [`scrape::ScrapeContext`], which writes one JSON file per record
//! and validates it against the jurisdiction [`metadata::Metadata`].
//!
//! # Example
//!
//! ```
//! use billy_scraper::model::{Bill, Chamber, Record};
//!
//! let mut bill = Bill::new("2011", Chamber::Lower, "HB 1", "An Act to reform taxes");
//! bill.add_source("http://www.ncleg.net/HB1");
//! bill.add_sponsor("primary", "Stam");
//!
//! assert_eq!(bill.filename(), "2011_lower_HB 1.json");
//! ```
//!
//! # Architecture
//!
//! - [`model`]: bills, people, committees, votes and events
//! - [`metadata`]: terms, sessions and chambers of a jurisdiction
//! - [`scrape`]: the [`scrape::Scraper`] trait and its context
//! - [`registry`]: scrapers keyed by jurisdiction and type
//! - [`feed`]: generic scraper for JSON feeds
//! - [`runner`]: period resolution and run sequencing
//! - [`names`]: matching name variants to legislators; the context keeps a
//!   [`names::Roster`] of saved legislators for vote rolls and sponsor lists

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod metadata;
pub mod model;
pub mod names;
pub mod registry;
pub mod runner;
pub mod scrape;
pub mod validate;
pub mod writer;

pub use error::{Result, ScrapeError};
pub use metadata::Metadata;
pub use registry::ScraperRegistry;
pub use runner::{resolve_periods, run, RunOptions, RunSummary};
pub use scrape::{ScrapeContext, Scraper, ScraperType};
