//! Scraper registry keyed by jurisdiction and scraper type.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, ScrapeError};
use crate::feed::FeedScraper;
use crate::metadata::Metadata;
use crate::scrape::{Scraper, ScraperType};

/// Registry of scrapers.
///
/// Each jurisdiction has at most one scraper per [`ScraperType`];
/// registering another one replaces it.
pub struct ScraperRegistry {
    scrapers: HashMap<(String, ScraperType), Box<dyn Scraper>>,
}

impl ScraperRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scrapers: HashMap::new(),
        }
    }

    /// Register a scraper for a jurisdiction under its own type.
    pub fn register(&mut self, jurisdiction: impl Into<String>, scraper: impl Scraper + 'static) {
        let jurisdiction = jurisdiction.into();
        let scraper_type = scraper.scraper_type();
        tracing::debug!(jurisdiction = %jurisdiction, scraper_type = %scraper_type, "Registered scraper");
        self.scrapers
            .insert((jurisdiction, scraper_type), Box::new(scraper));
    }

    /// Get the scraper for a jurisdiction and type.
    pub fn get(&self, jurisdiction: &str, scraper_type: ScraperType) -> Result<&dyn Scraper> {
        self.scrapers
            .get(&(jurisdiction.to_string(), scraper_type))
            .map(|s| s.as_ref())
            .ok_or_else(|| ScrapeError::UnknownScraper {
                jurisdiction: jurisdiction.to_string(),
                scraper_type: scraper_type.to_string(),
            })
    }

    #[must_use]
    pub fn has_scraper(&self, jurisdiction: &str, scraper_type: ScraperType) -> bool {
        self.scrapers
            .contains_key(&(jurisdiction.to_string(), scraper_type))
    }

    /// Types registered for a jurisdiction.
    #[must_use]
    pub fn registered_types(&self, jurisdiction: &str) -> BTreeSet<ScraperType> {
        self.scrapers
            .keys()
            .filter(|(j, _)| j == jurisdiction)
            .map(|(_, t)| *t)
            .collect()
    }

    /// Register a [`FeedScraper`] for every feed in the metadata.
    ///
    /// Scrapers already registered for a type take precedence over its feed.
    /// Returns the number of feed scrapers added.
    pub fn register_feeds(&mut self, metadata: &Metadata) -> usize {
        let mut added = 0;
        for (scraper_type, feed) in &metadata.feeds {
            if self.has_scraper(&metadata.abbreviation, *scraper_type) {
                tracing::debug!(scraper_type = %scraper_type, "Feed ignored, scraper already registered");
                continue;
            }
            self.register(
                metadata.abbreviation.clone(),
                FeedScraper::new(*scraper_type, feed.url.clone()),
            );
            added += 1;
        }
        added
    }
}

impl Default for ScraperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Chamber;
    use crate::scrape::ScrapeContext;

    struct DummyScraper(ScraperType);

    impl Scraper for DummyScraper {
        fn scraper_type(&self) -> ScraperType {
            self.0
        }

        fn scrape(&self, _chamber: Chamber, _period: &str, _ctx: &mut ScrapeContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ScraperRegistry::new();
        registry.register("nc", DummyScraper(ScraperType::Bills));

        assert!(registry.has_scraper("nc", ScraperType::Bills));
        assert!(!registry.has_scraper("nc", ScraperType::Votes));
        assert!(!registry.has_scraper("sc", ScraperType::Bills));
        assert_eq!(
            registry.get("nc", ScraperType::Bills).unwrap().scraper_type(),
            ScraperType::Bills
        );
    }

    #[test]
    fn test_get_unknown() {
        let registry = ScraperRegistry::default();
        let err = registry.get("nc", ScraperType::Votes).err().unwrap();
        assert_eq!(err.to_string(), "No votes scraper found for nc");
    }

    #[test]
    fn test_registered_types() {
        let mut registry = ScraperRegistry::new();
        registry.register("nc", DummyScraper(ScraperType::Bills));
        registry.register("nc", DummyScraper(ScraperType::Committees));
        registry.register("sc", DummyScraper(ScraperType::Votes));
        let types: Vec<_> = registry.registered_types("nc").into_iter().collect();
        assert_eq!(types, vec![ScraperType::Bills, ScraperType::Committees]);
    }

    #[test]
    fn test_register_feeds_keeps_existing() {
        let metadata = Metadata::from_yaml(
            r#"
name: North Carolina
abbreviation: nc
terms: [{name: "2011", start_year: 2011, end_year: 2012, sessions: ["2011"]}]
feeds:
  bills: {url: "http://example.com/bills.json"}
  votes: {url: "http://example.com/votes.json"}
"#,
        )
        .unwrap();
        let mut registry = ScraperRegistry::new();
        registry.register("nc", DummyScraper(ScraperType::Bills));

        assert_eq!(registry.register_feeds(&metadata), 1);
        assert!(registry.has_scraper("nc", ScraperType::Votes));
    }
}
