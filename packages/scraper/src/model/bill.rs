//! Bills and the actions, sponsors and documents attached to them.

use billy_categorizer::{ActionType, AttrValue, Categorizer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{sanitize_filename, Chamber, Extra, Record, Source, Vote};

/// A piece of legislation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Session in which the bill was introduced.
    pub session: String,
    /// Chamber of introduction.
    pub chamber: Chamber,
    /// Identifier assigned by the legislature, e.g. `HB 1`.
    pub bill_id: String,
    pub title: String,
    #[serde(rename = "type", default = "default_bill_type")]
    pub bill_type: Vec<String>,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub versions: Vec<Document>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub alternate_titles: Vec<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_bill_type() -> Vec<String> {
    vec!["bill".to_string()]
}

/// A sponsorship, e.g. `primary` or `cosponsor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    #[serde(rename = "type")]
    pub sponsor_type: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A version of the bill text or a related document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Something that happened to a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// `upper`/`lower`, a committee, a legislator or e.g. `governor`.
    pub actor: String,
    pub action: String,
    #[serde(with = "super::date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "type", default = "default_action_type")]
    pub action_type: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_action_type() -> Vec<String> {
    vec![ActionType::Other.as_str().to_string()]
}

impl Action {
    /// Whether the action still needs categorizing.
    #[must_use]
    pub fn is_uncategorized(&self) -> bool {
        self.action_type.is_empty()
            || self.action_type.iter().all(|t| t == ActionType::Other.as_str())
    }
}

impl Bill {
    /// Create a bill of type `bill`.
    pub fn new(
        session: impl Into<String>,
        chamber: Chamber,
        bill_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            session: session.into(),
            chamber,
            bill_id: bill_id.into(),
            title: title.into(),
            bill_type: default_bill_type(),
            sponsors: Vec::new(),
            votes: Vec::new(),
            versions: Vec::new(),
            actions: Vec::new(),
            documents: Vec::new(),
            alternate_titles: Vec::new(),
            sources: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Set the bill types, e.g. `["resolution"]`. Empty keeps `["bill"]`.
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<String> = types.into_iter().map(Into::into).collect();
        if !types.is_empty() {
            self.bill_type = types;
        }
        self
    }

    pub fn add_sponsor(&mut self, sponsor_type: impl Into<String>, name: impl Into<String>) {
        self.sponsors.push(Sponsor {
            sponsor_type: sponsor_type.into(),
            name: name.into(),
            extra: Extra::new(),
        });
    }

    /// Add a related document such as a fiscal note.
    pub fn add_document(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.documents.push(Document {
            name: name.into(),
            url: url.into(),
            extra: Extra::new(),
        });
    }

    /// Add a version of the bill text.
    pub fn add_version(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.versions.push(Document {
            name: name.into(),
            url: url.into(),
            extra: Extra::new(),
        });
    }

    /// Add an action. With no types the action is typed `other`.
    pub fn add_action<I, S>(
        &mut self,
        actor: impl Into<String>,
        action: impl Into<String>,
        date: DateTime<Utc>,
        types: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut action_type: Vec<String> = types.into_iter().map(Into::into).collect();
        if action_type.is_empty() {
            action_type = default_action_type();
        }
        self.actions.push(Action {
            actor: actor.into(),
            action: action.into(),
            date,
            action_type,
            extra: Extra::new(),
        });
    }

    pub fn add_vote(&mut self, vote: Vote) {
        self.votes.push(vote);
    }

    /// Add an alternate title.
    pub fn add_title(&mut self, title: impl Into<String>) {
        self.alternate_titles.push(title.into());
    }

    /// Categorize every action still typed `other`.
    ///
    /// Types are replaced by the categorizer's result, and captured
    /// attributes (committees, legislators, ...) are stored on the action
    /// unless the scraper already set them. A single categorized `actor`
    /// replaces the scraped one. Returns the number of actions that received
    /// a type other than `other`.
    pub fn categorize_actions(&mut self, categorizer: &Categorizer) -> usize {
        let mut categorized = 0;

        for action in self.actions.iter_mut().filter(|a| a.is_uncategorized()) {
            let result = categorizer.categorize(&action.action);
            if !result.types.is_empty() {
                categorized += 1;
            }
            action.action_type = result
                .types_or_other()
                .into_iter()
                .map(|t| t.as_str().to_string())
                .collect();
            for (key, value) in result.attrs {
                if key == "actor" {
                    match value {
                        AttrValue::One(actor) => action.actor = actor,
                        AttrValue::Many(actors) => {
                            tracing::debug!(action = %action.action, ?actors, "Ambiguous actor, keeping scraped one");
                        }
                    }
                    continue;
                }
                if action.extra.contains_key(&key) {
                    continue;
                }
                match serde_json::to_value(&value) {
                    Ok(value) => {
                        action.extra.insert(key, value);
                    }
                    Err(e) => tracing::warn!(attr = %key, error = %e, "Could not store attribute"),
                }
            }
        }

        tracing::debug!(bill_id = %self.bill_id, categorized, "Categorized actions");
        categorized
    }
}

impl Record for Bill {
    const KIND: &'static str = "bill";

    fn sources(&self) -> &[Source] {
        &self.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Source> {
        &mut self.sources
    }

    fn filename(&self) -> String {
        sanitize_filename(&format!(
            "{}_{}_{}.json",
            self.session, self.chamber, self.bill_id
        ))
    }

    fn chamber(&self) -> Option<Chamber> {
        Some(self.chamber)
    }

    fn describe(&self) -> String {
        format!("{} {}: {}", self.chamber, self.session, self.bill_id)
    }
}
