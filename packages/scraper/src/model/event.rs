//! Calendar events: hearings, floor sessions, committee meetings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{sanitize_filename, short_hash, Chamber, Extra, Record, Source};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub session: String,
    #[serde(with = "super::date")]
    pub when: DateTime<Utc>,
    #[serde(with = "super::date::option", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// e.g. `committee:meeting`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub related_bills: Vec<RelatedBill>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A committee or legislator taking part in an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// e.g. `host`, `chair`, `participant`.
    #[serde(rename = "type")]
    pub participant_type: String,
    pub participant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamber: Option<Chamber>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A bill on the event's agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedBill {
    pub bill_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default = "default_related_type")]
    pub relation_type: String,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_related_type() -> String {
    "consideration".to_string()
}

impl Event {
    pub fn new(
        session: impl Into<String>,
        when: DateTime<Utc>,
        event_type: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            session: session.into(),
            when,
            end: None,
            event_type: event_type.into(),
            description: description.into(),
            location: location.into(),
            participants: Vec::new(),
            related_bills: Vec::new(),
            sources: Vec::new(),
            extra: Extra::new(),
        }
    }

    pub fn add_participant(
        &mut self,
        participant_type: impl Into<String>,
        participant: impl Into<String>,
        chamber: Option<Chamber>,
    ) {
        self.participants.push(Participant {
            participant_type: participant_type.into(),
            participant: participant.into(),
            chamber,
            extra: Extra::new(),
        });
    }

    pub fn add_related_bill(&mut self, bill_id: impl Into<String>, description: impl Into<String>) {
        self.related_bills.push(RelatedBill {
            bill_id: bill_id.into(),
            description: description.into(),
            relation_type: default_related_type(),
            extra: Extra::new(),
        });
    }
}

impl Record for Event {
    const KIND: &'static str = "event";

    fn sources(&self) -> &[Source] {
        &self.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Source> {
        &mut self.sources
    }

    fn filename(&self) -> String {
        sanitize_filename(&format!(
            "{}_{}_{}.json",
            self.session,
            self.when.format("%Y%m%d%H%M"),
            short_hash(&self.description)
        ))
    }

    /// The chamber of the first participant that has one.
    fn chamber(&self) -> Option<Chamber> {
        self.participants.iter().find_map(|p| p.chamber)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.when.format("%Y-%m-%d %H:%M"), self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hearing() -> Event {
        let when = Utc.with_ymd_and_hms(2011, 2, 14, 10, 30, 0).unwrap();
        Event::new("2011", when, "committee:meeting", "Finance hearing", "Room 643")
    }

    #[test]
    fn test_filename_is_stable() {
        let event = hearing();
        let name = event.filename();
        assert!(name.starts_with("2011_201102141030_"), "{name}");
        assert_eq!(name, hearing().filename());
    }

    #[test]
    fn test_chamber_from_participants() {
        let mut event = hearing();
        assert_eq!(event.chamber(), None);
        event.add_participant("host", "Finance", Some(Chamber::Upper));
        event.add_related_bill("SB 12", "Budget");
        assert_eq!(event.chamber(), Some(Chamber::Upper));
        assert_eq!(event.related_bills[0].relation_type, "consideration");
    }
}
