//! Roll-call votes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{sanitize_filename, short_hash, Chamber, Extra, Record, Source};

/// A vote on a motion, standalone or attached to a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub chamber: Chamber,
    #[serde(with = "super::date")]
    pub date: DateTime<Utc>,
    pub motion: String,
    pub passed: bool,
    pub yes_count: u32,
    pub no_count: u32,
    pub other_count: u32,
    #[serde(default)]
    pub yes_votes: Vec<String>,
    #[serde(default)]
    pub no_votes: Vec<String>,
    #[serde(default)]
    pub other_votes: Vec<String>,
    /// e.g. `passage`, `amendment`, `other`.
    #[serde(rename = "type", default = "default_vote_type")]
    pub vote_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_chamber: Option<Chamber>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_vote_type() -> String {
    "other".to_string()
}

impl Vote {
    /// Create a vote with the given tallies and no recorded voters.
    pub fn new(
        chamber: Chamber,
        date: DateTime<Utc>,
        motion: impl Into<String>,
        passed: bool,
        yes_count: u32,
        no_count: u32,
        other_count: u32,
    ) -> Self {
        Self {
            chamber,
            date,
            motion: motion.into(),
            passed,
            yes_count,
            no_count,
            other_count,
            yes_votes: Vec::new(),
            no_votes: Vec::new(),
            other_votes: Vec::new(),
            vote_type: default_vote_type(),
            session: None,
            bill_id: None,
            bill_chamber: None,
            sources: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Link a standalone vote to a bill.
    #[must_use]
    pub fn for_bill(
        mut self,
        session: impl Into<String>,
        bill_chamber: Chamber,
        bill_id: impl Into<String>,
    ) -> Self {
        self.session = Some(session.into());
        self.bill_chamber = Some(bill_chamber);
        self.bill_id = Some(bill_id.into());
        self
    }

    /// Record a legislator voting yes.
    pub fn yes(&mut self, legislator: impl Into<String>) {
        self.yes_votes.push(legislator.into());
    }

    /// Record a legislator voting no.
    pub fn no(&mut self, legislator: impl Into<String>) {
        self.no_votes.push(legislator.into());
    }

    /// Record a legislator who abstained, was absent or excused.
    pub fn other(&mut self, legislator: impl Into<String>) {
        self.other_votes.push(legislator.into());
    }

    /// Compare recorded voters against the tallies.
    ///
    /// Listed voters may never exceed a tally. Once every list has names the
    /// lists are treated as complete and must equal the tallies.
    #[must_use]
    pub fn check_counts(&self) -> Vec<String> {
        let lists = [
            ("yes", &self.yes_votes, self.yes_count),
            ("no", &self.no_votes, self.no_count),
            ("other", &self.other_votes, self.other_count),
        ];
        let complete = lists.iter().all(|(_, voters, _)| !voters.is_empty());

        lists
            .iter()
            .filter_map(|(label, voters, count)| {
                let listed = voters.len();
                let count = *count as usize;
                if listed > count || (complete && listed != count) {
                    Some(format!("{label}_count is {count} but {listed} {label} votes listed"))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Record for Vote {
    const KIND: &'static str = "vote";

    fn sources(&self) -> &[Source] {
        &self.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Source> {
        &mut self.sources
    }

    /// Repeated roll calls on one motion and day differ in the hashed
    /// outcome, so each gets its own file.
    fn filename(&self) -> String {
        let session = self.session.as_deref().unwrap_or("nosession");
        let bill = self.bill_id.as_deref().unwrap_or("nobill");
        let outcome = format!(
            "{}|{}|{}|{}|{}|{}",
            self.motion,
            self.date.timestamp(),
            self.passed,
            self.yes_count,
            self.no_count,
            self.other_count
        );
        sanitize_filename(&format!(
            "{session}_{}_{bill}_{}_{}.json",
            self.chamber,
            self.date.format("%Y%m%d"),
            short_hash(&outcome)
        ))
    }

    fn chamber(&self) -> Option<Chamber> {
        Some(self.chamber)
    }

    fn describe(&self) -> String {
        format!("{} {}: {}", self.chamber, self.date.format("%Y-%m-%d"), self.motion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn vote(yes: u32, no: u32, other: u32) -> Vote {
        let date = Utc.with_ymd_and_hms(2011, 3, 1, 0, 0, 0).unwrap();
        Vote::new(Chamber::Upper, date, "Third reading", true, yes, no, other)
    }

    #[test]
    fn test_counts_consistent_when_lists_empty() {
        assert!(vote(30, 10, 2).check_counts().is_empty());
    }

    #[test]
    fn test_partial_lists_may_be_short() {
        let mut v = vote(2, 1, 0);
        v.yes("Smith");
        assert!(v.check_counts().is_empty());
    }

    #[test]
    fn test_listed_voters_exceeding_count() {
        let mut v = vote(1, 0, 0);
        v.yes("Smith");
        v.yes("Jones");
        assert_eq!(v.check_counts(), vec!["yes_count is 1 but 2 yes votes listed"]);
    }

    #[test]
    fn test_complete_lists_must_match() {
        let mut v = vote(2, 1, 1);
        v.yes("Smith");
        v.no("Jones");
        v.other("Lee");
        assert_eq!(v.check_counts(), vec!["yes_count is 2 but 1 yes votes listed"]);
    }

    #[test]
    fn test_filename_and_bill_link() {
        let v = vote(1, 0, 0).for_bill("2011", Chamber::Lower, "HB 1");
        let name = v.filename();
        assert!(name.starts_with("2011_upper_HB 1_20110301_"), "{name}");
        assert!(name.ends_with(".json"));
        assert_eq!(v.bill_chamber, Some(Chamber::Lower));
    }

    #[test]
    fn test_repeated_roll_calls_get_distinct_files() {
        let date = Utc.with_ymd_and_hms(2011, 3, 1, 0, 0, 0).unwrap();
        let first = Vote::new(Chamber::Upper, date, "Adopt amendment", true, 30, 10, 0)
            .for_bill("2011", Chamber::Upper, "S 1");
        let second = Vote::new(Chamber::Upper, date, "Adopt amendment", false, 12, 28, 0)
            .for_bill("2011", Chamber::Upper, "S 1");

        assert!(first.filename().starts_with("2011_upper_S 1_20110301_"));
        assert_ne!(first.filename(), second.filename());
        assert_eq!(first.filename(), first.clone().filename());
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_value(vote(1, 0, 0)).unwrap();
        assert!(json.get("bill_id").is_none());
        assert_eq!(json["type"], "other");
        assert_eq!(json["date"], 1_298_937_600);
    }
}
