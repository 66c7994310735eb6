//! Record validation against jurisdiction metadata.
//!
//! Non-strict runs log issues as warnings and keep going; strict runs stop at
//! the first record with issues.

use std::collections::BTreeSet;
use std::str::FromStr;

use billy_categorizer::ActionType;

use crate::error::{Result, ScrapeError};
use crate::metadata::Metadata;
use crate::model::{Bill, Chamber, Committee, Event, Legislator, Person, Record, Source, Vote};

/// Checks records against the sessions, terms and chambers of a jurisdiction.
#[derive(Debug, Clone)]
pub struct Validator {
    sessions: BTreeSet<String>,
    terms: BTreeSet<String>,
    chambers: BTreeSet<String>,
    strict: bool,
}

impl Validator {
    #[must_use]
    pub fn new(metadata: &Metadata, strict: bool) -> Self {
        Self {
            sessions: metadata.all_sessions().into_iter().map(str::to_string).collect(),
            terms: metadata.terms.iter().map(|t| t.name.clone()).collect(),
            chambers: metadata.chambers.keys().cloned().collect(),
            strict,
        }
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate a record, returning its issues.
    ///
    /// In strict mode any issue is an error.
    pub fn check<R: Validate + ?Sized>(&self, name: &str, record: &R) -> Result<Vec<String>> {
        let issues = record.issues(self);
        if issues.is_empty() {
            return Ok(issues);
        }

        for issue in &issues {
            tracing::warn!(record = name, issue = %issue, "Validation issue");
        }
        if self.strict {
            return Err(ScrapeError::Validation {
                record: name.to_string(),
                issues,
            });
        }
        Ok(issues)
    }

    fn check_session(&self, session: &str, issues: &mut Vec<String>) {
        if session.trim().is_empty() {
            issues.push("session is empty".to_string());
        } else if !self.sessions.contains(session) {
            issues.push(format!("unknown session '{session}'"));
        }
    }

    fn check_term(&self, term: &str, issues: &mut Vec<String>) {
        if !self.terms.contains(term) {
            issues.push(format!("unknown term '{term}'"));
        }
    }

    /// Joint is always accepted; otherwise the chamber must be declared,
    /// unless the metadata declares none at all.
    fn check_chamber(&self, chamber: Chamber, issues: &mut Vec<String>) {
        if chamber == Chamber::Joint || self.chambers.is_empty() {
            return;
        }
        if !self.chambers.contains(chamber.as_str()) {
            issues.push(format!("chamber '{chamber}' is not part of this legislature"));
        }
    }
}

fn check_sources(sources: &[Source], issues: &mut Vec<String>) {
    if sources.is_empty() {
        issues.push("no sources".to_string());
    }
    if sources.iter().any(|s| s.url.trim().is_empty()) {
        issues.push("source with empty url".to_string());
    }
}

fn require(value: &str, field: &str, issues: &mut Vec<String>) {
    if value.trim().is_empty() {
        issues.push(format!("{field} is empty"));
    }
}

/// Records that can be checked by a [`Validator`].
pub trait Validate {
    fn issues(&self, validator: &Validator) -> Vec<String>;
}

impl Validate for Bill {
    fn issues(&self, validator: &Validator) -> Vec<String> {
        let mut issues = Vec::new();
        validator.check_session(&self.session, &mut issues);
        validator.check_chamber(self.chamber, &mut issues);
        require(&self.bill_id, "bill_id", &mut issues);
        require(&self.title, "title", &mut issues);
        if self.bill_type.is_empty() {
            issues.push("type is empty".to_string());
        }
        check_sources(self.sources(), &mut issues);

        for (i, action) in self.actions.iter().enumerate() {
            if action.action.trim().is_empty() {
                issues.push(format!("action {i} has no text"));
            }
            if action.actor.trim().is_empty() {
                issues.push(format!("action {i} has no actor"));
            }
            for action_type in &action.action_type {
                if ActionType::from_str(action_type).is_err() {
                    issues.push(format!("action {i} has unknown type '{action_type}'"));
                }
            }
        }
        for sponsor in &self.sponsors {
            require(&sponsor.name, "sponsor name", &mut issues);
        }
        for vote in &self.votes {
            issues.extend(
                vote.check_counts()
                    .into_iter()
                    .map(|issue| format!("vote '{}': {issue}", vote.motion)),
            );
        }
        issues
    }
}

impl Validate for Vote {
    fn issues(&self, validator: &Validator) -> Vec<String> {
        let mut issues = Vec::new();
        require(&self.motion, "motion", &mut issues);
        validator.check_chamber(self.chamber, &mut issues);
        if let Some(session) = &self.session {
            validator.check_session(session, &mut issues);
        }
        issues.extend(self.check_counts());
        check_sources(self.sources(), &mut issues);
        issues
    }
}

impl Validate for Committee {
    fn issues(&self, validator: &Validator) -> Vec<String> {
        let mut issues = Vec::new();
        require(&self.committee, "committee", &mut issues);
        if self.subcommittee.as_deref().is_some_and(|s| s.trim().is_empty()) {
            issues.push("subcommittee is empty".to_string());
        }
        validator.check_chamber(self.chamber, &mut issues);
        for member in &self.members {
            require(&member.name, "member name", &mut issues);
        }
        check_sources(self.sources(), &mut issues);
        issues
    }
}

impl Validate for Person {
    fn issues(&self, validator: &Validator) -> Vec<String> {
        let mut issues = Vec::new();
        require(&self.full_name, "full_name", &mut issues);
        if self.roles.is_empty() {
            issues.push("no roles".to_string());
        }
        for role in &self.roles {
            validator.check_term(&role.term, &mut issues);
            if let Some(chamber) = role.chamber {
                validator.check_chamber(chamber, &mut issues);
            }
            if role.role == "member" {
                if role.chamber.is_none() {
                    issues.push("member role has no chamber".to_string());
                }
                if role.district.as_deref().is_none_or(|d| d.trim().is_empty()) {
                    issues.push("member role has no district".to_string());
                }
            }
            if let (Some(start), Some(end)) = (role.start_date, role.end_date) {
                if start > end {
                    issues.push(format!("role '{}' ends before it starts", role.role));
                }
            }
        }
        check_sources(self.sources(), &mut issues);
        issues
    }
}

impl Validate for Legislator {
    fn issues(&self, validator: &Validator) -> Vec<String> {
        (**self).issues(validator)
    }
}

impl Validate for Event {
    fn issues(&self, validator: &Validator) -> Vec<String> {
        let mut issues = Vec::new();
        validator.check_session(&self.session, &mut issues);
        require(&self.description, "description", &mut issues);
        require(&self.event_type, "type", &mut issues);
        if self.end.is_some_and(|end| end < self.when) {
            issues.push("event ends before it starts".to_string());
        }
        for participant in &self.participants {
            if let Some(chamber) = participant.chamber {
                validator.check_chamber(chamber, &mut issues);
            }
        }
        check_sources(self.sources(), &mut issues);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn metadata() -> Metadata {
        Metadata::from_yaml(
            r#"
name: Nebraska
abbreviation: ne
chambers:
  upper: {name: Legislature, title: Senator}
terms:
  - {name: "102", start_year: 2011, end_year: 2012, sessions: ["102"]}
"#,
        )
        .unwrap()
    }

    fn valid_bill() -> Bill {
        let mut bill = Bill::new("102", Chamber::Upper, "LB 1", "Change provisions");
        bill.add_source("http://nebraskalegislature.gov/LB1");
        bill.add_action(
            "upper",
            "Date of introduction",
            Utc.with_ymd_and_hms(2011, 1, 5, 0, 0, 0).unwrap(),
            ["introduction"],
        );
        bill
    }

    #[test]
    fn test_valid_bill() {
        let validator = Validator::new(&metadata(), true);
        assert!(validator.check("bill", &valid_bill()).unwrap().is_empty());
    }

    #[test]
    fn test_bill_issues() {
        let validator = Validator::new(&metadata(), false);
        let mut bill = Bill::new("101", Chamber::Lower, "", "t");
        bill.add_action(
            "upper",
            "Something",
            Utc.with_ymd_and_hms(2011, 1, 5, 0, 0, 0).unwrap(),
            ["bill:introduced"],
        );
        let issues = validator.check("bill", &bill).unwrap();
        assert_eq!(
            issues,
            vec![
                "unknown session '101'",
                "chamber 'lower' is not part of this legislature",
                "bill_id is empty",
                "no sources",
                "action 0 has unknown type 'bill:introduced'",
            ]
        );
    }

    #[test]
    fn test_strict_fails() {
        let validator = Validator::new(&metadata(), true);
        let mut bill = valid_bill();
        bill.sources.clear();
        let err = validator.check("102_upper_LB 1.json", &bill).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed for 102_upper_LB 1.json: no sources"
        );
    }

    #[test]
    fn test_legislator_checks_term_and_district() {
        let validator = Validator::new(&metadata(), false);
        let mut leg = Legislator::new("101", Chamber::Upper, "", "Ann Smith");
        leg.add_source("http://example.com");
        let issues = validator.check("leg", &leg).unwrap();
        assert_eq!(issues, vec!["unknown term '101'", "member role has no district"]);
    }

    #[test]
    fn test_vote_counts_checked() {
        let validator = Validator::new(&metadata(), false);
        let date = Utc.with_ymd_and_hms(2011, 3, 1, 0, 0, 0).unwrap();
        let mut vote = Vote::new(Chamber::Upper, date, "Final reading", true, 0, 0, 0);
        vote.yes("Smith");
        vote.add_source("http://example.com/vote");
        let issues = validator.check("vote", &vote).unwrap();
        assert_eq!(issues, vec!["yes_count is 0 but 1 yes votes listed"]);
    }

    #[test]
    fn test_joint_committee_always_allowed() {
        let validator = Validator::new(&metadata(), true);
        let mut committee = Committee::new(Chamber::Joint, "Appropriations");
        committee.add_source("http://example.com");
        assert!(validator.check("committee", &committee).is_ok());
    }

    #[test]
    fn test_event_checks() {
        let validator = Validator::new(&metadata(), false);
        let when = Utc.with_ymd_and_hms(2011, 2, 1, 9, 0, 0).unwrap();
        let mut event = Event::new("102", when, "committee:meeting", "Hearing", "Room 1524");
        event.end = Some(Utc.with_ymd_and_hms(2011, 2, 1, 8, 0, 0).unwrap());
        event.add_source("http://example.com");
        assert_eq!(
            validator.check("event", &event).unwrap(),
            vec!["event ends before it starts"]
        );
    }
}
