//! People and legislators.
//!
//! A [`Legislator`] is a [`Person`] created with a `member` role for one
//! term, chamber and district. Both are written with `_type: person`; they
//! differ in how the output file is named.

use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{sanitize_filename, Chamber, Extra, Record, Source};

/// Anyone the legislature deals with: governors, clerks, legislators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub full_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub suffixes: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A position held during a term. Missing dates mean the whole term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamber: Option<Chamber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(with = "super::date::option", default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "super::date::option", default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Role {
    pub fn new(role: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            term: term.into(),
            chamber: None,
            district: None,
            party: None,
            start_date: None,
            end_date: None,
            extra: Extra::new(),
        }
    }
}

impl Person {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            first_name: String::new(),
            last_name: String::new(),
            middle_name: String::new(),
            suffixes: String::new(),
            roles: Vec::new(),
            sources: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// Set name parts as listed on the official site.
    #[must_use]
    pub fn with_name_parts(
        mut self,
        first_name: impl Into<String>,
        middle_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = first_name.into();
        self.middle_name = middle_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn add_role(&mut self, role: Role) {
        self.roles.push(role);
    }
}

impl Record for Person {
    const KIND: &'static str = "person";

    fn sources(&self) -> &[Source] {
        &self.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Source> {
        &mut self.sources
    }

    fn filename(&self) -> String {
        let name = match self.roles.first() {
            Some(role) => format!("{}_{}.json", role.term, self.full_name),
            None => format!("{}.json", self.full_name),
        };
        sanitize_filename(&name)
    }

    fn chamber(&self) -> Option<Chamber> {
        self.roles.first().and_then(|r| r.chamber)
    }

    fn describe(&self) -> String {
        self.full_name.clone()
    }
}

/// A person serving as a member of the legislature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Legislator {
    person: Person,
}

impl Legislator {
    /// Create a legislator holding a `member` role for `term`.
    pub fn new(
        term: impl Into<String>,
        chamber: Chamber,
        district: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        let mut person = Person::new(full_name);
        let mut role = Role::new("member", term);
        role.chamber = Some(chamber);
        role.district = Some(district.into());
        person.add_role(role);
        Self { person }
    }

    #[must_use]
    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        if let Some(role) = self.person.roles.first_mut() {
            role.party = Some(party.into());
        }
        self
    }

    #[must_use]
    pub fn into_person(self) -> Person {
        self.person
    }

    /// The role the legislator was created with.
    #[must_use]
    pub fn member_role(&self) -> Option<&Role> {
        self.person.roles.first()
    }
}

impl Deref for Legislator {
    type Target = Person;

    fn deref(&self) -> &Person {
        &self.person
    }
}

impl DerefMut for Legislator {
    fn deref_mut(&mut self) -> &mut Person {
        &mut self.person
    }
}

impl Record for Legislator {
    const KIND: &'static str = "person";

    fn sources(&self) -> &[Source] {
        &self.person.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Source> {
        &mut self.person.sources
    }

    fn filename(&self) -> String {
        let name = match self.member_role() {
            Some(role) => format!(
                "{}_{}_{}_{}.json",
                role.term,
                role.chamber.map_or("", Chamber::as_str),
                role.district.as_deref().unwrap_or(""),
                self.full_name
            ),
            None => format!("{}.json", self.full_name),
        };
        sanitize_filename(&name)
    }

    fn chamber(&self) -> Option<Chamber> {
        self.person.chamber()
    }

    fn describe(&self) -> String {
        self.full_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_legislator_has_member_role() {
        let leg = Legislator::new("2011-2012", Chamber::Upper, "7", "Ann Smith").with_party("Democratic");
        let role = leg.member_role().unwrap();
        assert_eq!(role.role, "member");
        assert_eq!(role.chamber, Some(Chamber::Upper));
        assert_eq!(role.district.as_deref(), Some("7"));
        assert_eq!(role.party.as_deref(), Some("Democratic"));
        assert_eq!(leg.chamber(), Some(Chamber::Upper));
    }

    #[test]
    fn test_filenames() {
        let leg = Legislator::new("2011-2012", Chamber::Lower, "District 3", "José Ruiz");
        assert_eq!(leg.filename(), "2011-2012_lower_District 3_Jos? Ruiz.json");

        let mut governor = Person::new("Bev Perdue");
        governor.add_role(Role::new("governor", "2011-2012"));
        assert_eq!(governor.filename(), "2011-2012_Bev Perdue.json");
    }

    #[test]
    fn test_legislator_serializes_as_person() {
        let mut leg = Legislator::new("2011", Chamber::Upper, "1", "Ann Smith");
        leg.add_source("http://example.com/smith");
        let json = serde_json::to_value(&leg).unwrap();
        assert_eq!(json["full_name"], "Ann Smith");
        assert_eq!(json["roles"][0]["chamber"], "upper");
        assert_eq!(json["roles"][0]["start_date"], serde_json::Value::Null);

        let back: Legislator = serde_json::from_value(json).unwrap();
        assert_eq!(back, leg);
    }
}
