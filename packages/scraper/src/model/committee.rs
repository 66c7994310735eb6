//! Committees and subcommittees.

use serde::{Deserialize, Serialize};

use super::{sanitize_filename, Chamber, Extra, Record, Source};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Committee {
    pub chamber: Chamber,
    pub committee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcommittee: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A committee seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(flatten)]
    pub extra: Extra,
}

fn default_role() -> String {
    "member".to_string()
}

impl Committee {
    pub fn new(chamber: Chamber, committee: impl Into<String>) -> Self {
        Self {
            chamber,
            committee: committee.into(),
            subcommittee: None,
            members: Vec::new(),
            sources: Vec::new(),
            extra: Extra::new(),
        }
    }

    #[must_use]
    pub fn subcommittee(mut self, name: impl Into<String>) -> Self {
        self.subcommittee = Some(name.into());
        self
    }

    /// Add a member; `None` gives the role `member`.
    pub fn add_member(&mut self, name: impl Into<String>, role: Option<&str>) {
        self.members.push(Member {
            name: name.into(),
            role: role.map_or_else(default_role, str::to_string),
            extra: Extra::new(),
        });
    }
}

impl Record for Committee {
    const KIND: &'static str = "committee";

    fn sources(&self) -> &[Source] {
        &self.sources
    }

    fn sources_mut(&mut self) -> &mut Vec<Source> {
        &mut self.sources
    }

    fn filename(&self) -> String {
        let name = match &self.subcommittee {
            Some(sub) => format!("{}_{}_{sub}.json", self.chamber, self.committee),
            None => format!("{}_{}.json", self.chamber, self.committee),
        };
        sanitize_filename(&name)
    }

    fn chamber(&self) -> Option<Chamber> {
        Some(self.chamber)
    }

    fn describe(&self) -> String {
        match &self.subcommittee {
            Some(sub) => format!("{} {}: {sub}", self.chamber, self.committee),
            None => format!("{} {}", self.chamber, self.committee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_member_default_role() {
        let mut c = Committee::new(Chamber::Upper, "Finance");
        c.add_member("Smith", None);
        c.add_member("Jones", Some("chair"));
        assert_eq!(c.members[0].role, "member");
        assert_eq!(c.members[1].role, "chair");
    }

    #[test]
    fn test_filename() {
        let c = Committee::new(Chamber::Joint, "Ways & Means");
        assert_eq!(c.filename(), "joint_Ways & Means.json");
        let sub = Committee::new(Chamber::Lower, "Finance").subcommittee("Taxes/Revenue");
        assert_eq!(sub.filename(), "lower_Finance_Taxes-Revenue.json");
    }

    #[test]
    fn test_member_role_defaults_on_read() {
        let c: Committee = serde_json::from_str(
            r#"{"chamber": "upper", "committee": "Rules", "members": [{"name": "Lee"}]}"#,
        )
        .unwrap();
        assert_eq!(c.members[0].role, "member");
        assert!(c.subcommittee.is_none());
    }
}
