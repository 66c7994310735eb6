//! Classification rules: patterns plus the types and attributes they imply.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::Deserialize;

use crate::error::{CategorizerError, Result};
use crate::taxonomy::ActionType;

/// Runs of literal whitespace inside a rule pattern.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{1,4}").expect("valid regex"));

/// Widen whitespace in a pattern so that irregular spacing still matches.
///
/// # Examples
/// ```
/// use billy_categorizer::rule::widen_whitespace;
///
/// assert_eq!(widen_whitespace("Referred to"), r"Referred\s{0,4}to");
/// ```
#[must_use]
pub fn widen_whitespace(pattern: &str) -> String {
    WHITESPACE_RUN
        .replace_all(pattern, NoExpand(r"\s{0,4}"))
        .into_owned()
}

/// A single compiled pattern, keeping its source for literal matching.
#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    fn compile(source: &str) -> Result<Self> {
        let regex =
            Regex::new(&widen_whitespace(source)).map_err(|e| CategorizerError::InvalidPattern {
                pattern: source.to_string(),
                source: e,
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Match against text, returning the match length and named captures.
    fn find(&self, text: &str) -> Option<(usize, Vec<(String, String)>)> {
        if let Some(caps) = self.regex.captures(text) {
            let len = caps.get(0).map_or(0, |m| m.len());
            let captures = self
                .regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    let value = caps.name(name)?.as_str().trim();
                    (!value.is_empty()).then(|| (name.to_string(), value.to_string()))
                })
                .collect();
            return Some((len, captures));
        }

        // Some tables list plain phrases containing regex metacharacters.
        text.contains(&self.source)
            .then(|| (self.source.len(), Vec::new()))
    }
}

/// Outcome of a successful rule match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleMatch {
    /// Named groups captured by the winning pattern.
    pub captures: Vec<(String, String)>,
}

/// A classification rule.
///
/// If any pattern matches the action text, the action gets the rule's
/// types and attributes. A `stop` rule ends evaluation once it matches.
#[derive(Debug, Clone)]
pub struct Rule {
    patterns: Vec<Pattern>,
    types: BTreeSet<ActionType>,
    stop: bool,
    attrs: BTreeMap<String, String>,
}

impl Rule {
    /// Create a rule from a single pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        Self::any([pattern])
    }

    /// Create a rule that matches if any of the patterns matches.
    pub fn any<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if patterns.is_empty() {
            return Err(CategorizerError::EmptyRule);
        }

        Ok(Self {
            patterns,
            types: BTreeSet::new(),
            stop: false,
            attrs: BTreeMap::new(),
        })
    }

    /// Add resulting action types.
    #[must_use]
    pub fn with_types(mut self, types: impl IntoIterator<Item = ActionType>) -> Self {
        self.types.extend(types);
        self
    }

    /// Add resulting action types by wire name. Empty names are ignored.
    pub fn with_type_names(mut self, names: &[&str]) -> Result<Self> {
        for name in names.iter().filter(|n| !n.is_empty()) {
            self.types.insert(name.parse()?);
        }
        Ok(self)
    }

    /// Mark this rule as conclusive.
    #[must_use]
    pub fn stop(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Add a fixed attribute applied whenever this rule matches.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn types(&self) -> &BTreeSet<ActionType> {
        &self.types
    }

    #[must_use]
    pub fn is_stop(&self) -> bool {
        self.stop
    }

    #[must_use]
    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    /// Source text of the rule's patterns.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }

    /// Test the rule against text.
    ///
    /// When several patterns match, the longest match wins; ties go to the
    /// earlier pattern.
    #[must_use]
    pub fn matches(&self, text: &str) -> Option<RuleMatch> {
        let mut best: Option<(usize, Vec<(String, String)>)> = None;

        for pattern in &self.patterns {
            if let Some((len, captures)) = pattern.find(text) {
                if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
                    best = Some((len, captures));
                }
            }
        }

        best.map(|(_, captures)| RuleMatch { captures })
    }
}

/// One string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// Serializable description of a rule, as found in rule files.
///
/// ```yaml
/// - pattern: '(?i)referred to (?P<committees>.+)'
///   types: referral-committee
/// - patterns: ['^Signed by Governor', '^Approved by Governor']
///   types: [executive-signature]
///   stop: true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    patterns: Vec<String>,
    #[serde(default)]
    types: OneOrMany,
    #[serde(default)]
    stop: bool,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

impl RuleSpec {
    /// Compile into a [`Rule`].
    pub fn compile(self) -> Result<Rule> {
        let patterns: Vec<String> = self.pattern.into_iter().chain(self.patterns).collect();
        let names = self.types.into_vec();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();

        let mut rule = Rule::any(&patterns)?.with_type_names(&names)?;
        rule.stop = self.stop;
        rule.attrs = self.attrs;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_widen_whitespace_runs() {
        assert_eq!(widen_whitespace("a  b"), r"a\s{0,4}b");
        assert_eq!(widen_whitespace("nospace"), "nospace");
    }

    #[test]
    fn test_rule_matches_irregular_spacing() {
        let rule = Rule::new("Referred to committee").unwrap();
        assert!(rule.matches("Referred  to\ncommittee").is_some());
        assert!(rule.matches("Referredto committee").is_some());
        assert!(rule.matches("Reported out").is_none());
    }

    #[test]
    fn test_rule_captures_named_groups() {
        let rule = Rule::new(r"(?i)referred to (?P<committees>.+)").unwrap();
        let m = rule.matches("REFERRED TO Judiciary").unwrap();
        assert_eq!(
            m.captures,
            vec![("committees".to_string(), "Judiciary".to_string())]
        );
    }

    #[test]
    fn test_rule_skips_unmatched_optional_group() {
        let rule = Rule::new(r"^Passed(?: (?P<tally>\d+-\d+))?").unwrap();
        let m = rule.matches("Passed").unwrap();
        assert!(m.captures.is_empty());
    }

    #[test]
    fn test_rule_literal_fallback() {
        // Unescaped parentheses form groups, so the regex itself does not match
        let rule = Rule::new("(s) transmitted to (h)").unwrap();
        assert!(rule.matches("(S) TRANSMITTED TO (H)").is_none());
        assert!(rule.matches("bill (s) transmitted to (h) today").is_some());
    }

    #[test]
    fn test_rule_longest_pattern_wins() {
        let rule = Rule::any([
            r"(?P<who>Governor)",
            r"(?P<who>Governor signed)",
        ])
        .unwrap();
        let m = rule.matches("Governor signed").unwrap();
        assert_eq!(
            m.captures,
            vec![("who".to_string(), "Governor signed".to_string())]
        );
    }

    #[test]
    fn test_rule_invalid_pattern() {
        let err = Rule::new("(unclosed").unwrap_err();
        assert!(matches!(err, CategorizerError::InvalidPattern { .. }));
    }

    #[test]
    fn test_rule_empty_patterns() {
        let err = Rule::any(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, CategorizerError::EmptyRule));
    }

    #[test]
    fn test_with_type_names_ignores_empty() {
        let rule = Rule::new("x")
            .unwrap()
            .with_type_names(&["", "passage"])
            .unwrap();
        assert_eq!(
            rule.types().iter().copied().collect::<Vec<_>>(),
            vec![ActionType::Passage]
        );
    }

    #[test]
    fn test_rule_spec_compile() {
        let yaml = r"
pattern: '(?i)signed by governor'
types: executive-signature
stop: true
attrs:
  actor: executive
";
        let spec: RuleSpec = serde_yaml_ng::from_str(yaml).unwrap();
        let rule = spec.compile().unwrap();

        assert!(rule.is_stop());
        assert!(rule.types().contains(&ActionType::ExecutiveSignature));
        assert_eq!(rule.attrs().get("actor").map(String::as_str), Some("executive"));
    }

    #[test]
    fn test_rule_spec_rejects_unknown_type() {
        let spec: RuleSpec = serde_yaml_ng::from_str("pattern: x\ntypes: [bogus]").unwrap();
        assert!(matches!(
            spec.compile(),
            Err(CategorizerError::UnknownActionType(_))
        ));
    }
}
