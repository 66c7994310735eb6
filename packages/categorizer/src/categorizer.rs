//! The rule-driven action categorizer.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::hooks::CategorizerHook;
use crate::rule::Rule;
use crate::taxonomy::ActionType;

/// Intermediate result handed to after-hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCategorization {
    /// The action text after before-hooks ran.
    pub text: String,
    /// Types accumulated from matching rules.
    pub types: BTreeSet<ActionType>,
    /// Attribute values accumulated from captures and fixed rule attributes.
    pub attrs: BTreeMap<String, BTreeSet<String>>,
}

impl RawCategorization {
    /// Add a value to an attribute.
    pub fn add_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.entry(key.into()).or_default().insert(value.into());
    }
}

/// A finalized attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    One(String),
    Many(Vec<String>),
}

impl AttrValue {
    /// All values as string slices.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// Final categorization of one action text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Categorization {
    pub types: Vec<ActionType>,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Categorization {
    /// Whether no rule matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.attrs.is_empty()
    }

    #[must_use]
    pub fn has_type(&self, action_type: ActionType) -> bool {
        self.types.contains(&action_type)
    }

    /// Types, or `[other]` when nothing matched.
    #[must_use]
    pub fn types_or_other(&self) -> Vec<ActionType> {
        if self.types.is_empty() {
            vec![ActionType::Other]
        } else {
            self.types.clone()
        }
    }

    /// Values captured for an attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Vec<&str> {
        self.attrs.get(key).map(AttrValue::values).unwrap_or_default()
    }
}

/// Ordered rule list plus hooks.
///
/// Rules are applied top-to-bottom. Every matching rule contributes its
/// types and attributes; evaluation ends after the first matching `stop`
/// rule.
#[derive(Default)]
pub struct Categorizer {
    rules: Vec<Rule>,
    hooks: Vec<Box<dyn CategorizerHook>>,
}

impl Categorizer {
    /// Create a categorizer from an ordered rule list.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            hooks: Vec::new(),
        }
    }

    /// Append rules after the existing ones.
    #[must_use]
    pub fn extend(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Register a hook. Hooks run in registration order.
    #[must_use]
    pub fn with_hook(mut self, hook: impl CategorizerHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Categorize an action text.
    ///
    /// # Examples
    /// ```
    /// use billy_categorizer::{ActionType, Categorizer, Rule};
    ///
    /// let categorizer = Categorizer::new(vec![
    ///     Rule::new(r"(?i)referred to (?P<committees>.+)")
    ///         .unwrap()
    ///         .with_types([ActionType::ReferralCommittee]),
    /// ]);
    ///
    /// let result = categorizer.categorize("Referred to Judiciary");
    /// assert_eq!(result.types, vec![ActionType::ReferralCommittee]);
    /// assert_eq!(result.attr("committees"), vec!["Judiciary"]);
    /// ```
    #[must_use]
    pub fn categorize(&self, text: &str) -> Categorization {
        let mut text = text.to_string();
        for hook in &self.hooks {
            text = hook.before(text);
        }

        let mut raw = RawCategorization {
            text,
            ..RawCategorization::default()
        };

        for (index, rule) in self.rules.iter().enumerate() {
            let Some(matched) = rule.matches(&raw.text) else {
                continue;
            };

            tracing::trace!(rule = index, types = ?rule.types(), "Rule matched");

            raw.types.extend(rule.types().iter().copied());
            for (key, value) in matched.captures {
                raw.add_attr(key, value);
            }
            for (key, value) in rule.attrs() {
                raw.add_attr(key.clone(), value.clone());
            }

            if rule.is_stop() {
                break;
            }
        }

        for hook in &self.hooks {
            hook.after(&mut raw);
        }

        finalize(raw)
    }
}

impl std::fmt::Debug for Categorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Categorizer")
            .field("rules", &self.rules.len())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Drop empty values and collapse a single `actor` to a plain string.
fn finalize(raw: RawCategorization) -> Categorization {
    let mut attrs = BTreeMap::new();

    for (key, values) in raw.attrs {
        let mut values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
        if values.is_empty() {
            continue;
        }

        let value = if key == "actor" && values.len() == 1 {
            AttrValue::One(values.remove(0))
        } else {
            AttrValue::Many(values)
        };
        attrs.insert(key, value);
    }

    Categorization {
        types: raw.types.into_iter().collect(),
        attrs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::SplitNames;
    use pretty_assertions::assert_eq;

    fn categorizer() -> Categorizer {
        Categorizer::new(vec![
            Rule::new(r"(?i)^passed")
                .unwrap()
                .with_types([ActionType::Passage]),
            Rule::new(r"(?i)referred to (?P<committees>.+)")
                .unwrap()
                .with_types([ActionType::ReferralCommittee]),
            Rule::new(r"(?i)vetoed")
                .unwrap()
                .with_types([ActionType::ExecutiveVeto])
                .with_attr("actor", "executive")
                .stop(),
            Rule::new(r"(?i)veto")
                .unwrap()
                .with_types([ActionType::VetoOverridePassage]),
        ])
    }

    #[test]
    fn test_no_match() {
        let result = categorizer().categorize("Read first time");
        assert!(result.is_empty());
        assert_eq!(result.types_or_other(), vec![ActionType::Other]);
    }

    #[test]
    fn test_multiple_rules_accumulate() {
        let result = categorizer().categorize("Passed; referred to Finance");
        assert_eq!(
            result.types,
            vec![ActionType::Passage, ActionType::ReferralCommittee]
        );
        assert_eq!(result.attr("committees"), vec!["Finance"]);
    }

    #[test]
    fn test_stop_rule_ends_evaluation() {
        let result = categorizer().categorize("Vetoed by Governor");
        assert_eq!(result.types, vec![ActionType::ExecutiveVeto]);
        assert_eq!(
            result.attrs.get("actor"),
            Some(&AttrValue::One("executive".to_string()))
        );
    }

    #[test]
    fn test_actor_with_many_values_stays_list() {
        let categorizer = Categorizer::new(vec![
            Rule::new("a").unwrap().with_attr("actor", "upper"),
            Rule::new("b").unwrap().with_attr("actor", "lower"),
        ]);
        let result = categorizer.categorize("ab");
        assert_eq!(
            result.attrs.get("actor"),
            Some(&AttrValue::Many(vec![
                "lower".to_string(),
                "upper".to_string()
            ]))
        );
    }

    #[test]
    fn test_after_hook_runs() {
        let categorizer = categorizer().with_hook(SplitNames::new("committees"));
        let result = categorizer.categorize("Referred to Finance and Rules");
        assert_eq!(result.attr("committees"), vec!["Finance", "Rules"]);
    }

    #[test]
    fn test_extend_appends_rules() {
        let extended = categorizer().extend([Rule::new("(?i)tabled")
            .unwrap()
            .with_types([ActionType::Deferral])]);
        assert_eq!(extended.rules().len(), 5);
        assert!(extended.categorize("Tabled").has_type(ActionType::Deferral));
    }

    #[test]
    fn test_categorization_serializes() {
        let result = categorizer().categorize("Vetoed");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"types": ["executive-veto"], "attrs": {"actor": "executive"}})
        );
    }
}
