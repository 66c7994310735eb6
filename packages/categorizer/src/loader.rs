//! Loading rule tables from YAML files.
//!
//! A rule file either stands alone or extends a built-in table:
//!
//! ```yaml
//! extends: default
//! collapse_whitespace: true
//! split: [committees]
//! abbreviations:
//!   committees:
//!     JUD: Judiciary
//! rules:
//!   - pattern: '(?i)^held in (?P<committees>.+)'
//!     types: committee-failure
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::hooks::{CollapseWhitespace, ExpandAbbreviations, KnownNames, SplitNames};
use crate::rule::RuleSpec;
use crate::rulesets::{available, ruleset};

/// On-disk rule file format.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    collapse_whitespace: bool,
    #[serde(default)]
    rules: Vec<RuleSpec>,
    #[serde(default)]
    split: Vec<String>,
    #[serde(default)]
    abbreviations: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    known_names: BTreeMap<String, Vec<String>>,
}

/// Build a categorizer from rule file YAML.
///
/// Rules from the file run after the rules of the extended table.
pub fn parse_rules(yaml: &str) -> Result<Categorizer> {
    let file: RuleFile = serde_yaml_ng::from_str(yaml)?;

    let mut categorizer = match &file.extends {
        Some(base) => ruleset(base)?,
        None => Categorizer::default(),
    };

    let rules = file
        .rules
        .into_iter()
        .map(RuleSpec::compile)
        .collect::<Result<Vec<_>>>()?;
    categorizer = categorizer.extend(rules);

    if file.collapse_whitespace {
        categorizer = categorizer.with_hook(CollapseWhitespace);
    }
    for attr in file.split {
        categorizer = categorizer.with_hook(SplitNames::new(attr));
    }
    for (attr, table) in file.abbreviations {
        categorizer = categorizer.with_hook(ExpandAbbreviations::new(attr, table));
    }
    for (attr, names) in file.known_names {
        categorizer = categorizer.with_hook(KnownNames::new(attr, names));
    }

    tracing::debug!(
        extends = file.extends.as_deref().unwrap_or("none"),
        rules = categorizer.rules().len(),
        hooks = categorizer.hook_count(),
        "Loaded rule file"
    );

    Ok(categorizer)
}

/// Load a rule file from disk.
pub fn load_rules_file(path: &Path) -> Result<Categorizer> {
    let yaml = fs::read_to_string(path)?;
    parse_rules(&yaml)
}

/// Resolve a built-in table name or a rule file path.
pub fn resolve(name_or_path: &str) -> Result<Categorizer> {
    if available().contains(&name_or_path.to_lowercase().as_str()) {
        return ruleset(name_or_path);
    }
    load_rules_file(Path::new(name_or_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CategorizerError;
    use crate::taxonomy::ActionType;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_standalone_rules() {
        let yaml = r"
rules:
  - pattern: '(?i)^held in (?P<committees>.+)'
    types: committee-failure
  - patterns: ['(?i)^signed', '(?i)^approved']
    types: [executive-signature]
";
        let categorizer = parse_rules(yaml).unwrap();
        assert_eq!(categorizer.rules().len(), 2);

        let result = categorizer.categorize("Held in Rules");
        assert_eq!(result.types, vec![ActionType::CommitteeFailure]);
        assert_eq!(result.attr("committees"), vec!["Rules"]);

        assert!(categorizer
            .categorize("Approved")
            .has_type(ActionType::ExecutiveSignature));
    }

    #[test]
    fn test_extends_builtin() {
        let yaml = r"
extends: default
rules:
  - pattern: '(?i)^enrolled'
    types: passage
";
        let categorizer = parse_rules(yaml).unwrap();
        let base = ruleset("default").unwrap();
        assert_eq!(categorizer.rules().len(), base.rules().len() + 1);
        assert!(categorizer.categorize("Enrolled").has_type(ActionType::Passage));
        assert!(categorizer.categorize("Introduced").has_type(ActionType::Introduction));
    }

    #[test]
    fn test_file_hooks() {
        let yaml = r"
split: [committees]
abbreviations:
  committees:
    JUD: Judiciary
    FIN: Finance
rules:
  - pattern: '(?i)referred to (?P<committees>.+)'
    types: referral-committee
";
        let categorizer = parse_rules(yaml).unwrap();
        let result = categorizer.categorize("Referred to JUD, FIN");
        assert_eq!(result.attr("committees"), vec!["Finance", "Judiciary"]);
    }

    #[test]
    fn test_unknown_extends() {
        let err = parse_rules("extends: zz").unwrap_err();
        assert!(matches!(err, CategorizerError::UnknownRuleSet(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            parse_rules("rulez: []"),
            Err(CategorizerError::RuleFile(_))
        ));
    }

    #[test]
    fn test_resolve_builtin_and_file() {
        assert!(resolve("wa").is_ok());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rules:\n  - pattern: x").unwrap();
        let categorizer = resolve(file.path().to_str().unwrap()).unwrap();
        assert_eq!(categorizer.rules().len(), 1);
    }

    #[test]
    fn test_resolve_missing_file() {
        assert!(matches!(
            resolve("/nonexistent/rules.yaml"),
            Err(CategorizerError::Io(_))
        ));
    }
}
