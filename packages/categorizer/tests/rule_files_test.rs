//! Rule files loaded from disk, alone and on top of the built-in tables.

use std::fs;

use billy_categorizer::{resolve, ActionType, CategorizerError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const OREGON_RULES: &str = r"
extends: default
collapse_whitespace: true
split: [committees]
abbreviations:
  committees:
    JUD: Judiciary
    REV: Revenue
rules:
  - pattern: '(?i)^work session held'
    stop: true
  - pattern: '(?i)^assigned to (?P<committees>.+?)\.?$'
    types: referral-committee
    attrs:
      source: oregon
";

fn write_rules(dir: &TempDir, name: &str, yaml: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, yaml).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_rule_file_extends_default() {
    let dir = TempDir::new().unwrap();
    let categorizer = resolve(&write_rules(&dir, "or.yaml", OREGON_RULES)).unwrap();

    // Built-in rules still apply
    let result = categorizer.categorize("Introduction and first reading.");
    assert!(result.has_type(ActionType::Introduction));

    let result = categorizer.categorize("Assigned to   JUD and REV.");
    assert_eq!(result.types, vec![ActionType::ReferralCommittee]);
    assert_eq!(result.attr("committees"), vec!["Judiciary", "Revenue"]);
    assert_eq!(result.attr("source"), vec!["oregon"]);
}

#[test]
fn test_unmatched_text_is_empty() {
    let dir = TempDir::new().unwrap();
    let categorizer = resolve(&write_rules(&dir, "or.yaml", OREGON_RULES)).unwrap();

    let result = categorizer.categorize("Work session held.");
    assert!(result.is_empty());
    assert_eq!(result.types_or_other(), vec![ActionType::Other]);
}

#[test]
fn test_builtin_names_win_over_files() {
    let categorizer = resolve("NY").unwrap();
    let result = categorizer.categorize("REFERRED TO CODES");
    assert_eq!(result.types, vec![ActionType::ReferralCommittee]);
    assert_eq!(result.attr("committees"), vec!["Codes"]);
}

#[test]
fn test_unknown_type_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(
        &dir,
        "bad.yaml",
        "rules:\n  - pattern: 'x'\n    types: bill:introduced\n",
    );
    let err = resolve(&path).err().unwrap();
    assert!(matches!(err, CategorizerError::UnknownActionType(t) if t == "bill:introduced"));
}

#[test]
fn test_invalid_pattern_in_file() {
    let dir = TempDir::new().unwrap();
    let path = write_rules(&dir, "bad.yaml", "rules:\n  - pattern: '(unclosed'\n");
    assert!(matches!(
        resolve(&path).err().unwrap(),
        CategorizerError::InvalidPattern { .. }
    ));
}

#[test]
fn test_missing_file() {
    let err = resolve("/nonexistent/rules.yaml").err().unwrap();
    assert!(matches!(err, CategorizerError::Io(_)));
}
