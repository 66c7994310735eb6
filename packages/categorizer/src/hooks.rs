//! Hooks that adjust text before, or results after, rule evaluation.
//!
//! Jurisdictions extend the shared rule tables with hooks rather than
//! overriding categorization itself.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::categorizer::RawCategorization;

/// A hook run around rule evaluation.
pub trait CategorizerHook: Send + Sync {
    /// Transform the action text before rules are applied.
    fn before(&self, text: String) -> String {
        text
    }

    /// Adjust the accumulated types and attributes.
    fn after(&self, _raw: &mut RawCategorization) {}
}

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Separators between names in a multi-name capture.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAME_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:;|,\s*and\s|,|\s&\s|\sand\s)\s*").expect("valid regex"));

/// Separators between names when names may themselves contain "and".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[;,]\s*(?:and\s+)?").expect("valid regex"));

/// Collapse whitespace runs to single spaces and trim.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseWhitespace;

impl CategorizerHook for CollapseWhitespace {
    fn before(&self, text: String) -> String {
        WHITESPACE.replace_all(text.trim(), " ").into_owned()
    }
}

/// Split multi-name captures such as "Finance, Rules and Judiciary".
#[derive(Debug, Clone)]
pub struct SplitNames {
    attr: String,
    separator: Option<Regex>,
}

impl SplitNames {
    /// Split `attr` values on commas, semicolons, "and" and "&".
    #[must_use]
    pub fn new(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            separator: None,
        }
    }

    /// Split `attr` values on commas and semicolons only, keeping names
    /// such as "Ways and Means" whole.
    #[must_use]
    pub fn punctuated(attr: impl Into<String>) -> Self {
        Self::with_separator(attr, LIST_SEPARATOR.clone())
    }

    /// Split `attr` values on a custom separator.
    #[must_use]
    pub fn with_separator(attr: impl Into<String>, separator: Regex) -> Self {
        Self {
            attr: attr.into(),
            separator: Some(separator),
        }
    }
}

impl CategorizerHook for SplitNames {
    fn after(&self, raw: &mut RawCategorization) {
        let Some(values) = raw.attrs.get_mut(&self.attr) else {
            return;
        };

        let separator: &Regex = match &self.separator {
            Some(separator) => separator,
            None => &NAME_SEPARATOR,
        };
        let split: BTreeSet<String> = values
            .iter()
            .flat_map(|v| separator.split(v))
            .map(|part| part.trim().trim_end_matches('.').trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();

        *values = split;
    }
}

/// Replace abbreviated values with their full names.
#[derive(Debug, Clone)]
pub struct ExpandAbbreviations {
    attr: String,
    table: BTreeMap<String, String>,
}

impl ExpandAbbreviations {
    #[must_use]
    pub fn new<I, K, V>(attr: impl Into<String>, table: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attr: attr.into(),
            table: table
                .into_iter()
                .map(|(k, v)| (k.into().to_uppercase(), v.into()))
                .collect(),
        }
    }
}

impl CategorizerHook for ExpandAbbreviations {
    fn after(&self, raw: &mut RawCategorization) {
        if let Some(values) = raw.attrs.get_mut(&self.attr) {
            *values = values
                .iter()
                .map(|v| {
                    self.table
                        .get(&v.to_uppercase())
                        .cloned()
                        .unwrap_or_else(|| v.clone())
                })
                .collect();
        }
    }
}

/// Add every known name appearing in the text once `attr` was captured.
#[derive(Debug, Clone)]
pub struct KnownNames {
    attr: String,
    names: Vec<String>,
}

impl KnownNames {
    #[must_use]
    pub fn new<I, S>(attr: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();
        Self {
            attr: attr.into(),
            names,
        }
    }
}

impl CategorizerHook for KnownNames {
    fn after(&self, raw: &mut RawCategorization) {
        if !raw.attrs.contains_key(&self.attr) {
            return;
        }

        // Longest names first so "Ways & Means" is not shadowed by a prefix
        let mut remaining = raw.text.to_lowercase();
        let mut found = Vec::new();
        for name in &self.names {
            let needle = name.to_lowercase();
            if remaining.contains(&needle) {
                remaining = remaining.replace(&needle, " ");
                found.push(name.clone());
            }
        }

        if let Some(values) = raw.attrs.get_mut(&self.attr) {
            values.extend(found);
        }
    }
}
