//! Built-in rule tables.
//!
//! `default` covers phrasing common to most US legislatures. Jurisdictions
//! whose journals use their own vocabulary get a dedicated table.

mod default;
mod ny;
mod wa;

use crate::categorizer::Categorizer;
use crate::error::{CategorizerError, Result};
use crate::rule::Rule;

/// A table row: pattern and resulting type names.
pub(crate) type Row = (&'static str, &'static [&'static str]);

/// Names of the built-in rule sets.
#[must_use]
pub fn available() -> &'static [&'static str] {
    &["default", "ny", "wa"]
}

/// Build the categorizer for a built-in rule set.
pub fn ruleset(name: &str) -> Result<Categorizer> {
    match name.to_lowercase().as_str() {
        "default" => default::categorizer(),
        "ny" => ny::categorizer(),
        "wa" => wa::categorizer(),
        _ => Err(CategorizerError::UnknownRuleSet(name.to_string())),
    }
}

/// Compile a table of rows, in order.
pub(crate) fn compile(rows: &[Row]) -> Result<Vec<Rule>> {
    rows.iter()
        .map(|(pattern, types)| Rule::new(pattern)?.with_type_names(types))
        .collect()
}
