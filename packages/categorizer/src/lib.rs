//! Billy categorizer - classify free-text legislative actions.
//!
//! Maps action strings such as "Referred to Committee on Judiciary" onto a
//! normalized taxonomy of action types, extracting entities (committees,
//! legislators, vote tallies) along the way.
//!
//! # Example
//!
//! ```
//! use billy_categorizer::{ruleset, ActionType};
//!
//! let categorizer = ruleset("default").unwrap();
//! let result = categorizer.categorize("Referred to Committee on Judiciary");
//!
//! assert_eq!(result.types, vec![ActionType::ReferralCommittee]);
//! assert_eq!(result.attr("committees"), vec!["Judiciary"]);
//! ```
//!
//! # Architecture
//!
//! - [`taxonomy`]: the normalized action types
//! - [`rule`]: patterns and the types/attributes they imply
//! - [`categorizer`]: ordered rule evaluation and result finalization
//! - [`hooks`]: before/after adjustments (splitting, expanding names)
//! - [`rulesets`]: built-in tables
//! - [`loader`]: YAML rule files

pub mod categorizer;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod rule;
pub mod rulesets;
pub mod taxonomy;

pub use categorizer::{AttrValue, Categorization, Categorizer, RawCategorization};
pub use error::{CategorizerError, Result};
pub use hooks::CategorizerHook;
pub use loader::{load_rules_file, parse_rules, resolve};
pub use rule::{Rule, RuleSpec};
pub use rulesets::ruleset;
pub use taxonomy::ActionType;
