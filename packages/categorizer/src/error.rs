//! Error types for the categorizer.

use thiserror::Error;

/// Errors raised while building or loading categorizer rules.
#[derive(Debug, Error)]
pub enum CategorizerError {
    /// A rule pattern failed to compile.
    #[error("Invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule was declared without any pattern.
    #[error("Rule has no pattern")]
    EmptyRule,

    /// A rule names a type outside the action taxonomy.
    #[error("Unknown action type: '{0}'")]
    UnknownActionType(String),

    /// No built-in rule set exists under this name.
    #[error("Unknown rule set: '{0}'. Available: {available}", available = crate::rulesets::available().join(", "))]
    UnknownRuleSet(String),

    /// Rule file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule file is not valid YAML for the rule format.
    #[error("Rule file parsing failed: {0}")]
    RuleFile(#[from] serde_yaml_ng::Error),
}

/// Result type alias for categorizer operations.
pub type Result<T> = std::result::Result<T, CategorizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rule_set_lists_available() {
        let err = CategorizerError::UnknownRuleSet("zz".to_string());
        let msg = err.to_string();
        assert!(msg.contains("'zz'"));
        assert!(msg.contains("default"));
        assert!(msg.contains("ny"));
    }

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = CategorizerError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid rule pattern '('"));
    }
}
