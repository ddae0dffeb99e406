//! Internal faults raised while compiling or walking a rule tree.
//!
//! These are not validation failures: a data value that breaks a rule is
//! reported as a message in [`ValidationOutcome`](crate::ValidationOutcome).
//! A `RuleError` means the rules themselves could not be evaluated, and
//! [`validate`](crate::validate) answers it with a single generic message.

/// Message returned in place of all results when evaluation faults.
pub const INTERNAL_FAULT_MESSAGE: &str = "error occurred while data validation";

/// An unexpected failure during rule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RuleError {
    /// A parameterized directive whose payload could not be parsed.
    #[error("directive `{name}` has malformed parameter `{parameter}`: {reason}")]
    MalformedParameter {
        name: &'static str,
        parameter: String,
        reason: &'static str,
    },

    /// A `regex:` payload that does not compile.
    #[error("invalid regular expression `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// A `$atleast`/`$atmost` entry that is not a group of field names.
    #[error("malformed presence rule `{key}`")]
    MalformedPresenceRule { key: String },

    /// A rule tree that could not be read from its serialized form.
    #[error("invalid rule tree: {0}")]
    InvalidRuleTree(String),
}

impl RuleError {
    pub(crate) fn malformed(
        name: &'static str,
        parameter: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::MalformedParameter {
            name,
            parameter: parameter.into(),
            reason,
        }
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidRuleTree(error.to_string())
    }
}
