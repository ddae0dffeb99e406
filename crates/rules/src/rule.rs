//! Rule trees.
//!
//! A [`RuleSpec`] maps field keys to [`Rule`]s in insertion order. Keys may
//! be dotted paths (`"person.address"`) or one of the presence pseudo-keys
//! [`AT_LEAST`] / [`AT_MOST`].
//!
//! Rule trees are usually written as JSON:
//!
//! ```
//! use nebula_rules::{Rule, RuleSpec, rules_from_json};
//! use serde_json::json;
//!
//! let rules: RuleSpec = rules_from_json(json!({
//!     "name": "string|min:3",
//!     "creditCard": ["string", "regex:/^[0-9]{16}$/"],
//!     "address": { "pin": "string|natural|size:6" },
//!     "users": [{ "name": "name" }],
//! }))
//! .unwrap();
//!
//! assert!(matches!(rules["address"], Rule::Nested(_)));
//! assert!(matches!(rules["users"], Rule::Each(_)));
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::RuleError;

/// Pseudo-key requiring a minimum number of fields of a group to be present.
pub const AT_LEAST: &str = "$atleast";

/// Pseudo-key allowing a maximum number of fields of a group to be present.
pub const AT_MOST: &str = "$atmost";

/// Field keys to rules, evaluated in insertion order.
pub type RuleSpec = IndexMap<String, Rule>;

/// The rule attached to one key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRule")]
pub enum Rule {
    /// Pipe-delimited directives: `"string|min:3|max:10"`.
    Directives(String),
    /// Directives already split, for payloads that contain `|`.
    Sequence(Vec<String>),
    /// Rules for the fields of a nested object.
    Nested(RuleSpec),
    /// Rules applied to every object of a nested array.
    Each(Box<RuleSpec>),
}

impl Rule {
    /// Rules for every element of a nested array.
    #[must_use]
    pub fn each(spec: RuleSpec) -> Self {
        Self::Each(Box::new(spec))
    }
}

impl From<&str> for Rule {
    fn from(value: &str) -> Self {
        Self::Directives(value.to_owned())
    }
}

impl From<String> for Rule {
    fn from(value: String) -> Self {
        Self::Directives(value)
    }
}

impl From<Vec<&str>> for Rule {
    fn from(value: Vec<&str>) -> Self {
        Self::Sequence(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<RuleSpec> for Rule {
    fn from(value: RuleSpec) -> Self {
        Self::Nested(value)
    }
}

/// Untagged wire shape; a list of strings is tried before a list of maps.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRule {
    Directives(String),
    Sequence(Vec<String>),
    Each(Vec<RuleSpec>),
    Nested(RuleSpec),
}

impl TryFrom<RawRule> for Rule {
    type Error = String;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        match raw {
            RawRule::Directives(s) => Ok(Self::Directives(s)),
            RawRule::Sequence(list) => Ok(Self::Sequence(list)),
            RawRule::Nested(spec) => Ok(Self::Nested(spec)),
            RawRule::Each(mut specs) => {
                if specs.len() != 1 {
                    return Err(format!(
                        "array rule must hold exactly one object rule, found {}",
                        specs.len()
                    ));
                }
                Ok(Self::each(specs.remove(0)))
            }
        }
    }
}

/// Reads a rule tree from a JSON value.
///
/// # Errors
///
/// Returns [`RuleError::InvalidRuleTree`] when the value is not a mapping
/// of keys to directive strings, directive lists, nested mappings or
/// single-mapping lists.
pub fn rules_from_json(value: serde_json::Value) -> Result<RuleSpec, RuleError> {
    Ok(serde_json::from_value(value)?)
}
