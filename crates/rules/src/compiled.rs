//! Compiled rule trees.
//!
//! [`CompiledSpec::compile`] parses every directive token and presence group
//! of a [`RuleSpec`] up front. Evaluation then walks the compiled tree, so a
//! rule tree is read once per call no matter how many array elements it is
//! applied to, and a compiled tree can be reused across calls.
//!
//! # Examples
//!
//! ```
//! use nebula_rules::compiled::{CompiledSpec, Node};
//! use nebula_rules::rules_from_json;
//! use serde_json::json;
//!
//! let rules = rules_from_json(json!({
//!     "users": [{ "code": "regex:/^[A-Z]{3}$/" }],
//!     "$atleast": "mail|phone",
//! }))
//! .unwrap();
//! let compiled = CompiledSpec::compile(&rules).unwrap();
//!
//! assert_eq!(compiled.len(), 2);
//! assert!(matches!(compiled.get("users"), Some(Node::Each(_))));
//! ```

use crate::directive::{FieldRules, PresenceGroup};
use crate::error::RuleError;
use crate::path::qualify;
use crate::rule::{AT_LEAST, AT_MOST, Rule, RuleSpec};

/// Which presence pseudo-key a group sits under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    AtLeast,
    AtMost,
}

impl Presence {
    /// Recognizes [`AT_LEAST`] and [`AT_MOST`].
    #[must_use]
    pub fn of(key: &str) -> Option<Self> {
        match key {
            AT_LEAST => Some(Self::AtLeast),
            AT_MOST => Some(Self::AtMost),
            _ => None,
        }
    }

    /// Returns `true` when `present` fields break the group's `threshold`.
    #[must_use]
    pub fn violated(self, present: usize, threshold: usize) -> bool {
        match self {
            Self::AtLeast => present < threshold,
            Self::AtMost => present > threshold,
        }
    }
}

/// The compiled rule of one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Directives applied to the resolved value.
    Field(FieldRules),
    /// Rules for the fields of a nested object.
    Nested(CompiledSpec),
    /// Rules applied to every element of a nested array.
    Each(CompiledSpec),
    /// `$atleast`/`$atmost` groups, each counted on its own.
    Presence(Presence, Vec<PresenceGroup>),
}

/// A rule tree with every rule compiled, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSpec {
    nodes: Vec<(String, Node)>,
}

impl CompiledSpec {
    /// Compiles a whole rule tree.
    ///
    /// # Errors
    ///
    /// Returns the first fault found anywhere in the tree, whether or not
    /// the data would ever reach that rule: malformed parameters, patterns
    /// that do not compile and malformed presence groups.
    pub fn compile(rules: &RuleSpec) -> Result<Self, RuleError> {
        Self::compile_level(rules, "")
    }

    fn compile_level(rules: &RuleSpec, prefix: &str) -> Result<Self, RuleError> {
        let nodes = rules
            .iter()
            .map(|(key, rule)| Ok((key.clone(), Self::compile_node(key, rule, prefix)?)))
            .collect::<Result<Vec<_>, RuleError>>()?;
        Ok(Self { nodes })
    }

    fn compile_node(key: &str, rule: &Rule, prefix: &str) -> Result<Node, RuleError> {
        let Some(presence) = Presence::of(key) else {
            let path = qualify(prefix, key);
            return Ok(match rule {
                Rule::Directives(_) | Rule::Sequence(_) => {
                    Node::Field(FieldRules::compile(key, rule)?)
                }
                Rule::Nested(inner) => Node::Nested(Self::compile_level(inner, &path)?),
                Rule::Each(inner) => Node::Each(Self::compile_level(inner, &path)?),
            });
        };

        let groups = match rule {
            Rule::Directives(group) => vec![PresenceGroup::parse(group)?],
            Rule::Sequence(groups) => groups
                .iter()
                .map(|group| PresenceGroup::parse(group))
                .collect::<Result<_, _>>()?,
            Rule::Nested(_) | Rule::Each(_) => {
                return Err(RuleError::MalformedPresenceRule {
                    key: qualify(prefix, key),
                });
            }
        };
        Ok(Node::Presence(presence, groups))
    }

    /// Number of rule keys at this level, presence keys included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The compiled rule of `key` at this level.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find_map(|(rule_key, node)| (rule_key == key).then_some(node))
    }

    /// Rule keys and their compiled rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Returns `true` when a rule other than a presence group is keyed
    /// exactly `key` at this level.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.nodes
            .iter()
            .any(|(rule_key, node)| rule_key == key && !matches!(node, Node::Presence(..)))
    }
}
