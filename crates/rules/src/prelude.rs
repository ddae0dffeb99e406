//! Prelude module for convenient imports.
//!
//! ```
//! use nebula_rules::prelude::*;
//!
//! let outcome = validate_json(
//!     &serde_json::json!({ "a": "string" }),
//!     &serde_json::json!({ "a": "x" }),
//!     &ValidatorConfig::default(),
//! );
//! assert!(outcome.is_valid());
//! ```

// ============================================================================
// ENTRY POINTS
// ============================================================================

pub use crate::{
    try_validate, try_validate_compiled, validate, validate_compiled, validate_json,
};

// ============================================================================
// TYPES: rules, data, settings, results
// ============================================================================

pub use crate::compiled::CompiledSpec;
pub use crate::config::{Quotes, ValidatorConfig};
pub use crate::error::{INTERNAL_FAULT_MESSAGE, RuleError};
pub use crate::outcome::ValidationOutcome;
pub use crate::path::resolve_path;
pub use crate::rule::{AT_LEAST, AT_MOST, Rule, RuleSpec, rules_from_json};
pub use crate::value::Value;
