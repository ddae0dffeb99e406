//! # nebula-rules
//!
//! Declarative data validation driven by short rule strings.
//!
//! A rule tree maps field keys to pipe-delimited directives such as
//! `"string|min:3|max:10"`, to nested rule trees for objects, or to a
//! one-element list holding the rule tree every array element must satisfy.
//! Validation walks the data against the tree and returns human-readable
//! messages.
//!
//! ## Quick Start
//!
//! ```
//! use nebula_rules::{Quotes, ValidatorConfig, validate_json};
//! use serde_json::json;
//!
//! let rules = json!({
//!     "name": "name|field:person name",
//!     "age": "string|natural|min:18",
//!     "$atleast": "mail|phone",
//! });
//! let data = json!({ "name": "test123", "age": "16" });
//!
//! let config = ValidatorConfig::new().with_quotes(Quotes::Backtick);
//! let outcome = validate_json(&rules, &data, &config);
//!
//! assert_eq!(
//!     outcome.messages(),
//!     [
//!         "`person name` must be a valid name",
//!         "`age` must be at least 18",
//!         "at least one of `mail` and `phone` is required",
//!     ]
//! );
//! ```
//!
//! ## Directives
//!
//! - **Presence**: `optional`, `nullable`
//! - **Kinds**: `string`, `number`, `boolean`, `array`, `object`, `bigint`,
//!   `symbol`
//! - **String formats**: `email`, `url`, `domain`, `name`, `fullname`,
//!   `username`, `alpha`, `alphanumeric`, `phone`, `uuid`, `mongoid`, `date`,
//!   `dateonly`, `time`, `lower`, `upper`, `ip`
//! - **Number refinements**: `int`, `positive`, `negative`, `natural`, `whole`
//! - **Constraints**: `equal:`, `size:`, `min:`, `max:`, `regex:`,
//!   `decimalsize:`, `decimalmin:`, `decimalmax:`, `enums:`
//! - **Arrays**: `arrayof:<directive>`, nestable
//! - **Metadata**: `field:<alias>`, `error:<message>`
//!
//! A `string` directive placed before `number` or a number refinement makes
//! the field accept numeric text and compare it as a number from then on.
//!
//! ## Faults
//!
//! Rules that cannot be evaluated are faults, not validation failures:
//! malformed parameters, patterns that do not compile and malformed presence
//! groups. The whole rule tree is compiled before any data is read, so a
//! fault anywhere in it is reported even when the data never reaches that
//! rule. [`try_validate`] returns faults as [`RuleError`]; [`validate`]
//! replaces the whole result with [`INTERNAL_FAULT_MESSAGE`]. Tokens that
//! name no directive are skipped.
//!
//! A rule tree validated many times can be compiled once with
//! [`CompiledSpec::compile`] and passed to [`validate_compiled`].

mod checks;
pub mod compiled;
pub mod config;
pub mod directive;
mod engine;
pub mod error;
pub mod outcome;
pub mod path;
pub mod prelude;
pub mod rule;
pub mod value;

pub use compiled::CompiledSpec;
pub use config::{Quotes, ValidatorConfig};
pub use error::{INTERNAL_FAULT_MESSAGE, RuleError};
pub use outcome::ValidationOutcome;
pub use path::resolve_path;
pub use rule::{AT_LEAST, AT_MOST, Rule, RuleSpec, rules_from_json};
pub use value::Value;

/// Validates `data` against `rules`, surfacing faults.
///
/// # Errors
///
/// Returns the first [`RuleError`] met while compiling or evaluating the
/// rules. Messages gathered before the fault are discarded.
pub fn try_validate(
    rules: &RuleSpec,
    data: &Value,
    config: &ValidatorConfig,
) -> Result<ValidationOutcome, RuleError> {
    let compiled = CompiledSpec::compile(rules)?;
    try_validate_compiled(&compiled, data, config)
}

/// Validates `data` against an already compiled rule tree, surfacing
/// faults.
///
/// # Errors
///
/// Returns the [`RuleError`] of a directive that could not be evaluated,
/// such as a pattern exceeding its backtracking limit.
pub fn try_validate_compiled(
    rules: &CompiledSpec,
    data: &Value,
    config: &ValidatorConfig,
) -> Result<ValidationOutcome, RuleError> {
    tracing::debug!(
        rules = rules.len(),
        strict = config.strict,
        "validation started"
    );
    let messages = engine::evaluate(rules, data, config)?;
    let outcome = ValidationOutcome::from_messages(messages);
    tracing::debug!(
        errors = outcome.messages().len(),
        "validation finished"
    );
    Ok(outcome)
}

/// Validates `data` against `rules`.
///
/// A fault yields exactly one message, [`INTERNAL_FAULT_MESSAGE`], in place
/// of any partial results.
///
/// # Examples
///
/// ```
/// use nebula_rules::{Rule, RuleSpec, Value, ValidatorConfig, validate};
///
/// let rules: RuleSpec = [("age".to_owned(), Rule::from("natural"))].into_iter().collect();
/// let data: Value = [("age", Value::from(-3_i64))].into_iter().collect();
///
/// let outcome = validate(&rules, &data, &ValidatorConfig::default());
/// assert_eq!(outcome.messages(), ["age must be a valid natural number"]);
/// ```
#[must_use]
pub fn validate(rules: &RuleSpec, data: &Value, config: &ValidatorConfig) -> ValidationOutcome {
    fail_closed(try_validate(rules, data, config))
}

/// Validates `data` against an already compiled rule tree, with the same
/// fault policy as [`validate`].
///
/// # Examples
///
/// ```
/// use nebula_rules::{CompiledSpec, ValidatorConfig, Value, rules_from_json, validate_compiled};
/// use serde_json::json;
///
/// let rules = rules_from_json(json!({ "code": "string|size:3" })).unwrap();
/// let compiled = CompiledSpec::compile(&rules).unwrap();
/// let config = ValidatorConfig::default();
///
/// for code in ["abc", "xyz"] {
///     let data = Value::from(json!({ "code": code }));
///     assert!(validate_compiled(&compiled, &data, &config).is_valid());
/// }
/// ```
#[must_use]
pub fn validate_compiled(
    rules: &CompiledSpec,
    data: &Value,
    config: &ValidatorConfig,
) -> ValidationOutcome {
    fail_closed(try_validate_compiled(rules, data, config))
}

fn fail_closed(result: Result<ValidationOutcome, RuleError>) -> ValidationOutcome {
    result.unwrap_or_else(|error| {
        tracing::warn!(%error, "rule evaluation faulted, discarding partial results");
        ValidationOutcome::from_messages([INTERNAL_FAULT_MESSAGE.to_owned()])
    })
}

/// Validates JSON data against a JSON rule tree.
///
/// A rule tree that does not deserialize counts as a fault.
#[must_use]
pub fn validate_json(
    rules: &serde_json::Value,
    data: &serde_json::Value,
    config: &ValidatorConfig,
) -> ValidationOutcome {
    match rules_from_json(rules.clone()) {
        Ok(rules) => validate(&rules, &Value::from(data.clone()), config),
        Err(error) => {
            tracing::warn!(%error, "rule tree rejected");
            ValidationOutcome::from_messages([INTERNAL_FAULT_MESSAGE.to_owned()])
        }
    }
}
