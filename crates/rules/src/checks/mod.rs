//! Directive evaluation.
//!
//! Each [`Check`] is evaluated against one value and either passes or
//! produces the messages describing why it failed. What a check accepts can
//! depend on the directives evaluated before it on the same field, which is
//! tracked by [`Declared`]:
//!
//! - after `string`, `number` accepts numeric text and `boolean` accepts
//!   `"true"`/`"false"`;
//! - after `string` *and* `number` (or a number refinement), constraints
//!   treat the text as the number it spells.
//!
//! Array element state (holes allowed by `arrayof:optional` /
//! `arrayof:nullable`) is carried per nesting depth in [`FieldScope`].

pub(crate) mod array;
pub(crate) mod constraint;
pub(crate) mod format;
pub(crate) mod kind;
pub(crate) mod number;

use std::fmt::Display;

use smallvec::{SmallVec, smallvec};

use crate::config::Quotes;
use crate::directive::{Check, DataType};
use crate::error::RuleError;
use crate::value::Value;

/// Messages produced by one failing directive; usually exactly one.
pub(crate) type Messages = SmallVec<[String; 1]>;

/// Why a directive did not pass.
#[derive(Debug)]
pub(crate) enum Failure {
    /// The value breaks the directive.
    Invalid(Messages),
    /// The directive could not be evaluated at all.
    Fault(RuleError),
}

impl From<RuleError> for Failure {
    fn from(error: RuleError) -> Self {
        Self::Fault(error)
    }
}

pub(crate) type CheckResult = Result<(), Failure>;

/// The value under evaluation together with its display label.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Subject<'a> {
    pub value: &'a Value,
    /// Unquoted label: field alias, dotted path or element path.
    pub label: &'a str,
    pub quotes: Quotes,
}

impl<'a> Subject<'a> {
    pub fn new(value: &'a Value, label: &'a str, quotes: Quotes) -> Self {
        Self {
            value,
            label,
            quotes,
        }
    }

    /// A failure reading `<label> <predicate>`.
    pub fn fail(&self, predicate: impl Display) -> Failure {
        Failure::Invalid(smallvec![format!(
            "{} {predicate}",
            self.quotes.wrap(self.label)
        )])
    }

    /// Fails with `is required` unless the value is present.
    pub fn require(&self) -> CheckResult {
        if self.value.is_present() {
            Ok(())
        } else {
            Err(self.fail("is required"))
        }
    }
}

/// Which directives have already been evaluated on a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Declared {
    string: bool,
    numeric: bool,
}

impl Declared {
    pub fn record(&mut self, check: &Check) {
        match check {
            Check::Kind(DataType::String) => self.string = true,
            Check::Kind(DataType::Number) | Check::Number(_) => self.numeric = true,
            _ => {}
        }
    }

    /// `string` came first: kind checks accept textual numbers and booleans.
    pub fn coerces_text(&self) -> bool {
        self.string
    }

    /// `string` plus a numeric kind: constraints read text as a number.
    pub fn numeric_text(&self) -> bool {
        self.string && self.numeric
    }
}

/// Element state for one `arrayof:` nesting depth.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Layer {
    pub allow_undefined: bool,
    pub allow_null: bool,
    pub declared: Declared,
}

impl Layer {
    pub fn skips(&self, element: &Value) -> bool {
        (self.allow_undefined && element.is_undefined()) || (self.allow_null && element.is_null())
    }
}

/// Evaluation state of one field, discarded once the field is done.
#[derive(Debug, Default)]
pub(crate) struct FieldScope {
    declared: Declared,
    layers: Vec<Layer>,
}

impl FieldScope {
    /// Evaluates `check` and records it for the directives that follow.
    pub fn apply(&mut self, check: &Check, subject: Subject<'_>) -> CheckResult {
        let declared = self.declared;
        let outcome = dispatch(check, subject, &declared, &mut self.layers, 0);
        self.declared.record(check);
        outcome
    }
}

/// Routes a check to its evaluator. `depth` is the `arrayof:` depth the
/// value sits at; `layers` holds element state for every depth.
pub(crate) fn dispatch(
    check: &Check,
    subject: Subject<'_>,
    declared: &Declared,
    layers: &mut Vec<Layer>,
    depth: usize,
) -> CheckResult {
    match check {
        Check::Kind(kind) => kind::check(*kind, subject, declared),
        Check::Format(format) => format::check(*format, subject, declared),
        Check::Number(kind) => number::check(*kind, subject, declared),
        Check::Constraint(constraint) => constraint::check(constraint, subject, declared),
        Check::ArrayOf(element) => array::check(element, subject, layers, depth),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::run;
    use super::*;

    #[test]
    fn declared_tracks_string_and_numeric() {
        let mut declared = Declared::default();
        declared.record(&Check::Kind(DataType::String));
        assert!(declared.coerces_text());
        assert!(!declared.numeric_text());

        declared.record(&Check::Number(crate::directive::NumberKind::Natural));
        assert!(declared.numeric_text());
    }

    #[test]
    fn directives_before_string_do_not_coerce() {
        assert_eq!(run("number|string", &Value::from("7")), ["field must be a valid number"]);
        assert!(run("string|number", &Value::from("7")).is_empty());
    }

    #[test]
    fn layer_skips_only_allowed_holes() {
        let layer = Layer {
            allow_undefined: true,
            ..Layer::default()
        };
        assert!(layer.skips(&Value::Undefined));
        assert!(!layer.skips(&Value::Null));
    }
}
