//! Number refinements: `int`, `positive`, `negative`, `natural`, `whole`.

use super::{CheckResult, Declared, Subject, kind};
use crate::directive::{DataType, NumberKind};
use crate::value::{Value, parse_number};

fn accepts(kind: NumberKind, n: f64) -> bool {
    let integral = n.fract() == 0.0;
    match kind {
        NumberKind::Int => integral,
        NumberKind::Positive => n > 0.0,
        NumberKind::Negative => n < 0.0,
        NumberKind::Natural => integral && n > 0.0,
        NumberKind::Whole => integral && n >= 0.0,
    }
}

fn noun(kind: NumberKind, textual: bool) -> &'static str {
    match (kind, textual) {
        (NumberKind::Int, false) => "integer",
        (NumberKind::Positive, false) => "positive number",
        (NumberKind::Negative, false) => "negative number",
        (NumberKind::Natural, false) => "natural number",
        (NumberKind::Whole, false) => "whole number",
        (NumberKind::Int, true) => "integer numeric string",
        (NumberKind::Positive, true) => "positive numeric string",
        (NumberKind::Negative, true) => "negative numeric string",
        (NumberKind::Natural, true) => "natural numeric string",
        (NumberKind::Whole, true) => "whole numeric string",
    }
}

/// Requires a number (or numeric text after `string`), then the refinement.
pub(crate) fn check(kind: NumberKind, subject: Subject<'_>, declared: &Declared) -> CheckResult {
    kind::check(DataType::Number, subject, declared)?;

    let (n, textual) = match subject.value {
        Value::Number(n) => (*n, false),
        Value::String(text) => match parse_number(text) {
            Some(n) => (n, true),
            None => return Err(subject.fail("must be a valid number")),
        },
        _ => return Err(subject.fail("must be a valid number")),
    };

    if accepts(kind, n) {
        Ok(())
    } else {
        Err(subject.fail(format_args!("must be a valid {}", noun(kind, textual))))
    }
}
