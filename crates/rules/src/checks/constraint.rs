//! Parameterized constraints: `equal`, `size`, `min`, `max`, `regex`,
//! `decimalsize`, `decimalmin`, `decimalmax` and `enums`.
//!
//! A constraint reads the value through an [`Operand`], which fixes how the
//! value is measured. Text compares by length unless the field declared both
//! `string` and a numeric kind, in which case it compares as the number it
//! spells. Kinds a constraint has no reading for pass it.

use std::borrow::Cow;

use super::format::parse_instant;
use super::{CheckResult, Declared, Subject};
use crate::directive::{Bound, Constraint, Pattern};
use crate::value::{Value, canonical_number, parse_number};

/// How a constraint sees the value.
#[derive(Debug, Clone, PartialEq)]
enum Operand<'a> {
    Text(&'a str),
    /// A number, or numeric text under coercion. `digits` is the text the
    /// number was written as.
    Numeric {
        value: f64,
        digits: Cow<'a, str>,
    },
    Flag(bool),
    Sequence(&'a [Value]),
    Opaque,
}

impl<'a> Operand<'a> {
    fn of(value: &'a Value, declared: &Declared) -> Self {
        match value {
            Value::String(text) => match parse_number(text) {
                Some(n) if declared.numeric_text() => Self::Numeric {
                    value: n,
                    digits: Cow::Borrowed(text.trim()),
                },
                _ => Self::Text(text),
            },
            Value::Number(n) => Self::Numeric {
                value: *n,
                digits: Cow::Owned(canonical_number(*n)),
            },
            Value::BigInt(n) => Self::Numeric {
                value: *n as f64,
                digits: Cow::Owned(n.to_string()),
            },
            Value::Bool(b) => Self::Flag(*b),
            Value::Array(items) => Self::Sequence(items),
            _ => Self::Opaque,
        }
    }

    /// Length for text and arrays.
    fn length(&self) -> Option<usize> {
        match self {
            Self::Text(text) => Some(text.chars().count()),
            Self::Sequence(items) => Some(items.len()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Min,
    Max,
}

impl Side {
    fn admits<T: PartialOrd>(self, actual: T, bound: T) -> bool {
        match self {
            Self::Min => actual >= bound,
            Self::Max => actual <= bound,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::Min => "at least",
            Self::Max => "at most",
        }
    }
}

/// Evaluates one constraint. Missing values fail as required.
pub(crate) fn check(
    constraint: &Constraint,
    subject: Subject<'_>,
    declared: &Declared,
) -> CheckResult {
    subject.require()?;
    let operand = Operand::of(subject.value, declared);

    match constraint {
        Constraint::Equal(expected) => equal(expected, &operand, subject),
        Constraint::Size(size) => size_of(*size, &operand, subject),
        Constraint::Min(bound) => bounded(Side::Min, bound, &operand, subject),
        Constraint::Max(bound) => bounded(Side::Max, bound, &operand, subject),
        Constraint::Regex(pattern) => regex(pattern, subject),
        Constraint::DecimalSize(_) | Constraint::DecimalMin(_) | Constraint::DecimalMax(_) => {
            decimals(constraint, subject)
        }
        Constraint::Enums(tokens) => enums(tokens, &operand, subject),
    }
}

fn equal(expected: &str, operand: &Operand<'_>, subject: Subject<'_>) -> CheckResult {
    let matches = match operand {
        Operand::Text(text) => *text == expected,
        Operand::Numeric { value, .. } => parse_number(expected) == Some(*value),
        Operand::Flag(flag) => !matches!((expected, *flag), ("true", false) | ("false", true)),
        Operand::Sequence(_) | Operand::Opaque => true,
    };
    if matches {
        Ok(())
    } else {
        Err(subject.fail(format_args!("must be equal to {expected}")))
    }
}

fn size_of(size: usize, operand: &Operand<'_>, subject: Subject<'_>) -> CheckResult {
    let actual = match operand {
        Operand::Numeric { digits, .. } => digits
            .chars()
            .filter(|c| !matches!(c, 'e' | 'E' | '-' | '+' | '.'))
            .count(),
        other => match other.length() {
            Some(length) => length,
            None => return Ok(()),
        },
    };
    if actual == size {
        Ok(())
    } else {
        Err(subject.fail(format_args!("must have length {size}")))
    }
}

fn bounded(side: Side, bound: &Bound, operand: &Operand<'_>, subject: Subject<'_>) -> CheckResult {
    match bound {
        Bound::Number { value: limit, text } => {
            if let Operand::Numeric { value, .. } = operand {
                if side.admits(*value, *limit) {
                    return Ok(());
                }
                return Err(subject.fail(format_args!("must be {} {text}", side.phrase())));
            }
            let Some(length) = operand.length() else {
                return Ok(());
            };
            if side.admits(length as f64, *limit) {
                Ok(())
            } else {
                Err(subject.fail(format_args!("must have length of {} {text}", side.phrase())))
            }
        }
        Bound::Instant { millis, text } => {
            // a value that reads as no instant compares neither before nor after
            let Some(at) = subject.value.as_str().and_then(parse_instant) else {
                return Ok(());
            };
            if side.admits(at, *millis) {
                Ok(())
            } else {
                Err(subject.fail(format_args!("must be {} {text}", side.phrase())))
            }
        }
    }
}

fn regex(pattern: &Pattern, subject: Subject<'_>) -> CheckResult {
    let Some(text) = subject.value.as_str() else {
        return Err(subject.fail("must be of type string"));
    };
    if pattern.is_match(text)? {
        Ok(())
    } else {
        Err(subject.fail("is invalid"))
    }
}

/// Characters after the decimal point of canonical number text, an
/// exponent included (`1.5e-7` has four), `None` when there is no point.
fn fraction_digits(canonical: &str) -> Option<usize> {
    canonical
        .split_once('.')
        .map(|(_, fraction)| fraction.chars().count())
}

fn decimals(constraint: &Constraint, subject: Subject<'_>) -> CheckResult {
    let canonical = match subject.value {
        Value::String(text) => match parse_number(text) {
            Some(n) => canonical_number(n),
            None => return Err(subject.fail("must be a valid numeric string")),
        },
        Value::Number(n) if n.is_nan() => return Err(subject.fail("must be a valid number")),
        Value::Number(n) => canonical_number(*n),
        Value::BigInt(n) => n.to_string(),
        _ => return Ok(()),
    };
    let places = fraction_digits(&canonical);

    match *constraint {
        Constraint::DecimalSize(size) => {
            let fail = || subject.fail(format_args!("must have {size} decimal places"));
            match places {
                None if size > 0 => Err(fail()),
                None => Ok(()),
                Some(places) if places != size => Err(fail()),
                Some(_) => Ok(()),
            }
        }
        Constraint::DecimalMin(min) => {
            let fail = || subject.fail(format_args!("must have at least {min} decimal places"));
            match places {
                None if min > 0 => Err(fail()),
                None => Ok(()),
                Some(places) if places < min => Err(fail()),
                Some(_) => Ok(()),
            }
        }
        Constraint::DecimalMax(max) => match places {
            Some(places) if places > max => Err(subject.fail(format_args!(
                "must have at most {max} decimal places"
            ))),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

fn enums(tokens: &[String], operand: &Operand<'_>, subject: Subject<'_>) -> CheckResult {
    let listed = match operand {
        Operand::Text(text) => tokens.iter().any(|token| token == text),
        Operand::Numeric { value, .. } => tokens
            .iter()
            .filter_map(|token| parse_number(token))
            .any(|n| n == *value),
        Operand::Flag(flag) => tokens
            .iter()
            .filter(|token| matches!(token.as_str(), "true" | "false"))
            .any(|token| (token == "true") == *flag),
        Operand::Sequence(_) | Operand::Opaque => true,
    };
    if listed {
        Ok(())
    } else {
        Err(subject.fail("is invalid"))
    }
}
