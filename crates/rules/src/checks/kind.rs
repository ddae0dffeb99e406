//! Primitive kind checks.

use super::{CheckResult, Declared, Subject};
use crate::directive::DataType;
use crate::value::{Value, parse_number};

/// Asserts the value's kind. Absent and `null` values always fail as
/// required, whatever the kind.
pub(crate) fn check(kind: DataType, subject: Subject<'_>, declared: &Declared) -> CheckResult {
    subject.require()?;

    let matches = match (kind, subject.value) {
        (DataType::String, Value::String(_))
        | (DataType::Number, Value::Number(_))
        | (DataType::Boolean, Value::Bool(_))
        | (DataType::Array, Value::Array(_))
        | (DataType::Object, Value::Object(_))
        | (DataType::BigInt, Value::BigInt(_))
        | (DataType::Symbol, Value::Symbol(_)) => true,
        (DataType::Number, Value::String(text)) => {
            declared.coerces_text() && parse_number(text).is_some()
        }
        (DataType::Boolean, Value::String(text)) => {
            declared.coerces_text() && matches!(text.as_str(), "true" | "false")
        }
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(subject.fail(format_args!("must be a valid {}", kind.name())))
    }
}
