//! Data tree validated by the rule engine.
//!
//! [`Value`] mirrors a JSON document but keeps two distinctions the engine
//! relies on: an absent value ([`Value::Undefined`]) is not the same as an
//! explicit `null`, and integers too wide for `f64` have their own
//! [`Value::BigInt`] kind.
//!
//! # Examples
//!
//! ```
//! use nebula_rules::Value;
//! use serde_json::json;
//!
//! let data = Value::from(json!({ "name": "alice", "tags": ["a", null] }));
//! assert!(data.get("name").is_string());
//! assert!(data.get("missing").is_undefined());
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Shared placeholder returned for lookups that hit nothing.
pub(crate) static UNDEFINED: Value = Value::Undefined;

/// A node of the data tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value at all; a missing key or an array hole.
    #[default]
    Undefined,
    /// Explicit `null`.
    Null,
    Bool(bool),
    Number(f64),
    /// Arbitrary-width integer kind, distinct from [`Value::Number`].
    BigInt(i128),
    String(String),
    /// Opaque symbol identified by its description.
    Symbol(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Undefined`].
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` when the value is neither undefined nor null.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Undefined | Self::Null)
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up one path segment.
    ///
    /// Objects are indexed by key and arrays by a decimal index; anything
    /// else yields [`Value::Undefined`].
    #[must_use]
    pub fn get(&self, segment: &str) -> &Value {
        match self {
            Self::Object(map) => map.get(segment).unwrap_or(&UNDEFINED),
            Self::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Short name of the value's kind, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Shortest text of a number, the form decimal-place and digit counting is
/// performed on (`1.50` renders as `1.5`, `100.0` as `100`).
///
/// Magnitudes below `1e-6` or from `1e21` up use exponent notation with a
/// signed exponent (`1e-7`, `1.5e+21`), as JSON producers in JavaScript
/// write them.
#[must_use]
pub fn canonical_number(n: f64) -> String {
    if n == 0.0 {
        // normalizes -0
        return "0".to_owned();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{n:e}");
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        };
    }
    n.to_string()
}

/// Parses numeric text the way a lenient form field would: surrounding
/// whitespace is ignored and only finite decimal numbers are accepted.
///
/// Empty text and spelled-out specials (`inf`, `NaN`) are rejected.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let starts_ok = trimmed
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.'));
    if !starts_ok {
        return None;
    }
    let body = trimmed.trim_start_matches(['+', '-']);
    if !body.bytes().next().is_some_and(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&canonical_number(*n)),
            Self::BigInt(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Symbol(s) => write!(f, "Symbol({s})"),
            Self::Array(_) => f.write_str("[array]"),
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => n
                    .to_string()
                    .parse::<i128>()
                    .map_or(Self::Number(f64::NAN), Self::BigInt),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Self::BigInt(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_null_is_not_undefined() {
        let value = Value::from(json!({ "a": null }));
        assert!(value.get("a").is_null());
        assert!(value.get("b").is_undefined());
    }

    #[test]
    fn arrays_are_indexed_by_decimal_segment() {
        let value = Value::from(json!(["x", "y"]));
        assert_eq!(value.get("1"), &Value::from("y"));
        assert!(value.get("2").is_undefined());
        assert!(value.get("one").is_undefined());
    }

    #[test]
    fn scalars_have_no_children() {
        assert!(Value::from(5_i64).get("a").is_undefined());
    }

    #[test]
    fn object_order_follows_document() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn canonical_number_is_minimal() {
        assert_eq!(canonical_number(100.0), "100");
        assert_eq!(canonical_number(1.50), "1.5");
        assert_eq!(canonical_number(-0.0), "0");
        assert_eq!(canonical_number(100.345), "100.345");
    }

    #[test]
    fn canonical_number_switches_to_exponents_at_the_extremes() {
        assert_eq!(canonical_number(0.000_001), "0.000001");
        assert_eq!(canonical_number(1e-7), "1e-7");
        assert_eq!(canonical_number(-2.5e-8), "-2.5e-8");
        assert_eq!(canonical_number(1e20), "100000000000000000000");
        assert_eq!(canonical_number(1e21), "1e+21");
        assert_eq!(canonical_number(1.5e22), "1.5e+22");
    }

    #[test]
    fn parse_number_accepts_decimal_text_only() {
        assert_eq!(parse_number(" 7 "), Some(7.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12px"), None);
    }
}
