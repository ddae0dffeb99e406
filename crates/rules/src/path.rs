//! Dotted path resolution against a data tree.

use crate::value::{UNDEFINED, Value};

/// Resolves a dotted `path` (`"address.country.code"`) against `data`.
///
/// An empty path yields `data` itself. Descent stops at the first missing
/// intermediate segment, so a missing parent reads as a missing leaf
/// instead of failing. Scalars and `null` have no children: looking through
/// one yields [`Value::Undefined`].
///
/// # Examples
///
/// ```
/// use nebula_rules::{Value, resolve_path};
/// use serde_json::json;
///
/// let data = Value::from(json!({ "address": { "pin": "829119" } }));
/// assert_eq!(resolve_path(&data, "address.pin"), &Value::from("829119"));
/// assert!(resolve_path(&data, "person.address").is_undefined());
/// ```
#[must_use]
pub fn resolve_path<'a>(data: &'a Value, path: &str) -> &'a Value {
    if path.is_empty() {
        return data;
    }

    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return data;
    };

    let mut current = data;
    for segment in parents {
        current = current.get(segment);
        if current.is_undefined() {
            return &UNDEFINED;
        }
    }
    current.get(last)
}

/// Joins a path prefix and a key.
pub(crate) fn qualify(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}
