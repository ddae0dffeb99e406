//! Rule tree evaluation.
//!
//! The walker visits the keys of a [`CompiledSpec`] in declaration order.
//! Field directives are folded over the resolved value, stopping at the
//! first failing directive. Nested object rules recurse under a dotted prefix and
//! array rules recurse once per element under `key[index]`. Presence groups
//! count present fields, and in strict mode each visited object level is
//! checked for keys no rule declares.

use crate::checks::{Failure, FieldScope, Subject};
use crate::compiled::{CompiledSpec, Node, Presence};
use crate::config::ValidatorConfig;
use crate::directive::{Directive, FieldRules, PresenceGroup};
use crate::error::RuleError;
use crate::path::{qualify, resolve_path};
use crate::value::Value;

/// Label of the whole data tree.
const DATA_LABEL: &str = "data";

/// Evaluates `rules` against `data`, returning messages in evaluation
/// order. Duplicates are kept.
pub(crate) fn evaluate(
    rules: &CompiledSpec,
    data: &Value,
    config: &ValidatorConfig,
) -> Result<Vec<String>, RuleError> {
    let mut walker = Walker::new(config);
    match data {
        Value::Object(_) | Value::Array(_) => walker.walk(rules, data, "")?,
        Value::Undefined | Value::Null => walker.report(DATA_LABEL, "is required"),
        _ => walker.report(DATA_LABEL, "must be of type object or array"),
    }
    Ok(walker.errors)
}

/// Why a field's directive fold stopped early.
enum Halt {
    /// `optional`/`nullable` matched; the field is done.
    Skip,
    Failed(Failure),
}

struct Walker<'c> {
    config: &'c ValidatorConfig,
    errors: Vec<String>,
}

impl<'c> Walker<'c> {
    fn new(config: &'c ValidatorConfig) -> Self {
        Self {
            config,
            errors: Vec::new(),
        }
    }

    fn report(&mut self, label: &str, predicate: &str) {
        let message = format!("{} {predicate}", self.config.label(label));
        self.errors.push(message);
    }

    fn walk(&mut self, rules: &CompiledSpec, data: &Value, prefix: &str) -> Result<(), RuleError> {
        for (key, node) in rules.iter() {
            match node {
                Node::Field(field) => self.field(key, field, data, prefix)?,
                Node::Presence(presence, groups) => self.presence(*presence, groups, data, prefix),
                Node::Nested(inner) => {
                    let path = qualify(prefix, key);
                    match resolve_path(data, key) {
                        value @ Value::Object(_) => self.walk(inner, value, &path)?,
                        value => {
                            tracing::trace!(field = %path, found = value.kind(), "expected an object");
                            self.report(&path, "must be of type object");
                        }
                    }
                }
                Node::Each(inner) => {
                    let path = qualify(prefix, key);
                    match resolve_path(data, key) {
                        Value::Array(items) => {
                            for (index, item) in items.iter().enumerate() {
                                self.walk(inner, item, &format!("{path}[{index}]"))?;
                            }
                        }
                        value if !value.is_present() => self.report(&path, "is required"),
                        value => {
                            tracing::trace!(field = %path, found = value.kind(), "expected an array");
                            self.report(&path, "must be of type array");
                        }
                    }
                }
            }
        }

        if self.config.strict {
            self.undeclared(rules, data, prefix);
        }
        Ok(())
    }

    fn field(
        &mut self,
        key: &str,
        field: &FieldRules,
        data: &Value,
        prefix: &str,
    ) -> Result<(), RuleError> {
        let FieldRules {
            directives,
            alias,
            message,
        } = field;
        let value = resolve_path(data, key);
        let label = alias.clone().unwrap_or_else(|| qualify(prefix, key));
        let subject = Subject::new(value, &label, self.config.quotes);

        let mut scope = FieldScope::default();
        let folded = directives.iter().try_for_each(|directive| match directive {
            Directive::Optional if value.is_undefined() => Err(Halt::Skip),
            Directive::Nullable if value.is_null() => Err(Halt::Skip),
            Directive::Check(check) => scope.apply(check, subject).map_err(Halt::Failed),
            _ => Ok(()),
        });

        match folded {
            Ok(()) | Err(Halt::Skip) => Ok(()),
            Err(Halt::Failed(Failure::Invalid(messages))) => {
                tracing::trace!(
                    field = %label,
                    failures = messages.len(),
                    "field short-circuited"
                );
                match message {
                    Some(custom) => self.errors.push(custom.clone()),
                    None => self.errors.extend(messages),
                }
                Ok(())
            }
            Err(Halt::Failed(Failure::Fault(error))) => Err(error),
        }
    }

    fn presence(
        &mut self,
        presence: Presence,
        groups: &[PresenceGroup],
        data: &Value,
        prefix: &str,
    ) {
        for PresenceGroup {
            fields,
            threshold,
            message,
        } in groups
        {
            let present = fields
                .iter()
                .filter(|field| resolve_path(data, field).is_present())
                .count();
            if !presence.violated(present, *threshold) {
                continue;
            }

            let message = message
                .clone()
                .unwrap_or_else(|| self.presence_message(presence, fields, *threshold, prefix));
            self.errors.push(message);
        }
    }

    /// Builds `at least one of a, b and c is required` style messages.
    fn presence_message(
        &self,
        presence: Presence,
        fields: &[String],
        threshold: usize,
        prefix: &str,
    ) -> String {
        let labels: Vec<String> = fields
            .iter()
            .map(|field| self.config.label(&qualify(prefix, field)))
            .collect();
        let listed = match labels.split_last() {
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
            None => String::new(),
        };

        let count = if threshold == 1 {
            "one".to_owned()
        } else {
            threshold.to_string()
        };
        let verb = if threshold == 1 { "is" } else { "are" };
        match presence {
            Presence::AtLeast => format!("at least {count} of {listed} {verb} required"),
            Presence::AtMost => format!("at most {count} of {listed} {verb} allowed"),
        }
    }

    /// Reports data keys of this level that no rule key names.
    fn undeclared(&mut self, rules: &CompiledSpec, data: &Value, prefix: &str) {
        let Some(object) = data.as_object() else {
            return;
        };

        for key in object.keys() {
            if key.contains('.') || rules.declares(key) {
                continue;
            }
            self.report(&qualify(prefix, key), "is not required");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quotes;
    use crate::rule::rules_from_json;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn errors(rules: serde_json::Value, data: serde_json::Value) -> Vec<String> {
        errors_with(rules, data, &ValidatorConfig::default())
    }

    fn errors_with(
        rules: serde_json::Value,
        data: serde_json::Value,
        config: &ValidatorConfig,
    ) -> Vec<String> {
        let rules = CompiledSpec::compile(&rules_from_json(rules).unwrap()).unwrap();
        evaluate(&rules, &Value::from(data), config).unwrap()
    }

    #[test]
    fn first_failure_ends_the_field() {
        assert_eq!(
            errors(json!({ "a": "string|min:3|max:1" }), json!({ "a": "xy" })),
            ["a must have length of at least 3"]
        );
    }

    #[test]
    fn optional_and_nullable_skip_only_their_value() {
        let rules = json!({ "a": "optional|string", "b": "nullable|string" });
        assert!(errors(rules.clone(), json!({ "b": null })).is_empty());
        assert_eq!(
            errors(rules, json!({ "a": null, "b": 5 })),
            ["a is required", "b must be a valid string"]
        );
    }

    #[test]
    fn custom_error_replaces_every_message() {
        assert_eq!(
            errors(
                json!({ "a": "arrayof:number|error:numbers only" }),
                json!({ "a": ["x", "y"] })
            ),
            ["numbers only"]
        );
    }

    #[test]
    fn alias_replaces_the_path() {
        assert_eq!(
            errors(
                json!({ "address": { "pin": "string|field:postal code" } }),
                json!({ "address": {} })
            ),
            ["postal code is required"]
        );
    }

    #[test]
    fn dotted_keys_resolve_into_the_tree() {
        let rules = json!({ "person": "object", "person.address": "string" });
        assert_eq!(
            errors(rules.clone(), json!({})),
            ["person is required", "person.address is required"]
        );
        assert!(errors(rules, json!({ "person": { "address": "x" } })).is_empty());
    }

    #[test]
    fn nested_object_requires_an_object() {
        let rules = json!({ "address": { "pin": "string" } });
        assert_eq!(errors(rules.clone(), json!({})), ["address must be of type object"]);
        assert_eq!(
            errors(rules.clone(), json!({ "address": [] })),
            ["address must be of type object"]
        );
        assert_eq!(
            errors(rules, json!({ "address": {} })),
            ["address.pin is required"]
        );
    }

    #[test]
    fn nested_array_walks_each_element() {
        let rules = json!({ "users": [{ "name": "string" }] });
        assert_eq!(
            errors(rules.clone(), json!({ "users": [{}, { "name": "x" }] })),
            ["users[0].name is required"]
        );
        assert!(errors(rules.clone(), json!({ "users": [] })).is_empty());
        assert_eq!(errors(rules.clone(), json!({})), ["users is required"]);
        assert_eq!(
            errors(rules, json!({ "users": {} })),
            ["users must be of type array"]
        );
    }

    #[test]
    fn presence_groups_count_present_fields() {
        let at_least = json!({ "$atleast": "a|b" });
        assert_eq!(
            errors(at_least.clone(), json!({})),
            ["at least one of a and b is required"]
        );
        assert!(errors(at_least.clone(), json!({ "a": 1 })).is_empty());
        assert_eq!(
            errors(at_least, json!({ "a": null })),
            ["at least one of a and b is required"]
        );

        let at_most = json!({ "$atmost": "a|b|size:1" });
        assert_eq!(
            errors(at_most.clone(), json!({ "a": 1, "b": 2 })),
            ["at most one of a and b is allowed"]
        );
        assert!(errors(at_most, json!({ "a": 1 })).is_empty());
    }

    #[test]
    fn presence_message_lists_and_pluralizes() {
        assert_eq!(
            errors(json!({ "$atleast": "a|b|c|size:2" }), json!({ "c": 1 })),
            ["at least 2 of a, b and c are required"]
        );
        assert_eq!(
            errors(json!({ "$atleast": "only" }), json!({})),
            ["at least one of only is required"]
        );
    }

    #[test]
    fn presence_groups_run_independently() {
        let rules = json!({ "$atleast": ["a|b", "c|d|error:need c or d"] });
        assert_eq!(
            errors(rules, json!({})),
            ["at least one of a and b is required", "need c or d"]
        );
    }

    #[test]
    fn presence_labels_follow_level_and_quotes() {
        let config = ValidatorConfig::new().with_quotes(Quotes::Backtick);
        assert_eq!(
            errors_with(
                json!({ "contact": { "$atleast": "mail|phone" } }),
                json!({ "contact": {} }),
                &config
            ),
            ["at least one of `contact.mail` and `contact.phone` is required"]
        );
    }

    #[test]
    fn strict_reports_undeclared_keys_per_level() {
        let config = ValidatorConfig::new().with_strict(true);
        let rules = json!({
            "a": "string",
            "person.name": "optional|string",
            "users": [{ "name": "string" }],
            "$atleast": "a|b",
        });
        let data = json!({
            "a": "x",
            "b": 1,
            "person": {},
            "x.y": true,
            "users": [{ "name": "n", "age": 3 }],
        });
        assert_eq!(
            errors_with(rules.clone(), data.clone(), &config),
            [
                "users[0].age is not required",
                "b is not required",
                "person is not required",
            ]
        );
        assert!(errors(rules, data).is_empty());
    }

    #[test]
    fn strict_matches_rule_keys_literally() {
        let config = ValidatorConfig::new().with_strict(true);
        assert_eq!(
            errors_with(
                json!({ "person.name": "string" }),
                json!({ "person": { "name": "x" } }),
                &config
            ),
            ["person is not required"]
        );
        assert!(
            errors_with(
                json!({ "person": "object", "person.name": "string" }),
                json!({ "person": { "name": "x" } }),
                &config
            )
            .is_empty()
        );
    }

    #[test]
    fn unusable_top_level_data() {
        let rules = json!({ "a": "optional|string" });
        let config = ValidatorConfig::new().with_quotes(Quotes::Double);
        assert_eq!(
            errors_with(rules.clone(), json!(null), &config),
            ["\"data\" is required"]
        );
        assert_eq!(
            errors(rules.clone(), json!("text")),
            ["data must be of type object or array"]
        );
        assert!(errors(rules, json!([])).is_empty());
    }

    #[test]
    fn unknown_tokens_do_not_stop_the_field() {
        assert_eq!(
            errors(
                json!({ "a": "string||strnig|min:3", "b": "number" }),
                json!({ "a": "xy", "b": "x" })
            ),
            ["a must have length of at least 3", "b must be a valid number"]
        );
    }

    #[test]
    fn one_compiled_tree_serves_every_element_and_call() {
        let rules = CompiledSpec::compile(
            &rules_from_json(json!({ "users": [{ "code": "regex:/^[A-Z]{3}$/" }] })).unwrap(),
        )
        .unwrap();
        let data = Value::from(json!({ "users": [{ "code": "ABC" }, { "code": "abc" }] }));
        let config = ValidatorConfig::default();

        let first = evaluate(&rules, &data, &config).unwrap();
        assert_eq!(first, ["users[1].code is invalid"]);
        assert_eq!(evaluate(&rules, &data, &config).unwrap(), first);
    }
}
