//! End-to-end validation through the public entry points.

use nebula_rules::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn check(rules: serde_json::Value, data: serde_json::Value) -> Vec<String> {
    check_with(rules, data, ValidatorConfig::default())
}

fn check_with(
    rules: serde_json::Value,
    data: serde_json::Value,
    config: ValidatorConfig,
) -> Vec<String> {
    validate_json(&rules, &data, &config).messages().to_vec()
}

// ============================================================================
// FULL DOCUMENT
// ============================================================================

fn profile_rules() -> RuleSpec {
    rules_from_json(json!({
        "mail": "optional|email",
        "phone": "optional|phone",
        "$atleast": "mail|phone",
        "$atmost": "mail|phone|size:1",
        "name": "name|field:person name",
        "gender": "enums:male,female",
        "adult": "enums:true,false",
        "id": "uuid",
        "creditCard": "string|regex:/^[0-9]{16}$/",
        "isMarried": "boolean",
        "userId": "mongoid",
        "profile": "url",
        "password": "string|min:3|max:15",
        "favoriteFoods": "array|min:3|max:6",
        "rating": "number|enums:1,2,3,4,5|error:rating is not correct, please fix it",
        "ratings": "arrayof:optional|arrayof:natural|arrayof:max:5|field:ratingsList",
        "score": "number|whole",
        "accountBalance": "number|min:0|decimalsize:2",
        "hash": "lower",
        "hash2": "upper",
        "serverIp": "ip",
        "dob": "date",
        "time": "time",
        "address": {
            "pin": "string|natural|size:6",
            "city": "name",
            "country": { "code": "alpha|upper|size:2" },
        },
        "users": [{
            "name": "name",
            "age": "natural",
            "gender": "enums:male,female",
        }],
        "person": "object",
        "person.address": "string",
        "limit": "optional|string|natural|min:100",
    }))
    .unwrap()
}

fn profile_data() -> Value {
    let mut data = Value::from(json!({
        "name": "test123",
        "gender": "Male",
        "adult": true,
        "id": "123e4567-e89b-12d3-a456-426655440000",
        "creditCard": "1987654312345678",
        "isMarried": "no",
        "profile": "example.com",
        "password": "ab",
        "favoriteFoods": ["chicken", "egg roll", "french fries"],
        "rating": 4.5,
        "ratings": [],
        "score": 234.5,
        "accountBalance": 100.345,
        "hash": "a6g8d7Fkf9Du",
        "hash2": "PDH78DI908g56",
        "serverIp": "8.45.23.0",
        "dob": "1996-01-10T23:50:00.0000+05:30",
        "time": "23:50",
        "address": {
            "pin": "829119",
            "city": "Rock Port",
            "country": { "code": "IN" },
        },
        "users": [
            { "name": "pawan", "age": 20, "gender": "male", "isMarried": true },
            {},
        ],
        "limit": "90",
        "test": false,
        "okBye": 78,
    }));
    // JSON has no holes; put one in by hand.
    if let Value::Object(fields) = &mut data {
        fields.insert(
            "ratings".to_owned(),
            Value::from(vec![
                Value::from(3_i64),
                Value::from(5_i64),
                Value::Undefined,
                Value::from(true),
                Value::from(5.67),
            ]),
        );
    }
    data
}

#[test]
fn full_document_reports_in_rule_order() {
    let config = ValidatorConfig::new()
        .with_quotes(Quotes::Backtick)
        .with_strict(true);
    let outcome = validate(&profile_rules(), &profile_data(), &config);

    assert_eq!(
        outcome.messages(),
        [
            "at least one of `mail` and `phone` is required",
            "`person name` must be a valid name",
            "`gender` is invalid",
            "`isMarried` must be a valid boolean",
            "`userId` is required",
            "`profile` must be a valid url",
            "`password` must have length of at least 3",
            "rating is not correct, please fix it",
            "`ratingsList[3]` must be a valid number",
            "`ratingsList[4]` must be a valid natural number",
            "`score` must be a valid whole number",
            "`accountBalance` must have 2 decimal places",
            "`hash` must not contains upper case letters",
            "`hash2` must not contains lower case letters",
            "`users[0].isMarried` is not required",
            "`users[1].name` is required",
            "`users[1].age` is required",
            "`users[1].gender` is required",
            "`person` is required",
            "`person.address` is required",
            "`limit` must be at least 100",
            "`test` is not required",
            "`okBye` is not required",
        ]
    );
}

// ============================================================================
// ENGINE PROPERTIES
// ============================================================================

#[test]
fn valid_data_has_no_errors_key() {
    let outcome = validate_json(
        &json!({ "name": "string|min:3|max:10" }),
        &json!({ "name": "alice" }),
        &ValidatorConfig::default(),
    );
    assert_eq!(outcome, ValidationOutcome { errors: None });
}

#[test]
fn validation_is_idempotent() {
    let rules = profile_rules();
    let data = profile_data();
    let config = ValidatorConfig::new().with_strict(true);
    assert_eq!(validate(&rules, &data, &config), validate(&rules, &data, &config));
}

#[test]
fn duplicate_messages_collapse() {
    assert_eq!(
        check(
            json!({ "a": "string|error:bad input", "b": "string|error:bad input" }),
            json!({})
        ),
        ["bad input"]
    );
}

#[test]
fn at_least_threshold() {
    let rules = json!({ "$atleast": "a|b" });
    assert_eq!(
        check(rules.clone(), json!({})),
        ["at least one of a and b is required"]
    );
    assert!(check(rules, json!({ "a": 1 })).is_empty());
}

#[test]
fn at_most_threshold() {
    let rules = json!({ "$atmost": "a|b|size:1" });
    assert_eq!(check(rules.clone(), json!({ "a": 1, "b": 2 })).len(), 1);
    assert!(check(rules, json!({ "a": 1 })).is_empty());
}

#[test]
fn numeric_strings_have_their_own_wording() {
    let rules = json!({ "age": "string|natural" });
    assert!(check(rules.clone(), json!({ "age": "7" })).is_empty());
    assert_eq!(
        check(rules, json!({ "age": "-3" })),
        ["age must be a valid natural numeric string"]
    );
    assert_eq!(
        check(json!({ "age": "natural" }), json!({ "age": -3 })),
        ["age must be a valid natural number"]
    );
}

#[test]
fn array_of_objects_names_the_element() {
    assert_eq!(
        check(
            json!({ "users": [{ "name": "string" }] }),
            json!({ "users": [{}, { "name": "x" }] })
        ),
        ["users[0].name is required"]
    );
}

#[test]
fn strict_mode_flags_undeclared_keys() {
    let rules = json!({ "a": "string" });
    let data = json!({ "a": "x", "b": 1 });
    assert_eq!(
        check_with(
            rules.clone(),
            data.clone(),
            ValidatorConfig::new().with_strict(true)
        ),
        ["b is not required"]
    );
    assert!(check(rules, data).is_empty());
}

#[test]
fn custom_error_overrides_label() {
    assert_eq!(
        check(
            json!({ "a": "number|min:5|field:count|error:bad count" }),
            json!({ "a": 3 })
        ),
        ["bad count"]
    );
}

#[test]
fn list_rules_keep_pipes_in_patterns() {
    let rules = json!({ "code": ["string", "regex:/^(yes|no)$/"] });
    assert!(check(rules.clone(), json!({ "code": "no" })).is_empty());
    assert_eq!(check(rules, json!({ "code": "maybe" })), ["code is invalid"]);
}

#[rstest]
#[case(Quotes::None, "a is required")]
#[case(Quotes::Single, "'a' is required")]
#[case(Quotes::Double, "\"a\" is required")]
#[case(Quotes::Backtick, "`a` is required")]
fn quote_styles(#[case] quotes: Quotes, #[case] expected: &str) {
    assert_eq!(
        check_with(
            json!({ "a": "string" }),
            json!({}),
            ValidatorConfig::new().with_quotes(quotes)
        ),
        [expected]
    );
}

#[test]
fn nested_arrays_with_holes() {
    let rules = rules_from_json(json!({
        "grid": "array|arrayof:optional|arrayof:array|arrayof:arrayof:optional|arrayof:arrayof:string",
    }))
    .unwrap();
    let data: Value = [(
        "grid",
        Value::from(vec![
            Value::from(vec![Value::Undefined, Value::from(1_i64), Value::from("3")]),
            Value::Undefined,
            Value::from(vec![Value::from("true"), Value::from(false)]),
        ]),
    )]
    .into_iter()
    .collect();

    assert_eq!(
        validate(&rules, &data, &ValidatorConfig::default()).messages(),
        [
            "grid[0][1] must be a valid string",
            "grid[2][1] must be a valid string",
        ]
    );
}

// ============================================================================
// FAULTS
// ============================================================================

#[rstest]
#[case(json!({ "a": "string|max:someday" }))]
#[case(json!({ "a": "size:ten" }))]
#[case(json!({ "a": "regex:/([a-z/" }))]
#[case(json!({ "a": "arrayof:decimalmax:-1" }))]
#[case(json!({ "$atleast": "a||b" }))]
#[case(json!({ "a": [{ "b": "string" }, { "c": "string" }] }))]
#[case(json!({ "a": 42 }))]
fn faults_replace_all_results(#[case] faulty: serde_json::Value) {
    let mut rules = json!({ "z": "string" });
    if let (Some(rules), Some(faulty)) = (rules.as_object_mut(), faulty.as_object()) {
        rules.extend(faulty.clone());
    }

    let outcome = validate_json(
        &rules,
        &json!({ "b": 1 }),
        &ValidatorConfig::new().with_strict(true),
    );
    assert_eq!(outcome.messages(), [INTERNAL_FAULT_MESSAGE]);
}

#[test]
fn try_validate_surfaces_the_fault() {
    let rules = rules_from_json(json!({ "a": "string|size:ten" })).unwrap();
    let err = try_validate(&rules, &Value::from(json!({ "a": "x" })), &ValidatorConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RuleError::MalformedParameter { name: "size", .. }
    ));
}

#[rstest]
#[case(json!({ "a": "string|", "b": "number" }))]
#[case(json!({ "a": "required|string", "b": "number" }))]
#[case(json!({ "a": "string|strnig", "b": "number||" }))]
fn unknown_tokens_are_skipped(#[case] rules: serde_json::Value) {
    assert_eq!(
        check(rules, json!({ "b": "x" })),
        ["a is required", "b must be a valid number"]
    );
}

#[test]
fn faults_surface_before_any_data_is_read() {
    let rules = json!({ "a": "string", "users": [{ "age": "natural|decimalmax:x" }] });
    assert_eq!(
        check(rules, json!({ "users": [] })),
        [INTERNAL_FAULT_MESSAGE]
    );
}

#[test]
fn compiled_rules_are_reusable() {
    let rules = rules_from_json(json!({
        "users": [{ "code": "regex:/^[A-Z]{3}$/", "born": "max:2000-01-01" }],
    }))
    .unwrap();
    let compiled = CompiledSpec::compile(&rules).unwrap();
    let config = ValidatorConfig::default();

    let first = Value::from(json!({ "users": [{ "code": "ABC", "born": "1999-12-31" }] }));
    assert!(validate_compiled(&compiled, &first, &config).is_valid());

    let second = Value::from(json!({ "users": [{ "code": "AB", "born": "2001-01-01" }] }));
    assert_eq!(
        validate_compiled(&compiled, &second, &config).messages(),
        [
            "users[0].code is invalid",
            "users[0].born must be at most 2000-01-01",
        ]
    );
    assert_eq!(
        validate_compiled(&compiled, &second, &config),
        validate(&rules, &second, &config)
    );
}

#[test]
fn date_bounds_pass_values_that_are_not_dates() {
    assert!(check(json!({ "d": "max:2024-01-01" }), json!({ "d": "someday" })).is_empty());
    assert_eq!(
        check(json!({ "d": "max:2024-01-01" }), json!({})),
        ["d is required"]
    );
}

#[test]
fn unknown_element_tokens_still_require_an_array() {
    let rules = json!({ "tags": "arrayof:field:tag" });
    assert!(check(rules.clone(), json!({ "tags": [1, null] })).is_empty());
    assert_eq!(
        check(rules, json!({ "tags": "x" })),
        ["tags must be a valid array"]
    );
}

#[test]
fn top_level_data_must_be_a_container() {
    let rules = json!({ "a": "optional|string" });
    assert_eq!(check(rules.clone(), json!(null)), ["data is required"]);
    assert_eq!(
        check(rules, json!(12)),
        ["data must be of type object or array"]
    );
}

#[test]
fn data_deserializes_from_json_text() {
    let data: Value = serde_json::from_str(r#"{"limit": "150"}"#).unwrap();
    let rules = rules_from_json(json!({ "limit": "string|natural|min:100" })).unwrap();
    assert!(validate(&rules, &data, &ValidatorConfig::default()).is_valid());
}
