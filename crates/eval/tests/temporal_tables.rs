//! Date and date-time behavior of whole tables under both backends.

use serde_json::json;
use tabula_eval::{
    DecisionTable, DecisionTableEvaluator, EngineConfig, EvalError, ExternalTemporal, InputValue,
    TemporalNormalizer, Value, VariableContext,
};
use time::macros::{date, datetime};

/// 2010-01-01T00:00:00Z
const EPOCH_2010: i64 = 1_262_304_000_000;

fn evaluator(toml: &str) -> DecisionTableEvaluator {
    DecisionTableEvaluator::new(EngineConfig::from_toml_str(toml).unwrap()).unwrap()
}

fn single_input_table(language: &str, entry: &str) -> DecisionTable {
    DecisionTable::from_json(&json!({
        "id": "dates",
        "inputs": [{ "name": "date1", "type": "date", "language": language }],
        "outputs": [{ "name": "result", "type": "boolean", "language": language }],
        "rules": [
            { "inputs": [entry], "outputs": ["true"] },
            { "inputs": ["-"], "outputs": ["false"] }
        ]
    }))
    .unwrap()
}

fn matches(language: &str, entry: &str, vars: &VariableContext) -> bool {
    let result = DecisionTableEvaluator::default()
        .evaluate(&single_input_table(language, entry), vars)
        .unwrap();
    match result.single_entry() {
        Some(Value::Bool(b)) => *b,
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn naive_literal_against_epoch_input_diverges_between_backends() {
    let vars = VariableContext::new().put_value("date1", ExternalTemporal::EpochMillis(EPOCH_2010));
    let entry = "<=date and time(\"2014-11-30T12:00:00\")";
    assert!(matches("legacy", entry, &vars));
    assert!(!matches("strict", entry, &vars));
}

#[test]
fn default_language_comes_from_config() {
    let table = DecisionTable::from_json(&json!({
        "id": "dates",
        "inputs": [{ "name": "date1" }],
        "outputs": [{ "name": "result" }],
        "rules": [
            { "inputs": ["<=date and time(\"2014-11-30T12:00:00\")"], "outputs": ["\"before\""] }
        ]
    }))
    .unwrap();
    let vars = VariableContext::new().put_value("date1", ExternalTemporal::EpochMillis(EPOCH_2010));

    let result = evaluator("default_language = \"legacy\"")
        .evaluate(&table, &vars)
        .unwrap();
    assert_eq!(result.single_entry(), Some(&Value::from("before")));

    let result = evaluator("").evaluate(&table, &vars).unwrap();
    assert!(result.is_empty());
}

#[test]
fn text_input_never_satisfies_a_date_test() {
    let vars = VariableContext::new().put_value("date1", "2019-08-22T22:22:22");
    for language in ["legacy", "strict"] {
        for entry in [
            "<=date and time(\"2014-11-30T12:00:00\")",
            ">date and time(\"2014-11-30T12:00:00\")",
            "= date and time(\"2019-08-22T22:22:22\")",
        ] {
            assert!(!matches(language, entry, &vars), "{} {}", language, entry);
        }
    }
}

#[test]
fn equal_values_match_under_both_backends() {
    let cases = [
        (InputValue::from(date!(2019 - 08 - 22)), "= date(\"2019-08-22\")"),
        (
            InputValue::from(datetime!(2019-08-22 22:22:22)),
            "= date and time(\"2019-08-22T22:22:22\")",
        ),
        (
            InputValue::from(datetime!(2019-08-22 22:22:22 +02:00)),
            "= date and time(\"2019-08-22T20:22:22Z\")",
        ),
    ];
    for (input, entry) in cases {
        let vars = VariableContext::new().put_value("date1", input);
        assert!(matches("legacy", entry, &vars), "legacy {}", entry);
        assert!(matches("strict", entry, &vars), "strict {}", entry);
    }
}

#[test]
fn bare_date_call_only_matches_under_legacy() {
    let vars = VariableContext::new().put_value("date1", datetime!(2019-08-22 22:22:22));
    let bare = "date and time(\"2019-08-22T22:22:22\")";
    assert!(matches("legacy", bare, &vars));
    assert!(!matches("strict", bare, &vars));
    assert!(matches("strict", "? = date and time(\"2019-08-22T22:22:22\")", &vars));
}

#[test]
fn date_only_input_compares_by_date() {
    let vars = VariableContext::new().put_value("date1", date!(2019 - 08 - 22));
    for language in ["legacy", "strict"] {
        assert!(matches(language, "= date and time(\"2019-08-22T10:00:00\")", &vars));
        assert!(matches(language, "< date and time(\"2019-08-23T00:00:00\")", &vars));
        assert!(!matches(language, "> date(\"2019-08-22\")", &vars));
    }
}

#[test]
fn date_output_returns_the_input_variable_unchanged() {
    let table = DecisionTable::from_json(&json!({
        "id": "echo",
        "inputs": [{ "name": "date1", "type": "date" }],
        "outputs": [{ "name": "out", "type": "date" }],
        "rules": [{ "inputs": ["-"], "outputs": ["date1"] }]
    }))
    .unwrap();
    let input = ExternalTemporal::Zoned(datetime!(2019-08-22 22:22:22 +02:00));
    let vars = VariableContext::new().put_value("date1", input.clone());

    let expected = TemporalNormalizer::strict(time::UtcOffset::UTC)
        .normalize(&input)
        .unwrap();
    let result = DecisionTableEvaluator::default().evaluate(&table, &vars).unwrap();
    assert_eq!(result.single_entry(), Some(&Value::Temporal(expected)));
}

#[test]
fn date_literal_output_is_deterministic() {
    let config = EngineConfig::from_toml_str("default_zone = \"+01:00\"").unwrap();
    let zone = config.zone().unwrap();
    for language in ["legacy", "strict"] {
        let table = DecisionTable::from_json(&json!({
            "id": "literal",
            "outputs": [{ "name": "when", "type": "date", "language": language }],
            "rules": [{ "outputs": ["date and time(\"2018-11-30T12:00:00\")"] }]
        }))
        .unwrap();
        let evaluator = DecisionTableEvaluator::new(config.clone()).unwrap();
        for _ in 0..3 {
            let result = evaluator.evaluate(&table, &VariableContext::new()).unwrap();
            match result.single_entry() {
                Some(Value::Temporal(t)) => assert_eq!(t.epoch_millis_in(zone), Some(1_543_575_600_000)),
                other => panic!("expected temporal, got {:?}", other),
            }
        }
    }
}

#[test]
fn input_expression_reaches_nested_temporal() {
    let table = DecisionTable::from_json(&json!({
        "id": "birthday",
        "inputs": [{ "name": "birthday", "type": "date", "input_expression": "person.birthday" }],
        "outputs": [{ "name": "result", "type": "string" }],
        "rules": [
            { "inputs": ["= date and time(\"2018-11-30T12:00:00+01:00\")"], "outputs": ["\"match\""] }
        ]
    }))
    .unwrap();
    let vars = VariableContext::new().put_value(
        "person",
        InputValue::object().field("birthday", ExternalTemporal::EpochMillis(1_543_575_600_000)),
    );
    let result = evaluator("default_zone = \"+01:00\"")
        .evaluate(&table, &vars)
        .unwrap();
    assert_eq!(result.single_entry(), Some(&Value::from("match")));
}

#[test]
fn legacy_projects_instants_into_the_platform_zone() {
    let table = DecisionTable::from_json(&json!({
        "id": "zone",
        "inputs": [{ "name": "date1", "language": "legacy" }],
        "outputs": [{ "name": "result" }],
        "rules": [{ "inputs": ["date and time(\"2018-11-30T12:00:00\")"], "outputs": ["true"] }]
    }))
    .unwrap();
    let vars = VariableContext::new().put_value("date1", ExternalTemporal::EpochMillis(1_543_575_600_000));

    let result = evaluator("default_zone = \"+01:00\"").evaluate(&table, &vars).unwrap();
    assert_eq!(result.len(), 1);
    let result = evaluator("default_zone = \"Z\"").evaluate(&table, &vars).unwrap();
    assert!(result.is_empty());
}

#[test]
fn malformed_literal_is_a_temporal_parse_error() {
    let vars = VariableContext::new().put_value("date1", date!(2019 - 01 - 01));
    for language in ["legacy", "strict"] {
        let err = DecisionTableEvaluator::default()
            .evaluate(&single_input_table(language, "< date(\"2019-02-30\")"), &vars)
            .unwrap_err();
        assert_eq!(err, EvalError::TemporalParse { literal: "2019-02-30".to_string() });
    }
}

#[test]
fn evaluation_is_repeatable() {
    let vars = VariableContext::new().put_value("date1", ExternalTemporal::EpochMillis(EPOCH_2010));
    let table = single_input_table("strict", "<=date and time(\"2014-11-30T12:00:00Z\")");
    let evaluator = DecisionTableEvaluator::default();
    let first = evaluator.evaluate(&table, &vars).unwrap();
    let second = evaluator.evaluate(&table, &vars).unwrap();
    assert_eq!(first, second);

    let broken = single_input_table("strict", "<= date and time(unknown)");
    assert_eq!(
        evaluator.evaluate(&broken, &vars).unwrap_err(),
        evaluator.evaluate(&broken, &vars).unwrap_err()
    );
}

#[test]
fn epoch_millis_outside_the_calendar_fail_before_output() {
    let table = DecisionTable::from_json(&json!({
        "id": "echo",
        "inputs": [{ "name": "date1", "type": "date" }],
        "outputs": [{ "name": "out", "type": "date" }],
        "rules": [{ "inputs": ["-"], "outputs": ["date1"] }]
    }))
    .unwrap();
    for millis in [i64::MAX, i64::MIN] {
        let vars = VariableContext::new().put_value("date1", ExternalTemporal::EpochMillis(millis));
        for toml in ["default_language = \"legacy\"", "default_language = \"strict\""] {
            let err = evaluator(toml).evaluate(&table, &vars).unwrap_err();
            assert_eq!(err, EvalError::TemporalParse { literal: millis.to_string() });
        }
    }
}

#[test]
fn far_future_instant_is_rejected_before_comparison() {
    let vars = VariableContext::new()
        .put_value("date1", ExternalTemporal::EpochMillis(400_000_000_000_000_000));
    for language in ["legacy", "strict"] {
        let err = DecisionTableEvaluator::default()
            .evaluate(&single_input_table(language, "< date(\"2019-08-22\")"), &vars)
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::TemporalParse { literal: "400000000000000000".to_string() }
        );
    }
}
