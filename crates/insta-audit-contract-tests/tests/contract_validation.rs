//! Validates contract fixtures against the frozen JSON schema and the decoder.

use insta_audit_contract::{REQUIRED_FIELDS, parse_analysis_result};
use jsonschema::JSONSchema;
use serde_json::Value;

const SCHEMA_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/analysis-result.schema.json"
);
const VALID_FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/fixtures/analysis-result.valid.json"
);
const INVALID_SEVERITY_FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../contracts/fixtures/analysis-result.invalid-severity.json"
);

fn read(path: &str) -> String {
    std::fs::read_to_string(path).expect("json file should be readable")
}

fn load_json(path: &str) -> Value {
    serde_json::from_str(&read(path)).expect("json file should be valid")
}

fn compile_validator() -> JSONSchema {
    let schema = load_json(SCHEMA_PATH);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn analysis_fixture_matches_schema() {
    let validator = compile_validator();
    assert!(
        validator.is_valid(&load_json(VALID_FIXTURE)),
        "analysis fixture should validate against schema"
    );
}

#[test]
fn analysis_fixture_decodes() {
    let result = parse_analysis_result(&read(VALID_FIXTURE)).expect("fixture should decode");
    assert_eq!(result.score, 72);
    assert_eq!(result.problems.len(), 2);
    assert_eq!(result.hashtags.len(), 5);
}

#[test]
fn unknown_severity_is_rejected_by_both() {
    let validator = compile_validator();
    assert!(!validator.is_valid(&load_json(INVALID_SEVERITY_FIXTURE)));
    assert!(parse_analysis_result(&read(INVALID_SEVERITY_FIXTURE)).is_err());
}

#[test]
fn schema_required_fields_match_decoder() {
    let schema = load_json(SCHEMA_PATH);
    let required: Vec<&str> = schema["required"]
        .as_array()
        .expect("required should be an array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(required, REQUIRED_FIELDS);
}

#[test]
fn missing_field_fails_schema_and_decoder() {
    let validator = compile_validator();
    let mut fixture = load_json(VALID_FIXTURE);
    fixture
        .as_object_mut()
        .expect("fixture should be an object")
        .remove("profile_audit");

    assert!(!validator.is_valid(&fixture));
    assert!(parse_analysis_result(&fixture.to_string()).is_err());
}
