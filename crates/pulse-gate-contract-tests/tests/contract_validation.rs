//! Checks the frozen backend contracts against their committed fixtures.

use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;

fn contracts_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../contracts")
}

fn read_json(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|error| panic!("cannot parse {}: {error}", path.display()))
}

fn schema(name: &str) -> JSONSchema {
    let document = read_json(&contracts_dir().join(name));
    JSONSchema::compile(&document).expect("contract schema should compile")
}

fn fixture(name: &str) -> Value {
    read_json(&contracts_dir().join("fixtures").join(name))
}

#[test]
fn heart_rate_response_fixture_matches_schema() {
    let validator = schema("heart-rate-response.schema.json");
    assert!(
        validator.is_valid(&fixture("heart-rate-response.valid.json")),
        "valid heart-rate response should pass the frozen schema"
    );
}

#[test]
fn non_numeric_heart_rate_fixture_violates_schema() {
    let validator = schema("heart-rate-response.schema.json");
    assert!(
        !validator.is_valid(&fixture("heart-rate-response.invalid.json")),
        "textual heart_rate value should fail the frozen schema"
    );
}

#[test]
fn login_request_fixture_matches_schema() {
    let validator = schema("login-request-fields.schema.json");
    assert!(
        validator.is_valid(&fixture("login-request.valid.json")),
        "valid login field map should pass the frozen schema"
    );
}
