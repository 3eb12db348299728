//! Process-level contract: one envelope on stdout, exit code follows status.

mod common;

use common::*;
use serde_json::json;

fn parks(env: &TestEnv) {
    env.write(
        "parks.geojson",
        &collection(
            Some("EPSG:4326"),
            vec![
                feature(square(0.0, 0.0, 1.0), json!({"park_id": 1, "name": "North"})),
                feature(square(2.0, 0.0, 1.0), json!({"park_id": 2, "name": "South"})),
            ],
        ),
    );
}

#[test]
fn success_envelope_has_status_warnings_and_metadata() {
    let env = TestEnv::new();
    parks(&env);

    let result = env.primitive(
        "validate-vector",
        &json!({"features": "parks.geojson"}),
        "out.geojson",
        &json!({"id_field": "park_id"}),
    );

    assert_eq!(result.exit_code, 0, "stderr: {}", result.stderr);
    let envelope = result.envelope();
    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["warnings"], json!([]));
    assert_eq!(envelope["feature_count"], 2);
    assert_eq!(envelope["id_field"], "park_id");
    assert!(envelope.get("error").is_none());
    assert!(env.path("out.geojson").is_file());
}

#[test]
fn missing_arguments_is_usage_error() {
    let env = TestEnv::new();

    let result = env.run(&["validate-vector", "{}"]);

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.status(), "failure");
    assert_eq!(result.error().as_deref(), Some("UsageError"));
    let message = result.envelope()["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("got 1"), "message: {}", message);
}

#[test]
fn unknown_primitive_is_usage_error() {
    let env = TestEnv::new();

    let result = env.run(&["buffer-vector", "{}", "out.geojson", "{}"]);

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.error().as_deref(), Some("UsageError"));
    assert_eq!(result.envelope()["warnings"], json!([]));
}

#[test]
fn malformed_params_is_argument_parse_error() {
    let env = TestEnv::new();
    parks(&env);

    let result = env.run(&[
        "validate-vector",
        r#"{"features":"parks.geojson"}"#,
        "out.geojson",
        "{not json",
    ]);

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.error().as_deref(), Some("ArgumentParseError"));
    assert!(!env.path("out.geojson").exists());
}

#[test]
fn non_object_inputs_is_argument_parse_error() {
    let env = TestEnv::new();

    let result = env.run(&["describe-table", "[1, 2]", "out.json", "{}"]);

    assert_eq!(result.error().as_deref(), Some("ArgumentParseError"));
}

#[test]
fn missing_required_input_is_reported_by_name() {
    let env = TestEnv::new();
    env.write(
        "a.geojson",
        &collection(Some("EPSG:4326"), vec![feature(square(0.0, 0.0, 1.0), json!({}))]),
    );

    let result = env.primitive("subset-vector", &json!({"features": "a.geojson"}), "out.geojson", &json!({}));

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.error().as_deref(), Some("MissingInput"));
    let message = result.envelope()["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("boundary"), "message: {}", message);
}

#[test]
fn arguments_after_params_are_ignored() {
    let env = TestEnv::new();

    let result = env.run(&["describe-table", "{}", "out.json", "{}", "extra"]);

    assert_eq!(result.exit_code, 1);
    assert_eq!(result.error().as_deref(), Some("MissingInput"));
}

#[test]
fn nonexistent_input_path_is_input_not_found() {
    let env = TestEnv::new();

    let result = env.primitive(
        "validate-vector",
        &json!({"features": "nowhere.geojson"}),
        "out.geojson",
        &json!({}),
    );

    assert_eq!(result.error().as_deref(), Some("InputNotFound"));
}

#[test]
fn file_and_inline_arguments_are_equivalent() {
    let env = TestEnv::new();
    parks(&env);
    let inputs = env.write("inputs.json", r#"{"features": "parks.geojson"}"#);
    let params = env.write("params.json", r#"{"id_field": "name"}"#);

    let from_files = env.run(&[
        "validate-vector",
        inputs.to_str().unwrap(),
        "a.geojson",
        params.to_str().unwrap(),
    ]);
    let inline = env.run(&[
        "validate-vector",
        r#"{"features": "parks.geojson"}"#,
        "b.geojson",
        r#"{"id_field": "name"}"#,
    ]);

    assert_eq!(from_files.envelope(), inline.envelope());
    assert_eq!(env.read("a.geojson"), env.read("b.geojson"));
}

#[test]
fn diagnostics_stay_off_stdout() {
    let env = TestEnv::new().with_env("CANOPY_LOG", "debug");
    parks(&env);

    let result = env.primitive(
        "validate-vector",
        &json!({"features": "parks.geojson"}),
        "out.geojson",
        &json!({}),
    );

    assert_eq!(result.status(), "success");
    assert!(!result.stderr.is_empty(), "debug logging should reach stderr");
}

#[test]
fn version_flag_exits_zero() {
    let env = TestEnv::new();

    let result = env.run(&["--version"]);

    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.contains(env!("CARGO_PKG_VERSION")));
}
