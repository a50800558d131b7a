//! Integration tests for the `starmap` CLI binary.
//!
//! These cover argument parsing, offline queries against mapping files,
//! config round-trips and one query against a mock server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `starmap` binary with env isolation.
///
/// Clears all `STARMAP_*` env vars and points config directories at a
/// temporary path so tests never touch the user's real configuration.
fn starmap_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("starmap");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("STARMAP_PROFILE")
        .env_remove("STARMAP_URL")
        .env_remove("STARMAP_API_VERSION")
        .env_remove("STARMAP_CONFIG")
        .env_remove("STARMAP_MAPPINGS")
        .env_remove("STARMAP_OUTPUT")
        .env_remove("STARMAP_INSECURE")
        .env_remove("STARMAP_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn destination(id: &str) -> Value {
    json!({
        "architecture": "x86_64",
        "destination": id,
        "overwrite": true,
        "restrict_version": false
    })
}

fn v1_mappings() -> Value {
    json!([{
        "name": "sample-product",
        "workflow": "stratosphere",
        "mappings": {
            "aws-na": [destination("ffffffff-ffff-ffff-ffff-ffffffffffff")],
            "aws-emea": [destination("00000000-0000-0000-0000-000000000000")]
        }
    }])
}

fn v2_mappings() -> Value {
    json!([{
        "name": "sample-product",
        "workflow": "community",
        "cloud": "aws",
        "billing-code-config": {
            "sample-hourly": {
                "codes": ["bp-6fa54006"],
                "image_name": "sample",
                "image_types": ["hourly"],
                "name": "Hourly2"
            }
        },
        "mappings": {
            "aws-na": {
                "provider": "AWS",
                "destinations": [destination("test-dest-1")]
            }
        }
    }])
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = starmap_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    starmap_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("StArMap")
                .and(predicate::str::contains("query"))
                .and(predicate::str::contains("policies"))
                .and(predicate::str::contains("destination")),
        );
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    starmap_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_api_version_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let output = starmap_cmd(home.path())
        .args(["--api-version", "v3", "policies"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Without a server ────────────────────────────────────────────────

#[test]
fn test_query_without_server_or_mappings() {
    let home = TempDir::new().unwrap();
    starmap_cmd(home.path())
        .args(["query", "sample-product-8.0-1.raw.xz"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No StArMap server configured"));
}

#[test]
fn test_offline_v1_query_plain() {
    let home = TempDir::new().unwrap();
    let mappings = write_json(&home, "v1.json", &v1_mappings());

    starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args([
            "--offline",
            "-o",
            "plain",
            "query",
            "sample-product-8.0-1.raw.xz",
            "-w",
            "stratosphere",
        ])
        .assert()
        .success()
        .stdout(
            "ffffffff-ffff-ffff-ffff-ffffffffffff\n00000000-0000-0000-0000-000000000000\n",
        );
}

#[test]
fn test_offline_miss_is_not_found() {
    let home = TempDir::new().unwrap();
    let mappings = write_json(&home, "v1.json", &v1_mappings());

    starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args(["--offline", "query", "--name", "other-product", "-w", "community"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_offline_v2_query_json_and_classic() {
    let home = TempDir::new().unwrap();
    let mappings = write_json(&home, "v2.json", &v2_mappings());

    let output = starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args([
            "--offline",
            "--api-version",
            "v2",
            "-o",
            "json-compact",
            "query",
            "--name",
            "sample-product",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let v2: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v2[0]["cloud"], "aws");
    assert_eq!(
        v2[0]["mappings"]["aws-na"]["destinations"][0]["provider"],
        "AWS"
    );

    let output = starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args([
            "--offline",
            "--api-version",
            "v2",
            "-o",
            "json-compact",
            "query",
            "--name",
            "sample-product",
            "--classic",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let classic: Value = serde_json::from_slice(&output.stdout).unwrap();
    let meta = &classic[0]["mappings"]["aws-na"][0]["meta"];
    assert_eq!(
        meta["billing-code-config"]["sample-hourly"]["codes"],
        json!(["bp-6fa54006"])
    );
}

#[test]
fn test_mappings_file_for_wrong_api_version() {
    let home = TempDir::new().unwrap();
    let mappings = write_json(&home, "v2.json", &v2_mappings());

    starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args(["--offline", "query", "--name", "sample-product"])
        .assert()
        .code(6);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_then_show() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("starmap.toml");

    starmap_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "url", "https://starmap.example.com"])
        .assert()
        .success();
    starmap_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "api_version", "v2"])
        .assert()
        .success();

    starmap_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("url = \"https://starmap.example.com\""))
                .and(predicate::str::contains("api_version = \"v2\"")),
        );

    starmap_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout("default *\n");
}

#[test]
fn test_config_rejects_unknown_key_and_profile() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("starmap.toml");

    starmap_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(6);

    starmap_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "use", "prod"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Profile 'prod' not found"));
}

#[test]
fn test_env_overrides_apply_without_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("absent.toml");

    starmap_cmd(home.path())
        .env("STARMAP_DEFAULTS__API_VERSION", "v2")
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_version = \"v2\""));
}

// ── Against a server ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_query_against_server() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .and(query_param("name", "sample-product"))
        .respond_with(ResponseTemplate::new(200).set_body_json(v1_mappings()[0].clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/policy/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
        .mount(&server)
        .await;

    let uri = server.uri();
    let home = TempDir::new().unwrap();
    starmap_cmd(home.path())
        .args(["--url", uri.as_str(), "-o", "plain"])
        .args(["query", "--name", "sample-product"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ffffffff-ffff-ffff-ffff-ffffffffffff"));

    starmap_cmd(home.path())
        .args(["--url", uri.as_str(), "policy", "missing"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Policy 'missing' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_by_name_and_image_version() {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .and(query_param("name", "sample-product"))
        .and(query_param("version", "8.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(v1_mappings()[0].clone()))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let home = TempDir::new().unwrap();
    starmap_cmd(home.path())
        .args(["--url", uri.as_str(), "-o", "plain"])
        .args(["query", "--name", "sample-product", "--image-version", "8.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("00000000-0000-0000-0000-000000000000"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_policy_mappings_alongside_mappings_file() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/policy/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "name": "sample-product",
            "workflow": "stratosphere",
            "mappings": [{
                "id": "m1",
                "marketplace_account": "aws-na",
                "destinations": [destination("ffffffff-ffff-ffff-ffff-ffffffffffff")]
            }]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let home = TempDir::new().unwrap();
    let mappings = write_json(&home, "v1.json", &v1_mappings());

    starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args(["--url", uri.as_str(), "-o", "plain"])
        .args(["policy", "abc", "--list-mappings"])
        .assert()
        .success()
        .stdout("m1\n");

    starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args(["--url", uri.as_str(), "-o", "plain", "policy", "abc"])
        .assert()
        .success()
        .stdout("abc\n");

    // Offline, policies are never answered from the mappings file.
    starmap_cmd(home.path())
        .arg("--mappings")
        .arg(&mappings)
        .args(["--url", uri.as_str(), "--offline", "policy", "abc"])
        .assert()
        .code(4);
}
