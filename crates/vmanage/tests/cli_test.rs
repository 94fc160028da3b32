//! Integration tests for the `vmanage` CLI binary.
//!
//! Parsing, help and error handling run without a controller; the
//! end-to-end cases drive the binary against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const PROFILES: &str = "/dataservice/v1/feature-profile/sdwan/policy-object";
const PREFIXES: &str =
    "/dataservice/v1/feature-profile/sdwan/policy-object/prof-a/security-data-ip-prefix";
const PARCEL: &str =
    "/dataservice/v1/feature-profile/sdwan/policy-object/prof-a/security-data-ip-prefix/p1";

/// Build a [`Command`] for the `vmanage` binary with env isolation.
///
/// Clears all `VMANAGE_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn vmanage_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vmanage");
    cmd.env("HOME", "/tmp/vmanage-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/vmanage-cli-test-nonexistent")
        .env("VMANAGE_CONFIG", "/tmp/vmanage-cli-test-nonexistent/config.toml")
        .env("NO_COLOR", "1")
        .env_remove("VMANAGE_PROFILE")
        .env_remove("VMANAGE_HOST")
        .env_remove("VMANAGE_USERNAME")
        .env_remove("VMANAGE_PASSWORD")
        .env_remove("VMANAGE_OUTPUT")
        .env_remove("VMANAGE_INSECURE")
        .env_remove("VMANAGE_CA_CERT")
        .env_remove("VMANAGE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Command pre-wired with credentials for `server`.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = vmanage_cmd();
    cmd.args(["--host", &server.uri(), "-u", "admin", "--password", "pw"]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "JSESSIONID=abc; Path=/"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok"))
        .mount(server)
        .await;
}

fn prefix_parcel(values: &[&str]) -> serde_json::Value {
    let entries: Vec<_> = values
        .iter()
        .map(|v| json!({ "ipPrefix": { "optionType": "global", "value": v } }))
        .collect();
    json!({
        "parcelId": "p1",
        "parcelType": "security-data-ip-prefix",
        "createdBy": "admin",
        "payload": { "name": "grp_servers", "data": { "entries": entries } }
    })
}

async fn mock_prefix_object(server: &MockServer, values: &[&str]) {
    Mock::given(method("GET"))
        .and(path(PROFILES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "profileId": "prof-a" }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(PREFIXES))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [prefix_parcel(values)] })),
        )
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = vmanage_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    vmanage_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("policy-groups"))
            .and(predicate::str::contains("ngfw"))
            .and(predicate::str::contains("prefixes")),
    );
}

#[test]
fn test_version_flag() {
    vmanage_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vmanage"));
}

#[test]
fn test_completions_bash() {
    vmanage_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_unknown_output_format_is_usage_error() {
    vmanage_cmd()
        .args(["devices", "list", "-o", "xml"])
        .assert()
        .code(2);
}

#[test]
fn test_expand_requires_cidrs() {
    vmanage_cmd()
        .args(["prefixes", "expand", "--name", "grp"])
        .assert()
        .code(2);
}

// ── Credentials ─────────────────────────────────────────────────────

#[test]
fn test_missing_credentials_exit_code() {
    let output = vmanage_cmd().args(["devices", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(
        text.contains("no controller host configured"),
        "unexpected output:\n{text}"
    );
}

#[test]
fn test_unknown_profile_is_reported() {
    let output = vmanage_cmd()
        .args(["--profile", "prod", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Profile 'prod' not found"));
}

#[test]
fn test_config_profiles_empty() {
    vmanage_cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}

// ── End to end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_login_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    against(&server).args(["devices", "list"]).assert().code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [
            { "host-name": "edge-1", "system-ip": "10.0.0.1", "device-model": "vedge-C8000V" }
        ] })))
        .mount(&server)
        .await;

    let output = against(&server)
        .args(["devices", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["host_name"], "edge-1");
    assert_eq!(parsed[0]["device_model"], "vedge-C8000V");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_prefixes_show_picks_from_piped_stdin() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_prefix_object(&server, &["10.1.1.10/32", "10.2.1.10/32"]).await;

    against(&server)
        .args(["prefixes", "show"])
        .write_stdin("9\n1\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("grp_servers")
                .and(predicate::str::contains("10.1.1.10/32"))
                .and(predicate::str::contains("10.2.1.10/32")),
        )
        .stderr(predicate::str::contains("Invalid selection, try again."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quiet_suppresses_selection_menu() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_prefix_object(&server, &["10.1.1.10/32"]).await;

    let output = against(&server)
        .args(["-q", "prefixes", "show"])
        .write_stdin("1\n")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(!text.contains("Prefix Name"), "menu printed in quiet mode:\n{text}");
    assert!(output.stdout.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_prefixes_expand_pushes_merged_list() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_prefix_object(&server, &["10.1.1.10/32"]).await;

    Mock::given(method("PUT"))
        .and(path(PARCEL))
        .and(body_json(json!({
            "name": "grp_servers",
            "data": { "entries": [
                { "ipPrefix": { "optionType": "global", "value": "10.1.1.10/32" } },
                { "ipPrefix": { "optionType": "global", "value": "10.1.1.11/32" } }
            ] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "parcelId": "p1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PARCEL))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(prefix_parcel(&["10.1.1.10/32", "10.1.1.11/32"])),
        )
        .mount(&server)
        .await;

    against(&server)
        .args([
            "--yes",
            "prefixes",
            "expand",
            "--name",
            "grp_servers",
            "10.1.0.0/16",
            "10.9.0.0/24",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.1.1.11/32"))
        .stderr(predicate::str::contains("Skipping 10.9.0.0/24"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_push_prints_body_and_fails() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_prefix_object(&server, &["10.1.1.10/32"]).await;
    Mock::given(method("PUT"))
        .and(path(PARCEL))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": { "message": "Duplicate prefix" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = against(&server)
        .args(["-y", "prefixes", "add", "1", "--prefix", "192.168.0.0/24"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Duplicate prefix"), "stdout:\n{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_refuses_when_piped() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_prefix_object(&server, &["10.1.1.10/32", "10.1.1.11/32"]).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = against(&server)
        .args(["prefixes", "delete", "1", "--positions", "2"])
        .write_stdin("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_rejects_invalid_prefix_before_pushing() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_prefix_object(&server, &[]).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    against(&server)
        .args(["-y", "prefixes", "add", "1", "--prefix", "10.0.0.0/40"])
        .assert()
        .code(2);
}
