//! End-to-end tests for the `protoscribe` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary run from an empty directory with no ambient config or key
fn protoscribe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("protoscribe").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn scenario_args() -> Vec<&'static str> {
    vec![
        "generate",
        "--phase",
        "I",
        "--moa-category",
        "checkpoint inhibitor",
        "--specific-moa",
        "anti-PD-1 antibody",
        "--cancer-type",
        "NSCLC",
        "--subtype",
        "squamous",
        "--length-limit",
        "500",
    ]
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

#[test]
fn test_generate_without_api_key_fails_fast() {
    let dir = TempDir::new().unwrap();
    protoscribe(&dir)
        .args(scenario_args())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API key configured"))
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_generate_with_missing_fields_reports_them() {
    let dir = TempDir::new().unwrap();
    protoscribe(&dir)
        .env("OPENAI_API_KEY", "sk-test")
        .args(["generate", "--phase", "II", "--cancer-type", "NSCLC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please fill in all the fields: MOA Category, Specific MOA, Subtype",
        ));
}

#[test]
fn test_out_of_range_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("protoscribe.yaml"),
        "generation:\n  temperature: 3.0\n",
    )
    .unwrap();

    protoscribe(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("generation.temperature"));
}

#[test]
fn test_config_show_redacts_api_key() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("protoscribe.json"),
        r#"{"provider": {"api_key": "sk-secret-value"}, "models": {"refinement": "gpt-4o"}}"#,
    )
    .unwrap();

    protoscribe(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("gpt-4o"))
        .stdout(predicate::str::contains("sk-secret-value").not());
}

#[test]
fn test_config_path_points_at_discovered_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".protoscribe.yml"), "models: {}\n").unwrap();

    protoscribe(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".protoscribe.yml"));
}

#[test]
fn test_auth_status_reports_env_key() {
    let dir = TempDir::new().unwrap();
    protoscribe(&dir)
        .env("OPENAI_API_KEY", "sk-proj-abcdefgh1234")
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-...1234"))
        .stdout(predicate::str::contains("OPENAI_API_KEY"))
        .stdout(predicate::str::contains("abcdefgh").not());
}

#[test]
fn test_auth_status_without_key() {
    let dir = TempDir::new().unwrap();
    protoscribe(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_runs_both_passes_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Refined section.")))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("protoscribe.json"),
        json!({"provider": {"base_url": server.uri(), "api_key": "sk-test"}}).to_string(),
    )
    .unwrap();
    let out = dir.path().join("section.md");

    let mut args = scenario_args();
    args.extend(["--json", "--out", "section.md"]);

    let output = protoscribe(&dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let session: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(session["current_text"], "Refined section.");
    assert_eq!(session["history"][0]["title"], "Use in Pregnancy");

    let written = std::fs::read_to_string(out).unwrap();
    assert_eq!(written, "# Use in Pregnancy\n\nRefined section.\n");
}
