use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), nanos))
}

#[test]
fn help_lists_the_sink_option() {
    Command::cargo_bin("tracker-report")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--sink"))
        .stdout(predicate::str::contains("--config-dir"));
}

#[test]
fn missing_config_is_reported() {
    let dir = unique_dir("tracker_report_cli_missing");
    Command::cargo_bin("tracker-report")
        .expect("binary")
        .env_remove("GOOGLE_ACCESS_TOKEN")
        .args(["--sink", "dry-run", "--config-dir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn incomplete_credentials_are_fatal() {
    let dir = unique_dir("tracker_report_cli_creds");
    std::fs::create_dir_all(&dir).expect("create temp dir");
    std::fs::write(
        dir.join("config.json"),
        r#"{"filterId": "42", "trackerUrl": "http://127.0.0.1:9"}"#,
    )
    .expect("write config");
    std::fs::write(dir.join("jira_credentials.json"), r#"{"user_name": "jdoe"}"#)
        .expect("write credentials");

    Command::cargo_bin("tracker-report")
        .expect("binary")
        .args(["--sink", "dry-run", "--config-dir"])
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("jira_credentials.json"));

    let _ = std::fs::remove_dir_all(&dir);
}
