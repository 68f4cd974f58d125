use assert_cmd::Command;
use auditgate_test_util::{TIMESTAMP_PLACEHOLDER, VERSION_PLACEHOLDER, normalize_nondeterministic};
use predicates::prelude::*;
use std::path::Path;

const CONFIG: &str = r#"
accounts = ["softdevteam"]
skip_repos = [{ owner = "softdevteam", name = "archived-thing" }]

[[skip_advisories]]
repository = "*"
package = "chrono"
advisory = "RUSTSEC-2020-0159"
expires = "2023-03-01"
reason = "waiting on upstream"

[[skip_advisories]]
repository = "yksom"
package = "time"
advisory = "RUSTSEC-2020-0071"
expires = "2030-01-01"
"#;

#[allow(deprecated)]
fn auditgate() -> Command {
    Command::cargo_bin("auditgate").expect("auditgate binary")
}

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write fixture");
    path
}

/// Produce a report on disk by running with an unusable token file.
fn runtime_error_report(dir: &Path) -> std::path::PathBuf {
    let config = write(dir, "auditgate.toml", CONFIG);
    let report = dir.join("out").join("report.json");
    auditgate()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--token-file")
        .arg(dir.join("missing-token"))
        .arg("--today")
        .arg("2023-02-01")
        .arg("--report-out")
        .arg(&report)
        .assert()
        .code(1);
    report
}

#[test]
fn help_works() {
    auditgate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-config"))
        .stdout(predicate::str::contains("install-scanner"));
}

#[test]
fn run_help_lists_flags() {
    auditgate()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--token-file"))
        .stdout(predicate::str::contains("--fail-on-unused-exceptions"));
}

#[test]
fn run_requires_a_token_file() {
    auditgate()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token-file"));
}

#[test]
fn explain_known_code() {
    auditgate()
        .args(["explain", "expired_exception"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remediation"))
        .stdout(predicate::str::contains("Before"));
}

#[test]
fn explain_unknown_code_lists_alternatives() {
    auditgate()
        .args(["explain", "no_such_thing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown check_id or code: no_such_thing"))
        .stderr(predicate::str::contains("unused_exception"));
}

#[test]
fn check_config_lists_exception_status() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write(dir.path(), "auditgate.toml", CONFIG);

    auditgate()
        .arg("--config")
        .arg(&config)
        .args(["check-config", "--today", "2023-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("accounts: softdevteam"))
        .stdout(predicate::str::contains("skipped repositories: 1"))
        .stdout(predicate::str::contains(
            "expired (*, chrono, RUSTSEC-2020-0159) until 2023-03-01 (waiting on upstream)",
        ))
        .stdout(predicate::str::contains(
            "active  (yksom, time, RUSTSEC-2020-0071) until 2030-01-01",
        ));
}

#[test]
fn check_config_rejects_bad_dates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write(
        dir.path(),
        "auditgate.toml",
        r#"
accounts = ["softdevteam"]

[[skip_advisories]]
repository = "*"
package = "chrono"
advisory = "RUSTSEC-2020-0159"
expires = "next spring"
"#,
    );

    auditgate()
        .arg("--config")
        .arg(&config)
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("next spring"));
}

#[test]
fn check_config_missing_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    auditgate()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn run_with_missing_token_writes_error_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = runtime_error_report(dir.path());

    let text = std::fs::read_to_string(&report).expect("report written");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    let value = normalize_nondeterministic(value);

    assert_eq!(value["schema"], "auditgate.report.v1");
    assert_eq!(value["tool"]["name"], "auditgate");
    assert_eq!(value["tool"]["version"], VERSION_PLACEHOLDER);
    assert_eq!(value["started_at"], TIMESTAMP_PLACEHOLDER);
    assert_eq!(value["today"], "2023-02-01");
    assert_eq!(value["verdict"], "fail");
    assert_eq!(value["findings"][0]["check_id"], "tool.runtime");
    assert!(
        value["findings"][0]["message"]
            .as_str()
            .expect("message")
            .contains("read token file")
    );
}

#[test]
fn run_with_empty_token_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write(dir.path(), "auditgate.toml", CONFIG);
    let token = write(dir.path(), "token", "  \n");

    auditgate()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--token-file")
        .arg(&token)
        .arg("--report-out")
        .arg(dir.path().join("report.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn md_renders_a_written_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = runtime_error_report(dir.path());

    auditgate()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# auditgate report"))
        .stdout(predicate::str::contains("runtime_error"));

    let out = dir.path().join("md").join("comment.md");
    auditgate()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert!(std::fs::read_to_string(out).expect("md written").contains("auditgate report"));
}

#[test]
fn annotations_render_a_written_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = runtime_error_report(dir.path());

    auditgate()
        .arg("annotations")
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("::error"))
        .stdout(predicate::str::contains("tool.runtime"));

    auditgate()
        .arg("annotations")
        .arg("--report")
        .arg(&report)
        .args(["--max", "0"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn md_rejects_foreign_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let report = write(dir.path(), "report.json", r#"{"schema": "something.else"}"#);

    auditgate()
        .arg("md")
        .arg("--report")
        .arg(&report)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report schema"));
}
