use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "AP_VALIDATOR_STRUCTURAL_ENABLED",
    "AP_VALIDATOR_STRUCTURAL_COMMAND",
    "AP_VALIDATOR_ENTRY_POINT",
    "AP_VALIDATOR_REPORT_FORMAT",
    "AP_VALIDATOR_LOG_DIR",
    "RUST_LOG",
];

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

/// Binary running in an empty directory with a clean environment.
fn ap_validator(cwd: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ap-validator"));
    cmd.current_dir(cwd.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_commands() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("COMMANDS:"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("structure"));
}

#[test]
fn scoped_validation_is_compliant() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("app-water-bodies.cwl"))
        .args(["--entry-point", "water_bodies", "--skip-structural"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASS req-10"))
        .stdout(predicate::str::contains("Result: COMPLIANT"));
}

#[test]
fn unscoped_validation_is_not_compliant() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("app-water-bodies.cwl"))
        .arg("--skip-structural")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL req-10"))
        .stdout(predicate::str::contains(
            "error: Missing element for input 'aoi' of Workflow 'detect_water_body': label",
        ))
        .stdout(predicate::str::contains("Result: NOT COMPLIANT"));
}

#[test]
fn json_report_is_machine_readable() {
    let cwd = TempDir::new().unwrap();
    let output = ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("app-water-bodies.cwl"))
        .args(["--skip-structural", "--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["rules"].as_array().map(Vec::len), Some(5));
}

#[test]
fn entry_point_comes_from_config_file() {
    let cwd = TempDir::new().unwrap();
    fs::write(
        cwd.path().join("ap-validator.toml"),
        "[structural]\nenabled = false\n\n[checks]\nentry_point = \"water_bodies\"\n",
    )
    .unwrap();

    ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("app-water-bodies.cwl"))
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Entry point: water_bodies"))
        .stdout(predicate::str::contains("Structural validation: skipped"));
}

#[test]
fn unsupported_construct_fails_validation() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("unsupported.cwl"))
        .arg("--skip-structural")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[AP-UNSUPPORTED-001]"))
        .stdout(predicate::str::contains("CommandLineTool 'writes_elsewhere'"));
}

#[test]
fn stdin_source_is_read() {
    let cwd = TempDir::new().unwrap();
    let text = fs::read_to_string(fixture("app-water-bodies.cwl")).unwrap();
    ap_validator(&cwd)
        .args(["validate", "-", "-e", "water_bodies", "--skip-structural"])
        .write_stdin(text)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Source: <stdin>"));
}

#[test]
fn single_rule_check_honours_entry_point() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("check")
        .arg("req-10")
        .arg(fixture("app-water-bodies.cwl"))
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("FAIL req-10\n"));

    ap_validator(&cwd)
        .arg("check")
        .arg("req-10")
        .arg(fixture("app-water-bodies.cwl"))
        .args(["--entry-point", "water_bodies"])
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("PASS req-10\n"));
}

#[test]
fn unsupported_check_reports_the_error() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("check")
        .arg("unsupported")
        .arg(fixture("unsupported.cwl"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL unsupported"))
        .stderr(predicate::str::contains("[ERROR] AP-UNSUPPORTED-001"));
}

#[test]
fn unknown_rule_is_a_usage_failure() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .arg("check")
        .arg("req-99")
        .arg(fixture("app-water-bodies.cwl"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown rule 'req-99'"));
}

#[test]
fn missing_source_is_a_fatal_error() {
    let cwd = TempDir::new().unwrap();
    ap_validator(&cwd)
        .args(["validate", "does-not-exist.cwl", "--skip-structural"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("[FATAL] AP-FETCH-002"));
}

#[cfg(unix)]
#[test]
fn structural_validator_output_is_relayed() {
    let cwd = TempDir::new().unwrap();
    fs::write(
        cwd.path().join("ap-validator.toml"),
        "[structural]\ncommand = \"sh\"\nargs = [\"-c\", \"echo structure-report; echo bad-field >&2; exit 4\"]\n",
    )
    .unwrap();

    ap_validator(&cwd)
        .arg("structure")
        .arg(fixture("app-water-bodies.cwl"))
        .assert()
        .code(1)
        .stdout(predicate::str::diff("structure-report\n"))
        .stderr(predicate::str::contains("bad-field\n"));

    ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("app-water-bodies.cwl"))
        .arg("-e")
        .arg("water_bodies")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Structural validation: failed (exit code 4)",
        ))
        .stdout(predicate::str::contains("--- stdout ---\nstructure-report\n"));
}

#[test]
fn missing_structural_program_blocks_validation() {
    let cwd = TempDir::new().unwrap();
    fs::write(
        cwd.path().join("ap-validator.toml"),
        "[structural]\ncommand = \"ap-validator-test-no-such-program\"\n",
    )
    .unwrap();

    ap_validator(&cwd)
        .arg("validate")
        .arg(fixture("app-water-bodies.cwl"))
        .arg("-e")
        .arg("water_bodies")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[AP-VALIDATOR-001]"));
}
