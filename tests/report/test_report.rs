use ap_validator::core::app_package::checks::{IssueSeverity, RuleId};
use ap_validator::core::app_package::report::{ReportFormat, ValidationReport};
use ap_validator::core::app_package::runner::{RunOptions, ValidationRunner};
use ap_validator::core::app_package::structural::StructuralOutcome;
use ap_validator::core::AppPackage;
use insta::assert_snapshot;

const WATER_BODIES: &str = include_str!("../fixtures/app-water-bodies.cwl");
const UNSUPPORTED: &str = include_str!("../fixtures/unsupported.cwl");

fn run(text: &str, entry_point: Option<&str>) -> ValidationReport {
    let package = AppPackage::from_text(text).unwrap();
    let runner = ValidationRunner::new(RunOptions {
        entry_point: entry_point.map(str::to_string),
        structural: None,
    });
    runner.run("fixture.cwl", &package)
}

#[test]
fn scoped_water_bodies_renders_compliant_text() {
    let mut report = run(WATER_BODIES, Some("water_bodies"));
    report.source_sha256 = "[sha256]".to_string();

    assert_snapshot!(report.render_text().trim_end(), @r###"
    Application Package validation report
    Source: fixture.cwl
    Entry point: water_bodies
    SHA-256: [sha256]

    Structural validation: skipped

    PASS req-7
    PASS req-8
    PASS req-9
    PASS req-10
    PASS req-11
      hint: Missing optional element for Workflow 'water_bodies': citation
      hint: Missing optional element for Workflow 'water_bodies': contributor
      hint: Missing optional element for Workflow 'water_bodies': releaseNotes

    Result: COMPLIANT
    "###);
}

#[test]
fn hints_never_affect_validity() {
    let report = run(WATER_BODIES, Some("water_bodies"));
    assert!(report.is_valid());
    assert_eq!(report.issues_with_severity(IssueSeverity::Hint).len(), 3);
    assert!(report.issues_with_severity(IssueSeverity::Error).is_empty());
}

#[test]
fn unscoped_water_bodies_fails_on_input_labels() {
    let report = run(WATER_BODIES, None);
    assert!(!report.is_valid());
    assert_eq!(report.issues_for_rule(RuleId::Req10).len(), 4);
    assert!(!report.rule_passed(RuleId::Req10));
    assert!(report.rule_passed(RuleId::Req11));

    let text = report.render_text();
    assert!(text.contains("FAIL req-10\n"));
    assert!(text.ends_with("Result: NOT COMPLIANT\n"));
}

#[test]
fn grouping_keeps_rule_order_and_passing_rules() {
    let report = run(WATER_BODIES, None);
    let grouped = report.grouped_by_rule();
    assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), RuleId::ALL.to_vec());
    assert!(grouped[&RuleId::Req7].is_empty());
    assert_eq!(grouped[&RuleId::Req10].len(), 4);
    assert_eq!(grouped[&RuleId::Req11].len(), 6);
}

#[test]
fn unsupported_construct_blocks_an_otherwise_clean_report() {
    let report = run(UNSUPPORTED, Some("main"));
    assert!(report
        .issues_with_severity(IssueSeverity::Error)
        .is_empty());
    assert_eq!(report.blocking.len(), 1);
    assert!(!report.is_valid());

    let text = report.render_text();
    assert!(text.contains("Blocking failures:\n  [AP-UNSUPPORTED-001]"));
    assert!(text.contains("    - CommandLineTool 'writes_elsewhere'\n"));
}

#[test]
fn failed_structural_run_is_reported_verbatim() {
    let mut report = run(UNSUPPORTED, Some("clean"));
    assert!(report.is_valid());

    report.record_structural(StructuralOutcome {
        exit_code: 1,
        stdout: String::new(),
        stderr: "app-package.cwl:3:1: Object `main` is not valid\n".to_string(),
    });
    assert!(!report.is_valid());

    let text = report.render_text();
    assert!(text.contains("Structural validation: failed (exit code 1)\n--- stderr ---\napp-package.cwl:3:1: Object `main` is not valid\n"));
    assert!(!text.contains("--- stdout ---"));
}

#[test]
fn json_rendering_carries_rule_ids_and_verdict() {
    let report = run(WATER_BODIES, None);
    let json: serde_json::Value =
        serde_json::from_str(&report.render(ReportFormat::Json).unwrap()).unwrap();

    assert_eq!(json["source"], "fixture.cwl");
    assert_eq!(json["entry_point"], serde_json::Value::Null);
    assert_eq!(json["valid"], false);
    assert_eq!(json["rules"][0], "req-7");
    assert_eq!(json["issues"][0]["rule"], "req-10");
    assert_eq!(json["issues"][0]["severity"], "error");
    assert_eq!(json["source_sha256"].as_str().map(str::len), Some(64));
    assert!(json["structural"].is_null());
}

#[test]
fn digest_tracks_the_raw_text() {
    let first = run(WATER_BODIES, None);
    let second = run(&format!("{}\n# trailing comment\n", WATER_BODIES), None);
    assert_ne!(first.source_sha256, second.source_sha256);
    assert_eq!(first.issues, second.issues);
}
