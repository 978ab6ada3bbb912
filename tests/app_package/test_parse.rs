use ap_validator::core::app_package::schema::ProcessClass;
use ap_validator::core::{AppPackage, ErrorCategory};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn packed_document_is_classified_in_document_order() {
    let package = AppPackage::from_location(fixture_path("app-water-bodies.cwl").to_str().unwrap())
        .expect("fixture should load");

    assert_eq!(package.cwl_version(), Some("v1.0"));
    let workflows: Vec<_> = package.workflows().filter_map(|w| w.local_id()).collect();
    assert_eq!(workflows, vec!["water_bodies", "detect_water_body"]);
    let tools: Vec<_> = package
        .command_line_tools()
        .filter_map(|t| t.local_id())
        .collect();
    assert_eq!(tools, vec!["crop", "norm_diff", "otsu", "stac"]);
}

#[test]
fn raw_text_is_kept_verbatim() {
    let text = fs::read_to_string(fixture_path("app-water-bodies.cwl")).unwrap();
    let package = AppPackage::from_text(text.clone()).unwrap();
    assert_eq!(package.raw_text(), text);
}

#[test]
fn file_url_loads_like_a_path() {
    let path = fixture_path("unsupported.cwl");
    let url = url::Url::from_file_path(&path).unwrap();
    let package = AppPackage::from_location(url.as_str()).unwrap();
    assert_eq!(package.nodes().len(), 4);
}

#[test]
fn json_documents_are_accepted() {
    let package = AppPackage::from_text(
        r#"{"cwlVersion": "v1.2", "class": "CommandLineTool", "id": "echo", "baseCommand": "echo", "inputs": []}"#,
    )
    .unwrap();
    let tool = package.command_line_tools().next().unwrap();
    assert_eq!(tool.class, ProcessClass::CommandLineTool);
    assert_eq!(tool.base_command.as_deref(), Some(&["echo".to_string()][..]));
    assert_eq!(package.workflows().count(), 0);
}

#[test]
fn single_process_document_has_one_node() {
    let package = AppPackage::from_text("class: Workflow\nid: main\n").unwrap();
    assert_eq!(package.nodes().len(), 1);
    assert_eq!(package.find_workflow("main").and_then(|w| w.local_id()), Some("main"));
    assert!(package.find_workflow("other").is_none());
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = AppPackage::from_text("class: [Workflow\n").unwrap_err();
    assert_eq!(err.category, ErrorCategory::ParseError);
    assert_eq!(err.code, "AP-PARSE-001");
}

#[test]
fn non_mapping_root_is_a_parse_error() {
    let err = AppPackage::from_text("- class: Workflow\n").unwrap_err();
    assert_eq!(err.code, "AP-PARSE-002");
}

#[test]
fn unknown_class_is_a_parse_error() {
    let err = AppPackage::from_text("$graph:\n  - class: Pipeline\n").unwrap_err();
    assert_eq!(err.code, "AP-PARSE-003");
    assert!(err.message.contains("Pipeline"));
}

#[test]
fn missing_file_is_a_fetch_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.cwl");
    let err = AppPackage::from_location(missing.to_str().unwrap()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::FetchError);
    assert_eq!(err.code, "AP-FETCH-002");
}
