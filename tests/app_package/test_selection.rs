use ap_validator::core::AppPackage;

const WATER_BODIES: &str = include_str!("../fixtures/app-water-bodies.cwl");

fn tool_ids(package: &AppPackage, entry_point: Option<&str>) -> Vec<String> {
    package
        .select(entry_point)
        .command_line_tools()
        .iter()
        .filter_map(|tool| tool.local_id().map(str::to_string))
        .collect()
}

#[test]
fn entry_point_reaches_tools_through_subworkflows() {
    let package = AppPackage::from_text(WATER_BODIES).unwrap();
    assert_eq!(
        tool_ids(&package, Some("water_bodies")),
        vec!["crop", "norm_diff", "otsu", "stac"]
    );
}

#[test]
fn subworkflow_entry_point_excludes_parent_steps() {
    let package = AppPackage::from_text(WATER_BODIES).unwrap();
    assert_eq!(
        tool_ids(&package, Some("detect_water_body")),
        vec!["crop", "norm_diff", "otsu"]
    );
}

#[test]
fn entry_point_selects_a_single_workflow() {
    let package = AppPackage::from_text(WATER_BODIES).unwrap();
    let selection = package.select(Some("water_bodies"));
    let ids: Vec<_> = selection
        .workflows()
        .iter()
        .filter_map(|w| w.local_id())
        .collect();
    assert_eq!(ids, vec!["water_bodies"]);
    assert_eq!(
        selection.selected_workflow().and_then(|w| w.label.as_deref()),
        Some("Water bodies detection based on NDWI and otsu threshold")
    );
    assert_eq!(selection.entry_point(), Some("water_bodies"));
}

#[test]
fn no_entry_point_selects_everything() {
    let package = AppPackage::from_text(WATER_BODIES).unwrap();
    let selection = package.select(None);
    assert_eq!(selection.workflows().len(), 2);
    assert_eq!(selection.command_line_tools().len(), 4);
    assert!(selection.selected_workflow().is_none());
    assert!(selection.missing_entry_point().is_none());
}

#[test]
fn hash_prefixed_ids_match_bare_entry_points() {
    let package = AppPackage::from_text(
        r##"
$graph:
  - class: Workflow
    id: "#main"
    steps:
      - id: "#main/run"
        run: "#tool"
  - class: CommandLineTool
    id: "#tool"
"##,
    )
    .unwrap();
    assert_eq!(tool_ids(&package, Some("main")), vec!["tool"]);
}

#[test]
fn selection_is_repeatable() {
    let package = AppPackage::from_text(WATER_BODIES).unwrap();
    let first = tool_ids(&package, Some("water_bodies"));
    let second = tool_ids(&package, Some("water_bodies"));
    assert_eq!(first, second);
}
