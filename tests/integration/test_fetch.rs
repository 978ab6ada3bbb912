use ap_validator::core::app_package::fetch::fetch_document;
use ap_validator::core::{AppPackage, ErrorCategory};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WATER_BODIES: &str = include_str!("../fixtures/app-water-bodies.cwl");

#[tokio::test(flavor = "multi_thread")]
async fn remote_package_is_fetched_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/packages/app-water-bodies.cwl"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WATER_BODIES))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/packages/app-water-bodies.cwl", server.uri());
    let package = tokio::task::spawn_blocking(move || AppPackage::from_location(&url))
        .await
        .unwrap()
        .expect("remote package should load");

    assert_eq!(package.raw_text(), WATER_BODIES);
    assert_eq!(package.workflows().count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_error_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.cwl"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let url = format!("{}/missing.cwl", server.uri());
    let err = tokio::task::spawn_blocking(move || fetch_document(&url))
        .await
        .unwrap()
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::FetchError);
    assert_eq!(err.code, "AP-FETCH-001");
    assert!(err.message.contains("404"));
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_parse_failure_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.cwl"))
        .respond_with(ResponseTemplate::new(200).set_body_string("class: [Workflow\n"))
        .mount(&server)
        .await;

    let url = format!("{}/broken.cwl", server.uri());
    let err = tokio::task::spawn_blocking(move || AppPackage::from_location(&url))
        .await
        .unwrap()
        .unwrap_err();

    assert_eq!(err.category, ErrorCategory::ParseError);
}

#[test]
fn unreachable_host_is_a_fetch_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let err = fetch_document("http://127.0.0.1:9/app.cwl").unwrap_err();
    assert_eq!(err.category, ErrorCategory::FetchError);
    assert_eq!(err.code, "AP-FETCH-001");
}
