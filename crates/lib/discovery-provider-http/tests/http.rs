//! Tests for the HTTP discovery provider.

use discovery_provider_core::DiscoveryProvider as _;
use discovery_provider_http::{Error, HttpDiscoveryProvider, ParseError, parse_services};
use httpmock::prelude::*;

const SERVICES_JSON: &str = include_str!("fixtures/services.json");

fn provider_for(server: &MockServer) -> HttpDiscoveryProvider {
    let endpoint = url::Url::parse(&server.url("/discovery/v1.0/me/")).unwrap();
    HttpDiscoveryProvider::new(reqwest::Client::new(), &endpoint).unwrap()
}

#[test]
fn services_url_is_under_configured_endpoint() {
    let endpoint = url::Url::parse("https://api.office.com/discovery/v1.0/me").unwrap();

    let provider = HttpDiscoveryProvider::new(reqwest::Client::new(), &endpoint).unwrap();

    assert_eq!(
        provider.services_url().as_str(),
        "https://api.office.com/discovery/v1.0/me/services"
    );
}

#[test]
fn parses_service_listing() {
    let records = parse_services(SERVICES_JSON.as_bytes()).unwrap();

    assert_eq!(records.len(), 4);
    let my_files = &records["MyFiles"];
    assert_eq!(
        my_files.service_endpoint().as_str(),
        "https://contoso-my.sharepoint.com/_api/v1.0/me"
    );
    assert_eq!(
        my_files.service_resource_id(),
        "https://contoso-my.sharepoint.com/"
    );
    assert_eq!(my_files.api_version(), "v1.0");
}

#[test]
fn rejects_invalid_endpoint() {
    let body = r#"{"value":[{"capability":"Mail","serviceEndpointUri":"outlook","serviceResourceId":"https://outlook.office365.com/","serviceApiVersion":"v1.0"}]}"#;

    let error = parse_services(body.as_bytes()).unwrap_err();

    assert!(matches!(
        error,
        ParseError::InvalidRecord { ref capability, .. } if capability == "Mail"
    ));
}

#[test]
fn rejects_duplicate_capability() {
    let entry = r#"{"capability":"Mail","serviceEndpointUri":"https://outlook.office365.com/api/v1.0","serviceResourceId":"https://outlook.office365.com/","serviceApiVersion":"v1.0"}"#;
    let body = format!(r#"{{"value":[{entry},{entry}]}}"#);

    let error = parse_services(body.as_bytes()).unwrap_err();

    assert!(matches!(error, ParseError::DuplicateCapability(ref name) if name == "Mail"));
}

#[test]
fn rejects_non_listing_json() {
    let error = parse_services(br#"{"error":"unauthorized"}"#).unwrap_err();

    assert!(matches!(error, ParseError::Json(_)));
}

#[tokio::test]
async fn discovers_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/discovery/v1.0/me/services")
                .header("authorization", "Bearer discovery-token")
                .header("accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(SERVICES_JSON);
        })
        .await;

    let records = provider_for(&server)
        .discover_all("discovery-token")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 4);
    assert!(records.contains_key("Mail"));
}

#[tokio::test]
async fn unauthorized_response_is_status_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/discovery/v1.0/me/services");
            then.status(401).body("Unauthorized");
        })
        .await;

    let error = provider_for(&server)
        .discover_all("expired-token")
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Status { status } if status == reqwest::StatusCode::UNAUTHORIZED
    ));
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/discovery/v1.0/me/services");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let error = provider_for(&server)
        .discover_all("discovery-token")
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Parse(ParseError::Json(_))));
}
