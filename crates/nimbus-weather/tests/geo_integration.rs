//! Integration tests for GeoResolver using wiremock.
//!
//! Both hops (own-IP, IP-to-geo) are served by the same mock server.
#![allow(clippy::unwrap_used)]

use nimbus_core::NetworkError;
use nimbus_weather::{GeoResolver, Location, ResolutionError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_for(server: &MockServer) -> GeoResolver {
    GeoResolver::new(
        format!("{}/ip", server.uri()),
        server.uri(),
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn mount_own_ip(server: &MockServer, ip: &str) {
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ip": ip })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolve_current_location_success() {
    let mock_server = MockServer::start().await;
    mount_own_ip(&mock_server, "1.2.3.4").await;

    Mock::given(method("GET"))
        .and(path("/1.2.3.4/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "1.2.3.4",
            "city": "Paris",
            "region": "Île-de-France",
            "country_name": "France",
            "latitude": "48.85",
            "longitude": "2.35"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let location = resolver_for(&mock_server)
        .resolve_current_location()
        .await
        .unwrap();

    assert_eq!(location, Location::new("Paris", 48.85, 2.35));
}

#[tokio::test]
async fn test_numeric_coordinates_are_accepted() {
    let mock_server = MockServer::start().await;
    mount_own_ip(&mock_server, "2001:db8::1").await;

    Mock::given(method("GET"))
        .and(path("/2001:db8::1/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Oslo",
            "latitude": 59.91,
            "longitude": 10.75
        })))
        .mount(&mock_server)
        .await;

    let location = resolver_for(&mock_server)
        .resolve_current_location()
        .await
        .unwrap();

    assert_eq!(location, Location::new("Oslo", 59.91, 10.75));
}

#[tokio::test]
async fn test_geo_lookup_server_error() {
    let mock_server = MockServer::start().await;
    mount_own_ip(&mock_server, "1.2.3.4").await;

    Mock::given(method("GET"))
        .and(path("/1.2.3.4/json/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = resolver_for(&mock_server).resolve_current_location().await;

    assert!(matches!(
        result,
        Err(ResolutionError::Network(NetworkError::ServerError { status: 500, .. }))
    ));
}

#[tokio::test]
async fn test_own_ip_failure_skips_geo_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    // Any second hop would hit this and fail the expectation
    Mock::given(method("GET"))
        .and(path("/1.2.3.4/json/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = resolver_for(&mock_server).resolve_current_location().await;

    assert!(matches!(
        result,
        Err(ResolutionError::Network(NetworkError::ServerError { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_own_ip_service_unreachable() {
    let unreachable = {
        let server = MockServer::start().await;
        server.uri()
    };

    let resolver = GeoResolver::new(
        format!("{}/ip", unreachable),
        unreachable.clone(),
        Duration::from_secs(2),
    )
    .unwrap();

    let result = resolver.resolve_current_location().await;

    assert!(matches!(result, Err(ResolutionError::Network(_))));
}

#[tokio::test]
async fn test_garbage_ip_is_invalid_response() {
    let mock_server = MockServer::start().await;
    mount_own_ip(&mock_server, "not-an-ip").await;

    let result = resolver_for(&mock_server).resolve_current_location().await;

    assert!(matches!(
        result,
        Err(ResolutionError::Network(NetworkError::InvalidResponse(_)))
    ));
}

#[tokio::test]
async fn test_missing_latitude_yields_no_location() {
    let mock_server = MockServer::start().await;
    mount_own_ip(&mock_server, "1.2.3.4").await;

    Mock::given(method("GET"))
        .and(path("/1.2.3.4/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Paris",
            "longitude": "2.35"
        })))
        .mount(&mock_server)
        .await;

    let result = resolver_for(&mock_server).resolve_current_location().await;

    assert!(matches!(result, Err(ResolutionError::IncompleteData("latitude"))));
}

#[tokio::test]
async fn test_rate_limited_payload_yields_no_location() {
    let mock_server = MockServer::start().await;
    mount_own_ip(&mock_server, "1.2.3.4").await;

    Mock::given(method("GET"))
        .and(path("/1.2.3.4/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": true,
            "reason": "RateLimited"
        })))
        .mount(&mock_server)
        .await;

    let result = resolver_for(&mock_server).resolve_current_location().await;

    assert!(matches!(result, Err(ResolutionError::IncompleteData("city"))));
}
