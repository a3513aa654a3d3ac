//! Integration tests for WeatherClient using wiremock.
#![allow(clippy::unwrap_used)]

use nimbus_core::{AppError, NetworkError};
use nimbus_weather::{OneFormatValue, TwoFormatValue, WeatherClient, WeatherError};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "test-owm-key";

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::new(server.uri(), TEST_KEY, Duration::from_secs(5)).unwrap()
}

/// Helper to create an OpenWeatherMap current-weather body
fn owm_body(temp: f64, temp_min: f64, temp_max: f64, feels_like: f64, humidity: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": {
            "temp": temp,
            "feels_like": feels_like,
            "temp_min": temp_min,
            "temp_max": temp_max,
            "pressure": 1012,
            "humidity": humidity
        },
        "name": "Paris",
        "cod": 200
    })
}

#[tokio::test]
async fn test_current_weather_is_normalized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lon", "2.35"))
        .and(query_param("appid", TEST_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(owm_body(300.0, 295.0, 305.0, 298.0, 60.0)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = client_for(&mock_server)
        .get_current_weather(48.85, 2.35)
        .await
        .unwrap();

    assert_eq!(snapshot.temperature, TwoFormatValue::celsius(27));
    assert_eq!(snapshot.temperature.short, "27°");
    assert_eq!(snapshot.temperature.long, "27°C");
    assert_eq!(snapshot.min_temperature.raw, 22);
    assert_eq!(snapshot.max_temperature.raw, 32);
    assert_eq!(snapshot.feels_like.raw, 25);
    assert_eq!(snapshot.humidity, OneFormatValue::percent(60.0));
    assert_eq!(snapshot.humidity.formatted, "60%");
}

#[tokio::test]
async fn test_freezing_point_reads_zero() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(owm_body(273.15, 273.15, 273.15, 273.15, 80.0)),
        )
        .mount(&mock_server)
        .await;

    let snapshot = client_for(&mock_server)
        .fetch_current(59.91, 10.75)
        .await
        .unwrap();

    assert_eq!(snapshot.temperature.long, "0°C");
    assert_eq!(snapshot.feels_like.short, "0°");
}

#[tokio::test]
async fn test_unauthorized_yields_no_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.get_current_weather(48.85, 2.35).await.is_none());

    let err = client.fetch_current(48.85, 2.35).await.unwrap_err();
    assert!(matches!(
        err,
        WeatherError::Network(NetworkError::ServerError { status: 401, .. })
    ));
    assert!(matches!(
        AppError::from(err),
        AppError::Weather(nimbus_core::WeatherError::InvalidApiKey)
    ));
}

#[tokio::test]
async fn test_error_text_does_not_leak_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch_current(48.85, 2.35).await.unwrap_err();

    assert!(!err.to_string().contains(TEST_KEY));
    assert!(!format!("{:?}", client).contains(TEST_KEY));
}

#[tokio::test]
async fn test_missing_main_block_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "coord": { "lon": 2.35, "lat": 48.85 },
            "name": "Paris"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch_current(48.85, 2.35).await.unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));

    assert!(client.get_current_weather(48.85, 2.35).await.is_none());
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .fetch_current(48.85, 2.35)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(owm_body(300.0, 295.0, 305.0, 298.0, 60.0))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(mock_server.uri(), TEST_KEY, Duration::from_millis(200)).unwrap();
    let err = client.fetch_current(48.85, 2.35).await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(NetworkError::Timeout)));
}
