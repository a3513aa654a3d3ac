//! OpenWeatherMap current-conditions client.

use nimbus_core::{NetworkError, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::http;
use crate::types::{CurrentWeatherSnapshot, WeatherError};

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
}

/// Temperatures in Kelvin, humidity in percent
#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    feels_like: f64,
    humidity: f64,
}

impl From<OwmMain> for CurrentWeatherSnapshot {
    fn from(main: OwmMain) -> Self {
        CurrentWeatherSnapshot::from_kelvin(
            main.temp,
            main.temp_min,
            main.temp_max,
            main.feels_like,
            main.humidity,
        )
    }
}

#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

// Hand-written so the API key never reaches logs
impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from config plus an already-resolved API key (see `Config::resolve_api_key`).
    pub fn from_config(config: &WeatherConfig, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::new(
            config.api_base_url.clone(),
            api_key,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Fetch and normalize current conditions, keeping the failure reason.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<CurrentWeatherSnapshot, WeatherError> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));
        let request = self.client.get(&url).query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
        ]);

        let body: OwmCurrentResponse =
            http::get_json(request, "weather provider")
                .await
                .map_err(|e| match e {
                    NetworkError::InvalidResponse(msg) => WeatherError::Parse(msg),
                    other => WeatherError::Network(other),
                })?;

        Ok(body.main.into())
    }

    /// Current conditions, or `None` when the provider can't deliver them.
    ///
    /// The reason is logged; callers only learn that no data is available.
    pub async fn get_current_weather(&self, lat: f64, lon: f64) -> Option<CurrentWeatherSnapshot> {
        match self.fetch_current(lat, lon).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("No weather data for ({}, {}): {}", lat, lon, e);
                None
            }
        }
    }
}
