//! Device location from the public IP address.
//!
//! Two hops: an own-IP service (`{"ip": "..."}`), then an IP-to-geo service
//! (`{"city", "latitude", "longitude"}`). Nothing is cached here; the
//! resolved location is returned to the caller and that's it.

use nimbus_core::{GeolocationConfig, NetworkError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;
use tracing::instrument;

use crate::http;
use crate::types::{Location, ResolutionError};

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    city: Option<String>,
    // ipapi-style services send these as strings or numbers
    latitude: Option<Value>,
    longitude: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct GeoResolver {
    client: Client,
    ip_lookup_url: String,
    geo_lookup_base_url: String,
}

impl GeoResolver {
    pub fn new(
        ip_lookup_url: impl Into<String>,
        geo_lookup_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ResolutionError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            ip_lookup_url: ip_lookup_url.into(),
            geo_lookup_base_url: geo_lookup_base_url.into(),
        })
    }

    pub fn from_config(config: &GeolocationConfig) -> Result<Self, ResolutionError> {
        Self::new(
            config.ip_lookup_url.clone(),
            config.geo_lookup_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Resolve the device's city and coordinates.
    ///
    /// Any failure in either hop yields an error and no partial location.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_current_location(&self) -> Result<Location, ResolutionError> {
        let ip = self.lookup_public_ip().await?;
        let location = self.lookup_ip_location(ip).await?;

        tracing::info!(
            "Resolved current location: {} ({}, {})",
            location.city,
            location.lat,
            location.lon
        );
        Ok(location)
    }

    async fn lookup_public_ip(&self) -> Result<IpAddr, ResolutionError> {
        let body: IpResponse =
            http::get_json(self.client.get(&self.ip_lookup_url), "own-IP lookup").await?;

        let ip = body.ip.trim().parse::<IpAddr>().map_err(|e| {
            NetworkError::InvalidResponse(format!("own-IP lookup returned {:?}: {}", body.ip, e))
        })?;

        tracing::debug!("Public IP: {}", ip);
        Ok(ip)
    }

    async fn lookup_ip_location(&self, ip: IpAddr) -> Result<Location, ResolutionError> {
        let url = format!(
            "{}/{}/json/",
            self.geo_lookup_base_url.trim_end_matches('/'),
            ip
        );
        let body: GeoResponse = http::get_json(self.client.get(&url), "geo lookup").await?;
        location_from_response(body)
    }
}

fn location_from_response(body: GeoResponse) -> Result<Location, ResolutionError> {
    let city = body
        .city
        .filter(|c| !c.trim().is_empty())
        .ok_or(ResolutionError::IncompleteData("city"))?;
    let lat = parse_coordinate(body.latitude.as_ref())
        .ok_or(ResolutionError::IncompleteData("latitude"))?;
    let lon = parse_coordinate(body.longitude.as_ref())
        .ok_or(ResolutionError::IncompleteData("longitude"))?;

    // Zero is a real coordinate (equator / prime meridian) but it is also what
    // a broken upstream tends to send, so keep it and leave a trace.
    if lat == 0.0 || lon == 0.0 {
        tracing::warn!(
            "Geo lookup for {} returned a zero coordinate ({}, {})",
            city,
            lat,
            lon
        );
    }

    Ok(Location::new(city, lat, lon))
}

/// Present and numeric, whether encoded as a JSON number or a numeric string.
fn parse_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
