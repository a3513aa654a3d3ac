use nimbus_core::NetworkError;
use serde::{Deserialize, Serialize};

/// Offset between the Kelvin and Celsius scales
pub const KELVIN_OFFSET: f64 = 273.15;

/// City name and coordinates. Identity within the registry is the city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(city: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            city: city.into(),
            lat,
            lon,
        }
    }

    /// Placeholder seeded into an empty registry.
    pub fn default_city() -> Self {
        Self::new("Default City", 0.0, 0.0)
    }

    /// The registry's identity predicate: exact, case-sensitive city name.
    ///
    /// Every duplicate check, removal and selection goes through here, so a
    /// stronger key (e.g. coordinates) only needs to change this function.
    pub fn matches_city(&self, city: &str) -> bool {
        self.city == city
    }
}

/// A reading with a single display rendering, e.g. `"55%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneFormatValue {
    pub raw: f64,
    pub formatted: String,
}

impl OneFormatValue {
    pub fn percent(raw: f64) -> Self {
        Self {
            raw,
            formatted: format!("{}%", raw),
        }
    }
}

/// A temperature with short (`"21°"`) and long (`"21°C"`) renderings.
///
/// `raw` is whole degrees Celsius; both strings are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFormatValue {
    pub raw: i32,
    pub short: String,
    pub long: String,
}

impl TwoFormatValue {
    pub fn celsius(raw: i32) -> Self {
        Self {
            raw,
            short: format!("{}°", raw),
            long: format!("{}°C", raw),
        }
    }

    pub fn from_kelvin(kelvin: f64) -> Self {
        Self::celsius(kelvin_to_celsius_rounded(kelvin))
    }
}

/// Convert Kelvin to whole degrees Celsius.
///
/// Rounds once, after conversion, half away from zero (`f64::round`).
pub fn kelvin_to_celsius_rounded(kelvin: f64) -> i32 {
    (kelvin - KELVIN_OFFSET).round() as i32
}

/// Current conditions for one coordinate pair, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeatherSnapshot {
    pub temperature: TwoFormatValue,
    pub min_temperature: TwoFormatValue,
    pub max_temperature: TwoFormatValue,
    pub feels_like: TwoFormatValue,
    pub humidity: OneFormatValue,
}

impl CurrentWeatherSnapshot {
    /// Build a snapshot from provider readings (temperatures in Kelvin, humidity in percent).
    pub fn from_kelvin(
        temp: f64,
        temp_min: f64,
        temp_max: f64,
        feels_like: f64,
        humidity: f64,
    ) -> Self {
        Self {
            temperature: TwoFormatValue::from_kelvin(temp),
            min_temperature: TwoFormatValue::from_kelvin(temp_min),
            max_temperature: TwoFormatValue::from_kelvin(temp_max),
            feels_like: TwoFormatValue::from_kelvin(feels_like),
            humidity: OneFormatValue::percent(humidity),
        }
    }
}

/// Weather for whichever location is currently active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveLocationWeather {
    pub location: Location,
    pub weather: CurrentWeatherSnapshot,
}

/// Why the own-IP / IP-to-geo chain produced no location
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("Location lookup failed: {0}")]
    Network(#[from] NetworkError),
    #[error("Location data incomplete: missing {0}")]
    IncompleteData(&'static str),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Network(#[from] NetworkError),
    #[error("Weather payload could not be parsed: {0}")]
    Parse(String),
}

/// Location registry persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store file is corrupt: {0}")]
    Corrupt(String),
    #[error("Store serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Store task failed: {0}")]
    Task(String),
}

/// Registry mutations the orchestrator refused or could not commit
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Location already saved: {0}")]
    DuplicateLocation(String),
    #[error("Cannot remove the only saved location")]
    LastLocation,
    #[error("Location not saved: {0}")]
    UnknownLocation(String),
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
