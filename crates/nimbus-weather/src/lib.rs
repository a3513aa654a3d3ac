//! Location and weather backend for Nimbus
//!
//! Keeps the saved location list on disk, detects the device's city from its
//! public IP, and fetches current conditions from an OpenWeatherMap-style API.
//! [`LocationOrchestrator`] is the entry point for the presentation layer.

pub mod geo;
pub mod orchestrator;
pub mod provider;
pub mod search;
pub mod store;
pub mod types;

mod error_mapping;
mod http;

pub use geo::GeoResolver;
pub use orchestrator::{ActiveSelection, LocationOrchestrator};
pub use provider::WeatherClient;
pub use search::{CitySearch, StaticCityCatalog};
pub use store::LocationStore;
pub use types::*;
