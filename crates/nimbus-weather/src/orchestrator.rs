//! Single entry point for the presentation layer.
//!
//! Decides which location is active, guards registry mutations (no duplicates,
//! never empty) and pairs the active location with its weather.
//!
//! Registry reads come from the store's in-memory copy and never wait on a
//! commit in progress; commits run on the blocking pool, network calls on the
//! runtime.

use nimbus_core::{AppError, Config};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::geo::GeoResolver;
use crate::provider::WeatherClient;
use crate::store::LocationStore;
use crate::types::{
    ActiveLocationWeather, CurrentWeatherSnapshot, Location, RegistryError, StoreError,
};

/// Which location is active for this session.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveSelection {
    /// Follow the device position (falls back to the first saved location).
    Auto,
    /// A saved location the user picked, or the first one at startup.
    Manual(Location),
}

impl ActiveSelection {
    /// `Manual(first)` when auto-location is off and something is saved, else `Auto`.
    pub fn initial(locations: &[Location], auto_location_enabled: bool) -> Self {
        match locations.first() {
            Some(first) if !auto_location_enabled => ActiveSelection::Manual(first.clone()),
            _ => ActiveSelection::Auto,
        }
    }
}

#[derive(Debug)]
pub struct LocationOrchestrator {
    store: Arc<LocationStore>,
    resolver: GeoResolver,
    weather: WeatherClient,
    selection: Mutex<ActiveSelection>,
}

impl LocationOrchestrator {
    pub fn new(store: LocationStore, resolver: GeoResolver, weather: WeatherClient) -> Self {
        let selection =
            ActiveSelection::initial(&store.list_locations(), store.auto_location_enabled());
        tracing::debug!("Initial location selection: {:?}", selection);

        Self {
            store: Arc::new(store),
            resolver,
            weather,
            selection: Mutex::new(selection),
        }
    }

    /// Wire everything from config. `api_key` comes from `Config::resolve_api_key`.
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self, AppError> {
        let store = LocationStore::open(config.store_path())?;
        let resolver = GeoResolver::from_config(&config.geolocation)?;
        let weather = WeatherClient::from_config(&config.weather, api_key)?;
        Ok(Self::new(store, resolver, weather))
    }

    pub fn selection(&self) -> ActiveSelection {
        self.selection.lock().clone()
    }

    pub fn list_locations(&self) -> Vec<Location> {
        self.store.list_locations()
    }

    pub fn auto_location_enabled(&self) -> bool {
        self.store.auto_location_enabled()
    }

    /// The location weather should be shown for right now.
    ///
    /// With auto-location on, a failed lookup falls back to the first saved
    /// entry. An empty registry is seeded with "Default City" first.
    pub async fn get_active_location(&self) -> Result<Location, StoreError> {
        let selection = self.selection();
        if let ActiveSelection::Manual(location) = selection {
            return Ok(location);
        }

        if self.store.auto_location_enabled() {
            match self.resolver.resolve_current_location().await {
                Ok(location) => return Ok(location),
                Err(e) => {
                    tracing::warn!("Location detection failed, using first saved location: {}", e);
                }
            }
            return self.first_or_seed().await;
        }

        let location = self.first_or_seed().await?;
        *self.selection.lock() = ActiveSelection::Manual(location.clone());
        Ok(location)
    }

    /// Active location plus its weather; `None` when the provider has nothing.
    pub async fn get_active_location_weather(
        &self,
    ) -> Result<Option<ActiveLocationWeather>, StoreError> {
        let location = self.get_active_location().await?;
        let weather = self.get_weather_for_location(&location).await;
        Ok(weather.map(|weather| ActiveLocationWeather { location, weather }))
    }

    pub async fn get_weather_for_location(
        &self,
        location: &Location,
    ) -> Option<CurrentWeatherSnapshot> {
        self.weather
            .get_current_weather(location.lat, location.lon)
            .await
    }

    /// Run the resolution chain. `None` means "unavailable", never zero coordinates.
    ///
    /// With auto-location on, a successful lookup ends any manual override.
    pub async fn resolve_current_location(&self) -> Option<Location> {
        match self.resolver.resolve_current_location().await {
            Ok(location) => {
                if self.store.auto_location_enabled() {
                    *self.selection.lock() = ActiveSelection::Auto;
                }
                Some(location)
            }
            Err(e) => {
                tracing::warn!("Current location unavailable: {}", e);
                None
            }
        }
    }

    pub async fn add_location(&self, candidate: Location) -> Result<Vec<Location>, RegistryError> {
        validate_candidate(&candidate)?;

        if self
            .store
            .list_locations()
            .iter()
            .any(|loc| loc.matches_city(&candidate.city))
        {
            return Err(RegistryError::DuplicateLocation(candidate.city));
        }

        let city = candidate.city.clone();
        let locations = self.commit(move |store| store.append_location(candidate)).await?;
        tracing::info!("Saved new location: {}", city);
        Ok(locations)
    }

    /// Remove every entry named `city`. A removal that would leave the registry
    /// empty is rejected, including one that matches several duplicate entries.
    ///
    /// If the removed entry was selected, the new first entry becomes the selection.
    pub async fn remove_location(&self, city: &str) -> Result<Vec<Location>, RegistryError> {
        let target = city.to_string();
        let locations = self
            .commit(move |store| store.remove_location_unless_last(&target))
            .await?
            .ok_or(RegistryError::LastLocation)?;
        tracing::info!("Removed location: {}", city);

        let mut selection = self.selection.lock();
        let removed_selected =
            matches!(&*selection, ActiveSelection::Manual(loc) if loc.matches_city(city));
        if removed_selected {
            *selection = match locations.first() {
                Some(first) => {
                    tracing::info!("Selected new default location: {}", first.city);
                    ActiveSelection::Manual(first.clone())
                }
                None => ActiveSelection::Auto,
            };
        }

        Ok(locations)
    }

    /// Make a saved location active for this session.
    pub fn select_location(&self, city: &str) -> Result<Location, RegistryError> {
        let location = self
            .store
            .list_locations()
            .into_iter()
            .find(|loc| loc.matches_city(city))
            .ok_or_else(|| RegistryError::UnknownLocation(city.to_string()))?;

        *self.selection.lock() = ActiveSelection::Manual(location.clone());
        tracing::info!("Selected location: {}", location.city);
        Ok(location)
    }

    /// Persist the flag and return it. Turning it on switches to `Auto`,
    /// turning it off pins the first saved location.
    pub async fn set_auto_location_enabled(&self, enabled: bool) -> Result<bool, RegistryError> {
        let enabled = self
            .commit(move |store| store.set_auto_location_enabled(enabled))
            .await?;
        tracing::info!("Set auto-location enabled to: {}", enabled);

        let next = if enabled {
            ActiveSelection::Auto
        } else {
            ActiveSelection::Manual(self.first_or_seed().await?)
        };
        *self.selection.lock() = next;

        Ok(enabled)
    }

    pub async fn toggle_auto_location(&self) -> Result<bool, RegistryError> {
        let next = !self.store.auto_location_enabled();
        self.set_auto_location_enabled(next).await
    }

    async fn first_or_seed(&self) -> Result<Location, StoreError> {
        if let Some(first) = self.store.list_locations().into_iter().next() {
            return Ok(first);
        }

        let seed = Location::default_city();
        tracing::info!("Location registry empty, seeding {}", seed.city);
        let stored = seed.clone();
        self.commit(move |store| store.append_location(stored)).await?;
        Ok(seed)
    }

    /// Run a store mutation on the blocking pool so disk I/O never stalls the runtime.
    async fn commit<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&LocationStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StoreError::Task(format!("Task join error: {}", e)))?
    }
}

fn validate_candidate(candidate: &Location) -> Result<(), RegistryError> {
    if candidate.city.trim().is_empty() {
        return Err(RegistryError::InvalidLocation("city name is empty".to_string()));
    }
    if !candidate.lat.is_finite() || !(-90.0..=90.0).contains(&candidate.lat) {
        return Err(RegistryError::InvalidLocation(format!(
            "latitude {} out of range",
            candidate.lat
        )));
    }
    if !candidate.lon.is_finite() || !(-180.0..=180.0).contains(&candidate.lon) {
        return Err(RegistryError::InvalidLocation(format!(
            "longitude {} out of range",
            candidate.lon
        )));
    }
    Ok(())
}
