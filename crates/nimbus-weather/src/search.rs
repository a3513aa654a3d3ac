//! City suggestions for the "add location" flow.
//!
//! A real geocoding backend can implement [`CitySearch`]; the bundled catalog
//! is a fixed list used until one exists.

use crate::types::Location;

pub trait CitySearch: Send + Sync {
    /// Candidates whose name starts with `query`. A blank query yields nothing.
    fn suggest(&self, query: &str) -> Vec<Location>;
}

/// Fixed catalog matched by case-insensitive prefix.
#[derive(Debug, Clone)]
pub struct StaticCityCatalog {
    cities: Vec<Location>,
}

impl StaticCityCatalog {
    pub fn new(cities: Vec<Location>) -> Self {
        Self { cities }
    }
}

impl Default for StaticCityCatalog {
    fn default() -> Self {
        Self::new(vec![
            Location::new("New York", 40.7128, -74.0060),
            Location::new("Los Angeles", 34.0522, -118.2437),
            Location::new("San Francisco", 37.7749, -122.4194),
        ])
    }
}

impl CitySearch for StaticCityCatalog {
    fn suggest(&self, query: &str) -> Vec<Location> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.cities
            .iter()
            .filter(|loc| loc.city.to_lowercase().starts_with(&query))
            .cloned()
            .collect()
    }
}
