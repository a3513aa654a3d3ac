//! Maps this crate's errors onto `nimbus_core::AppError` for user-facing messages.

use nimbus_core::{AppError, LocationError, NetworkError, StorageError};

use crate::types::{RegistryError, ResolutionError, StoreError, WeatherError};

impl From<ResolutionError> for AppError {
    fn from(e: ResolutionError) -> Self {
        AppError::Location(LocationError::ResolutionUnavailable(e.to_string()))
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        use nimbus_core::WeatherError as Core;

        match e {
            WeatherError::Network(NetworkError::ServerError { status: 401, .. }) => {
                AppError::Weather(Core::InvalidApiKey)
            }
            WeatherError::Network(NetworkError::ServerError { status, .. }) if status >= 500 => {
                AppError::Weather(Core::ServiceUnavailable)
            }
            WeatherError::Network(NetworkError::ServerError { status, message }) => {
                AppError::Weather(Core::ApiError(format!("{} ({})", message, status)))
            }
            WeatherError::Network(other) => AppError::Network(other),
            WeatherError::Parse(msg) => AppError::Weather(Core::InvalidPayload(msg)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(io) => AppError::Io(io),
            StoreError::Corrupt(msg) => AppError::Storage(StorageError::Corruption(msg)),
            StoreError::Serialize(err) => AppError::Storage(StorageError::WriteFailed(err.to_string())),
            StoreError::Task(msg) => AppError::Storage(StorageError::WriteFailed(msg)),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::DuplicateLocation(city) => {
                AppError::Location(LocationError::DuplicateLocation(city))
            }
            RegistryError::LastLocation => AppError::Location(LocationError::LastLocation),
            RegistryError::UnknownLocation(city) => {
                AppError::Location(LocationError::UnknownLocation(city))
            }
            RegistryError::InvalidLocation(reason) => {
                AppError::Location(LocationError::InvalidLocation(reason))
            }
            RegistryError::Store(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_validation_message() {
        let err = AppError::from(RegistryError::DuplicateLocation("Paris".into()));
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Cannot choose duplicate locations.");
    }

    #[test]
    fn test_last_location_maps_to_validation_message() {
        let err = AppError::from(RegistryError::LastLocation);
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "Cannot remove the last remaining location.");
    }

    #[test]
    fn test_store_failure_is_not_validation() {
        let err = AppError::from(RegistryError::Store(StoreError::Corrupt("bad".into())));
        assert!(!err.is_validation());
        assert!(matches!(err, AppError::Storage(StorageError::Corruption(_))));
    }

    #[test]
    fn test_unauthorized_weather_maps_to_invalid_key() {
        let err = AppError::from(WeatherError::Network(NetworkError::ServerError {
            status: 401,
            message: "weather provider returned 401".into(),
        }));
        assert!(matches!(err, AppError::Weather(nimbus_core::WeatherError::InvalidApiKey)));
    }

    #[test]
    fn test_weather_timeout_stays_network() {
        let err = AppError::from(WeatherError::Network(NetworkError::Timeout));
        assert!(matches!(err, AppError::Network(NetworkError::Timeout)));
    }

    #[test]
    fn test_resolution_failure_maps_to_location() {
        let err = AppError::from(ResolutionError::IncompleteData("city"));
        assert!(matches!(
            err,
            AppError::Location(LocationError::ResolutionUnavailable(ref msg)) if msg.contains("city")
        ));
    }
}
