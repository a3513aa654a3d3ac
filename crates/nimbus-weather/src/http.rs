//! Plumbing shared by the geolocation and weather clients.

use nimbus_core::{NetworkError, ReqwestErrorExt};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("nimbus/", env!("CARGO_PKG_VERSION"));

/// Client with a bounded per-request timeout; a timeout surfaces as `NetworkError::Timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, NetworkError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(ReqwestErrorExt::into_network_error)
}

/// Send `request` and decode a JSON body. Non-2xx statuses are errors.
///
/// URLs are stripped from error text because query strings can carry API keys.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &str,
) -> Result<T, NetworkError> {
    let response = request
        .send()
        .await
        .map_err(|e| e.without_url().into_network_error())?;

    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::ServerError {
            status: status.as_u16(),
            message: format!("{} returned {}", service, status),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| NetworkError::InvalidResponse(format!("{}: {}", service, e.without_url())))
}
