//! Reverse geocoding: coordinates to country name.
//!
//! [`CountryLookup`] is the pluggable operation the user adapter calls.
//! [`GeoService`] implements it against a Nominatim-compatible endpoint;
//! tests and callers can pass any closure with the same shape instead.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::control::Either;
use crate::effect::TaskEither;
use crate::error::{ErrorCode, ServiceError};
use crate::fetch::{FetchRequest, HttpTransport, fetch_data};

/// Message of the input check failure.
pub const MISSING_COORDINATES_MESSAGE: &str = "Latitude and longitude must be provided";

// =============================================================================
// Lookup seam
// =============================================================================

/// Resolves a latitude/longitude pair to a country name.
pub trait CountryLookup: Send + Sync {
    /// Describes the lookup for `latitude`, `longitude` (decimal strings).
    fn country_from_coordinates(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> TaskEither<ServiceError, String>;
}

impl<F> CountryLookup for F
where
    F: Fn(&str, &str) -> TaskEither<ServiceError, String> + Send + Sync,
{
    fn country_from_coordinates(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> TaskEither<ServiceError, String> {
        self(latitude, longitude)
    }
}

// =============================================================================
// Adapter / validators
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
struct GeoAddress {
    #[serde(default)]
    country: Option<String>,
}

/// The part of a reverse geocoding response the directory cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoResponse {
    #[serde(default)]
    address: Option<GeoAddress>,
}

impl GeoResponse {
    /// The country, if the response carried one.
    pub fn country(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|address| address.country.as_deref())
    }
}

/// Maps a raw reverse geocoding payload to a [`GeoResponse`].
///
/// Missing fields are tolerated here; [`geo_validator`] decides whether the
/// response is usable.
pub fn geo_adapter(payload: Value) -> TaskEither<ServiceError, GeoResponse> {
    let adapted = serde_json::from_value::<GeoResponse>(payload)
        .map_err(|error| ServiceError::adaptation(format!("Unexpected geocoding payload: {error}")));
    TaskEither::from_either(adapted.into())
}

/// Extracts the country, failing with
/// [`ErrorCode::CountryNotFound`] when the response has none.
pub fn geo_validator(response: GeoResponse) -> Either<ServiceError, String> {
    match response.country() {
        Some(country) if !country.is_empty() => Either::Right(country.to_string()),
        _ => Either::Left(ServiceError::NotFound(ErrorCode::CountryNotFound)),
    }
}

/// Rejects empty coordinates before any network call.
pub fn validate_coordinates(latitude: &str, longitude: &str) -> Either<ServiceError, ()> {
    if latitude.trim().is_empty() || longitude.trim().is_empty() {
        Either::Left(ServiceError::input(MISSING_COORDINATES_MESSAGE))
    } else {
        Either::Right(())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Reverse geocoding over the fetch pipeline.
#[derive(Clone)]
pub struct GeoService {
    transport: Arc<dyn HttpTransport>,
    endpoint: Url,
}

impl GeoService {
    /// Creates a service querying `endpoint` (e.g.
    /// `https://nominatim.openstreetmap.org/reverse`).
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// The request issued for a coordinate pair.
    pub fn reverse_request(&self, latitude: &str, longitude: &str) -> FetchRequest {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", latitude)
            .append_pair("lon", longitude)
            .append_pair("format", "json");
        FetchRequest::get(url).with_header("Content-Type", "application/json")
    }
}

impl CountryLookup for GeoService {
    fn country_from_coordinates(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> TaskEither<ServiceError, String> {
        if let Either::Left(error) = validate_coordinates(latitude, longitude) {
            tracing::debug!(latitude, longitude, "rejected empty coordinates");
            return TaskEither::left(error);
        }

        fetch_data(
            Arc::clone(&self.transport),
            self.reverse_request(latitude, longitude),
            geo_adapter,
            geo_validator,
        )
    }
}

impl std::fmt::Debug for GeoService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("GeoService")
            .field("transport", &self.transport.transport_name())
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}
