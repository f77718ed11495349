//! Raw user record -> [`User`], enriched with a geocoded country.

use std::sync::Arc;

use serde_json::Value;

use super::model::{Address, RawUser, User};
use crate::control::Either;
use crate::effect::TaskEither;
use crate::error::{ErrorCode, ServiceError};
use crate::geo::CountryLookup;

/// Prefixes `https://` unless `url` already starts with `http://` or
/// `https://` (case-insensitively).
///
/// ```rust
/// use roster::users::ensure_scheme;
///
/// assert_eq!(ensure_scheme("hildegard.org"), "https://hildegard.org");
/// assert_eq!(ensure_scheme("HTTP://anastasia.net"), "HTTP://anastasia.net");
/// ```
pub fn ensure_scheme(url: &str) -> String {
    let lowered = url.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Adapts one raw record.
///
/// The record is decoded first; a record that does not have the expected
/// shape fails with [`ServiceError::Adaptation`]. The lookup is then run with
/// the record's coordinates. A failed lookup does not fail the record: the
/// country becomes the "country not found" message instead.
pub fn user_adapter(raw: Value, geo: Arc<dyn CountryLookup>) -> TaskEither<ServiceError, User> {
    let decoded: Either<ServiceError, RawUser> = serde_json::from_value::<RawUser>(raw)
        .map_err(|error| ServiceError::adaptation(error.to_string()))
        .into();

    let record = match decoded {
        Either::Right(record) => record,
        Either::Left(error) => return TaskEither::left(error),
    };

    let lookup = geo.country_from_coordinates(&record.address.geo.lat, &record.address.geo.lng);

    TaskEither::new(move || {
        let pending = lookup.run();
        let record = record.clone();
        async move {
            let country = match pending.await {
                Either::Right(country) => country,
                Either::Left(error) => {
                    tracing::warn!(user = record.id, %error, "geocoding failed, using fallback country");
                    ErrorCode::CountryNotFound.user_message().to_string()
                }
            };
            Either::Right(build_user(record, country))
        }
    })
}

fn build_user(record: RawUser, country: String) -> User {
    User {
        id: record.id,
        name: record.name,
        username: record.username,
        email: record.email,
        address: Address {
            street: record.address.street,
            city: record.address.city,
            zipcode: record.address.zipcode,
            country: Some(country),
        },
        phone: record.phone,
        website: ensure_scheme(&record.website),
        validated: false,
    }
}
