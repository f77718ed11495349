//! User shapes: the raw upstream record and the adapted domain value.

use serde::{Deserialize, Serialize};

/// Postal address of a [`User`], enriched with a geocoded country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street name.
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub zipcode: String,
    /// Reverse-geocoded country, or the "country not found" message when
    /// geocoding failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A directory entry as handed to rendering collaborators.
///
/// Never mutated after construction: a refresh produces a new `Vec<User>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Upstream identifier.
    pub id: u64,
    /// Full name.
    pub name: String,
    /// Handle.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Postal address.
    pub address: Address,
    /// Phone number, free form.
    pub phone: String,
    /// Homepage, always with an explicit scheme.
    pub website: String,
    /// Set once the value passed schema validation.
    #[serde(default)]
    pub validated: bool,
}

/// Coordinates as published by the user API. Both are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawGeo {
    /// Latitude.
    pub lat: String,
    /// Longitude.
    pub lng: String,
}

/// Address as published by the user API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawAddress {
    /// Street name.
    pub street: String,
    /// Apartment or suite; not carried into [`Address`].
    #[serde(default)]
    pub suite: Option<String>,
    /// City.
    pub city: String,
    /// Postal code.
    pub zipcode: String,
    /// Coordinates used for reverse geocoding.
    pub geo: RawGeo,
}

/// One record of the user collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawUser {
    /// Upstream identifier.
    pub id: u64,
    /// Full name.
    pub name: String,
    /// Handle.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Postal address with coordinates.
    pub address: RawAddress,
    /// Phone number.
    pub phone: String,
    /// Homepage, scheme optional.
    pub website: String,
}
