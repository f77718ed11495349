//! Endpoint configuration.
//!
//! Configuration is read once at startup from the environment (and a `.env`
//! file when present). Every value has a default pointing at the public
//! services the directory was built against, so an empty environment yields
//! a working configuration.
//!
//! # Example
//!
//! ```rust
//! use roster::config::RosterConfig;
//!
//! let config = RosterConfig::from_lookup(|key| match key {
//!     "ROSTER_REQUEST_TIMEOUT_MS" => Some("2500".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.users_url.as_str(), "https://jsonplaceholder.typicode.com/users");
//! assert_eq!(config.request_timeout.map(|timeout| timeout.as_millis()), Some(2500));
//! ```

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default user collection endpoint.
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";
/// Default reverse geocoding endpoint.
pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
/// Default `User-Agent`; Nominatim rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("roster/", env!("CARGO_PKG_VERSION"));
/// Default event bus scope.
pub const DEFAULT_EVENT_SCOPE: &str = "users-scope";

/// Environment variable names.
pub mod keys {
    /// User collection endpoint.
    pub const USERS_URL: &str = "ROSTER_USERS_URL";
    /// Reverse geocoding endpoint.
    pub const GEOCODE_URL: &str = "ROSTER_GEOCODE_URL";
    /// `User-Agent` header value.
    pub const USER_AGENT: &str = "ROSTER_USER_AGENT";
    /// Request timeout in milliseconds; unset means no timeout.
    pub const REQUEST_TIMEOUT_MS: &str = "ROSTER_REQUEST_TIMEOUT_MS";
    /// Event bus scope.
    pub const EVENT_SCOPE: &str = "ROSTER_EVENT_SCOPE";
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but its value is unusable.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The variable name.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Runtime configuration for the services and the demo binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    /// Endpoint returning the raw user collection.
    pub users_url: Url,
    /// Reverse geocoding endpoint; `lat`, `lon` and `format` are appended.
    pub reverse_geocode_url: Url,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Scope of the application event bus.
    pub event_scope: String,
}

impl RosterConfig {
    /// Loads configuration from the process environment, reading `.env`
    /// first if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to an
    /// unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the raw value of
    /// a variable or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let users_url = parse_url(keys::USERS_URL, lookup(keys::USERS_URL), DEFAULT_USERS_URL)?;
        let reverse_geocode_url = parse_url(
            keys::GEOCODE_URL,
            lookup(keys::GEOCODE_URL),
            DEFAULT_GEOCODE_URL,
        )?;
        let user_agent = lookup(keys::USER_AGENT)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let request_timeout = lookup(keys::REQUEST_TIMEOUT_MS)
            .map(|raw| parse_timeout(&raw))
            .transpose()?;
        let event_scope = lookup(keys::EVENT_SCOPE)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT_SCOPE.to_string());

        Ok(Self {
            users_url,
            reverse_geocode_url,
            user_agent,
            request_timeout,
            event_scope,
        })
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            users_url: default_url(DEFAULT_USERS_URL),
            reverse_geocode_url: default_url(DEFAULT_GEOCODE_URL),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: None,
            event_scope: DEFAULT_EVENT_SCOPE.to_string(),
        }
    }
}

#[allow(clippy::expect_used)] // Compile-time constants
fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("default endpoint is a valid URL")
}

fn parse_url(key: &str, value: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    let url = Url::parse(&raw).map_err(|error| ConfigError::InvalidValue {
        key: key.to_string(),
        message: error.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unsupported scheme `{scheme}`"),
        }),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|error| ConfigError::InvalidValue {
            key: keys::REQUEST_TIMEOUT_MS.to_string(),
            message: error.to_string(),
        })
}
