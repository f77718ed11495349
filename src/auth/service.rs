//! Authentication against the user collection.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::model::{AuthResponse, auth_validator};
use crate::control::Either;
use crate::effect::TaskEither;
use crate::error::{ErrorCode, ServiceError};
use crate::fetch::{FetchRequest, HttpTransport, fetch_data};

/// Finds the record whose `email` equals `email` exactly and validates it.
pub fn authenticate_adapter(payload: &Value, email: &str) -> Either<ServiceError, AuthResponse> {
    let Some(records) = payload.as_array() else {
        return Either::Left(ServiceError::adaptation(format!(
            "{}: expected an array of users",
            ErrorCode::FailedToAdaptUser.user_message()
        )));
    };

    let Some(record) = records
        .iter()
        .find(|record| record.get("email").and_then(Value::as_str) == Some(email))
    else {
        return Either::Left(ServiceError::NotFound(ErrorCode::UserNotFound));
    };

    auth_validator(record).map_right(AuthResponse::authenticated)
}

/// Authenticates users by email.
#[derive(Clone)]
pub struct AuthService {
    transport: Arc<dyn HttpTransport>,
    users_url: Url,
}

impl AuthService {
    /// Creates a service looking users up at `users_url`.
    pub fn new(transport: Arc<dyn HttpTransport>, users_url: Url) -> Self {
        Self {
            transport,
            users_url,
        }
    }

    /// Describes an authentication attempt for `email`.
    ///
    /// `Left(NotFound(UserNotFound))` when no record has that email,
    /// `Left(Validation)` when the matching record is malformed.
    pub fn authenticate_user(&self, email: &str) -> TaskEither<ServiceError, AuthResponse> {
        let email = email.to_string();
        fetch_data(
            Arc::clone(&self.transport),
            FetchRequest::get(self.users_url.clone()),
            move |payload| TaskEither::from_either(authenticate_adapter(&payload, &email)),
            Either::Right,
        )
        .inspect_left(|error| tracing::warn!(%error, "authentication failed"))
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthService")
            .field("transport", &self.transport.transport_name())
            .field("users_url", &self.users_url.as_str())
            .finish()
    }
}
