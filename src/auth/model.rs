//! Authentication shapes and the schema check for an authenticating record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::control::Either;
use crate::error::{ServiceError, ValidationError, ValidationIssue};
use crate::users::is_valid_email;

/// The identity kept by a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthUser {
    /// Upstream identifier.
    pub id: u64,
    /// Email the user authenticated with.
    pub email: String,
}

/// Outcome of an authentication attempt as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Whether the attempt succeeded.
    pub success: bool,
    /// The authenticated user, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    /// A message describing the failure, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    /// A successful response for `user`.
    pub fn authenticated(user: AuthUser) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }

    /// A failed response carrying `error`'s message.
    pub fn rejected(error: &ServiceError) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(error.to_string()),
        }
    }
}

/// Checks a raw user record for the fields authentication needs: a
/// non-negative integer `id` and a valid `email`.
pub fn auth_validator(record: &Value) -> Either<ServiceError, AuthUser> {
    let id = record.get("id").and_then(Value::as_u64);
    let email = record
        .get("email")
        .and_then(Value::as_str)
        .filter(|email| is_valid_email(email));

    let mut issues = Vec::new();
    if id.is_none() {
        issues.push(ValidationIssue::new("id", "Expected number"));
    }
    if email.is_none() {
        issues.push(ValidationIssue::new("email", "Invalid email"));
    }

    match (id, email) {
        (Some(id), Some(email)) => Either::Right(AuthUser {
            id,
            email: email.to_string(),
        }),
        _ => Either::Left(ServiceError::Validation(ValidationError::single(id, issues))),
    }
}
