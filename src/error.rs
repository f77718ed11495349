//! Error taxonomy shared by the pipeline and the domain services.
//!
//! Every failure is surfaced as `Either::Left(ServiceError)`; nothing is
//! raised past the pipeline boundary. [`ErrorCode`] is the catalog of
//! user-facing messages rendering collaborators show.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effect::TaskPanic;

// =============================================================================
// User-facing message catalog
// =============================================================================

/// Catalogued error codes with a fixed user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Reverse geocoding produced no country.
    CountryNotFound,
    /// The HTTP exchange failed.
    RequestError,
    /// A value failed schema validation.
    ValidationError,
    /// A user lookup found no match.
    UserNotFound,
    /// A raw user record could not be adapted.
    FailedToAdaptUser,
}

/// Message shown for codes missing from the catalog.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

impl ErrorCode {
    /// The key the code is known by in logs and payloads.
    pub const fn key(self) -> &'static str {
        match self {
            Self::CountryNotFound => "Country not found",
            Self::RequestError => "Request error",
            Self::ValidationError => "Validation error",
            Self::UserNotFound => "User not found",
            Self::FailedToAdaptUser => "Failed to adapt user",
        }
    }

    /// The message shown to users.
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::CountryNotFound => "The specified country could not be found.",
            Self::RequestError => "There was an error with the request.",
            Self::ValidationError => "There was a validation error.",
            Self::UserNotFound => "The specified user could not be found.",
            Self::FailedToAdaptUser => "Failed to adapt user.",
        }
    }

    /// Looks a code up by its key.
    pub fn from_key(key: &str) -> Option<Self> {
        [
            Self::CountryNotFound,
            Self::RequestError,
            Self::ValidationError,
            Self::UserNotFound,
            Self::FailedToAdaptUser,
        ]
        .into_iter()
        .find(|code| code.key() == key)
    }
}

/// Resolves a key to its user-facing message, falling back to
/// [`UNKNOWN_ERROR_MESSAGE`].
pub fn user_message_for(key: &str) -> &'static str {
    ErrorCode::from_key(key).map_or(UNKNOWN_ERROR_MESSAGE, ErrorCode::user_message)
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.user_message())
    }
}

// =============================================================================
// Validation failures
// =============================================================================

/// One failed schema check, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field, e.g. `address.zipcode`.
    pub path: String,
    /// What was wrong with it.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue for `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} - {}", self.path, self.message)
    }
}

/// All validation issues of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Identifier of the record when one could be read.
    pub record: Option<u64>,
    /// The failed checks, in field order.
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: ", ErrorCode::ValidationError)?;
        let mut first = true;
        for issue in &self.issues {
            if !first {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{issue}")?;
            first = false;
        }
        Ok(())
    }
}

/// A validation failure, possibly spanning several records.
///
/// Keeps the per-record structure; [`Display`](fmt::Display) renders the
/// concatenated message rendering collaborators expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Per-record failures in input order.
    pub failures: Vec<RecordFailure>,
}

impl ValidationError {
    /// A failure for a single record.
    pub fn single(record: Option<u64>, issues: Vec<ValidationIssue>) -> Self {
        Self {
            failures: vec![RecordFailure { record, issues }],
        }
    }

    /// Total number of failed checks across all records.
    pub fn issue_count(&self) -> usize {
        self.failures.iter().map(|failure| failure.issues.len()).sum()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.failures {
            if !first {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{failure}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Service Error
// =============================================================================

/// Every failure the pipeline and the domain services can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Non-2xx status, transport failure or undecodable payload.
    #[error("Request error: {0}")]
    Request(String),

    /// A raw record could not be transformed into its domain shape.
    #[error("{0}")]
    Adaptation(String),

    /// An adapted value failed schema validation.
    #[error("{0}")]
    Validation(ValidationError),

    /// A lookup found nothing.
    #[error("{}", .0.user_message())]
    NotFound(ErrorCode),

    /// Required input was missing before any I/O was attempted.
    #[error("{0}")]
    Input(String),
}

impl ServiceError {
    /// A request failure described by `message`.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// An adaptation failure described by `message`.
    pub fn adaptation(message: impl Into<String>) -> Self {
        Self::Adaptation(message.into())
    }

    /// An input failure described by `message`.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// The catalog entry matching this error's category, if any.
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Request(_) => Some(ErrorCode::RequestError),
            Self::Adaptation(_) => Some(ErrorCode::FailedToAdaptUser),
            Self::Validation(_) => Some(ErrorCode::ValidationError),
            Self::NotFound(code) => Some(*code),
            Self::Input(_) => None,
        }
    }

    /// Returns `true` for [`ServiceError::Request`].
    pub const fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// Returns `true` for [`ServiceError::Validation`].
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` for [`ServiceError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` for [`ServiceError::Input`].
    pub const fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

impl From<TaskPanic> for ServiceError {
    fn from(panic: TaskPanic) -> Self {
        Self::Request(panic.message().to_string())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Country not found", "The specified country could not be found.")]
    #[case("Request error", "There was an error with the request.")]
    #[case("User not found", "The specified user could not be found.")]
    #[case("Something else", "An unknown error occurred.")]
    fn catalog_resolves_messages(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(user_message_for(key), expected);
    }

    #[rstest]
    fn validation_error_joins_records_and_issues() {
        let error = ValidationError {
            failures: vec![
                RecordFailure {
                    record: Some(1),
                    issues: vec![
                        ValidationIssue::new("email", "Invalid email"),
                        ValidationIssue::new("website", "Invalid url"),
                    ],
                },
                RecordFailure {
                    record: Some(2),
                    issues: vec![ValidationIssue::new("email", "Invalid email")],
                },
            ],
        };

        assert_eq!(
            error.to_string(),
            "There was a validation error.: email - Invalid email, website - Invalid url; \
             There was a validation error.: email - Invalid email"
        );
        assert_eq!(error.issue_count(), 3);
    }

    #[rstest]
    fn panic_converts_to_request_error() {
        let error = ServiceError::from(TaskPanic::new("socket closed"));
        assert_eq!(error.to_string(), "Request error: socket closed");
        assert!(error.is_request());
    }
}
