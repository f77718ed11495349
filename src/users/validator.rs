//! Schema checks for adapted users.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::model::User;
use crate::control::Either;
use crate::error::{ServiceError, ValidationError, ValidationIssue};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Literal pattern
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

/// Returns `true` if `email` is a syntactically valid address.
///
/// The local part may not start with a dot or contain consecutive dots.
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

/// Returns `true` if `website` parses as an absolute URL with a host.
pub fn is_valid_url(website: &str) -> bool {
    Url::parse(website).is_ok_and(|url| url.has_host())
}

/// Checks every field of `user`, in declaration order.
pub fn user_issues(user: &User) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if !is_valid_email(&user.email) {
        issues.push(ValidationIssue::new("email", "Invalid email"));
    }
    if !is_valid_url(&user.website) {
        issues.push(ValidationIssue::new("website", "Invalid url"));
    }
    issues
}

/// Validates one user, tagging it `validated` on success.
pub fn user_validator(user: User) -> Either<ServiceError, User> {
    let issues = user_issues(&user);
    if issues.is_empty() {
        Either::Right(User {
            validated: true,
            ..user
        })
    } else {
        Either::Left(ServiceError::Validation(ValidationError::single(
            Some(user.id),
            issues,
        )))
    }
}

/// Validates a batch.
///
/// All users are checked; every failure is kept, per record, in one
/// [`ServiceError::Validation`].
pub fn validate_users(users: Vec<User>) -> Either<ServiceError, Vec<User>> {
    let mut validated = Vec::with_capacity(users.len());
    let mut failures = Vec::new();

    for user in users {
        match user_validator(user) {
            Either::Right(user) => validated.push(user),
            Either::Left(ServiceError::Validation(error)) => failures.extend(error.failures),
            Either::Left(other) => return Either::Left(other),
        }
    }

    if failures.is_empty() {
        Either::Right(validated)
    } else {
        tracing::warn!(records = failures.len(), "user batch failed validation");
        Either::Left(ServiceError::Validation(ValidationError { failures }))
    }
}
