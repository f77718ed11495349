//! Fetching the directory: request, adapt every record, validate the batch.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::adapter::user_adapter;
use super::model::User;
use super::validator::validate_users;
use crate::effect::TaskEither;
use crate::error::ServiceError;
use crate::fetch::{FetchRequest, HttpTransport, fetch_data};
use crate::geo::CountryLookup;

/// Prefix of every batch adaptation failure.
pub const ADAPT_USERS_PREFIX: &str = "Failed to adapt users";

/// Adapts a collection payload.
///
/// Records are adapted concurrently and returned in payload order. The
/// first record (in payload order) that fails to adapt fails the whole
/// batch.
pub fn adapt_users(payload: Value, geo: Arc<dyn CountryLookup>) -> TaskEither<ServiceError, Vec<User>> {
    let Value::Array(records) = payload else {
        return TaskEither::left(ServiceError::adaptation(format!(
            "{ADAPT_USERS_PREFIX}: expected an array of users"
        )));
    };

    tracing::debug!(records = records.len(), "adapting users");
    TaskEither::traverse(records, move |raw| user_adapter(raw, Arc::clone(&geo)))
        .map_left(|error| match error {
            ServiceError::Adaptation(message) => {
                ServiceError::adaptation(format!("{ADAPT_USERS_PREFIX}: {message}"))
            }
            other => other,
        })
}

/// Reads the user directory.
#[derive(Clone)]
pub struct UserService {
    transport: Arc<dyn HttpTransport>,
    users_url: Url,
    geo: Arc<dyn CountryLookup>,
}

impl UserService {
    /// Creates a service reading `users_url`, geocoding through `geo`.
    pub fn new(transport: Arc<dyn HttpTransport>, users_url: Url, geo: Arc<dyn CountryLookup>) -> Self {
        Self {
            transport,
            users_url,
            geo,
        }
    }

    /// The collection endpoint.
    pub fn users_url(&self) -> &Url {
        &self.users_url
    }

    /// Describes a full directory read. Nothing happens until the task runs;
    /// every run issues a fresh request.
    pub fn get_users(&self) -> TaskEither<ServiceError, Vec<User>> {
        let geo = Arc::clone(&self.geo);
        fetch_data(
            Arc::clone(&self.transport),
            FetchRequest::get(self.users_url.clone()),
            move |payload| adapt_users(payload, Arc::clone(&geo)),
            validate_users,
        )
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("UserService")
            .field("transport", &self.transport.transport_name())
            .field("users_url", &self.users_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Either;
    use rstest::rstest;
    use serde_json::json;

    fn australia() -> Arc<dyn CountryLookup> {
        Arc::new(|_: &str, _: &str| {
            TaskEither::<ServiceError, String>::right("Australia".to_string())
        })
    }

    fn record(id: u64, website: &str) -> Value {
        json!({
            "id": id,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": {"lat": "-37.3159", "lng": "81.1496"}
            },
            "phone": "1-770-736-8031 x56442",
            "website": website
        })
    }

    #[rstest]
    #[tokio::test]
    async fn non_array_payload_is_an_adaptation_error() {
        let outcome = adapt_users(json!({"users": []}), australia()).run().await;
        assert_eq!(
            outcome,
            Either::Left(ServiceError::adaptation(
                "Failed to adapt users: expected an array of users"
            ))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn records_keep_payload_order() {
        let payload = Value::Array(vec![
            record(3, "three.org"),
            record(1, "one.org"),
            record(2, "two.org"),
        ]);
        let users = adapt_users(payload, australia())
            .run()
            .await
            .right()
            .expect("all records adapt");

        let ids: Vec<u64> = users.iter().map(|user| user.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(users[0].website, "https://three.org");
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_record_fails_the_batch_with_prefix() {
        let payload = Value::Array(vec![record(1, "one.org"), json!({"id": 2})]);
        let Either::Left(ServiceError::Adaptation(message)) =
            adapt_users(payload, australia()).run().await
        else {
            panic!("batch must fail adaptation");
        };
        assert!(message.starts_with("Failed to adapt users: "));
    }
}
