//! UserService end to end over a stub transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    GEOCODE_URL, StubTransport, USERS_URL, country_payload, ervin, geo_prefix, leanne, raw_user,
    url,
};
use roster::control::Either;
use roster::effect::TaskEither;
use roster::error::{ErrorCode, ServiceError};
use roster::fetch::TransportError;
use roster::geo::GeoService;
use roster::users::UserService;
use rstest::rstest;
use serde_json::{Value, json};
use tokio::time::Instant;

fn service(transport: &Arc<StubTransport>) -> UserService {
    let geo = Arc::new(GeoService::new(transport.clone(), url(GEOCODE_URL)));
    UserService::new(transport.clone(), url(USERS_URL), geo)
}

// =============================================================================
// Happy Path
// =============================================================================

/// Leanne Graham is geocoded to Australia and validated.
#[rstest]
#[tokio::test]
async fn test_leanne_is_geocoded_and_validated() {
    let transport = Arc::new(
        StubTransport::new()
            .respond_json(USERS_URL, &json!([leanne()]))
            .respond_json(&geo_prefix("-37.3159"), &country_payload("Australia")),
    );

    let users = service(&transport)
        .get_users()
        .run()
        .await
        .right()
        .expect("directory loads");

    assert_eq!(users.len(), 1);
    let user = &users[0];
    assert_eq!(user.name, "Leanne Graham");
    assert_eq!(user.address.country.as_deref(), Some("Australia"));
    assert_eq!(user.website, "https://hildegard.org");
    assert!(user.validated);
    assert_eq!(
        transport.calls(),
        vec![
            USERS_URL.to_string(),
            format!("{GEOCODE_URL}?lat=-37.3159&lon=81.1496&format=json"),
        ]
    );
}

/// A failed lookup falls back to the "country not found" message instead of
/// failing the record.
#[rstest]
#[case::server_error(StubTransport::new().respond(&geo_prefix("-43.9509"), 500, "oops"))]
#[case::no_country(StubTransport::new().respond_json(&geo_prefix("-43.9509"), &json!({"error": "Unable to geocode"})))]
#[case::unreachable(StubTransport::new().fail(&geo_prefix("-43.9509"), TransportError::ConnectionFailed("refused".to_string())))]
#[tokio::test]
async fn test_geocoding_failure_uses_fallback_country(#[case] stub: StubTransport) {
    let transport = Arc::new(
        stub.respond_json(USERS_URL, &json!([leanne(), ervin()]))
            .respond_json(&geo_prefix("-37.3159"), &country_payload("Australia")),
    );

    let users = service(&transport)
        .get_users()
        .run()
        .await
        .right()
        .expect("directory loads");

    let countries: Vec<Option<&str>> = users
        .iter()
        .map(|user| user.address.country.as_deref())
        .collect();
    assert_eq!(
        countries,
        vec![
            Some("Australia"),
            Some(ErrorCode::CountryNotFound.user_message())
        ]
    );
    assert!(users.iter().all(|user| user.validated));
}

/// Empty coordinates never reach the geocoder.
#[rstest]
#[tokio::test]
async fn test_empty_coordinates_use_fallback_without_request() {
    let nowhere = raw_user(9, "Clementina DuBuque", "Rey.Padberg@karina.biz", "", "", "ambrose.net");
    let transport = Arc::new(StubTransport::new().respond_json(USERS_URL, &json!([nowhere])));

    let users = service(&transport)
        .get_users()
        .run()
        .await
        .right()
        .expect("directory loads");

    assert_eq!(
        users[0].address.country.as_deref(),
        Some("The specified country could not be found.")
    );
    assert_eq!(transport.calls_to(GEOCODE_URL), 0);
}

// =============================================================================
// Failures
// =============================================================================

/// Every invalid record is reported in one validation error.
#[rstest]
#[tokio::test]
async fn test_validation_failures_are_aggregated() {
    let broken_email = raw_user(2, "Ervin Howell", "not-an-email", "-43.9509", "-34.4618", "anastasia.net");
    let broken_both = raw_user(3, "Clementine Bauch", "also..bad@x.org", "-68.6102", "-47.0653", "http://");
    let transport = Arc::new(
        StubTransport::new()
            .respond_json(USERS_URL, &json!([leanne(), broken_email, broken_both]))
            .respond_json(GEOCODE_URL, &country_payload("Somewhere")),
    );

    let Either::Left(ServiceError::Validation(error)) = service(&transport).get_users().run().await
    else {
        panic!("directory must fail validation");
    };

    let records: Vec<Option<u64>> = error.failures.iter().map(|failure| failure.record).collect();
    assert_eq!(records, vec![Some(2), Some(3)]);
    assert_eq!(
        error.to_string(),
        "There was a validation error.: email - Invalid email; \
         There was a validation error.: email - Invalid email, website - Invalid url"
    );
}

/// A malformed record fails the whole batch with the adaptation prefix.
#[rstest]
#[case::missing_fields(json!([{"id": 1, "name": "Leanne Graham"}]))]
#[case::not_an_array(json!({"users": []}))]
#[tokio::test]
async fn test_malformed_payload_is_adaptation_error(#[case] payload: Value) {
    let transport = Arc::new(StubTransport::new().respond_json(USERS_URL, &payload));

    let Either::Left(ServiceError::Adaptation(message)) = service(&transport).get_users().run().await
    else {
        panic!("directory must fail adaptation");
    };
    assert!(message.starts_with("Failed to adapt users: "), "{message}");
}

/// Running the same task twice fetches the collection twice.
#[rstest]
#[tokio::test]
async fn test_rerun_fetches_again() {
    let transport = Arc::new(
        StubTransport::new()
            .respond_json(USERS_URL, &json!([leanne()]))
            .respond_json(GEOCODE_URL, &country_payload("Australia")),
    );
    let task = service(&transport).get_users();

    let first = task.run().await;
    let second = task.run().await;

    assert_eq!(first, second);
    assert_eq!(transport.calls_to(USERS_URL), 2);
    assert_eq!(transport.calls_to(GEOCODE_URL), 2);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Lookups for every record are in flight together: three 100ms lookups
/// finish in 100ms, not 300ms.
#[rstest]
#[tokio::test(start_paused = true)]
async fn test_geocoding_runs_concurrently() {
    let transport = Arc::new(StubTransport::new().respond_json(
        USERS_URL,
        &json!([
            leanne(),
            ervin(),
            raw_user(3, "Clementine Bauch", "Nathan@yesenia.net", "-68.6102", "-47.0653", "ramiro.info"),
        ]),
    ));
    let slow_lookup = |_: &str, _: &str| {
        TaskEither::<ServiceError, String>::new(|| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Either::Right("Australia".to_string())
        })
    };
    let service = UserService::new(transport, url(USERS_URL), Arc::new(slow_lookup));

    let started = Instant::now();
    let users = service
        .get_users()
        .run()
        .await
        .right()
        .expect("directory loads");

    assert_eq!(started.elapsed(), Duration::from_millis(100));
    assert_eq!(
        users.iter().map(|user| user.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}
