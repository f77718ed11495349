//! fetch_data: status handling, decoding and adapter/validator ordering.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{StubTransport, url};
use roster::control::Either;
use roster::effect::TaskEither;
use roster::error::ServiceError;
use roster::fetch::{FetchRequest, TransportError, fetch_data};
use rstest::rstest;
use serde_json::{Value, json};

const RESOURCE: &str = "https://api.test/resource";

struct Probe {
    adapted: Arc<AtomicUsize>,
    validated: Arc<AtomicUsize>,
}

impl Probe {
    fn new() -> Self {
        Self {
            adapted: Arc::new(AtomicUsize::new(0)),
            validated: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn run(&self, transport: Arc<StubTransport>) -> TaskEither<ServiceError, String> {
        let adapted = Arc::clone(&self.adapted);
        let validated = Arc::clone(&self.validated);
        fetch_data(
            transport,
            FetchRequest::get(url(RESOURCE)),
            move |payload: Value| {
                adapted.fetch_add(1, Ordering::SeqCst);
                TaskEither::right(payload["name"].as_str().unwrap_or_default().to_string())
            },
            move |name: String| {
                validated.fetch_add(1, Ordering::SeqCst);
                if name.is_empty() {
                    Either::Left(ServiceError::input("name is required"))
                } else {
                    Either::Right(name.to_uppercase())
                }
            },
        )
    }

    fn counts(&self) -> (usize, usize) {
        (
            self.adapted.load(Ordering::SeqCst),
            self.validated.load(Ordering::SeqCst),
        )
    }
}

// =============================================================================
// Status Handling
// =============================================================================

/// Non-2xx responses fail without touching the adapter or the validator.
#[rstest]
#[case(404)]
#[case(500)]
#[case(302)]
#[tokio::test]
async fn test_non_success_status_skips_adapter_and_validator(#[case] status: u16) {
    let transport = Arc::new(StubTransport::new().respond(RESOURCE, status, r#"{"name":"x"}"#));
    let probe = Probe::new();

    let outcome = probe.run(transport).run().await;

    assert_eq!(
        outcome,
        Either::Left(ServiceError::request(format!("HTTP {status}")))
    );
    assert_eq!(probe.counts(), (0, 0));
}

/// A transport failure is reported as a request error.
#[rstest]
#[tokio::test]
async fn test_transport_failure_is_request_error() {
    let transport = Arc::new(StubTransport::new().fail(RESOURCE, TransportError::Timeout(250)));
    let probe = Probe::new();

    let outcome = probe.run(transport).run().await;

    assert_eq!(
        outcome,
        Either::Left(ServiceError::request("timeout after 250ms"))
    );
    assert_eq!(probe.counts(), (0, 0));
}

// =============================================================================
// Adapter / Validator
// =============================================================================

/// A successful exchange flows through adapter then validator.
#[rstest]
#[tokio::test]
async fn test_success_runs_adapter_then_validator() {
    let transport = Arc::new(StubTransport::new().respond_json(RESOURCE, &json!({"name": "leanne"})));
    let probe = Probe::new();

    assert_eq!(
        probe.run(transport).run().await,
        Either::Right("LEANNE".to_string())
    );
    assert_eq!(probe.counts(), (1, 1));
}

/// Validator rejections propagate unchanged.
#[rstest]
#[tokio::test]
async fn test_validator_rejection_propagates() {
    let transport = Arc::new(StubTransport::new().respond_json(RESOURCE, &json!({"id": 1})));
    let probe = Probe::new();

    assert_eq!(
        probe.run(transport).run().await,
        Either::Left(ServiceError::input("name is required"))
    );
    assert_eq!(probe.counts(), (1, 1));
}

/// An adapter Left stops before validation.
#[rstest]
#[tokio::test]
async fn test_adapter_failure_skips_validator() {
    let transport = Arc::new(StubTransport::new().respond_json(RESOURCE, &json!([])));
    let validated = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&validated);

    let task = fetch_data(
        transport,
        FetchRequest::get(url(RESOURCE)),
        |_: Value| TaskEither::<ServiceError, u32>::left(ServiceError::adaptation("bad shape")),
        move |value: u32| {
            observed.fetch_add(1, Ordering::SeqCst);
            Either::Right(value)
        },
    );

    assert_eq!(
        task.run().await,
        Either::Left(ServiceError::adaptation("bad shape"))
    );
    assert_eq!(validated.load(Ordering::SeqCst), 0);
}

/// Each run of the pipeline task performs a new request.
#[rstest]
#[tokio::test]
async fn test_each_run_issues_a_request() {
    let transport = Arc::new(StubTransport::new().respond_json(RESOURCE, &json!({"name": "a"})));
    let task = Probe::new().run(Arc::clone(&transport));

    assert_eq!(transport.call_count(), 0);
    let _ = task.run().await;
    let _ = task.run().await;
    assert_eq!(transport.call_count(), 2);
}
