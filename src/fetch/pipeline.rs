//! Generic fetch -> adapt -> validate orchestration.

use std::sync::Arc;

use serde_json::Value;

use super::transport::{FetchRequest, HttpTransport};
use crate::control::Either;
use crate::effect::TaskEither;
use crate::error::ServiceError;

/// Builds the task every domain service runs.
///
/// When run, the task:
///
/// 1. performs `request` through `transport`;
/// 2. fails with [`ServiceError::Request`] on a transport failure or a
///    non-2xx status, without touching `adapter` or `validator`;
/// 3. decodes the body as JSON and hands it to `adapter`, propagating a
///    `Left`;
/// 4. hands the adapted value to `validator`, propagating a `Left`;
/// 5. resolves to the validated value.
///
/// Undecodable bodies and panics in any step also resolve to
/// [`ServiceError::Request`]. Nothing is cached between runs.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use roster::control::Either;
/// use roster::effect::TaskEither;
/// use roster::error::ServiceError;
/// use roster::fetch::{
///     FetchRequest, HttpResponse, HttpTransport, TransportError, fetch_data,
/// };
///
/// struct Fixed;
///
/// impl HttpTransport for Fixed {
///     fn execute(&self, _: &FetchRequest) -> TaskEither<TransportError, HttpResponse> {
///         TaskEither::right(HttpResponse::new(200, r#"{"address":{"country":"Australia"}}"#))
///     }
///
///     fn transport_name(&self) -> &'static str {
///         "fixed"
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let request = FetchRequest::get("https://example.invalid/reverse".parse().unwrap());
/// let task = fetch_data(
///     Arc::new(Fixed),
///     request,
///     |payload| TaskEither::right(payload["address"]["country"].as_str().map(String::from)),
///     |country: Option<String>| match country {
///         Some(country) => Either::Right(country),
///         None => Either::Left(ServiceError::input("no country")),
///     },
/// );
///
/// assert_eq!(task.run().await, Either::Right("Australia".to_string()));
/// # }
/// ```
pub fn fetch_data<I, O, A, V>(
    transport: Arc<dyn HttpTransport>,
    request: FetchRequest,
    adapter: A,
    validator: V,
) -> TaskEither<ServiceError, O>
where
    I: Send + 'static,
    O: Send + 'static,
    A: Fn(Value) -> TaskEither<ServiceError, I> + Send + Sync + 'static,
    V: Fn(I) -> Either<ServiceError, O> + Send + Sync + 'static,
{
    let adapter = Arc::new(adapter);
    let validator = Arc::new(validator);

    TaskEither::new(move || {
        let exchange = transport.execute(&request);
        let transport_name = transport.transport_name();
        let method = request.method.as_str();
        let url = request.url.to_string();
        let adapter = Arc::clone(&adapter);
        let validator = Arc::clone(&validator);

        async move {
            tracing::debug!(transport = transport_name, method, url = %url, "sending request");

            let response = match exchange.run().await {
                Either::Right(response) => response,
                Either::Left(error) => {
                    tracing::warn!(url = %url, %error, "request failed");
                    return Either::Left(ServiceError::request(error.to_string()));
                }
            };

            if !response.is_success() {
                tracing::warn!(url = %url, status = response.status, "unexpected status");
                return Either::Left(ServiceError::request(format!(
                    "HTTP {}",
                    response.status
                )));
            }

            let payload: Value = match serde_json::from_str(&response.body) {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(url = %url, %error, "undecodable payload");
                    return Either::Left(ServiceError::request(format!(
                        "invalid JSON payload: {error}"
                    )));
                }
            };

            match adapter(payload).run().await {
                Either::Left(error) => Either::Left(error),
                Either::Right(adapted) => validator(adapted),
            }
        }
    })
}
