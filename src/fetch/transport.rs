//! The network seam of the fetch pipeline.
//!
//! [`HttpTransport`] performs exactly one HTTP exchange and hands back the
//! raw status and body. It returns a [`TaskEither`] so the exchange is only
//! performed when the pipeline runs it, and again on every run.

#[cfg(feature = "http")]
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::effect::{TaskEither, TaskPanic};

// =============================================================================
// Request / Response
// =============================================================================

/// HTTP methods the pipeline issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl FetchMethod {
    /// The method token as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A resource locator plus everything needed to request it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Absolute URL of the resource.
    pub url: Url,
    /// HTTP method.
    pub method: FetchMethod,
    /// Extra request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<String>,
}

impl FetchRequest {
    /// A `GET` request with no headers and no body.
    pub const fn get(url: Url) -> Self {
        Self {
            url,
            method: FetchMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Replaces the method.
    #[must_use]
    pub fn with_method(mut self, method: FetchMethod) -> Self {
        self.method = method;
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

// =============================================================================
// Transport Error
// =============================================================================

/// Why an exchange produced no response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not connect to the remote host.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the configured timeout.
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Any other transport failure, including reading the body.
    #[error("transport failure: {0}")]
    Failed(String),
}

impl From<TaskPanic> for TransportError {
    fn from(panic: TaskPanic) -> Self {
        Self::Failed(panic.message().to_string())
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Performs HTTP exchanges for the fetch pipeline.
///
/// Implementations must not interpret the status code; the pipeline decides
/// what counts as failure.
pub trait HttpTransport: Send + Sync {
    /// Describes one exchange for `request`.
    fn execute(&self, request: &FetchRequest) -> TaskEither<TransportError, HttpResponse>;

    /// Name used in logs.
    fn transport_name(&self) -> &'static str;
}

// =============================================================================
// reqwest Transport
// =============================================================================

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

#[cfg(feature = "http")]
impl ReqwestTransport {
    /// Builds a transport sending `user_agent` on every request.
    ///
    /// `timeout` of `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Failed`] if the TLS backend cannot be
    /// initialised.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|error| TransportError::Failed(error.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Wraps an existing client.
    pub const fn with_client(client: reqwest::Client, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }
}

#[cfg(feature = "http")]
impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &FetchRequest) -> TaskEither<TransportError, HttpResponse> {
        let client = self.client.clone();
        let timeout = self.timeout;
        let request = request.clone();

        TaskEither::try_new(move || execute_reqwest(client.clone(), request.clone(), timeout))
    }

    fn transport_name(&self) -> &'static str {
        "reqwest"
    }
}

/// Performs the actual network exchange. Only called from inside a
/// `TaskEither` effect.
#[cfg(feature = "http")]
#[allow(clippy::cast_possible_truncation)] // Timeout in ms will not exceed u64
async fn execute_reqwest(
    client: reqwest::Client,
    request: FetchRequest,
    timeout: Option<Duration>,
) -> Result<HttpResponse, TransportError> {
    let method = match request.method {
        FetchMethod::Get => reqwest::Method::GET,
        FetchMethod::Post => reqwest::Method::POST,
        FetchMethod::Put => reqwest::Method::PUT,
        FetchMethod::Delete => reqwest::Method::DELETE,
    };

    let mut builder = client.request(method, request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }
    if let Some(duration) = timeout {
        builder = builder.timeout(duration);
    }

    let response = builder.send().await.map_err(|error| {
        if error.is_timeout() {
            TransportError::Timeout(timeout.map_or(0, |duration| duration.as_millis() as u64))
        } else if error.is_connect() {
            TransportError::ConnectionFailed(error.to_string())
        } else {
            TransportError::Failed(error.to_string())
        }
    })?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|error| TransportError::Failed(error.to_string()))?;

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(299, true)]
    #[case(301, false)]
    #[case(404, false)]
    #[case(500, false)]
    fn success_is_2xx_only(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(HttpResponse::new(status, "").is_success(), expected);
    }

    #[rstest]
    fn builder_accumulates_headers_in_order() {
        let url = Url::parse("https://example.invalid/users").expect("valid url");
        let request = FetchRequest::get(url)
            .with_method(FetchMethod::Post)
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
            .with_body("{}");

        assert_eq!(request.method.as_str(), "POST");
        assert_eq!(request.headers[0].0, "Content-Type");
        assert_eq!(request.headers[1].0, "Accept");
        assert_eq!(request.body.as_deref(), Some("{}"));
    }
}
