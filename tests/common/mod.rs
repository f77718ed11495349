//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use roster::control::Either;
use roster::effect::TaskEither;
use roster::fetch::{FetchRequest, HttpResponse, HttpTransport, TransportError};
use serde_json::{Value, json};
use url::Url;

pub const USERS_URL: &str = "https://users.test/users";
pub const GEOCODE_URL: &str = "https://geo.test/reverse";

pub fn url(raw: &str) -> Url {
    Url::parse(raw).expect("test url parses")
}

/// Canned transport routing requests by URL prefix. Every performed
/// exchange is recorded when the task runs, not when it is built.
#[derive(Default)]
pub struct StubTransport {
    routes: Vec<(String, Either<TransportError, HttpResponse>)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push((
            prefix.to_string(),
            Either::Right(HttpResponse::new(status, body)),
        ));
        self
    }

    pub fn respond_json(self, prefix: &str, body: &Value) -> Self {
        self.respond(prefix, 200, body.to_string())
    }

    pub fn fail(mut self, prefix: &str, error: TransportError) -> Self {
        self.routes.push((prefix.to_string(), Either::Left(error)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|called| called.starts_with(prefix))
            .count()
    }
}

impl HttpTransport for StubTransport {
    fn execute(&self, request: &FetchRequest) -> TaskEither<TransportError, HttpResponse> {
        let target = request.url.to_string();
        let outcome = self
            .routes
            .iter()
            .find(|(prefix, _)| target.starts_with(prefix.as_str()))
            .map_or_else(
                || Either::Right(HttpResponse::new(404, "{}")),
                |(_, outcome)| outcome.clone(),
            );
        let calls = Arc::clone(&self.calls);

        TaskEither::new(move || {
            calls.lock().push(target.clone());
            futures::future::ready(outcome.clone())
        })
    }

    fn transport_name(&self) -> &'static str {
        "stub"
    }
}

pub fn geo_prefix(latitude: &str) -> String {
    format!("{GEOCODE_URL}?lat={latitude}&")
}

pub fn country_payload(country: &str) -> Value {
    json!({
        "place_id": 1,
        "display_name": "somewhere",
        "address": {"country": country, "country_code": "xx"}
    })
}

pub fn raw_user(id: u64, name: &str, email: &str, lat: &str, lng: &str, website: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "username": name.split_whitespace().next().unwrap_or(name),
        "email": email,
        "address": {
            "street": "Kulas Light",
            "suite": "Apt. 556",
            "city": "Gwenborough",
            "zipcode": "92998-3874",
            "geo": {"lat": lat, "lng": lng}
        },
        "phone": "1-770-736-8031 x56442",
        "website": website,
        "company": {"name": "Romaguera-Crona"}
    })
}

pub fn leanne() -> Value {
    raw_user(
        1,
        "Leanne Graham",
        "Sincere@april.biz",
        "-37.3159",
        "81.1496",
        "hildegard.org",
    )
}

pub fn ervin() -> Value {
    raw_user(
        2,
        "Ervin Howell",
        "Shanna@melissa.tv",
        "-43.9509",
        "-34.4618",
        "anastasia.net",
    )
}
