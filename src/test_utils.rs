use crate::clock::{Clock, DateTime, Utc};
use crate::conf::Config;
use crate::http::{HTTPError, HTTPResult};
use crate::reddit::Client;
use crate::reddit::service::{Params, Service};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, sleep};

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn load_data(file: &str) -> String {
    fs::read_to_string(format!("tests/data/{file}.json")).expect("could not find test data")
}

/// A request received by a [`TestService`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub started: Instant,
    pub finished: Instant,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, request: RecordedRequest) {
        self.0.lock().unwrap().push(request);
    }
}

/// A service that replays canned responses in order and records every
/// request it receives. Once the responses run out, it answers 404.
#[derive(Debug, Default)]
pub struct TestService {
    responses: Mutex<VecDeque<HTTPResult<String>>>,
    latency: Duration,
    log: RequestLog,
}

impl TestService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(body.into()));
        self
    }

    pub fn respond_with_file(self, file: &str) -> Self {
        self.respond(load_data(file))
    }

    pub fn fail(self, error: HTTPError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn latency(self, latency: Duration) -> Self {
        Self { latency, ..self }
    }

    pub fn requests(&self) -> RequestLog {
        self.log.clone()
    }

    async fn handle(
        &self,
        method: &'static str,
        path: &str,
        params: Params<'_>,
    ) -> HTTPResult<String> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(HTTPError::Http(StatusCode::NOT_FOUND)));
        self.log.push(RecordedRequest {
            method,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            started,
            finished: Instant::now(),
        });
        response
    }
}

impl Service for TestService {
    async fn get(&self, path: &str, params: Params<'_>) -> HTTPResult<String> {
        self.handle("GET", path, params).await
    }

    async fn post(&self, path: &str, params: Params<'_>) -> HTTPResult<String> {
        self.handle("POST", path, params).await
    }
}

impl Client<TestService> {
    /// Returns a client that sends its requests to `service`, throttled
    /// at the default interval.
    pub fn test(service: TestService) -> Self {
        Client::with_service(service, &Config::default())
    }
}

pub struct FrozenClock {
    datetime: DateTime<Utc>,
}

impl FrozenClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        FrozenClock { datetime }
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.datetime
    }
}
