//! Shared test helpers: a scripted HTTP transport and no-op ports.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use vsp_cli::application::ports::{HttpTransport, ProgressReporter, Sleeper};
use vsp_cli::application::services::connection_manager::ConnectionManager;
use vsp_cli::domain::connection::{ConnectionInfo, ConnectionType};
use vsp_cli::domain::http::{HttpRequest, HttpResponse, Method};
use vsp_cli::domain::poll::PollPolicy;

pub const BASE: &str = "https://10.0.0.1/ConfigurationManager/";

// ── Scripted transport ───────────────────────────────────────────────────────

struct Route {
    method: Method,
    path: String,
    responses: VecDeque<HttpResponse>,
}

impl Route {
    /// Paths with a `?` must match the query too; others ignore it.
    fn matches(&self, method: Method, target: &str) -> bool {
        if self.method != method {
            return false;
        }
        if self.path.contains('?') {
            target == self.path
        } else {
            target.split('?').next() == Some(self.path.as_str())
        }
    }
}

/// Answers requests from a fixed script and records every request.
///
/// Each `(method, path)` route replays its responses in order, repeating the
/// last one. A request with no route fails like a dead network would.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: RefCell<Vec<Route>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method path` (path relative to the base URL).
    pub fn on(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: if body.is_null() {
                String::new()
            } else {
                body.to_string()
            },
        };
        {
            let mut routes = self.routes.borrow_mut();
            match routes
                .iter_mut()
                .find(|r| r.method == method && r.path == path)
            {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    method,
                    path: path.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    /// `GET path` answers 200 with `body`.
    pub fn get(self, path: &str, body: Value) -> Self {
        self.on(Method::Get, path, 200, body)
    }

    /// `GET path` answers 404.
    pub fn missing(self, path: &str) -> Self {
        self.on(
            Method::Get,
            path,
            404,
            serde_json::json!({"message": "The specified object does not exist.", "messageId": "KART30000-E"}),
        )
    }

    /// `method path` answers with a completed job whose affected resource is
    /// `affected`.
    pub fn job(self, method: Method, path: &str, affected: &str) -> Self {
        self.on(
            method,
            path,
            202,
            serde_json::json!({
                "jobId": 1,
                "self": "/ConfigurationManager/v1/objects/jobs/1",
                "status": "Completed",
                "state": "Succeeded",
                "affectedResources": [format!("/ConfigurationManager/v1/objects/{affected}")]
            }),
        )
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// `(method, path)` of every non-GET request, in order.
    pub fn mutations(&self) -> Vec<(Method, String)> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method.is_mutating())
            .map(|r| (r.method, relative(&r.url)))
            .collect()
    }

    /// How many requests hit `method path` (query ignored).
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && relative(&r.url).split('?').next() == Some(path))
            .count()
    }

    /// Parsed body of the `n`th request to `method path`.
    pub fn body(&self, method: Method, path: &str, n: usize) -> Value {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && relative(&r.url).split('?').next() == Some(path))
            .nth(n)
            .and_then(|r| r.body.as_deref())
            .and_then(|b| serde_json::from_str(b).ok())
            .unwrap_or(Value::Null)
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(request.clone());
        let target = relative(&request.url);
        let mut routes = self.routes.borrow_mut();
        let Some(route) = routes
            .iter_mut()
            .find(|r| r.matches(request.method, &target))
        else {
            anyhow::bail!("no scripted response for {} {target}", request.method);
        };
        let response = if route.responses.len() > 1 {
            route.responses.pop_front()
        } else {
            route.responses.front().cloned()
        };
        response.ok_or_else(|| anyhow::anyhow!("empty script for {} {target}", request.method))
    }
}

fn relative(url: &str) -> String {
    url.strip_prefix(BASE).unwrap_or(url).to_string()
}

// ── No-op ports ──────────────────────────────────────────────────────────────

/// Never sleeps.
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&self, _: Duration) {}
}

/// Collects progress messages.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: RefCell<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(format!("warn: {message}"));
    }
}

// ── Manager constructors ─────────────────────────────────────────────────────

pub type TestManager = ConnectionManager<ScriptedTransport, NoopSleeper>;

pub fn direct_info() -> ConnectionInfo {
    ConnectionInfo {
        address: "10.0.0.1".to_string(),
        username: None,
        password: None,
        api_token: Some("tok".to_string()),
        connection_type: ConnectionType::Direct,
        subscriber_id: None,
    }
}

/// Direct connection with a pre-issued token and a three-attempt poll.
pub fn manager(transport: ScriptedTransport) -> TestManager {
    ConnectionManager::new(
        direct_info(),
        transport,
        NoopSleeper,
        PollPolicy::new(Duration::ZERO, 3),
    )
    .expect("valid connection info")
}
