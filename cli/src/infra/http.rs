//! Blocking HTTP transport over `ureq`, and the real-time sleeper.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{HttpTransport, Sleeper};
use crate::domain::http::{HttpRequest, HttpResponse};

const USER_AGENT: &str = concat!("vsp/", env!("CARGO_PKG_VERSION"));

/// [`HttpTransport`] backed by one `ureq` agent (connection pooling across
/// calls of a module run).
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }
        let result = match &request.body {
            Some(body) => req.send_string(body),
            None => req.call(),
        };
        let response = match result {
            Ok(resp) | Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(t)) => {
                return Err(anyhow::Error::new(t))
                    .with_context(|| format!("{} {}", request.method, request.url));
            }
        };
        into_response(response)
    }
}

fn into_response(response: ureq::Response) -> Result<HttpResponse> {
    let status = response.status();
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();
    let body = response
        .into_string()
        .context("cannot read response body")?;
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// Sleeps the calling thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
