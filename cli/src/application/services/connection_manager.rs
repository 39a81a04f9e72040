//! Application service: REST connection manager.
//!
//! Owns the session, builds every request, interprets every response and
//! waits for asynchronous jobs. Resource services only name an endpoint and
//! hand over a typed body.

use std::cell::{Cell, RefCell};
use std::fmt::Display;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use vsp_common::{Job, JobState};

use crate::application::ports::{HttpTransport, Sleeper};
use crate::application::services::poll::poll_until;
use crate::domain::connection::{ConnectionInfo, ConnectionType, Credentials};
use crate::domain::endpoint::{EndpointKey, with_query};
use crate::domain::error::{RestError, ValidationError};
use crate::domain::http::{
    HttpRequest, HttpResponse, Method, accepted_job, error_from_response, normalize_items,
    normalize_object,
};
use crate::domain::poll::{PollOutcome, PollPolicy};

/// Outcome of a successful mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The finished job, when the array ran the request asynchronously.
    pub job: Option<Job>,
    /// Response body of the original request (`null` when empty).
    pub body: Value,
}

impl Completion {
    /// Id of the object the request created, from the job's affected
    /// resources.
    #[must_use]
    pub fn affected_id(&self) -> Option<&str> {
        self.job.as_ref().and_then(Job::affected_id)
    }
}

#[derive(Debug, Clone)]
struct Session {
    /// Absent when the array did not report one; nothing to delete then.
    id: Option<u64>,
    token: String,
}

/// How requests authenticate, resolved once from validated credentials.
enum Auth {
    /// Open a session with HTTP Basic, then send its token.
    Basic { username: String, password: String },
    Session(String),
    Bearer {
        token: String,
        subscriber_id: Option<String>,
    },
}

impl Auth {
    fn resolve(info: &ConnectionInfo) -> Result<Self, ValidationError> {
        Ok(match (info.connection_type, info.credentials()?) {
            (ConnectionType::Gateway, Credentials::Token(token)) => Self::Bearer {
                token: token.to_string(),
                subscriber_id: info.subscriber_id.clone(),
            },
            (_, Credentials::Token(token)) => Self::Session(token.to_string()),
            (_, Credentials::Basic { username, password }) => Self::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
        })
    }
}

/// One connection to one REST server for the duration of a module run.
pub struct ConnectionManager<T: HttpTransport, S: Sleeper> {
    info: ConnectionInfo,
    auth: Auth,
    base_url: String,
    policy: PollPolicy,
    transport: T,
    sleeper: S,
    session: RefCell<Option<Session>>,
    changed: Cell<bool>,
}

impl<T: HttpTransport, S: Sleeper> ConnectionManager<T, S> {
    /// Validate `info` and prepare a connection. No request is sent until
    /// the first resource call.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `info` is incomplete.
    pub fn new(
        info: ConnectionInfo,
        transport: T,
        sleeper: S,
        policy: PollPolicy,
    ) -> Result<Self, ValidationError> {
        info.validate()?;
        Ok(Self {
            auth: Auth::resolve(&info)?,
            base_url: info.base_url(),
            info,
            policy,
            transport,
            sleeper,
            session: RefCell::new(None),
            changed: Cell::new(false),
        })
    }

    #[must_use]
    pub fn connection_type(&self) -> ConnectionType {
        self.info.connection_type
    }

    /// Base URL every endpoint path is joined to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        self.policy
    }

    /// Whether any mutating resource call succeeded during this run.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changed.get()
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Resource calls ───────────────────────────────────────────────────────

    /// `GET` a single object.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::NotFound`] if the object does not exist, or any
    /// other [`RestError`] from the call or decoding.
    pub fn get<R: DeserializeOwned>(
        &self,
        key: EndpointKey,
        args: &[&dyn Display],
    ) -> Result<R, RestError> {
        let path = self.path(key, args)?;
        let (_, body) = self.execute(Method::Get, &path, None)?;
        decode(&path, normalize_object(body))
    }

    /// `GET` a single object, mapping not-found to `None`.
    ///
    /// # Errors
    ///
    /// Returns any [`RestError`] other than not-found.
    pub fn get_optional<R: DeserializeOwned>(
        &self,
        key: EndpointKey,
        args: &[&dyn Display],
    ) -> Result<Option<R>, RestError> {
        match self.get(key, args) {
            Ok(r) => Ok(Some(r)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET` a collection, normalised to a list whatever shape it came in.
    ///
    /// # Errors
    ///
    /// Returns any [`RestError`] from the call or decoding an item.
    pub fn list<R: DeserializeOwned>(
        &self,
        key: EndpointKey,
        args: &[&dyn Display],
        query: &[(&str, String)],
    ) -> Result<Vec<R>, RestError> {
        let path = with_query(&self.path(key, args)?, query);
        let (_, body) = self.execute(Method::Get, &path, None)?;
        normalize_items(body)
            .into_iter()
            .map(|item| decode(&path, item))
            .collect()
    }

    /// `POST` and wait for the resulting job.
    ///
    /// # Errors
    ///
    /// Returns any [`RestError`] from the call or the job.
    pub fn post(
        &self,
        key: EndpointKey,
        args: &[&dyn Display],
        body: &impl Serialize,
    ) -> Result<Completion, RestError> {
        self.mutate(Method::Post, key, args, Some(encode(key, body)?))
    }

    /// `PATCH` and wait for the resulting job.
    ///
    /// # Errors
    ///
    /// Returns any [`RestError`] from the call or the job.
    pub fn patch(
        &self,
        key: EndpointKey,
        args: &[&dyn Display],
        body: &impl Serialize,
    ) -> Result<Completion, RestError> {
        self.mutate(Method::Patch, key, args, Some(encode(key, body)?))
    }

    /// `DELETE` and wait for the resulting job.
    ///
    /// # Errors
    ///
    /// Returns any [`RestError`] from the call or the job.
    pub fn delete(&self, key: EndpointKey, args: &[&dyn Display]) -> Result<Completion, RestError> {
        self.mutate(Method::Delete, key, args, None)
    }

    /// Poll `fetch` with this connection's policy and sleeper.
    ///
    /// # Errors
    ///
    /// Returns the first error `fetch` returns.
    pub fn poll<R>(
        &self,
        fetch: impl FnMut() -> Result<R, RestError>,
        done: impl Fn(&R) -> bool,
    ) -> Result<PollOutcome<R>, RestError> {
        poll_until(&self.sleeper, self.policy, fetch, done)
    }

    /// Discard the session, if one was opened. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if the server refused to discard the session.
    pub fn close(&self) -> Result<(), RestError> {
        let Some(session) = self.session.borrow_mut().take() else {
            return Ok(());
        };
        let Some(id) = session.id else {
            tracing::debug!("session has no id; nothing to close");
            return Ok(());
        };
        let path = EndpointKey::Session.fill(&[&id])?;
        let request = HttpRequest {
            method: Method::Delete,
            url: self.url(&path),
            headers: json_headers(format!("Session {}", session.token)),
            body: None,
        };
        tracing::debug!(session_id = id, "closing session");
        let response = self.send(&request)?;
        if response.is_success() {
            Ok(())
        } else {
            Err(error_from_response(&response))
        }
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn path(&self, key: EndpointKey, args: &[&dyn Display]) -> Result<String, RestError> {
        if self.info.connection_type == ConnectionType::Gateway && !key.endpoint().gateway {
            return Err(RestError::Unsupported {
                operation: key.name(),
            });
        }
        Ok(key.fill(args)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn mutate(
        &self,
        method: Method,
        key: EndpointKey,
        args: &[&dyn Display],
        body: Option<String>,
    ) -> Result<Completion, RestError> {
        let path = self.path(key, args)?;
        let (response, body) = self.execute(method, &path, body)?;

        let job = match accepted_job(&response, &body, &path)? {
            Some(job) => Some(self.wait_job(job)?),
            None => None,
        };

        self.changed.set(true);
        tracing::info!(
            target: "audit",
            method = %method,
            path = %path,
            status = response.status,
            job_id = job.as_ref().map_or("", |j| j.job_id.as_str()),
            at = %Utc::now().to_rfc3339(),
            "{} {}",
            key.name(),
            method
        );
        Ok(Completion { job, body })
    }

    /// Wait until `job` ends; only a completed job is `Ok`.
    fn wait_job(&self, job: Job) -> Result<Job, RestError> {
        let key = match self.info.connection_type {
            ConnectionType::Direct => EndpointKey::Job,
            ConnectionType::Gateway => EndpointKey::Task,
        };
        let job_id = job.job_id.clone();
        tracing::debug!(
            job_id = %job_id,
            ceiling_secs = self.policy.ceiling().as_secs(),
            "waiting for job"
        );

        let outcome = if job.job_state().is_terminal() {
            PollOutcome::Done(job)
        } else {
            self.poll(
                || self.get::<Job>(key, &[&job_id]),
                |j| j.job_state().is_terminal(),
            )?
        };

        match outcome {
            PollOutcome::Exhausted(last) => Err(RestError::JobTimedOut {
                job_id,
                status: last.status,
                attempts: self.policy.max_attempts,
            }),
            PollOutcome::Done(done) => match done.job_state() {
                JobState::Completed => Ok(done),
                _ => Err(RestError::JobFailed {
                    job_id,
                    message: done.failure_message(),
                }),
            },
        }
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<(HttpResponse, Value), RestError> {
        let request = HttpRequest {
            method,
            url: self.url(path),
            headers: self.auth_headers()?,
            body,
        };
        let response = self.send(&request)?;
        if !response.is_success() {
            let err = error_from_response(&response);
            tracing::debug!(%method, path, error = %err, "request failed");
            return Err(err);
        }
        let value = response.json(path)?;
        Ok((response, value))
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, RestError> {
        tracing::debug!(method = %request.method, url = %request.url, "request");
        let response = self
            .transport
            .send(request)
            .map_err(|e| RestError::Transport(format!("{e:#}")))?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "response"
        );
        Ok(response)
    }

    fn auth_headers(&self) -> Result<Vec<(String, String)>, RestError> {
        match &self.auth {
            Auth::Bearer {
                token,
                subscriber_id,
            } => {
                let mut headers = json_headers(format!("Bearer {token}"));
                if let Some(id) = subscriber_id {
                    headers.push(("Subscriberid".to_string(), id.clone()));
                }
                Ok(headers)
            }
            Auth::Session(token) => Ok(json_headers(format!("Session {token}"))),
            Auth::Basic { username, password } => {
                let token = self.session_token(username, password)?;
                Ok(json_headers(format!("Session {token}")))
            }
        }
    }

    fn session_token(&self, username: &str, password: &str) -> Result<String, RestError> {
        if let Some(session) = self.session.borrow().as_ref() {
            return Ok(session.token.clone());
        }

        let path = EndpointKey::Sessions.fill(&[])?;
        let basic = BASE64.encode(format!("{username}:{password}"));
        let request = HttpRequest {
            method: Method::Post,
            url: self.url(&path),
            headers: json_headers(format!("Basic {basic}")),
            body: Some("{}".to_string()),
        };
        let response = self.send(&request)?;
        if !response.is_success() {
            return Err(error_from_response(&response));
        }
        let body = response.json(&path)?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| RestError::Decode {
                path: path.clone(),
                reason: "session response has no token".to_string(),
            })?
            .to_string();
        let id = body.get("sessionId").and_then(Value::as_u64);
        tracing::debug!(session_id = ?id, "session opened");

        *self.session.borrow_mut() = Some(Session {
            id,
            token: token.clone(),
        });
        Ok(token)
    }
}

fn json_headers(authorization: String) -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("Authorization".to_string(), authorization),
    ]
}

fn encode(key: EndpointKey, body: &impl Serialize) -> Result<String, RestError> {
    serde_json::to_string(body).map_err(|e| RestError::Decode {
        path: key.endpoint().template.to_string(),
        reason: format!("cannot encode request body: {e}"),
    })
}

fn decode<R: DeserializeOwned>(path: &str, value: Value) -> Result<R, RestError> {
    serde_json::from_value(value).map_err(|e| RestError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
