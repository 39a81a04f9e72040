//! HTTP value types and response interpretation.
//!
//! Everything here is pure: requests and responses are plain data, so the
//! connection manager can be driven by any [`HttpTransport`] implementation.
//!
//! [`HttpTransport`]: crate::application::ports::HttpTransport

use std::fmt;

use serde_json::Value;
use vsp_common::Job;

use crate::domain::error::RestError;

/// Header the array sets on responses to asynchronous requests.
pub const JOB_STATUS_HEADER: &str = "Response-Job-Status";

/// Message ids the array uses for "the specified object does not exist".
const NOT_FOUND_MESSAGE_IDS: &[&str] = &["KART30000-E", "KART30002-E", "KART40042-E"];

/// HTTP methods used against the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Every method except GET changes array state.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value with a case-insensitive name match.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response as returned by the transport, whatever its status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with a case-insensitive name match.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Parse the body as JSON; an empty body is `null`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Decode`] if the body is not valid JSON.
    pub fn json(&self, path: &str) -> Result<Value, RestError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| RestError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

// ── Error envelope ───────────────────────────────────────────────────────────

/// Turn a non-2xx response into a typed error.
///
/// Understands both envelopes in the wild: Configuration Manager
/// (`message`/`messageId`) and the gateway (`ErrorMessage`/`MessageID`).
#[must_use]
pub fn error_from_response(response: &HttpResponse) -> RestError {
    let body: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| body.get(*k).and_then(Value::as_str))
            .map(str::to_string)
    };

    let message_id = text(&["messageId", "MessageID"]);
    let message = text(&["message", "ErrorMessage", "Message"])
        .or_else(|| {
            let trimmed = response.body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("HTTP status {}", response.status));

    let not_found = response.status == 404
        || message_id
            .as_deref()
            .is_some_and(|id| NOT_FOUND_MESSAGE_IDS.contains(&id))
        || message.contains("does not exist");

    if not_found {
        RestError::NotFound {
            status: response.status,
            message,
        }
    } else {
        RestError::Http {
            status: response.status,
            message_id,
            message,
        }
    }
}

// ── Normalisation ────────────────────────────────────────────────────────────

/// Fold the shapes list endpoints return (`{"data": [...]}`, a bare array,
/// a single object, nothing) into one list of items.
#[must_use]
pub fn normalize_items(body: Value) -> Vec<Value> {
    match body {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(single @ Value::Object(_)) => vec![single],
            Some(other) => {
                map.insert("data".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}

/// Unwrap a single object that the gateway wraps in `{"data": {...}}`.
#[must_use]
pub fn normalize_object(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ── Job detection ────────────────────────────────────────────────────────────

/// Extract the job from a response that accepted an asynchronous request.
///
/// A response is a job acceptance when its `Response-Job-Status` header is
/// anything but `Completed`, or it is a 202, or its body names a job
/// (`jobId` plus `self`, or a gateway `taskId`). An acceptance must carry a
/// readable job with an id. A `Completed` header marks the job completed
/// whatever status the body reports.
///
/// # Errors
///
/// Returns [`RestError::Decode`] for an acceptance without a usable job.
pub fn accepted_job(
    response: &HttpResponse,
    body: &Value,
    path: &str,
) -> Result<Option<Job>, RestError> {
    let header = response.header(JOB_STATUS_HEADER);
    let inner = normalize_object(body.clone());
    let looks_like_job = (inner.get("jobId").is_some() && inner.get("self").is_some())
        || inner.get("taskId").is_some();
    let pending_header = header.is_some_and(|h| h != "Completed");

    if !(looks_like_job || pending_header || response.status == 202) {
        return Ok(None);
    }
    let unusable = |reason: String| RestError::Decode {
        path: path.to_string(),
        reason: format!("request was accepted as a job but {reason}"),
    };
    let mut job: Job = serde_json::from_value(inner)
        .map_err(|e| unusable(format!("the job cannot be read: {e}")))?;
    let id = job
        .id()
        .map(str::to_string)
        .ok_or_else(|| unusable("the response names no job id".to_string()))?;
    job.job_id = id;
    if header == Some("Completed") {
        "Completed".clone_into(&mut job.status);
    }
    Ok(Some(job))
}
