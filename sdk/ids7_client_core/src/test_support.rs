//! In-memory transport for tests in this and sibling crates.
//!
//! Enabled with the `test-support` feature.

use std::collections::VecDeque;
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// A [`Transport`] that replays queued outcomes and records every request.
///
/// Sending with an empty queue yields a non-transient transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a JSON body.
    pub fn push_json(&self, status: StatusCode, body: &serde_json::Value) {
        let body = serde_json::to_vec(body).expect("json values always serialize");
        self.push(Ok(HttpResponse::new(status, body)));
    }

    /// Queue a response with a raw text body.
    pub fn push_text(&self, status: StatusCode, body: &str) {
        self.push(Ok(HttpResponse::new(status, body.to_string())));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(&self, outcome: Result<HttpResponse, TransportError>) {
        self.outcomes
            .lock()
            .expect("outcome queue poisoned")
            .push_back(outcome);
    }

    /// Requests sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        self.outcomes
            .lock()
            .expect("outcome queue poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::new(
                    crate::error::TransportErrorKind::Other,
                    format!("no scripted response for {} {}", request.method, request.path),
                ))
            })
    }
}
