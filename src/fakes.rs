//! In-memory transport for tests
//!
//! `ScriptedTransport` replays queued responses in order and records every
//! request it receives, so tests can assert on exactly what would have gone
//! over the wire without a running server.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{StardogError, StardogResult};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Transport that answers from a queue of canned responses
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<StardogResult<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response
    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a 200 with the given body
    pub fn push_ok(&self, body: &str) -> &Self {
        self.push_response(HttpResponse::ok(body))
    }

    /// Queue an empty response with the given status
    pub fn push_status(&self, status: u16) -> &Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.push_response(HttpResponse::new(status))
    }

    /// Queue a failure that happens before any response exists
    pub fn push_transport_error(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(StardogError::Transport(message.to_string())));
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> StardogResult<HttpResponse> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(StardogError::Transport(format!(
                    "no scripted response for {}",
                    path
                )))
            })
    }
}
