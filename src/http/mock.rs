//! In-memory transport used by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LLMError;

use super::{HttpRequest, HttpResponse, HttpTransport};

/// Replies with a fixed status and body, and records every request it sees.
pub(crate) struct MockTransport {
    status: u16,
    body: Vec<u8>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().expect("mock lock").len()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .expect("mock lock")
            .last()
            .cloned()
            .expect("no request recorded")
    }

    pub(crate) fn last_body(&self) -> serde_json::Value {
        let request = self.last_request();
        serde_json::from_slice(&request.body.expect("request body")).expect("JSON body")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError> {
        self.requests.lock().expect("mock lock").push(request);
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Fails every call the way a refused connection would.
pub(crate) struct FailingTransport;

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, LLMError> {
        Err(LLMError::transport("connection refused"))
    }
}
