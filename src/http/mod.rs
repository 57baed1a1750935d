//! Thin HTTP seam between the adapters and the network.
//!
//! Adapters only ever build an [`HttpRequest`] and hand it to an [`HttpTransport`].
//! Swapping the transport is how tests serve fixtures and count outgoing calls.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LLMError;

pub mod reqwest;

#[cfg(test)]
pub(crate) mod mock;

/// A POST request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Starts a POST request with no headers and no body.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Merges a set of headers into the request.
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Serializes `body` as the JSON payload.
    ///
    /// The `Content-Type` header is left to the caller so the header set stays exactly
    /// what the vendor contract lists.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitclaw_llm::http::HttpRequest;
    /// use serde_json::json;
    ///
    /// let request = HttpRequest::post("https://example.com")
    ///     .json_body(&json!({"model": "gpt-4o"}))
    ///     .unwrap();
    /// assert_eq!(request.body.as_deref(), Some(br#"{"model":"gpt-4o"}"#.as_slice()));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Validation`] when serialization fails.
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Result<Self, LLMError> {
        let payload = serde_json::to_vec(body).map_err(|err| LLMError::Validation {
            message: format!("failed to serialize request: {err}"),
        })?;
        self.body = Some(payload);
        Ok(self)
    }
}

/// Status and fully buffered body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Transport`] for bodies that are not valid UTF-8.
    pub fn into_string(self) -> Result<String, LLMError> {
        String::from_utf8(self.body)
            .map_err(|err| LLMError::transport(format!("response body is not UTF-8: {err}")))
    }
}

/// Sends requests on behalf of the adapters.
///
/// A non-2xx status is a normal response here; the adapters decide what it means.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`LLMError::Transport`] when no response could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError>;
}

/// Thread-safe handle to a transport implementation.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Serializes `body`, attaches `headers` and POSTs it to `url`.
///
/// # Errors
///
/// Returns [`LLMError::Validation`] when serialization fails; nothing is sent in that
/// case. Otherwise forwards the transport result.
pub async fn send_json<T: Serialize>(
    transport: &dyn HttpTransport,
    url: impl Into<String>,
    headers: HashMap<String, String>,
    body: &T,
) -> Result<HttpResponse, LLMError> {
    let request = HttpRequest::post(url).headers(headers).json_body(body)?;
    transport.send(request).await
}
