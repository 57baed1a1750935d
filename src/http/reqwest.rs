use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::LLMError;

use super::{DynHttpTransport, HttpRequest, HttpResponse, HttpTransport};

/// 基于 reqwest 的默认 Transport 不做重试 超时沿用 reqwest 默认值 响应头不保留
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 使用自定义 reqwest::Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 使用默认设置构建 Client
    pub fn with_defaults() -> Result<Self, LLMError> {
        let client = Client::builder()
            .build()
            .map_err(|err| LLMError::transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError> {
        let HttpRequest { url, headers, body } = request;

        let mut builder = self.client.post(url).headers(to_header_map(&headers)?);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(describe_failure)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(describe_failure)?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

fn to_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, LLMError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::try_from(name.as_str())
            .map_err(|err| LLMError::transport(format!("invalid header name {name}: {err}")))?;
        let header_value = HeaderValue::try_from(value.as_str())
            .map_err(|err| LLMError::transport(format!("invalid value for header {name}: {err}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn describe_failure(err: reqwest::Error) -> LLMError {
    if err.is_timeout() {
        LLMError::transport(format!("request timed out: {err}"))
    } else if err.is_connect() {
        LLMError::transport(format!("connection failed: {err}"))
    } else {
        LLMError::transport(err.to_string())
    }
}

/// 便捷构造线程安全 Transport
pub fn default_dyn_transport() -> Result<DynHttpTransport, LLMError> {
    Ok(Arc::new(ReqwestTransport::with_defaults()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_carries_contract_headers() {
        let headers = HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), "Bearer sk-test".to_string()),
        ]);

        let map = to_header_map(&headers).expect("valid headers");

        assert_eq!(map.len(), 2);
        // Lookup is case-insensitive.
        assert_eq!(map["content-type"], "application/json");
        assert_eq!(map["AUTHORIZATION"], "Bearer sk-test");
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let headers = HashMap::from([("bad header".to_string(), "v".to_string())]);
        assert!(matches!(
            to_header_map(&headers),
            Err(LLMError::Transport { .. })
        ));
    }

    #[test]
    fn credential_with_newline_is_rejected() {
        let headers = HashMap::from([("x-api-key".to_string(), "sk\ninjected".to_string())]);
        assert!(matches!(
            to_header_map(&headers),
            Err(LLMError::Transport { .. })
        ));
    }
}
