use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LLMError;
use crate::http::{DynHttpTransport, send_json};
use crate::provider::{ProviderAdapter, decode_body, ensure_success, versioned_endpoint};
use crate::types::GenerationRequest;

use super::request::build_anthropic_body;
use super::response::extract_text;
use super::types::AnthropicMessageResponse;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(crate) const DEFAULT_VERSION: &str = "2023-06-01";

/// Anthropic Messages Adapter
pub struct AnthropicMessagesProvider {
    pub(crate) transport: DynHttpTransport,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) version: String,
}

impl AnthropicMessagesProvider {
    /// 使用默认 base_url 与 anthropic-version 创建 Adapter
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// 自定义 base_url，便于接入代理或兼容层
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 自定义 Anthropic API 版本（anthropic-version）
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        versioned_endpoint(&self.base_url, "messages")
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("x-api-key".to_string(), self.api_key.clone());
        headers.insert("anthropic-version".to_string(), self.version.clone());
        headers
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicMessagesProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError> {
        let endpoint = self.endpoint();
        debug!(
            provider = self.name(),
            model = request.model(),
            max_tokens = request.max_tokens(),
            %endpoint,
            "sending messages request"
        );
        let body = build_anthropic_body(request);
        let response = send_json(
            self.transport.as_ref(),
            endpoint,
            self.build_headers(),
            &body,
        )
        .await?;
        let text = ensure_success(self.name(), response)?;
        let parsed: AnthropicMessageResponse = decode_body(self.name(), &text)?;
        let output = extract_text(&parsed);
        if output.is_empty() {
            let first_block = parsed
                .content
                .first()
                .and_then(|block| block.kind.as_deref())
                .unwrap_or("none");
            warn!(
                provider = self.name(),
                first_block,
                stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
                "response carried no text in content[0]"
            );
        }
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}
