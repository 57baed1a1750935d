use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LLMError;
use crate::http::{DynHttpTransport, send_json};
use crate::provider::{ProviderAdapter, decode_body, ensure_success, versioned_endpoint};
use crate::types::GenerationRequest;

use super::request::build_openai_body;
use super::response::extract_text;
use super::types::OpenAiChatResponse;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI Chat Completions Adapter
pub struct OpenAiChatProvider {
    pub(crate) transport: DynHttpTransport,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) organization: Option<String>,
}

impl OpenAiChatProvider {
    /// 创建带默认 base_url 的 Adapter
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            organization: None,
        }
    }

    /// 自定义 base_url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 配置组织 ID
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        versioned_endpoint(&self.base_url, "chat/completions")
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        );
        if let Some(org) = &self.organization {
            headers.insert("OpenAI-Organization".to_string(), org.clone());
        }
        headers
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiChatProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError> {
        let endpoint = self.endpoint();
        debug!(
            provider = self.name(),
            model = request.model(),
            max_tokens = request.max_tokens(),
            %endpoint,
            "sending chat completions request"
        );
        let body = build_openai_body(request);
        let response = send_json(
            self.transport.as_ref(),
            endpoint,
            self.build_headers(),
            &body,
        )
        .await?;
        let text = ensure_success(self.name(), response)?;
        let parsed: OpenAiChatResponse = decode_body(self.name(), &text)?;
        let output = extract_text(&parsed);
        if output.is_empty() {
            let finish_reason = parsed
                .choices
                .first()
                .and_then(|choice| choice.finish_reason.as_deref())
                .unwrap_or("unknown");
            warn!(
                provider = self.name(),
                finish_reason,
                "response carried no text in choices[0].message.content"
            );
        }
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
