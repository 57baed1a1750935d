use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::GatewayConfig;
use crate::error::LLMError;
use crate::http::DynHttpTransport;
use crate::http::reqwest::default_dyn_transport;
use crate::provider::DynAdapter;
use crate::provider::anthropic_messages::AnthropicMessagesProvider;
use crate::provider::openai_chat::OpenAiChatProvider;
use crate::template::render;
use crate::types::{GenerationRequest, GenerationResult, PromptSource, Provider, TemplateContext};

/// LLM 调用唯一入口 负责按 Provider 选择 Adapter
///
/// Holds configuration and a transport, never per-call state, so a single gateway can
/// serve concurrent invocations.
pub struct Gateway {
    config: GatewayConfig,
    transport: DynHttpTransport,
    adapters: HashMap<Provider, DynAdapter>,
}

impl Gateway {
    /// 创建 Builder 便于替换 Transport 或注册自定义 Adapter
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder {
            config,
            transport: None,
            adapters: HashMap::new(),
        }
    }

    /// 使用给定 Transport 创建 Gateway
    pub fn new(config: GatewayConfig, transport: DynHttpTransport) -> Self {
        Self {
            config,
            transport,
            adapters: HashMap::new(),
        }
    }

    /// 从环境变量与默认 reqwest Transport 创建 Gateway
    pub fn from_env() -> Result<Self, LLMError> {
        Self::builder(GatewayConfig::from_env()?).build()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends one request through the adapter registered for its provider.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::MissingCredential`] before any network call when the provider
    /// has no credential, otherwise whatever the adapter reports.
    pub async fn dispatch(&self, request: GenerationRequest) -> Result<GenerationResult, LLMError> {
        let provider = request.provider();
        let adapter = self.adapter(provider)?;
        debug!(
            provider = adapter.name(),
            model = request.model(),
            max_tokens = request.max_tokens(),
            "dispatching generation request"
        );
        let text = adapter.generate(&request).await?;
        info!(
            provider = adapter.name(),
            model = request.model(),
            chars = text.chars().count(),
            "generation complete"
        );
        Ok(GenerationResult { text })
    }

    /// Resolves the system prompt and invokes `provider`.
    ///
    /// `max_tokens` falls back to [`GatewayConfig::default_max_tokens`].
    ///
    /// # Errors
    ///
    /// Propagates prompt resolution, request validation, credential and adapter errors
    /// unchanged.
    pub async fn invoke(
        &self,
        provider: Provider,
        model: &str,
        system_prompt: &PromptSource,
        user_message: &str,
        max_tokens: Option<u32>,
    ) -> Result<String, LLMError> {
        let system_prompt = system_prompt.resolve()?;
        self.generate_text(provider, model, system_prompt, user_message.to_string(), max_tokens)
            .await
    }

    /// Renders `prompt` with `context`, then invokes `provider` with the result.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::invoke`]; rendering errors are returned as-is.
    pub async fn invoke_with_context(
        &self,
        provider: Provider,
        model: &str,
        prompt: &PromptSource,
        context: &TemplateContext,
        max_tokens: Option<u32>,
    ) -> Result<String, LLMError> {
        let rendered = render(prompt, context)?;
        self.generate_text(
            provider,
            model,
            rendered.system_prompt,
            rendered.user_message,
            max_tokens,
        )
        .await
    }

    /// Looks up `persona` in the configured prompt library and invokes it with `context`.
    pub async fn invoke_persona(
        &self,
        provider: Provider,
        model: &str,
        persona: &str,
        context: &TemplateContext,
        max_tokens: Option<u32>,
    ) -> Result<String, LLMError> {
        let prompt = self.config.prompt_library().source(persona)?;
        self.invoke_with_context(provider, model, &prompt, context, max_tokens)
            .await
    }

    async fn generate_text(
        &self,
        provider: Provider,
        model: &str,
        system_prompt: String,
        user_message: String,
        max_tokens: Option<u32>,
    ) -> Result<String, LLMError> {
        let max_tokens = max_tokens.unwrap_or(self.config.default_max_tokens);
        let request =
            GenerationRequest::new(provider, model, system_prompt, user_message, max_tokens)?;
        self.dispatch(request).await.map(|result| result.text)
    }

    fn adapter(&self, provider: Provider) -> Result<DynAdapter, LLMError> {
        if let Some(adapter) = self.adapters.get(&provider) {
            return Ok(adapter.clone());
        }
        let api_key = self
            .config
            .credential(provider)
            .ok_or_else(|| LLMError::MissingCredential {
                provider: provider.as_str(),
                env_var: provider.credential_env_var(),
            })?;
        let adapter: DynAdapter = match provider {
            Provider::Anthropic => Arc::new(
                AnthropicMessagesProvider::new(self.transport.clone(), api_key)
                    .with_base_url(self.config.anthropic.base_url.clone())
                    .with_version(self.config.anthropic.version.clone()),
            ),
            Provider::OpenAi => {
                let mut adapter = OpenAiChatProvider::new(self.transport.clone(), api_key)
                    .with_base_url(self.config.openai.base_url.clone());
                if let Some(org) = &self.config.openai.organization {
                    adapter = adapter.with_organization(org.clone());
                }
                Arc::new(adapter)
            }
        };
        Ok(adapter)
    }
}

/// 构建 Gateway 的 Builder
pub struct GatewayBuilder {
    config: GatewayConfig,
    transport: Option<DynHttpTransport>,
    adapters: HashMap<Provider, DynAdapter>,
}

impl GatewayBuilder {
    /// 替换默认的 reqwest Transport
    pub fn transport(mut self, transport: DynHttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// 为某个 Provider 注册自定义 Adapter 优先于按配置构建的 Adapter
    pub fn register_adapter(mut self, provider: Provider, adapter: DynAdapter) -> Self {
        self.adapters.insert(provider, adapter);
        self
    }

    /// 构建最终的 Gateway
    pub fn build(self) -> Result<Gateway, LLMError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_dyn_transport()?,
        };
        Ok(Gateway {
            config: self.config,
            transport,
            adapters: self.adapters,
        })
    }
}
