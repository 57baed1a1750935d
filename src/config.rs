use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LLMError;
use crate::provider::{anthropic_messages, openai_chat};
use crate::types::{DEFAULT_MAX_TOKENS, PromptLibrary, Provider};

/// Gateway 配置 凭证、端点与默认参数都从这里进入
///
/// Built explicitly and handed to [`crate::gateway::Gateway`]; nothing below the
/// gateway reads the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub anthropic: AnthropicSettings,
    pub openai: OpenAiSettings,
    /// Token budget used when a call does not set one.
    pub default_max_tokens: u32,
    /// Root of the persona prompt library.
    pub prompt_dir: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            anthropic: AnthropicSettings::default(),
            openai: OpenAiSettings::default(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            prompt_dir: PathBuf::from("prompts"),
        }
    }
}

/// Anthropic 相关设置
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Value of the `anthropic-version` header.
    pub version: String,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: anthropic_messages::DEFAULT_BASE_URL.to_string(),
            version: anthropic_messages::DEFAULT_VERSION.to_string(),
        }
    }
}

impl fmt::Debug for AnthropicSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicSettings")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish()
    }
}

/// OpenAI 相关设置
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub organization: Option<String>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: openai_chat::DEFAULT_BASE_URL.to_string(),
            organization: None,
        }
    }
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .finish()
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl GatewayConfig {
    /// 从进程环境变量构建配置
    pub fn from_env() -> Result<Self, LLMError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitclaw_llm::config::GatewayConfig;
    ///
    /// let config = GatewayConfig::from_lookup(|key| match key {
    ///     "OPENAI_API_KEY" => Some("sk-test".to_string()),
    ///     "GITCLAW_MAX_TOKENS" => Some("1500".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    /// assert_eq!(config.default_max_tokens, 1500);
    /// assert!(config.anthropic.api_key.is_none());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::InvalidConfig`] when `GITCLAW_MAX_TOKENS` is not a positive
    /// integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LLMError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().merge_lookup(lookup)
    }

    /// Loads a JSON configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::InvalidConfig`] when the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, LLMError> {
        let text = fs::read_to_string(path).map_err(|err| LLMError::InvalidConfig {
            field: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|err| LLMError::InvalidConfig {
            field: path.display().to_string(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays looked-up values.
    ///
    /// Credentials and the organization only fill fields that are still empty; the
    /// remaining keys override whatever is set when present.
    pub fn merge_lookup<F>(mut self, lookup: F) -> Result<Self, LLMError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self.anthropic.api_key.is_none() {
            self.anthropic.api_key = get(Provider::Anthropic.credential_env_var());
        }
        if self.openai.api_key.is_none() {
            self.openai.api_key = get(Provider::OpenAi.credential_env_var());
        }
        if self.openai.organization.is_none() {
            self.openai.organization = get("OPENAI_ORGANIZATION");
        }
        if let Some(base_url) = get("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = base_url;
        }
        if let Some(version) = get("ANTHROPIC_VERSION") {
            self.anthropic.version = version;
        }
        if let Some(base_url) = get("OPENAI_BASE_URL") {
            self.openai.base_url = base_url;
        }
        if let Some(dir) = get("GITCLAW_PROMPTS_DIR") {
            self.prompt_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("GITCLAW_MAX_TOKENS") {
            self.default_max_tokens =
                raw.trim()
                    .parse::<u32>()
                    .map_err(|err| LLMError::InvalidConfig {
                        field: "GITCLAW_MAX_TOKENS".to_string(),
                        reason: err.to_string(),
                    })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Returns the configured credential for `provider`, if any.
    pub fn credential(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Anthropic => self.anthropic.api_key.as_deref(),
            Provider::OpenAi => self.openai.api_key.as_deref(),
        }
    }

    pub fn prompt_library(&self) -> PromptLibrary {
        PromptLibrary::new(self.prompt_dir.clone())
    }

    fn validate(&self) -> Result<(), LLMError> {
        if self.default_max_tokens == 0 {
            return Err(LLMError::InvalidConfig {
                field: "default_max_tokens".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
