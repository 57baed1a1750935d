//! Request-scoped value types shared by the gateway, the adapters and the template renderer.
//!
//! Every type here is built at the start of one invocation and dropped at the end of it;
//! none of them carries identity beyond value equality.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LLMError;

/// Default completion budget when the caller does not pick one.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Context key extracted as the user message instead of being substituted.
pub const USER_MESSAGE_KEY: &str = "user_message";

/// User message sent when the context does not provide one.
pub const DEFAULT_USER_MESSAGE: &str = "Execute your task.";

/// Supported vendor backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
}

impl Provider {
    /// Every provider, in a stable order.
    pub const ALL: [Provider; 2] = [Provider::Anthropic, Provider::OpenAi];

    /// Lowercase identifier used on the command line and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        }
    }

    /// Environment variable carrying this provider's credential.
    pub fn credential_env_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| LLMError::UnknownProvider {
                name: name.to_string(),
            })
    }
}

/// A single, fully resolved generation request.
///
/// Construction validates the request, after which it cannot be changed. One request
/// maps to exactly one vendor call.
///
/// # Examples
///
/// ```
/// use gitclaw_llm::types::{GenerationRequest, Provider};
///
/// let request = GenerationRequest::new(Provider::OpenAi, "gpt-4o", "You are terse.", "Say hi", 16)
///     .unwrap();
/// assert_eq!(request.max_tokens(), 16);
/// assert_eq!(request.provider(), Provider::OpenAi);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    provider: Provider,
    model: String,
    system_prompt: String,
    user_message: String,
    max_tokens: u32,
}

impl GenerationRequest {
    /// Builds a request, rejecting an empty model name or a zero token budget.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Validation`] when `model` is blank or `max_tokens` is zero.
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_message: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, LLMError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LLMError::Validation {
                message: format!("model is required for {provider}"),
            });
        }
        if max_tokens == 0 {
            return Err(LLMError::Validation {
                message: "max_tokens must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            provider,
            model,
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            max_tokens,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Normalized output of one successful vendor call.
///
/// An empty `text` is a valid result: the vendor answered but produced nothing
/// extractable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
}

/// Ordered mapping from placeholder key to substitution value.
///
/// Keys are stored without the `{{ }}` delimiters. Inserting an existing key replaces
/// its value in place and keeps the original position.
///
/// # Examples
///
/// ```
/// use gitclaw_llm::types::TemplateContext;
///
/// let mut context = TemplateContext::new();
/// context.insert("name", "Ada");
/// context.insert("lvl", "3");
/// context.insert("name", "Grace");
/// assert_eq!(context.get("name"), Some("Grace"));
/// assert_eq!(context.keys().collect::<Vec<_>>(), vec!["name", "lvl"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    entries: Vec<(String, String)>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style variant of [`TemplateContext::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the reserved user message, falling back to [`DEFAULT_USER_MESSAGE`]
    /// when it is absent or blank.
    pub fn user_message(&self) -> &str {
        match self.get(USER_MESSAGE_KEY) {
            Some(message) if !message.trim().is_empty() => message,
            _ => DEFAULT_USER_MESSAGE,
        }
    }

    /// Builds a context from a flat JSON object.
    ///
    /// Strings are taken as-is, numbers and booleans use their JSON spelling, `null`
    /// entries are skipped and nested values are kept as compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::InvalidConfig`] when `value` is not a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, LLMError> {
        let object = value.as_object().ok_or_else(|| LLMError::InvalidConfig {
            field: "context".to_string(),
            reason: "expected a JSON object of key/value pairs".to_string(),
        })?;
        let mut context = Self::new();
        for (key, value) in object {
            let text = match value {
                Value::Null => continue,
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            context.insert(key.clone(), text);
        }
        Ok(context)
    }
}

impl<K, V> FromIterator<(K, V)> for TemplateContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Where prompt text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// Prompt text given inline.
    Literal(String),
    /// Prompt text stored in a file.
    File(PathBuf),
}

impl PromptSource {
    /// Interprets a command-line argument: an existing file becomes
    /// [`PromptSource::File`], anything else is literal text.
    pub fn from_arg(arg: &str) -> Self {
        let path = Path::new(arg);
        if !arg.is_empty() && path.is_file() {
            PromptSource::File(path.to_path_buf())
        } else {
            PromptSource::Literal(arg.to_string())
        }
    }

    /// Reads the prompt text. Files are read on every call.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::PromptSourceMissing`] when a file source cannot be read.
    pub fn resolve(&self) -> Result<String, LLMError> {
        match self {
            PromptSource::Literal(text) => Ok(text.clone()),
            PromptSource::File(path) => {
                fs::read_to_string(path).map_err(|err| LLMError::PromptSourceMissing {
                    path: path.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PromptSource::Literal(_) => "literal",
            PromptSource::File(_) => "file",
        }
    }
}

impl From<&str> for PromptSource {
    fn from(text: &str) -> Self {
        PromptSource::Literal(text.to_string())
    }
}

impl From<String> for PromptSource {
    fn from(text: String) -> Self {
        PromptSource::Literal(text)
    }
}

impl From<PathBuf> for PromptSource {
    fn from(path: PathBuf) -> Self {
        PromptSource::File(path)
    }
}

/// 人格提示词目录 每个人格对应 `<root>/<name>.md`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLibrary {
    root: PathBuf,
}

impl PromptLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a persona name such as `fortune-cookie` to its prompt file.
    ///
    /// The file is not touched here; a missing file surfaces when the source is
    /// resolved.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::InvalidConfig`] for empty names or names that would escape
    /// the library root.
    pub fn source(&self, persona: &str) -> Result<PromptSource, LLMError> {
        let persona = persona.trim();
        let relative = Path::new(persona);
        let is_plain_name = !persona.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
            && relative.components().count() == 1;
        if !is_plain_name {
            return Err(LLMError::InvalidConfig {
                field: "persona".to_string(),
                reason: format!("`{persona}` is not a plain persona name"),
            });
        }
        Ok(PromptSource::File(self.root.join(format!("{persona}.md"))))
    }
}
