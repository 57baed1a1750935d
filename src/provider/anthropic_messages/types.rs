use serde::{Deserialize, Serialize};

use crate::provider::{list_or_empty, or_default};

/// Request body for `POST /v1/messages`.
///
/// Field order matches the wire contract: `model`, `max_tokens`, `system`, `messages`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnthropicMessageRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) max_tokens: u32,
    pub(crate) system: &'a str,
    pub(crate) messages: Vec<AnthropicMessage<'a>>,
}

/// Single conversation turn with plain string content.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnthropicMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

/// Non-streaming response payload returned by Anthropic Messages.
///
/// Only the fields needed for text extraction are modeled. Missing, `null` or
/// mistyped fields decode as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnthropicMessageResponse {
    /// Ordered list of content blocks.
    #[serde(default, deserialize_with = "list_or_empty")]
    pub(crate) content: Vec<AnthropicContentBlock>,
    #[serde(default, deserialize_with = "or_default")]
    pub(crate) stop_reason: Option<String>,
}

/// Single content block. Non-text blocks carry no `text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AnthropicContentBlock {
    #[serde(default, rename = "type", deserialize_with = "or_default")]
    pub(crate) kind: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub(crate) text: Option<String>,
}
