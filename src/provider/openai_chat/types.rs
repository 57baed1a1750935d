use serde::{Deserialize, Serialize};

use crate::provider::{list_or_empty, or_default};

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct OpenAiChatRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) max_tokens: u32,
    pub(crate) messages: Vec<OpenAiChatMessage<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OpenAiChatMessage<'a> {
    pub(crate) role: &'static str,
    pub(crate) content: &'a str,
}

/// Missing, `null` or mistyped fields decode as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiChatResponse {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub(crate) choices: Vec<OpenAiResponseChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiResponseChoice {
    #[serde(default, deserialize_with = "or_default")]
    pub(crate) message: Option<OpenAiResponseMessage>,
    #[serde(default, deserialize_with = "or_default")]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiResponseMessage {
    #[serde(default, deserialize_with = "or_default")]
    pub(crate) content: Option<OpenAiMessageContent>,
}

/// Compatible servers sometimes return content as a list of typed parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OpenAiMessageContent {
    Text(String),
    Parts(Vec<OpenAiMessagePart>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OpenAiMessagePart {
    #[serde(default, rename = "type", deserialize_with = "or_default")]
    pub(crate) kind: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub(crate) text: Option<String>,
}
