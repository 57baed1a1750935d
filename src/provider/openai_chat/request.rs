use crate::types::GenerationRequest;

use super::types::{OpenAiChatMessage, OpenAiChatRequest};

/// Builds the Chat Completions body: a `system` turn followed by a `user` turn.
pub(crate) fn build_openai_body(request: &GenerationRequest) -> OpenAiChatRequest<'_> {
    OpenAiChatRequest {
        model: request.model(),
        max_tokens: request.max_tokens(),
        messages: vec![
            OpenAiChatMessage {
                role: "system",
                content: request.system_prompt(),
            },
            OpenAiChatMessage {
                role: "user",
                content: request.user_message(),
            },
        ],
    }
}
