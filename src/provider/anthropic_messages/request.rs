use crate::types::GenerationRequest;

use super::types::{AnthropicMessage, AnthropicMessageRequest};

/// Builds the Messages body: the system prompt goes into the top-level `system`
/// field and the user message is the only turn.
pub(crate) fn build_anthropic_body(request: &GenerationRequest) -> AnthropicMessageRequest<'_> {
    AnthropicMessageRequest {
        model: request.model(),
        max_tokens: request.max_tokens(),
        system: request.system_prompt(),
        messages: vec![AnthropicMessage {
            role: "user",
            content: request.user_message(),
        }],
    }
}
