use super::types::{OpenAiChatResponse, OpenAiMessageContent};

/// Extracts `choices[0].message.content`.
///
/// Missing choices, a missing message or a `null` content all yield `""`. Part lists
/// are flattened by concatenating their text parts.
pub(crate) fn extract_text(resp: &OpenAiChatResponse) -> String {
    let content = resp
        .choices
        .first()
        .and_then(|choice| choice.message.as_ref())
        .and_then(|message| message.content.as_ref());
    match content {
        None => String::new(),
        Some(OpenAiMessageContent::Text(text)) => text.clone(),
        Some(OpenAiMessageContent::Parts(parts)) => parts
            .iter()
            .filter(|part| matches!(part.kind.as_deref(), None | Some("text")))
            .filter_map(|part| part.text.as_deref())
            .collect(),
    }
}
