use super::types::AnthropicMessageResponse;

/// Extracts `content[0].text`; a missing block or a block without text yields `""`.
pub(crate) fn extract_text(resp: &AnthropicMessageResponse) -> String {
    resp.content
        .first()
        .and_then(|block| block.text.clone())
        .unwrap_or_default()
}
