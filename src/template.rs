//! Placeholder substitution for persona prompts.
//!
//! A placeholder is `{{key}}`, matched literally (no whitespace trimming). Each key in
//! the [`TemplateContext`] other than `user_message` is replaced by its value in a
//! single left-to-right pass. Substituted values are copied to the output and never
//! scanned again, so a value that itself contains `{{...}}` stays as written.
//! Placeholders without a matching key are left untouched.

use tracing::debug;

use crate::error::LLMError;
use crate::types::{PromptSource, TemplateContext, USER_MESSAGE_KEY};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Output of [`render`]: the system prompt and the user message for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system_prompt: String,
    pub user_message: String,
}

/// Resolves `source`, substitutes placeholders and extracts the user message.
///
/// # Examples
///
/// ```
/// use gitclaw_llm::template::render;
/// use gitclaw_llm::types::{PromptSource, TemplateContext};
///
/// let context = TemplateContext::new().with("name", "Ada").with("lvl", "3");
/// let rendered = render(&PromptSource::from("Hello {{name}}, level {{lvl}}"), &context).unwrap();
/// assert_eq!(rendered.system_prompt, "Hello Ada, level 3");
/// assert_eq!(rendered.user_message, "Execute your task.");
/// ```
///
/// # Errors
///
/// Returns [`LLMError::PromptSourceMissing`] when a file source cannot be read.
pub fn render(source: &PromptSource, context: &TemplateContext) -> Result<RenderedPrompt, LLMError> {
    let text = source.resolve()?;
    debug!(
        source = source.kind(),
        bytes = text.len(),
        keys = context.len(),
        "rendering prompt"
    );
    Ok(RenderedPrompt {
        system_prompt: substitute(&text, context),
        user_message: context.user_message().to_string(),
    })
}

/// Replaces `{{key}}` placeholders in `text` with values from `context`.
///
/// The reserved `user_message` key is never substituted.
pub fn substitute(text: &str, context: &TemplateContext) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match lookup_placeholder(candidate, context) {
            Some((value, consumed)) => {
                output.push_str(value);
                rest = &candidate[consumed..];
            }
            None => {
                // Not a known placeholder here; emit one brace and rescan from the next
                // byte so `{{{key}}}` still finds `{{key}}`.
                output.push('{');
                rest = &candidate[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

/// Matches a placeholder at the start of `candidate`, returning its value and the
/// number of bytes it spans.
///
/// Keys are compared literally, so a key may itself contain `}}`. When several keys
/// match, the first one in context order wins.
fn lookup_placeholder<'a>(candidate: &str, context: &'a TemplateContext) -> Option<(&'a str, usize)> {
    let inner = &candidate[OPEN.len()..];
    context
        .iter()
        .filter(|(key, _)| *key != USER_MESSAGE_KEY)
        .find(|(key, _)| {
            inner
                .strip_prefix(*key)
                .is_some_and(|after| after.starts_with(CLOSE))
        })
        .map(|(key, value)| (value, OPEN.len() + key.len() + CLOSE.len()))
}
