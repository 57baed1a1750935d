//! OpenAI Chat Completions adapter.

mod provider;
mod request;
mod response;
mod types;

pub use provider::OpenAiChatProvider;
pub(crate) use provider::DEFAULT_BASE_URL;
