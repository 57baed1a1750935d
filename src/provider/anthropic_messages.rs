//! Anthropic Messages API adapter.

mod provider;
mod request;
mod response;
mod types;

pub use provider::AnthropicMessagesProvider;
pub(crate) use provider::{DEFAULT_BASE_URL, DEFAULT_VERSION};
