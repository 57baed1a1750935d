//! GitClaw 人格调用网关：统一的 LLM 调用入口与提示词模板渲染

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod provider;
pub mod template;
pub mod types;

pub use config::GatewayConfig;
pub use error::LLMError;
pub use gateway::Gateway;
pub use provider::ProviderAdapter;
pub use template::{RenderedPrompt, render};
pub use types::*;
