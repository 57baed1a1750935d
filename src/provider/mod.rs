use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

use crate::error::LLMError;
use crate::http::HttpResponse;
use crate::types::GenerationRequest;

pub mod anthropic_messages;
pub mod openai_chat;

/// 统一的 Adapter Trait 每个供应商实现该接口即可接入 Gateway
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// 发送一次请求并返回归一化后的文本 无可提取文本时返回空字符串
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError>;

    /// 供应商名称
    fn name(&self) -> &'static str;
}

/// 线程安全 Adapter
pub type DynAdapter = Arc<dyn ProviderAdapter>;

/// Joins a base URL and a versioned path without doubling `/v1`.
pub(crate) fn versioned_endpoint(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{base}/{path}")
    } else {
        format!("{base}/v1/{path}")
    }
}

/// Returns the body of a 2xx response, or the raw body wrapped in [`LLMError::Vendor`].
///
/// Error bodies are decoded lossily so the status survives a body that is not UTF-8.
pub(crate) fn ensure_success(
    provider: &'static str,
    response: HttpResponse,
) -> Result<String, LLMError> {
    if response.is_success() {
        return response.into_string();
    }
    Err(LLMError::Vendor {
        provider,
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

/// Decodes a 2xx body into a lenient response type.
///
/// Only a body that is not JSON is an error. JSON of an unexpected shape decodes as the
/// default value, which extracts to empty text.
pub(crate) fn decode_body<T>(provider: &'static str, text: &str) -> Result<T, LLMError>
where
    T: DeserializeOwned + Default,
{
    let value: Value = serde_json::from_str(text).map_err(|err| LLMError::Provider {
        provider,
        message: format!("response body is not JSON: {err}"),
    })?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// `deserialize_with` helper: a field of the wrong shape (including `null`) becomes its
/// default.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// `deserialize_with` helper for arrays. Anything but an array is empty; a malformed
/// element becomes a default element so indices are preserved.
pub(crate) fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
