use std::path::PathBuf;

use thiserror::Error;

/// Aggregates every failure mode exposed by the gateway.
///
/// The variants fall into three groups: configuration errors (unknown provider,
/// missing credential, missing prompt file, invalid configuration), transport and
/// vendor errors, and request construction errors. None of them is retried inside
/// the crate; callers decide whether to log, retry or abort.
#[derive(Debug, Error)]
pub enum LLMError {
    /// A provider name did not match any supported backend.
    #[error("unknown provider: {name}")]
    UnknownProvider { name: String },
    /// The credential required by the selected provider is not configured.
    #[error("missing credential for provider {provider}: set {env_var}")]
    MissingCredential {
        /// Provider identifier, such as `anthropic`.
        provider: &'static str,
        /// Environment variable that normally carries the credential.
        env_var: &'static str,
    },
    /// A prompt file could not be read.
    #[error("prompt source missing: {}: {reason}", path.display())]
    PromptSourceMissing {
        /// Path that was referenced by the prompt source.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },
    /// Raised when building or validating configuration fails.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the configuration field that failed validation.
        field: String,
        /// Additional context explaining why the field is invalid.
        reason: String,
    },
    /// Signals validation failures in the request payload.
    #[error("invalid request: {message}")]
    Validation { message: String },
    /// Represents transport-layer or networking failures.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// A vendor answered with a non-success status.
    ///
    /// The body is kept verbatim so the operator sees exactly what the vendor said.
    #[error("provider {provider} returned status {status}: {body}")]
    Vendor {
        /// Name of the provider, such as `openai`.
        provider: &'static str,
        /// HTTP status code returned by the vendor.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// A success response whose body could not be decoded at all.
    #[error("provider {provider} error: {message}")]
    Provider {
        /// Name of the provider, such as `anthropic`.
        provider: &'static str,
        /// Human-readable description of the decoding failure.
        message: String,
    },
}

impl LLMError {
    /// Creates an [`LLMError::Transport`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitclaw_llm::error::LLMError;
    ///
    /// let err = LLMError::transport("dns lookup failed");
    /// assert!(matches!(err, LLMError::Transport { .. }));
    /// ```
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an [`LLMError::Provider`] with the given provider name and message.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitclaw_llm::error::LLMError;
    ///
    /// let err = LLMError::provider("openai", "bad JSON payload");
    /// assert!(matches!(err, LLMError::Provider { provider: "openai", .. }));
    /// ```
    pub fn provider<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Returns `true` for the configuration class of errors.
    ///
    /// These are raised before any request leaves the process.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownProvider { .. }
                | Self::MissingCredential { .. }
                | Self::PromptSourceMissing { .. }
                | Self::InvalidConfig { .. }
        )
    }
}
