//! Provider-agnostic completion types and the `LlmProvider` trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// A completion request: one self-contained prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub text: String,
}

impl CompletionRequest {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Text returned by a provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// A language model that turns prompt text into response text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Run one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
