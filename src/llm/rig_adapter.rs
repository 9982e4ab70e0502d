//! Bridges rig's `Prompt` trait to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::Prompt;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// Wraps a configured rig agent. The agent has no preamble; every request
/// carries its full instructions in the prompt.
pub struct RigAdapter<A> {
    agent: A,
    model_name: String,
    provider: &'static str,
}

impl<A> RigAdapter<A>
where
    A: Prompt + Send + Sync,
{
    pub fn new(agent: A, model_name: &str, provider: &'static str) -> Self {
        Self {
            agent,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<A> LlmProvider for RigAdapter<A>
where
    A: Prompt + Send + Sync,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let content = self
            .agent
            .prompt(request.text)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.to_string(),
                reason: e.to_string(),
            })?;

        Ok(CompletionResponse { content })
    }
}
