//! Completion client trait

use async_trait::async_trait;
use protoscribe_protocol::{Completion, CompletionRequest};

use crate::ProviderError;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A remote text-completion service
///
/// Each call is a single attempt; implementations never retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and return the first candidate
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion>;

    /// Send `prompt` under `system_role` and return the first candidate's text
    async fn complete_text(
        &self,
        prompt: &str,
        system_role: &str,
        model: &str,
        temperature: f32,
        max_output_tokens: Option<u32>,
    ) -> ProviderResult<String> {
        let request = CompletionRequest::new(model, system_role, prompt, temperature)
            .with_max_output_tokens(max_output_tokens);
        Ok(self.complete(&request).await?.text)
    }

    /// Get the provider name
    fn provider(&self) -> &str;
}
