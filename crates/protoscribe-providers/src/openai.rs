//! OpenAI-compatible chat-completion client

use async_trait::async_trait;
use protoscribe_protocol::{Completion, CompletionRequest, FinishReason, TokenUsage};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    classify_error, traits::ProviderResult, CompletionClient, ProviderConfig, ProviderError,
};

/// Chat-completion client for `POST {base_url}/v1/chat/completions`
pub struct OpenAIClient {
    client: Client,
    config: ProviderConfig,
}

impl OpenAIClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::Configuration("API key required for OpenAI".into()))?;

        if api_key.expose_secret().trim().is_empty() {
            return Err(ProviderError::Configuration("API key is empty".into()));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", api_key.expose_secret().trim())
                .parse()
                .map_err(|_| ProviderError::Configuration("Invalid API key format".into()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(120));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn build_request(request: &CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }

    fn convert_response(response: OpenAIResponse) -> ProviderResult<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyCompletion)?;

        let text = choice
            .message
            .content
            .ok_or(ProviderError::EmptyCompletion)?;

        Ok(Completion {
            model: response.model,
            text,
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_api),
            usage: response
                .usage
                .map(|u| TokenUsage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                })
                .unwrap_or_default(),
        })
    }
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout {
            message: error.to_string(),
        }
    } else {
        ProviderError::Network(error)
    }
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        let body = Self::build_request(request);
        let url = self.config.completions_url();

        tracing::debug!(
            model = %request.model,
            temperature = request.temperature,
            max_tokens = ?request.max_output_tokens,
            prompt_len = request.prompt().map(str::len).unwrap_or(0),
            "sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error = classify_error(status.as_u16(), &text, &request.model);
            tracing::warn!(status = status.as_u16(), error = %error, "completion request failed");
            return Err(error);
        }

        let api_response: OpenAIResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                ProviderError::InvalidResponse(format!("malformed completion body: {}", e))
            } else {
                transport_error(e)
            }
        })?;

        let completion = Self::convert_response(api_response)?;
        tracing::debug!(
            model = %completion.model,
            output_len = completion.text.len(),
            output_tokens = completion.usage.output_tokens,
            "completion received"
        );
        if completion.is_truncated() {
            tracing::warn!(model = %completion.model, "completion stopped at the output token limit");
        }

        Ok(completion)
    }

    fn provider(&self) -> &str {
        "openai"
    }
}

// API request/response types
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
