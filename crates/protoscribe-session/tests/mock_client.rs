//! Mock completion client for integration testing
//!
//! Provides a MockCompletionClient that returns queued responses in order
//! and records every request sent to it.

use async_trait::async_trait;
use protoscribe_protocol::{Completion, CompletionRequest, TokenUsage};
use protoscribe_providers::{CompletionClient, ProviderError, ProviderResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A queued response
pub enum MockResponse {
    Text(String),
    Error(ProviderError),
}

/// Mock completion client for testing
#[derive(Default)]
pub struct MockCompletionClient {
    /// Queued responses to return
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// All requests that have been sent
    recorded: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response
    pub fn queue_text(&self, text: impl Into<String>) {
        let mut responses = self.responses.lock().unwrap();
        responses.push_back(MockResponse::Text(text.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ProviderError) {
        let mut responses = self.responses.lock().unwrap();
        responses.push_back(MockResponse::Error(error));
    }

    /// Get all recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.recorded.lock().unwrap().clone()
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    fn next_response(&self) -> Option<MockResponse> {
        self.responses.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        self.recorded.lock().unwrap().push(request.clone());

        match self.next_response() {
            Some(MockResponse::Text(text)) => Ok(Completion {
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
                ..Completion::text(request.model.clone(), text)
            }),
            Some(MockResponse::Error(error)) => Err(error),
            None => Err(ProviderError::InvalidResponse(
                "no more queued responses".to_string(),
            )),
        }
    }

    fn provider(&self) -> &str {
        "mock"
    }
}
