/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that speaks the same request and
 * response types as the OpenAI-compatible client and simulates different
 * behaviors:
 * - `MockProvider::working()` - Always succeeds with `[TRANSLATED] <text>`
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::failing_on(marker)` - Fails only for sentences containing `marker`
 * - `MockProvider::empty()` - Returns an empty completion
 * - `MockProvider::custom(f)` - Translates with a caller-supplied function
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::openai::{OpenAIChoice, OpenAIMessage, OpenAIRequest, OpenAIResponse, TokenUsage};
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tagged echo of the input
    Working,
    /// Always fails with an error
    Failing,
    /// Fails when the user message contains the marker, succeeds otherwise
    FailingOn(String),
    /// Returns an empty completion
    Empty,
    /// Uses the custom response generator
    Custom,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of `complete` calls
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<OpenAIRequest>>>,
    /// Custom response generator
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailingOn(marker.into()))
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that translates each user message with `generator`
    pub fn custom(generator: fn(&str) -> String) -> Self {
        Self {
            custom_response: Some(generator),
            ..Self::new(MockBehavior::Custom)
        }
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of the requests received so far
    pub fn requests(&self) -> Vec<OpenAIRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Content of the last message with the given role in a request
    pub fn message_content<'a>(request: &'a OpenAIRequest, role: &str) -> Option<&'a str> {
        request.messages
            .iter()
            .rev()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }

    fn respond(text: String) -> OpenAIResponse {
        let completion_tokens = text.chars().count() as u32;
        OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIMessage {
                    role: "assistant".to_string(),
                    content: text,
                },
            }],
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens,
                total_tokens: 10 + completion_tokens,
            }),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let text = Self::message_content(&request, "user").unwrap_or_default().to_string();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match &self.behavior {
            MockBehavior::Working => Ok(Self::respond(format!("[TRANSLATED] {}", text))),
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated failure".to_string())),
            MockBehavior::FailingOn(marker) if text.contains(marker.as_str()) => Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure for '{}'", marker),
            }),
            MockBehavior::FailingOn(_) => Ok(Self::respond(format!("[TRANSLATED] {}", text))),
            MockBehavior::Empty => Ok(Self::respond(String::new())),
            MockBehavior::Custom => {
                let generator = self.custom_response.unwrap_or(|t: &str| t.to_string());
                Ok(Self::respond(generator(&text)))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated failure".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }

    fn token_usage(response: &Self::Response) -> Option<(u64, u64)> {
        response.usage
            .as_ref()
            .map(|usage| (usage.prompt_tokens as u64, usage.completion_tokens as u64))
    }
}
