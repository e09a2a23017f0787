//! Mock LLM Provider for testing
//!
//! Responses are served from two queues, one per completion mode. When a queue
//! is empty a fixed default answer is returned. Every request is recorded so
//! tests can inspect what the agent sent.

use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Default text returned when no tool response is queued
pub const DEFAULT_MOCK_RESPONSE: &str = "mock response";

/// A mock LLM provider that returns queued responses or default ones.
#[derive(Clone, Default)]
pub struct MockProvider {
    tool_responses: Arc<Mutex<VecDeque<Result<ToolCompletionResponse>>>>,
    completions: Arc<Mutex<VecDeque<String>>>,
    tool_requests: Arc<Mutex<Vec<ToolCompletionRequest>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `complete_with_tools`.
    pub fn add_tool_response(&self, response: ToolCompletionResponse) {
        self.tool_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(response));
    }

    /// Queue a failure for `complete_with_tools`.
    pub fn add_tool_error(&self, message: impl Into<String>) {
        self.tool_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(Error::Api(message.into())));
    }

    /// Queue a text answer for `complete`.
    pub fn add_completion(&self, content: impl Into<String>) {
        self.completions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(content.into());
    }

    /// Requests received by `complete_with_tools`, in order.
    #[must_use]
    pub fn tool_requests(&self) -> Vec<ToolCompletionRequest> {
        self.tool_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Requests received by `complete`, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        // Unqueued extraction requests answer "nothing found"
        let content = self
            .completions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| "null".to_string());

        Ok(CompletionResponse {
            content,
            usage: None,
            model: "mock-model".to_string(),
        })
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        self.tool_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let mut responses = self.tool_responses.lock().unwrap_or_else(|e| e.into_inner());
        match responses.pop_front() {
            Some(resp) => resp,
            None => Ok(ToolCompletionResponse {
                model: "mock-model".to_string(),
                ..ToolCompletionResponse::text(DEFAULT_MOCK_RESPONSE)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_queued_responses_are_served_in_order() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::text("first"));
        mock.add_tool_error("boom");

        let request = ToolCompletionRequest::new(
            CompletionRequest::new("m").with_message(Message::user("hi")),
            vec![],
        );

        let first = mock.complete_with_tools(request.clone()).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));

        assert!(mock.complete_with_tools(request.clone()).await.is_err());

        let fallback = mock.complete_with_tools(request).await.unwrap();
        assert_eq!(fallback.content.as_deref(), Some(DEFAULT_MOCK_RESPONSE));

        assert_eq!(mock.tool_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_complete_defaults_to_null() {
        let mock = MockProvider::new();
        mock.add_completion("{\"a\":1}");

        let first = mock.complete(CompletionRequest::new("m")).await.unwrap();
        let second = mock.complete(CompletionRequest::new("m")).await.unwrap();

        assert_eq!(first.content, "{\"a\":1}");
        assert_eq!(second.content, "null");
        assert_eq!(mock.requests().len(), 2);
    }
}
