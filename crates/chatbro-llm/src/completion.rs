//! Requests sent to a chat backend and the answers it returns
//!
//! Agents only ever need two shapes: a plain completion (used for narrow
//! structured extraction) and a completion offered a set of tools, whose
//! answer is either final text or a batch of tool calls.

use crate::message::Message;
use crate::tools::{ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};

/// Tokens billed for one round-trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub input: u32,
    /// Tokens generated
    pub output: u32,
}

impl TokenUsage {
    /// Prompt plus generated tokens
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input.saturating_add(self.output)
    }
}

/// Conversation to complete
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model name; empty selects the backend's default
    pub model: String,
    /// Prompt, oldest first
    pub messages: Vec<Message>,
    /// Sampling temperature, backend default when unset
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Empty conversation for `model`
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Append one message
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Append several messages in order
    #[must_use]
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Pin the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Text answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Answer text, empty when the model said nothing
    pub content: String,
    /// Billing, if reported
    pub usage: Option<TokenUsage>,
    /// Model that answered
    pub model: String,
}

/// Conversation offered a set of callable tools
///
/// The model decides whether to call any of them.
#[derive(Debug, Clone)]
pub struct ToolCompletionRequest {
    /// Conversation
    pub request: CompletionRequest,
    /// Callable tools, in the order the model sees them
    pub tools: Vec<ToolDefinition>,
}

impl ToolCompletionRequest {
    /// Offer `tools` alongside `request`
    #[must_use]
    pub fn new(request: CompletionRequest, tools: Vec<ToolDefinition>) -> Self {
        Self { request, tools }
    }
}

/// Final text or a batch of tool calls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCompletionResponse {
    /// Text, possibly alongside tool calls
    pub content: Option<String>,
    /// Calls to run before asking again; empty means the answer is final
    pub tool_calls: Vec<ToolCall>,
    /// Billing, if reported
    pub usage: Option<TokenUsage>,
    /// Model that answered
    pub model: String,
}

impl ToolCompletionResponse {
    /// Final answer
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Tool calls with no accompanying text
    #[must_use]
    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    /// True when the model asked for no tools
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keeps_message_order() {
        let request = CompletionRequest::new("gpt-4o")
            .with_message(Message::system("be brief"))
            .with_messages(vec![Message::user("hi"), Message::assistant("hello")])
            .with_temperature(0.0);

        assert_eq!(request.model, "gpt-4o");
        let contents: Vec<_> = request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["be brief", "hi", "hello"]);
        assert_eq!(request.temperature, Some(0.0));
    }

    #[test]
    fn test_final_and_tool_call_answers() {
        let answer = ToolCompletionResponse::text("done");
        assert!(answer.is_final());
        assert_eq!(answer.content.as_deref(), Some("done"));

        let calls = ToolCompletionResponse::calls(vec![ToolCall::new("1", "t", "{}")]);
        assert!(!calls.is_final());
        assert!(calls.content.is_none());
    }

    #[test]
    fn test_usage_total_saturates() {
        let usage = TokenUsage {
            input: u32::MAX,
            output: 5,
        };
        assert_eq!(usage.total(), u32::MAX);
    }
}
