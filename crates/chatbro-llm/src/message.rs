//! Message types for LLM conversations
//!
//! Messages are also the unit of persisted conversation history, so every
//! field round-trips through serde.

use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions and injected facts
    System,
    User,
    Assistant,
    /// Output of a tool call, paired with the call by id
    Tool,
}

/// One conversation message, as sent to the backend and as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    /// Text; empty for assistant messages that only request tools
    pub content: String,
    /// Call this tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool that produced a tool message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: Vec::new(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// Assistant turn that asks for tools; `None` content is stored as empty text
    #[must_use]
    pub fn assistant_with_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::with_role(MessageRole::Assistant, content.unwrap_or_default())
        }
    }

    /// Result of tool call `tool_call_id`, fed back to the model
    #[must_use]
    pub fn tool_response(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            ..Self::with_role(MessageRole::Tool, content)
        }
    }

    /// True for assistant messages that request tools
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.role == MessageRole::Assistant && !self.tool_calls.is_empty()
    }
}
