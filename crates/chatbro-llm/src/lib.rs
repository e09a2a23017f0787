//! ChatBro LLM - chat completion backend abstraction
//!
//! This crate provides the model-facing layer used by the agent core:
//! - Message, tool and completion types shared by every provider
//! - `LlmProvider` trait implemented by concrete backends
//! - OpenAI-compatible provider built on async-openai
//! - Structured extraction helper for narrow JSON answers
//! - `MockProvider` with queued responses for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod structured;
pub mod tools;
pub mod util;

pub use completion::{
    CompletionRequest, CompletionResponse, TokenUsage, ToolCompletionRequest,
    ToolCompletionResponse,
};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::LlmProvider;
pub use structured::{complete_structured, strip_code_fences, StructuredOutput};
pub use tools::{ToolCall, ToolDefinition};
