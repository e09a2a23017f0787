//! Chat backend seam

use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::Result;

/// A chat-completion backend
///
/// Implementations are shared between every agent of the process, so they
/// must be cheap to call concurrently.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;

    /// Plain completion, no tools offered
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Completion that may answer with tool calls
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse>;
}
