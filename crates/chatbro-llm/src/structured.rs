//! Structured extraction over a plain completion
//!
//! A narrow request asks the model for a single JSON value (or `null` when
//! nothing applies). Models routinely wrap JSON in markdown fences, so the
//! answer is unwrapped before parsing.

use crate::completion::CompletionRequest;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::provider::LlmProvider;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Shape and instructions for a structured extraction
#[derive(Debug, Clone)]
pub struct StructuredOutput {
    /// What to extract, in plain words
    pub instructions: String,
    /// JSON schema the answer must follow
    pub schema: serde_json::Value,
}

impl StructuredOutput {
    /// Create a new structured output description
    #[must_use]
    pub fn new(instructions: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            instructions: instructions.into(),
            schema,
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "{}\n\nRespond with a single JSON value matching this schema and nothing else. \
             Respond with null if the information is not present.\n{}",
            self.instructions, self.schema
        )
    }
}

/// Strip a surrounding markdown code fence, if any
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Run a structured extraction against `messages`.
///
/// Returns `Ok(None)` when the model answers `null` or nothing at all.
///
/// # Errors
/// Returns error if the backend fails or the answer is not valid JSON for `T`
pub async fn complete_structured<T: DeserializeOwned>(
    provider: &dyn LlmProvider,
    model: &str,
    messages: Vec<Message>,
    output: &StructuredOutput,
) -> Result<Option<T>> {
    let request = CompletionRequest::new(model)
        .with_message(Message::system(output.system_prompt()))
        .with_messages(messages)
        .with_temperature(0.0);

    let response = provider.complete(request).await?;
    let body = strip_code_fences(&response.content);
    debug!(answer = %body, "Structured extraction answer");

    if body.is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<Option<T>>(body)
        .map_err(|e| Error::InvalidResponse(format!("structured output: {e}")))
}
