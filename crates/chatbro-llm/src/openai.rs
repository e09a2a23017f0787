//! OpenAI - async-openai provider
//!
//! Works against the OpenAI API and any OpenAI-compatible endpoint
//! (Azure, local gateways) through `base_url`.

use crate::completion::{
    CompletionRequest, CompletionResponse, TokenUsage, ToolCompletionRequest,
    ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::message::{Message, MessageRole};
use crate::provider::LlmProvider;
use crate::tools::{ToolCall, ToolDefinition};
use crate::util::{mask_api_key, truncate_safe};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, ChatCompletionTool,
        ChatCompletionResponseMessage, ChatCompletionToolChoiceOption, ChatCompletionTools,
        CreateChatCompletionRequest, FunctionCall, FunctionObject, ToolChoiceOptions,
    },
    Client,
};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

fn sanitize_api_error(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("api key")
        || lower.contains("apikey")
        || lower.contains("invalid key")
        || lower.contains("unauthorized")
        || lower.contains("authentication")
    {
        return "API authentication error. Please check your API key configuration.".to_string();
    }

    if lower.contains("rate limit") || lower.contains("quota") {
        return "API rate limit exceeded. Please try again later.".to_string();
    }

    if lower.contains("internal") || lower.contains("server error") {
        return "API server error. Please try again later.".to_string();
    }

    if error.len() > 300 {
        format!("{}...(truncated)", truncate_safe(error, 300))
    } else {
        error.to_string()
    }
}

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the OpenAI provider
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key for authentication
    pub api_key: String,
    /// Optional custom base URL (for Azure OpenAI or proxies)
    pub base_url: Option<String>,
    /// Default model to use for completions
    pub default_model: String,
    /// Request timeout duration
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Creates configuration from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL`
    ///
    /// # Errors
    /// Returns error if `OPENAI_API_KEY` is not set
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::NotConfigured("OPENAI_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);
        config.base_url = std::env::var("OPENAI_BASE_URL").ok();
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.default_model = model;
        }
        Ok(config)
    }

    /// Sets a custom base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Sets the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// OpenAI API provider for chat completions
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    default_model: String,
    timeout: Duration,
}

impl OpenAiProvider {
    /// Creates a new provider with the given configuration
    ///
    /// # Errors
    /// Returns error if the API key is empty
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::NotConfigured("OpenAI API key is empty".to_string()));
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            default_model: config.default_model,
            timeout: config.timeout,
        })
    }

    fn convert_message(msg: &Message) -> Result<ChatCompletionRequestMessage> {
        let message = match msg.role {
            MessageRole::System => ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            }
            .into(),
            MessageRole::User => ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                name: None,
            }
            .into(),
            MessageRole::Assistant => {
                let content = (!msg.content.is_empty()).then(|| {
                    ChatCompletionRequestAssistantMessageContent::Text(msg.content.clone())
                });
                let tool_calls = (!msg.tool_calls.is_empty())
                    .then(|| msg.tool_calls.iter().map(Self::convert_tool_call).collect());

                #[allow(deprecated)]
                ChatCompletionRequestAssistantMessage {
                    content,
                    name: None,
                    tool_calls,
                    function_call: None,
                    refusal: None,
                    audio: None,
                }
                .into()
            }
            MessageRole::Tool => {
                let tool_call_id = msg.tool_call_id.as_ref().ok_or_else(|| {
                    Error::InvalidResponse("Tool message missing tool_call_id".to_string())
                })?;
                ChatCompletionRequestToolMessage {
                    content: ChatCompletionRequestToolMessageContent::Text(msg.content.clone()),
                    tool_call_id: tool_call_id.clone(),
                }
                .into()
            }
        };
        Ok(message)
    }

    fn convert_tool_call(call: &ToolCall) -> ChatCompletionMessageToolCalls {
        ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
            id: call.id.clone(),
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        })
    }

    fn convert_tool(tool: &ToolDefinition) -> ChatCompletionTool {
        ChatCompletionTool {
            function: FunctionObject {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                parameters: Some(tool.parameters.clone()),
                strict: None,
            },
        }
    }

    fn resolve_model<'a>(&'a self, requested: &'a str) -> &'a str {
        if requested.is_empty() {
            &self.default_model
        } else {
            requested
        }
    }

    /// One round-trip; returns the first choice's message and the billing
    async fn chat(
        &self,
        request: &CompletionRequest,
        tools: &[ToolDefinition],
    ) -> Result<(ChatCompletionResponseMessage, Option<TokenUsage>, String)> {
        let messages = request
            .messages
            .iter()
            .map(Self::convert_message)
            .collect::<Result<Vec<_>>>()?;

        // The API rejects an empty tools array
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            let tools = tools
                .iter()
                .map(|tool| ChatCompletionTools::Function(Self::convert_tool(tool)))
                .collect();
            (
                Some(tools),
                Some(ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto)),
            )
        };

        let body = CreateChatCompletionRequest {
            model: self.resolve_model(&request.model).to_string(),
            messages,
            tools,
            tool_choice,
            temperature: request.temperature,
            ..Default::default()
        };

        let chat = self.client.chat();
        let call = chat.create(body);
        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(response) => response.map_err(|e| Error::Api(sanitize_api_error(&e.to_string())))?,
            Err(_) => return Err(Error::Timeout(self.timeout.as_millis() as u64)),
        };

        let usage = response.usage.map(|u| TokenUsage {
            input: u.prompt_tokens,
            output: u.completion_tokens,
        });
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::InvalidResponse("No choices in response".to_string()))?;

        debug!(model = %response.model, tokens = usage.map(|u| u.total()), "OpenAI answered");
        Ok((message, usage, response.model))
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let (message, usage, model) = self.chat(&request, &[]).await?;
        Ok(CompletionResponse {
            content: message.content.unwrap_or_default(),
            usage,
            model,
        })
    }

    #[instrument(skip(self, request), fields(model = %request.request.model, tools = request.tools.len()))]
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        let (message, usage, model) = self.chat(&request.request, &request.tools).await?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|call| match call {
                ChatCompletionMessageToolCalls::Function(call) => Some(ToolCall::new(
                    call.id,
                    call.function.name,
                    call.function.arguments,
                )),
                _ => None,
            })
            .collect();

        Ok(ToolCompletionResponse {
            content: message.content,
            tool_calls,
            usage,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = OpenAiConfig::new("test-key")
            .with_model("gpt-4o")
            .with_base_url("http://localhost:8080/v1")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_empty_key_is_not_configured() {
        let result = OpenAiProvider::new(OpenAiConfig::new("  "));
        assert!(matches!(result, Err(Error::NotConfigured(_))));
    }

    #[test]
    fn test_sanitize_api_error() {
        let sanitized = sanitize_api_error("Invalid API key: sk-1234567890");
        assert!(!sanitized.contains("sk-"));
        assert!(sanitized.contains("authentication"));

        let sanitized = sanitize_api_error("Rate limit exceeded: 100 requests per minute");
        assert!(!sanitized.contains("100"));
        assert!(sanitized.contains("rate limit"));

        assert_eq!(sanitize_api_error("Model not found"), "Model not found");
    }

    #[test]
    fn test_config_debug_masks_key() {
        let config = OpenAiConfig::new("sk-1234567890abcdefghijklmnop");
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("1234567890abcdefghijkl"));
        assert!(debug_str.contains("sk-1...mnop"));
    }

    #[test]
    fn test_tool_message_requires_call_id() {
        let mut msg = Message::tool_response("call_1", "t", "{}");
        assert!(OpenAiProvider::convert_message(&msg).is_ok());

        msg.tool_call_id = None;
        assert!(OpenAiProvider::convert_message(&msg).is_err());
    }

    #[test]
    fn test_assistant_tool_calls_are_converted() {
        let msg = Message::assistant_with_tool_calls(
            None,
            vec![ToolCall::new("call_9", "documents", r#"{"query":"invoice"}"#)],
        );

        let converted = OpenAiProvider::convert_message(&msg).unwrap();
        match converted {
            ChatCompletionRequestMessage::Assistant(assistant) => {
                assert!(assistant.content.is_none());
                let calls = assistant.tool_calls.unwrap();
                assert_eq!(calls.len(), 1);
                match &calls[0] {
                    ChatCompletionMessageToolCalls::Function(call) => {
                        assert_eq!(call.id, "call_9");
                        assert_eq!(call.function.name, "documents");
                    }
                    _ => panic!("expected function tool call"),
                }
            }
            _ => panic!("expected assistant message"),
        }
    }
}
