//! Conversational agent
//!
//! An agent couples a chat model with instructions (its context provider),
//! its own tools and a history policy. Running a turn is a tool-calling loop:
//! the model is called with context, history and the new messages until it
//! answers with text, each requested tool being executed in between.

use crate::context::ContextProvider;
use crate::error::{Error, Result};
use crate::reducer::MessageCountingReducer;
use crate::session::{AgentSession, SessionCodec};
use chatbro_llm::{CompletionRequest, LlmProvider, Message, ToolCall, ToolCompletionRequest};
use chatbro_tools::{Tool, ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default bound on model round-trips per turn
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 8;

/// Default history threshold
pub const DEFAULT_HISTORY_THRESHOLD: usize = 40;

/// A chat-model backed agent
pub struct Agent {
    key: String,
    name: String,
    description: String,
    llm: Arc<dyn LlmProvider>,
    model: String,
    tools: ToolRegistry,
    context: ContextProvider,
    reducer: MessageCountingReducer,
    max_tool_iterations: usize,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("model", &self.model)
            .field("context", &self.context.kind())
            .field("tools", &self.tools.list_names())
            .finish()
    }
}

impl Agent {
    /// Create an agent using the provider's default model
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        llm: Arc<dyn LlmProvider>,
        context: ContextProvider,
    ) -> Self {
        let model = llm.default_model().to_string();
        Self {
            key: key.into(),
            name: name.into(),
            description: String::new(),
            llm,
            model,
            tools: ToolRegistry::new(),
            context,
            reducer: MessageCountingReducer::new(DEFAULT_HISTORY_THRESHOLD),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the chat model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Add tools the agent always has
    #[must_use]
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Set the history reducer
    #[must_use]
    pub fn with_reducer(mut self, reducer: MessageCountingReducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// Set the tool iteration bound
    #[must_use]
    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max.max(1);
        self
    }

    /// Agent key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Agent name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Agent description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Chat model
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The agent's own tools
    #[must_use]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Context provider
    #[must_use]
    pub fn context(&self) -> &ContextProvider {
        &self.context
    }

    /// History reducer
    #[must_use]
    pub fn reducer(&self) -> MessageCountingReducer {
        self.reducer
    }

    /// Run one turn for `input` against `session`.
    ///
    /// `extra_tools` are available for this turn only. On success every
    /// message of the turn is appended to the session, history is reduced
    /// and the context provider observes the turn. A failed turn leaves the
    /// session untouched.
    ///
    /// # Errors
    /// Returns error on cancellation, backend failure, unreadable
    /// instructions or when the tool loop does not terminate
    #[tracing::instrument(skip_all, fields(agent = %self.key, session_id = %session.id))]
    pub async fn run(
        &self,
        session: &mut AgentSession,
        input: &str,
        extra_tools: &[Arc<dyn Tool>],
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut registry = self.tools.clone();
        registry.extend(extra_tools.iter().cloned());
        let definitions = registry.to_llm_tools();

        let context = self.context.invoking(session).await?;
        let mut turn = vec![Message::user(input)];

        for iteration in 0..self.max_tool_iterations {
            let messages: Vec<Message> = context
                .iter()
                .chain(session.messages.iter())
                .chain(turn.iter())
                .cloned()
                .collect();

            let request = ToolCompletionRequest::new(
                CompletionRequest::new(&self.model).with_messages(messages),
                definitions.clone(),
            );

            debug!(iteration, tools = definitions.len(), "Calling chat model");
            let response = tokio::select! {
                () = cancel.cancelled() => return Err(Error::Cancelled),
                res = self.llm.complete_with_tools(request) => res?,
            };

            if response.is_final() {
                let text = response.content.unwrap_or_default();
                turn.push(Message::assistant(text.clone()));
                self.finish_turn(session, turn, cancel).await;
                return Ok(text);
            }

            turn.push(Message::assistant_with_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let content = self.invoke_tool(&registry, call).await;
                turn.push(Message::tool_response(&call.id, &call.name, content));
            }
        }

        Err(Error::ToolLoopExceeded {
            agent: self.name.clone(),
            iterations: self.max_tool_iterations,
        })
    }

    async fn finish_turn(
        &self,
        session: &mut AgentSession,
        turn: Vec<Message>,
        cancel: &CancellationToken,
    ) {
        session.messages.extend(turn.iter().cloned());
        let removed = self.reducer.reduce(&mut session.messages);
        session.touch();
        debug!(
            appended = turn.len(),
            removed,
            history = session.message_count(),
            "Turn recorded"
        );

        self.context.invoked(session, &turn, cancel).await;
    }

    /// Execute one tool call; failures become an error payload for the model
    async fn invoke_tool(&self, registry: &ToolRegistry, call: &ToolCall) -> String {
        let input = call.arguments_object().unwrap_or_else(|| {
            if !call.arguments.trim().is_empty() {
                warn!(
                    tool = %call.name,
                    arguments = %call.arguments,
                    "Tool arguments are not a JSON object, using empty object"
                );
            }
            serde_json::json!({})
        });

        info!(agent = %self.key, tool = %call.name, "Invoking tool");
        let start = Instant::now();
        let result = registry.execute(&call.name, input).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(result) => {
                info!(
                    agent = %self.key,
                    tool = %call.name,
                    success = result.success,
                    duration_ms,
                    "Tool finished"
                );
                result.to_model_content()
            }
            Err(e) => {
                warn!(
                    agent = %self.key,
                    tool = %call.name,
                    error = %e,
                    duration_ms,
                    "Tool failed"
                );
                ToolResult::failure(e.to_string(), duration_ms).to_model_content()
            }
        }
    }
}

impl SessionCodec for Agent {
    fn owner(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests;
