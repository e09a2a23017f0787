//! Agent catalog
//!
//! Builds the orchestrator and the fixed list of domain agents once per
//! process. The first caller builds under a lock; everyone else reads the
//! finished set without locking. A failed build is not memoized, so the
//! next call tries again.

use crate::agent::Agent;
use crate::config::{ChatSettings, DomainContextKind};
use crate::context::{ContextProvider, InstructionsSource, LocationExtractor, RoutingEntry};
use crate::descriptor::AgentDescriptor;
use crate::error::Result;
use crate::reducer::MessageCountingReducer;
use async_trait::async_trait;
use chatbro_llm::LlmProvider;
use chatbro_tools::{CurrentDateTimeTool, Tool, ToolProvider};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Access to the process-wide agents
#[async_trait]
pub trait AgentProvider: Send + Sync {
    /// The orchestrator agent
    async fn orchestrator(&self) -> Result<Arc<Agent>>;

    /// Domain agents in configured order
    async fn domain_agents(&self) -> Result<Arc<Vec<AgentDescriptor>>>;
}

struct AgentSet {
    orchestrator: Arc<Agent>,
    domains: Arc<Vec<AgentDescriptor>>,
}

/// Lazily built, memoized agent catalog
pub struct AgentCatalog {
    settings: ChatSettings,
    llm: Arc<dyn LlmProvider>,
    instructions: Arc<dyn InstructionsSource>,
    tool_providers: HashMap<String, Arc<dyn ToolProvider>>,
    orchestrator_tools: Vec<Arc<dyn Tool>>,
    built: OnceLock<AgentSet>,
    build_lock: Mutex<()>,
}

impl AgentCatalog {
    /// Create a catalog; nothing is built until first use
    pub fn new(
        settings: ChatSettings,
        llm: Arc<dyn LlmProvider>,
        instructions: Arc<dyn InstructionsSource>,
    ) -> Self {
        Self {
            settings,
            llm,
            instructions,
            tool_providers: HashMap::new(),
            orchestrator_tools: vec![Arc::new(CurrentDateTimeTool::new())],
            built: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    /// Attach the tool source of a domain
    #[must_use]
    pub fn with_tool_provider(
        mut self,
        domain_key: impl Into<String>,
        provider: Arc<dyn ToolProvider>,
    ) -> Self {
        self.tool_providers.insert(domain_key.into(), provider);
        self
    }

    /// Give the orchestrator an extra utility tool
    #[must_use]
    pub fn with_orchestrator_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.orchestrator_tools.push(tool);
        self
    }

    /// Settings the catalog builds from
    #[must_use]
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// True once the agents have been built
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.built.get().is_some()
    }

    async fn agents(&self) -> Result<&AgentSet> {
        if let Some(set) = self.built.get() {
            return Ok(set);
        }

        let _guard = self.build_lock.lock().await;
        if let Some(set) = self.built.get() {
            return Ok(set);
        }

        let set = self.build().await?;
        Ok(self.built.get_or_init(|| set))
    }

    async fn build(&self) -> Result<AgentSet> {
        let settings = &self.settings;
        settings.validate()?;
        info!(domains = settings.domains.len(), model = %settings.ai_model, "Building agent catalog");

        let mut domains = Vec::with_capacity(settings.domains.len());
        for domain in &settings.domains {
            let tools = self.domain_tools(&domain.key).await;

            let instructions = settings.domain_instructions_path(&domain.key);
            let context = match domain.context {
                DomainContextKind::Static => {
                    ContextProvider::static_instructions(self.instructions.clone(), instructions)
                }
                DomainContextKind::Location => ContextProvider::location(
                    self.instructions.clone(),
                    instructions,
                    LocationExtractor::new(self.llm.clone(), &settings.ai_model),
                ),
            };
            context.preflight().await?;

            let agent = Agent::new(
                &domain.key,
                domain.agent_name(),
                self.llm.clone(),
                context,
            )
            .with_description(&domain.description)
            .with_model(&settings.ai_model)
            .with_tools(tools)
            .with_reducer(MessageCountingReducer::new(
                settings.history.threshold_for(&domain.key),
            ))
            .with_max_tool_iterations(settings.max_tool_iterations);

            debug!(domain = %domain.key, agent = ?agent, "Domain agent built");
            domains.push(AgentDescriptor {
                key: domain.key.clone(),
                tool_name: domain.tool_name.clone(),
                description: domain.description.clone(),
                agent: Arc::new(agent),
            });
        }

        let routing = domains
            .iter()
            .map(|d| RoutingEntry {
                tool_name: d.tool_name.clone(),
                description_path: settings.domain_description_path(&d.key),
            })
            .collect();
        let context = ContextProvider::orchestrator(
            self.instructions.clone(),
            settings.orchestrator_instructions_path(),
            routing,
        );
        context.preflight().await?;

        let orchestrator = &settings.orchestrator;
        let agent = Agent::new(
            &orchestrator.key,
            &orchestrator.name,
            self.llm.clone(),
            context,
        )
        .with_description(&orchestrator.description)
        .with_model(&settings.ai_model)
        .with_tools(self.orchestrator_tools.iter().cloned())
        .with_reducer(MessageCountingReducer::new(
            settings.history.threshold_for(&orchestrator.key),
        ))
        .with_max_tool_iterations(settings.max_tool_iterations);

        info!(domains = domains.len(), "Agent catalog built");
        Ok(AgentSet {
            orchestrator: Arc::new(agent),
            domains: Arc::new(domains),
        })
    }

    /// Tools of one domain; an unavailable source degrades to none
    async fn domain_tools(&self, domain_key: &str) -> Vec<Arc<dyn Tool>> {
        let Some(provider) = self.tool_providers.get(domain_key) else {
            debug!(domain = %domain_key, "No tool provider configured");
            return Vec::new();
        };

        match provider.list_tools().await {
            Ok(tools) => {
                info!(
                    domain = %domain_key,
                    provider = %provider.name(),
                    tools = tools.len(),
                    "Loaded domain tools"
                );
                tools
            }
            Err(e) => {
                warn!(
                    domain = %domain_key,
                    provider = %provider.name(),
                    error = %e,
                    "Tool provider unavailable, domain agent will have no tools"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl AgentProvider for AgentCatalog {
    async fn orchestrator(&self) -> Result<Arc<Agent>> {
        Ok(self.agents().await?.orchestrator.clone())
    }

    async fn domain_agents(&self) -> Result<Arc<Vec<AgentDescriptor>>> {
        Ok(self.agents().await?.domains.clone())
    }
}
