//! Chat settings
//!
//! Everything the agent catalog needs to build the orchestrator and the
//! domain agents. Settings are validated once, when the catalog is built;
//! any violation is a fatal configuration error.

use crate::error::{Error, Result};
use chatbro_tools::CurrentDateTimeTool;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Tool names accepted by OpenAI-compatible function calling
static TOOL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("TOOL_NAME is a compile-time constant")
});

/// Placeholder in the orchestrator template replaced by the domain blocks
pub const AGENT_DESCRIPTIONS_PLACEHOLDER: &str = "<agent-descriptions-here>";

/// Top-level settings for the agent core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Chat model used by every agent
    pub ai_model: String,
    /// Root directory of instruction files
    #[serde(default = "default_contexts_dir")]
    pub contexts_dir: PathBuf,
    /// Orchestrator identity
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,
    /// Domain agents, in routing-prompt order
    #[serde(default)]
    pub domains: Vec<DomainSettings>,
    /// History compaction
    #[serde(default)]
    pub history: HistorySettings,
    /// Session persistence
    #[serde(default)]
    pub session: SessionSettings,
    /// Upper bound on model round-trips per turn
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,
}

fn default_contexts_dir() -> PathBuf {
    PathBuf::from("contexts")
}

fn default_max_tool_iterations() -> usize {
    8
}

/// Orchestrator identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    /// Key used for history overrides and session ownership
    #[serde(default = "default_orchestrator_key")]
    pub key: String,
    /// Agent name
    #[serde(default = "default_orchestrator_name")]
    pub name: String,
    /// Agent description
    #[serde(default)]
    pub description: String,
}

fn default_orchestrator_key() -> String {
    "orchestrator".to_string()
}

fn default_orchestrator_name() -> String {
    "OrchestratorAgent".to_string()
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            key: default_orchestrator_key(),
            name: default_orchestrator_name(),
            description: "Routes user requests to domain agents".to_string(),
        }
    }
}

/// Which context provider a domain agent gets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainContextKind {
    /// File-backed instructions only
    #[default]
    Static,
    /// Instructions plus the user-location slot
    Location,
}

/// One domain agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSettings {
    /// Unique domain id, part of the session key
    pub key: String,
    /// Function name exposed to the orchestrator's model
    pub tool_name: String,
    /// Agent name (defaults to the key)
    #[serde(default)]
    pub name: Option<String>,
    /// Tool description shown to the orchestrator's model
    pub description: String,
    /// Context provider variant
    #[serde(default)]
    pub context: DomainContextKind,
}

impl DomainSettings {
    /// Agent name, falling back to the key
    #[must_use]
    pub fn agent_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

/// History compaction thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Shared message-count threshold
    #[serde(default = "default_reduce_on_message_count")]
    pub reduce_on_message_count: usize,
    /// Per-agent overrides, by agent key
    #[serde(default)]
    pub per_agent: HashMap<String, usize>,
}

fn default_reduce_on_message_count() -> usize {
    40
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            reduce_on_message_count: default_reduce_on_message_count(),
            per_agent: HashMap::new(),
        }
    }
}

impl HistorySettings {
    /// Threshold for the agent with `key`
    #[must_use]
    pub fn threshold_for(&self, key: &str) -> usize {
        self.per_agent
            .get(key)
            .copied()
            .unwrap_or(self.reduce_on_message_count)
    }
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Time to live, renewed on every save
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    7 * 24 * 3600
}

/// Longest accepted session TTL, five years
pub const MAX_SESSION_TTL_SECS: u64 = 5 * 365 * 24 * 3600;

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl ChatSettings {
    /// Settings with the given model and defaults elsewhere
    #[must_use]
    pub fn new(ai_model: impl Into<String>) -> Self {
        Self {
            ai_model: ai_model.into(),
            contexts_dir: default_contexts_dir(),
            orchestrator: OrchestratorSettings::default(),
            domains: Vec::new(),
            history: HistorySettings::default(),
            session: SessionSettings::default(),
            max_tool_iterations: default_max_tool_iterations(),
        }
    }

    /// Set the contexts directory
    #[must_use]
    pub fn with_contexts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.contexts_dir = dir.into();
        self
    }

    /// Append a domain
    #[must_use]
    pub fn with_domain(mut self, domain: DomainSettings) -> Self {
        self.domains.push(domain);
        self
    }

    /// Orchestrator routing template
    #[must_use]
    pub fn orchestrator_instructions_path(&self) -> PathBuf {
        self.contexts_dir.join("orchestrator.md")
    }

    /// Domain instructions file
    #[must_use]
    pub fn domain_instructions_path(&self, key: &str) -> PathBuf {
        self.domain_dir(key).join("instructions.md")
    }

    /// Domain short description used in the routing prompt
    #[must_use]
    pub fn domain_description_path(&self, key: &str) -> PathBuf {
        self.domain_dir(key).join("description.md")
    }

    fn domain_dir(&self, key: &str) -> PathBuf {
        Path::new(&self.contexts_dir).join("domains").join(key)
    }

    /// Check the settings for fatal mistakes
    ///
    /// # Errors
    /// Returns `Error::Configuration` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.ai_model.trim().is_empty() {
            return Err(Error::Configuration("ai_model is not configured".to_string()));
        }
        if self.orchestrator.key.trim().is_empty() {
            return Err(Error::Configuration(
                "orchestrator key is not configured".to_string(),
            ));
        }
        if self.max_tool_iterations == 0 {
            return Err(Error::Configuration(
                "max_tool_iterations must be at least 1".to_string(),
            ));
        }
        if self.history.reduce_on_message_count == 0
            || self.history.per_agent.values().any(|&t| t == 0)
        {
            return Err(Error::Configuration(
                "history thresholds must be at least 1".to_string(),
            ));
        }
        if self.session.ttl_secs == 0 || self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(Error::Configuration(format!(
                "session ttl_secs must be between 1 and {}",
                MAX_SESSION_TTL_SECS
            )));
        }

        let mut keys = HashSet::new();
        let mut tool_names = HashSet::new();
        for domain in &self.domains {
            let key = domain.key.trim();
            if key.is_empty() {
                return Err(Error::Configuration("domain key is empty".to_string()));
            }
            if key == self.orchestrator.key.trim() {
                return Err(Error::Configuration(format!(
                    "domain key '{}' clashes with the orchestrator key",
                    domain.key
                )));
            }
            if key.contains(':') {
                return Err(Error::Configuration(format!(
                    "domain key '{}' must not contain ':'",
                    domain.key
                )));
            }
            if !keys.insert(key) {
                return Err(Error::Configuration(format!(
                    "duplicate domain key '{}'",
                    domain.key
                )));
            }
            if !TOOL_NAME.is_match(&domain.tool_name) {
                return Err(Error::Configuration(format!(
                    "domain '{}' has invalid tool name '{}'",
                    domain.key, domain.tool_name
                )));
            }
            if domain.tool_name == CurrentDateTimeTool::NAME {
                return Err(Error::Configuration(format!(
                    "domain '{}' tool name clashes with a built-in tool",
                    domain.key
                )));
            }
            if !tool_names.insert(domain.tool_name.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate tool name '{}'",
                    domain.tool_name
                )));
            }
            if domain.description.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "domain '{}' has no description",
                    domain.key
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
