//! Server configuration types

use chatbro_channels::TelegramConfig;
use chatbro_core::store::DEFAULT_KEY_PREFIX;
use chatbro_core::ChatSettings;
use serde::Deserialize;
use std::collections::HashMap;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub redis: RedisConfig,
    pub llm: LlmConfig,
    pub chat: ChatSettings,
    pub telegram: TelegramConfig,
    /// Tool source per domain key; domains without one get no tools
    #[serde(default)]
    pub tool_sources: HashMap<String, ToolSourceConfig>,
}

/// Session store connection
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

/// Chat completion backend
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    /// Falls back to `OPENAI_API_KEY` when empty
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &chatbro_llm::util::mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where a domain's tools come from
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolSourceConfig {
    /// Lunch menus over HTTP, plus the current date and time
    Restaurants { base_url: String },
    /// Tools listed by an MCP server
    Mcp { url: String },
}
