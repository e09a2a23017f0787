//! Chat backend and tool provider resolution

use super::config::{LlmConfig, ToolSourceConfig};
use anyhow::{Context, Result};
use chatbro_llm::{LlmProvider, OpenAiConfig, OpenAiProvider};
use chatbro_tools::mcp::McpToolProvider;
use chatbro_tools::restaurants::{GetRestaurantsTool, RestaurantsClient};
use chatbro_tools::{CurrentDateTimeTool, StaticToolProvider, Tool, ToolProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Build the OpenAI-compatible chat backend
pub fn resolve_llm_provider(llm: &LlmConfig, model: &str) -> Result<Arc<dyn LlmProvider>> {
    let mut config = if llm.api_key.trim().is_empty() {
        debug!("llm.api_key not set, falling back to OPENAI_API_KEY");
        OpenAiConfig::from_env().context("No API key configured for the chat backend")?
    } else {
        OpenAiConfig::new(llm.api_key.clone())
    };

    if let Some(base_url) = llm.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
        config = config.with_base_url(base_url);
    }
    config = config
        .with_model(model)
        .with_timeout(Duration::from_secs(llm.timeout_secs));

    info!(model = %model, base_url = ?config.base_url, "Registered OpenAI-compatible provider");
    let provider = OpenAiProvider::new(config).context("Failed to create chat backend")?;
    Ok(Arc::new(provider))
}

/// Build one tool provider per configured domain source
pub fn resolve_tool_providers(
    sources: &HashMap<String, ToolSourceConfig>,
) -> Result<HashMap<String, Arc<dyn ToolProvider>>> {
    let mut providers: HashMap<String, Arc<dyn ToolProvider>> = HashMap::new();

    for (domain, source) in sources {
        let provider: Arc<dyn ToolProvider> = match source {
            ToolSourceConfig::Restaurants { base_url } => {
                let client = RestaurantsClient::new(base_url)
                    .with_context(|| format!("Invalid restaurants source for '{domain}'"))?;
                let tools: Vec<Arc<dyn Tool>> = vec![
                    Arc::new(GetRestaurantsTool::new(Arc::new(client))),
                    Arc::new(CurrentDateTimeTool::new()),
                ];
                Arc::new(StaticToolProvider::new(domain.clone(), tools))
            }
            ToolSourceConfig::Mcp { url } => Arc::new(
                McpToolProvider::connect(domain.clone(), url)
                    .with_context(|| format!("Invalid MCP source for '{domain}'"))?,
            ),
        };
        info!(domain = %domain, provider = %provider.name(), "Tool source configured");
        providers.insert(domain.clone(), provider);
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tool_providers() {
        let sources = HashMap::from([
            (
                "restaurants".to_string(),
                ToolSourceConfig::Restaurants {
                    base_url: "http://restaurants:8080/api".to_string(),
                },
            ),
            (
                "documents".to_string(),
                ToolSourceConfig::Mcp {
                    url: "http://documents:8000/mcp".to_string(),
                },
            ),
        ]);

        let providers = resolve_tool_providers(&sources).unwrap();
        assert_eq!(providers.len(), 2);
        assert!(providers.contains_key("restaurants"));
        assert!(providers.contains_key("documents"));
    }

    #[test]
    fn test_resolve_tool_providers_rejects_bad_url() {
        let sources = HashMap::from([(
            "restaurants".to_string(),
            ToolSourceConfig::Restaurants {
                base_url: "not a url".to_string(),
            },
        )]);

        assert!(resolve_tool_providers(&sources).is_err());
    }

    #[test]
    fn test_resolve_llm_provider_with_key() {
        let llm = LlmConfig {
            api_key: "sk-test-key-1234567890".to_string(),
            base_url: Some("http://localhost:11434/v1".to_string()),
            timeout_secs: 30,
        };
        let provider = resolve_llm_provider(&llm, "gpt-4o-mini").unwrap();
        assert_eq!(provider.default_model(), "gpt-4o-mini");
    }
}
