//! Server initialization and run loop

use super::loader::load_config;
use super::providers::{resolve_llm_provider, resolve_tool_providers};
use anyhow::{Context, Result};
use chatbro_channels::{TelegramAdapter, TelegramConfig};
use chatbro_core::{
    AgentCatalog, AgentProvider, ChatService, FileInstructions, RedisBackend, SessionStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Load configuration, wire the services and serve Telegram until Ctrl+C
pub async fn run() -> Result<()> {
    let mut config = load_config()?;
    config
        .chat
        .validate()
        .context("Invalid chat configuration")?;
    if config.telegram.bot_token.trim().is_empty() {
        let from_env = TelegramConfig::from_env().context("No Telegram bot token configured")?;
        config.telegram.bot_token = from_env.bot_token;
        if config.telegram.allowed_users.is_empty() {
            config.telegram.allowed_users = from_env.allowed_users;
        }
    }
    config
        .telegram
        .validate()
        .context("Invalid Telegram configuration")?;

    let llm = resolve_llm_provider(&config.llm, &config.chat.ai_model)?;

    let backend = RedisBackend::with_prefix(&config.redis.url, &config.redis.key_prefix)
        .context("Failed to create session backend")?;
    let store = SessionStore::new(Arc::new(backend))
        .with_ttl(Duration::from_secs(config.chat.session.ttl_secs));
    info!(
        backend = %store.backend_name(),
        ttl_secs = store.ttl().as_secs(),
        "Session store ready"
    );

    for domain in &config.chat.domains {
        if !config.tool_sources.contains_key(&domain.key) {
            warn!(domain = %domain.key, "No tool source configured, domain runs without tools");
        }
    }
    let tool_providers = resolve_tool_providers(&config.tool_sources)?;

    let mut catalog =
        AgentCatalog::new(config.chat.clone(), llm, Arc::new(FileInstructions::new()));
    for (domain, provider) in tool_providers {
        catalog = catalog.with_tool_provider(domain, provider);
    }
    let catalog: Arc<dyn AgentProvider> = Arc::new(catalog);

    // Build now so broken instructions fail at startup rather than on the first message
    let domains = catalog
        .domain_agents()
        .await
        .context("Failed to build agents")?;
    info!(domains = domains.len(), "Agents ready");

    let chat = ChatService::new(catalog, store);
    let adapter = Arc::new(TelegramAdapter::new(config.telegram));

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                signal.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    adapter
        .run(chat, shutdown)
        .await
        .context("Telegram channel failed")?;

    info!("ChatBro stopped");
    Ok(())
}
